//! Resource model.
//!
//! A resource is a processing unit with a constant rate (work units per
//! time unit) that consumes its FIFO queue head-first. The pool is the
//! fixed, indexed set of resources a simulation runs against.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1.2
//! (uniform parallel machines, Q_m)

use std::collections::VecDeque;
use std::ops::Range;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::Task;
use crate::error::SimError;

/// Remaining work at or below this is treated as finished.
pub const COMPLETION_TOLERANCE: f64 = 1e-8;

/// A processing unit with a FIFO work queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Index of this resource in its pool.
    pub id: usize,
    /// Work units processed per time unit (strictly positive).
    pub rate: f64,
    /// Tasks assigned to this resource, head is being processed.
    pub queue: VecDeque<Task>,
    /// Cumulative time spent with a non-empty queue.
    pub busy_time: f64,
    /// Number of tasks this resource has completed.
    pub completed: usize,
}

impl Resource {
    /// Creates an idle resource.
    pub fn new(id: usize, rate: f64) -> Self {
        Self {
            id,
            rate,
            queue: VecDeque::new(),
            busy_time: 0.0,
            completed: 0,
        }
    }

    /// Appends a task to the queue, recording the assignment.
    ///
    /// Start time is `max(arrival, current_time)`.
    pub fn enqueue(&mut self, mut task: Task, current_time: f64) {
        task.assigned_resource = Some(self.id);
        task.start = Some(task.arrival.max(current_time));
        self.queue.push_back(task);
    }

    /// Whether the queue is empty.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of queued tasks, including the one in service.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Processes the head task for one tick starting at `now`.
    ///
    /// Returns the head task if it completed during this tick. A
    /// completed task finishes at the tick boundary `now + dt`; leftover
    /// capacity in that tick is not carried over to the next task.
    pub fn advance(&mut self, now: f64, dt: f64) -> Option<Task> {
        let rate = self.rate;
        let head = self.queue.front_mut()?;
        head.remaining = (head.remaining - rate * dt).max(0.0);
        self.busy_time += dt;

        if head.remaining > COMPLETION_TOLERANCE {
            return None;
        }
        self.complete_head(now + dt)
    }

    /// Exact time the head task still needs, if any.
    pub fn head_time_to_finish(&self) -> Option<f64> {
        self.queue.front().map(|t| t.remaining / self.rate)
    }

    /// Marks the head task completed at `finish` and pops it.
    ///
    /// The new head inherits `finish` as its start time if it has none.
    pub fn complete_head(&mut self, finish: f64) -> Option<Task> {
        let mut done = self.queue.pop_front()?;
        done.remaining = 0.0;
        done.finish = Some(finish);
        self.completed += 1;

        if let Some(next) = self.queue.front_mut() {
            if next.start.is_none() {
                next.start = Some(finish);
            }
        }
        Some(done)
    }
}

/// The fixed set of resources a simulation runs against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    resources: Vec<Resource>,
}

impl ResourcePool {
    /// Builds a pool from explicit rates.
    ///
    /// # Errors
    /// `SimError::InvalidResourceRate` if any rate is not strictly
    /// positive and finite.
    pub fn with_rates(rates: &[f64]) -> Result<Self, SimError> {
        let mut resources = Vec::with_capacity(rates.len());
        for (index, &rate) in rates.iter().enumerate() {
            if !(rate.is_finite() && rate > 0.0) {
                return Err(SimError::InvalidResourceRate { index, rate });
            }
            resources.push(Resource::new(index, rate));
        }
        Ok(Self { resources })
    }

    /// Builds `count` resources with rates drawn uniformly from `range`.
    ///
    /// Rates are drawn in index order. The caller guarantees `range` is
    /// non-empty with a positive lower bound.
    pub fn random<R: Rng>(count: usize, range: Range<f64>, rng: &mut R) -> Self {
        let resources = (0..count)
            .map(|id| Resource::new(id, rng.random_range(range.clone())))
            .collect();
        Self { resources }
    }

    /// Number of resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the pool has no resources.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resource by index.
    pub fn get(&self, index: usize) -> Option<&Resource> {
        self.resources.get(index)
    }

    /// All resources in index order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Iterates resources in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    /// Processing rates in index order.
    pub fn rates(&self) -> Vec<f64> {
        self.resources.iter().map(|r| r.rate).collect()
    }

    /// Places a task on resource `index`.
    ///
    /// # Panics
    /// If `index` is out of range. Strategies only produce indices in
    /// `0..len()`.
    pub fn assign(&mut self, task: Task, index: usize, current_time: f64) {
        self.resources[index].enqueue(task, current_time);
    }

    /// Advances every resource by one tick, returning completed tasks
    /// in resource index order.
    pub fn advance(&mut self, now: f64, dt: f64) -> Vec<Task> {
        self.resources
            .iter_mut()
            .filter_map(|r| r.advance(now, dt))
            .collect()
    }

    /// Whether any resource still has queued work.
    pub fn has_pending_work(&self) -> bool {
        self.resources.iter().any(|r| !r.is_idle())
    }

    /// Total queued tasks across all resources.
    pub fn queued_tasks(&self) -> usize {
        self.resources.iter().map(Resource::queue_len).sum()
    }

    /// Sum of busy time across all resources.
    pub fn total_busy_time(&self) -> f64 {
        self.resources.iter().map(|r| r.busy_time).sum()
    }

    pub(crate) fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_enqueue_sets_assignment_and_start() {
        let mut r = Resource::new(2, 10.0);
        r.enqueue(Task::new(0, 4.5, 50), 3.0);
        r.enqueue(Task::new(1, 1.0, 50), 3.0);

        assert_eq!(r.queue_len(), 2);
        assert_eq!(r.queue[0].assigned_resource, Some(2));
        // arrival after current time
        assert_eq!(r.queue[0].start, Some(4.5));
        assert_eq!(r.queue[1].start, Some(3.0));
    }

    #[test]
    fn test_advance_consumes_head_and_accrues_busy_time() {
        let mut r = Resource::new(0, 20.0);
        r.enqueue(Task::new(0, 0.0, 50), 0.0);

        assert!(r.advance(0.0, 1.0).is_none());
        assert!((r.queue[0].remaining - 30.0).abs() < 1e-10);
        assert!(r.advance(1.0, 1.0).is_none());

        let done = r.advance(2.0, 1.0).expect("completes on third tick");
        assert_eq!(done.finish, Some(3.0));
        assert!((done.remaining - 0.0).abs() < 1e-10);
        assert!((r.busy_time - 3.0).abs() < 1e-10);
        assert_eq!(r.completed, 1);
        assert!(r.is_idle());
    }

    #[test]
    fn test_idle_resource_accrues_nothing() {
        let mut r = Resource::new(0, 20.0);
        assert!(r.advance(0.0, 1.0).is_none());
        assert!((r.busy_time - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_completion_within_tolerance() {
        let mut r = Resource::new(0, 10.0);
        let mut task = Task::new(0, 0.0, 10);
        task.remaining = 10.0 + 1e-9;
        r.queue.push_back(task);

        assert!(r.advance(0.0, 1.0).is_some());
    }

    #[test]
    fn test_complete_head_propagates_start() {
        let mut r = Resource::new(0, 10.0);
        r.enqueue(Task::new(0, 0.0, 10), 0.0);
        r.queue.push_back(Task::new(1, 0.0, 10));

        let done = r.complete_head(4.0).unwrap();
        assert_eq!(done.finish, Some(4.0));
        assert_eq!(r.queue[0].start, Some(4.0));
    }

    #[test]
    fn test_complete_head_keeps_existing_start() {
        let mut r = Resource::new(0, 10.0);
        r.enqueue(Task::new(0, 0.0, 10), 0.0);
        r.enqueue(Task::new(1, 1.0, 10), 1.0);

        r.complete_head(4.0);
        assert_eq!(r.queue[0].start, Some(1.0));
    }

    #[test]
    fn test_head_time_to_finish() {
        let mut r = Resource::new(0, 25.0);
        assert!(r.head_time_to_finish().is_none());
        r.enqueue(Task::new(0, 0.0, 100), 0.0);
        assert!((r.head_time_to_finish().unwrap() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_pool_with_rates() {
        let pool = ResourcePool::with_rates(&[10.0, 20.0]).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.rates(), vec![10.0, 20.0]);
        assert_eq!(pool.get(1).unwrap().id, 1);
    }

    #[test]
    fn test_pool_rejects_non_positive_rate() {
        let err = ResourcePool::with_rates(&[10.0, 0.0]).unwrap_err();
        assert!(matches!(err, SimError::InvalidResourceRate { index: 1, .. }));

        let err = ResourcePool::with_rates(&[-3.0]).unwrap_err();
        assert!(matches!(err, SimError::InvalidResourceRate { index: 0, .. }));

        assert!(ResourcePool::with_rates(&[f64::NAN]).is_err());
    }

    #[test]
    fn test_random_pool_rates_in_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        let pool = ResourcePool::random(50, 10.0..30.0, &mut rng);

        assert_eq!(pool.len(), 50);
        for r in pool.iter() {
            assert!(
                r.rate >= 10.0 && r.rate < 30.0,
                "rate {} out of range",
                r.rate
            );
        }
    }

    #[test]
    fn test_random_pool_deterministic() {
        let mut rng = SmallRng::seed_from_u64(7);
        let a = ResourcePool::random(6, 10.0..30.0, &mut rng);
        let mut rng = SmallRng::seed_from_u64(7);
        let b = ResourcePool::random(6, 10.0..30.0, &mut rng);
        assert_eq!(a.rates(), b.rates());
    }

    #[test]
    fn test_pool_advance_and_pending() {
        let mut pool = ResourcePool::with_rates(&[100.0, 10.0]).unwrap();
        pool.assign(Task::new(0, 0.0, 50), 0, 0.0);
        pool.assign(Task::new(1, 0.0, 50), 1, 0.0);
        assert_eq!(pool.queued_tasks(), 2);

        let done = pool.advance(0.0, 1.0);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, 0);
        assert!(pool.has_pending_work());
        assert!((pool.total_busy_time() - 2.0).abs() < 1e-10);
    }
}
