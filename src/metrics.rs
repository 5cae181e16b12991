//! Run metrics.
//!
//! Reduces the completed-task set and resource state into summary
//! statistics once a simulation terminates.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Avg Response Time | mean(finish − arrival) |
//! | Makespan | max(finish) − min(arrival) |
//! | Throughput | completed / T |
//! | Utilization | Σ busy time / (N · T) |
//!
//! `T` is total elapsed time: the end of the tick loop plus drain time.
//! With no completed tasks every metric is `None`.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};

use crate::models::{Resource, ResourcePool, Task};

/// Summary of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Tasks produced by the workload generator.
    pub tasks_submitted: usize,
    /// Tasks that reached completion.
    pub tasks_completed: usize,
    /// Mean response time. `None` if nothing completed.
    pub avg_response_time: Option<f64>,
    /// Latest finish minus earliest arrival. `None` if nothing completed.
    pub makespan: Option<f64>,
    /// Completions per time unit. `None` if nothing completed.
    pub throughput: Option<f64>,
    /// Pool-wide busy fraction in `[0, 1]`. `None` if nothing completed.
    pub utilization: Option<f64>,
}

impl MetricsRecord {
    /// Record for a run in which no task completed.
    pub fn undefined(tasks_submitted: usize) -> Self {
        Self {
            tasks_submitted,
            tasks_completed: 0,
            avg_response_time: None,
            makespan: None,
            throughput: None,
            utilization: None,
        }
    }

    /// Computes metrics from completed tasks and final resource state.
    ///
    /// # Arguments
    /// * `completed` - Tasks with finish times set.
    /// * `pool` - Resource pool after the run (for busy time).
    /// * `elapsed` - Total elapsed time `T`.
    /// * `tasks_submitted` - Number of generated tasks.
    pub fn calculate(
        completed: &[Task],
        pool: &ResourcePool,
        elapsed: f64,
        tasks_submitted: usize,
    ) -> Self {
        if completed.is_empty() {
            return Self::undefined(tasks_submitted);
        }

        let mut total_response = 0.0;
        let mut latest_finish = f64::NEG_INFINITY;
        let mut earliest_arrival = f64::INFINITY;

        for task in completed {
            let finish = task.finish.unwrap_or(task.arrival);
            total_response += finish - task.arrival;
            latest_finish = latest_finish.max(finish);
            earliest_arrival = earliest_arrival.min(task.arrival);
        }

        let count = completed.len() as f64;
        let capacity = pool.len() as f64 * elapsed;

        Self {
            tasks_submitted,
            tasks_completed: completed.len(),
            avg_response_time: Some(total_response / count),
            makespan: Some(latest_finish - earliest_arrival),
            throughput: Some(count / elapsed),
            utilization: Some(pool.total_busy_time() / capacity),
        }
    }

    /// Whether the rate metrics are defined.
    pub fn is_defined(&self) -> bool {
        self.tasks_completed > 0
    }
}

/// Per-resource outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    /// Resource index.
    pub id: usize,
    /// Processing rate.
    pub rate: f64,
    /// Cumulative busy time.
    pub busy_time: f64,
    /// Tasks completed on this resource.
    pub tasks_completed: usize,
    /// `busy_time / T`. `None` when `T` is zero.
    pub utilization: Option<f64>,
}

impl ResourceSummary {
    /// Summarizes one resource over elapsed time `elapsed`.
    pub fn from_resource(resource: &Resource, elapsed: f64) -> Self {
        Self {
            id: resource.id,
            rate: resource.rate,
            busy_time: resource.busy_time,
            tasks_completed: resource.completed,
            utilization: (elapsed > 0.0).then(|| resource.busy_time / elapsed),
        }
    }
}
