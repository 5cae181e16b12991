//! Task model.
//!
//! A task is a unit of work with an arrival time and a size in abstract
//! work units. It is created once by the workload generator and then
//! moves between the engine's waiting pool, a resource queue, and the
//! completed set. It is never destroyed.
//!
//! # Time Representation
//! All times are in simulation time units relative to t=0.

use serde::{Deserialize, Serialize};

/// A unit of work submitted to the resource pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Sequential task identifier (generation order).
    pub id: u64,
    /// Arrival time.
    pub arrival: f64,
    /// Total size in work units.
    pub size: u32,
    /// Work units still to be processed.
    pub remaining: f64,
    /// Scheduled start time. `None` until the task is assigned.
    pub start: Option<f64>,
    /// Completion time. `None` until the task completes.
    pub finish: Option<f64>,
    /// Index of the resource the task was assigned to.
    pub assigned_resource: Option<usize>,
}

impl Task {
    /// Creates an unscheduled task with all of its work remaining.
    pub fn new(id: u64, arrival: f64, size: u32) -> Self {
        Self {
            id,
            arrival,
            size,
            remaining: f64::from(size),
            start: None,
            finish: None,
            assigned_resource: None,
        }
    }

    /// Total work as a float.
    pub fn work(&self) -> f64 {
        f64::from(self.size)
    }

    /// Time from arrival to completion, if completed.
    pub fn response_time(&self) -> Option<f64> {
        self.finish.map(|f| f - self.arrival)
    }

    /// Whether the task has a finish time.
    pub fn is_completed(&self) -> bool {
        self.finish.is_some()
    }

    /// Whether a strategy has placed this task on a resource.
    pub fn is_assigned(&self) -> bool {
        self.assigned_resource.is_some()
    }
}
