//! Simulation domain models.
//!
//! Tasks flow through a fixed pool of heterogeneous resources:
//! not yet arrived → waiting → queued on a resource → completed.
//!
//! # Domain Mappings
//!
//! | lb-sim | Cloud | Manufacturing | Networking |
//! |--------|-------|---------------|------------|
//! | Task | Request/Job | Work Order | Flow |
//! | Resource | VM/Host | Machine | Link/Server |
//! | ResourcePool | Cluster | Shop Floor | Server Farm |

mod resource;
mod task;

pub use resource::{Resource, ResourcePool, COMPLETION_TOLERANCE};
pub use task::Task;
