//! Task records, allocation and policies.

mod manager;
pub mod policy;
mod task;

pub use manager::TaskManager;
pub use policy::{
    CapacityAwarePolicy, ChargeCandidate, ChargingPolicy, FirstStation, NearestStation, QueueWeighted,
    StationSelector, ThresholdPolicy,
};
pub use task::{Task, TaskId, TaskTarget};
