//! Shared work targets and charging stations.
//!
//! All entities live in [`ResourceRegistry`] and refer to each other by id.

mod crop;
mod registry;
mod station;

pub use crop::{Crop, CropRow, CropState};
pub use registry::ResourceRegistry;
pub use station::ChargingStation;
