//! Core geometry types shared by every other module.
//!
//! - [`Point2D`]: 2D point / vector in meters (f64)
//! - [`Pose2D`]: position plus heading
//! - [`Polygon`] and [`Segment`]: simple polygons with counter-clockwise winding
//! - [`math`]: angle helpers and orientation predicates

pub mod math;
mod point;
mod polygon;
mod pose;

pub use math::{angle_diff, cross, normalize_angle};
pub use point::Point2D;
pub use polygon::{Polygon, Segment, densify};
pub(crate) use polygon::{is_convex_ring, signed_area};
pub use pose::Pose2D;
