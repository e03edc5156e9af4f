//! Kshetra: fleet coordination for field robots.
//!
//! Agents scan and process crops laid out in rows, share charging stations
//! and navigate an obstacle field over a convex-cell navigation mesh.
//!
//! ## Modules
//!
//! - [`core`]: points, poses, polygons and angle math
//! - [`navmesh`]: mesh construction and shortest paths
//! - [`energy`]: battery, differential-drive kinematics, calendar clock
//! - [`resources`]: crops, rows with exclusive claims, station queues
//! - [`tasks`]: task allocation with pluggable charging and station policies
//! - [`agent`]: per-agent state machine and motion control
//! - [`world`], [`simulation`], [`scenario`]: the tick loop and its inputs
//!
//! ## Quick Start
//!
//! ```no_run
//! use kshetra::{SimConfig, Simulation};
//!
//! let mut sim = Simulation::from_config(SimConfig::default())?;
//! let summary = sim.run(50_000)?;
//! println!("{}/{} crops processed", summary.processed_crops, summary.total_crops);
//! # Ok::<(), kshetra::KshetraError>(())
//! ```

pub mod agent;
pub mod config;
pub mod core;
pub mod energy;
pub mod error;
pub mod ids;
pub mod navmesh;
pub mod resources;
pub mod scenario;
pub mod simulation;
pub mod tasks;
pub mod world;

pub use agent::{Agent, AgentState};
pub use config::SimConfig;
pub use crate::core::{Point2D, Polygon, Pose2D};
pub use error::{KshetraError, Result};
pub use ids::{AgentId, CropId, RowId, StationId};
pub use navmesh::{NavMesh, Path};
pub use scenario::{Scenario, ScenarioLayout};
pub use simulation::{RunSummary, Simulation};
pub use tasks::{Task, TaskManager, TaskTarget};
pub use world::World;
