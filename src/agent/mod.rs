//! Mobile agents.
//!
//! [`state::transition`] is a pure function over [`AgentState`] and an
//! [`AgentSnapshot`]; [`Agent::update`] gathers the snapshot, applies the
//! resulting effects and drives the kinematics.

mod controller;
mod machine;
pub mod state;

pub use controller::MotionController;
pub use machine::{Agent, StepOutcome};
pub use state::{AgentSnapshot, AgentState, Effect, Transition, transition};
