//! # Communications interface crate.
//!
//! Provides the data contracts exchanged between the planner executive and its external
//! collaborators: the inputs fed to the planner, the velocity command it produces, and the
//! visualisation payloads describing what it considered.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Input messages (goal, odometry, obstacle sources, footprint, overrides)
pub mod msg;

/// Velocity command output
pub mod cmd;

/// Visualisation markers for candidate and selected trajectories
pub mod viz;
