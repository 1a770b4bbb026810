//! # Dynamic Window Approach local planner
//!
//! The planner picks a velocity command for the robot each cycle so that it makes progress
//! towards a goal pose expressed in the robot frame while keeping clear of obstacles.
//!
//! Each cycle the planner:
//!
//!  1. Computes the dynamic window, the box of (velocity, yaw rate) pairs the robot can reach
//!     within one control period given its acceleration limits.
//!  2. Samples the window on a regular grid and forward simulates a unicycle model for each
//!     sample over the prediction horizon, giving a candidate trajectory.
//!  3. Scores each candidate on the distance from its end to the goal, how close its speed is to
//!     the target speed, and its clearance from the nearest obstacle.
//!  4. Commands the first step of the cheapest candidate which does not collide.
//!
//! Around the search sits a small mode machine (see [`PlannerMode`]) which turns the robot on
//! the spot when the goal is far off its heading, and aligns with the goal heading once the goal
//! position has been reached.
//!
//! All quantities are in the robot frame: X forwards, Y to the left, yaw anticlockwise.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod cost;
pub mod footprint;
pub mod obstacles;
pub mod params;
pub mod state;
pub mod traj;
pub mod viz;
pub mod window;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use cost::*;
pub use footprint::*;
pub use obstacles::*;
pub use params::*;
pub use state::*;
pub use traj::*;
pub use window::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance below which a distance or window width is considered zero.
pub const EPSILON: f64 = f64::EPSILON;

/// Obstacle cost assigned to a trajectory which collides with an obstacle.
pub const COLLISION_COST: f64 = 1e6;

/// Distance returned when no footprint edge separates an obstacle from the robot centre.
pub const NO_INTERSECTION_DIST_M: f64 = 1e6;

/// Upper bound on the clearance of a trajectory, used when there are no obstacles.
pub const MAX_CLEARANCE_M: f64 = 1e3;

/// Largest number of integration steps in a trajectory.
pub const MAX_TRAJECTORY_STEPS: usize = 10_000;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during processing of the planner.
#[derive(Debug, thiserror::Error)]
pub enum DwaError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameter: {0}")]
    InvalidParams(String),

    #[error("The static footprint is invalid: {0}")]
    InvalidFootprint(FootprintError),

    #[error("Could not initialise the planner archives: {0}")]
    ArchiveInitError(String),

    #[error("The planner is configured to use a footprint but none has been received")]
    FootprintMissing,
}
