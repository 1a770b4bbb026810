//! Planner parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::{DwaError, MAX_TRAJECTORY_STEPS};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the DWA planner.
///
/// Any parameter missing from the parameter file takes its default value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    // ---- VELOCITY LIMITS ----

    /// Cruise speed the planner tries to match.
    ///
    /// Units: meters/second
    pub target_velocity_ms: f64,

    /// Units: meters/second
    pub max_velocity_ms: f64,

    /// Units: meters/second
    pub min_velocity_ms: f64,

    /// Maximum absolute yaw rate.
    ///
    /// Units: radians/second
    pub max_yawrate_rads: f64,

    /// Units: meters/second^2
    pub max_accel_mss: f64,

    /// Units: radians/second^2
    pub max_yaw_accel_radss: f64,

    // ---- TIMING ----

    /// Period over which the acceleration limits are applied when computing the dynamic window.
    ///
    /// Units: seconds
    pub control_period_s: f64,

    /// Prediction horizon of each candidate trajectory.
    ///
    /// Units: seconds
    pub predict_time_s: f64,

    /// Integration step of the trajectory simulation.
    ///
    /// Units: seconds
    pub sim_step_s: f64,

    // ---- SAMPLING ----

    /// Number of intervals the velocity axis of the window is split into
    pub velocity_samples: usize,

    /// Number of intervals the yaw rate axis of the window is split into
    pub yawrate_samples: usize,

    // ---- COSTS ----

    pub to_goal_cost_gain: f64,

    pub speed_cost_gain: f64,

    pub obs_cost_gain: f64,

    // ---- MODE SWITCHING ----

    /// Distance under which the goal position is considered reached.
    ///
    /// Units: meters
    pub goal_threshold_m: f64,

    /// Goal heading error above which the robot turns on the spot once the goal position has
    /// been reached.
    ///
    /// Units: radians
    pub turn_direction_threshold_rad: f64,

    /// Bearing to the goal above which the robot turns on the spot to face it before searching.
    ///
    /// Units: radians
    pub angle_to_goal_threshold_rad: f64,

    // ---- OBSTACLES ----

    /// Source of the obstacle set.
    pub obstacle_source: ObstacleSource,

    /// Angular spacing of the rays cast through the occupancy grid.
    ///
    /// Units: radians
    pub angle_resolution_rad: f64,

    /// If true scan ranges which are not finite or outside the scan's valid range are dropped.
    pub filter_scan_ranges: bool,

    // ---- FOOTPRINT ----

    /// If true clearance is measured to the robot footprint instead of its centre.
    pub use_footprint: bool,

    /// Static footprint, `[x, y]` vertices in meters. May be replaced at runtime.
    pub footprint: Option<Vec<[f64; 2]>>,

    // ---- WATCHDOG ----

    /// Number of consecutive cycles an input may go without an update before motion is refused.
    pub stale_count_threshold: u32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Where obstacles are extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleSource {
    /// Planar range scans
    Scan,

    /// Occupancy grids
    Grid,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            target_velocity_ms: 0.8,
            max_velocity_ms: 1.0,
            min_velocity_ms: 0.0,
            max_yawrate_rads: 0.8,
            max_accel_mss: 1.0,
            max_yaw_accel_radss: 2.0,
            control_period_s: 0.1,
            predict_time_s: 3.0,
            sim_step_s: 0.1,
            velocity_samples: 3,
            yawrate_samples: 20,
            to_goal_cost_gain: 1.0,
            speed_cost_gain: 1.0,
            obs_cost_gain: 1.0,
            goal_threshold_m: 0.3,
            turn_direction_threshold_rad: 1.0,
            angle_to_goal_threshold_rad: std::f64::consts::PI,
            obstacle_source: ObstacleSource::Grid,
            angle_resolution_rad: 0.2,
            filter_scan_ranges: true,
            use_footprint: false,
            footprint: None,
            stale_count_threshold: 3,
        }
    }
}

impl Params {
    /// Check the parameters describe a usable planner.
    pub fn validate(&self) -> Result<(), DwaError> {
        let positive = [
            ("max_accel_mss", self.max_accel_mss),
            ("max_yaw_accel_radss", self.max_yaw_accel_radss),
            ("control_period_s", self.control_period_s),
            ("predict_time_s", self.predict_time_s),
            ("sim_step_s", self.sim_step_s),
            ("angle_resolution_rad", self.angle_resolution_rad),
        ];

        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(DwaError::InvalidParams(format!(
                    "{} must be finite and greater than zero, found {}", name, value
                )));
            }
        }

        if self.predict_time_s / self.sim_step_s > MAX_TRAJECTORY_STEPS as f64 {
            return Err(DwaError::InvalidParams(format!(
                "predict_time_s / sim_step_s must not exceed {}, found {} / {}",
                MAX_TRAJECTORY_STEPS,
                self.predict_time_s,
                self.sim_step_s
            )));
        }

        if !(self.max_yawrate_rads.is_finite() && self.max_yawrate_rads >= 0.0) {
            return Err(DwaError::InvalidParams(format!(
                "max_yawrate_rads must be finite and positive, found {}", self.max_yawrate_rads
            )));
        }

        if !(self.min_velocity_ms <= self.max_velocity_ms) {
            return Err(DwaError::InvalidParams(format!(
                "min_velocity_ms ({}) must not exceed max_velocity_ms ({})",
                self.min_velocity_ms,
                self.max_velocity_ms
            )));
        }

        if self.velocity_samples == 0 || self.yawrate_samples == 0 {
            return Err(DwaError::InvalidParams(String::from(
                "velocity_samples and yawrate_samples must be at least 1"
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
