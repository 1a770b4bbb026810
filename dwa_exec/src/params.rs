//! # DWA Executable Parameters
//!
//! This module provide parameters for the planner executable, as opposed to the planner itself
//! which is configured by [`crate::dwa::Params`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DwaExecParams {

    /// Name of the robot frame, goals are transformed into it and all outputs are expressed in it
    pub robot_frame: String,

    /// Frequency of the control loop.
    ///
    /// Units: hertz
    pub cycle_frequency_hz: f64,

    /// Planner parameter file, relative to the params directory
    pub planner_params_file: String,

    /// Fixed transforms from other frames into the robot frame
    #[serde(default)]
    pub static_transforms: Vec<StaticTransform>,

    /// Input script run if none is given on the command line
    #[serde(default)]
    pub default_script: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest difference between the loop period and the planner's control period which is still
/// considered a match.
///
/// Units: seconds
const PERIOD_TOLERANCE_S: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DwaExecParams {
    /// Period of the control loop.
    ///
    /// Units: seconds
    pub fn cycle_period_s(&self) -> f64 {
        1.0 / self.cycle_frequency_hz
    }

    /// Returns true if the loop runs at the period the dynamic window is computed over.
    pub fn matches_control_period(&self, control_period_s: f64) -> bool {
        (self.cycle_period_s() - control_period_s).abs() <= PERIOD_TOLERANCE_S
    }
}

/// Pose of the robot frame in another frame.
///
/// A point `p` in `frame_id` is at `R(-yaw) * (p - [x, y])` in the robot frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTransform {
    pub frame_id: String,

    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Units: radians
    pub yaw_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_control_period_match() {
        let params: DwaExecParams = util::params::from_str(
            "robot_frame = \"base_link\"\ncycle_frequency_hz = 10.0\nplanner_params_file = \"dwa.toml\"\n"
        ).unwrap();

        assert!((params.cycle_period_s() - 0.1).abs() < 1e-12);
        assert!(params.matches_control_period(0.1));
        assert!(!params.matches_control_period(0.05));
        assert!(params.static_transforms.is_empty());
    }
}
