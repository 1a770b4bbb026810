//! # Velocity command

use serde::{Deserialize, Serialize};

/// Velocity demand sent to the robot base.
///
/// The default value is the neutral (stop) command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    /// Units: meters/second
    pub linear_ms: f64,

    /// Units: radians/second
    pub angular_rads: f64,
}

impl Twist {
    pub fn new(linear_ms: f64, angular_rads: f64) -> Self {
        Self {
            linear_ms,
            angular_rads,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.linear_ms == 0.0 && self.angular_rads == 0.0
    }
}
