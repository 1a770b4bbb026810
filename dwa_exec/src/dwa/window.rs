//! Dynamic window calculation and sampling

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Params, EPSILON};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The box of velocities reachable within one control period.
///
/// `min <= max` holds on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Window {
    /// Units: meters/second
    pub min_velocity_ms: f64,

    /// Units: meters/second
    pub max_velocity_ms: f64,

    /// Units: radians/second
    pub min_yawrate_rads: f64,

    /// Units: radians/second
    pub max_yawrate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Window {
    /// Calculate the dynamic window around the current velocity.
    pub fn calculate(velocity_ms: f64, yawrate_rads: f64, params: &Params) -> Self {
        let dt = params.control_period_s;

        let (min_velocity_ms, max_velocity_ms) = window_axis(
            velocity_ms,
            params.max_accel_mss * dt,
            params.min_velocity_ms,
            params.max_velocity_ms,
        );
        let (min_yawrate_rads, max_yawrate_rads) = window_axis(
            yawrate_rads,
            params.max_yaw_accel_radss * dt,
            -params.max_yawrate_rads,
            params.max_yawrate_rads,
        );

        Self {
            min_velocity_ms,
            max_velocity_ms,
            min_yawrate_rads,
            max_yawrate_rads,
        }
    }

    /// Returns true if zero yaw rate is strictly inside the window.
    pub fn straddles_zero_yawrate(&self) -> bool {
        self.min_yawrate_rads < 0.0 && 0.0 < self.max_yawrate_rads
    }

    /// Velocity samples, in ascending order.
    pub fn velocity_samples(&self, num_intervals: usize) -> Vec<f64> {
        axis_samples(self.min_velocity_ms, self.max_velocity_ms, num_intervals)
    }

    /// Yaw rate samples, in ascending order.
    pub fn yawrate_samples(&self, num_intervals: usize) -> Vec<f64> {
        axis_samples(self.min_yawrate_rads, self.max_yawrate_rads, num_intervals)
    }
}

/// Compute one axis of the window.
///
/// If the current value is so far outside the limits that the bounds would cross, the axis
/// collapses onto the nearest limit.
fn window_axis(current: f64, max_change: f64, lower_limit: f64, upper_limit: f64) -> (f64, f64) {
    let min = (current - max_change).max(lower_limit);
    let max = (current + max_change).min(upper_limit);

    if min <= max {
        (min, max)
    }
    else {
        let collapsed = clamp(&current, &lower_limit, &upper_limit);
        (collapsed, collapsed)
    }
}

/// Split `[min, max]` into `num_intervals` equal intervals and return the interval bounds.
///
/// Samples are computed from an integer index so that the upper bound is always included. An axis
/// narrower than `EPSILON` gives the single sample `min`.
fn axis_samples(min: f64, max: f64, num_intervals: usize) -> Vec<f64> {
    let width = max - min;

    if width < EPSILON || num_intervals == 0 {
        return vec![min];
    }

    let step = width / num_intervals as f64;

    (0..=num_intervals)
        .map(|i| {
            if i == num_intervals {
                max
            }
            else {
                min + step * i as f64
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
