//! Trajectory generation
//!
//! Trajectories are generated by integrating a unicycle model from the origin of the robot frame
//! with a constant velocity and yaw rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Point2;
use serde::Serialize;

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the horizon/step division so that e.g. 3.0/0.1 counts 30 whole steps.
const STEP_COUNT_TOLERANCE: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A pose of the robot together with the velocity which produced it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RobotState {
    /// Units: meters
    pub x_m: f64,

    /// Units: meters
    pub y_m: f64,

    /// Units: radians
    pub yaw_rad: f64,

    /// Units: meters/second
    pub velocity_ms: f64,

    /// Units: radians/second
    pub yawrate_rads: f64,
}

/// A simulated trajectory.
///
/// A trajectory always contains at least one state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    states: Vec<RobotState>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RobotState {
    /// Advance the state by one integration step.
    pub fn step(&self, velocity_ms: f64, yawrate_rads: f64, dt_s: f64) -> Self {
        let yaw_rad = self.yaw_rad + yawrate_rads * dt_s;

        Self {
            x_m: self.x_m + velocity_ms * yaw_rad.cos() * dt_s,
            y_m: self.y_m + velocity_ms * yaw_rad.sin() * dt_s,
            yaw_rad,
            velocity_ms,
            yawrate_rads,
        }
    }

    pub fn position(&self) -> Point2<f64> {
        Point2::new(self.x_m, self.y_m)
    }
}

impl Trajectory {
    /// Simulate the robot driving at a constant velocity and yaw rate over the prediction
    /// horizon.
    ///
    /// A state is recorded after each integration step, giving `num_states` states.
    pub fn generate(velocity_ms: f64, yawrate_rads: f64, params: &Params) -> Self {
        let num_states = num_states(params.predict_time_s, params.sim_step_s);

        let mut states = Vec::with_capacity(num_states);
        let mut state = RobotState::default();

        for _ in 0..num_states {
            state = state.step(velocity_ms, yawrate_rads, params.sim_step_s);
            states.push(state);
        }

        Self { states }
    }

    /// A trajectory with every state at the origin with zero velocity.
    pub fn stationary(params: &Params) -> Self {
        Self::generate(0.0, 0.0, params)
    }

    pub fn states(&self) -> &[RobotState] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// The first state, the one whose velocity is commanded.
    pub fn first(&self) -> &RobotState {
        &self.states[0]
    }

    pub fn last(&self) -> &RobotState {
        &self.states[self.states.len() - 1]
    }

    /// Vertices of the trajectory, `[x, y]` in meters.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.states.iter().map(|s| [s.x_m, s.y_m]).collect()
    }
}

/// Number of states in a trajectory over `horizon_s` with a `step_s` integration step.
///
/// This is `floor(horizon_s / step_s) + 1`, never less than one.
pub fn num_states(horizon_s: f64, step_s: f64) -> usize {
    if !(horizon_s.is_finite() && step_s.is_finite() && step_s > 0.0 && horizon_s >= 0.0) {
        return 1;
    }

    ((horizon_s / step_s + STEP_COUNT_TOLERANCE).floor() as usize).saturating_add(1)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_num_states() {
        assert_eq!(num_states(3.0, 0.1), 31);
        assert_eq!(num_states(1.0, 0.3), 4);
        assert_eq!(num_states(0.0, 0.1), 1);
        assert_eq!(num_states(1.0, 0.0), 1);
    }

    #[test]
    fn test_stationary() {
        let params = Params::default();
        let traj = Trajectory::generate(0.0, 0.0, &params);

        assert_eq!(traj.len(), 31);
        for s in traj.states() {
            assert_eq!(*s, RobotState::default());
        }
    }

    #[test]
    fn test_straight_and_turning() {
        let params = Params::default();

        let straight = Trajectory::generate(1.0, 0.0, &params);
        assert!((straight.last().x_m - 3.1).abs() < 1e-9);
        assert!(straight.last().y_m.abs() < 1e-12);
        assert_eq!(straight.first().velocity_ms, 1.0);

        // Yaw is updated before position, so the first step already curves
        let turning = Trajectory::generate(1.0, 0.5, &params);
        assert!(turning.first().y_m > 0.0);
        assert!((turning.last().yaw_rad - 0.5 * 0.1 * 31.0).abs() < 1e-9);
        assert!(turning.states().iter().all(|s| s.yawrate_rads == 0.5));
    }
}
