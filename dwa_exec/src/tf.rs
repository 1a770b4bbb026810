//! # Goal frame transforms
//!
//! Goals may be given in any frame with a known static transform to the robot frame. The planner
//! itself only ever sees goals in the robot frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry2, Point2, Vector2};
use std::collections::HashMap;
use thiserror::Error;

// Internal
use crate::{dwa::Goal, params::StaticTransform};
use comms_if::msg::GoalMsg;
use util::maths::wrap_pi;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Set of fixed transforms into the robot frame, keyed by source frame.
#[derive(Debug, Clone)]
pub struct TfTree {
    robot_frame: String,

    /// Transforms taking points in the keyed frame into the robot frame
    to_robot: HashMap<String, Isometry2<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TfError {
    #[error("No transform from frame \"{0}\" into the robot frame \"{1}\"")]
    UnknownFrame(String, String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TfTree {
    pub fn new(robot_frame: &str, transforms: &[StaticTransform]) -> Self {
        let mut to_robot = HashMap::new();

        to_robot.insert(robot_frame.to_string(), Isometry2::identity());

        for t in transforms {
            // The parameters give the robot's pose in the frame, invert it to go the other way
            let robot_in_frame = Isometry2::new(Vector2::new(t.x_m, t.y_m), t.yaw_rad);
            to_robot.insert(t.frame_id.clone(), robot_in_frame.inverse());
        }

        Self {
            robot_frame: robot_frame.to_string(),
            to_robot,
        }
    }

    pub fn robot_frame(&self) -> &str {
        &self.robot_frame
    }

    /// Express a goal in the robot frame.
    pub fn goal_in_robot(&self, goal: &GoalMsg) -> Result<Goal, TfError> {
        let iso = self.to_robot.get(&goal.frame_id).ok_or_else(|| {
            TfError::UnknownFrame(goal.frame_id.clone(), self.robot_frame.clone())
        })?;

        let position = iso * Point2::new(goal.x, goal.y);

        Ok(Goal::new(
            position.x,
            position.y,
            wrap_pi(goal.yaw + iso.rotation.angle()),
        ))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn goal(frame_id: &str, x: f64, y: f64, yaw: f64) -> GoalMsg {
        GoalMsg {
            frame_id: frame_id.to_string(),
            x,
            y,
            yaw,
        }
    }

    #[test]
    fn test_robot_frame_is_identity() {
        let tf = TfTree::new("base_link", &[]);

        let g = tf.goal_in_robot(&goal("base_link", 5.0, -1.0, 0.3)).unwrap();
        assert_eq!(g.x_m, 5.0);
        assert_eq!(g.y_m, -1.0);
        assert!((g.yaw_rad - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_static_transform() {
        let tf = TfTree::new(
            "base_link",
            &[StaticTransform {
                frame_id: String::from("odom"),
                x_m: 1.0,
                y_m: 2.0,
                yaw_rad: FRAC_PI_2,
            }],
        );

        // Directly ahead of the robot, facing the same way
        let g = tf.goal_in_robot(&goal("odom", 1.0, 3.0, FRAC_PI_2)).unwrap();
        assert!((g.x_m - 1.0).abs() < 1e-12);
        assert!(g.y_m.abs() < 1e-12);
        assert!(g.yaw_rad.abs() < 1e-12);

        // Heading is wrapped
        let g = tf.goal_in_robot(&goal("odom", 1.0, 2.0, -2.0)).unwrap();
        assert!((g.yaw_rad - (-2.0 - FRAC_PI_2 + std::f64::consts::TAU)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_frame() {
        let tf = TfTree::new("base_link", &[]);

        assert_eq!(
            tf.goal_in_robot(&goal("map", 0.0, 0.0, 0.0)),
            Err(TfError::UnknownFrame(String::from("map"), String::from("base_link")))
        );
    }
}
