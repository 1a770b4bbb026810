//! # Input messages
//!
//! Every message the planner can receive is wrapped in an [`InputMsg`]. Messages are exchanged as
//! JSON objects of the form `{"type": "GOAL", "payload": {...}}`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::{self, Value};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A goal pose for the local planner.
///
/// The pose is expressed in `frame_id`, which must be transformed into the robot frame before the
/// planner can use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalMsg {
    /// The frame the pose is expressed in
    pub frame_id: String,

    /// Units: meters
    pub x: f64,

    /// Units: meters
    pub y: f64,

    /// Units: radians
    pub yaw: f64,
}

/// Current velocity of the robot as measured by odometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OdometryMsg {
    /// Forward speed of the robot body.
    ///
    /// Units: meters/second
    pub linear_ms: f64,

    /// Yaw rate of the robot body.
    ///
    /// Units: radians/second
    pub angular_rads: f64,
}

/// A planar range scan expressed in the robot frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScanMsg {
    /// Angle of the first range reading.
    ///
    /// Units: radians
    pub angle_min: f64,

    /// Angle between two consecutive readings.
    ///
    /// Units: radians
    pub angle_increment: f64,

    /// Minimum valid range, if the sensor reports one.
    ///
    /// Units: meters
    #[serde(default)]
    pub range_min: Option<f64>,

    /// Maximum valid range, if the sensor reports one.
    ///
    /// Units: meters
    #[serde(default)]
    pub range_max: Option<f64>,

    /// Range readings.
    ///
    /// Units: meters
    pub ranges: Vec<f64>,
}

/// A row-major occupancy grid centred around the robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyGridMsg {
    /// Edge length of a cell.
    ///
    /// Units: meters
    pub resolution: f64,

    /// Position of the corner of cell (0, 0) in the robot frame.
    ///
    /// Units: meters
    pub origin_x: f64,

    /// Units: meters
    pub origin_y: f64,

    /// Number of cells along the X axis
    pub width: usize,

    /// Number of cells along the Y axis
    pub height: usize,

    /// Cell values, `OCCUPIED` marks an occupied cell, index is `x + y * width`.
    pub data: Vec<i8>,
}

/// The robot outline in robot-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintMsg {
    /// Polygon vertices in order, each `[x, y]` in meters.
    pub points: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// All messages which can be fed into the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum InputMsg {
    #[serde(rename = "GOAL")]
    Goal(GoalMsg),

    #[serde(rename = "ODOM")]
    Odometry(OdometryMsg),

    #[serde(rename = "SCAN")]
    Scan(LaserScanMsg),

    #[serde(rename = "GRID")]
    Grid(OccupancyGridMsg),

    #[serde(rename = "FOOTPRINT")]
    Footprint(FootprintMsg),

    /// Live override of the cruise velocity, m/s
    #[serde(rename = "TARGET_VELOCITY")]
    TargetVelocity(f64),

    /// Live override of the goal distance threshold, m
    #[serde(rename = "GOAL_THRESHOLD")]
    GoalThreshold(f64),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum InputParseError {
    #[error("Input contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("Input has an invalid type ({0})")]
    InvalidType(String),

    #[error("Input of type {0} has an invalid payload: {1}")]
    InvalidPayload(String, serde_json::Error),
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Cell value of an occupied grid cell.
pub const OCCUPIED: i8 = 100;

/// Accepted values of the `type` field.
const INPUT_TYPES: [&str; 7] = [
    "GOAL",
    "ODOM",
    "SCAN",
    "GRID",
    "FOOTPRINT",
    "TARGET_VELOCITY",
    "GOAL_THRESHOLD",
];

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl InputMsg {
    /// Parse a new input from a JSON packet.
    ///
    /// The type is checked separately from the payload so that the error tells which of the two is
    /// at fault.
    pub fn from_json(json_str: &str) -> Result<Self, InputParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(InputParseError::InvalidJson)?;

        let input_type = match val["type"].as_str() {
            Some(s) => s.to_string(),
            None => {
                return Err(InputParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        if !INPUT_TYPES.contains(&input_type.as_str()) {
            return Err(InputParseError::InvalidType(format!(
                "{} is not a recognised input type",
                input_type
            )));
        }

        serde_json::from_value(val).map_err(|e| InputParseError::InvalidPayload(input_type, e))
    }

    /// Short name of the input, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            InputMsg::Goal(_) => "goal",
            InputMsg::Odometry(_) => "odometry",
            InputMsg::Scan(_) => "scan",
            InputMsg::Grid(_) => "grid",
            InputMsg::Footprint(_) => "footprint",
            InputMsg::TargetVelocity(_) => "target velocity",
            InputMsg::GoalThreshold(_) => "goal threshold",
        }
    }
}

impl OccupancyGridMsg {
    /// Value of the cell at the given index, or `None` if outside the grid.
    pub fn cell(&self, index_x: i64, index_y: i64) -> Option<i8> {
        if index_x < 0
            || index_y < 0
            || index_x >= self.width as i64
            || index_y >= self.height as i64
        {
            return None;
        }

        self.data
            .get(index_x as usize + index_y as usize * self.width)
            .copied()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_goal() {
        let msg = InputMsg::from_json(
            r#"{"type": "GOAL", "payload": {"frame_id": "base_link", "x": 5.0, "y": 0.0, "yaw": 0.0}}"#,
        )
        .unwrap();

        assert_eq!(
            msg,
            InputMsg::Goal(GoalMsg {
                frame_id: "base_link".into(),
                x: 5.0,
                y: 0.0,
                yaw: 0.0
            })
        );
    }

    #[test]
    fn test_parse_override() {
        let msg = InputMsg::from_json(r#"{"type": "TARGET_VELOCITY", "payload": 0.4}"#).unwrap();
        assert_eq!(msg, InputMsg::TargetVelocity(0.4));
    }

    #[test]
    fn test_parse_scan_without_limits() {
        let msg = InputMsg::from_json(
            r#"{"type": "SCAN", "payload": {"angle_min": -1.0, "angle_increment": 0.5, "ranges": [1.0, 2.0]}}"#,
        )
        .unwrap();

        match msg {
            InputMsg::Scan(s) => {
                assert_eq!(s.range_min, None);
                assert_eq!(s.ranges.len(), 2);
            }
            _ => panic!("Expected a scan"),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            InputMsg::from_json("not json"),
            Err(InputParseError::InvalidJson(_))
        ));
        assert!(matches!(
            InputMsg::from_json(r#"{"type": "LIDAR", "payload": {}}"#),
            Err(InputParseError::InvalidType(_))
        ));
        assert!(matches!(
            InputMsg::from_json(r#"{"type": "ODOM", "payload": {"linear_ms": 1.0}}"#),
            Err(InputParseError::InvalidPayload(_, _))
        ));
    }

    #[test]
    fn test_grid_cell() {
        let grid = OccupancyGridMsg {
            resolution: 1.0,
            origin_x: -1.0,
            origin_y: -1.0,
            width: 2,
            height: 2,
            data: vec![0, 0, OCCUPIED, 0],
        };

        assert_eq!(grid.cell(0, 1), Some(OCCUPIED));
        assert_eq!(grid.cell(1, 1), Some(0));
        assert_eq!(grid.cell(2, 0), None);
        assert_eq!(grid.cell(-1, 0), None);
    }
}
