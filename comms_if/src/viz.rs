//! # Visualisation markers
//!
//! Trajectories are published as line strip markers. A marker batch is always a complete
//! replacement of the previous one: batches are padded to a fixed number of slots with
//! [`MarkerAction::Delete`] markers so that entries from a larger previous batch are removed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of slots in a candidate trajectory marker batch.
pub const MAX_CANDIDATE_MARKERS: usize = 1000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Frame and time a marker refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub frame_id: String,
    pub stamp: DateTime<Utc>,
}

/// RGBA colour, each channel in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

/// A single line strip marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub header: Header,

    /// Namespace of the marker, together with `id` identifies the slot
    pub ns: String,

    pub id: usize,

    pub action: MarkerAction,

    pub color: Color,

    /// Line width.
    ///
    /// Units: meters
    pub scale: f64,

    /// Vertices of the line strip, `[x, y]` in meters.
    pub points: Vec<[f64; 2]>,
}

/// A batch of markers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

/// A closed polygon, used for the predicted footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub header: Header,

    /// Vertices, `[x, y]` in meters.
    pub points: Vec<[f64; 2]>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What produced a batch of candidate trajectories, used to colour code them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrajectoryKind {
    /// Candidates of a dynamic window search
    Search,

    /// Every search candidate collided and a stop was forced
    ForcedStop,

    /// A single in-place manoeuvre (rotation, alignment or stop)
    Maneuver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerAction {
    Add,
    Delete,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Header {
    /// Header stamped with the current time.
    pub fn now(frame_id: &str) -> Self {
        Self {
            frame_id: frame_id.to_string(),
            stamp: Utc::now(),
        }
    }
}

impl Color {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl MarkerArray {
    /// Number of markers which will be drawn (not deletions).
    pub fn num_added(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.action == MarkerAction::Add)
            .count()
    }
}
