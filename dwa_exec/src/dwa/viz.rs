//! Visualisation of candidate and selected trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;

// Internal
use super::{PlacedFootprint, Trajectory};
use comms_if::viz::{
    Color, Header, Marker, MarkerAction, MarkerArray, Polygon, TrajectoryKind,
    MAX_CANDIDATE_MARKERS
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const CANDIDATES_NS: &str = "candidate_trajectories";
const SELECTED_NS: &str = "selected_trajectory";

const MARKER_ALPHA: f64 = 0.8;

/// Line width of candidate trajectories.
///
/// Units: meters
const CANDIDATE_WIDTH_M: f64 = 0.02;

/// Line width of the selected trajectory.
///
/// Units: meters
const SELECTED_WIDTH_M: f64 = 0.05;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the candidate trajectory batch.
///
/// The batch always holds `MAX_CANDIDATE_MARKERS` markers: one line strip per trajectory
/// followed by deletions of every remaining slot.
pub fn candidate_markers(
    trajectories: &[Trajectory],
    kind: TrajectoryKind,
    frame_id: &str,
) -> MarkerArray {
    if trajectories.len() > MAX_CANDIDATE_MARKERS {
        warn!(
            "{} candidate trajectories but only {} marker slots, the rest are not drawn",
            trajectories.len(),
            MAX_CANDIDATE_MARKERS
        );
    }

    let header = Header::now(frame_id);
    let color = kind_color(kind);

    let markers = (0..MAX_CANDIDATE_MARKERS)
        .map(|id| match trajectories.get(id) {
            Some(traj) => Marker {
                header: header.clone(),
                ns: String::from(CANDIDATES_NS),
                id,
                action: MarkerAction::Add,
                color,
                scale: CANDIDATE_WIDTH_M,
                points: traj.points(),
            },
            None => Marker {
                header: header.clone(),
                ns: String::from(CANDIDATES_NS),
                id,
                action: MarkerAction::Delete,
                color: Color::default(),
                scale: 0.0,
                points: vec![],
            },
        })
        .collect();

    MarkerArray { markers }
}

/// Build the marker of the selected trajectory, drawn in red.
pub fn selected_marker(traj: &Trajectory, frame_id: &str) -> Marker {
    Marker {
        header: Header::now(frame_id),
        ns: String::from(SELECTED_NS),
        id: 0,
        action: MarkerAction::Add,
        color: Color::new(1.0, 0.0, 0.0, MARKER_ALPHA),
        scale: SELECTED_WIDTH_M,
        points: traj.points(),
    }
}

/// The footprint at the end of the selected trajectory.
pub fn predicted_footprint(placed: &PlacedFootprint, frame_id: &str) -> Polygon {
    Polygon {
        header: Header::now(frame_id),
        points: placed.points(),
    }
}

fn kind_color(kind: TrajectoryKind) -> Color {
    match kind {
        TrajectoryKind::Search => Color::new(0.0, 1.0, 0.0, MARKER_ALPHA),
        TrajectoryKind::Maneuver => Color::new(0.0, 0.6, 1.0, MARKER_ALPHA),
        TrajectoryKind::ForcedStop => Color::new(0.5, 0.0, 0.5, MARKER_ALPHA),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
