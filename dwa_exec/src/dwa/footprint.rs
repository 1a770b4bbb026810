//! Robot footprint geometry
//!
//! The footprint is a polygon in the robot frame which must be star-shaped with respect to the
//! robot centre, that is every point of the polygon can be seen from the centre. This is what
//! makes the triangle fan containment test and the centre-to-point clearance measure valid, and
//! it is checked when the footprint is built.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Isometry2, Point2, Vector2};
use serde::Serialize;
use thiserror::Error;

// Internal
use super::{RobotState, EPSILON, NO_INTERSECTION_DIST_M};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance on the winding angle of the footprint around the robot centre.
const WINDING_TOLERANCE_RAD: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A validated robot footprint in the robot frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footprint {
    vertices: Vec<Point2<f64>>,

    /// +1 if the vertices go anticlockwise around the centre, -1 otherwise
    winding: f64,
}

/// A footprint placed at a robot state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedFootprint {
    centre: Point2<f64>,
    vertices: Vec<Point2<f64>>,
    winding: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FootprintError {
    #[error("A footprint needs at least 3 vertices, found {0}")]
    TooFewVertices(usize),

    #[error("Footprint vertex {0} is not finite")]
    NonFiniteVertex(usize),

    #[error("The triangle between the robot centre and edge {0} has no area")]
    DegenerateEdge(usize),

    #[error("Edge {0} is wound the opposite way to the first edge around the robot centre")]
    InconsistentWinding(usize),

    #[error("The footprint winds {0:.3} rad around the robot centre instead of once")]
    NotStarShaped(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Footprint {
    /// Build a footprint from its vertices, checking it is star-shaped around the origin.
    pub fn new(points: &[[f64; 2]]) -> Result<Self, FootprintError> {
        if points.len() < 3 {
            return Err(FootprintError::TooFewVertices(points.len()));
        }

        if let Some(i) = points
            .iter()
            .position(|p| !(p[0].is_finite() && p[1].is_finite()))
        {
            return Err(FootprintError::NonFiniteVertex(i));
        }

        let vertices: Vec<Point2<f64>> = points.iter().map(|p| Point2::new(p[0], p[1])).collect();

        // Every triangle of the fan must turn the same way and the fan must go round the centre
        // exactly once.
        let mut winding_sign = 0.0;
        let mut winding_rad = 0.0;

        for (i, (a, b)) in edges(&vertices).enumerate() {
            let cross = a.coords.perp(&b.coords);

            if cross.abs() < EPSILON {
                return Err(FootprintError::DegenerateEdge(i));
            }

            if i == 0 {
                winding_sign = cross.signum();
            }
            else if cross.signum() != winding_sign {
                return Err(FootprintError::InconsistentWinding(i));
            }

            winding_rad += cross.atan2(a.coords.dot(&b.coords));
        }

        if (winding_rad.abs() - std::f64::consts::TAU).abs() > WINDING_TOLERANCE_RAD {
            return Err(FootprintError::NotStarShaped(winding_rad.abs()));
        }

        Ok(Self {
            vertices,
            winding: winding_sign,
        })
    }

    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Place the footprint at the given state, rotating it by the state's yaw and translating it
    /// to the state's position.
    pub fn transform(&self, state: &RobotState) -> PlacedFootprint {
        let iso = Isometry2::new(Vector2::new(state.x_m, state.y_m), state.yaw_rad);

        PlacedFootprint {
            centre: state.position(),
            vertices: self.vertices.iter().map(|v| iso * v).collect(),
            winding: self.winding,
        }
    }
}

impl PlacedFootprint {
    pub fn vertices(&self) -> &[Point2<f64>] {
        &self.vertices
    }

    /// Vertices as `[x, y]` pairs.
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.vertices.iter().map(|p| [p.x, p.y]).collect()
    }

    /// Returns true if the point is inside the footprint.
    ///
    /// The footprint is split into a fan of triangles between the centre and each edge; the point
    /// is inside if it is inside any of them. The centre and the lines joining it to the vertices
    /// are inside, points on the footprint boundary are outside.
    pub fn contains(&self, point: &Point2<f64>) -> bool {
        edges(&self.vertices).any(|(a, b)| in_fan_triangle(point, &self.centre, a, b, self.winding))
    }

    /// Distance from the point to the footprint boundary, or zero if it is inside.
    ///
    /// The distance is measured along the line from the point to the robot centre, to the first
    /// edge (in polygon order) that line crosses. `NO_INTERSECTION_DIST_M` is returned if no edge
    /// is crossed.
    pub fn distance_to(&self, point: &Point2<f64>) -> f64 {
        if self.contains(point) {
            return 0.0;
        }

        match self.intersection(point) {
            Some(isect) => (point - isect).norm(),
            None => NO_INTERSECTION_DIST_M,
        }
    }

    /// Find where the segment from `point` to the centre crosses the boundary.
    fn intersection(&self, point: &Point2<f64>) -> Option<Point2<f64>> {
        let seg = self.centre - point;

        for (c, d) in edges(&self.vertices) {
            let edge = d - c;

            let deno = seg.perp(&edge);

            // Parallel edges never cross
            if deno.abs() < EPSILON {
                continue;
            }

            let s = (c - point).perp(&edge) / deno;
            let t = (c - point).perp(&seg) / deno;

            if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
                return Some(point + seg * s);
            }
        }

        None
    }
}

/// Iterate over the edges of a closed polygon as pairs of consecutive vertices.
fn edges(vertices: &[Point2<f64>]) -> impl Iterator<Item = (&Point2<f64>, &Point2<f64>)> {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
}

/// Returns true if `p` is inside the fan triangle `centre`, `a`, `b`.
///
/// The two sides through the centre are included, the outer edge `a`-`b` is not. `winding` is
/// the sign of the turn from `a` to `b` around the centre.
fn in_fan_triangle(
    p: &Point2<f64>,
    centre: &Point2<f64>,
    a: &Point2<f64>,
    b: &Point2<f64>,
    winding: f64,
) -> bool {
    let cross_1 = winding * (a - centre).perp(&(p - centre));
    let cross_2 = winding * (p - centre).perp(&(b - centre));
    let cross_3 = winding * (b - a).perp(&(p - a));

    cross_1 >= 0.0 && cross_2 >= 0.0 && cross_3 > 0.0
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
