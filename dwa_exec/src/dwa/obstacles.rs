//! Obstacle extraction from range scans and occupancy grids

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Point2;
use serde::Serialize;

// Internal
use comms_if::msg::{LaserScanMsg, OccupancyGridMsg, OCCUPIED};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The current set of obstacle points in the robot frame.
///
/// A new set always replaces the previous one entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObstacleSet {
    points: Vec<Point2<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ObstacleSet {
    pub fn from_points(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    /// Convert each range of the scan into a point.
    ///
    /// With `filter` set, ranges which are not finite or lie outside the scan's valid range are
    /// dropped, otherwise every range is converted as is.
    pub fn from_scan(scan: &LaserScanMsg, filter: bool) -> Self {
        let mut points = Vec::with_capacity(scan.ranges.len());

        for (i, range) in scan.ranges.iter().enumerate() {
            if filter && !range_valid(*range, scan) {
                continue;
            }

            let angle = scan.angle_min + i as f64 * scan.angle_increment;
            points.push(Point2::new(range * angle.cos(), range * angle.sin()));
        }

        trace!("{} obstacles from {} scan ranges", points.len(), scan.ranges.len());

        Self { points }
    }

    /// Cast rays from the robot through the grid and take the first occupied sample of each.
    ///
    /// Rays are cast at `-pi + i * angle_resolution_rad` for every `i` with an angle not
    /// exceeding `pi`. Each ray is sampled at multiples of the grid resolution up to the distance
    /// of the furthest grid corner from the robot.
    pub fn from_grid(grid: &OccupancyGridMsg, angle_resolution_rad: f64) -> Self {
        let mut points = vec![];

        if !(grid.resolution > 0.0 && angle_resolution_rad > 0.0) {
            return Self { points };
        }

        let max_search_dist_m = max_corner_distance(grid);
        let num_rays = (2.0 * std::f64::consts::PI / angle_resolution_rad).floor() as usize + 1;
        let num_samples = (max_search_dist_m / grid.resolution).floor() as usize + 1;

        for i in 0..num_rays {
            let angle = -std::f64::consts::PI + i as f64 * angle_resolution_rad;
            let (sin, cos) = angle.sin_cos();

            for j in 0..num_samples {
                let dist = j as f64 * grid.resolution;
                let x = dist * cos;
                let y = dist * sin;

                let index_x = ((x - grid.origin_x) / grid.resolution).floor() as i64;
                let index_y = ((y - grid.origin_y) / grid.resolution).floor() as i64;

                if grid.cell(index_x, index_y) == Some(OCCUPIED) {
                    points.push(Point2::new(x, y));
                    break;
                }
            }
        }

        trace!("{} obstacles from a {}x{} grid", points.len(), grid.width, grid.height);

        Self { points }
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn range_valid(range: f64, scan: &LaserScanMsg) -> bool {
    if !range.is_finite() {
        return false;
    }

    let above_min = scan.range_min.map_or(true, |min| range >= min);
    let below_max = scan.range_max.map_or(true, |max| range <= max);

    above_min && below_max
}

/// Distance from the robot to the furthest corner of the grid.
fn max_corner_distance(grid: &OccupancyGridMsg) -> f64 {
    let far_x = grid.origin_x + grid.width as f64 * grid.resolution;
    let far_y = grid.origin_y + grid.height as f64 * grid.resolution;

    [
        (grid.origin_x, grid.origin_y),
        (far_x, grid.origin_y),
        (grid.origin_x, far_y),
        (far_x, far_y),
    ]
    .iter()
    .map(|(x, y)| x.hypot(*y))
    .fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    fn scan(ranges: Vec<f64>) -> LaserScanMsg {
        LaserScanMsg {
            angle_min: -PI / 2.0,
            angle_increment: PI / 2.0,
            range_min: Some(0.1),
            range_max: Some(10.0),
            ranges,
        }
    }

    #[test]
    fn test_scan() {
        let obs = ObstacleSet::from_scan(&scan(vec![1.0, 2.0, 3.0]), true);

        assert_eq!(obs.len(), 3);
        assert!((obs.points()[0] - Point2::new(0.0, -1.0)).norm() < 1e-12);
        assert!((obs.points()[1] - Point2::new(2.0, 0.0)).norm() < 1e-12);
        assert!((obs.points()[2] - Point2::new(0.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_scan_filtering() {
        let ranges = vec![f64::INFINITY, 1.0, 0.05, 20.0, f64::NAN];

        let filtered = ObstacleSet::from_scan(&scan(ranges.clone()), true);
        assert_eq!(filtered.len(), 1);
        assert!((filtered.points()[0] - Point2::new(1.0, 0.0)).norm() < 1e-12);

        let raw = ObstacleSet::from_scan(&scan(ranges), false);
        assert_eq!(raw.len(), 5);
    }

    #[test]
    fn test_grid_single_cell() {
        let resolution = 0.1;
        let angle_res = 0.2;

        // 4 m x 4 m grid centred on the robot
        let mut grid = OccupancyGridMsg {
            resolution,
            origin_x: -2.0,
            origin_y: -2.0,
            width: 40,
            height: 40,
            data: vec![0; 1600],
        };

        // Occupy the cell holding the 10th sample of the ray at -pi + 16 * 0.2 = 0.0584 rad
        let angle = -PI + 16.0 * angle_res;
        let sample = Point2::new(10.0 * resolution * angle.cos(), 10.0 * resolution * angle.sin());
        let index_x = ((sample.x - grid.origin_x) / resolution).floor() as usize;
        let index_y = ((sample.y - grid.origin_y) / resolution).floor() as usize;
        grid.data[index_x + index_y * grid.width] = OCCUPIED;

        let obs = ObstacleSet::from_grid(&grid, angle_res);

        assert_eq!(obs.len(), 1);

        let p = obs.points()[0];
        assert_eq!(((p.x - grid.origin_x) / resolution).floor() as usize, index_x);
        assert_eq!(((p.y - grid.origin_y) / resolution).floor() as usize, index_y);
    }

    #[test]
    fn test_grid_empty() {
        let grid = OccupancyGridMsg {
            resolution: 0.5,
            origin_x: -1.0,
            origin_y: -1.0,
            width: 4,
            height: 4,
            data: vec![0; 16],
        };

        assert!(ObstacleSet::from_grid(&grid, 0.2).is_empty());
    }
}
