//! # Planner inputs
//!
//! Inputs arrive asynchronously from the feed and are written into the [`InputStore`], one setter
//! per field. The control loop takes a [`InputSnapshot`] once per cycle, so that every part of the
//! cycle sees the same inputs.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod watchdog;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, trace, warn};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

// Internal
use crate::{
    dwa::{self, Footprint, FootprintError, Goal, ObstacleSet, ObstacleSource, Params},
    tf::TfTree,
};
use comms_if::msg::{InputMsg, OdometryMsg};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Latest value of every planner input, shared between the feed and the control loop.
#[derive(Debug, Default)]
pub struct InputStore {
    inner: RwLock<InputSnapshot>,
}

/// A consistent copy of all inputs, taken once per cycle.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    /// Latest goal, in the robot frame
    pub goal: Option<Goal>,

    pub odometry: Option<OdometryMsg>,

    /// Obstacles from the latest reading of the selected source
    pub obstacles: Option<ObstacleSet>,

    pub footprint: Option<Footprint>,

    pub target_velocity_ms: Option<f64>,

    pub goal_threshold_m: Option<f64>,

    /// True if odometry was received since the previous snapshot
    pub odometry_updated: bool,

    /// True if obstacles were received since the previous snapshot
    pub obstacles_updated: bool,
}

/// Applies input messages to the store.
///
/// Goals are transformed into the robot frame and obstacle readings are turned into an
/// [`ObstacleSet`] here, as they arrive, rather than in the control loop.
#[derive(Debug, Clone)]
pub struct InputHandler {
    tf: TfTree,
    obstacle_source: ObstacleSource,
    angle_resolution_rad: f64,
    filter_scan_ranges: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum InputError {
    #[error("The input store lock is poisoned")]
    LockPoisoned,

    #[error("Received an invalid footprint: {0}")]
    InvalidFootprint(FootprintError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> From<PoisonError<T>> for InputError {
    fn from(_: PoisonError<T>) -> Self {
        InputError::LockPoisoned
    }
}

impl InputStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_goal(&self, goal: Goal) -> Result<(), InputError> {
        self.inner.write()?.goal = Some(goal);
        Ok(())
    }

    pub fn set_odometry(&self, odometry: OdometryMsg) -> Result<(), InputError> {
        let mut inner = self.inner.write()?;
        inner.odometry = Some(odometry);
        inner.odometry_updated = true;
        Ok(())
    }

    /// Replace the obstacle set.
    pub fn set_obstacles(&self, obstacles: ObstacleSet) -> Result<(), InputError> {
        let mut inner = self.inner.write()?;
        inner.obstacles = Some(obstacles);
        inner.obstacles_updated = true;
        Ok(())
    }

    pub fn set_footprint(&self, footprint: Footprint) -> Result<(), InputError> {
        self.inner.write()?.footprint = Some(footprint);
        Ok(())
    }

    pub fn set_target_velocity(&self, target_velocity_ms: f64) -> Result<(), InputError> {
        self.inner.write()?.target_velocity_ms = Some(target_velocity_ms);
        Ok(())
    }

    pub fn set_goal_threshold(&self, goal_threshold_m: f64) -> Result<(), InputError> {
        self.inner.write()?.goal_threshold_m = Some(goal_threshold_m);
        Ok(())
    }

    /// Copy all inputs out of the store and clear the updated flags.
    pub fn snapshot(&self) -> Result<InputSnapshot, InputError> {
        let mut inner = self.inner.write()?;
        let snapshot = inner.clone();

        inner.odometry_updated = false;
        inner.obstacles_updated = false;

        Ok(snapshot)
    }
}

impl InputSnapshot {
    /// Build the planner input for this cycle.
    ///
    /// Missing inputs take their default values, the watchdog must have checked they are present
    /// before the planner is run on them.
    pub fn planner_input(&self, time_s: f64) -> dwa::InputData {
        let odometry = self.odometry.unwrap_or_default();

        dwa::InputData {
            time_s,
            goal: self.goal.unwrap_or_default(),
            velocity_ms: odometry.linear_ms,
            yawrate_rads: odometry.angular_rads,
            obstacles: self.obstacles.clone().unwrap_or_default(),
            footprint: self.footprint.clone(),
            target_velocity_ms: self.target_velocity_ms,
            goal_threshold_m: self.goal_threshold_m,
        }
    }
}

impl InputHandler {
    pub fn new(tf: TfTree, params: &Params) -> Self {
        Self {
            tf,
            obstacle_source: params.obstacle_source,
            angle_resolution_rad: params.angle_resolution_rad,
            filter_scan_ranges: params.filter_scan_ranges,
        }
    }

    /// Apply one input message to the store.
    ///
    /// Only a poisoned store or an invalid footprint are errors, anything else which cannot be
    /// used is logged and dropped.
    pub fn handle(&self, store: &InputStore, msg: InputMsg) -> Result<(), InputError> {
        trace!("Received {} input", msg.name());

        match msg {
            InputMsg::Goal(goal) => match self.tf.goal_in_robot(&goal) {
                Ok(g) => {
                    debug!("New goal ({:.3}, {:.3}, {:.3})", g.x_m, g.y_m, g.yaw_rad);
                    store.set_goal(g)?
                }
                Err(e) => error!("Goal dropped, keeping the previous one: {}", e),
            },
            InputMsg::Odometry(odom) => store.set_odometry(odom)?,
            InputMsg::Scan(scan) => match self.obstacle_source {
                ObstacleSource::Scan => store.set_obstacles(ObstacleSet::from_scan(
                    &scan,
                    self.filter_scan_ranges,
                ))?,
                ObstacleSource::Grid => debug!("Ignoring scan, obstacles are taken from grids"),
            },
            InputMsg::Grid(grid) => match self.obstacle_source {
                ObstacleSource::Grid => store.set_obstacles(ObstacleSet::from_grid(
                    &grid,
                    self.angle_resolution_rad,
                ))?,
                ObstacleSource::Scan => debug!("Ignoring grid, obstacles are taken from scans"),
            },
            InputMsg::Footprint(fp) => {
                let footprint = Footprint::new(&fp.points).map_err(InputError::InvalidFootprint)?;
                debug!("New footprint with {} vertices", footprint.vertices().len());
                store.set_footprint(footprint)?
            }
            InputMsg::TargetVelocity(v) => {
                if v.is_finite() && v >= 0.0 {
                    store.set_target_velocity(v)?
                }
                else {
                    warn!("Ignoring invalid target velocity override {}", v)
                }
            }
            InputMsg::GoalThreshold(th) => {
                if th.is_finite() && th >= 0.0 {
                    store.set_goal_threshold(th)?
                }
                else {
                    warn!("Ignoring invalid goal threshold override {}", th)
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::params::StaticTransform;
    use comms_if::msg::{FootprintMsg, GoalMsg, LaserScanMsg};

    fn handler(source: ObstacleSource) -> InputHandler {
        let mut params = Params::default();
        params.obstacle_source = source;

        let tf = TfTree::new(
            "base_link",
            &[StaticTransform {
                frame_id: String::from("odom"),
                x_m: 1.0,
                y_m: 0.0,
                yaw_rad: 0.0,
            }],
        );

        InputHandler::new(tf, &params)
    }

    fn goal(frame_id: &str, x: f64) -> InputMsg {
        InputMsg::Goal(GoalMsg {
            frame_id: frame_id.to_string(),
            x,
            y: 0.0,
            yaw: 0.0,
        })
    }

    fn scan() -> InputMsg {
        InputMsg::Scan(LaserScanMsg {
            angle_min: 0.0,
            angle_increment: 0.1,
            range_min: None,
            range_max: None,
            ranges: vec![1.0, 2.0],
        })
    }

    #[test]
    fn test_snapshot_clears_updated_flags() {
        let store = InputStore::new();

        store.set_odometry(OdometryMsg { linear_ms: 0.2, angular_rads: 0.0 }).unwrap();
        store.set_obstacles(ObstacleSet::default()).unwrap();

        let snap = store.snapshot().unwrap();
        assert!(snap.odometry_updated);
        assert!(snap.obstacles_updated);

        // Values are kept, only the flags are cleared
        let snap = store.snapshot().unwrap();
        assert!(!snap.odometry_updated);
        assert!(!snap.obstacles_updated);
        assert_eq!(snap.odometry.unwrap().linear_ms, 0.2);
        assert!(snap.obstacles.is_some());
    }

    #[test]
    fn test_goal_transform() {
        let store = InputStore::new();
        let h = handler(ObstacleSource::Scan);

        h.handle(&store, goal("odom", 3.0)).unwrap();
        assert_eq!(store.snapshot().unwrap().goal.map(|g| g.x_m), Some(2.0));

        // Unknown frame keeps the held goal
        h.handle(&store, goal("map", 10.0)).unwrap();
        assert_eq!(store.snapshot().unwrap().goal.map(|g| g.x_m), Some(2.0));
    }

    #[test]
    fn test_obstacle_source_selection() {
        let store = InputStore::new();

        handler(ObstacleSource::Grid).handle(&store, scan()).unwrap();
        let snap = store.snapshot().unwrap();
        assert!(snap.obstacles.is_none());
        assert!(!snap.obstacles_updated);

        handler(ObstacleSource::Scan).handle(&store, scan()).unwrap();
        let snap = store.snapshot().unwrap();
        assert_eq!(snap.obstacles.map(|o| o.len()), Some(2));
        assert!(snap.obstacles_updated);
    }

    #[test]
    fn test_footprint_and_overrides() {
        let store = InputStore::new();
        let h = handler(ObstacleSource::Scan);

        h.handle(
            &store,
            InputMsg::Footprint(FootprintMsg {
                points: vec![[0.3, 0.3], [-0.3, 0.3], [-0.3, -0.3], [0.3, -0.3]],
            }),
        )
        .unwrap();
        assert!(store.snapshot().unwrap().footprint.is_some());

        let bad = InputMsg::Footprint(FootprintMsg {
            points: vec![[1.0, 0.0], [0.0, 1.0]],
        });
        assert!(matches!(
            h.handle(&store, bad),
            Err(InputError::InvalidFootprint(FootprintError::TooFewVertices(2)))
        ));

        h.handle(&store, InputMsg::TargetVelocity(0.4)).unwrap();
        h.handle(&store, InputMsg::GoalThreshold(-1.0)).unwrap();

        let snap = store.snapshot().unwrap();
        assert_eq!(snap.target_velocity_ms, Some(0.4));
        assert_eq!(snap.goal_threshold_m, None);

        let data = snap.planner_input(1.5);
        assert_eq!(data.time_s, 1.5);
        assert_eq!(data.target_velocity_ms, Some(0.4));
        assert!(data.footprint.is_some());
    }
}
