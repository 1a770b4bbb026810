//! # Data Store

use comms_if::cmd::Twist;
use log::{info, warn};

use crate::{dwa, input::watchdog::RefusalCause};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub time_s: f64,

    // Motion refusal
    /// True if the robot is being held still because an input is missing or stale.
    pub refused: bool,

    /// Gives the reason motion is being refused.
    pub refusal_cause: Option<RefusalCause>,

    // Planner
    pub planner: dwa::DwaPlanner,
    pub planner_input: dwa::InputData,
    pub planner_output: Option<dwa::OutputData>,
    pub planner_status_rpt: Option<dwa::StatusReport>,

    /// The command sent to the robot this cycle
    pub cmd: Twist,

    /// True if the robot is settled at the goal this cycle
    pub finished: bool,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Hold the robot still with the given cause.
    ///
    /// Only the first cause is recorded, later ones are reported by the watchdog itself.
    pub fn refuse_motion(&mut self, cause: RefusalCause) {
        if !self.refused {
            warn!("Motion refused, cause: {:?}", cause);
            self.refused = true;
            self.refusal_cause = Some(cause);
        }

        self.cmd = Twist::default();
        self.finished = false;
    }

    /// Allow motion again, if it was refused.
    pub fn allow_motion(&mut self) {
        if self.refused {
            info!(
                "Motion allowed again, initial refusal cause was {:?}",
                self.refusal_cause
            );
            self.refused = false;
            self.refusal_cause = None;
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64, time_s: f64) {
        // At least one cycle per second, so that rates under 1 Hz don't divide by zero
        let cycles_per_s = (cycle_frequency_hz as u128).max(1);

        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;

        self.planner_input = dwa::InputData::default();
        self.planner_output = None;
        self.planner_status_rpt = None;
        self.cmd = Twist::default();
        self.finished = false;

        self.time_s = time_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
