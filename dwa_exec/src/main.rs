//! Main planner executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and parameters
//!     - Initialise the planner and start the input feed
//!     - Main loop:
//!         - Input snapshot acquisition
//!         - Staleness watchdog
//!         - Planner processing
//!         - Archives and visualisation
//!         - Command output (fed back as odometry in the simulated base)
//!
//! # Usage
//!
//!     dwa_exec [script]
//!
//! Inputs are replayed from `script`, or from the `default_script` of `dwa_exec.toml` if no
//! script is given. The executable stops at the end of the script.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use dwa_lib::{
    data_store::DataStore,
    dwa::{self, Footprint},
    feed,
    input::{
        watchdog::{Readiness, Watchdog},
        InputHandler, InputStore,
    },
    params::DwaExecParams,
    tf::TfTree,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, trace, warn};
use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::thread;
use std::time::{Duration, Instant};

// Internal
#[cfg(feature = "sim")]
use comms_if::msg::OdometryMsg;
use comms_if::viz::{Marker, MarkerArray, Polygon, TrajectoryKind};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::ScriptInterpreter,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path of the latest visualisation frame, relative to the session directory.
const VIZ_PATH: &str = "dwa/viz.json";

/// Path of the forced stop snapshots, a timestamp is added to each.
const FORCED_STOP_PATH: &str = "dwa/forced_stop.json";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Everything drawn for one planner cycle.
#[derive(Serialize)]
struct VizFrame {
    time_s: f64,
    candidates: MarkerArray,
    selected: Option<Marker>,
    predicted_footprint: Option<Polygon>,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "dwa_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("DWA Planner Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: DwaExecParams = util::params::load(
        "dwa_exec.toml"
    ).wrap_err("Could not load exec params")?;

    if !(exec_params.cycle_frequency_hz.is_finite() && exec_params.cycle_frequency_hz > 0.0) {
        return Err(eyre!(
            "The cycle frequency must be greater than zero, found {}",
            exec_params.cycle_frequency_hz
        ));
    }

    let cycle_period_s = exec_params.cycle_period_s();

    let planner_params: dwa::Params = util::params::load(
        &exec_params.planner_params_file
    ).wrap_err("Could not load planner params")?;

    if !exec_params.matches_control_period(planner_params.control_period_s) {
        warn!(
            "The loop period ({:.4} s) differs from the planner control_period_s ({:.4} s), the \
            dynamic window will not match the acceleration limits",
            cycle_period_s,
            planner_params.control_period_s
        );
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE INPUT SCRIPT ----

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let script_path = match (args.len(), &exec_params.default_script) {
        (2, _) => PathBuf::from(&args[1]),
        (1, Some(s)) => host::get_sw_root()
            .wrap_err("Could not find the default script")?
            .join(s),
        (1, None) => return Err(eyre!(
            "No script given and no default_script set in dwa_exec.toml"
        )),
        _ => return Err(eyre!(
            "Expected either zero or one argument, found {}", args.len() - 1
        )),
    };

    info!("Loading script from {:?}", script_path);

    let si = ScriptInterpreter::new(&script_path)
        .wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} inputs\n",
        si.get_duration(),
        si.get_num_inputs()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.planner.init(
        dwa::InitData {
            params: planner_params.clone(),
            robot_frame: exec_params.robot_frame.clone(),
        },
        Some(&session)
    ).wrap_err("Failed to initialise the planner")?;
    info!("Planner init complete");

    let mut watchdog = Watchdog::new(
        planner_params.stale_count_threshold,
        planner_params.use_footprint
    );

    info!("Module initialisation complete\n");

    // ---- INITIALISE INPUT FEED ----

    let store = Arc::new(InputStore::new());

    // The static footprint stands until one is received
    if let Some(ref points) = planner_params.footprint {
        let footprint = Footprint::new(points)
            .wrap_err("The static footprint is invalid")?;
        store.set_footprint(footprint)
            .wrap_err("Could not set the static footprint")?;
    }

    let handler = InputHandler::new(
        TfTree::new(&exec_params.robot_frame, &exec_params.static_transforms),
        &planner_params
    );

    let feed_stop = Arc::new(AtomicBool::new(false));
    let mut feed_handle = Some(feed::spawn(si, store.clone(), handler, feed_stop.clone()));

    info!("Input feed started");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut prev_kind: Option<TrajectoryKind> = None;
    let mut prev_finished = false;

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(exec_params.cycle_frequency_hz, session::get_elapsed_seconds());

        // ---- INPUT FEED ----

        // The feed ends either at the end of the script, or on a fatal input error
        if feed_handle.as_ref().map_or(false, |h| h.is_finished()) {
            if let Some(h) = feed_handle.take() {
                match h.join() {
                    Ok(Ok(())) => {
                        info!("Input feed finished, stopping");
                        break;
                    }
                    Ok(Err(e)) => return Err(e).wrap_err("The input feed failed"),
                    Err(_) => return Err(eyre!("The input feed thread panicked")),
                }
            }
        }

        let snapshot = store.snapshot()
            .wrap_err("Could not read the planner inputs")?;

        // ---- PLANNER PROCESSING ----

        match watchdog.check(&snapshot) {
            Readiness::Refused(cause) => ds.refuse_motion(cause),
            Readiness::Ready => {
                ds.allow_motion();
                ds.planner_input = snapshot.planner_input(ds.time_s);

                match ds.planner.proc(&ds.planner_input) {
                    Ok((o, r)) => {
                        ds.cmd = o.cmd;
                        ds.finished = o.finished;
                        ds.planner_output = Some(o);
                        ds.planner_status_rpt = Some(r);
                    },
                    Err(e) => {
                        // The watchdog should have caught any missing input, so just issue the
                        // warning and hold still
                        warn!("Error during planner processing: {}", e)
                    }
                };
            }
        }

        trace!("Command: {:?}", ds.cmd);

        if ds.finished && !prev_finished {
            info!("Settled at the goal");
        }
        prev_finished = ds.finished;

        // ---- WRITE ARCHIVES ----

        if ds.planner_output.is_some() {
            if let Err(e) = ds.planner.write() {
                warn!("Could not write planner archive: {}", e);
            }
        }

        // ---- VISUALISATION ----

        let kind = ds.planner_status_rpt.and_then(|r| r.kind);

        if let Some(ref o) = ds.planner_output {
            let forced_stop = kind == Some(TrajectoryKind::ForcedStop)
                && prev_kind != Some(TrajectoryKind::ForcedStop);

            if ds.is_1_hz_cycle || forced_stop {
                let frame = VizFrame {
                    time_s: ds.time_s,
                    candidates: o.candidates.clone(),
                    selected: o.selected.clone(),
                    predicted_footprint: o.predicted_footprint.clone(),
                };

                if forced_stop {
                    warn!("Every candidate trajectory collides, stopping");
                    session::save_with_timestamp(FORCED_STOP_PATH, frame);
                }
                else {
                    session.save(VIZ_PATH, frame);
                }
            }
        }
        prev_kind = kind;

        // ---- COMMAND OUTPUT ----

        // The simulated base tracks the command perfectly
        #[cfg(feature = "sim")]
        store.set_odometry(OdometryMsg {
            linear_ms: ds.cmd.linear_ms,
            angular_rads: ds.cmd.angular_rads,
        }).wrap_err("Could not feed back simulated odometry")?;

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(cycle_period_s)
            .checked_sub(cycle_dur)
        {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period_s
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    feed_stop.store(true, Ordering::Relaxed);
    if let Some(h) = feed_handle.take() {
        if h.join().is_err() {
            warn!("The input feed thread panicked during shutdown");
        }
    }

    info!(
        "End of execution after {} cycles, planner mode {:?}",
        ds.num_cycles,
        ds.planner.mode()
    );

    session.exit();

    Ok(())
}
