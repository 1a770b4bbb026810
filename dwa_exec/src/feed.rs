//! # Input feed
//!
//! Replays an input script into the [`InputStore`] on a background thread. Each input is
//! delivered once the session time passes its timestamp.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;

// Internal
use crate::input::{InputError, InputHandler, InputStore};
use util::script_interpreter::{PendingInputs, ScriptInterpreter};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Time between two polls of the script.
const FEED_POLL_PERIOD: Duration = Duration::from_millis(5);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Could not apply an input: {0}")]
    InputError(#[from] InputError),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Start the feed thread.
///
/// The thread returns `Ok` once the end of the script is reached or `stop` is set, and an error
/// if an input could not be applied.
pub fn spawn(
    script: ScriptInterpreter,
    store: Arc<InputStore>,
    handler: InputHandler,
    stop: Arc<AtomicBool>,
) -> JoinHandle<Result<(), FeedError>> {
    thread::spawn(move || {
        run(
            script,
            &store,
            &handler,
            &stop,
            util::session::get_elapsed_seconds,
        )
    })
}

/// Feed loop, taking the current time from `clock`.
fn run<C>(
    mut script: ScriptInterpreter,
    store: &InputStore,
    handler: &InputHandler,
    stop: &AtomicBool,
    clock: C,
) -> Result<(), FeedError>
where
    C: Fn() -> f64,
{
    while !stop.load(Ordering::Relaxed) {
        match script.get_pending_at(clock()) {
            PendingInputs::None => (),
            PendingInputs::Some(inputs) => {
                for input in inputs {
                    handler.handle(store, input)?;
                }
            }
            PendingInputs::EndOfScript => {
                info!("End of input script reached");
                return Ok(());
            }
        }

        thread::sleep(FEED_POLL_PERIOD);
    }

    info!("Input feed stopped");

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
