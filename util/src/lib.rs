//! Utility library for the DWA planner software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
#[macro_use]
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;

/// Replays timestamped input messages from a script file
pub mod script_interpreter;

pub mod time;
