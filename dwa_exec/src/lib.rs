//! # DWA planner library.
//!
//! This library allows other crates in the workspace, and the benchmarks, to access items defined
//! inside the planner executable crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store for the executable
pub mod data_store;

/// Dynamic Window Approach planner - picks the velocity command each cycle
pub mod dwa;

/// Input feed - replays an input script into the input store on a background thread
pub mod feed;

/// Input store and staleness watchdog
pub mod input;

/// Executable parameters
pub mod params;

/// Static goal frame transforms
pub mod tf;
