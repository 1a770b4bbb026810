//! Module interfaces
//!
//! Cyclic processing modules (the DWA planner) implement [`State`] so that the executable drives
//! them the same way: `init` once with their parameters, then `proc` once per control cycle on a
//! snapshot of their inputs.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module run once per control cycle.
pub trait State {
    /// Parameters and other data fixed for the life of the module
    type InitData;
    type InitError;

    /// Everything the module reads during one cycle
    type InputData;
    /// Everything the module produces during one cycle
    type OutputData;
    /// Diagnostics of one cycle, for logging and archiving
    type StatusReport;
    type ProcError;

    /// Set the module up.
    ///
    /// With a `session` the module may open its archives, without one (tests and benchmarks) it
    /// archives nothing.
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>)
        -> Result<(), Self::InitError>;

    /// Run one cycle.
    ///
    /// An error leaves the module ready for the next cycle, the caller decides what to command
    /// in its place.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
