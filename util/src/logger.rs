//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use colored::{ColoredString, Colorize};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Rate limiter for messages emitted every cycle.
///
/// Use with the [`warn_throttle`] macro.
#[derive(Debug, Clone)]
pub struct Throttle {
    period: Duration,
    last: Option<Instant>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The minimum log level must be at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// MACROS
// ---------------------------------------------------------------------------

/// Emit a warning at most once per throttle period.
#[macro_export]
macro_rules! warn_throttle {
    ($throttle:expr, $($arg:tt)+) => ({
        if $throttle.ready() {
            log::warn!($($arg)+);
        }
    });
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Throttle {
    /// Create a throttle letting one message through per `period_s` seconds.
    pub fn new(period_s: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(period_s.max(0.0)),
            last: None
        }
    }

    /// Returns true if a message may be emitted now, and if so restarts the period.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();

        match self.last {
            Some(t) if now.duration_since(t) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(1.0)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Records go to stdout and to the session's log file, stamped with the session time. The file
/// gets everything down to `min_level`, the terminal stops at `Debug` since tracing a search
/// prints a line per candidate trajectory.
///
/// # Notes
///
/// - `min_level` must be at least `Info`.
/// - Only the first call can succeed.
pub fn logger_init(
    min_level: LevelFilter,
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let terminal = fern::Dispatch::new()
        .level(min_level.min(LevelFilter::Debug))
        .chain(std::io::stdout());

    fern::Dispatch::new()
        .format(format_record)
        .level(min_level)
        .chain(terminal)
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a record as `[time LVL] message`, adding the target below `Info`.
fn format_record(out: fern::FormatCallback, message: &fmt::Arguments, record: &log::Record) {
    let time_s = session::get_elapsed_seconds();
    let tag = level_tag(record.level());

    if record.level() > log::Level::Info {
        out.finish(format_args!("[{:10.6} {}] {}: {}", time_s, tag, record.target(), message))
    }
    else {
        out.finish(format_args!("[{:10.6} {}] {}", time_s, tag, message))
    }
}

fn level_tag(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info  => "INF".normal(),
        log::Level::Warn  => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_throttle() {
        let mut throttle = Throttle::new(60.0);

        assert!(throttle.ready());
        assert!(!throttle.ready());

        let mut open = Throttle::new(0.0);
        assert!(open.ready());
        assert!(open.ready());
    }
}
