//! # Input script interpreter module
//!
//! This module provides an interpreter for planner input scripts, allowing recorded or hand
//! written input messages to be replayed into the planner at given times.
//!
//! A script is a sequence of entries `<time_s>: <json input>;`, for example:
//!
//! ```text
//! 0.0: {"type": "GOAL", "payload": {"frame_id": "base_link", "x": 5.0, "y": 0.0, "yaw": 0.0}};
//! 0.1: {"type": "ODOM", "payload": {"linear_ms": 0.0, "angular_rads": 0.0}};
//! ```
//!
//! Anything outside of an entry is ignored and can be used for comments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use thiserror::Error;

// Internal
use comms_if::msg::{InputMsg, InputParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An input which is scripted to occur at a specific time.
pub struct ScriptedInput {
    /// The time the input is supposed to be delivered at
    exec_time_s: f64,

    /// The input message
    input: InputMsg
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_at` to
/// acquire a list of inputs that need delivering.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    inputs: VecDeque<ScriptedInput>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid input at {0} s: {1}")]
    InvalidInput(f64, InputParseError)
}

pub enum PendingInputs {
    None,
    Some(Vec<InputMsg>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(
                ScriptError::ScriptNotFound(path.display().to_string()));
        }

        // Load the script into a string
        let script = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e))
        };

        let inputs = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            inputs
        })
    }

    /// Create an interpreter directly from the script text.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            inputs: Self::parse(script)?
        })
    }

    /// Return a vector of inputs due at `current_time_s`, or `None` if nothing needs delivering
    /// now.
    pub fn get_pending_at(&mut self, current_time_s: f64) -> PendingInputs {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.inputs.is_empty() {
            return PendingInputs::EndOfScript
        }

        let mut input_vec: Vec<InputMsg> = vec![];

        // Pop items from the queue while the head's exec time has passed.
        while let Some(head) = self.inputs.front() {
            if head.exec_time_s > current_time_s {
                break;
            }

            if let Some(scripted) = self.inputs.pop_front() {
                input_vec.push(scripted.input);
            }
        }

        if input_vec.is_empty() {
            PendingInputs::None
        }
        else {
            PendingInputs::Some(input_vec)
        }
    }

    /// Get the number of inputs remaining in the script
    pub fn get_num_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.inputs.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }

    fn parse(script: &str) -> Result<VecDeque<ScriptedInput>, ScriptError> {
        // Empty queue of inputs
        let mut queue: VecDeque<ScriptedInput> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::
            new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let (time_str, payload) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue
            };

            // Parse the exec time
            let exec_time_s: f64 = match time_str.parse() {
                Ok(t) => t,
                Err(e) => return Err(
                    ScriptError::InvalidTimestamp(format!("{}", e)))
            };

            // Parse the input from the payload. The scripts contain JSON only.
            let input = InputMsg::from_json(payload)
                .map_err(|e| ScriptError::InvalidInput(exec_time_s, e))?;

            queue.push_back(ScriptedInput {
                exec_time_s,
                input
            });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        // Entries are delivered in time order regardless of their order in the file
        queue
            .make_contiguous()
            .sort_by(|a, b| a.exec_time_s.total_cmp(&b.exec_time_s));

        Ok(queue)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
