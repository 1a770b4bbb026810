//! Session management
//!
//! A session is one run of an executable. It owns a timestamped directory under the software
//! root holding the log file, the CSV archives and any JSON snapshots saved during the run, and
//! fixes the epoch all logged and archived times are measured from.
//!
//! JSON snapshots are written on a background thread so that saving never blocks the control
//! loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use erased_serde::Serialize;
use log::{info, warn};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();
static SAVE_SENDER: OnceCell<Mutex<Sender<SaveRequest>>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Format of the timestamps in session directory and snapshot names, see `chrono::format`.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// How long the save thread waits for a request before checking if it should stop.
const SAVE_POLL_PERIOD: Duration = Duration::from_millis(20);

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Directories and save channel of the current session.
#[derive(Clone)]
pub struct Session {
    /// The session directory, `$DWA_SW_ROOT/<sessions_dir>/<exec_name>_<timestamp>`
    pub session_root: PathBuf,

    /// Directory the CSV archives are written to
    pub arch_root: PathBuf,

    pub log_file_path: PathBuf,

    save_sender: Sender<SaveRequest>,

    /// Set to ask the save thread to stop, cleared by the thread once it has stopped
    save_stop: Arc<AtomicBool>,
}

/// Data to be written as JSON to a session relative path.
struct SaveRequest {
    path: PathBuf,
    data: Box<dyn Serialize + Send>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (DWA_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("A session has already been started in this process")]
    AlreadyStarted,
}

#[derive(Error, Debug)]
enum SaveError {
    #[error("only .json files can be saved, got {0:?}")]
    NotJson(Option<OsString>),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start the session of the `exec_name` executable, in the `sessions_dir` directory of the
    /// software root.
    ///
    /// Only one session may be started per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        let epoch = Utc::now();
        SESSION_EPOCH
            .try_init_once(|| epoch)
            .map_err(|_| SessionError::AlreadyStarted)?;

        let session_root = crate::host::get_sw_root()
            .map_err(|_| SessionError::SwRootNotSet)?
            .join(sessions_dir)
            .join(format!("{}_{}", exec_name, epoch.format(TIMESTAMP_FORMAT)));

        let arch_root = session_root.join("arch");
        fs::create_dir_all(&arch_root).map_err(SessionError::CannotCreateDir)?;

        let log_file_path = session_root.join(format!("{}.log", exec_name));

        // Start the save thread, the free save functions reach it through the static sender
        let (tx, rx) = channel();
        SAVE_SENDER.init_once(|| Mutex::new(tx.clone()));

        let save_stop = Arc::new(AtomicBool::new(false));
        {
            let stop = save_stop.clone();
            let root = session_root.clone();
            thread::spawn(move || save_thread(&stop, &root, rx));
        }

        Ok(Session {
            session_root,
            arch_root,
            log_file_path,
            save_sender: tx,
            save_stop,
        })
    }

    /// End the session, blocking until every pending save has been written.
    pub fn exit(self) {
        info!("Waiting for pending saves");

        self.save_stop.store(true, Ordering::Relaxed);
        while self.save_stop.load(Ordering::Relaxed) {
            thread::sleep(SAVE_POLL_PERIOD);
        }

        info!("Session ended");
    }

    /// Save `data` as JSON to `path`, relative to the session directory.
    pub fn save<P: AsRef<Path>, T: serde::Serialize + Send + 'static>(&self, path: P, data: T) {
        send(&self.save_sender, path.as_ref(), data);
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the number of seconds elapsed since the start of the session.
///
/// # Panics
/// - If no session has been started.
pub fn get_elapsed_seconds() -> f64 {
    let elapsed = Utc::now() - *get_epoch();
    time::duration_to_seconds(elapsed).unwrap_or(std::f64::NAN)
}

/// Time the session started at.
///
/// # Panics
/// - If no session has been started.
pub fn get_epoch() -> &'static DateTime<Utc> {
    match SESSION_EPOCH.get() {
        Some(e) => e,
        None => panic!("No session has been started"),
    }
}

/// Save `data` as JSON to `path`, relative to the session directory, without a handle to the
/// session.
pub fn save<P: AsRef<Path>, T: serde::Serialize + Send + 'static>(path: P, data: T) {
    match SAVE_SENDER.get().map(|m| m.lock()) {
        Some(Ok(sender)) => send(&sender, path.as_ref(), data),
        Some(Err(_)) => warn!("Save sender lock poisoned, {:?} not saved", path.as_ref()),
        None => warn!("No session started, {:?} not saved", path.as_ref()),
    }
}

/// Like [`save`], with the current time added to the file name: `dir/name.json` is saved as
/// `dir/name_<timestamp>.json`.
pub fn save_with_timestamp<P: AsRef<Path>, T: serde::Serialize + Send + 'static>(
    path: P,
    data: T,
) {
    let path = path.as_ref();

    let mut file_name = path.file_stem().unwrap_or_default().to_os_string();
    file_name.push(format!("_{}", Utc::now().format(TIMESTAMP_FORMAT)));
    if let Some(ext) = path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }

    save(path.with_file_name(file_name), data);
}

// -----------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// -----------------------------------------------------------------------------------------------

fn send<T: serde::Serialize + Send + 'static>(sender: &Sender<SaveRequest>, path: &Path, data: T) {
    let request = SaveRequest {
        path: path.to_path_buf(),
        data: Box::new(data),
    };

    if let Err(e) = sender.send(request) {
        warn!("Save thread has stopped, {:?} not saved: {}", path, e);
    }
}

fn save_thread(stop: &AtomicBool, session_root: &Path, receiver: Receiver<SaveRequest>) {
    loop {
        match receiver.recv_timeout(SAVE_POLL_PERIOD) {
            Ok(request) => {
                let full_path = session_root.join(&request.path);
                if let Err(e) = write_json(&full_path, request.data.as_ref()) {
                    warn!("Could not save {:?}: {}", full_path, e);
                }
            }
            // Only stop once the queue has been emptied
            Err(RecvTimeoutError::Timeout) if !stop.load(Ordering::Relaxed) => (),
            Err(_) => break,
        }
    }

    stop.store(false, Ordering::Relaxed);
}

fn write_json(full_path: &Path, data: &(dyn Serialize + Send)) -> Result<(), SaveError> {
    if full_path.extension().map_or(true, |e| e != "json") {
        return Err(SaveError::NotJson(full_path.extension().map(|e| e.to_os_string())));
    }

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(full_path)?;
    serde_json::to_writer_pretty(file, data)?;

    Ok(())
}
