//! CSV archives
//!
//! Modules record one flat row per cycle in a CSV file under the session's `arch` directory. To
//! archive a module implement [`Archived`] on it, holding an [`Archiver`] opened in `init`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Writer of one CSV archive file.
///
/// The default archiver is closed and drops every record, which is what modules hold when
/// running without a session.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A struct which archives its state once per cycle.
pub trait Archived {
    /// Append this cycle's row to the archive.
    fn write(&mut self) -> Result<(), Box<dyn Error>>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Open an archive at `path`, relative to the session's archive directory.
    ///
    /// Any existing file is replaced. The header row is written with the first record.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P
    ) -> Result<Self, Box<dyn Error>> {
        let full_path = session.arch_root.join(path);

        if let Some(dir) = full_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let writer = WriterBuilder::new()
            .has_headers(true)
            .from_writer(File::create(full_path)?);

        Ok(Self {
            writer: Some(writer)
        })
    }

    /// Append a record, flushing it to disk straight away.
    ///
    /// Records must be flat structs, nested structs and sequences can't be written to CSV.
    pub fn serialise<T: serde::Serialize>(
        &mut self, record: T
    ) -> Result<(), Box<dyn Error>> {
        if let Some(ref mut w) = self.writer {
            w.serialize(record)?;
            w.flush()?;
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

    #[derive(serde::Serialize)]
    struct Row {
        time_s: f64,
        ok: bool,
    }

    #[test]
    fn test_closed_archiver_drops_records() {
        let mut arch = Archiver::default();

        assert!(arch.serialise(Row { time_s: 0.1, ok: true }).is_ok());
    }
}
