//! Parameter file loading
//!
//! Parameter files are TOML, kept in `$DWA_SW_ROOT/params` and deserialised straight into the
//! parameter struct of the executable or module they configure.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (DWA_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot read the parameter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot parse the parameter file: {0}")]
    DeserialiseError(toml::de::Error)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file from the params directory.
///
/// `file_name` is relative to `$DWA_SW_ROOT/params`.
pub fn load<P: DeserializeOwned>(file_name: &str) -> Result<P, LoadError> {
    let root = crate::host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;

    load_from_path(root.join("params").join(file_name))
}

/// Load a parameter file from anywhere.
pub fn load_from_path<P: DeserializeOwned, Q: AsRef<Path>>(path: Q) -> Result<P, LoadError> {
    let text = fs::read_to_string(path).map_err(LoadError::FileLoadError)?;

    from_str(&text)
}

/// Parse parameters from TOML text.
pub fn from_str<P: DeserializeOwned>(text: &str) -> Result<P, LoadError> {
    toml::from_str(text).map_err(LoadError::DeserialiseError)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Limits {
        max_velocity_ms: f64,
        samples: usize,
    }

    #[test]
    fn test_from_str() {
        let limits: Limits = from_str("max_velocity_ms = 1.5\nsamples = 4\n").unwrap();
        assert_eq!(limits.max_velocity_ms, 1.5);
        assert_eq!(limits.samples, 4);

        assert!(matches!(
            from_str::<Limits>("max_velocity_ms = \"fast\""),
            Err(LoadError::DeserialiseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_from_path::<Limits, _>("/nonexistent/dwa.toml"),
            Err(LoadError::FileLoadError(_))
        ));
    }
}
