#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Python toolchain discovery.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use which::which;

use crate::config;

/// Locations checked when nothing suitable is on `PATH`.
const COMMON_LOCATIONS: [&str; 3] = [
    "/usr/bin/python3",
    "/usr/local/bin/python3",
    "/opt/homebrew/bin/python3",
];

/// Finds the Python interpreter used to run submissions.
///
/// An explicit `TXGRADE_PYTHON` override wins; otherwise `python3` and then
/// `python` are looked up on `PATH`, then a few common install locations.
pub fn python_path() -> Result<PathBuf> {
    if let Some(path) = config::python_override() {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = which("python3").or_else(|_| which("python")) {
        return Ok(path);
    }

    COMMON_LOCATIONS
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            anyhow!("Could not find a Python interpreter. Install python3 or set TXGRADE_PYTHON.")
        })
}
