#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runtime configuration read from the environment.

use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
    time::Duration,
};

use tracing::warn;

/// Submission graded when nothing else is configured.
pub const DEFAULT_SUBMISSION: &str = "task.py";

/// Combined percentage a submission needs to pass.
pub const DEFAULT_PASS_THRESHOLD: u32 = 70;

/// Environment variable naming the submission file.
const SUBMISSION_ENV: &str = "TXGRADE_SUBMISSION";
/// Environment variable naming the Python interpreter.
const PYTHON_ENV: &str = "TXGRADE_PYTHON";
/// Environment variable holding the per-variant deadline in seconds.
const TIMEOUT_ENV: &str = "TXGRADE_VARIANT_TIMEOUT_SECS";
/// Environment variable holding the pass threshold.
const THRESHOLD_ENV: &str = "TXGRADE_PASS_THRESHOLD";

/// Runtime configuration shared across the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigState {
    /// Path of the submitted module.
    submission:      PathBuf,
    /// Interpreter override, if any.
    python:          Option<PathBuf>,
    /// Deadline for one variant run; `None` waits forever.
    variant_timeout: Option<Duration>,
    /// Combined pass threshold, in percent.
    pass_threshold:  u32,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            submission:      PathBuf::from(DEFAULT_SUBMISSION),
            python:          None,
            variant_timeout: None,
            pass_threshold:  DEFAULT_PASS_THRESHOLD,
        }
    }
}

impl ConfigState {
    /// Reads the configuration from the process environment.
    fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from any variable lookup. Blank values count as
    /// unset; unparseable numbers fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let submission = read(SUBMISSION_ENV)
            .map(PathBuf::from)
            .unwrap_or(defaults.submission);
        let python = read(PYTHON_ENV).map(PathBuf::from);

        let variant_timeout = read(TIMEOUT_ENV)
            .and_then(|raw| parse_or_warn::<u64>(TIMEOUT_ENV, &raw))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let pass_threshold = read(THRESHOLD_ENV)
            .and_then(|raw| parse_or_warn::<u32>(THRESHOLD_ENV, &raw))
            .and_then(|value| {
                if value > 100 {
                    warn!(variable = THRESHOLD_ENV, value, "threshold above 100, using default");
                    None
                } else {
                    Some(value)
                }
            })
            .unwrap_or(defaults.pass_threshold);

        Self {
            submission,
            python,
            variant_timeout,
            pass_threshold,
        }
    }

    /// Returns the submission path.
    pub fn submission(&self) -> &Path {
        &self.submission
    }

    /// Returns the interpreter override, if any.
    pub fn python(&self) -> Option<&Path> {
        self.python.as_deref()
    }

    /// Returns the per-variant deadline, if one is set.
    pub fn variant_timeout(&self) -> Option<Duration> {
        self.variant_timeout
    }

    /// Returns the combined pass threshold in percent.
    pub fn pass_threshold(&self) -> u32 {
        self.pass_threshold
    }
}

/// Parses `raw`, warning and returning `None` when it is not a valid `T`.
fn parse_or_warn<T: FromStr>(variable: &str, raw: &str) -> Option<T> {
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable, value = raw, "ignoring invalid value, using default");
            None
        }
    }
}

/// Global configuration, read from the environment on first use.
static CONFIG: OnceLock<ConfigState> = OnceLock::new();

/// Returns the active configuration, initializing it on demand.
pub fn get() -> &'static ConfigState {
    CONFIG.get_or_init(ConfigState::from_env)
}

/// Returns the configured submission path.
pub fn submission_path() -> PathBuf {
    get().submission().to_path_buf()
}

/// Returns the configured interpreter override.
pub fn python_override() -> Option<&'static Path> {
    get().python()
}

/// Returns the configured per-variant deadline.
pub fn variant_timeout() -> Option<Duration> {
    get().variant_timeout()
}

/// Returns the configured pass threshold.
pub fn pass_threshold() -> u32 {
    get().pass_threshold()
}
