#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs a submission inside a fresh interpreter and decodes what happened.
//!
//! Each call spawns a new process with an embedded driver script. The driver
//! loads the submission from its path, optionally calls the entry point with
//! JSON records read from stdin, and writes a single tagged JSON object to
//! the real stdout. Anything the submission prints goes to stderr.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    fixtures::TransactionRecord,
    process::{self, CommandSpec, ProcessError},
    rubric::ENTRY_POINT,
};

/// Source of the driver executed with `python -c`.
pub const DRIVER: &str = include_str!("driver.py");

/// Characters of stderr kept when a run ends without a report.
const STDERR_TAIL_CHARS: usize = 800;

/// Errors that prevent a run from producing a report.
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// The interpreter could not be started or its pipes failed.
    #[error("could not run the Python interpreter: {0}")]
    Process(#[source] ProcessError),

    /// The run exceeded its deadline.
    #[error("execution timed out after {0:?}")]
    Timeout(Duration),

    /// The interpreter exited without writing a report.
    #[error("the interpreter exited ({status}) without reporting a result\n{stderr}")]
    NoReport {
        /// Exit status as text.
        status: String,
        /// Tail of stderr.
        stderr: String,
    },

    /// The report could not be decoded.
    #[error("could not decode the harness report: {source}\n{stderr}")]
    Malformed {
        /// Decoding error.
        source: serde_json::Error,
        /// Tail of stderr.
        stderr: String,
    },
}

impl From<ProcessError> for SubmissionError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Timeout(limit) => SubmissionError::Timeout(limit),
            other => SubmissionError::Process(other),
        }
    }
}

/// One element of a returned list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReturnedItem {
    /// A `str` element.
    Text(String),
    /// Any other element, by its `repr`.
    Other {
        /// Python `repr` of the element.
        repr: String,
    },
}

impl ReturnedItem {
    /// True when the element is a string equal to `expected`.
    pub fn matches(&self, expected: &str) -> bool {
        matches!(self, ReturnedItem::Text(text) if text == expected)
    }
}

impl Display for ReturnedItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnedItem::Text(text) => write!(f, "{text}"),
            ReturnedItem::Other { repr } => write!(f, "{repr}"),
        }
    }
}

/// What the driver observed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DriverReport {
    /// The module loaded and defines the entry point.
    Imported,
    /// Loading the module or finding the entry point raised.
    ImportFailed {
        /// Exception class name.
        error_type: String,
        /// Exception message.
        message:    String,
    },
    /// The entry point raised.
    Raised {
        /// Exception class name.
        error_type: String,
        /// Exception message.
        message:    String,
    },
    /// The entry point returned a list.
    ReturnedList {
        /// The list's elements.
        items: Vec<ReturnedItem>,
    },
    /// The entry point returned something other than a list.
    ReturnedOther {
        /// `type(result).__name__`.
        type_name: String,
    },
}

/// A Python interpreter plus the submission it runs.
#[derive(Debug, Clone)]
pub struct Harness {
    /// Interpreter executable.
    python:     PathBuf,
    /// Path of the submitted module.
    submission: PathBuf,
    /// Optional limit per run.
    deadline:   Option<Duration>,
}

impl Harness {
    /// Creates a harness for `submission` run by `python`.
    pub fn new(
        python: impl Into<PathBuf>,
        submission: impl Into<PathBuf>,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            python: python.into(),
            submission: submission.into(),
            deadline,
        }
    }

    /// Returns the submission path.
    pub fn submission(&self) -> &Path {
        &self.submission
    }

    /// Loads the module in a fresh interpreter without calling it.
    pub async fn load(&self) -> Result<DriverReport, SubmissionError> {
        self.run("import", None).await
    }

    /// Loads the module in a fresh interpreter and calls the entry point with
    /// `records`.
    pub async fn invoke(
        &self,
        records: &[TransactionRecord],
    ) -> Result<DriverReport, SubmissionError> {
        let payload = serde_json::to_vec(records).map_err(|source| {
            SubmissionError::Malformed {
                source,
                stderr: String::new(),
            }
        })?;
        self.run("call", Some(payload)).await
    }

    /// Spawns the driver in `mode`.
    async fn run(
        &self,
        mode: &str,
        stdin: Option<Vec<u8>>,
    ) -> Result<DriverReport, SubmissionError> {
        // The working directory moves next to the submission, so the module
        // path must not be relative to ours.
        let module = std::path::absolute(&self.submission).unwrap_or_else(|_| self.submission.clone());
        let mut spec = CommandSpec::new(&self.python)
            .arg("-c")
            .arg(DRIVER)
            .arg(module.as_os_str())
            .arg(mode)
            .arg(ENTRY_POINT);
        if let Some(dir) = module.parent()
            && dir.is_dir()
        {
            spec = spec.current_dir(dir);
        }

        let captured = process::run_captured(&spec, stdin, self.deadline).await?;
        let stdout = captured.stdout_text();
        debug!(mode, status = %captured.status, "driver finished");

        if stdout.trim().is_empty() {
            return Err(SubmissionError::NoReport {
                status: captured.status.to_string(),
                stderr: tail(&captured.stderr_text()),
            });
        }

        serde_json::from_str(stdout.trim()).map_err(|source| SubmissionError::Malformed {
            source,
            stderr: tail(&captured.stderr_text()),
        })
    }
}

/// Last few hundred characters of `text`.
fn tail(text: &str) -> String {
    let count = text.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return text.trim_end().to_string();
    }
    let kept: String = text.chars().skip(count - STDERR_TAIL_CHARS).collect();
    format!("...{}", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_outcome() {
        let imported: DriverReport = serde_json::from_str(r#"{"outcome": "imported"}"#).unwrap();
        assert_eq!(imported, DriverReport::Imported);

        let raised: DriverReport = serde_json::from_str(
            r#"{"outcome": "raised", "error_type": "KeyError", "message": "'date'"}"#,
        )
        .unwrap();
        assert_eq!(
            raised,
            DriverReport::Raised {
                error_type: "KeyError".into(),
                message:    "'date'".into(),
            }
        );

        let other: DriverReport =
            serde_json::from_str(r#"{"outcome": "returned_other", "type_name": "dict"}"#).unwrap();
        assert_eq!(other, DriverReport::ReturnedOther {
            type_name: "dict".into(),
        });
    }

    #[test]
    fn non_string_items_never_match() {
        let report: DriverReport = serde_json::from_str(
            r#"{"outcome": "returned_list", "items": ["op_1", {"repr": "5"}]}"#,
        )
        .unwrap();
        let DriverReport::ReturnedList { items } = report else {
            panic!("expected a list");
        };
        assert!(items[0].matches("op_1"));
        assert!(!items[1].matches("5"));
        assert_eq!(items[1].to_string(), "5");
    }

    #[test]
    fn tail_keeps_the_end() {
        let long = "x".repeat(STDERR_TAIL_CHARS + 10) + "END";
        let kept = tail(&long);
        assert!(kept.starts_with("..."));
        assert!(kept.ends_with("END"));
    }
}
