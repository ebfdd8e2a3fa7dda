#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Static analysis of a submission against the code-quality rubric.
//!
//! The source is parsed with tree-sitter, lowered into a [`SyntaxTree`] and
//! run through seven independent checks. Nothing here executes the
//! submission.

/// The individual rubric checks.
pub mod checks;

use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    grade::{CheckStatus, ComponentReport},
    python::{parser::Parser, syntax::SyntaxTree},
    rubric::{Rubric, STATIC_MAX_SCORE},
};

/// Name of the single result reported when the source cannot be analyzed.
const LOAD_CHECK: &str = "Load source";

/// Reasons the analyzer cannot get as far as running its checks.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The submission could not be read as UTF-8 text.
    #[error("could not read {path}: {source}")]
    Unreadable {
        /// File that was read.
        path:   PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The grammar could not be loaded or the parser gave up.
    #[error("could not parse the source: {0}")]
    Parser(String),

    /// The parse tree contains an error or missing node.
    #[error("syntax error in Python source on line {line}")]
    Syntax {
        /// 1-based line of the first error node.
        line: usize,
    },

    /// A rubric pattern is not a valid regular expression.
    #[error("invalid rubric pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Where the analyzed source comes from.
#[derive(Debug, Clone)]
enum SourceOrigin {
    /// Read from disk on every analysis.
    Path(PathBuf),
    /// Held in memory.
    Inline(String),
}

/// Rubric patterns compiled once per analysis.
#[derive(Debug, Clone)]
pub struct Patterns {
    /// Names must match this.
    pub snake_case:   Regex,
    /// Detects use of the `re` module.
    pub regex_import: Regex,
    /// Detects a month lookup table.
    pub month_tables: Vec<Regex>,
}

impl Patterns {
    /// Compiles every pattern the rubric names.
    pub fn compile(rubric: &Rubric) -> Result<Self, AnalysisError> {
        Ok(Self {
            snake_case:   Regex::new(&rubric.snake_case_pattern)?,
            regex_import: Regex::new(&rubric.regex_import_pattern)?,
            month_tables: rubric
                .month_table_patterns
                .iter()
                .map(|pattern| Regex::new(pattern))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Everything a check may look at.
#[derive(Debug)]
pub struct Submission<'a> {
    /// Raw source text.
    pub source:   &'a str,
    /// Lowered syntax tree.
    pub tree:     &'a SyntaxTree,
    /// Thresholds and weights.
    pub rubric:   &'a Rubric,
    /// Compiled rubric patterns.
    pub patterns: &'a Patterns,
}

/// Scores one submission's source against the rubric.
#[derive(Debug, Clone)]
pub struct StaticAnalyzer {
    /// Source location.
    origin: SourceOrigin,
    /// Rubric in effect.
    rubric: Rubric,
}

impl StaticAnalyzer {
    /// Analyzer for the file at `path`; the file is read when analyzing.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: SourceOrigin::Path(path.into()),
            rubric: Rubric::default(),
        }
    }

    /// Analyzer for source text held in memory.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            origin: SourceOrigin::Inline(source.into()),
            rubric: Rubric::default(),
        }
    }

    /// Replaces the default rubric.
    pub fn with_rubric(mut self, rubric: Rubric) -> Self {
        self.rubric = rubric;
        self
    }

    /// Returns the submission path, if the analyzer reads from disk.
    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            SourceOrigin::Path(path) => Some(path),
            SourceOrigin::Inline(_) => None,
        }
    }

    /// Runs every check and returns the component report.
    ///
    /// Unreadable or unparseable source yields a single failing result worth
    /// the whole budget.
    pub fn analyze(&self) -> ComponentReport {
        match self.try_analyze() {
            Ok(report) => {
                info!(
                    score = report.score(),
                    max_score = report.max_score(),
                    "static analysis finished"
                );
                report
            }
            Err(err) => {
                error!(%err, "static analysis could not run");
                ComponentReport::fatal(LOAD_CHECK, STATIC_MAX_SCORE, err.to_string())
            }
        }
    }

    /// Loads, parses and checks the source.
    fn try_analyze(&self) -> Result<ComponentReport, AnalysisError> {
        let source = self.load()?;
        let parser = Parser::new(source).map_err(|err| AnalysisError::Parser(format!("{err:#}")))?;
        if let Some(line) = parser.first_syntax_error() {
            return Err(AnalysisError::Syntax { line });
        }
        let tree =
            SyntaxTree::lower(&parser).map_err(|err| AnalysisError::Parser(format!("{err:#}")))?;
        let patterns = Patterns::compile(&self.rubric)?;

        let submission = Submission {
            source: parser.code(),
            tree: &tree,
            rubric: &self.rubric,
            patterns: &patterns,
        };

        let mut report = ComponentReport::new(STATIC_MAX_SCORE);
        report.push(checks::entry_point(&submission));
        let stub = checks::stub(&submission);
        if stub.status() == CheckStatus::Fail {
            report.mark_not_implemented();
        }
        report.push(stub);
        report.push(checks::naming(&submission));
        report.push(checks::magic_values(&submission));
        report.push(checks::error_handling(&submission));
        report.push(checks::duplication(&submission));
        report.push(checks::idioms(&submission));
        Ok(report)
    }

    /// Returns the source text.
    fn load(&self) -> Result<String, AnalysisError> {
        match &self.origin {
            SourceOrigin::Inline(source) => Ok(source.clone()),
            SourceOrigin::Path(path) => {
                std::fs::read_to_string(path).map_err(|source| AnalysisError::Unreadable {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}
