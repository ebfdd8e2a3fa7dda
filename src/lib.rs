//! # txgrade
//!
//! Grades one Python exercise: a `sort_transactions(transactions)` function
//! that orders transaction records newest first and returns their
//! identifiers. A functional harness runs the submission against fixed
//! fixtures (60 points) and a static analyzer scores its syntax tree against
//! a code-quality rubric (40 points).

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Static analysis of the submitted source
pub mod analysis;
/// Environment-driven runtime configuration
pub mod config;
/// Fixed fixture data for the exercise
pub mod fixtures;
/// Functional tests run in a fresh interpreter per variant
pub mod functional;
/// Check results, component reports and the combined scorecard
pub mod grade;
/// Subprocess plumbing
pub mod process;
/// Parsing and running Python
pub mod python;
/// Weights and thresholds shared by both scorers
pub mod rubric;

use std::path::PathBuf;

use analysis::StaticAnalyzer;
use functional::FunctionalTester;
use grade::Scorecard;
use tracing::info;

/// Runs both components against `submission` with the configured
/// interpreter and deadline.
pub async fn grade_submission(submission: impl Into<PathBuf>) -> Scorecard {
    let submission = submission.into();
    info!(submission = %submission.display(), "grading submission");

    let tester = FunctionalTester::builder()
        .submission(submission.clone())
        .maybe_python(config::python_override())
        .maybe_deadline(config::variant_timeout())
        .build();
    let functional = tester.run_all_tests().await;
    let static_analysis = StaticAnalyzer::from_path(submission).analyze();

    Scorecard::new(functional, static_analysis)
}
