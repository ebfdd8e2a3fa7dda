#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Runs the submission against the fixture variants and scores the order it
//! returns.
//!
//! Every variant gets its own interpreter process, so import-time side
//! effects run again and no module state carries over between variants.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use bon::Builder;
use itertools::{EitherOrBoth, Itertools};
use tracing::{error, info, warn};

use crate::{
    fixtures::{self, FixtureVariant},
    grade::{CheckResult, ComponentReport},
    python::{
        harness::{DriverReport, Harness, ReturnedItem},
        util::python_path,
    },
    rubric::{FUNCTIONAL_MAX_SCORE, Rubric},
};

/// Name of the single result reported when the module cannot be loaded.
const IMPORT_CHECK: &str = "Import submission";

/// A position where the returned identifier differs from the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// 1-based position.
    pub position: usize,
    /// What the submission returned there.
    pub actual:   String,
    /// What was expected there.
    pub expected: String,
}

/// Positional comparison of a returned list against the expected order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionScore {
    /// Every mismatched position, in order.
    pub mismatches: Vec<Mismatch>,
    /// Points earned.
    pub earned:     u32,
}

/// Compares `items` with `expected` position by position.
///
/// A full match earns `points`. Otherwise the earned points are
/// `floor(points * (n - m) / n * percent / 100)` for `m` mismatches out of `n`
/// positions, computed without floating point. Callers check lengths first;
/// surplus positions on either side count as mismatches.
pub fn score_positions(
    items: &[ReturnedItem],
    expected: &[String],
    points: u32,
    rubric: &Rubric,
) -> PositionScore {
    let mismatches: Vec<Mismatch> = items
        .iter()
        .zip_longest(expected)
        .enumerate()
        .filter_map(|(index, pair)| {
            let (actual, wanted) = match pair {
                EitherOrBoth::Both(actual, wanted) => {
                    if actual.matches(wanted) {
                        return None;
                    }
                    (actual.to_string(), wanted.clone())
                }
                EitherOrBoth::Left(actual) => (actual.to_string(), String::new()),
                EitherOrBoth::Right(wanted) => (String::new(), wanted.clone()),
            };
            Some(Mismatch {
                position: index + 1,
                actual,
                expected: wanted,
            })
        })
        .collect();

    if mismatches.is_empty() {
        return PositionScore {
            mismatches,
            earned: points,
        };
    }

    let total = items.len().max(expected.len()) as u64;
    let matched = total.saturating_sub(mismatches.len() as u64);
    let earned = u64::from(points) * matched * u64::from(rubric.partial_credit_percent) / (100 * total);

    PositionScore {
        mismatches,
        earned: u32::try_from(earned).unwrap_or(points),
    }
}

/// Runs each fixture variant in a fresh interpreter.
#[derive(Debug, Clone, Builder)]
pub struct FunctionalTester {
    /// Path of the submitted module.
    #[builder(into)]
    submission: PathBuf,
    /// Variants to run, in order.
    #[builder(default = fixtures::standard_variants())]
    variants:   Vec<FixtureVariant>,
    /// Interpreter override; discovered on `PATH` when unset.
    #[builder(into)]
    python:     Option<PathBuf>,
    /// Deadline for one interpreter run.
    deadline:   Option<Duration>,
    /// Rubric in effect.
    #[builder(default)]
    rubric:     Rubric,
}

impl FunctionalTester {
    /// Loads the submission once, then runs every variant.
    ///
    /// A submission that cannot be loaded, or an interpreter that cannot be
    /// found or started, yields a single failing result worth all
    /// [`FUNCTIONAL_MAX_SCORE`] points.
    pub async fn run_all_tests(&self) -> ComponentReport {
        let harness = match self.harness() {
            Ok(harness) => harness,
            Err(err) => {
                error!(%err, "no Python interpreter available");
                return ComponentReport::fatal(
                    IMPORT_CHECK,
                    FUNCTIONAL_MAX_SCORE,
                    format!("Could not find a Python interpreter: {err:#}"),
                );
            }
        };

        let import_failure = match harness.load().await {
            Ok(DriverReport::Imported) => None,
            Ok(DriverReport::ImportFailed {
                error_type,
                message,
            }) => Some(format!("Could not import the submission: {error_type}: {message}")),
            Ok(other) => Some(format!("Unexpected report while importing the submission: {other:?}")),
            Err(err) => Some(format!("Could not import the submission: {err}")),
        };
        if let Some(details) = import_failure {
            error!(submission = %self.submission.display(), "import failed");
            return ComponentReport::fatal(IMPORT_CHECK, FUNCTIONAL_MAX_SCORE, details);
        }

        let mut report = ComponentReport::new(FUNCTIONAL_MAX_SCORE);
        for variant in &self.variants {
            report.push(self.run_variant_with(&harness, variant).await);
        }

        info!(
            score = report.score(),
            max_score = report.max_score(),
            "functional tests finished"
        );
        report
    }

    /// Returns the submission path.
    pub fn submission(&self) -> &Path {
        &self.submission
    }

    /// Returns the variants in run order.
    pub fn variants(&self) -> &[FixtureVariant] {
        &self.variants
    }

    /// Runs a single variant in a fresh interpreter.
    pub async fn run_test_variant(&self, variant: &FixtureVariant) -> CheckResult {
        match self.harness() {
            Ok(harness) => self.run_variant_with(&harness, variant).await,
            Err(err) => CheckResult::fail(
                test_name(variant),
                variant.points(),
                format!("Could not find a Python interpreter: {err:#}"),
            ),
        }
    }

    /// Builds the harness, discovering the interpreter if needed.
    fn harness(&self) -> anyhow::Result<Harness> {
        let python = match &self.python {
            Some(python) => python.clone(),
            None => python_path()?,
        };
        Ok(Harness::new(python, self.submission.clone(), self.deadline))
    }

    /// Invokes the entry point with the variant's records and scores the
    /// outcome.
    async fn run_variant_with(&self, harness: &Harness, variant: &FixtureVariant) -> CheckResult {
        let name = test_name(variant);
        let points = variant.points();
        let expected = variant.expected();

        let report = match harness.invoke(variant.records()).await {
            Ok(report) => report,
            Err(err) => {
                warn!(variant = variant.name(), %err, "variant produced no result");
                return CheckResult::fail(name, points, format!("Execution failed: {err}"));
            }
        };

        let items = match report {
            DriverReport::ReturnedList { items } => items,
            DriverReport::ReturnedOther { type_name } => {
                warn!(variant = variant.name(), %type_name, "result is not a list");
                return CheckResult::fail(
                    name,
                    points,
                    format!("The function returned {type_name}, expected list"),
                );
            }
            DriverReport::Raised {
                error_type,
                message,
            } => {
                warn!(variant = variant.name(), %error_type, "submission raised");
                return CheckResult::fail(
                    name,
                    points,
                    format!("Exception during execution: {error_type}: {message}"),
                );
            }
            other @ (DriverReport::Imported | DriverReport::ImportFailed { .. }) => {
                return CheckResult::fail(
                    name,
                    points,
                    format!("Unexpected report from the harness: {other:?}"),
                );
            }
        };

        if items.len() != expected.len() {
            warn!(variant = variant.name(), got = items.len(), "wrong number of items");
            return CheckResult::fail(
                name,
                points,
                format!(
                    "Wrong number of items: got {}, expected {}",
                    items.len(),
                    expected.len()
                ),
            );
        }

        let scored = score_positions(&items, expected, points, &self.rubric);
        if scored.mismatches.is_empty() {
            info!(variant = variant.name(), points, "variant passed");
            return CheckResult::pass(
                name,
                points,
                format!("Order matches for all {} transactions", variant.records().len()),
            );
        }

        let listed = scored
            .mismatches
            .iter()
            .take(self.rubric.listed_mismatches)
            .map(|m| format!("  • position {}: '{}' instead of '{}'", m.position, m.actual, m.expected))
            .join("\n");
        info!(
            variant = variant.name(),
            earned = scored.earned,
            mismatches = scored.mismatches.len(),
            "variant partially matched"
        );
        CheckResult::partial(
            name,
            scored.earned,
            points,
            format!(
                "Partial match ({}/{} positions):\n{listed}",
                expected.len() - scored.mismatches.len(),
                expected.len()
            ),
        )
    }
}

/// Result label for a variant.
fn test_name(variant: &FixtureVariant) -> String {
    format!("Test {}", variant.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(items: &[&str]) -> Vec<ReturnedItem> {
        items.iter().map(|s| ReturnedItem::Text(s.to_string())).collect()
    }

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_swap_earns_seventy_percent_of_half() {
        let scored = score_positions(
            &text(&["A", "C", "B", "D"]),
            &owned(&["A", "B", "C", "D"]),
            10,
            &Rubric::default(),
        );
        assert_eq!(scored.earned, 3);
        assert_eq!(
            scored.mismatches.iter().map(|m| m.position).collect::<Vec<_>>(),
            vec![2, 3]
        );
        assert_eq!(scored.mismatches[0].actual, "C");
        assert_eq!(scored.mismatches[0].expected, "B");
    }

    #[test]
    fn exact_match_earns_full_points() {
        let scored = score_positions(&text(&["x", "y"]), &owned(&["x", "y"]), 15, &Rubric::default());
        assert!(scored.mismatches.is_empty());
        assert_eq!(scored.earned, 15);
    }

    #[test]
    fn everything_wrong_earns_nothing() {
        let scored = score_positions(&text(&["b", "a"]), &owned(&["a", "b"]), 15, &Rubric::default());
        assert_eq!(scored.mismatches.len(), 2);
        assert_eq!(scored.earned, 0);
    }

    #[test]
    fn non_string_items_are_mismatches() {
        let items = vec![
            ReturnedItem::Text("op_1".into()),
            ReturnedItem::Other { repr: "2".into() },
        ];
        let scored = score_positions(&items, &owned(&["op_1", "2"]), 10, &Rubric::default());
        assert_eq!(scored.mismatches.len(), 1);
        assert_eq!(scored.mismatches[0].actual, "2");
        assert_eq!(scored.earned, 3);
    }

    #[test]
    fn partial_credit_matches_floor_arithmetic() {
        // 10 positions, 1 mismatch, 15 points: 15 * 0.9 * 0.7 = 9.45
        let expected: Vec<String> = (0..10).map(|i| format!("op_{i}")).collect();
        let mut items: Vec<ReturnedItem> = expected.iter().cloned().map(ReturnedItem::Text).collect();
        items[9] = ReturnedItem::Text("op_x".into());
        let scored = score_positions(&items, &expected, 15, &Rubric::default());
        assert_eq!(scored.earned, 9);
    }

    #[test]
    fn empty_expected_sequence_is_a_full_match() {
        let scored = score_positions(&[], &[], 10, &Rubric::default());
        assert_eq!(scored.earned, 10);
    }
}
