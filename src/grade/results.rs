#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use bon::bon;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Outcome marker attached to every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Full credit.
    Pass,
    /// Some credit, below the check's ceiling.
    Partial,
    /// No credit.
    Fail,
}

impl CheckStatus {
    /// Icon used when results are shown in a table.
    pub fn icon(self) -> &'static str {
        match self {
            CheckStatus::Pass => "✅",
            CheckStatus::Partial => "⚠️",
            CheckStatus::Fail => "❌",
        }
    }
}

impl Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.icon())
    }
}

#[derive(Tabled, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The atomic unit of output from either scorer.
pub struct CheckResult {
    #[tabled(rename = "")]
    /// * `status`: pass, partial or fail
    status:    CheckStatus,
    #[tabled(rename = "Check")]
    /// * `name`: human-readable label
    name:      String,
    #[tabled(rename = "Score")]
    /// * `score`: points earned, never above `max_score`
    score:     u32,
    #[tabled(rename = "Max")]
    /// * `max_score`: the check's fixed ceiling
    max_score: u32,
    #[tabled(skip)]
    /// * `heuristic`: true when the check is a text heuristic rather than a
    ///   correctness check
    heuristic: bool,
    #[tabled(rename = "Details")]
    /// * `details`: explanation of the score
    details:   String,
}

#[bon]
impl CheckResult {
    /// Creates a result, clamping `score` to `max_score`.
    #[builder]
    pub fn new(
        #[builder(into)] name: String,
        status: CheckStatus,
        score: u32,
        max_score: u32,
        #[builder(into, default)] details: String,
        #[builder(default)] heuristic: bool,
    ) -> Self {
        Self {
            status,
            name,
            score: score.min(max_score),
            max_score,
            heuristic,
            details,
        }
    }

    /// Full credit.
    pub fn pass(name: impl Into<String>, max_score: u32, details: impl Into<String>) -> Self {
        Self::builder()
            .name(name)
            .status(CheckStatus::Pass)
            .score(max_score)
            .max_score(max_score)
            .details(details)
            .build()
    }

    /// Partial credit.
    pub fn partial(
        name: impl Into<String>,
        score: u32,
        max_score: u32,
        details: impl Into<String>,
    ) -> Self {
        Self::builder()
            .name(name)
            .status(CheckStatus::Partial)
            .score(score)
            .max_score(max_score)
            .details(details)
            .build()
    }

    /// No credit.
    pub fn fail(name: impl Into<String>, max_score: u32, details: impl Into<String>) -> Self {
        Self::builder()
            .name(name)
            .status(CheckStatus::Fail)
            .score(0)
            .max_score(max_score)
            .details(details)
            .build()
    }

    /// Marks the result as coming from a heuristic check.
    pub fn heuristic(mut self) -> Self {
        self.heuristic = true;
        self
    }

    /// Returns the status.
    pub fn status(&self) -> CheckStatus {
        self.status
    }

    /// Returns the check label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the points earned.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Returns the ceiling.
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    /// Returns true for heuristic checks.
    pub fn is_heuristic(&self) -> bool {
        self.heuristic
    }

    /// Returns the explanation.
    pub fn details(&self) -> &str {
        &self.details
    }
}

/// Ordered results of one grading component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentReport {
    /// Results in the order the checks ran.
    results:         Vec<CheckResult>,
    /// The component's fixed budget.
    max_score:       u32,
    /// Set when the submission still carries its stub marker.
    not_implemented: bool,
}

impl ComponentReport {
    /// Creates an empty report for a component worth `max_score` points.
    pub fn new(max_score: u32) -> Self {
        Self {
            results: Vec::new(),
            max_score,
            not_implemented: false,
        }
    }

    /// A report holding a single failing result that covers the whole budget.
    pub fn fatal(name: impl Into<String>, max_score: u32, details: impl Into<String>) -> Self {
        let mut report = Self::new(max_score);
        report.push(CheckResult::fail(name, max_score, details));
        report
    }

    /// Appends a result.
    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    /// Flags the submission as not implemented.
    pub fn mark_not_implemented(&mut self) {
        self.not_implemented = true;
    }

    /// Returns the results.
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Sum of the earned scores.
    pub fn score(&self) -> u32 {
        self.results.iter().map(CheckResult::score).sum()
    }

    /// The component's budget.
    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    /// Whether a stub marker was found.
    pub fn not_implemented(&self) -> bool {
        self.not_implemented
    }

    /// Splits the report into `(results, score, max_score)`.
    pub fn into_parts(self) -> (Vec<CheckResult>, u32, u32) {
        let score = self.score();
        (self.results, score, self.max_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_clamps_score_to_ceiling() {
        let result = CheckResult::builder()
            .name("over")
            .status(CheckStatus::Pass)
            .score(12)
            .max_score(10)
            .build();
        assert_eq!(result.score(), 10);
        assert_eq!(result.details(), "");
    }

    #[test]
    fn report_score_is_sum_of_results() {
        let mut report = ComponentReport::new(20);
        report.push(CheckResult::pass("a", 10, ""));
        report.push(CheckResult::partial("b", 3, 5, ""));
        report.push(CheckResult::fail("c", 5, ""));

        let (results, score, max) = report.into_parts();
        assert_eq!(results.len(), 3);
        assert_eq!(score, 13);
        assert_eq!(max, 20);
    }

    #[test]
    fn fatal_report_covers_whole_budget() {
        let report = ComponentReport::fatal("load", 40, "boom");
        assert_eq!(report.results().len(), 1);
        assert_eq!(report.score(), 0);
        assert_eq!(report.results()[0].max_score(), 40);
        assert_eq!(report.results()[0].status(), CheckStatus::Fail);
    }
}
