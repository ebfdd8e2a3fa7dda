#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Combines the two component reports into a pass/fail decision.

use serde::{Deserialize, Serialize};

use super::results::ComponentReport;

/// Both component reports from one grading run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scorecard {
    /// Functional test results.
    functional:      ComponentReport,
    /// Static analysis results.
    static_analysis: ComponentReport,
}

impl Scorecard {
    /// Bundles the two reports.
    pub fn new(functional: ComponentReport, static_analysis: ComponentReport) -> Self {
        Self {
            functional,
            static_analysis,
        }
    }

    /// Functional test report.
    pub fn functional(&self) -> &ComponentReport {
        &self.functional
    }

    /// Static analysis report.
    pub fn static_analysis(&self) -> &ComponentReport {
        &self.static_analysis
    }

    /// Combined earned score.
    pub fn total(&self) -> u32 {
        self.functional.score() + self.static_analysis.score()
    }

    /// Combined budget.
    pub fn max_total(&self) -> u32 {
        self.functional.max_score() + self.static_analysis.max_score()
    }

    /// Share of the budget earned, in percent.
    pub fn percent(&self) -> f64 {
        match self.max_total() {
            0 => 0.0,
            max => f64::from(self.total()) * 100.0 / f64::from(max),
        }
    }

    /// True when the combined score reaches `threshold` percent of the
    /// combined budget.
    pub fn passes(&self, threshold: u32) -> bool {
        u64::from(self.total()) * 100 >= u64::from(threshold) * u64::from(self.max_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::CheckResult;

    fn report(max: u32, earned: u32) -> ComponentReport {
        let mut report = ComponentReport::new(max);
        report.push(CheckResult::partial("x", earned, max, ""));
        report
    }

    #[test]
    fn threshold_is_inclusive() {
        let card = Scorecard::new(report(60, 40), report(40, 30));
        assert_eq!(card.total(), 70);
        assert_eq!(card.max_total(), 100);
        assert!(card.passes(70));
        assert!(!card.passes(71));
    }

    #[test]
    fn percent_of_empty_budget_is_zero() {
        let card = Scorecard::new(ComponentReport::new(0), ComponentReport::new(0));
        assert_eq!(card.percent(), 0.0);
    }
}
