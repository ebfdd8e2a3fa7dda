#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Weights, thresholds and markers shared by both scorers.
//!
//! Every limit a check compares against is stated here once; the checks in
//! [`crate::analysis`] and the partial-credit formula in
//! [`crate::functional`] read them from a [`Rubric`] instead of carrying their
//! own literals.

use serde::{Deserialize, Serialize};

/// Total points available from static analysis.
pub const STATIC_MAX_SCORE: u32 = 40;

/// Total points available from functional tests.
pub const FUNCTIONAL_MAX_SCORE: u32 = 60;

/// Name of the function every submission must define.
pub const ENTRY_POINT: &str = "sort_transactions";

/// The single parameter name the entry point is expected to take.
pub const ENTRY_PARAMETER: &str = "transactions";

/// Per-check point ceilings for the static analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticWeights {
    /// Entry point existence and signature.
    pub entry_point:    u32,
    /// Entry point found but with the wrong signature.
    pub entry_partial:  u32,
    /// No stub marker left in the source.
    pub stub:           u32,
    /// snake_case naming.
    pub naming:         u32,
    /// Calendar words kept out of string literals.
    pub magic_values:   u32,
    /// Awarded when magic literals exceed the threshold.
    pub magic_partial:  u32,
    /// At least one `try` block.
    pub error_handling: u32,
    /// Awarded when no `try` block exists.
    pub error_partial:  u32,
    /// Absence of duplicated lines.
    pub duplication:    u32,
    /// Idiom bonus: regular expressions.
    pub regex_idiom:    u32,
    /// Idiom bonus: month lookup table.
    pub month_table:    u32,
}

impl Default for StaticWeights {
    fn default() -> Self {
        Self {
            entry_point:    10,
            entry_partial:  5,
            stub:           5,
            naming:         5,
            magic_values:   5,
            magic_partial:  3,
            error_handling: 5,
            error_partial:  3,
            duplication:    5,
            regex_idiom:    3,
            month_table:    2,
        }
    }
}

impl StaticWeights {
    /// Sum of the per-check ceilings.
    pub fn total(&self) -> u32 {
        self.entry_point
            + self.stub
            + self.naming
            + self.magic_values
            + self.error_handling
            + self.duplication
            + self.regex_idiom
            + self.month_table
    }
}

/// Rubric configuration for one grading run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rubric {
    /// Static check weights.
    pub weights:                 StaticWeights,
    /// Pattern every function and variable name must match.
    pub snake_case_pattern:      String,
    /// Text whose presence marks an unimplemented submission.
    pub stub_marker:             String,
    /// Words whose presence in a string literal counts as a magic value.
    pub magic_words:             Vec<String>,
    /// Magic literal count above which the check only gives partial credit.
    pub magic_threshold:         usize,
    /// Lines must be strictly longer than this to count as duplicates.
    pub duplicate_min_len:       usize,
    /// Distinct duplicated lines above which credit is reduced.
    pub duplicate_threshold:     usize,
    /// Duplicated lines listed in details.
    pub duplicate_examples:      usize,
    /// Characters of each duplicated line shown in details.
    pub duplicate_excerpt_chars: usize,
    /// Pattern that detects use of the `re` module.
    pub regex_import_pattern:    String,
    /// Patterns that detect a month-name lookup table.
    pub month_table_patterns:    Vec<String>,
    /// Idiom points needed for the idiom check to count as passed.
    pub idiom_pass_score:        u32,
    /// Violations listed before the remainder is summarized.
    pub listed_violations:       usize,
    /// Percentage of proportional credit kept on a partial functional match.
    pub partial_credit_percent:  u32,
    /// Mismatched positions listed in a variant's details.
    pub listed_mismatches:       usize,
}

impl Default for Rubric {
    fn default() -> Self {
        Self {
            weights:                 StaticWeights::default(),
            snake_case_pattern:      r"^[a-z_][a-z0-9_]*$".to_string(),
            stub_marker:             "raise NotImplementedError".to_string(),
            magic_words:             [
                "январь",
                "февраль",
                "января",
                "февраля",
                "сегодня",
                "вчера",
                "прошлом месяце",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            magic_threshold:         8,
            duplicate_min_len:       20,
            duplicate_threshold:     2,
            duplicate_examples:      3,
            duplicate_excerpt_chars: 50,
            regex_import_pattern:    r"import re|from re import".to_string(),
            month_table_patterns:    vec![
                r"(?i)dict.*[а-яё]".to_string(),
                r"(?i)\{.*('январь'|'февраль'|'января')".to_string(),
            ],
            idiom_pass_score:        4,
            listed_violations:       5,
            partial_credit_percent:  70,
            listed_mismatches:       5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_fill_the_static_budget() {
        assert_eq!(StaticWeights::default().total(), STATIC_MAX_SCORE);
    }

    #[test]
    fn soft_checks_never_drop_to_zero() {
        let weights = StaticWeights::default();
        assert!(weights.magic_partial > 0);
        assert!(weights.error_partial > 0);
        assert!(weights.entry_partial < weights.entry_point);
    }
}
