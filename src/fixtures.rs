#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Fixed test data for the transaction-sorting exercise.
//!
//! Relative dates resolve against [`CURRENT_DATE`]. Every expected sequence
//! lists identifiers newest first.

use serde::Serialize;

/// Reference "today" used by the relative date terms, as `YYYY-MM-DD`.
pub const CURRENT_DATE: &str = "2024-03-15";

/// Records of the combined variant that are actually sent to the submission.
pub const COMBINED_PREFIX_LEN: usize = 15;

/// Boundary-variant identifiers appended to the combined variant's expected
/// order.
pub const COMBINED_BOUNDARY_PREFIX_LEN: usize = 5;

/// One transaction as handed to the submission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Free-form date text.
    pub date:      &'static str,
    /// Identifier the submission must return.
    pub operation: &'static str,
    /// Transaction amount.
    pub amount:    f64,
}

/// Shorthand for the tables below.
const fn tx(date: &'static str, operation: &'static str, amount: f64) -> TransactionRecord {
    TransactionRecord {
        date,
        operation,
        amount,
    }
}

/// Absolute and relative dates in every supported format.
pub const BASIC_DATA: &[TransactionRecord] = &[
    tx("12.03.2024", "op_101", -1250.0),
    tx("сегодня", "op_102", -340.5),
    tx("2024-01-20", "op_103", 15000.0),
    tx("5 марта 2024", "op_104", -99.9),
    tx("28/02/2024", "op_105", -4200.0),
    tx("вчера", "op_106", -75.0),
    tx("в прошлом месяце", "op_107", 3100.0),
    tx("01.01.2024", "op_108", -1999.0),
    tx("10 февраля 2024", "op_109", -560.0),
    tx("2024-03-01", "op_110", 820.0),
];

/// Newest-first order of [`BASIC_DATA`].
pub const BASIC_EXPECTED: &[&str] = &[
    "op_102", "op_106", "op_101", "op_104", "op_110", "op_105", "op_107", "op_109", "op_103",
    "op_108",
];

/// Leap days, month ends and year boundaries.
pub const BOUNDARY_DATA: &[TransactionRecord] = &[
    tx("31.12.2023", "op_201", -150.0),
    tx("29.02.2020", "op_202", 2900.0),
    tx("1 января 2023", "op_203", -10.0),
    tx("2023-12-01", "op_204", -640.0),
    tx("31/01/2023", "op_205", 1200.0),
    tx("30 ноября 2023", "op_206", -88.8),
    tx("28.02.2023", "op_207", -300.0),
    tx("01/03/2023", "op_208", 450.0),
    tx("31 декабря 2022", "op_209", -5000.0),
    tx("1999-12-31", "op_210", 1999.0),
];

/// Newest-first order of [`BOUNDARY_DATA`].
pub const BOUNDARY_EXPECTED: &[&str] = &[
    "op_201", "op_204", "op_206", "op_208", "op_207", "op_205", "op_203", "op_209", "op_202",
    "op_210",
];

/// Surrounding whitespace and arbitrary letter case.
pub const NOISY_DATA: &[TransactionRecord] = &[
    tx("  СЕГОДНЯ  ", "op_301", -20.0),
    tx("Вчера", "op_302", -45.0),
    tx(" 07.03.2024 ", "op_303", 700.0),
    tx("20 ФЕВРАЛЯ 2024", "op_304", -1300.0),
    tx(" 2024-02-25", "op_305", -250.0),
    tx("В прошлом месяце", "op_306", 980.0),
    tx("15 Января 2024", "op_307", -15.0),
    tx("11/11/2023 ", "op_308", 111.0),
];

/// Newest-first order of [`NOISY_DATA`].
pub const NOISY_EXPECTED: &[&str] =
    &["op_301", "op_302", "op_303", "op_305", "op_304", "op_306", "op_307", "op_308"];

/// Only relative terms.
pub const RELATIVE_DATA: &[TransactionRecord] = &[
    tx("в прошлом месяце", "op_401", -610.0),
    tx("сегодня", "op_402", -12.0),
    tx("позавчера", "op_403", 90.0),
    tx("на прошлой неделе", "op_404", -430.0),
    tx("вчера", "op_405", -57.0),
];

/// Newest-first order of [`RELATIVE_DATA`].
pub const RELATIVE_EXPECTED: &[&str] = &["op_402", "op_405", "op_403", "op_404", "op_401"];

/// The basic records plus the five newest boundary records, each restated in
/// a different format, followed by records that fall outside the graded
/// prefix.
pub const COMBINED_DATA: &[TransactionRecord] = &[
    tx("2023-11-30", "op_206", -88.8),
    tx("2024-03-12", "op_101", -1250.0),
    tx("СЕГОДНЯ", "op_102", -340.5),
    tx("1 марта 2023", "op_208", 450.0),
    tx("20/01/2024", "op_103", 15000.0),
    tx("05.03.2024", "op_104", -99.9),
    tx("31 декабря 2023", "op_201", -150.0),
    tx("28 февраля 2024", "op_105", -4200.0),
    tx(" вчера ", "op_106", -75.0),
    tx("2023-02-28", "op_207", -300.0),
    tx("15.02.2024", "op_107", 3100.0),
    tx("1 января 2024", "op_108", -1999.0),
    tx("01/12/2023", "op_204", -640.0),
    tx("2024-02-10", "op_109", -560.0),
    tx("01.03.2024", "op_110", 820.0),
    tx("сегодня", "op_501", 1.0),
    tx("13.03.2024", "op_502", 2.0),
    tx("2024-03-14", "op_503", 3.0),
];

/// One named fixture: records, expected order and weight.
#[derive(Debug, Clone, PartialEq)]
pub struct FixtureVariant {
    /// Label shown in results.
    name:     String,
    /// Records handed to the submission.
    records:  Vec<TransactionRecord>,
    /// Identifiers in the expected order.
    expected: Vec<String>,
    /// Points the variant is worth.
    points:   u32,
}

impl FixtureVariant {
    /// Creates a variant.
    pub fn new(
        name: impl Into<String>,
        records: impl IntoIterator<Item = TransactionRecord>,
        expected: impl IntoIterator<Item = impl Into<String>>,
        points: u32,
    ) -> Self {
        Self {
            name: name.into(),
            records: records.into_iter().collect(),
            expected: expected.into_iter().map(Into::into).collect(),
            points,
        }
    }

    /// Returns the label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input records.
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Returns the expected identifiers.
    pub fn expected(&self) -> &[String] {
        &self.expected
    }

    /// Returns the weight.
    pub fn points(&self) -> u32 {
        self.points
    }
}

/// The five graded variants in the order they run.
pub fn standard_variants() -> Vec<FixtureVariant> {
    let combined_expected = BASIC_EXPECTED
        .iter()
        .chain(&BOUNDARY_EXPECTED[..COMBINED_BOUNDARY_PREFIX_LEN])
        .copied();

    vec![
        FixtureVariant::new("Variant 1: basic", BASIC_DATA.iter().copied(), BASIC_EXPECTED.iter().copied(), 15),
        FixtureVariant::new(
            "Variant 2: boundary dates",
            BOUNDARY_DATA.iter().copied(),
            BOUNDARY_EXPECTED.iter().copied(),
            15,
        ),
        FixtureVariant::new(
            "Variant 3: mixed case and noise",
            NOISY_DATA.iter().copied(),
            NOISY_EXPECTED.iter().copied(),
            10,
        ),
        FixtureVariant::new(
            "Variant 4: relative dates only",
            RELATIVE_DATA.iter().copied(),
            RELATIVE_EXPECTED.iter().copied(),
            10,
        ),
        FixtureVariant::new(
            "Variant 5: maximum combined set",
            COMBINED_DATA[..COMBINED_PREFIX_LEN].iter().copied(),
            combined_expected,
            10,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::rubric::FUNCTIONAL_MAX_SCORE;

    #[test]
    fn variant_weights_fill_the_functional_budget() {
        let total: u32 = standard_variants().iter().map(FixtureVariant::points).sum();
        assert_eq!(total, FUNCTIONAL_MAX_SCORE);
    }

    #[test]
    fn expected_orders_are_permutations_of_inputs() {
        for variant in standard_variants() {
            let inputs: HashSet<&str> = variant.records().iter().map(|r| r.operation).collect();
            let expected: HashSet<&str> = variant.expected().iter().map(String::as_str).collect();
            assert_eq!(inputs, expected, "{}", variant.name());
            assert_eq!(variant.records().len(), variant.expected().len(), "{}", variant.name());
        }
    }

    #[test]
    fn combined_variant_is_truncated() {
        let variants = standard_variants();
        let combined = &variants[4];
        assert_eq!(combined.records().len(), COMBINED_PREFIX_LEN);
        assert!(COMBINED_DATA.len() > COMBINED_PREFIX_LEN);
        assert_eq!(&combined.expected()[..BASIC_EXPECTED.len()], BASIC_EXPECTED);
    }
}
