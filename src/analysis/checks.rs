#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! One function per rubric check. Each takes the prepared [`Submission`] and
//! returns a single [`CheckResult`]; none depends on another's outcome.

use itertools::Itertools;

use super::Submission;
use crate::{
    grade::{CheckResult, CheckStatus},
    python::syntax::SyntaxNode,
    rubric::{ENTRY_PARAMETER, ENTRY_POINT},
};

/// Bulleted list of the first `limit` items with a remainder count.
fn bullet_list(items: &[String], limit: usize, noun: &str) -> String {
    let mut details = items
        .iter()
        .take(limit)
        .map(|item| format!("  • {item}"))
        .join("\n");
    if items.len() > limit {
        details.push_str(&format!("\n  ... and {} more {noun}", items.len() - limit));
    }
    details
}

/// First `limit` characters of `line`.
fn excerpt(line: &str, limit: usize) -> String {
    line.chars().take(limit).collect()
}

/// The entry point exists and takes exactly `transactions`.
pub fn entry_point(submission: &Submission<'_>) -> CheckResult {
    let weights = &submission.rubric.weights;
    let found = submission
        .tree
        .functions()
        .find(|func| func.name == ENTRY_POINT && !func.is_async);

    match found {
        None => CheckResult::fail(
            "Function sort_transactions exists",
            weights.entry_point,
            format!("No synchronous function named {ENTRY_POINT} was found"),
        ),
        Some(func) if func.positional != [ENTRY_PARAMETER] => CheckResult::partial(
            "Function signature",
            weights.entry_partial,
            weights.entry_point,
            format!(
                "{ENTRY_POINT} found on line {}, but its parameters are ({}); expected \
                 def {ENTRY_POINT}({ENTRY_PARAMETER})",
                func.line,
                func.positional.join(", ")
            ),
        ),
        Some(func) => CheckResult::pass(
            "Function sort_transactions exists with the expected signature",
            weights.entry_point,
            format!("{ENTRY_POINT} found on line {} with the expected signature", func.line),
        ),
    }
}

/// The placeholder `raise NotImplementedError` is gone.
pub fn stub(submission: &Submission<'_>) -> CheckResult {
    let rubric = submission.rubric;
    if submission.source.contains(rubric.stub_marker.as_str()) {
        CheckResult::fail(
            "No NotImplementedError stub",
            rubric.weights.stub,
            format!("The source still contains '{}'; the task is not implemented", rubric.stub_marker),
        )
    } else {
        CheckResult::pass("No NotImplementedError stub", rubric.weights.stub, "The stub was replaced")
    }
}

/// Function and variable names are snake_case.
pub fn naming(submission: &Submission<'_>) -> CheckResult {
    let rubric = submission.rubric;
    let snake_case = &submission.patterns.snake_case;

    let violations: Vec<String> = submission
        .tree
        .nodes()
        .iter()
        .filter_map(|node| match node {
            SyntaxNode::FunctionDecl(func) => (func.name != ENTRY_POINT
                && !snake_case.is_match(&func.name))
            .then(|| format!("function '{}' on line {} should be snake_case", func.name, func.line)),
            SyntaxNode::VariableBinding(binding) => (!snake_case.is_match(&binding.name))
                .then(|| {
                    format!("variable '{}' on line {} should be snake_case", binding.name, binding.line)
                }),
            SyntaxNode::TryBlock(_) | SyntaxNode::StringLiteral(_) => None,
        })
        .collect();

    if violations.is_empty() {
        return CheckResult::pass(
            "snake_case naming",
            rubric.weights.naming,
            "All function and variable names are snake_case",
        );
    }

    let penalty = u32::try_from(violations.len()).unwrap_or(u32::MAX);
    CheckResult::partial(
        "snake_case naming",
        rubric.weights.naming.saturating_sub(penalty),
        rubric.weights.naming,
        bullet_list(&violations, rubric.listed_violations, "violations"),
    )
}

/// Month names and relative-date words are not scattered across literals.
pub fn magic_values(submission: &Submission<'_>) -> CheckResult {
    let rubric = submission.rubric;
    let found = submission
        .tree
        .string_literals()
        .filter(|literal| {
            let lowered = literal.value.to_lowercase();
            rubric.magic_words.iter().any(|word| lowered.contains(word.as_str()))
        })
        .count();

    let result = if found > rubric.magic_threshold {
        CheckResult::partial(
            "No magic values",
            rubric.weights.magic_partial,
            rubric.weights.magic_values,
            format!(
                "Found {found} string literals naming months or relative dates. A lookup table \
                 keeps them in one place instead of a chain of comparisons."
            ),
        )
    } else {
        CheckResult::pass(
            "No magic values",
            rubric.weights.magic_values,
            "Month names and relative dates are kept in structured constants",
        )
    };
    result.heuristic()
}

/// At least one `try` block guards the parsing.
pub fn error_handling(submission: &Submission<'_>) -> CheckResult {
    let weights = &submission.rubric.weights;
    let has_try = submission
        .tree
        .nodes()
        .iter()
        .any(|node| matches!(node, SyntaxNode::TryBlock(_)));

    if has_try {
        CheckResult::pass(
            "Error handling (try/except)",
            weights.error_handling,
            "The code handles exceptions raised by malformed input",
        )
    } else {
        CheckResult::partial(
            "Error handling (try/except)",
            weights.error_partial,
            weights.error_handling,
            "No try/except blocks found. Handling date parsing errors makes the code more robust.",
        )
    }
}

/// Few long lines are repeated verbatim.
pub fn duplication(submission: &Submission<'_>) -> CheckResult {
    let rubric = submission.rubric;
    let cleaned: Vec<&str> = submission
        .source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    let counts = cleaned.iter().counts();

    let duplicates: Vec<(&str, usize)> = cleaned
        .iter()
        .filter(|line| line.chars().count() > rubric.duplicate_min_len)
        .unique()
        .filter_map(|line| {
            let count = counts.get(line).copied().unwrap_or(0);
            (count > 1).then_some((*line, count))
        })
        .collect();

    let result = if duplicates.len() > rubric.duplicate_threshold {
        let examples = duplicates
            .iter()
            .take(rubric.duplicate_examples)
            .map(|(line, count)| {
                format!(
                    "  • `{}...` (repeats: {count})",
                    excerpt(line, rubric.duplicate_excerpt_chars)
                )
            })
            .join("\n");
        let penalty = u32::try_from(duplicates.len()).unwrap_or(u32::MAX);
        CheckResult::partial(
            "No code duplication",
            rubric.weights.duplication.saturating_sub(penalty),
            rubric.weights.duplication,
            format!("Duplicated lines found:\n{examples}"),
        )
    } else {
        CheckResult::pass("No code duplication", rubric.weights.duplication, "No duplicated lines found")
    };
    result.heuristic()
}

/// Regular expressions and a month lookup table are in use.
pub fn idioms(submission: &Submission<'_>) -> CheckResult {
    let rubric = submission.rubric;
    let patterns = submission.patterns;
    let weights = &rubric.weights;
    let max_score = weights.regex_idiom + weights.month_table;

    let has_regex = patterns.regex_import.is_match(submission.source);
    let has_month_table = patterns
        .month_tables
        .iter()
        .any(|pattern| pattern.is_match(submission.source));

    let mut score = 0;
    let mut notes = Vec::with_capacity(2);
    if has_regex {
        score += weights.regex_idiom;
        notes.push("✅ Regular expressions are used for parsing");
    } else {
        notes.push("⚠️ Regular expressions are not used; they make date parsing more reliable");
    }
    if has_month_table {
        score += weights.month_table;
        notes.push("✅ Month names are kept in a lookup table");
    } else {
        notes.push("⚠️ No month lookup table found; prefer one over an if/elif chain");
    }

    let result = if score >= rubric.idiom_pass_score {
        CheckResult::builder()
            .name("Implementation idioms")
            .status(CheckStatus::Pass)
            .score(score)
            .max_score(max_score)
            .details(notes.join("\n"))
            .build()
    } else {
        CheckResult::partial("Implementation idioms", score, max_score, notes.join("\n"))
    };
    result.heuristic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::Patterns,
        python::{parser::Parser, syntax::SyntaxTree},
        rubric::Rubric,
    };

    fn check(source: &str, run: fn(&Submission<'_>) -> CheckResult) -> CheckResult {
        check_with(Rubric::default(), source, run)
    }

    fn check_with(rubric: Rubric, source: &str, run: fn(&Submission<'_>) -> CheckResult) -> CheckResult {
        let patterns = Patterns::compile(&rubric).unwrap();
        let parser = Parser::new(source).unwrap();
        let tree = SyntaxTree::lower(&parser).unwrap();
        run(&Submission {
            source,
            tree: &tree,
            rubric: &rubric,
            patterns: &patterns,
        })
    }

    #[test]
    fn entry_point_signature_variants() {
        let exact = check("def sort_transactions(transactions):\n    return []\n", entry_point);
        assert_eq!((exact.status(), exact.score()), (CheckStatus::Pass, 10));

        let wrong = check("def sort_transactions(items, reverse=True):\n    return []\n", entry_point);
        assert_eq!((wrong.status(), wrong.score()), (CheckStatus::Partial, 5));
        assert!(wrong.details().contains("line 1"));

        let missing = check("def sort_records(transactions):\n    return []\n", entry_point);
        assert_eq!((missing.status(), missing.score()), (CheckStatus::Fail, 0));
    }

    #[test]
    fn async_entry_point_is_not_counted() {
        let result = check("async def sort_transactions(transactions):\n    return []\n", entry_point);
        assert_eq!(result.status(), CheckStatus::Fail);
    }

    #[test]
    fn first_definition_in_walk_order_wins() {
        let source = "def helper():\n    def sort_transactions(x):\n        pass\n\n\
                      def sort_transactions(transactions):\n    return []\n";
        let result = check(source, entry_point);
        assert_eq!(result.status(), CheckStatus::Pass);
        assert!(result.details().contains("line 5"));
    }

    #[test]
    fn naming_lists_five_and_counts_the_rest() {
        let source = "A = 1\nB = 2\nC = 3\nD = 4\nE = 5\nF = 6\nG = 7\n\
                      def sort_transactions(transactions):\n    return []\n";
        let result = check(source, naming);
        assert_eq!(result.status(), CheckStatus::Partial);
        assert_eq!(result.score(), 0);
        assert_eq!(result.details().matches('•').count(), 5);
        assert!(result.details().ends_with("... and 2 more violations"));
    }

    #[test]
    fn entry_point_name_is_exempt_from_naming() {
        let source = "def sort_transactions(transactions):\n    parsedDate = 1\n    return []\n";
        let result = check(source, naming);
        assert_eq!(result.score(), 4);
        assert!(result.details().contains("'parsedDate' on line 2"));
    }

    #[test]
    fn stub_marker_fails() {
        let result = check("def sort_transactions(transactions):\n    raise NotImplementedError\n", stub);
        assert_eq!((result.status(), result.score()), (CheckStatus::Fail, 0));
    }

    #[test]
    fn missing_try_is_partial() {
        let result = check("x = 1\n", error_handling);
        assert_eq!((result.status(), result.score()), (CheckStatus::Partial, 3));
    }

    #[test]
    fn idioms_are_additive() {
        let both = check("import re\nmonths = {'января': 1}\n", idioms);
        assert_eq!((both.status(), both.score()), (CheckStatus::Pass, 5));
        assert!(both.is_heuristic());

        let regex_only = check("import re\n", idioms);
        assert_eq!((regex_only.status(), regex_only.score()), (CheckStatus::Partial, 3));

        let table_only = check("months = dict(января=1)\n", idioms);
        assert_eq!((table_only.status(), table_only.score()), (CheckStatus::Partial, 2));
    }

    #[test]
    fn duplicate_excerpt_is_truncated() {
        let long = format!("value = compute_something_long({})", "x".repeat(60));
        let source = format!(
            "{long}\n{long}\nfirst_repeated_line_here = 1\nfirst_repeated_line_here = 1\n\
             second_repeated_line_here = 2\nsecond_repeated_line_here = 2\n"
        );
        let result = check(&source, duplication);
        assert_eq!((result.status(), result.score()), (CheckStatus::Partial, 2));
        let first = result.details().lines().nth(1).unwrap();
        assert_eq!(first, format!("  • `{}...` (repeats: 2)", excerpt(&long, 50)));
    }

    #[test]
    fn idioms_pass_awards_only_what_was_earned() {
        let rubric = Rubric {
            idiom_pass_score: 3,
            ..Rubric::default()
        };
        let result = check_with(rubric, "import re\n", idioms);
        assert_eq!(result.status(), CheckStatus::Pass);
        assert_eq!((result.score(), result.max_score()), (3, 5));
    }
}
