//! Tests that run fixture submissions in a real Python interpreter.
//!
//! Each test returns early when no interpreter is installed.

use std::{path::PathBuf, time::Duration};

use txgrade::{
    fixtures::{BASIC_DATA, FixtureVariant},
    functional::FunctionalTester,
    grade::{CheckStatus, ComponentReport},
    grade_submission,
};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join("python")
        .join(name)
        .join("task.py")
}

fn python() -> Option<PathBuf> {
    which::which("python3").or_else(|_| which::which("python")).ok()
}

fn tester(case: &str, python: PathBuf) -> FunctionalTester {
    FunctionalTester::builder()
        .submission(fixture(case))
        .python(python)
        .deadline(Duration::from_secs(30))
        .build()
}

fn assert_single_fatal(report: &ComponentReport, needle: &str) {
    assert_eq!(report.results().len(), 1, "{report:#?}");
    let only = &report.results()[0];
    assert_eq!(only.status(), CheckStatus::Fail);
    assert_eq!((only.score(), only.max_score()), (0, 60));
    assert!(only.details().contains(needle), "{}", only.details());
}

#[tokio::test]
async fn reference_solution_passes_every_variant() {
    let Some(python) = python() else { return };
    let report = tester("reference", python).run_all_tests().await;

    let failing: Vec<_> = report
        .results()
        .iter()
        .filter(|r| r.status() != CheckStatus::Pass)
        .map(|r| format!("{}: {}", r.name(), r.details()))
        .collect();
    assert!(failing.is_empty(), "{failing:#?}");
    assert_eq!(report.results().len(), 5);
    assert_eq!(report.score(), 60);
    assert_eq!(report.max_score(), 60);
}

#[tokio::test]
async fn stub_fails_each_variant_without_aborting() {
    let Some(python) = python() else { return };
    let report = tester("stub", python).run_all_tests().await;

    assert_eq!(report.results().len(), 5);
    assert_eq!(report.score(), 0);
    for result in report.results() {
        assert_eq!(result.status(), CheckStatus::Fail);
        assert!(result.details().contains("NotImplementedError"), "{}", result.details());
    }
}

#[tokio::test]
async fn short_list_fails_the_length_check() {
    let Some(python) = python() else { return };
    let report = tester("wrong_length", python).run_all_tests().await;

    assert_eq!(report.results().len(), 5);
    assert_eq!(report.score(), 0);
    for result in report.results() {
        assert_eq!(result.status(), CheckStatus::Fail);
        assert_eq!(result.score(), 0);
        assert!(result.details().starts_with("Wrong number of items: got 1, expected "));
    }

    let first = &report.results()[0];
    assert_eq!(first.max_score(), 15);
    assert_eq!(first.details(), "Wrong number of items: got 1, expected 10");
}

#[tokio::test]
async fn non_list_result_names_the_type() {
    let Some(python) = python() else { return };
    let report = tester("returns_dict", python).run_all_tests().await;

    assert_eq!(report.score(), 0);
    assert!(report.results()[0].details().contains("returned dict"));
}

#[tokio::test]
async fn import_failure_is_fatal() {
    let Some(python) = python() else { return };
    let report = tester("import_error", python).run_all_tests().await;
    assert_single_fatal(&report, "ModuleNotFoundError");
}

#[tokio::test]
async fn missing_entry_point_is_fatal() {
    let Some(python) = python() else { return };
    let report = tester("missing_function", python).run_all_tests().await;
    assert_single_fatal(&report, "sort_transactions");
}

#[tokio::test]
async fn missing_file_is_fatal() {
    let Some(python) = python() else { return };
    let report = tester("does_not_exist", python).run_all_tests().await;
    assert_single_fatal(&report, "Could not import");
}

#[tokio::test]
async fn unknown_interpreter_is_fatal() {
    let report = FunctionalTester::builder()
        .submission(fixture("reference"))
        .python("/nonexistent/bin/python3")
        .build()
        .run_all_tests()
        .await;
    assert_single_fatal(&report, "Could not import");
}

#[tokio::test]
async fn each_variant_gets_a_fresh_interpreter() {
    let Some(python) = python() else { return };
    // The submission raises on its second call within one process and
    // returns its input order otherwise.
    let in_order: Vec<&str> = BASIC_DATA.iter().map(|record| record.operation).collect();
    let variants = vec![
        FixtureVariant::new("first", BASIC_DATA.iter().copied(), in_order.clone(), 30),
        FixtureVariant::new("second", BASIC_DATA.iter().copied(), in_order, 30),
    ];
    let report = FunctionalTester::builder()
        .submission(fixture("global_counter"))
        .python(python)
        .variants(variants)
        .build()
        .run_all_tests()
        .await;

    assert_eq!(report.score(), 60, "{report:#?}");
}

#[tokio::test]
async fn system_exit_is_contained_per_variant() {
    let Some(python) = python() else { return };
    let report = tester("exits", python).run_all_tests().await;

    let statuses: Vec<_> = report.results().iter().map(|r| r.status()).collect();
    assert_eq!(statuses, vec![
        CheckStatus::Fail,
        CheckStatus::Fail,
        CheckStatus::Partial,
        CheckStatus::Partial,
        CheckStatus::Fail,
    ]);
    assert!(report.results()[0].details().contains("SystemExit"));
    // Reversed input keeps 2 of 8 and 2 of 5 positions.
    assert_eq!(report.results()[2].score(), 1);
    assert_eq!(report.results()[3].score(), 2);
    assert_eq!(report.score(), 3);
}

#[tokio::test]
async fn run_test_variant_scores_one_variant() {
    let Some(python) = python() else { return };
    let tester = tester("reference", python);
    let variant = tester.variants()[3].clone();
    let result = tester.run_test_variant(&variant).await;
    assert_eq!(result.status(), CheckStatus::Pass);
    assert_eq!(result.score(), 10);
}

#[tokio::test]
async fn reference_solution_grades_full_marks() {
    if python().is_none() {
        return;
    }
    let scorecard = grade_submission(fixture("reference")).await;
    assert_eq!(scorecard.total(), 100);
    assert_eq!(scorecard.max_total(), 100);
    assert!(scorecard.passes(70));
}
