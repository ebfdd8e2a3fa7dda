#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # txgrade
//!
//! Command-line front end for the transaction-sorting grader.
//!
//! `txgrade analyze` scores code quality, `txgrade test` runs the functional
//! fixtures and `txgrade grade` does both and exits non-zero below the pass
//! threshold. Each takes `--submission PATH` (default `task.py`, or
//! `TXGRADE_SUBMISSION`) and `--json`.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use bpaf::*;
use dotenvy::dotenv;
use serde::Serialize;
use tabled::{Table, settings::Style};
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};
use txgrade::{
    analysis::StaticAnalyzer,
    config,
    functional::FunctionalTester,
    grade::{ComponentReport, Scorecard},
    grade_submission,
};

/// Options shared by every command.
#[derive(Debug, Clone)]
struct Target {
    /// Submission path, if given on the command line.
    submission: Option<PathBuf>,
    /// Print JSON instead of tables.
    json:       bool,
}

impl Target {
    /// The submission to grade.
    fn submission(&self) -> PathBuf {
        self.submission
            .clone()
            .unwrap_or_else(config::submission_path)
    }
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Static analysis only
    Analyze(Target),
    /// Functional tests only
    Test(Target),
    /// Both components and the pass threshold
    Grade(Target),
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    /// parses the shared options
    fn target() -> impl Parser<Target> {
        let submission = long("submission")
            .short('s')
            .help("Path of the submitted Python file")
            .argument::<PathBuf>("PATH")
            .optional();
        let json = long("json").help("Print results as JSON").switch();
        construct!(Target { submission, json })
    }

    let analyze = construct!(Cmd::Analyze(target()))
        .to_options()
        .command("analyze")
        .help("Score code quality without running the submission");

    let test = construct!(Cmd::Test(target()))
        .to_options()
        .command("test")
        .help("Run the functional fixtures");

    let grade = construct!(Cmd::Grade(target()))
        .to_options()
        .command("grade")
        .help("Run both components and apply the pass threshold");

    construct!([analyze, test, grade])
        .to_options()
        .descr("Grader for the transaction-sorting exercise")
        .run()
}

/// Prints one component's results.
fn print_component(title: &str, report: &ComponentReport, json: bool) -> Result<()> {
    if json {
        return print_json(report);
    }
    println!("{title}: {}/{}", report.score(), report.max_score());
    let mut table = Table::new(report.results());
    table.with(Style::modern());
    println!("{table}");
    Ok(())
}

/// Serializes `value` to stdout.
fn print_json(value: &impl Serialize) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize results")?;
    println!("{text}");
    Ok(())
}

/// Prints the combined scorecard.
fn print_scorecard(scorecard: &Scorecard, threshold: u32, json: bool) -> Result<()> {
    if json {
        return print_json(scorecard);
    }
    print_component("Functional tests", scorecard.functional(), false)?;
    println!();
    print_component("Code quality", scorecard.static_analysis(), false)?;
    println!();
    println!(
        "Total: {}/{} ({:.1}%), {} at a {threshold}% threshold",
        scorecard.total(),
        scorecard.max_total(),
        scorecard.percent(),
        if scorecard.passes(threshold) { "passed" } else { "failed" }
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(Level::INFO);
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Analyze(target) => {
            let report = StaticAnalyzer::from_path(target.submission()).analyze();
            print_component("Code quality", &report, target.json)?;
        }
        Cmd::Test(target) => {
            let report = FunctionalTester::builder()
                .submission(target.submission())
                .maybe_python(config::python_override())
                .maybe_deadline(config::variant_timeout())
                .build()
                .run_all_tests()
                .await;
            print_component("Functional tests", &report, target.json)?;
        }
        Cmd::Grade(target) => {
            let threshold = config::pass_threshold();
            let scorecard = grade_submission(target.submission()).await;
            print_scorecard(&scorecard, threshold, target.json)?;
            if !scorecard.passes(threshold) {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
