#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Result types shared by the static analyzer and the functional tester.

/// Check results and component reports.
pub mod results;
/// Combined pass/fail view over both components.
pub mod scorecard;

pub use results::{CheckResult, CheckStatus, ComponentReport};
pub use scorecard::Scorecard;
