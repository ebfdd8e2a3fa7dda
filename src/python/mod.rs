#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Everything that touches Python: parsing submissions and running them.

/// Runs a submission in a fresh interpreter through the embedded driver.
pub mod harness;
/// Thin wrapper over the tree-sitter Python parser.
pub mod parser;
/// Lowering of parse trees into rubric node categories.
pub mod syntax;
/// Interpreter discovery.
pub mod util;
