#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Tree-sitter parser wrapper for Python source code.

use std::fmt::Formatter;

use anyhow::{Context, Result, anyhow};
use tree_sitter::{Node, Tree};

/// A struct that wraps a tree-sitter parse tree and the source it came from.
#[derive(Clone)]
pub struct Parser {
    /// The source code being parsed.
    code: String,
    /// The parse tree.
    tree: Tree,
}

/// Returns the compiled tree-sitter Python language.
fn python_language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("lines", &self.line_count())
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Returns a new parser object.
    ///
    /// * `source_code`: the source code to be parsed
    pub fn new(source_code: impl Into<String>) -> Result<Self> {
        let source_code = source_code.into();
        let mut parser = tree_sitter::Parser::new();

        parser
            .set_language(&python_language())
            .with_context(|| "Failed to load Python grammar")?;
        let tree = parser
            .parse(source_code.as_str(), None)
            .ok_or_else(|| anyhow!("Error parsing Python code"))?;

        Ok(Self {
            code: source_code,
            tree,
        })
    }

    /// A getter for parser's source code.
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns the parse tree's root node.
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Returns the source text covered by `node`.
    pub fn text(&self, node: Node<'_>) -> Result<&str> {
        node.utf8_text(self.code.as_bytes())
            .context("Cannot map node to source text")
    }

    /// Returns the 1-based line of the first syntax error, if the tree has
    /// one.
    ///
    /// Tree-sitter recovers from errors by inserting `ERROR` and `MISSING`
    /// nodes; either one means the source is not valid Python. The grammar
    /// also still accepts Python 2 `print` and `exec` statements and the `<>`
    /// operator, which Python 3 rejects.
    pub fn first_syntax_error(&self) -> Option<usize> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let mut stack = vec![root];
        let mut first: Option<usize> = None;

        while let Some(node) = stack.pop() {
            if is_invalid(node) {
                let line = node.start_position().row + 1;
                first = Some(first.map_or(line, |seen| seen.min(line)));
                continue;
            }
            stack.extend(node.children(&mut cursor));
        }

        first
    }

    /// Returns the total number of lines in the source code.
    pub fn line_count(&self) -> usize {
        self.code.lines().count()
    }
}

/// Whether `node` marks source Python 3 does not accept.
fn is_invalid(node: Node<'_>) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }
    match node.kind() {
        "print_statement" | "exec_statement" => true,
        "comparison_operator" => {
            let mut cursor = node.walk();
            node.children(&mut cursor).any(|child| child.kind() == "<>")
        }
        _ => false,
    }
}
