#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Lowering of a tree-sitter Python tree into the few node categories the
//! rubric inspects.
//!
//! The walk is breadth-first, so a definition at module level is seen before
//! one nested inside a function body.

use std::collections::VecDeque;

use anyhow::Result;
use serde::Serialize;
use tree_sitter::Node;

use super::parser::Parser;

/// A function or async function definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDecl {
    /// Function name.
    pub name:       String,
    /// 1-based line of the `def`.
    pub line:       usize,
    /// Whether the definition is `async def`.
    pub is_async:   bool,
    /// Positional-or-keyword parameter names, in order.
    ///
    /// Positional-only parameters, `*args`, keyword-only parameters and
    /// `**kwargs` are not included.
    pub positional: Vec<String>,
}

/// A name bound by an assignment-like statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableBinding {
    /// Bound name.
    pub name: String,
    /// 1-based line of the name.
    pub line: usize,
}

/// A `try` statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TryBlock {
    /// 1-based line of the `try`.
    pub line: usize,
}

/// A text (non-bytes) string literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    /// Literal content without prefix and quotes.
    pub value: String,
    /// 1-based line where the literal starts.
    pub line:  usize,
}

/// The node categories the rubric checks dispatch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SyntaxNode {
    /// `def` / `async def`.
    FunctionDecl(FunctionDecl),
    /// A bound name.
    VariableBinding(VariableBinding),
    /// `try:` block.
    TryBlock(TryBlock),
    /// String literal.
    StringLiteral(StringLiteral),
}

impl SyntaxNode {
    /// Returns the 1-based line the node starts on.
    pub fn line(&self) -> usize {
        match self {
            SyntaxNode::FunctionDecl(f) => f.line,
            SyntaxNode::VariableBinding(b) => b.line,
            SyntaxNode::TryBlock(t) => t.line,
            SyntaxNode::StringLiteral(s) => s.line,
        }
    }
}

/// Lowered view of a module, in breadth-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntaxTree {
    /// Lowered nodes.
    nodes: Vec<SyntaxNode>,
}

impl SyntaxTree {
    /// Walks the parse tree and collects every node the rubric cares about.
    pub fn lower(parser: &Parser) -> Result<Self> {
        let mut nodes = Vec::new();
        let mut queue = VecDeque::from([parser.root_node()]);
        let mut cursor = parser.root_node().walk();

        while let Some(node) = queue.pop_front() {
            match node.kind() {
                "function_definition" => {
                    nodes.push(SyntaxNode::FunctionDecl(lower_function(parser, node)?));
                }
                "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                    if let Some(target) = node.child_by_field_name("left") {
                        collect_bindings(parser, target, &mut nodes)?;
                    }
                }
                "named_expression" => {
                    if let Some(target) = node.child_by_field_name("name") {
                        collect_bindings(parser, target, &mut nodes)?;
                    }
                }
                "with_item" => {
                    if let Some(value) = node.child_by_field_name("value")
                        && value.kind() == "as_pattern"
                        && let Some(alias) = value.child_by_field_name("alias")
                    {
                        collect_bindings(parser, alias, &mut nodes)?;
                    }
                }
                "try_statement" => {
                    nodes.push(SyntaxNode::TryBlock(TryBlock {
                        line: line_of(node),
                    }));
                }
                "string" => {
                    if let Some(literal) = string_literal(parser, &[node])? {
                        nodes.push(SyntaxNode::StringLiteral(literal));
                    }
                }
                "concatenated_string" => {
                    let parts: Vec<_> = node
                        .named_children(&mut cursor)
                        .filter(|child| child.kind() == "string")
                        .collect();
                    if let Some(literal) = string_literal(parser, &parts)? {
                        nodes.push(SyntaxNode::StringLiteral(literal));
                    }
                    // The parts are one literal; only their interpolations are
                    // walked further.
                    for part in parts {
                        queue.extend(part.named_children(&mut cursor));
                    }
                    continue;
                }
                _ => {}
            }

            queue.extend(node.named_children(&mut cursor));
        }

        Ok(Self { nodes })
    }

    /// Returns every lowered node.
    pub fn nodes(&self) -> &[SyntaxNode] {
        &self.nodes
    }

    /// Returns the function definitions.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.nodes.iter().filter_map(|node| match node {
            SyntaxNode::FunctionDecl(f) => Some(f),
            _ => None,
        })
    }

    /// Returns the string literals.
    pub fn string_literals(&self) -> impl Iterator<Item = &StringLiteral> {
        self.nodes.iter().filter_map(|node| match node {
            SyntaxNode::StringLiteral(s) => Some(s),
            _ => None,
        })
    }
}

/// 1-based start line of `node`.
fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Lowers a `function_definition` node.
fn lower_function(parser: &Parser, node: Node<'_>) -> Result<FunctionDecl> {
    let name = match node.child_by_field_name("name") {
        Some(name) => parser.text(name)?.to_string(),
        None => String::new(),
    };
    let is_async = node.child(0).is_some_and(|first| first.kind() == "async");
    let positional = match node.child_by_field_name("parameters") {
        Some(params) => positional_parameters(parser, params)?,
        None => Vec::new(),
    };

    Ok(FunctionDecl {
        name,
        line: line_of(node),
        is_async,
        positional,
    })
}

/// Names of the positional-or-keyword parameters in a `parameters` node.
fn positional_parameters(parser: &Parser, params: Node<'_>) -> Result<Vec<String>> {
    let mut cursor = params.walk();
    let mut names = Vec::new();

    for param in params.named_children(&mut cursor) {
        match param.kind() {
            "identifier" => names.push(parser.text(param)?.to_string()),
            "typed_parameter" => match param.named_child(0) {
                Some(inner) if inner.kind() == "identifier" => {
                    names.push(parser.text(inner)?.to_string());
                }
                // `*args: T` or `**kwargs: T`
                _ => break,
            },
            "default_parameter" | "typed_default_parameter" => {
                if let Some(name) = param.child_by_field_name("name")
                    && name.kind() == "identifier"
                {
                    names.push(parser.text(name)?.to_string());
                }
            }
            // Everything before `/` is positional-only.
            "positional_separator" => names.clear(),
            "list_splat_pattern" | "keyword_separator" | "dictionary_splat_pattern" => break,
            _ => {}
        }
    }

    Ok(names)
}

/// Pushes a binding for every plain name inside an assignment target.
fn collect_bindings(parser: &Parser, target: Node<'_>, out: &mut Vec<SyntaxNode>) -> Result<()> {
    match target.kind() {
        "identifier" => out.push(SyntaxNode::VariableBinding(VariableBinding {
            name: parser.text(target)?.to_string(),
            line: line_of(target),
        })),
        "pattern_list"
        | "tuple_pattern"
        | "list_pattern"
        | "list_splat_pattern"
        | "as_pattern_target"
        | "expression_list"
        | "parenthesized_expression"
        | "tuple"
        | "list" => {
            let mut cursor = target.walk();
            let children: Vec<_> = target.named_children(&mut cursor).collect();
            for child in children {
                collect_bindings(parser, child, out)?;
            }
        }
        // Attribute and subscript targets bind no new name.
        _ => {}
    }
    Ok(())
}

/// Builds one literal from one or more adjacent `string` nodes, skipping
/// bytes literals.
///
/// Only the text outside `{...}` interpolations belongs to the literal; an
/// f-string with no such text yields nothing.
fn string_literal(parser: &Parser, parts: &[Node<'_>]) -> Result<Option<StringLiteral>> {
    let Some(first) = parts.first() else {
        return Ok(None);
    };

    let code = parser.code();
    let mut value = String::new();
    let mut formatted = false;
    for part in parts {
        let mut cursor = part.walk();
        let children: Vec<_> = part.children(&mut cursor).collect();
        let start = children.iter().find(|c| c.kind() == "string_start");
        let end = children.iter().rev().find(|c| c.kind() == "string_end");

        let (Some(start), Some(end)) = (start, end) else {
            continue;
        };
        let prefix = parser.text(*start)?;
        if prefix.contains(['b', 'B']) {
            return Ok(None);
        }
        formatted |= prefix.contains(['f', 'F']);

        let mut offset = start.end_byte();
        for interpolation in children.iter().filter(|c| c.kind() == "interpolation") {
            value.push_str(code.get(offset..interpolation.start_byte()).unwrap_or_default());
            offset = interpolation.end_byte();
        }
        value.push_str(code.get(offset..end.start_byte()).unwrap_or_default());
    }

    if formatted && value.is_empty() {
        return Ok(None);
    }
    Ok(Some(StringLiteral {
        value,
        line: line_of(*first),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(code: &str) -> SyntaxTree {
        let parser = Parser::new(code).expect("parse");
        SyntaxTree::lower(&parser).expect("lower")
    }

    fn binding_names(tree: &SyntaxTree) -> Vec<&str> {
        tree.nodes()
            .iter()
            .filter_map(|node| match node {
                SyntaxNode::VariableBinding(b) => Some(b.name.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn collects_positional_parameters() {
        let tree = lower(
            "def a(transactions): pass\n\
             def b(x: int, y=2, *rest, z, **kw): pass\n\
             def c(p, /, q, *, r): pass\n\
             async def d(transactions: list) -> list: pass\n",
        );
        let funcs: Vec<_> = tree.functions().collect();
        assert_eq!(funcs.len(), 4);
        assert_eq!(funcs[0].positional, vec!["transactions"]);
        assert_eq!(funcs[1].positional, vec!["x", "y"]);
        assert_eq!(funcs[2].positional, vec!["q"]);
        assert!(funcs[3].is_async);
        assert!(!funcs[0].is_async);
        assert_eq!(funcs[3].positional, vec!["transactions"]);
    }

    #[test]
    fn top_level_definition_precedes_nested_one() {
        let tree = lower(
            "def outer():\n    def inner():\n        pass\n    return inner\n\n\
             def later():\n    pass\n",
        );
        let names: Vec<_> = tree.functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "later", "inner"]);
    }

    #[test]
    fn collects_bindings_from_every_target_form() {
        let tree = lower(
            "a = 1\n\
             b, (c, d) = 2, (3, 4)\n\
             first, *rest = [1, 2]\n\
             e += 1\n\
             obj.attr = 5\n\
             items[0] = 6\n\
             for f in range(3):\n    pass\n\
             g = [h for h in range(2)]\n\
             if (k := 10):\n    pass\n\
             with open('x') as fh:\n    pass\n\
             typed: int = 3\n",
        );
        let mut names = binding_names(&tree);
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["a", "b", "c", "d", "e", "f", "fh", "first", "g", "h", "k", "rest", "typed"]
        );
    }

    #[test]
    fn lowers_try_blocks_and_literals() {
        let tree = lower(
            "try:\n    x = 'сегодня'\nexcept ValueError:\n    pass\n\
             y = b'raw'\n\
             z = 'one' 'two'\n",
        );
        assert!(tree.nodes().iter().any(|n| matches!(n, SyntaxNode::TryBlock(t) if t.line == 1)));

        let literals: Vec<_> = tree.string_literals().map(|s| s.value.as_str()).collect();
        assert_eq!(literals.len(), 2);
        assert!(literals.contains(&"сегодня"));
        assert!(literals.contains(&"onetwo"));
    }

    #[test]
    fn f_string_literal_excludes_interpolations() {
        let tree = lower("a = f\"{table['вчера']}\"\nb = f'до {day!r} конца'\n");
        let literals: Vec<_> = tree.string_literals().map(|s| s.value.as_str()).collect();
        assert_eq!(literals.iter().filter(|s| s.contains("вчера")).count(), 1);
        assert!(literals.contains(&"вчера"));
        assert!(literals.contains(&"до  конца"));
        assert_eq!(literals.len(), 2);
    }
}
