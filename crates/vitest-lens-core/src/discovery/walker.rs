//! Syntax tree walk that finds `describe` / `it` / `test` calls.

use std::rc::Rc;

use tree_sitter::Node;

use super::cancel::CancellationToken;
use super::declaration::{Span, TestDeclaration, TestKind};
use super::literal;
use super::source::SourceFile;
use crate::config::DiscoveryConfig;

/// Outcome of a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Declarations in document order.
    pub declarations: Vec<TestDeclaration>,
    /// False when the walk stopped on cancellation; `declarations` is then a prefix.
    pub complete: bool,
}

/// Finds test declarations by bare call name.
#[derive(Debug, Clone)]
pub struct TestWalker {
    suite_markers: Vec<String>,
    test_markers: Vec<String>,
}

impl Default for TestWalker {
    fn default() -> Self {
        Self::new(&DiscoveryConfig::default())
    }
}

impl TestWalker {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            suite_markers: config.suite_markers.clone(),
            test_markers: config.test_markers.clone(),
        }
    }

    fn marker_kind(&self, name: &str) -> Option<TestKind> {
        if self.suite_markers.iter().any(|m| m == name) {
            Some(TestKind::Suite)
        } else if self.test_markers.iter().any(|m| m == name) {
            Some(TestKind::Test)
        } else {
            None
        }
    }

    /// Walk the whole tree in pre-order, polling `cancel` before each node.
    ///
    /// Each node carries the ancestor path it was reached with. Siblings share
    /// one path; a match copies it once, extended with its own name, for its
    /// children.
    #[tracing::instrument(skip_all, fields(path = %source.path().display()))]
    pub fn discover(&self, source: &SourceFile, cancel: impl CancellationToken) -> Discovery {
        let mut declarations = Vec::new();
        let top_level: Rc<[String]> = Rc::from(Vec::new());
        let mut stack = vec![(source.root_node(), top_level)];
        let mut cursor = source.root_node().walk();

        while let Some((node, ancestors)) = stack.pop() {
            if cancel.is_cancelled() {
                tracing::debug!(found = declarations.len(), "discovery cancelled");
                return Discovery {
                    declarations,
                    complete: false,
                };
            }

            let child_ancestors = match self.match_declaration(node, source, &ancestors) {
                Some(declaration) => {
                    let extended: Rc<[String]> = ancestors
                        .iter()
                        .cloned()
                        .chain(std::iter::once(declaration.name.clone()))
                        .collect();
                    declarations.push(declaration);
                    extended
                }
                None => ancestors,
            };

            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push((child, Rc::clone(&child_ancestors)));
            }
        }

        tracing::debug!(found = declarations.len(), "discovery finished");
        Discovery {
            declarations,
            complete: true,
        }
    }

    /// A match is `marker("name", <function>, ...)` with a bare identifier callee.
    fn match_declaration(
        &self,
        node: Node,
        source: &SourceFile,
        ancestors: &[String],
    ) -> Option<TestDeclaration> {
        if node.kind() != "call_expression" {
            return None;
        }

        let callee = node.child_by_field_name("function")?;
        if callee.kind() != "identifier" {
            return None;
        }
        let kind = self.marker_kind(source.node_text(&callee))?;

        let arguments = node.child_by_field_name("arguments")?;
        if arguments.kind() != "arguments" {
            return None;
        }

        let mut cursor = arguments.walk();
        let mut args = arguments.named_children(&mut cursor).filter(|n| !n.is_extra());
        let name_node = args.next()?;
        let body = args.next()?;

        if !is_function_like(&body) {
            return None;
        }
        let name = string_literal_text(&name_node, source)?;

        Some(TestDeclaration {
            kind,
            source_file: source.path().to_path_buf(),
            span: Span::new(name_node.start_byte(), name_node.end_byte()),
            name,
            ancestor_names: ancestors.to_vec(),
        })
    }
}

/// Walk `source` with the default markers.
pub fn discover(source: &SourceFile, cancel: impl CancellationToken) -> Discovery {
    TestWalker::default().discover(source, cancel)
}

fn is_function_like(node: &Node) -> bool {
    matches!(
        node.kind(),
        "arrow_function" | "function_expression" | "function" | "generator_function"
    )
}

/// Cooked text of a quoted string or a template without substitutions.
fn string_literal_text(node: &Node, source: &SourceFile) -> Option<String> {
    match node.kind() {
        "string" => {}
        "template_string" => {
            let mut cursor = node.walk();
            let has_substitution = node
                .named_children(&mut cursor)
                .any(|c| c.kind() == "template_substitution");
            if has_substitution {
                return None;
            }
        }
        _ => return None,
    }

    let raw = source.node_text(node);
    let body = raw.get(1..raw.len().checked_sub(1)?)?;
    Some(literal::cook(body))
}
