use crate::cache;
use crate::sg::errors::AstGrepError;
use crate::ts::query::in_document_order;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_core::{AstGrep, Node as SgNode};
use ast_grep_language::SupportLang;
use std::ops::Range;

/// Find the nodes of `scope` matching an ast-grep pattern.
///
/// `sg` must have been built from the same text and grammar as the tree
/// `scope` belongs to; every ast-grep match is mapped to the tree-sitter node
/// with the same byte span and kind.
///
/// # Metavariable Syntax
///
/// - `$NAME` - Matches a single node and captures it
/// - `$$$NAME` - Matches zero or more nodes (variadic)
/// - `$_` - Matches any single node (anonymous)
///
/// # Example Patterns
///
/// ```text
/// fn $NAME($$$PARAMS) { $$$BODY }     // Match function definition
/// $EXPR.clone()                        // Match .clone() calls
/// console.log($$$ARGS)                 // TypeScript call
/// ```
pub fn find_nodes<'t>(
    sg: &AstGrep<StrDoc<SupportLang>>,
    scope: tree_sitter::Node<'t>,
    pattern: &str,
    lang: SupportLang,
) -> Result<Vec<tree_sitter::Node<'t>>, AstGrepError> {
    let pat = cache::get_or_compile_pattern(pattern, lang)?;
    let bounds = scope.byte_range();

    let start = scope_node(sg.root(), scope);
    let nodes = start
        .find_all(&pat)
        .filter_map(|m| {
            let node = m.get_node();
            let range = node.range();
            if range.start < bounds.start || range.end > bounds.end {
                return None;
            }
            locate(scope, &range, &node.kind())
        })
        .collect();

    Ok(in_document_order(nodes))
}

/// Descend from `root` to the ast-grep node mirroring `scope`, or the
/// innermost node enclosing it.
fn scope_node<'r>(
    root: SgNode<'r, StrDoc<SupportLang>>,
    scope: tree_sitter::Node<'_>,
) -> SgNode<'r, StrDoc<SupportLang>> {
    let target = scope.byte_range();
    let mut current = root;
    loop {
        if current.range() == target && current.kind() == scope.kind() {
            return current;
        }
        let next = current.children().find(|child| {
            let range = child.range();
            range.start <= target.start && target.end <= range.end
        });
        match next {
            Some(child) => current = child,
            None => return current,
        }
    }
}

/// Map a span and kind onto the tree-sitter node below `scope` with exactly
/// that span, preferring the innermost node of the given kind.
fn locate<'t>(
    scope: tree_sitter::Node<'t>,
    range: &Range<usize>,
    kind: &str,
) -> Option<tree_sitter::Node<'t>> {
    let mut candidate = scope.descendant_for_byte_range(range.start, range.end)?;
    let mut same_span = None;

    while candidate.byte_range() == *range {
        if candidate.kind() == kind {
            return Some(candidate);
        }
        same_span.get_or_insert(candidate);
        if candidate == scope {
            break;
        }
        match candidate.parent() {
            Some(parent) => candidate = parent,
            None => break,
        }
    }

    same_span
}
