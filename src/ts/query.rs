use crate::cache::get_or_compile_query;
use crate::ts::errors::TreeSitterError;
use ast_grep_language::SupportLang;
use tree_sitter::{QueryCursor, StreamingIterator};

/// Name of the capture that selects result nodes when a query has several.
pub const SELECT_CAPTURE: &str = "match";

/// Run a tree-sitter query below `scope` and return the selected nodes.
///
/// # Query Syntax
///
/// Tree-sitter queries use S-expression syntax:
/// ```text
/// ((function_item
///   name: (identifier) @name) @match
///  (#eq? @name "main"))
/// ```
///
/// The nodes captured as `@match` are returned. Queries without a `@match`
/// capture return the nodes of their first capture. Text predicates such as
/// `#eq?` and `#match?` are evaluated against `source`.
///
/// Results are deduplicated and in document order (outer nodes first).
pub fn find_nodes<'t>(
    scope: tree_sitter::Node<'t>,
    source: &str,
    query_str: &str,
    lang: SupportLang,
) -> Result<Vec<tree_sitter::Node<'t>>, TreeSitterError> {
    let query = get_or_compile_query(query_str, lang)?;

    let selected = match query.capture_index_for_name(SELECT_CAPTURE) {
        Some(index) => index,
        None if !query.capture_names().is_empty() => 0,
        None => {
            return Err(TreeSitterError::NoCaptures {
                query: query_str.to_string(),
            })
        }
    };

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, scope, source.as_bytes());

    let mut nodes = Vec::new();
    // tree-sitter 0.25+ uses StreamingIterator
    while let Some(m) = matches.next() {
        nodes.extend(
            m.captures
                .iter()
                .filter(|capture| capture.index == selected)
                .map(|capture| capture.node),
        );
    }

    Ok(in_document_order(nodes))
}

/// Sort nodes into pre-order (start ascending, enclosing node first) and drop
/// duplicates.
pub fn in_document_order(mut nodes: Vec<tree_sitter::Node<'_>>) -> Vec<tree_sitter::Node<'_>> {
    nodes.sort_by(|a, b| {
        a.start_byte()
            .cmp(&b.start_byte())
            .then(b.end_byte().cmp(&a.end_byte()))
    });
    nodes.dedup_by_key(|node| node.id());
    nodes
}
