use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Parser, Point, Tree};

/// Tree-sitter parser bound to one grammar.
pub struct SourceParser {
    parser: Parser,
    lang: SupportLang,
}

impl SourceParser {
    /// Create a parser for the given language.
    pub fn new(lang: SupportLang) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        let ts_lang = lang.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeSitterError::LanguageSet {
                lang: format!("{lang:?}"),
            })?;

        Ok(Self { parser, lang })
    }

    /// Get the configured language.
    pub fn lang(&self) -> SupportLang {
        self.lang
    }

    /// Parse source code from scratch.
    pub fn parse(&mut self, source: &str) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Reparse `source` reusing an old tree that already had
    /// [`Tree::edit`] called for every change since it was produced.
    pub fn reparse(&mut self, source: &str, old_tree: &Tree) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source, Some(old_tree))
            .ok_or(TreeSitterError::ParseFailed)
    }
}

/// Information about an ERROR or MISSING node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: Point,
    pub end_point: Point,
}

/// Collect every ERROR/MISSING node below (and including) `node`.
pub fn error_nodes(node: tree_sitter::Node<'_>) -> Vec<ErrorNode> {
    let mut errors = Vec::new();
    collect_error_nodes(node, &mut errors);
    errors
}

fn collect_error_nodes(node: tree_sitter::Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    // Subtrees without errors can be skipped entirely.
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

/// Row/column of a byte offset, as tree-sitter counts them (column in bytes).
pub fn point_at(text: &str, byte: usize) -> Point {
    let prefix = &text.as_bytes()[..byte.min(text.len())];
    let row = prefix.iter().filter(|&&b| b == b'\n').count();
    let column = match prefix.iter().rposition(|&b| b == b'\n') {
        Some(newline) => prefix.len() - newline - 1,
        None => prefix.len(),
    };
    Point::new(row, column)
}
