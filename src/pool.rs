//! Thread-local parser pooling.
//!
//! Keeps one reusable tree-sitter parser per language per thread. A parser is
//! created on first use and reused for every later parse and reparse.

use crate::ts::{SourceParser, TreeSitterError};
use ast_grep_language::SupportLang;
use std::cell::RefCell;
use std::collections::HashMap;

thread_local! {
    static PARSERS: RefCell<HashMap<String, SourceParser>> = RefCell::new(HashMap::new());
}

/// Execute function with the pooled parser for `lang`.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use ast_grep_language::SupportLang;
/// use tree_splice::pool::with_parser;
///
/// let tree = with_parser(SupportLang::Rust, |parser| parser.parse("fn main() {}"))??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(lang: SupportLang, f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut SourceParser) -> R,
{
    let key = format!("{lang:?}");
    PARSERS.with(|cell| {
        let mut parsers = cell.borrow_mut();
        let parser = match parsers.entry(key) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(SourceParser::new(lang)?)
            }
        };
        Ok(f(parser))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsers_are_per_language() {
        let rust = with_parser(SupportLang::Rust, |p| p.lang()).unwrap();
        let ts = with_parser(SupportLang::TypeScript, |p| p.lang()).unwrap();

        assert_eq!(rust, SupportLang::Rust);
        assert_eq!(ts, SupportLang::TypeScript);
    }
}
