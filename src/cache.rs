//! Thread-local compilation caches for ast-grep patterns and tree-sitter queries.
//!
//! A transform typically runs the same handful of patterns against every file
//! of a batch, so compiled forms are kept per thread. Each cache is capped at
//! 256 entries and cleared wholesale when full.

use crate::sg::AstGrepError;
use crate::ts::TreeSitterError;
use ast_grep_core::Pattern;
use ast_grep_language::{LanguageExt, SupportLang};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tree_sitter::Query;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    // Keys are "<lang_debug>:<source>": the same text means different things
    // in different grammars.
    static PATTERN_CACHE: RefCell<HashMap<String, Pattern>> = RefCell::new(HashMap::new());
    static QUERY_CACHE: RefCell<HashMap<String, Rc<Query>>> = RefCell::new(HashMap::new());
}

/// Get a compiled ast-grep pattern from cache, or compile and cache it.
pub fn get_or_compile_pattern(
    pattern_str: &str,
    lang: SupportLang,
) -> Result<Pattern, AstGrepError> {
    let cache_key = format!("{lang:?}:{pattern_str}");

    PATTERN_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(p) = cache.get(&cache_key) {
            return Ok(p.clone());
        }

        let compiled =
            Pattern::try_new(pattern_str, lang).map_err(|e| AstGrepError::InvalidPattern {
                pattern: pattern_str.to_string(),
                message: e.to_string(),
            })?;

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(cache_key, compiled.clone());
        Ok(compiled)
    })
}

/// Get a compiled tree-sitter query from cache, or compile and cache it.
pub fn get_or_compile_query(
    query_str: &str,
    lang: SupportLang,
) -> Result<Rc<Query>, TreeSitterError> {
    let cache_key = format!("{lang:?}:{query_str}");

    QUERY_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if let Some(q) = cache.get(&cache_key) {
            return Ok(Rc::clone(q));
        }

        let ts_lang = lang.get_ts_language();
        let compiled = Query::new(&ts_lang, query_str).map_err(|e| {
            TreeSitterError::InvalidQuery {
                message: e.to_string(),
            }
        })?;
        let compiled = Rc::new(compiled);

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }
        cache.insert(cache_key, Rc::clone(&compiled));
        Ok(compiled)
    })
}

/// Clear both caches (mainly for testing).
pub fn clear_cache() {
    PATTERN_CACHE.with(|cache| cache.borrow_mut().clear());
    QUERY_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of cached entries across both caches.
pub fn cache_size() -> usize {
    PATTERN_CACHE.with(|cache| cache.borrow().len())
        + QUERY_CACHE.with(|cache| cache.borrow().len())
}
