//! Language resolution.
//!
//! Grammars come from ast-grep-language's built-in `SupportLang`, which also
//! handles metavariable preprocessing for patterns.

use crate::sg::errors::AstGrepError;
use std::path::Path;

pub use ast_grep_language::SupportLang;

/// Parse a language name or alias (`rust`, `rs`, `typescript`, `ts`, ...).
pub fn parse_lang(name: &str) -> Result<SupportLang, AstGrepError> {
    name.parse::<SupportLang>()
        .map_err(|_| AstGrepError::UnknownLanguage {
            name: name.to_string(),
        })
}

/// Detect the language of a file from its extension.
pub fn lang_from_path(path: &Path) -> Option<SupportLang> {
    let ext = path.extension()?.to_str()?;
    let lang = match ext {
        "rs" => SupportLang::Rust,
        "ts" | "mts" | "cts" => SupportLang::TypeScript,
        "tsx" => SupportLang::Tsx,
        "js" | "mjs" | "cjs" | "jsx" => SupportLang::JavaScript,
        "py" | "pyi" => SupportLang::Python,
        "go" => SupportLang::Go,
        "java" => SupportLang::Java,
        "c" | "h" => SupportLang::C,
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => SupportLang::Cpp,
        "rb" => SupportLang::Ruby,
        "json" => SupportLang::Json,
        _ => return None,
    };
    Some(lang)
}
