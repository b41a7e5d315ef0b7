//! Placeholder templates for building replacement code.
//!
//! A template is source text with `$NAME` and `$$$NAME` placeholders, the
//! same spelling ast-grep uses for metavariables. Each placeholder is
//! replaced with the rendered text of the value bound to its name.
//!
//! ```
//! use tree_splice::Template;
//!
//! let snippet = Template::new("pub const $NAME: u32 = $$$VALUE;")
//!     .bind("NAME", "LIMIT")
//!     .bind("VALUE", "10 * 2")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(snippet.text(), "pub const LIMIT: u32 = 10 * 2;");
//! ```

use crate::payload::Render;
use crate::ts::{validate_syntax, TreeSitterError};
use ast_grep_language::SupportLang;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template placeholder `${name}` has no binding")]
    Unbound { name: String },

    #[error("snippet is not valid syntax: {0}")]
    Syntax(#[from] TreeSitterError),
}

/// A piece of constructed source code, usable as a mutation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    text: String,
}

impl Snippet {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parse the snippet on its own and reject ERROR or MISSING nodes.
    pub fn check_syntax(&self, lang: SupportLang) -> Result<(), TemplateError> {
        validate_syntax(lang, &self.text)?;
        Ok(())
    }
}

/// Builder binding placeholder names to node or text values.
#[derive(Debug, Clone, Default)]
pub struct Template {
    source: String,
    bindings: HashMap<String, String>,
}

/// A `$NAME` or `$$$NAME` occurrence inside a template.
struct Placeholder<'a> {
    start: usize,
    end: usize,
    name: &'a str,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            bindings: HashMap::new(),
        }
    }

    /// Bind `name` (without the `$`) to the rendered text of `value`.
    pub fn bind(mut self, name: impl Into<String>, value: impl Render) -> Self {
        self.bindings
            .insert(name.into(), value.render().into_owned());
        self
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for placeholder in scan(&self.source) {
            if !names.contains(&placeholder.name) {
                names.push(placeholder.name);
            }
        }
        names
    }

    /// Substitute every placeholder.
    pub fn build(&self) -> Result<Snippet, TemplateError> {
        let mut text = String::with_capacity(self.source.len());
        let mut copied = 0;

        for placeholder in scan(&self.source) {
            let value =
                self.bindings
                    .get(placeholder.name)
                    .ok_or_else(|| TemplateError::Unbound {
                        name: placeholder.name.to_string(),
                    })?;
            text.push_str(&self.source[copied..placeholder.start]);
            text.push_str(value);
            copied = placeholder.end;
        }
        text.push_str(&self.source[copied..]);

        Ok(Snippet { text })
    }
}

/// Find placeholders: `$` or `$$$`, then an uppercase letter or `_`, then
/// uppercase letters, digits or `_`. A `$` not followed by a name is literal.
fn scan(source: &str) -> Vec<Placeholder<'_>> {
    let bytes = source.as_bytes();
    let mut found = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        let start = i;
        let name_start = if source[i..].starts_with("$$$") { i + 3 } else { i + 1 };
        let name_len = source[name_start..]
            .bytes()
            .enumerate()
            .take_while(|&(n, b)| {
                b == b'_' || b.is_ascii_uppercase() || (n > 0 && b.is_ascii_digit())
            })
            .count();

        if name_len == 0 {
            i += 1;
            continue;
        }

        let end = name_start + name_len;
        found.push(Placeholder {
            start,
            end,
            name: &source[name_start..end],
        });
        i = end;
    }

    found
}
