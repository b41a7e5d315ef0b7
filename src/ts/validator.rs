use crate::pool::with_parser;
use crate::ts::errors::TreeSitterError;
use crate::ts::parser::error_nodes;
use ast_grep_language::SupportLang;

/// Validate that source code has no syntax errors in the given language.
///
/// Returns Ok(()) if the code parses without ERROR or MISSING nodes.
pub fn validate_syntax(lang: SupportLang, source: &str) -> Result<(), TreeSitterError> {
    let tree = with_parser(lang, |parser| parser.parse(source))??;

    let errors = error_nodes(tree.root_node());
    match errors.as_slice() {
        [] => Ok(()),
        [only] => Err(TreeSitterError::SyntaxError {
            byte_start: only.byte_start,
            byte_end: only.byte_end,
        }),
        many => Err(TreeSitterError::MultipleSyntaxErrors { count: many.len() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_valid_syntax() {
        let source = r#"
fn main() {
    println!("hello");
}
"#;
        assert!(validate_syntax(SupportLang::Rust, source).is_ok());
    }

    #[test]
    fn validate_invalid_syntax() {
        let result = validate_syntax(SupportLang::Rust, "fn main( { }");
        assert!(result.is_err());
    }

    #[test]
    fn validate_other_grammar() {
        assert!(validate_syntax(SupportLang::TypeScript, "const a: number = 1;").is_ok());
        assert!(validate_syntax(SupportLang::TypeScript, "const = ;").is_err());
    }
}
