//! Tree-sitter integration: parsing, incremental reparsing and S-expression
//! queries over the grammars bundled with ast-grep-language.

pub mod errors;
pub mod parser;
pub mod query;
pub mod validator;

pub use errors::TreeSitterError;
pub use parser::{error_nodes, point_at, ErrorNode, SourceParser};
pub use query::find_nodes;
pub use validator::validate_syntax;
