pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::RuleSet;
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    Metadata, Operation, Query, Rule, RuleConfig, Select, ValidationError, ValidationIssue,
    NODE_BINDING,
};
