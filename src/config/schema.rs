use crate::document::QueryPattern;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A rule file: metadata plus an ordered list of rules.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        if let Some(lang) = &self.meta.lang {
            if crate::sg::parse_lang(lang).is_err() {
                issues.push(ValidationIssue::UnknownLanguage { name: lang.clone() });
            }
        }

        for pattern in self.meta.include.iter().chain(&self.meta.exclude) {
            if let Err(err) = glob::Pattern::new(pattern) {
                issues.push(ValidationIssue::InvalidGlob {
                    pattern: pattern.clone(),
                    message: err.to_string(),
                });
            }
        }

        let mut seen = HashSet::new();
        for rule in &self.rules {
            let rule_id = (!rule.id.trim().is_empty()).then(|| rule.id.clone());

            match &rule_id {
                None => issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                }),
                Some(id) => {
                    if !seen.insert(rule.id.as_str()) {
                        issues.push(ValidationIssue::DuplicateId { rule_id: id.clone() });
                    }
                }
            }

            if rule.query.pattern().trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: rule_id.clone(),
                    field: "query.pattern",
                });
            }

            for (name, pattern) in &rule.bind {
                if name == NODE_BINDING {
                    issues.push(ValidationIssue::InvalidCombo {
                        rule_id: rule_id.clone(),
                        message: format!("bind name `{NODE_BINDING}` is reserved"),
                    });
                }
                if pattern.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: rule_id.clone(),
                        field: "bind",
                    });
                }
            }

            if let Some(template) = rule.operation.template() {
                if template.is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: rule_id.clone(),
                        field: "operation.template",
                    });
                }
                for name in crate::template::Template::new(template).placeholders() {
                    if name != NODE_BINDING && !rule.bind.contains_key(name) {
                        issues.push(ValidationIssue::InvalidCombo {
                            rule_id: rule_id.clone(),
                            message: format!("template placeholder `${name}` is not bound"),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Template name bound to the matched node's own text.
pub const NODE_BINDING: &str = "NODE";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Language for every file; detected from the extension when unset
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Rule {
    pub id: String,
    pub query: Query,
    /// Keep only nodes whose text contains this string
    #[serde(default)]
    pub contains: Option<String>,
    #[serde(default)]
    pub select: Select,
    /// Number of parents to climb after narrowing
    #[serde(default)]
    pub parent: usize,
    pub operation: Operation,
    /// Template name to nested ast-grep pattern; the first match's text is bound
    #[serde(default)]
    pub bind: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Query {
    AstGrep { pattern: String },
    TreeSitter { pattern: String },
}

impl Query {
    pub fn pattern(&self) -> &str {
        match self {
            Query::AstGrep { pattern } | Query::TreeSitter { pattern } => pattern,
        }
    }

    pub fn as_pattern(&self) -> QueryPattern<'_> {
        match self {
            Query::AstGrep { pattern } => QueryPattern::AstGrep(pattern),
            Query::TreeSitter { pattern } => QueryPattern::TreeSitter(pattern),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Select {
    #[default]
    All,
    First,
    Last,
    Unique,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    Remove,
    Prepend { template: String },
    Append { template: String },
    Replace { template: String },
}

impl Operation {
    pub fn template(&self) -> Option<&str> {
        match self {
            Operation::Remove => None,
            Operation::Prepend { template }
            | Operation::Append { template }
            | Operation::Replace { template } => Some(template),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
    InvalidGlob {
        pattern: String,
        message: String,
    },
    UnknownLanguage {
        name: String,
    },
    InvalidCombo {
        rule_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule file contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "rule missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is used more than once")
            }
            ValidationIssue::InvalidGlob { pattern, message } => {
                write!(f, "invalid glob '{pattern}': {message}")
            }
            ValidationIssue::UnknownLanguage { name } => write!(f, "unknown language '{name}'"),
            ValidationIssue::InvalidCombo { rule_id, message } => match rule_id {
                Some(id) => write!(f, "rule '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid rule configuration: {message}"),
            },
        }
    }
}
