//! Rule application: turns a [`RuleConfig`] into a document transform.
//!
//! Rules run in file order. Each rule queries the document, narrows the
//! selection, schedules its operation and commits before the next rule runs,
//! so later rules see the text produced by earlier ones.

use crate::batch::{Transform, TransformError};
use crate::config::schema::{Operation, Rule, RuleConfig, Select, NODE_BINDING};
use crate::document::Document;
use crate::selection::{Cardinality, Context, Root, Selection, SelectionError};
use crate::template::{Snippet, Template};
use tracing::debug;

/// A validated rule file, ready to run against documents.
#[derive(Debug, Clone)]
pub struct RuleSet {
    config: RuleConfig,
}

impl RuleSet {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }
}

impl Transform for RuleSet {
    fn apply(&self, doc: &mut Document) -> Result<(), TransformError> {
        for rule in &self.config.rules {
            let selected = apply_rule(rule, doc)?;
            let stats = doc.commit_with_stats()?;
            debug!(
                rule = %rule.id,
                selected,
                applied = stats.applied,
                discarded = stats.discarded,
                "rule applied"
            );
        }
        Ok(())
    }
}

/// Queue the edits of one rule; returns how many nodes it selected.
fn apply_rule(rule: &Rule, doc: &Document) -> Result<usize, SelectionError> {
    let mut selection = doc.query(rule.query.as_pattern())?;
    if let Some(needle) = &rule.contains {
        selection = selection.filter(|ctx| ctx.text().contains(needle.as_str()));
    }

    match rule.select {
        Select::All => operate(rule, climb(selection, rule.parent)?),
        Select::First => operate(rule, climb(selection.first()?, rule.parent)?),
        Select::Last => operate(rule, climb(selection.last()?, rule.parent)?),
        Select::Unique => operate(rule, climb(selection.unique()?, rule.parent)?),
    }
}

fn climb<'doc, C: Cardinality>(
    mut selection: Selection<'doc, C, Root>,
    levels: usize,
) -> Result<Selection<'doc, C, Root>, SelectionError> {
    for _ in 0..levels {
        selection = selection.parent()?;
    }
    Ok(selection)
}

fn operate<C: Cardinality>(
    rule: &Rule,
    selection: Selection<'_, C, Root>,
) -> Result<usize, SelectionError> {
    let count = selection.len();
    match &rule.operation {
        Operation::Remove => {
            selection.remove();
        }
        Operation::Prepend { template } => {
            selection.prepend(|ctx| render(rule, template, ctx))?;
        }
        Operation::Append { template } => {
            selection.append(|ctx| render(rule, template, ctx))?;
        }
        Operation::Replace { template } => {
            selection.replace(|ctx| render(rule, template, ctx))?;
        }
    }
    Ok(count)
}

/// Build the rule's template for one node. Returns `None` (no edit) when a
/// `bind` query finds nothing inside the node.
fn render(rule: &Rule, template: &str, ctx: &Context<'_>) -> Result<Option<Snippet>, SelectionError> {
    let mut builder = Template::new(template).bind(NODE_BINDING, ctx.text());

    for (name, pattern) in &rule.bind {
        let found = ctx.query(pattern)?;
        let Some(node) = found.nodes().first().copied() else {
            debug!(rule = %rule.id, bind = %name, pos = ctx.node().pos(), "bind unmatched, skipping");
            return Ok(None);
        };
        builder = builder.bind(name.as_str(), node);
    }

    Ok(Some(builder.build()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_from_str;
    use crate::SupportLang;

    fn run(rules: &str, source: &str) -> Result<String, TransformError> {
        let rules = RuleSet::new(load_from_str(rules).unwrap());
        let mut doc = Document::parse(SupportLang::Rust, source).unwrap();
        rules.apply(&mut doc)?;
        Ok(doc.text().to_string())
    }

    #[test]
    fn remove_rule() {
        let out = run(
            r#"
[[rules]]
id = "drop-dbg"
query = { type = "ast-grep", pattern = "dbg!($$$A);" }
operation = { type = "remove" }
"#,
            "fn f() { dbg!(x); let y = 1; dbg!(y, 2); }",
        )
        .unwrap();
        assert_eq!(out, "fn f() {  let y = 1;  }");
    }

    #[test]
    fn replace_with_bound_template() {
        let out = run(
            r#"
[[rules]]
id = "unwrap-bar"
query = { type = "ast-grep", pattern = "foo($$$ARGS)" }
operation = { type = "replace", template = "baz($INNER)" }

[rules.bind]
INNER = "bar($$$B)"
"#,
            "fn f() { foo(bar(1), 2); foo(3); }",
        )
        .unwrap();
        // The second call has no `bar(..)` inside, so it is left alone.
        assert_eq!(out, "fn f() { baz(bar(1)); foo(3); }");
    }

    #[test]
    fn node_binding_and_contains_filter() {
        let out = run(
            r#"
[[rules]]
id = "wrap"
query = { type = "ast-grep", pattern = "call($A)" }
contains = "secret"
operation = { type = "replace", template = "redact($NODE)" }
"#,
            "fn f() { call(secret); call(public); }",
        )
        .unwrap();
        assert_eq!(out, "fn f() { redact(call(secret)); call(public); }");
    }

    #[test]
    fn select_and_parent() {
        let rules = r#"
[[rules]]
id = "drop-last-let"
query = { type = "ast-grep", pattern = "$N + 1" }
select = "last"
parent = 1
operation = { type = "remove" }
"#;
        let out = run(rules, "fn f() { let a = b + 1; let c = d + 1; }").unwrap();
        assert_eq!(out, "fn f() { let a = b + 1;  }");
    }

    #[test]
    fn unique_failure_propagates() {
        let err = run(
            r#"
[[rules]]
id = "one"
query = { type = "ast-grep", pattern = "x" }
select = "unique"
operation = { type = "remove" }
"#,
            "fn f() { x; x; }",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Selection(SelectionError::Cardinality(_))
        ));
    }

    #[test]
    fn later_rules_see_earlier_commits() {
        let out = run(
            r#"
[[rules]]
id = "rename"
query = { type = "ast-grep", pattern = "old()" }
operation = { type = "replace", template = "new()" }

[[rules]]
id = "wrap"
query = { type = "ast-grep", pattern = "new()" }
operation = { type = "append", template = ".await" }
"#,
            "fn f() { old(); }",
        )
        .unwrap();
        assert_eq!(out, "fn f() { new().await; }");
    }
}
