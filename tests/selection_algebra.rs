//! Selection chains across cardinality and tier.

use tree_splice::selection::{DerivedSelection, RootSelection, RootSingle};
use tree_splice::{
    CardinalityError, Document, Payload, QueryPattern, SelectionError, SupportLang, Template,
};

const SOURCE: &str = r#"
fn handler(req: Request) -> Response {
    log("start");
    let user = load(req.id);
    log("loaded");
    respond(user)
}

fn helper() {
    log("helper");
}
"#;

fn doc() -> Document {
    Document::parse(SupportLang::Rust, SOURCE).unwrap()
}

#[test]
fn root_query_chain_stays_mutable() {
    let mut doc = doc();
    let logs: RootSelection<'_> = doc.query("log($MSG)").unwrap();
    assert_eq!(logs.len(), 3);

    // filter + parent keep the Root tier, so the chain can still edit.
    let statements: RootSelection<'_> = logs
        .filter(|ctx| ctx.text().contains("loaded"))
        .parent()
        .unwrap();
    assert_eq!(statements.nodes()[0].kind(), "expression_statement");
    statements.remove();

    doc.commit().unwrap();
    assert!(!doc.text().contains("loaded"));
    assert_eq!(doc.query("log($MSG)").unwrap().len(), 2);
}

#[test]
fn nested_queries_are_derived_and_scoped() {
    let doc = doc();
    let counts = doc
        .query(QueryPattern::TreeSitter("(function_item) @match"))
        .unwrap()
        .map(|ctx| {
            let inner: DerivedSelection<'_> = ctx.query("log($MSG)").unwrap();
            inner.len()
        });
    assert_eq!(counts, vec![2, 1]);

    // Derived selections still narrow and walk parents.
    let helper_log = doc
        .query("fn helper() { $$$BODY }")
        .unwrap()
        .unique()
        .unwrap()
        .map(|ctx| {
            ctx.query("log($MSG)")
                .unwrap()
                .unique()
                .unwrap()
                .parent()
                .unwrap()
                .text()
                .to_string()
        });
    assert_eq!(helper_log, "log(\"helper\");");
}

#[test]
fn cardinality_errors() {
    let doc = doc();

    let err = doc.query("missing()").unwrap().first().unwrap_err();
    assert!(matches!(
        err,
        SelectionError::Cardinality(CardinalityError::EmptySelection)
    ));

    let err = doc.query("log($MSG)").unwrap().unique().unwrap_err();
    assert!(matches!(
        err,
        SelectionError::Cardinality(CardinalityError::NotExactlyOne { count: 3 })
    ));
}

#[test]
fn filter_asymmetry() {
    let doc = doc();

    let none = doc.query("log($MSG)").unwrap().filter(|_| false);
    assert!(none.is_empty());

    let single: RootSingle<'_> = doc.query("respond($U)").unwrap().unique().unwrap();
    assert!(matches!(
        single.filter(|_| false),
        Err(SelectionError::PredicateFailed { kind: "call_expression", .. })
    ));
}

#[test]
fn parent_of_root_fails() {
    let doc = doc();
    let root_kind = doc
        .query(QueryPattern::TreeSitter("(source_file) @match"))
        .unwrap()
        .unique()
        .unwrap()
        .node()
        .kind();
    assert_eq!(root_kind, "source_file");

    let err = doc
        .query(QueryPattern::TreeSitter("(source_file) @match"))
        .unwrap()
        .parent()
        .unwrap_err();
    assert!(matches!(err, SelectionError::NoParent { kind: "source_file", .. }));
}

#[test]
fn parent_keeps_duplicates() {
    let doc = doc();
    let parents = doc
        .query(QueryPattern::TreeSitter(
            "(function_item body: (block (expression_statement) @match))",
        ))
        .unwrap()
        .parent()
        .unwrap();

    // Two statements in `handler`'s block and one in `helper`'s.
    assert_eq!(parents.len(), 3);
    assert_eq!(parents.nodes()[0], parents.nodes()[1]);
    assert!(parents.nodes().iter().all(|node| node.kind() == "block"));
}

#[test]
fn replace_with_template_from_nested_query() {
    let mut doc = doc();
    doc.query("let $V = load($ARG);")
        .unwrap()
        .replace(|ctx| {
            let arg = ctx.query("req.id")?.unique()?.node();
            Ok(Template::new("let user = load_cached($ID).await?;")
                .bind("ID", arg)
                .build()?)
        })
        .unwrap();
    doc.commit().unwrap();

    assert!(doc.text().contains("let user = load_cached(req.id).await?;"));
}

#[test]
fn absent_payloads_skip_nodes() {
    let mut doc = doc();
    doc.query("log($MSG)")
        .unwrap()
        .append(|ctx| {
            Ok(if ctx.text().contains("start") {
                Payload::Text(".ok()".into())
            } else {
                Payload::Absent
            })
        })
        .unwrap();
    assert_eq!(doc.pending().len(), 1);

    doc.commit().unwrap();
    assert!(doc.text().contains("log(\"start\").ok();"));
    assert!(doc.text().contains("log(\"loaded\");"));
}
