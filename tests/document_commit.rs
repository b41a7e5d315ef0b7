//! Commit engine behaviour observed through `Document`.

use proptest::prelude::*;
use tree_splice::{
    CommitStats, Document, DocumentError, EditError, PendingEdit, QueryPattern, SupportLang,
};

fn js(text: &str) -> Document {
    Document::parse(SupportLang::JavaScript, text).unwrap()
}

fn commit_edits(text: &str, edits: &[(usize, usize, &str)]) -> String {
    let mut doc = js(text);
    for &(pos, end, new_text) in edits {
        doc.push_change(PendingEdit::new(pos, end, new_text).unwrap());
    }
    doc.commit().unwrap();
    doc.text().to_string()
}

#[test]
fn nested_nodes_sharing_an_end_both_commit() {
    let mut doc = js("a.bbbb;");
    let removed = doc
        .query(QueryPattern::TreeSitter(
            "[(member_expression) (property_identifier)] @match",
        ))
        .unwrap()
        .remove()
        .len();
    assert_eq!(removed, 2);

    let stats = doc.commit_with_stats().unwrap();
    assert_eq!(stats, CommitStats { applied: 2, discarded: 0 });
    assert_eq!(doc.text(), "");
}

#[test]
fn empty_commit_is_identity() {
    let mut doc = js("a = 1;");
    doc.commit().unwrap();
    assert_eq!(doc.text(), "a = 1;");
    assert!(!doc.dirty());
    assert!(!doc.touched());
}

#[test]
fn insert_into_empty_document() {
    assert_eq!(commit_edits("", &[(0, 0, "a = 1")]), "a = 1");
}

#[test]
fn prepend_at_start() {
    assert_eq!(commit_edits("b = 1;", &[(0, 0, "c = 1;")]), "c = 1;b = 1;");
}

#[test]
fn append_at_end() {
    assert_eq!(commit_edits("b = 1;", &[(6, 6, "c = 1")]), "b = 1;c = 1");
}

#[test]
fn insert_in_middle() {
    assert_eq!(
        commit_edits("a = 1;b = 1;", &[(6, 6, "c = 1;")]),
        "a = 1;c = 1;b = 1;"
    );
}

#[test]
fn remove_span() {
    assert_eq!(commit_edits("a = 1;b = 1;", &[(0, 6, "")]), "b = 1;");
}

#[test]
fn replace_span() {
    assert_eq!(
        commit_edits("a = 1;b = 1;", &[(0, 6, "c = 1;")]),
        "c = 1;b = 1;"
    );
}

#[test]
fn disjoint_edits_commute() {
    let expected = "a = 1;c = 1;b = 1;d = 1;";
    let edits = [(6, 6, "c = 1;"), (12, 12, "d = 1;")];
    assert_eq!(commit_edits("a = 1;b = 1;", &edits), expected);

    let reversed = [edits[1], edits[0]];
    assert_eq!(commit_edits("a = 1;b = 1;", &reversed), expected);
}

#[test]
fn overlapping_edit_is_dropped() {
    let mut doc = js("a = 1;b = 1;");
    doc.push_change(PendingEdit::new(0, 6, "c = 1;").unwrap());
    doc.push_change(PendingEdit::insert(1, "AAA"));

    let stats = doc.commit_with_stats().unwrap();
    assert_eq!(doc.text(), "c = 1;b = 1;");
    assert_eq!(stats, CommitStats { applied: 1, discarded: 1 });
}

#[test]
fn commit_marks_touched_and_clears_queue() {
    let mut doc = js("a = 1;");
    doc.push_change(PendingEdit::insert(6, "b = 2;"));
    assert!(doc.dirty());

    doc.commit().unwrap();
    assert!(!doc.dirty());
    assert!(doc.touched());
    assert!(doc.pending().is_empty());
}

#[test]
fn tree_matches_new_text() {
    let mut doc = js("a = 1;");
    doc.push_change(PendingEdit::insert(6, "\nb = 2;"));
    doc.commit().unwrap();

    let root = doc.root();
    assert_eq!(root.range(), 0..doc.text().len());
    assert_eq!(root.named_children().len(), 2);
    assert_eq!(root.named_children()[1].text(), "b = 2;");
    assert_eq!(root.named_children()[1].start_position().row, 1);
}

#[test]
fn selection_edits_reach_the_document() {
    let mut doc = js("a = 1;b = 1;");
    doc.query("b = 1").unwrap().replace(|_| Ok("b = 2")).unwrap();
    doc.query("a = $V").unwrap().prepend(|_| Ok("x = 0;")).unwrap();
    doc.commit().unwrap();

    assert_eq!(doc.text(), "x = 0;a = 1;b = 2;");
    assert_eq!(doc.query("b = 2").unwrap().len(), 1);
}

#[test]
fn invalid_edit_aborts_whole_commit() {
    let mut doc = js("a = 1;");
    doc.push_change(PendingEdit::insert(0, "x;"));
    doc.push_change(PendingEdit::insert(99, "y;"));

    let err = doc.commit().unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Edit(EditError::OutOfBounds { end: 99, .. })
    ));
    assert_eq!(doc.text(), "a = 1;");
    assert!(doc.dirty());
}

#[test]
fn multibyte_text_uses_byte_offsets() {
    let mut doc = js("s = \"héllo\";");
    let pos = doc.text().find('l').unwrap();
    doc.push_change(PendingEdit::new(pos, pos + 2, "LL").unwrap());
    doc.commit().unwrap();
    assert_eq!(doc.text(), "s = \"héLLo\";");

    let inside_e = doc.text().find('é').unwrap() + 1;
    doc.push_change(PendingEdit::insert(inside_e, "x"));
    assert!(matches!(
        doc.commit(),
        Err(DocumentError::Edit(EditError::NotCharBoundary { .. }))
    ));
}

/// Disjoint, non-touching edits over a fixed text, as (pos, end, text).
fn disjoint_edits() -> impl Strategy<Value = Vec<(usize, usize, String)>> {
    const LEN: usize = 40;
    prop::collection::btree_set(0..=LEN, 0..8).prop_flat_map(|cuts| {
        let cuts: Vec<usize> = cuts.into_iter().collect();
        // Pairing sorted distinct cut points gives spans with gaps between
        // them, so no two edits share a position.
        let spans: Vec<(usize, usize)> = cuts
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        let count = spans.len();
        (Just(spans), prop::collection::vec("[a-z]{0,3}", count))
    })
    .prop_map(|(spans, texts)| {
        spans
            .into_iter()
            .zip(texts)
            .map(|((pos, end), text)| (pos, end, text))
            .collect()
    })
}

proptest! {
    #[test]
    fn push_order_does_not_matter(
        edits in disjoint_edits(),
        seed in any::<u64>(),
    ) {
        let text = "x".repeat(40);

        let forward = {
            let mut doc = js(&text);
            for (pos, end, new_text) in &edits {
                doc.push_change(PendingEdit::new(*pos, *end, new_text.as_str()).unwrap());
            }
            doc.commit_with_stats().unwrap();
            doc.text().to_string()
        };

        let mut shuffled = edits.clone();
        let len = shuffled.len();
        if len > 1 {
            let mut state = seed;
            for i in (1..len).rev() {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                shuffled.swap(i, (state >> 33) as usize % (i + 1));
            }
        }

        let mut doc = js(&text);
        for (pos, end, new_text) in &shuffled {
            doc.push_change(PendingEdit::new(*pos, *end, new_text.as_str()).unwrap());
        }
        let stats = doc.commit_with_stats().unwrap();

        prop_assert_eq!(doc.text(), forward.as_str());
        prop_assert_eq!(stats.applied, edits.len());
        prop_assert_eq!(stats.discarded, 0);
    }
}
