//! Citation tracking through edit sessions, plus property tests for the
//! toggle and merge laws.

use proptest::prelude::*;
use refdoc_core::{
    serialize, Block, CitationChild, Decoration, Document, Edit, EditSession, InlineRun, Mark,
    Reference, ReferenceLibrary, TrackerState, Transaction,
};

// Title block spans 0..5; the paragraph's content starts at 7.
const BODY: usize = 7;

fn doc(runs: Vec<InlineRun>) -> Document {
    Document::new(vec![
        Block::heading(1, vec![InlineRun::text("T")]),
        Block::paragraph(runs),
    ])
}

fn library() -> ReferenceLibrary {
    ReferenceLibrary::from(vec![
        Reference::new("a", "alpha", "A"),
        Reference::new("b", "beta", "B"),
    ])
}

#[test]
fn test_adjacent_spans_track_as_one_range() {
    let session = EditSession::new(doc(vec![
        InlineRun::text("x"),
        InlineRun::cite("a"),
        InlineRun::cite("b"),
        InlineRun::citation(vec![CitationChild::text("p. 2")]),
    ]));
    assert_eq!(session.ranges().len(), 1);
    assert_eq!(session.ranges()[0].start, BODY + 1);
    assert_eq!(session.ranges()[0].end, BODY + 7);
    // the spans themselves stay distinct in the document
    assert_eq!(session.document().blocks()[1].inline.runs().len(), 4);
}

#[test]
fn test_typing_after_reference_inserts_separator_exactly_once() {
    let mut session = EditSession::new(doc(vec![InlineRun::text("see "), InlineRun::cite("a")]));
    let end = session.ranges()[0].end;
    assert_eq!(end, BODY + 5);

    let mut cursor = end;
    let mut separators = 0;
    for ch in ["p", ".", " ", "4"] {
        let outcome = session.apply(Transaction::typing(cursor, ch)).unwrap();
        separators += outcome.separator_insertions.len();
        cursor = session.cursor().unwrap();
    }
    assert_eq!(separators, 1);

    let out = serialize(session.document(), &library(), "out").unwrap();
    assert!(out.markdown_content.contains("see @alpha; p. 4"));
}

#[test]
fn test_typing_after_reference_with_empty_trailing_text() {
    let mut session = EditSession::new(doc(vec![InlineRun::citation(vec![
        CitationChild::reference("a"),
        CitationChild::text(""),
    ])]));
    assert!(session.ranges()[0].ends_with_reference);

    let outcome = session.apply(Transaction::typing(BODY + 1, "p")).unwrap();
    assert_eq!(outcome.separator_insertions.len(), 1);
    assert_eq!(outcome.separator_insertions[0].offset, BODY + 1);

    let out = serialize(session.document(), &library(), "out").unwrap();
    assert!(out.markdown_content.contains("@alpha; p"));
}

#[test]
fn test_second_reference_gets_separator() {
    let mut session = EditSession::new(doc(vec![InlineRun::cite("a")]));
    let outcome = session
        .apply(Transaction::new(vec![Edit::InsertReference {
            at: BODY + 1,
            reference_id: "b".to_string(),
        }]))
        .unwrap();
    assert_eq!(outcome.separator_insertions.len(), 1);

    let out = serialize(session.document(), &library(), "out").unwrap();
    assert!(out.markdown_content.contains("@alpha; @beta"));
}

#[test]
fn test_new_span_defers_separator() {
    let mut session = EditSession::new(doc(vec![InlineRun::cite("a"), InlineRun::text(" x")]));
    let outcome = session
        .apply(Transaction::new(vec![Edit::InsertReference {
            at: BODY + 3,
            reference_id: "b".to_string(),
        }]))
        .unwrap();
    assert!(outcome.separator_insertions.is_empty());
    assert_eq!(session.ranges().len(), 2);
}

#[test]
fn test_deleting_back_to_reference_does_not_insert() {
    let mut session = EditSession::new(doc(vec![InlineRun::citation(vec![
        CitationChild::reference("a"),
        CitationChild::text("xy"),
    ])]));
    let outcome = session
        .apply(Transaction::new(vec![Edit::Delete {
            from: BODY + 1,
            to: BODY + 3,
        }]))
        .unwrap();
    assert!(outcome.separator_insertions.is_empty());
    assert!(session.ranges()[0].ends_with_reference);
}

#[test]
fn test_preview_decoration_at_cursor() {
    let mut session = EditSession::new(doc(vec![InlineRun::text("see "), InlineRun::cite("a")]));
    session.set_cursor(Some(BODY + 5));

    let decorations = session.decorations();
    assert_eq!(
        decorations,
        vec![
            Decoration::OpenBracket { at: BODY + 4 },
            Decoration::SeparatorPreview { at: BODY + 5 },
            Decoration::CloseBracket { at: BODY + 5 },
        ]
    );
    let labels: String = decorations.iter().map(Decoration::label).collect();
    assert_eq!(labels, "[; ]");
    // preview is never written into the document
    assert_eq!(session.document().blocks()[1].inline.plain_text(), "see ");
}

#[test]
fn test_removing_last_child_removes_span() {
    let mut document = doc(vec![InlineRun::text("a"), InlineRun::cite("a")]);
    let path = refdoc_core::NodePath::block(&[1]);
    document.remove_citation_child(&path, 1, 0).unwrap();
    assert_eq!(document.blocks()[1].inline.runs(), &[InlineRun::text("a")]);
    assert!(TrackerState::from_document(&document).is_empty());
}

fn alternating(texts: &[String]) -> Vec<InlineRun> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            if i % 2 == 0 {
                InlineRun::styled(text.clone(), &[Mark::Bold])
            } else {
                InlineRun::text(text.clone())
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_toggle_twice_restores(
        texts in prop::collection::vec("[a-z]{1,5}", 1..6),
        a in 0usize..40,
        b in 0usize..40,
        mark in prop_oneof![Just(Mark::Bold), Just(Mark::Italic), Just(Mark::Strike)],
    ) {
        let original = doc(alternating(&texts));
        let size: usize = texts.iter().map(|t| t.chars().count()).sum();
        let (from, to) = {
            let (x, y) = (a % (size + 1), b % (size + 1));
            (x.min(y), x.max(y))
        };

        let mut edited = original.clone();
        edited.toggle_mark_at(BODY + from, BODY + to, mark).unwrap();
        edited.toggle_mark_at(BODY + from, BODY + to, mark).unwrap();
        prop_assert_eq!(edited, original);
    }

    #[test]
    fn prop_adjacent_spans_merge(
        spans in prop::collection::vec(prop::bool::ANY, 1..8),
        gap in prop::bool::ANY,
    ) {
        let mut runs = Vec::new();
        for (i, with_text) in spans.iter().enumerate() {
            if gap && i > 0 {
                runs.push(InlineRun::text(" "));
            }
            if *with_text {
                runs.push(InlineRun::citation(vec![
                    CitationChild::reference("a"),
                    CitationChild::text("p. 1"),
                ]));
            } else {
                runs.push(InlineRun::cite("b"));
            }
        }
        let state = TrackerState::from_document(&doc(runs));
        let expected = if gap { spans.len() } else { 1 };
        prop_assert_eq!(state.ranges.len(), expected);
    }
}
