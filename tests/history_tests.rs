//! undo/redo 履歴の公開APIテスト
//!
//! 実際のホスト（`Document`）に記録器を登録し、通常編集の通知経由で
//! 履歴が積まれることを確認する。

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use retropad::buffer::{Document, DocumentHost};
use retropad::editor::{HistoryManager, DEFAULT_HISTORY_LIMIT};

#[derive(Debug, Clone)]
struct Edit {
    cursor: usize,
    text: String,
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    let piece = proptest::collection::vec(
        prop_oneof![Just('a'), Just('Z'), Just(' '), Just('\n'), Just('é'), Just('日')],
        1..4,
    )
    .prop_map(|chars| chars.into_iter().collect::<String>());
    (0usize..64, piece).prop_map(|(cursor, text)| Edit { cursor, text })
}

fn state(doc: &Document) -> (String, usize) {
    (doc.text(), doc.cursor_offset())
}

fn bound_document() -> (Document, HistoryManager) {
    let mut doc = Document::new();
    let history = HistoryManager::new();
    history.bind(&mut doc);
    (doc, history)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn undo_and_redo_walk_the_exact_states(edits in proptest::collection::vec(edit_strategy(), 1..=DEFAULT_HISTORY_LIMIT)) {
        let (mut doc, history) = bound_document();
        let mut before = Vec::new();

        for edit in &edits {
            doc.set_cursor_offset(edit.cursor);
            before.push(state(&doc));
            doc.insert_str(&edit.text);
        }
        let last = state(&doc);
        prop_assert_eq!(history.undo_len(), edits.len());

        for expected in before.iter().rev() {
            prop_assert!(history.undo(&mut doc));
            prop_assert_eq!(&state(&doc), expected);
        }
        prop_assert!(!history.undo(&mut doc));

        // redo は undo 直前の状態（カーソル移動込み）へ進む
        for expected in before.iter().skip(1).chain(std::iter::once(&last)) {
            prop_assert!(history.redo(&mut doc));
            prop_assert_eq!(&state(&doc), expected);
        }
        prop_assert!(!history.redo(&mut doc));
    }
}

#[test]
fn oldest_snapshot_is_evicted_after_limit() {
    let (mut doc, history) = bound_document();
    for _ in 0..=DEFAULT_HISTORY_LIMIT {
        doc.insert_str("x");
    }
    assert_eq!(history.undo_len(), DEFAULT_HISTORY_LIMIT);

    let mut undone = 0;
    while history.undo(&mut doc) {
        undone += 1;
    }
    assert_eq!(undone, DEFAULT_HISTORY_LIMIT);
    // 空文書（最初のスナップショット）には戻れない
    assert_eq!(doc.as_str(), "x");
}

#[test]
fn organic_edit_after_undo_discards_redo() {
    let (mut doc, history) = bound_document();
    doc.insert_str("one");
    doc.insert_str(" two");

    assert!(history.undo(&mut doc));
    assert!(history.can_redo());

    doc.insert_str(" three");
    assert!(!history.can_redo());
    assert!(!history.redo(&mut doc));
    assert_eq!(doc.as_str(), "one three");
}

#[test]
fn undo_on_fresh_history_is_a_no_op() {
    let (mut doc, history) = bound_document();
    assert!(!history.undo(&mut doc));
    assert!(!history.redo(&mut doc));
    assert_eq!(doc.as_str(), "");
}

#[test]
fn restoring_does_not_record_new_history() {
    let (mut doc, history) = bound_document();
    doc.insert_str("abc");
    doc.insert_str("def");
    assert_eq!(history.undo_len(), 2);

    assert!(history.undo(&mut doc));
    assert_eq!((history.undo_len(), history.redo_len()), (1, 1));
    assert!(history.redo(&mut doc));
    assert_eq!((history.undo_len(), history.redo_len()), (2, 0));
    assert!(!history.is_restoring());
}

#[test]
fn cursor_moves_are_kept_in_the_snapshot() {
    let (mut doc, history) = bound_document();
    doc.insert_str("hello world");
    doc.set_cursor_offset(5);
    doc.insert_str(",");
    assert_eq!(doc.as_str(), "hello, world");

    assert!(history.undo(&mut doc));
    assert_eq!(state(&doc), ("hello world".to_string(), 5));
}
