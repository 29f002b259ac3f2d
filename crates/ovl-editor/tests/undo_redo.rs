//! Integration tests: snapshot undo/redo through the editor.
//!
//! Restores are asynchronous, so every undo/redo here is followed by
//! `pump()` to deliver the completion.

use ovl_core::{Color, ElementId, FontWeight, TextElement};
use ovl_editor::{
    Background, Completion, Direction, Editor, EditorConfig, HISTORY_CAPACITY, HeadlessScene,
    MemoryStore, NoticeLevel, PropertyEdit, TaskOutput,
};
use pretty_assertions::assert_eq;

type TestEditor = Editor<HeadlessScene, MemoryStore>;

fn make_editor() -> TestEditor {
    Editor::new(
        HeadlessScene::new(800.0, 600.0),
        MemoryStore::new(),
        EditorConfig::default(),
    )
    .unwrap()
}

fn undo(editor: &mut TestEditor) -> bool {
    let started = editor.undo().is_some();
    editor.pump();
    started
}

fn redo(editor: &mut TestEditor) -> bool {
    let started = editor.redo().is_some();
    editor.pump();
    started
}

fn font_size(editor: &TestEditor, id: ElementId) -> f64 {
    editor.element(id).unwrap().props.typography.font_size
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_restores_previous_field_value() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    assert!(editor.update_field(id, PropertyEdit::FontSize(48.0)));

    assert!(editor.undo().is_some());
    // Nothing moves until the restore completes.
    assert_eq!(font_size(&editor, id), 48.0);
    assert_eq!(editor.pump(), 1);
    assert_eq!(font_size(&editor, id), 32.0);

    assert!(redo(&mut editor));
    assert_eq!(font_size(&editor, id), 48.0);
}

#[test]
fn undo_of_first_add_returns_to_empty_canvas() {
    let mut editor = make_editor();
    editor.add_text().unwrap();
    assert!(undo(&mut editor));
    assert!(editor.elements().is_empty());
    assert!(editor.scene().graph().is_empty());
}

#[test]
fn undo_k_steps_matches_list_after_edits_minus_k() {
    let mut editor = make_editor();
    let mut captured: Vec<Vec<TextElement>> = vec![editor.elements().to_vec()];

    let a = editor.add_text().unwrap();
    captured.push(editor.elements().to_vec());
    assert!(editor.update_field(a, PropertyEdit::Text("Headline".into())));
    captured.push(editor.elements().to_vec());
    assert!(editor.update_field(a, PropertyEdit::Fill(Color::from_hex("#336699").unwrap())));
    captured.push(editor.elements().to_vec());
    let b = editor.add_text().unwrap();
    captured.push(editor.elements().to_vec());
    assert!(editor.update_field(b, PropertyEdit::FontWeight(FontWeight::Bold)));
    captured.push(editor.elements().to_vec());
    assert!(editor.reorder(b, Direction::Down));
    captured.push(editor.elements().to_vec());
    assert!(editor.duplicate(a).is_some());
    editor.pump();
    captured.push(editor.elements().to_vec());
    assert!(editor.toggle_lock(b));
    captured.push(editor.elements().to_vec());
    assert!(editor.update_field(a, PropertyEdit::OpacityPercent(37.0)));
    captured.push(editor.elements().to_vec());
    assert!(editor.toggle_visibility(b));
    captured.push(editor.elements().to_vec());
    assert!(editor.delete(a));
    captured.push(editor.elements().to_vec());

    let edits = captured.len() - 1;
    for k in 1..=edits {
        assert!(undo(&mut editor), "undo {k} did not start");
        assert_eq!(editor.elements(), captured[edits - k].as_slice(), "after {k} undos");
    }
    for k in 1..=edits {
        assert!(redo(&mut editor), "redo {k} did not start");
        assert_eq!(editor.elements(), captured[k].as_slice(), "after {k} redos");
    }
}

#[test]
fn undo_at_oldest_and_redo_at_newest_are_noops() {
    let mut editor = make_editor();
    assert!(editor.undo().is_none());
    assert!(editor.redo().is_none());

    let id = editor.add_text().unwrap();
    assert!(editor.redo().is_none());
    assert!(undo(&mut editor));
    let cursor = editor.history().cursor();
    assert!(editor.undo().is_none());
    assert_eq!(editor.history().cursor(), cursor);
    assert!(editor.element(id).is_none());
}

#[test]
fn history_never_exceeds_capacity() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    for i in 0..30 {
        assert!(editor.update_field(id, PropertyEdit::Left(f64::from(i))));
        assert!(editor.history().len() <= HISTORY_CAPACITY);
    }
    assert_eq!(editor.history().len(), HISTORY_CAPACITY);

    let mut undos = 0;
    while undo(&mut editor) {
        undos += 1;
    }
    assert_eq!(undos, HISTORY_CAPACITY - 1);
    // Oldest retained snapshot: left = 29 - 19.
    assert_eq!(editor.element(id).unwrap().props.placement.left, 10.0);
}

#[test]
fn edit_after_undo_discards_redo_entries() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    editor.update_field(id, PropertyEdit::FontSize(40.0));
    editor.update_field(id, PropertyEdit::FontSize(50.0));

    assert!(undo(&mut editor));
    assert!(undo(&mut editor));
    assert!(editor.history().can_redo());

    assert!(editor.update_field(id, PropertyEdit::FontSize(60.0)));
    assert!(!editor.history().can_redo());
    assert!(undo(&mut editor));
    assert_eq!(font_size(&editor, id), 32.0);
}

#[test]
fn fill_from_unit_channels_survives_undo() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    let fill = Color::from_unit(0.3, 0.3, 0.3, 1.0);
    assert!(editor.update_field(id, PropertyEdit::Fill(fill)));
    let captured = editor.elements().to_vec();

    assert!(editor.update_field(id, PropertyEdit::FontSize(50.0)));
    assert!(undo(&mut editor));
    assert_eq!(editor.elements(), captured.as_slice());
    assert_eq!(editor.element(id).unwrap().props.typography.fill, fill);
}

#[test]
fn background_change_is_undone_and_redone() {
    let mut editor = make_editor();
    assert!(editor.set_background("bg.png", 2400.0, 1200.0));
    let uploaded = editor.background().clone();
    assert_eq!(editor.scene().dimensions(), (1200.0, 600.0));

    assert!(undo(&mut editor));
    assert_eq!(editor.background(), &Background::blank(800.0, 600.0));
    assert_eq!(editor.scene().dimensions(), (800.0, 600.0));
    assert_eq!(editor.background().export_multiplier(), 1.0);

    assert!(redo(&mut editor));
    assert_eq!(editor.background(), &uploaded);
    assert_eq!(editor.scene().dimensions(), (1200.0, 600.0));
}

// ─── Restore in flight ──────────────────────────────────────────────────

#[test]
fn second_undo_during_restore_is_ignored() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    editor.update_field(id, PropertyEdit::FontSize(40.0));
    editor.update_field(id, PropertyEdit::FontSize(50.0));
    let cursor = editor.history().cursor().unwrap();

    assert!(editor.undo().is_some());
    assert!(editor.undo().is_none());
    assert!(editor.redo().is_none());
    assert!(!editor.update_field(id, PropertyEdit::FontSize(99.0)));
    assert_eq!(editor.scene().pending_count(), 1);

    editor.pump();
    assert_eq!(editor.history().cursor(), Some(cursor - 1));
    assert_eq!(font_size(&editor, id), 40.0);
}

#[test]
fn failed_restore_keeps_cursor_and_state() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    editor.update_field(id, PropertyEdit::FontSize(40.0));
    let before = editor.elements().to_vec();
    let cursor = editor.history().cursor();

    editor.scene_mut().fail_next_task("decoder crashed");
    assert!(undo(&mut editor));

    assert_eq!(editor.history().cursor(), cursor);
    assert_eq!(editor.elements(), before.as_slice());
    let notices = editor.take_notices();
    assert!(
        notices
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.contains("restore"))
    );

    // The editor is usable again.
    assert!(editor.update_field(id, PropertyEdit::FontSize(44.0)));
}

#[test]
fn clone_resolving_during_restore_is_cancelled_with_notice() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    editor.take_notices();

    assert!(editor.duplicate(id).is_some());
    assert!(editor.undo().is_some());
    assert_eq!(editor.pump(), 2);

    assert!(editor.elements().is_empty());
    let notices = editor.take_notices();
    assert!(
        notices
            .iter()
            .any(|n| n.level == NoticeLevel::Info && n.message == "Duplicate cancelled")
    );
}

#[test]
fn completion_after_reset_is_dropped() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    editor.update_field(id, PropertyEdit::FontSize(40.0));
    let ticket = editor.undo().unwrap();

    editor.reset().unwrap();
    assert_eq!(editor.scene().pending_count(), 0);
    assert!(!editor.complete(Completion {
        ticket,
        result: Ok(TaskOutput::Deserialized),
    }));
    assert!(editor.elements().is_empty());
    assert_eq!(editor.history().len(), 1);
}

// ─── Persistence ────────────────────────────────────────────────────────

#[test]
fn history_survives_reload() {
    let mut editor = make_editor();
    let id = editor.add_text().unwrap();
    editor.update_field(id, PropertyEdit::FontSize(40.0));
    editor.update_field(id, PropertyEdit::FontSize(50.0));
    assert!(undo(&mut editor));

    let blob = editor.store().blob().unwrap().to_owned();
    let mut reloaded = Editor::new(
        HeadlessScene::new(800.0, 600.0),
        MemoryStore::with_blob(blob),
        EditorConfig::default(),
    )
    .unwrap();

    assert_eq!(reloaded.elements(), editor.elements());
    assert_eq!(reloaded.history().len(), editor.history().len());
    assert_eq!(reloaded.history().cursor(), editor.history().cursor());

    assert!(redo(&mut reloaded));
    assert_eq!(font_size(&reloaded, id), 50.0);
}

#[test]
fn malformed_blob_starts_fresh() {
    let editor = Editor::new(
        HeadlessScene::new(800.0, 600.0),
        MemoryStore::with_blob("{ not json"),
        EditorConfig::default(),
    )
    .unwrap();
    assert!(editor.elements().is_empty());
    assert_eq!(editor.history().len(), 1);
    assert!(!editor.history().can_undo());
}

#[test]
fn every_commit_is_persisted() {
    let mut editor = make_editor();
    let saves = editor.store().save_count();
    let id = editor.add_text().unwrap();
    editor.update_field(id, PropertyEdit::Top(12.0));
    assert_eq!(editor.store().save_count(), saves + 2);
    assert!(editor.store().blob().unwrap().contains("\"top\":12.0"));
}
