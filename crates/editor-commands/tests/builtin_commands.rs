use editor_commands::{
    Capability, CommandArg, CommandEngine, EngineConfig, EventPayload, ExecuteError,
    ExecutionResult, HandlerError, MemoryEditor, Position, Prompt, ScrollPolicy, SelectionRange,
    default_registry,
};
use pretty_assertions::assert_eq;

fn engine() -> CommandEngine {
    CommandEngine::with_defaults()
}

#[test]
fn test_cut_empty_selection_cuts_whole_line() {
    let mut editor = MemoryEditor::new("one\ntwo\nthree").with_cursor(Position::new(1, 1));

    let result = engine().execute("cut", None, &mut editor).unwrap();

    assert_eq!(result, ExecutionResult::Handled);
    assert_eq!(
        editor.events()[1],
        (
            "cut".to_string(),
            EventPayload::Range(SelectionRange::from_coords((1, 0), (2, 0)))
        )
    );
    assert_eq!(editor.text(), "one\nthree");
    assert_eq!(editor.cursor_position(), Position::new(1, 0));
    assert_eq!(editor.scroll_log(), &[ScrollPolicy::Cursor]);
}

#[test]
fn test_cut_empty_last_line_keeps_previous_terminator() {
    let mut editor = MemoryEditor::new("one\ntwo").with_cursor(Position::new(1, 2));

    engine().execute("cut", None, &mut editor).unwrap();

    assert_eq!(editor.text(), "one\n");
}

#[test]
fn test_cut_empty_selection_without_line_mode_does_nothing() {
    let config = EngineConfig {
        copy_with_empty_selection: false,
        ..EngineConfig::default()
    };
    let mut engine = CommandEngine::new(default_registry(), config);
    let mut editor = MemoryEditor::new("one\ntwo").with_cursor(Position::new(0, 2));

    engine.execute("cut", None, &mut editor).unwrap();

    assert_eq!(editor.text(), "one\ntwo");
    assert_eq!(
        editor.events()[1].1,
        EventPayload::Range(SelectionRange::cursor(Position::new(0, 2)))
    );
}

#[test]
fn test_cut_every_selection() {
    let mut editor = MemoryEditor::new("abcdef").with_selections([
        SelectionRange::from_coords((0, 0), (0, 1)),
        SelectionRange::from_coords((0, 3), (0, 5)),
    ]);

    engine().execute("cut", None, &mut editor).unwrap();

    assert_eq!(editor.text(), "bcf");
    let cut_events = editor
        .events()
        .iter()
        .filter(|(name, _)| name == "cut")
        .count();
    assert_eq!(cut_events, 2);
}

#[test]
fn test_insertstring_requires_text() {
    let mut editor = MemoryEditor::new("abc");

    let err = engine()
        .execute("insertstring", None, &mut editor)
        .unwrap_err();

    match err {
        ExecuteError::HandlerFailure { index, source, .. } => {
            assert_eq!(index, 0);
            assert_eq!(source, HandlerError::InvalidArgument { expected: "text" });
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(editor.text(), "abc");
}

#[test]
fn test_inserttext_repeats() {
    let mut editor = MemoryEditor::new("[]").with_cursor(Position::new(0, 1));
    let arg = CommandArg::Repeat {
        text: "ab".to_string(),
        times: 3,
    };

    engine()
        .execute("inserttext", Some(&arg), &mut editor)
        .unwrap();

    assert_eq!(editor.text(), "[ababab]");
    assert_eq!(editor.cursor_position(), Position::new(0, 7));
}

#[test]
fn test_paste_without_text_is_a_no_op() {
    let mut editor = MemoryEditor::new("abc");

    let result = engine().execute("paste", None, &mut editor).unwrap();

    assert_eq!(result, ExecutionResult::Handled);
    assert_eq!(editor.text(), "abc");
    assert!(editor.performed().is_empty());
}

#[test]
fn test_paste_replaces_selection() {
    let mut editor = MemoryEditor::new("hello world")
        .with_selections([SelectionRange::from_coords((0, 6), (0, 11))]);
    let arg = CommandArg::Text("there".to_string());

    engine().execute("paste", Some(&arg), &mut editor).unwrap();

    assert_eq!(editor.text(), "hello there");
}

#[test]
fn test_gotoline_jumps_then_prompts() {
    let mut editor = MemoryEditor::new("");

    engine()
        .execute("gotoline", Some(&CommandArg::Number(12)), &mut editor)
        .unwrap();
    engine().execute("gotoline", None, &mut editor).unwrap();

    assert_eq!(
        editor.performed(),
        &[
            Capability::GotoLine(12),
            Capability::Prompt(Prompt::GotoLine),
            Capability::Prompt(Prompt::GotoLine),
        ]
    );
}

#[test]
fn test_fold_to_level_uses_its_own_level() {
    let mut engine = engine();
    let mut editor = MemoryEditor::new("fn main() {}").with_read_only(true);

    engine.execute("foldToLevel3", None, &mut editor).unwrap();
    engine.execute("foldToLevel7", None, &mut editor).unwrap();

    assert_eq!(
        editor.performed(),
        &[Capability::FoldToLevel(3), Capability::FoldToLevel(7)]
    );
    assert_eq!(editor.scroll_log(), &[ScrollPolicy::Center, ScrollPolicy::Center]);
}

#[test]
fn test_obsolete_palette_alias_still_opens_palette() {
    let mut engine = engine();
    let mut editor = MemoryEditor::new("");

    engine.execute("openCommandPallete", None, &mut editor).unwrap();
    engine.execute("openCommandPalette", None, &mut editor).unwrap();

    assert_eq!(
        editor.performed(),
        &[
            Capability::Prompt(Prompt::Commands),
            Capability::Prompt(Prompt::Commands),
        ]
    );
}

#[test]
fn test_transpose_switches_on_selection_count() {
    let mut engine = engine();

    let mut single = MemoryEditor::new("ab").with_cursor(Position::new(0, 1));
    engine.execute("transposeletters", None, &mut single).unwrap();
    assert_eq!(single.performed(), &[Capability::TransposeLetters]);

    let mut multi = MemoryEditor::new("ab cd").with_selections([
        SelectionRange::from_coords((0, 0), (0, 2)),
        SelectionRange::from_coords((0, 3), (0, 5)),
    ]);
    engine.execute("transposeletters", None, &mut multi).unwrap();
    assert_eq!(multi.performed(), &[Capability::TransposeSelections(1)]);
}

#[test]
fn test_case_change_per_selection() {
    let mut editor = MemoryEditor::new("one two three").with_selections([
        SelectionRange::from_coords((0, 0), (0, 3)),
        SelectionRange::from_coords((0, 8), (0, 13)),
    ]);

    engine().execute("touppercase", None, &mut editor).unwrap();
    assert_eq!(editor.text(), "ONE two THREE");

    engine().execute("tolowercase", None, &mut editor).unwrap();
    assert_eq!(editor.text(), "one two three");
}

#[test]
fn test_add_line_after_and_before() {
    let mut editor = MemoryEditor::new("abc\ndef").with_cursor(Position::new(0, 1));
    engine().execute("addLineAfter", None, &mut editor).unwrap();
    assert_eq!(editor.text(), "abc\n\ndef");
    assert_eq!(editor.cursor_position(), Position::new(1, 0));

    let mut editor = MemoryEditor::new("abc\ndef").with_cursor(Position::new(1, 1));
    engine().execute("addLineBefore", None, &mut editor).unwrap();
    assert_eq!(editor.text(), "abc\n\ndef");
    assert_eq!(editor.cursor_position(), Position::new(1, 0));

    let mut editor = MemoryEditor::new("abc").with_cursor(Position::new(0, 2));
    engine().execute("addLineBefore", None, &mut editor).unwrap();
    assert_eq!(editor.text(), "\nabc");
    assert_eq!(editor.cursor_position(), Position::new(0, 0));
}

#[test]
fn test_expand_to_line() {
    let mut editor = MemoryEditor::new("abc\ndef").with_cursor(Position::new(0, 1));
    engine().execute("expandtoline", None, &mut editor).unwrap();
    assert_eq!(
        editor.selection_ranges(),
        vec![SelectionRange::from_coords((0, 0), (1, 0))]
    );

    let mut last = MemoryEditor::new("abc\ndef").with_cursor(Position::new(1, 1));
    engine().execute("expandtoline", None, &mut last).unwrap();
    assert_eq!(
        last.selection_ranges(),
        vec![SelectionRange::from_coords((1, 0), (1, 3))]
    );
}

#[test]
fn test_remove_to_line_edges_hard() {
    let mut editor = MemoryEditor::new("  indented text").with_cursor(Position::new(0, 11));
    engine()
        .execute("removetolinestarthard", None, &mut editor)
        .unwrap();
    assert_eq!(editor.text(), "text");

    let mut editor = MemoryEditor::new("keep this|drop").with_cursor(Position::new(0, 9));
    engine()
        .execute("removetolineendhard", None, &mut editor)
        .unwrap();
    assert_eq!(editor.text(), "keep this");
}

#[test]
fn test_select_all_collapses_multi_selection() {
    let mut editor = MemoryEditor::new("ab\ncd").with_selections([
        SelectionRange::cursor(Position::new(0, 1)),
        SelectionRange::cursor(Position::new(1, 1)),
    ]);

    engine().execute("selectall", None, &mut editor).unwrap();

    assert_eq!(
        editor.selection_ranges(),
        vec![SelectionRange::from_coords((0, 0), (1, 2))]
    );
}

#[test]
fn test_select_or_find_depends_on_selection() {
    let mut engine = engine();

    let mut caret = MemoryEditor::new("word word");
    engine.execute("selectOrFindNext", None, &mut caret).unwrap();
    assert_eq!(caret.performed(), &[Capability::SelectWord]);

    let mut selected = MemoryEditor::new("word word")
        .with_selections([SelectionRange::from_coords((0, 0), (0, 4))]);
    engine.execute("selectOrFindPrevious", None, &mut selected).unwrap();
    assert_eq!(selected.performed(), &[Capability::Find { backwards: true }]);
}

#[test]
fn test_editing_commands_blocked_when_read_only() {
    let mut engine = engine();
    let mut editor = MemoryEditor::new("abc").with_read_only(true);

    for name in ["cut", "paste", "removeline", "undo", "indent", "addLineAfter"] {
        let result = engine.execute(name, None, &mut editor).unwrap();
        assert!(
            matches!(result, ExecutionResult::Rejected(_)),
            "{name} ran in read-only mode"
        );
    }
    assert!(editor.performed().is_empty());
    assert_eq!(editor.text(), "abc");
}
