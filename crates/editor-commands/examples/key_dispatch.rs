//! Key dispatch example
//!
//! Drives a `MemoryEditor` through the default command table with key chords, the way an
//! embedding widget would forward keyboard events. Set `RUST_LOG=editor_commands=debug` to see
//! the engine state transitions.

use editor_commands::{
    Chord, CommandArg, CommandEngine, EngineConfig, KeyDispatch, MemoryEditor, Platform, Position,
    SelectionRange, default_registry,
};
use tracing_subscriber::EnvFilter;

fn press(engine: &mut CommandEngine, editor: &mut MemoryEditor, key: &str) {
    let chord: Chord = key.parse().expect("valid chord");
    let outcome = engine.handle_chord(&chord, editor).expect("command failed");
    let note = match outcome {
        KeyDispatch::Consumed(result) => format!("consumed ({result:?})"),
        KeyDispatch::Forward => "forwarded to host".to_string(),
        KeyDispatch::NoBinding => "not bound".to_string(),
    };
    println!("  {key:<16} -> {note}");
    for line in editor.lines() {
        println!("      | {line}");
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = EngineConfig::default().with_platform(Platform::Primary);
    let mut engine = CommandEngine::new(default_registry(), config);
    println!("=== Key dispatch ({} commands) ===\n", engine.registry().len());

    let mut editor = MemoryEditor::new("let a = 1;\nlet b = 2;\nlet c = 3;").with_selections([
        SelectionRange::cursor(Position::new(0, 0)),
        SelectionRange::cursor(Position::new(1, 0)),
        SelectionRange::cursor(Position::new(2, 0)),
    ]);

    println!("1. One chord, three cursors:");
    press(&mut engine, &mut editor, "End");
    press(&mut engine, &mut editor, "Ctrl-Shift-Left");
    press(&mut engine, &mut editor, "Ctrl-U");

    println!("\n2. Inserting at every cursor:");
    press(&mut engine, &mut editor, "End");
    let arg = CommandArg::Text(" // ok".to_string());
    engine
        .execute("insertstring", Some(&arg), &mut editor)
        .expect("insert failed");
    for line in editor.lines() {
        println!("      | {line}");
    }

    println!("\n3. Joining lines:");
    let mut editor = MemoryEditor::new("  foo\nbar  \nbaz");
    engine
        .execute("joinlines", None, &mut editor)
        .expect("join failed");
    println!("  cursor at {}", editor.cursor_position());
    for line in editor.lines() {
        println!("      | {line}");
    }

    println!("\n4. Read-only mode:");
    editor.set_read_only(true);
    press(&mut engine, &mut editor, "Ctrl-D");
    press(&mut engine, &mut editor, "Ctrl-Home");
    press(&mut engine, &mut editor, "Ctrl-Alt-Shift-F12");

    println!("\nScroll signals: {:?}", editor.scroll_log());
}
