use editor_commands::{
    CommandDescriptor, CommandEngine, CommandRegistry, EngineConfig, EngineState, EventPayload,
    ExecuteError, ExecutionResult, FanOutPolicy, HandlerError, HandlerOutcome, HostError,
    MemoryEditor, Position, RegistryError, RejectReason, ScrollPolicy, SelectionRange,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn counting(name: &'static str, outcome: HandlerOutcome) -> (CommandDescriptor, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let descriptor = CommandDescriptor::new(name, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(outcome)
    });
    (descriptor, count)
}

fn engine_with(descriptors: impl IntoIterator<Item = CommandDescriptor>) -> CommandEngine {
    let registry: CommandRegistry = descriptors.into_iter().collect();
    CommandEngine::new(registry, EngineConfig::default())
}

fn three_cursors(text: &str) -> MemoryEditor {
    MemoryEditor::new(text).with_selections([
        SelectionRange::cursor(Position::new(0, 0)),
        SelectionRange::cursor(Position::new(1, 0)),
        SelectionRange::cursor(Position::new(2, 0)),
    ])
}

#[test]
fn test_read_only_rejects_without_running_handler() {
    let (descriptor, count) = counting("edit", HandlerOutcome::Handled);
    let mut engine = engine_with([descriptor
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor)]);
    let mut editor = three_cursors("a\nb\nc").with_read_only(true);

    let result = engine.execute("edit", None, &mut editor).unwrap();

    assert_eq!(result, ExecutionResult::Rejected(RejectReason::ReadOnly));
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(editor.scroll_log().is_empty());
    assert!(editor.events().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_read_only_allowed_command_runs_when_locked() {
    let mut engine = CommandEngine::with_defaults();
    let mut editor = MemoryEditor::new("abc\ndef").with_read_only(true);

    let result = engine.execute("golinedown", None, &mut editor).unwrap();
    assert_eq!(result, ExecutionResult::Handled);
    assert_eq!(editor.cursor_position(), Position::new(1, 0));

    let blocked = engine.execute("del", None, &mut editor).unwrap();
    assert_eq!(blocked, ExecutionResult::Rejected(RejectReason::ReadOnly));
    assert_eq!(editor.text(), "abc\ndef");
}

#[test]
fn test_unknown_command_is_an_error() {
    let mut engine = CommandEngine::with_defaults();
    let mut editor = MemoryEditor::new("");

    let err = engine.execute("noSuchCommand", None, &mut editor).unwrap_err();
    assert_eq!(
        err,
        ExecuteError::UnknownCommand(RegistryError::NotFound("noSuchCommand".to_string()))
    );
    assert!(editor.events().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_scroll_is_signaled_once_per_request() {
    let mut engine = CommandEngine::with_defaults();
    let mut editor = three_cursors("alpha\nbeta\ngamma");

    engine.execute("gotolineend", None, &mut editor).unwrap();

    assert_eq!(editor.scroll_log(), &[ScrollPolicy::Cursor]);
    assert_eq!(
        editor.selection_ranges(),
        vec![
            SelectionRange::cursor(Position::new(0, 5)),
            SelectionRange::cursor(Position::new(1, 4)),
            SelectionRange::cursor(Position::new(2, 5)),
        ]
    );
}

#[test]
fn test_scroll_policy_none_is_not_signaled() {
    let (descriptor, _) = counting("quiet", HandlerOutcome::Handled);
    let mut engine = engine_with([descriptor]);
    let mut editor = MemoryEditor::new("x");

    engine.execute("quiet", None, &mut editor).unwrap();
    assert!(editor.scroll_log().is_empty());
}

#[test]
fn test_all_declined_is_unhandled_without_scroll() {
    let (descriptor, count) = counting("decline", HandlerOutcome::NotHandled);
    let mut engine = engine_with([descriptor
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor)]);
    let mut editor = three_cursors("a\nb\nc");

    let result = engine.execute("decline", None, &mut editor).unwrap();

    assert_eq!(result, ExecutionResult::Unhandled);
    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert!(editor.scroll_log().is_empty());
    assert_eq!(editor.event_names(), vec!["exec"]);
}

#[test]
fn test_no_op_counts_as_handled() {
    let (descriptor, _) = counting("noop", HandlerOutcome::NoOp);
    let mut engine = engine_with([descriptor.scroll(ScrollPolicy::Center)]);
    let mut editor = MemoryEditor::new("x");

    let result = engine.execute("noop", None, &mut editor).unwrap();
    assert_eq!(result, ExecutionResult::Handled);
    assert_eq!(editor.scroll_log(), &[ScrollPolicy::Center]);
}

#[test]
fn test_exec_events_wrap_successful_request() {
    let mut engine = CommandEngine::with_defaults();
    let mut editor = MemoryEditor::new("abc");

    engine.execute("gotoright", None, &mut editor).unwrap();

    let expected = EventPayload::Command {
        name: "gotoright".to_string(),
    };
    assert_eq!(
        editor.events(),
        &[
            ("exec".to_string(), expected.clone()),
            ("afterExec".to_string(), expected),
        ]
    );
}

#[test]
fn test_exec_events_can_be_disabled() {
    let config = EngineConfig {
        emit_exec_events: false,
        ..EngineConfig::default()
    };
    let mut engine = CommandEngine::new(editor_commands::default_registry(), config);
    let mut editor = MemoryEditor::new("abc");

    engine.execute("gotoright", None, &mut editor).unwrap();
    assert!(editor.events().is_empty());
}

#[test]
fn test_handler_failure_aborts_remaining_iterations() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = seen.clone();
    let failing = CommandDescriptor::new("fragile", move |ctx, _| {
        let call = counter.fetch_add(1, Ordering::SeqCst);
        if call == 1 {
            return Err(HandlerError::Host(HostError::Other("disk full".to_string())));
        }
        let range = ctx.host.selection_range();
        ctx.host.replace(range, "!")?;
        Ok(HandlerOutcome::Handled)
    })
    .fan_out(FanOutPolicy::PerSelection)
    .scroll(ScrollPolicy::Cursor);

    let mut engine = engine_with([failing]);
    let mut editor = three_cursors("a\nb\nc");

    let err = engine.execute("fragile", None, &mut editor).unwrap_err();

    assert_eq!(
        err,
        ExecuteError::HandlerFailure {
            command: "fragile".to_string(),
            index: 1,
            completed: 1,
            source: HandlerError::Host(HostError::Other("disk full".to_string())),
        }
    );
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    // The first edit stays; the third iteration never ran.
    assert_eq!(editor.text(), "!a\nb\nc");
    // The completed iteration still gets its scroll.
    assert_eq!(editor.scroll_log(), &[ScrollPolicy::Cursor]);
    assert_eq!(editor.event_names(), vec!["exec"]);
    assert_eq!(engine.state(), EngineState::Idle);
    assert_eq!(engine.registry().len(), 1);
}

#[test]
fn test_failure_on_first_iteration_does_not_scroll() {
    let failing = CommandDescriptor::new("broken", |_, _| {
        Err(HandlerError::Host(HostError::Other("gone".to_string())))
    })
    .fan_out(FanOutPolicy::PerSelection)
    .scroll(ScrollPolicy::Center);

    let mut engine = engine_with([failing]);
    let mut editor = three_cursors("a\nb\nc");

    let err = engine.execute("broken", None, &mut editor).unwrap_err();

    assert!(matches!(
        err,
        ExecuteError::HandlerFailure {
            index: 0,
            completed: 0,
            ..
        }
    ));
    assert!(editor.scroll_log().is_empty());
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn test_descriptor_can_run_without_registration() {
    let (descriptor, count) = counting("adhoc", HandlerOutcome::Handled);
    let mut engine = CommandEngine::new(CommandRegistry::new(), EngineConfig::default());
    let mut editor = MemoryEditor::new("");

    let result = engine.execute(descriptor, None, &mut editor).unwrap();
    assert_eq!(result, ExecutionResult::Handled);
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(engine.registry().is_empty());
}

#[test]
fn test_replaced_command_takes_effect_for_next_request() {
    let (first, first_count) = counting("cmd", HandlerOutcome::Handled);
    let (second, second_count) = counting("cmd", HandlerOutcome::Handled);
    let mut engine = engine_with([first]);
    let mut editor = MemoryEditor::new("");

    engine.execute("cmd", None, &mut editor).unwrap();
    engine.registry_mut().register(second);
    engine.execute("cmd", None, &mut editor).unwrap();

    assert_eq!(first_count.load(Ordering::SeqCst), 1);
    assert_eq!(second_count.load(Ordering::SeqCst), 1);
}
