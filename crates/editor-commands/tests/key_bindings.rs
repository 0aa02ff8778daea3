use editor_commands::{
    BindingSpec, Capability, Chord, CommandDescriptor, CommandEngine, CommandRegistry,
    EngineConfig, ExecutionResult, FanOutPolicy, HandlerOutcome, KeyDispatch, KeySequence,
    MemoryEditor, Platform, Position, RejectReason, SelectionRange, default_registry,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};

fn chord(s: &str) -> Chord {
    s.parse().unwrap()
}

fn engine_on(platform: Platform) -> CommandEngine {
    CommandEngine::new(
        default_registry(),
        EngineConfig::default().with_platform(platform),
    )
}

#[test]
fn test_derived_binding_uses_command_on_secondary() {
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandDescriptor::new("jump", |_, _| Ok(HandlerOutcome::Handled))
            .bind(BindingSpec::derived("Ctrl-Alt-J")),
    );
    let mut engine = CommandEngine::new(
        registry,
        EngineConfig::default().with_platform(Platform::Secondary),
    );
    let mut editor = MemoryEditor::new("");

    assert_eq!(
        engine.handle_chord(&chord("Command-Alt-J"), &mut editor).unwrap(),
        KeyDispatch::Consumed(ExecutionResult::Handled)
    );
    assert_eq!(
        engine.handle_chord(&chord("Ctrl-Alt-J"), &mut editor).unwrap(),
        KeyDispatch::NoBinding
    );
}

#[test]
fn test_primary_only_binding_has_no_secondary_candidates() {
    let mut registry = CommandRegistry::new();
    registry.register(
        CommandDescriptor::new("quit", |_, _| Ok(HandlerOutcome::Handled))
            .bind(BindingSpec::new(Some("Ctrl-Q"), None)),
    );

    assert!(
        registry
            .resolve_by_chord(&chord("Ctrl-Q"), Platform::Secondary)
            .is_empty()
    );
    assert!(
        registry
            .resolve_by_chord(&chord("Command-Q"), Platform::Secondary)
            .is_empty()
    );
    assert_eq!(
        registry
            .resolve_by_chord(&chord("Ctrl-Q"), Platform::Primary)
            .len(),
        1
    );
}

#[test]
fn test_same_command_bound_per_platform() {
    let registry = default_registry();
    let undo = registry.lookup("undo").unwrap();

    assert!(undo.binding().matches(&chord("Ctrl-Z"), Platform::Primary));
    assert!(undo.binding().matches(&chord("Command-Z"), Platform::Secondary));
    assert!(!undo.binding().matches(&chord("Command-Z"), Platform::Primary));
}

#[test]
fn test_any_alternative_triggers_command() {
    let mut engine = engine_on(Platform::Secondary);

    for key in ["Command-Right", "End", "Ctrl-E"] {
        let mut editor = MemoryEditor::new("hello");
        let outcome = engine.handle_chord(&chord(key), &mut editor).unwrap();
        assert_eq!(outcome, KeyDispatch::Consumed(ExecutionResult::Handled), "{key}");
        assert_eq!(editor.cursor_position(), Position::new(0, 5), "{key}");
    }
}

#[test]
fn test_unbound_chord_reports_no_binding() {
    let mut engine = engine_on(Platform::Primary);
    let mut editor = MemoryEditor::new("abc");

    let outcome = engine
        .handle_chord(&chord("Ctrl-Alt-Shift-F12"), &mut editor)
        .unwrap();
    assert_eq!(outcome, KeyDispatch::NoBinding);
    assert!(editor.events().is_empty());
}

#[test]
fn test_newest_candidate_is_tried_first_and_may_decline() {
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::default();
    let mut registry = CommandRegistry::new();
    for (name, outcome) in [
        ("older", HandlerOutcome::Handled),
        ("newer", HandlerOutcome::NotHandled),
    ] {
        let order = order.clone();
        registry.register(
            CommandDescriptor::new(name, move |_, _| {
                order.lock().unwrap().push(name);
                Ok(outcome)
            })
            .bind(BindingSpec::shared("Ctrl-K")),
        );
    }
    let mut engine = CommandEngine::new(
        registry,
        EngineConfig::default().with_platform(Platform::Primary),
    );
    let mut editor = MemoryEditor::new("");

    let outcome = engine.handle_chord(&chord("Ctrl-K"), &mut editor).unwrap();
    assert_eq!(outcome, KeyDispatch::Consumed(ExecutionResult::Handled));
    assert_eq!(*order.lock().unwrap(), vec!["newer", "older"]);
}

#[test]
fn test_cut_or_delete_falls_through_with_selection() {
    let mut engine = engine_on(Platform::Primary);
    let shift_delete = chord("Shift-Delete");

    let mut selected = MemoryEditor::new("hello")
        .with_selections([SelectionRange::from_coords((0, 1), (0, 3))]);
    let outcome = engine.handle_chord(&shift_delete, &mut selected).unwrap();
    assert_eq!(outcome, KeyDispatch::Forward);
    assert_eq!(selected.text(), "hello");

    let mut caret = MemoryEditor::new("hello").with_cursor(Position::new(0, 3));
    let outcome = engine.handle_chord(&shift_delete, &mut caret).unwrap();
    assert_eq!(outcome, KeyDispatch::Consumed(ExecutionResult::Handled));
    assert_eq!(caret.text(), "helo");
    assert_eq!(caret.cursor_position(), Position::new(0, 2));
}

#[test]
fn test_pass_keys_to_browser_forwards_after_running() {
    let mut engine = engine_on(Platform::Primary);
    let rebound = (*engine.registry().lookup("passKeysToBrowser").unwrap())
        .clone()
        .bind(BindingSpec::shared("Ctrl-Alt-B"));
    engine.registry_mut().register(rebound);

    let mut editor = MemoryEditor::new("abc").with_read_only(true);
    let outcome = engine
        .handle_chord(&chord("Ctrl-Alt-B"), &mut editor)
        .unwrap();

    assert_eq!(outcome, KeyDispatch::Forward);
    assert_eq!(editor.event_names(), vec!["exec", "afterExec"]);
    assert_eq!(editor.text(), "abc");
}

#[test]
fn test_rejected_chord_is_consumed() {
    let mut engine = engine_on(Platform::Primary);
    let mut editor = MemoryEditor::new("abc").with_read_only(true);

    let outcome = engine.handle_chord(&chord("Ctrl-D"), &mut editor).unwrap();
    assert_eq!(
        outcome,
        KeyDispatch::Consumed(ExecutionResult::Rejected(RejectReason::ReadOnly))
    );
    assert_eq!(editor.text(), "abc");
}

#[test]
fn test_multi_stroke_sequence_dispatch() {
    let mut registry = default_registry();
    registry.register(
        CommandDescriptor::new("upperWord", |ctx, _| {
            ctx.host.perform(Capability::ToUpperCase)?;
            Ok(HandlerOutcome::Handled)
        })
        .bind(BindingSpec::shared("Ctrl-K Ctrl-U"))
        .fan_out(FanOutPolicy::PerSelection),
    );
    let mut engine = CommandEngine::new(
        registry,
        EngineConfig::default().with_platform(Platform::Primary),
    );
    let mut editor = MemoryEditor::new("make loud")
        .with_selections([SelectionRange::from_coords((0, 5), (0, 9))]);

    let sequence: KeySequence = "Ctrl-K Ctrl-U".parse().unwrap();
    let outcome = engine.handle_sequence(&sequence, &mut editor).unwrap();

    assert_eq!(outcome, KeyDispatch::Consumed(ExecutionResult::Handled));
    assert_eq!(editor.text(), "make LOUD");
}
