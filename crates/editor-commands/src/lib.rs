#![warn(missing_docs)]
//! Editor Commands - Command Dispatch Core for Headless Editor Widgets
//!
//! # Overview
//!
//! `editor-commands` is the command layer of an embeddable text editor. It maps named editing
//! operations to cross-platform keyboard chords, and decides how an operation runs when the
//! editor holds several independent cursors or selections. It does not own a document, a
//! selection model or a renderer: those live in the embedding editor and are reached through
//! the [`EditorHost`] capability trait.
//!
//! # Core Features
//!
//! - **Chord Table**: `Ctrl-Shift-K` style binding specs parsed into structured chords, with
//!   primary (Ctrl) and secondary (Command) platform profiles
//! - **Command Registry**: declarative descriptors in a name-keyed arena with stable order and
//!   atomic replacement
//! - **Multi-Cursor Dispatch**: `Single`, `PerSelection`, `PerAffectedLine` and custom fan-out
//! - **Execution Engine**: read-only gating, fail-fast dispatch, one scroll signal per request
//! - **Structural Transforms**: line join with selection preservation, selection inversion
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Execution Engine (CommandEngine)           │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Multi-Cursor Dispatcher (fan-out)          │  ← Iteration
//! ├─────────────────────────────────────────────┤
//! │  Command Registry + Builtin Table           │  ← Command Data
//! ├─────────────────────────────────────────────┤
//! │  Key Chord Table                            │  ← Bindings
//! └─────────────────────────────────────────────┘
//!              │ EditorHost
//!              ▼
//!    document · selections · viewport · events
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_commands::{
//!     Chord, CommandEngine, EngineConfig, ExecutionResult, KeyDispatch, MemoryEditor, Platform,
//!     Position, SelectionRange,
//! };
//!
//! let config = EngineConfig::default().with_platform(Platform::Primary);
//! let mut engine = CommandEngine::new(editor_commands::default_registry(), config);
//!
//! let mut editor = MemoryEditor::new("alpha\nbeta\ngamma").with_selections([
//!     SelectionRange::cursor(Position::new(0, 0)),
//!     SelectionRange::cursor(Position::new(2, 0)),
//! ]);
//!
//! // One key press, two cursors: `gotolineend` runs once per selection.
//! let end: Chord = "End".parse().unwrap();
//! let outcome = engine.handle_chord(&end, &mut editor).unwrap();
//! assert_eq!(outcome, KeyDispatch::Consumed(ExecutionResult::Handled));
//! assert_eq!(
//!     editor.selection_ranges(),
//!     vec![
//!         SelectionRange::cursor(Position::new(0, 5)),
//!         SelectionRange::cursor(Position::new(2, 5)),
//!     ]
//! );
//! ```
//!
//! # Module Description
//!
//! - [`chord`] - Key chords, platform profiles, binding specs
//! - [`descriptor`] - Command descriptors and handler types
//! - [`registry`] - Name-keyed command registry
//! - [`dispatch`] - Fan-out planning and execution
//! - [`engine`] - Gating, dispatch and scroll signaling
//! - [`host`] - The capability interface to the embedding editor
//! - [`transforms`] - Line join and selection inversion
//! - [`builtins`] - The default command table
//! - [`memory`] - In-memory reference host
//! - [`config`] - Engine configuration

pub mod builtins;
pub mod chord;
pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod engine;
pub mod host;
pub mod line_ending;
pub mod memory;
pub mod registry;
pub mod selection;
pub mod transforms;

pub use builtins::{FILE_JUMP_GROUP, default_commands, default_registry, fold_to_level_commands};
pub use chord::{
    BindingSpec, Chord, ChordParseError, Key, KeySequence, MalformedBindingError, Modifiers,
    NamedKey, Platform, ResolvedBinding,
};
pub use config::{ConfigError, EngineConfig};
pub use descriptor::{
    CommandArg, CommandContext, CommandDescriptor, CommandHandler, CustomFanOut, Description,
    FanOutPolicy, HandlerError, HandlerOutcome, HandlerResult, Scope, ScrollPolicy,
};
pub use dispatch::{DispatchFailure, DispatchReport, FanOutPlan, dispatch, plan_fan_out};
pub use engine::{
    CommandEngine, CommandRef, EngineState, ExecuteError, ExecutionResult, KeyDispatch,
    RejectReason,
};
pub use host::{Capability, Direction, EditorHost, EventPayload, HostError, Motion, Prompt};
pub use line_ending::LineEnding;
pub use memory::MemoryEditor;
pub use registry::{CommandRegistry, RegistryError};
pub use selection::{Position, SelectionRange, normalize_ranges};
pub use transforms::{invert_ranges, invert_selection, join_lines};
