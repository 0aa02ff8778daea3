//! Execution Engine
//!
//! [`CommandEngine`] owns a [`CommandRegistry`] and an [`EngineConfig`] and runs commands
//! against an [`EditorHost`]. Each request walks the same state machine:
//!
//! ```text
//! Idle -> Gating -> Dispatching -> PostScroll -> Idle
//! ```
//!
//! - **Gating**: a read-only editor rejects commands that are not `read_only_allowed`; no handler
//!   runs and the request returns [`ExecutionResult::Rejected`].
//! - **Dispatching**: the handler fans out over the selection set (see [`crate::dispatch`]). The
//!   first failing iteration aborts the rest and surfaces as [`ExecuteError::HandlerFailure`].
//! - **PostScroll**: the descriptor's [`ScrollPolicy`] is signaled once per request, and only if
//!   at least one invocation accepted it. A fan-out aborted by a failure still scrolls when an
//!   earlier iteration succeeded.
//!
//! Every path, including failures, leaves the engine back in [`EngineState::Idle`].
//!
//! # Example
//!
//! ```rust
//! use editor_commands::{CommandEngine, ExecutionResult, MemoryEditor, Position};
//!
//! let mut engine = CommandEngine::with_defaults();
//! let mut editor = MemoryEditor::new("  foo\nbar  \nbaz");
//!
//! let result = engine.execute("joinlines", None, &mut editor).unwrap();
//! assert_eq!(result, ExecutionResult::Handled);
//! assert_eq!(editor.text(), "  foo bar\nbaz");
//! assert_eq!(editor.cursor_position(), Position::new(0, 6));
//! ```

use crate::builtins::default_registry;
use crate::chord::{Chord, KeySequence};
use crate::config::EngineConfig;
use crate::descriptor::{CommandArg, CommandDescriptor, HandlerError, ScrollPolicy};
use crate::dispatch::{DispatchFailure, dispatch};
use crate::host::{EditorHost, EventPayload};
use crate::registry::{CommandRegistry, RegistryError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Where the engine is in processing a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    /// No request in flight.
    #[default]
    Idle,
    /// Checking read-only permission.
    Gating,
    /// Running the handler.
    Dispatching,
    /// Signaling the scroll policy.
    PostScroll,
}

/// Why a request was refused without running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// The editor is read-only and the command is not allowed there.
    ReadOnly,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => f.write_str("editor is read-only"),
        }
    }
}

/// Outcome of a request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionResult {
    /// At least one invocation accepted the request.
    Handled,
    /// Every invocation declined the request.
    Unhandled,
    /// The request was refused before any handler ran.
    Rejected(RejectReason),
}

/// Errors returned by [`CommandEngine::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    /// No command with the requested name.
    #[error(transparent)]
    UnknownCommand(#[from] RegistryError),
    /// A handler failed; later iterations did not run.
    #[error("command `{command}` failed on iteration {index}: {source}")]
    HandlerFailure {
        /// Name of the failing command.
        command: String,
        /// Index of the failing iteration.
        index: usize,
        /// Iterations that completed before the failure.
        completed: usize,
        /// The handler error.
        #[source]
        source: HandlerError,
    },
}

/// A command to execute: a registered name, or a descriptor passed directly.
#[derive(Debug, Clone)]
pub enum CommandRef<'a> {
    /// Look the command up in the engine's registry.
    Name(&'a str),
    /// Run this descriptor without consulting the registry.
    Descriptor(Arc<CommandDescriptor>),
}

impl<'a> From<&'a str> for CommandRef<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for CommandRef<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl From<Arc<CommandDescriptor>> for CommandRef<'_> {
    fn from(descriptor: Arc<CommandDescriptor>) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<CommandDescriptor> for CommandRef<'_> {
    fn from(descriptor: CommandDescriptor) -> Self {
        Self::Descriptor(Arc::new(descriptor))
    }
}

/// What happened to a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDispatch {
    /// A bound command took the key.
    Consumed(ExecutionResult),
    /// The key should continue to the host environment.
    Forward,
    /// Nothing is bound to the key on the configured platform.
    NoBinding,
}

/// Runs registered commands against an editor.
#[derive(Debug)]
pub struct CommandEngine {
    registry: CommandRegistry,
    config: EngineConfig,
    state: EngineState,
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl CommandEngine {
    /// Create an engine over an explicit registry.
    pub fn new(registry: CommandRegistry, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            state: EngineState::Idle,
        }
    }

    /// An engine with the builtin command set and the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(default_registry(), EngineConfig::default())
    }

    /// The command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Mutable access for registering or replacing commands.
    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    /// The configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Current state. Always [`EngineState::Idle`] between requests.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run one command request.
    ///
    /// Rejection and "not handled" are results, not errors. Errors are reserved for unknown
    /// names and handler failures; in both cases the registry is untouched and the engine is
    /// left idle.
    pub fn execute<'a>(
        &mut self,
        command: impl Into<CommandRef<'a>>,
        arg: Option<&CommandArg>,
        host: &mut dyn EditorHost,
    ) -> Result<ExecutionResult, ExecuteError> {
        let descriptor = match command.into() {
            CommandRef::Name(name) => self.registry.lookup(name)?,
            CommandRef::Descriptor(descriptor) => descriptor,
        };

        let result = self.run(&descriptor, arg, host);
        self.transition(EngineState::Idle);

        match &result {
            Ok(outcome) => {
                tracing::debug!(command = descriptor.name(), ?outcome, "command finished")
            }
            Err(error) => tracing::debug!(command = descriptor.name(), %error, "command failed"),
        }
        result
    }

    /// Resolve a single-stroke chord and run the bound command.
    ///
    /// Candidates are tried newest-registered first until one does not decline. Passthrough
    /// commands run and then report [`KeyDispatch::Forward`]; so does a key every candidate
    /// declined.
    pub fn handle_chord(
        &mut self,
        chord: &Chord,
        host: &mut dyn EditorHost,
    ) -> Result<KeyDispatch, ExecuteError> {
        let candidates = self.registry.resolve_by_chord(chord, self.config.platform);
        tracing::trace!(%chord, candidates = candidates.len(), "resolving chord");
        self.try_candidates(candidates, host)
    }

    /// Resolve a (possibly multi-stroke) key sequence and run the bound command.
    pub fn handle_sequence(
        &mut self,
        sequence: &KeySequence,
        host: &mut dyn EditorHost,
    ) -> Result<KeyDispatch, ExecuteError> {
        let candidates = self.registry.resolve_sequence(sequence, self.config.platform);
        tracing::trace!(%sequence, candidates = candidates.len(), "resolving key sequence");
        self.try_candidates(candidates, host)
    }

    fn try_candidates(
        &mut self,
        candidates: Vec<Arc<CommandDescriptor>>,
        host: &mut dyn EditorHost,
    ) -> Result<KeyDispatch, ExecuteError> {
        if candidates.is_empty() {
            return Ok(KeyDispatch::NoBinding);
        }

        for descriptor in candidates.into_iter().rev() {
            let passthrough = descriptor.is_passthrough();
            let result = self.execute(descriptor, None, host)?;
            if passthrough {
                return Ok(KeyDispatch::Forward);
            }
            if result != ExecutionResult::Unhandled {
                return Ok(KeyDispatch::Consumed(result));
            }
        }
        Ok(KeyDispatch::Forward)
    }

    fn run(
        &mut self,
        descriptor: &CommandDescriptor,
        arg: Option<&CommandArg>,
        host: &mut dyn EditorHost,
    ) -> Result<ExecutionResult, ExecuteError> {
        let name = descriptor.name();

        self.transition(EngineState::Gating);
        if host.is_read_only() && !descriptor.read_only_allowed() {
            tracing::debug!(command = name, "rejected in read-only mode");
            return Ok(ExecutionResult::Rejected(RejectReason::ReadOnly));
        }

        if self.config.emit_exec_events {
            host.emit(
                "exec",
                EventPayload::Command {
                    name: name.to_string(),
                },
            );
        }

        self.transition(EngineState::Dispatching);
        let (report, failure) = match dispatch(descriptor, host, &self.config, arg) {
            Ok(report) => (report, None),
            Err(failure) => (failure.completed, Some(failure)),
        };

        // A partially completed fan-out still scrolls to what it did.
        self.transition(EngineState::PostScroll);
        let scroll = descriptor.scroll_policy();
        if report.succeeded() && scroll != ScrollPolicy::None {
            host.scroll_into_view(scroll);
        }

        if let Some(DispatchFailure {
            completed,
            index,
            error,
        }) = failure
        {
            return Err(ExecuteError::HandlerFailure {
                command: name.to_string(),
                index,
                completed: completed.invocations,
                source: error,
            });
        }

        if self.config.emit_exec_events {
            host.emit(
                "afterExec",
                EventPayload::Command {
                    name: name.to_string(),
                },
            );
        }

        Ok(if report.succeeded() {
            ExecutionResult::Handled
        } else {
            ExecutionResult::Unhandled
        })
    }

    fn transition(&mut self, next: EngineState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "engine state");
            self.state = next;
        }
    }
}
