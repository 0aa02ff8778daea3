//! Command descriptors.
//!
//! A [`CommandDescriptor`] is the immutable, registered form of one named command: metadata,
//! bindings, a handler, and the policies the engine applies around it.
//!
//! # Example
//!
//! ```rust
//! use editor_commands::{
//!     BindingSpec, Capability, CommandDescriptor, FanOutPolicy, HandlerOutcome, ScrollPolicy,
//! };
//!
//! let upper = CommandDescriptor::new("touppercase", |ctx, _arg| {
//!     ctx.host.perform(Capability::ToUpperCase)?;
//!     Ok(HandlerOutcome::Handled)
//! })
//! .description("commands.touppercase", "To uppercase")
//! .bind(BindingSpec::shared("Ctrl-U"))
//! .fan_out(FanOutPolicy::PerSelection)
//! .scroll(ScrollPolicy::Cursor);
//!
//! assert_eq!(upper.name(), "touppercase");
//! assert!(!upper.read_only_allowed());
//! ```

use crate::chord::{BindingSpec, MalformedBindingError, ResolvedBinding};
use crate::config::EngineConfig;
use crate::host::{EditorHost, HostError};
use crate::selection::SelectionRange;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result of one handler invocation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The command did its work.
    Handled,
    /// The command declined; the caller may fall through to another command.
    NotHandled,
    /// The command accepted the request but had nothing to do.
    NoOp,
}

/// Errors raised by a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// A host call failed.
    #[error(transparent)]
    Host(#[from] HostError),
    /// The argument passed to the command has the wrong shape.
    #[error("invalid argument: expected {expected}")]
    InvalidArgument {
        /// Description of the expected argument.
        expected: &'static str,
    },
    /// Any other handler failure.
    #[error("{0}")]
    Failed(String),
}

/// What a handler returns.
pub type HandlerResult = Result<HandlerOutcome, HandlerError>;

/// Argument passed alongside a command request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandArg {
    /// Plain text (insert, paste).
    Text(String),
    /// A number (go to line).
    Number(i64),
    /// Repeat count for a motion.
    Times(usize),
    /// Text repeated `times` times.
    Repeat {
        /// Text to repeat.
        text: String,
        /// Repeat count.
        times: usize,
    },
}

impl CommandArg {
    /// Repeat count carried by `arg`, defaulting to 1.
    pub fn times(arg: Option<&CommandArg>) -> usize {
        match arg {
            Some(CommandArg::Times(n)) | Some(CommandArg::Repeat { times: n, .. }) => (*n).max(1),
            _ => 1,
        }
    }

    /// Text carried by `arg`, if any.
    pub fn text(arg: Option<&CommandArg>) -> Option<&str> {
        match arg {
            Some(CommandArg::Text(text)) | Some(CommandArg::Repeat { text, .. }) => {
                Some(text.as_str())
            }
            _ => None,
        }
    }
}

/// What part of the selection set the current invocation is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The whole editor (`Single` and `Custom` fan-out).
    Editor,
    /// One range of the selection set (`PerSelection`).
    Selection {
        /// Index in the pre-dispatch snapshot.
        index: usize,
        /// The range as reported by the host when the scope was entered.
        range: SelectionRange,
    },
    /// One logical line (`PerAffectedLine`).
    Line(usize),
}

/// Everything a handler can reach during one invocation.
pub struct CommandContext<'a> {
    /// The embedding editor.
    pub host: &'a mut dyn EditorHost,
    /// The scope of this invocation.
    pub scope: Scope,
    /// Engine configuration.
    pub config: &'a EngineConfig,
    /// Name of the command being executed.
    pub command: &'a str,
}

/// Boxed command handler.
pub type CommandHandler =
    Arc<dyn Fn(&mut CommandContext<'_>, Option<&CommandArg>) -> HandlerResult + Send + Sync>;

/// Boxed fan-out function for [`FanOutPolicy::Custom`].
pub type CustomFanOut = Arc<
    dyn Fn(&mut CommandContext<'_>, &[SelectionRange], Option<&CommandArg>) -> HandlerResult
        + Send
        + Sync,
>;

/// How a handler is applied when several selections exist.
#[derive(Clone, Default)]
pub enum FanOutPolicy {
    /// Run once with the whole editor in scope.
    #[default]
    Single,
    /// Run once per selection range, in document order.
    PerSelection,
    /// Run once per distinct line covered by any range, in line order.
    PerAffectedLine,
    /// Hand the full selection set to a custom function that owns the iteration.
    Custom(CustomFanOut),
}

impl FanOutPolicy {
    /// Build a [`FanOutPolicy::Custom`] from a closure.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, &[SelectionRange], Option<&CommandArg>) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::PerSelection => "PerSelection",
            Self::PerAffectedLine => "PerAffectedLine",
            Self::Custom(_) => "Custom",
        }
    }
}

impl fmt::Debug for FanOutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl PartialEq for FanOutPolicy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            (a, b) => a.label() == b.label(),
        }
    }
}

/// How the viewport follows the result of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScrollPolicy {
    /// Leave the viewport alone.
    #[default]
    None,
    /// Keep the cursor visible.
    Cursor,
    /// Center the cursor.
    Center,
    /// Scroll with animation.
    Animate,
    /// Keep the whole selection visible.
    Selection,
    /// Keep the active end of the selection visible.
    SelectionPart,
}

/// Opaque description: a lookup key plus fallback text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// Lookup key for an external string table.
    pub key: Cow<'static, str>,
    /// Text used when no translation is available.
    pub text: Cow<'static, str>,
}

/// The immutable registered form of one command.
///
/// Built with [`CommandDescriptor::new`] and the chained setters; once handed to the
/// [`CommandRegistry`](crate::CommandRegistry) it is shared behind an `Arc` and never mutated.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: Cow<'static, str>,
    description: Option<Description>,
    binding_spec: Option<BindingSpec>,
    binding: ResolvedBinding,
    binding_errors: Vec<MalformedBindingError>,
    handler: CommandHandler,
    fan_out: FanOutPolicy,
    scroll: ScrollPolicy,
    read_only_allowed: bool,
    passthrough: bool,
    group: Option<Cow<'static, str>>,
}

impl CommandDescriptor {
    /// Create a descriptor with default policies: no binding, `Single` fan-out, no scroll,
    /// blocked in read-only mode.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, handler: F) -> Self
    where
        F: Fn(&mut CommandContext<'_>, Option<&CommandArg>) -> HandlerResult
            + Send
            + Sync
            + 'static,
    {
        Self::with_handler(name, Arc::new(handler))
    }

    /// Create a descriptor around an already shared handler.
    pub fn with_handler(name: impl Into<Cow<'static, str>>, handler: CommandHandler) -> Self {
        Self {
            name: name.into(),
            description: None,
            binding_spec: None,
            binding: ResolvedBinding::default(),
            binding_errors: Vec::new(),
            handler,
            fan_out: FanOutPolicy::Single,
            scroll: ScrollPolicy::None,
            read_only_allowed: false,
            passthrough: false,
            group: None,
        }
    }

    /// Set the description lookup key and fallback text.
    pub fn description(
        mut self,
        key: impl Into<Cow<'static, str>>,
        text: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.description = Some(Description {
            key: key.into(),
            text: text.into(),
        });
        self
    }

    /// Set and parse the key binding.
    ///
    /// Malformed platform forms leave that platform unbound; the errors are kept on the
    /// descriptor and reported by the registry on registration.
    pub fn bind(mut self, spec: BindingSpec) -> Self {
        let (binding, errors) = spec.resolve();
        self.binding = binding;
        self.binding_errors = errors;
        self.binding_spec = Some(spec);
        self
    }

    /// Set the fan-out policy.
    pub fn fan_out(mut self, policy: FanOutPolicy) -> Self {
        self.fan_out = policy;
        self
    }

    /// Set the scroll policy.
    pub fn scroll(mut self, policy: ScrollPolicy) -> Self {
        self.scroll = policy;
        self
    }

    /// Allow or forbid the command in read-only mode.
    pub fn read_only(mut self, allowed: bool) -> Self {
        self.read_only_allowed = allowed;
        self
    }

    /// Forward the key event to the host environment instead of consuming it.
    pub fn passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }

    /// Set the menu/palette group tag.
    pub fn group(mut self, group: impl Into<Cow<'static, str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Unique command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description, if any.
    pub fn describe(&self) -> Option<&Description> {
        self.description.as_ref()
    }

    /// The binding as declared.
    pub fn binding_spec(&self) -> Option<&BindingSpec> {
        self.binding_spec.as_ref()
    }

    /// The parsed binding.
    pub fn binding(&self) -> &ResolvedBinding {
        &self.binding
    }

    /// Problems found while parsing the binding.
    pub fn binding_errors(&self) -> &[MalformedBindingError] {
        &self.binding_errors
    }

    /// The handler.
    pub fn handler(&self) -> &CommandHandler {
        &self.handler
    }

    /// Fan-out policy.
    pub fn fan_out_policy(&self) -> &FanOutPolicy {
        &self.fan_out
    }

    /// Scroll policy.
    pub fn scroll_policy(&self) -> ScrollPolicy {
        self.scroll
    }

    /// Whether the command may run in read-only mode.
    pub fn read_only_allowed(&self) -> bool {
        self.read_only_allowed
    }

    /// Whether the triggering key event is forwarded.
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    /// Group tag, if any.
    pub fn group_tag(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("binding", &self.binding)
            .field("fan_out", &self.fan_out)
            .field("scroll", &self.scroll)
            .field("read_only_allowed", &self.read_only_allowed)
            .field("passthrough", &self.passthrough)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}
