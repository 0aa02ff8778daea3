//! Host capability interface.
//!
//! The dispatch core owns no document, selection model, renderer or editor subsystem. Everything
//! it needs from the embedding editor goes through [`EditorHost`]:
//!
//! - **Selection**: query/mutate the selection set and the active range
//! - **Document**: line access, range text, replacement, newline terminator
//! - **Viewport**: apply a [`ScrollPolicy`]
//! - **Mode**: read-only query
//! - **Events**: emit named events with a payload
//! - **Capabilities**: subsystems addressed by name ([`Capability`])
//!
//! [`MemoryEditor`](crate::MemoryEditor) is an in-memory implementation used by the tests.

use crate::descriptor::ScrollPolicy;
use crate::line_ending::LineEnding;
use crate::selection::{Position, SelectionRange};
use thiserror::Error;

/// Errors a host collaborator can report back to a handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host does not implement this capability.
    #[error("capability `{0}` is not supported by this editor")]
    Unsupported(&'static str),
    /// A position does not exist in the document.
    #[error("invalid position: line {line}, column {column}")]
    InvalidPosition {
        /// Logical line index.
        line: usize,
        /// Column in characters.
        column: usize,
    },
    /// Any other host-side failure.
    #[error("{0}")]
    Other(String),
}

/// Cursor motions understood by [`Capability::Move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    /// One character left.
    Left,
    /// One character right.
    Right,
    /// One line up.
    Up,
    /// One line down.
    Down,
    /// Previous word boundary.
    WordLeft,
    /// Next word boundary.
    WordRight,
    /// Start of the line.
    LineStart,
    /// End of the line.
    LineEnd,
    /// One page up.
    PageUp,
    /// One page down.
    PageDown,
    /// Start of the document.
    FileStart,
    /// End of the document.
    FileEnd,
}

/// Horizontal direction for deletions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the document start.
    Left,
    /// Towards the document end.
    Right,
}

/// Prompts the host can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    /// Go-to-line prompt.
    GotoLine,
    /// Command palette.
    Commands,
    /// Language mode picker.
    Modes,
}

/// An editor subsystem operation, invoked by name.
///
/// The core only sequences these calls; what they do is entirely up to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Open the settings menu.
    ShowSettingsMenu,
    /// Jump to the next (`forward`) or previous diagnostic marker.
    ShowErrorMarker {
        /// Search direction.
        forward: bool,
    },
    /// Select the whole document.
    SelectAll,
    /// Center the viewport on the selection.
    CenterSelection,
    /// Move the cursor to a 1-based line number.
    GotoLine(usize),
    /// Open a prompt.
    Prompt(Prompt),
    /// Toggle the fold at the cursor.
    ToggleFold {
        /// Prefer unfolding when the fold state is mixed.
        try_to_unfold: bool,
    },
    /// Toggle the fold widget at the cursor line (or its parent).
    ToggleFoldWidget {
        /// Act on the enclosing fold instead.
        parent: bool,
    },
    /// Fold every foldable region.
    FoldAll,
    /// Fold every comment block.
    FoldAllComments,
    /// Unfold regions intersecting these ranges.
    Unfold(Vec<SelectionRange>),
    /// Unfold everything.
    UnfoldAll,
    /// Fold everything deeper than `level`.
    FoldToLevel(u8),
    /// Find the next (or previous) match of the current search.
    Find {
        /// Search backwards.
        backwards: bool,
    },
    /// Select the word under the cursor.
    SelectWord,
    /// Open the search box.
    OpenSearchBox {
        /// Open it in replace mode.
        replace: bool,
    },
    /// Toggle overwrite mode.
    ToggleOverwrite,
    /// Move the cursor, optionally extending the selection.
    Move {
        /// Motion to apply.
        motion: Motion,
        /// Extend the selection instead of collapsing it.
        select: bool,
        /// Repeat count.
        times: usize,
    },
    /// Scroll the viewport by a page without moving the cursor.
    ScrollPage {
        /// Scroll towards the document end.
        down: bool,
    },
    /// Scroll the viewport by a number of lines.
    ScrollLines(isize),
    /// Start or stop macro recording.
    ToggleRecording,
    /// Replay the recorded macro.
    ReplayMacro,
    /// Jump to the matching bracket.
    JumpToMatching {
        /// Extend the selection to the match.
        select: bool,
        /// Expand to include the brackets.
        expand: bool,
    },
    /// Paste clipboard text.
    Paste(String),
    /// Remove the lines touched by the active range.
    RemoveLines,
    /// Duplicate the selection (or line).
    DuplicateSelection,
    /// Sort the selected lines.
    SortLines,
    /// Toggle line comments.
    ToggleCommentLines,
    /// Toggle a block comment around the selection.
    ToggleBlockComment,
    /// Add `delta` to the number under the cursor.
    ModifyNumber(i64),
    /// Undo.
    Undo,
    /// Redo.
    Redo,
    /// Copy the selected lines up or down.
    CopyLines {
        /// Copy below instead of above.
        down: bool,
    },
    /// Move the selected lines up or down.
    MoveLines {
        /// Move down instead of up.
        down: bool,
    },
    /// Delete the selection, or one character in `Direction`.
    Remove(Direction),
    /// Delete up to the line start.
    RemoveToLineStart,
    /// Delete up to the line end.
    RemoveToLineEnd,
    /// Delete one word in `Direction`.
    RemoveWord(Direction),
    /// Indent the active range.
    Indent,
    /// Indent the lines of the active range.
    BlockIndent,
    /// Outdent the lines of the active range.
    BlockOutdent,
    /// Insert text at the cursor, replacing the active range.
    Insert(String),
    /// Split the line at the cursor, keeping the cursor in place.
    SplitLine,
    /// Swap the characters around the cursor.
    TransposeLetters,
    /// Rotate the selected texts between selections.
    TransposeSelections(isize),
    /// Upper-case the active range.
    ToUpperCase,
    /// Lower-case the active range.
    ToLowerCase,
    /// Re-indent the active range.
    AutoIndent,
    /// Open the link under the cursor.
    OpenLink,
}

impl Capability {
    /// Stable name of the capability, for logs and [`HostError::Unsupported`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShowSettingsMenu => "show_settings_menu",
            Self::ShowErrorMarker { .. } => "show_error_marker",
            Self::SelectAll => "select_all",
            Self::CenterSelection => "center_selection",
            Self::GotoLine(_) => "goto_line",
            Self::Prompt(_) => "prompt",
            Self::ToggleFold { .. } => "toggle_fold",
            Self::ToggleFoldWidget { .. } => "toggle_fold_widget",
            Self::FoldAll => "fold_all",
            Self::FoldAllComments => "fold_all_comments",
            Self::Unfold(_) => "unfold",
            Self::UnfoldAll => "unfold_all",
            Self::FoldToLevel(_) => "fold_to_level",
            Self::Find { .. } => "find",
            Self::SelectWord => "select_word",
            Self::OpenSearchBox { .. } => "open_search_box",
            Self::ToggleOverwrite => "toggle_overwrite",
            Self::Move { .. } => "move",
            Self::ScrollPage { .. } => "scroll_page",
            Self::ScrollLines(_) => "scroll_lines",
            Self::ToggleRecording => "toggle_recording",
            Self::ReplayMacro => "replay_macro",
            Self::JumpToMatching { .. } => "jump_to_matching",
            Self::Paste(_) => "paste",
            Self::RemoveLines => "remove_lines",
            Self::DuplicateSelection => "duplicate_selection",
            Self::SortLines => "sort_lines",
            Self::ToggleCommentLines => "toggle_comment_lines",
            Self::ToggleBlockComment => "toggle_block_comment",
            Self::ModifyNumber(_) => "modify_number",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::CopyLines { .. } => "copy_lines",
            Self::MoveLines { .. } => "move_lines",
            Self::Remove(_) => "remove",
            Self::RemoveToLineStart => "remove_to_line_start",
            Self::RemoveToLineEnd => "remove_to_line_end",
            Self::RemoveWord(_) => "remove_word",
            Self::Indent => "indent",
            Self::BlockIndent => "block_indent",
            Self::BlockOutdent => "block_outdent",
            Self::Insert(_) => "insert",
            Self::SplitLine => "split_line",
            Self::TransposeLetters => "transpose_letters",
            Self::TransposeSelections(_) => "transpose_selections",
            Self::ToUpperCase => "to_upper_case",
            Self::ToLowerCase => "to_lower_case",
            Self::AutoIndent => "auto_indent",
            Self::OpenLink => "open_link",
        }
    }
}

/// Payload attached to an emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// No payload.
    None,
    /// A document range (e.g. the range about to be cut).
    Range(SelectionRange),
    /// The command a lifecycle event refers to.
    Command {
        /// Command name.
        name: String,
    },
}

/// Everything the dispatch core needs from the embedding editor.
///
/// The trait is object safe; handlers receive it as `&mut dyn EditorHost`.
///
/// # Selection scopes
///
/// During `PerSelection` and `PerAffectedLine` fan-out the dispatcher narrows the host's notion of
/// the *active range* with [`enter_selection_scope`](EditorHost::enter_selection_scope) or
/// [`enter_line_scope`](EditorHost::enter_line_scope), invokes the handler, and finally calls
/// [`exit_scope`](EditorHost::exit_scope). While a scope is active, [`selection_range`],
/// [`cursor`], [`move_cursor_to`], [`select_to`] and [`clear_selection`] act on that one range.
/// Hosts are responsible for shifting the remaining ranges when a handler edits the document.
///
/// [`selection_range`]: EditorHost::selection_range
/// [`cursor`]: EditorHost::cursor
/// [`move_cursor_to`]: EditorHost::move_cursor_to
/// [`select_to`]: EditorHost::select_to
/// [`clear_selection`]: EditorHost::clear_selection
pub trait EditorHost {
    // Selection

    /// Snapshot of the selection set, in ascending non-overlapping order.
    ///
    /// May be empty; callers then fall back to [`cursor`](EditorHost::cursor).
    fn selections(&self) -> Vec<SelectionRange>;

    /// The active range.
    fn selection_range(&self) -> SelectionRange;

    /// Replace the active range.
    fn set_selection_range(&mut self, range: SelectionRange);

    /// Add an independent selection.
    ///
    /// A lone empty cursor that was not placed with [`set_selection_range`] or `add_selection`
    /// is replaced rather than kept.
    ///
    /// [`set_selection_range`]: EditorHost::set_selection_range
    fn add_selection(&mut self, range: SelectionRange);

    /// Collapse the active range to its cursor.
    fn clear_selection(&mut self);

    /// Drop every selection except the active one.
    fn exit_multi_select(&mut self);

    /// The cursor (lead) of the active range.
    fn cursor(&self) -> Position;

    /// Collapse the active range at `position`.
    fn move_cursor_to(&mut self, position: Position);

    /// Extend the active range from its anchor to `position`.
    fn select_to(&mut self, position: Position);

    /// Whether the active range is a cursor.
    fn is_selection_empty(&self) -> bool {
        self.selection_range().is_empty()
    }

    /// Make the `index`-th range of the current set the active range.
    ///
    /// Returns the range as it is *now*, after any shifts caused by earlier edits, or `None` if
    /// the index no longer exists.
    fn enter_selection_scope(&mut self, index: usize) -> Option<SelectionRange>;

    /// Make a cursor at the start of `line` the active range.
    fn enter_line_scope(&mut self, line: usize);

    /// Leave the current scope and restore (and re-normalize) the full selection set.
    fn exit_scope(&mut self);

    // Document

    /// Text of a logical line without its terminator.
    fn line(&self, line: usize) -> Option<String>;

    /// Number of logical lines (at least 1).
    fn line_count(&self) -> usize;

    /// Current newline terminator.
    fn newline(&self) -> LineEnding;

    /// Change the newline terminator.
    fn set_newline(&mut self, newline: LineEnding);

    /// Replace `range` with `text`, returning the end position of the inserted text.
    fn replace(&mut self, range: SelectionRange, text: &str) -> Result<Position, HostError>;

    /// Text covered by `range`, lines joined with the current terminator.
    fn text_in_range(&self, range: SelectionRange) -> String;

    // Viewport

    /// Bring the result of a command into view according to `policy`.
    fn scroll_into_view(&mut self, policy: ScrollPolicy);

    // Mode

    /// Whether the editor is locked.
    fn is_read_only(&self) -> bool;

    // Events

    /// Emit a named event.
    fn emit(&mut self, event: &str, payload: EventPayload);

    // Named capabilities

    /// Invoke an editor subsystem.
    fn perform(&mut self, capability: Capability) -> Result<(), HostError>;
}

/// Length of `line` in characters, `0` if it does not exist.
pub fn line_len(host: &dyn EditorHost, line: usize) -> usize {
    host.line(line).map_or(0, |text| text.chars().count())
}

/// Position just past the last character of the document.
pub fn document_end(host: &dyn EditorHost) -> Position {
    let last = host.line_count().saturating_sub(1);
    Position::new(last, line_len(host, last))
}

/// Clamp `position` into the document.
pub fn clamp_position(host: &dyn EditorHost, position: Position) -> Position {
    let end = document_end(host);
    if position >= end {
        return end;
    }
    Position::new(position.line, position.column.min(line_len(host, position.line)))
}

/// The full-line range of `line`, including its terminator unless it is the last line.
pub fn line_range(host: &dyn EditorHost, line: usize) -> SelectionRange {
    let start = Position::new(line, 0);
    if line + 1 < host.line_count() {
        SelectionRange::new(start, Position::new(line + 1, 0))
    } else {
        SelectionRange::new(start, Position::new(line, line_len(host, line)))
    }
}
