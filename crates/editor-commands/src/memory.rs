//! In-memory reference host.
//!
//! [`MemoryEditor`] implements [`EditorHost`] over a [`ropey::Rope`] so the dispatch core can be
//! exercised without a real editor. It keeps a multi-range selection set, honors the scope
//! protocol used by the dispatcher, and records everything the core asks of the outside world
//! (scroll signals, events, capability calls) for inspection.
//!
//! Only a handful of capabilities change state: motions, insert/paste, the remove family,
//! select-all, line split and case changes. Every other capability is recorded and succeeds.
//!
//! The rope always holds LF-terminated text; the original terminator is remembered and used
//! by [`MemoryEditor::text`] and [`EditorHost::text_in_range`].

use crate::descriptor::ScrollPolicy;
use crate::host::{Capability, Direction, EditorHost, EventPayload, HostError, Motion};
use crate::line_ending::LineEnding;
use crate::selection::{Position, SelectionRange, normalize_ranges};
use ropey::Rope;
use unicode_segmentation::UnicodeSegmentation;

// Lines moved by PageUp / PageDown.
const PAGE_LINES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Caret {
    anchor: Position,
    head: Position,
}

impl Caret {
    fn at(position: Position) -> Self {
        Self {
            anchor: position,
            head: position,
        }
    }

    fn from_range(range: SelectionRange) -> Self {
        Self {
            anchor: range.start,
            head: range.end,
        }
    }

    fn range(&self) -> SelectionRange {
        SelectionRange::new(self.anchor, self.head)
    }
}

/// A rope-backed [`EditorHost`] with a recording event sink.
#[derive(Debug, Clone)]
pub struct MemoryEditor {
    rope: Rope,
    newline: LineEnding,
    carets: Vec<Caret>,
    active: usize,
    line_caret: Option<Caret>,
    scope_focus: Option<usize>,
    // The carets were set explicitly, so a lone empty one is a real selection, not a placeholder.
    placed: bool,
    read_only: bool,
    scroll_log: Vec<ScrollPolicy>,
    events: Vec<(String, EventPayload)>,
    performed: Vec<Capability>,
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self::new("")
    }
}

impl MemoryEditor {
    /// Create an editor holding `text`, with a cursor at the document start.
    ///
    /// The newline terminator is detected from `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&LineEnding::normalize(text)),
            newline: LineEnding::detect_in_text(text),
            carets: vec![Caret::at(Position::origin())],
            active: 0,
            line_caret: None,
            scope_focus: None,
            placed: false,
            read_only: false,
            scroll_log: Vec::new(),
            events: Vec::new(),
            performed: Vec::new(),
        }
    }

    /// Place a single cursor.
    pub fn with_cursor(mut self, position: Position) -> Self {
        let position = self.clamp(position);
        self.carets = vec![Caret::at(position)];
        self.active = 0;
        self
    }

    /// Replace the selection set. The last range becomes the active one.
    pub fn with_selections(mut self, ranges: impl IntoIterator<Item = SelectionRange>) -> Self {
        let ranges: Vec<SelectionRange> = ranges
            .into_iter()
            .map(|range| self.clamp_range(range))
            .collect();
        let focus = ranges.last().map(|range| range.end);
        self.carets = normalize_ranges(ranges)
            .into_iter()
            .map(Caret::from_range)
            .collect();
        self.placed = !self.carets.is_empty();
        if self.carets.is_empty() {
            self.carets.push(Caret::at(Position::origin()));
        }
        self.active = focus
            .and_then(|head| {
                self.carets
                    .iter()
                    .position(|caret| caret.range().contains_inclusive(head))
            })
            .unwrap_or(self.carets.len() - 1);
        self
    }

    /// Start in read-only mode.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Lock or unlock the editor.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Document text with the current terminator.
    pub fn text(&self) -> String {
        let text = self.rope.to_string();
        match self.newline {
            LineEnding::Lf => text,
            LineEnding::Crlf => text.replace('\n', "\r\n"),
        }
    }

    /// All logical lines, without terminators.
    pub fn lines(&self) -> Vec<String> {
        (0..self.rope.len_lines())
            .map(|line| self.line_text(line))
            .collect()
    }

    /// Cursor of the active range.
    pub fn cursor_position(&self) -> Position {
        self.active_caret().head
    }

    /// The selection set, in document order.
    pub fn selection_ranges(&self) -> Vec<SelectionRange> {
        self.carets.iter().map(Caret::range).collect()
    }

    /// Index of the active range in [`selection_ranges`](Self::selection_ranges).
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Scroll policies signaled so far, oldest first.
    pub fn scroll_log(&self) -> &[ScrollPolicy] {
        &self.scroll_log
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> &[(String, EventPayload)] {
        &self.events
    }

    /// Names of the events emitted so far.
    pub fn event_names(&self) -> Vec<&str> {
        self.events.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Capabilities performed so far, oldest first.
    pub fn performed(&self) -> &[Capability] {
        &self.performed
    }

    /// Forget recorded scroll signals, events and capability calls.
    pub fn clear_logs(&mut self) {
        self.scroll_log.clear();
        self.events.clear();
        self.performed.clear();
    }

    fn active_caret(&self) -> &Caret {
        match &self.line_caret {
            Some(caret) => caret,
            None => &self.carets[self.active],
        }
    }

    fn active_caret_mut(&mut self) -> &mut Caret {
        match &mut self.line_caret {
            Some(caret) => caret,
            None => &mut self.carets[self.active],
        }
    }

    fn line_text(&self, line: usize) -> String {
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        text
    }

    fn len_of(&self, line: usize) -> usize {
        if line < self.rope.len_lines() {
            self.line_text(line).chars().count()
        } else {
            0
        }
    }

    fn end(&self) -> Position {
        let last = self.rope.len_lines().saturating_sub(1);
        Position::new(last, self.len_of(last))
    }

    fn clamp(&self, position: Position) -> Position {
        if position.line >= self.rope.len_lines() {
            return self.end();
        }
        Position::new(position.line, position.column.min(self.len_of(position.line)))
    }

    fn clamp_range(&self, range: SelectionRange) -> SelectionRange {
        SelectionRange::new(self.clamp(range.start), self.clamp(range.end))
    }

    fn char_index(&self, position: Position) -> Result<usize, HostError> {
        let invalid = HostError::InvalidPosition {
            line: position.line,
            column: position.column,
        };
        if position.line >= self.rope.len_lines() || position.column > self.len_of(position.line) {
            return Err(invalid);
        }
        Ok(self.rope.line_to_char(position.line) + position.column)
    }

    fn position_of(&self, char_index: usize) -> Position {
        let char_index = char_index.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_index);
        Position::new(line, char_index - self.rope.line_to_char(line))
    }

    fn shift_carets(&mut self, edited: SelectionRange, new_end: Position) {
        let shift = |position: Position| shift_position(position, edited, new_end);
        for caret in self.carets.iter_mut().chain(self.line_caret.as_mut()) {
            caret.anchor = shift(caret.anchor);
            caret.head = shift(caret.head);
        }
    }

    fn normalize_carets(&mut self) {
        let focus = self.carets[self.active].head;
        let merged = normalize_ranges(self.carets.iter().map(Caret::range).collect());
        let carets: Vec<Caret> = merged
            .into_iter()
            .map(|range| {
                self.carets
                    .iter()
                    .find(|caret| caret.range() == range)
                    .copied()
                    .unwrap_or_else(|| Caret::from_range(range))
            })
            .collect();
        self.active = carets
            .iter()
            .position(|caret| caret.range().contains_inclusive(focus))
            .unwrap_or(carets.len().saturating_sub(1));
        self.carets = carets;
    }

    fn begin_scope(&mut self) {
        if self.scope_focus.is_none() {
            self.scope_focus = Some(self.active);
        }
    }

    fn step(&self, position: Position, motion: Motion) -> Position {
        let Position { line, column } = position;
        let last_line = self.rope.len_lines().saturating_sub(1);
        match motion {
            Motion::Left if column > 0 => Position::new(line, column - 1),
            Motion::Left if line > 0 => Position::new(line - 1, self.len_of(line - 1)),
            Motion::Left => position,
            Motion::Right if column < self.len_of(line) => Position::new(line, column + 1),
            Motion::Right if line < last_line => Position::new(line + 1, 0),
            Motion::Right => position,
            Motion::Up if line > 0 => Position::new(line - 1, column.min(self.len_of(line - 1))),
            Motion::Up => Position::origin(),
            Motion::Down if line < last_line => {
                Position::new(line + 1, column.min(self.len_of(line + 1)))
            }
            Motion::Down => self.end(),
            Motion::WordLeft => self.word_left(position),
            Motion::WordRight => self.word_right(position),
            Motion::LineStart => Position::new(line, 0),
            Motion::LineEnd => Position::new(line, self.len_of(line)),
            Motion::PageUp => {
                let target = line.saturating_sub(PAGE_LINES);
                Position::new(target, column.min(self.len_of(target)))
            }
            Motion::PageDown => {
                let target = (line + PAGE_LINES).min(last_line);
                Position::new(target, column.min(self.len_of(target)))
            }
            Motion::FileStart => Position::origin(),
            Motion::FileEnd => self.end(),
        }
    }

    fn word_left(&self, position: Position) -> Position {
        if position.column == 0 {
            return self.step(position, Motion::Left);
        }
        let column = word_segments(&self.line_text(position.line))
            .into_iter()
            .rev()
            .find(|segment| segment.start < position.column && !segment.blank)
            .map_or(0, |segment| segment.start);
        Position::new(position.line, column)
    }

    fn word_right(&self, position: Position) -> Position {
        let line_len = self.len_of(position.line);
        if position.column >= line_len {
            return self.step(position, Motion::Right);
        }
        let column = word_segments(&self.line_text(position.line))
            .into_iter()
            .find(|segment| segment.end > position.column && !segment.blank)
            .map_or(line_len, |segment| segment.end);
        Position::new(position.line, column)
    }

    fn remove_range(&mut self, direction: Direction) -> SelectionRange {
        let caret = *self.active_caret();
        let range = caret.range();
        if !range.is_empty() {
            return range;
        }
        match direction {
            Direction::Left => SelectionRange::new(self.step(caret.head, Motion::Left), caret.head),
            Direction::Right => {
                SelectionRange::new(caret.head, self.step(caret.head, Motion::Right))
            }
        }
    }

    fn change_case(&mut self, upper: bool) -> Result<(), HostError> {
        let range = self.active_caret().range();
        if range.is_empty() {
            return Ok(());
        }
        let text = self.text_in_range(range);
        let changed = if upper {
            text.to_uppercase()
        } else {
            text.to_lowercase()
        };
        let end = self.replace(range, &changed)?;
        *self.active_caret_mut() = Caret::from_range(SelectionRange::new(range.start, end));
        Ok(())
    }

    fn apply(&mut self, capability: &Capability) -> Result<(), HostError> {
        match capability {
            Capability::SelectAll => {
                self.exit_multi_select();
                let end = self.end();
                *self.active_caret_mut() = Caret {
                    anchor: Position::origin(),
                    head: end,
                };
            }
            Capability::Move {
                motion,
                select,
                times,
            } => {
                let mut head = self.active_caret().head;
                for _ in 0..(*times).max(1) {
                    head = self.step(head, *motion);
                }
                let caret = self.active_caret_mut();
                caret.head = head;
                if !select {
                    caret.anchor = head;
                }
            }
            Capability::Insert(text) | Capability::Paste(text) => {
                let range = self.active_caret().range();
                self.replace(range, text)?;
            }
            Capability::Remove(direction) => {
                let range = self.remove_range(*direction);
                self.replace(range, "")?;
            }
            Capability::RemoveToLineStart => {
                let head = self.active_caret().head;
                self.replace(SelectionRange::new(Position::new(head.line, 0), head), "")?;
            }
            Capability::RemoveToLineEnd => {
                let head = self.active_caret().head;
                let end = Position::new(head.line, self.len_of(head.line));
                self.replace(SelectionRange::new(head, end), "")?;
            }
            Capability::SplitLine => {
                let head = self.active_caret().head;
                let newline = self.newline.as_str();
                self.replace(SelectionRange::cursor(head), newline)?;
                *self.active_caret_mut() = Caret::at(head);
            }
            Capability::ToUpperCase => self.change_case(true)?,
            Capability::ToLowerCase => self.change_case(false)?,
            _ => {}
        }
        Ok(())
    }
}

// A UAX #29 word-boundary segment of one line, in character columns.
struct WordSegment {
    start: usize,
    end: usize,
    blank: bool,
}

fn word_segments(text: &str) -> Vec<WordSegment> {
    let mut column = 0;
    text.split_word_bounds()
        .map(|segment| {
            let start = column;
            column += segment.chars().count();
            WordSegment {
                start,
                end: column,
                blank: segment.chars().all(char::is_whitespace),
            }
        })
        .collect()
}

// Map a position across the replacement of `edited` by text ending at `new_end`.
fn shift_position(position: Position, edited: SelectionRange, new_end: Position) -> Position {
    if position < edited.start {
        position
    } else if position >= edited.end {
        if position.line == edited.end.line {
            Position::new(
                new_end.line,
                new_end.column + (position.column - edited.end.column),
            )
        } else {
            Position::new(
                position.line - edited.end.line + new_end.line,
                position.column,
            )
        }
    } else {
        new_end
    }
}

impl EditorHost for MemoryEditor {
    fn selections(&self) -> Vec<SelectionRange> {
        self.selection_ranges()
    }

    fn selection_range(&self) -> SelectionRange {
        self.active_caret().range()
    }

    fn set_selection_range(&mut self, range: SelectionRange) {
        let range = self.clamp_range(range);
        *self.active_caret_mut() = Caret::from_range(range);
        self.placed = true;
    }

    fn add_selection(&mut self, range: SelectionRange) {
        let range = self.clamp_range(range);
        let placeholder = self.carets.len() == 1
            && self.carets[0].range().is_empty()
            && self.line_caret.is_none()
            && !self.placed;
        self.placed = true;
        if placeholder {
            self.carets[0] = Caret::from_range(range);
            self.active = 0;
            return;
        }
        self.carets.push(Caret::from_range(range));
        self.active = self.carets.len() - 1;
        if self.scope_focus.is_none() {
            self.normalize_carets();
        }
    }

    fn clear_selection(&mut self) {
        let caret = self.active_caret_mut();
        caret.anchor = caret.head;
        self.placed = false;
    }

    fn exit_multi_select(&mut self) {
        let caret = self.carets[self.active];
        self.carets = vec![caret];
        self.active = 0;
    }

    fn cursor(&self) -> Position {
        self.cursor_position()
    }

    fn move_cursor_to(&mut self, position: Position) {
        let position = self.clamp(position);
        *self.active_caret_mut() = Caret::at(position);
        self.placed = false;
    }

    fn select_to(&mut self, position: Position) {
        let position = self.clamp(position);
        self.active_caret_mut().head = position;
    }

    fn enter_selection_scope(&mut self, index: usize) -> Option<SelectionRange> {
        self.begin_scope();
        self.line_caret = None;
        let caret = self.carets.get(index).copied()?;
        self.active = index;
        Some(caret.range())
    }

    fn enter_line_scope(&mut self, line: usize) {
        self.begin_scope();
        let position = self.clamp(Position::new(line, 0));
        self.line_caret = Some(Caret::at(position));
    }

    fn exit_scope(&mut self) {
        if let Some(focus) = self.scope_focus.take() {
            self.line_caret = None;
            self.active = focus.min(self.carets.len().saturating_sub(1));
            self.normalize_carets();
        }
    }

    fn line(&self, line: usize) -> Option<String> {
        (line < self.rope.len_lines()).then(|| self.line_text(line))
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn newline(&self) -> LineEnding {
        self.newline
    }

    fn set_newline(&mut self, newline: LineEnding) {
        self.newline = newline;
    }

    fn replace(&mut self, range: SelectionRange, text: &str) -> Result<Position, HostError> {
        let start = self.char_index(range.start)?;
        let end = self.char_index(range.end)?;
        let text = LineEnding::normalize(text);

        self.rope.remove(start..end);
        self.rope.insert(start, &text);

        let new_end = self.position_of(start + text.chars().count());
        self.shift_carets(range, new_end);
        Ok(new_end)
    }

    fn text_in_range(&self, range: SelectionRange) -> String {
        let range = self.clamp_range(range);
        let (Ok(start), Ok(end)) = (self.char_index(range.start), self.char_index(range.end))
        else {
            return String::new();
        };
        let text = self.rope.slice(start..end).to_string();
        match self.newline {
            LineEnding::Lf => text,
            LineEnding::Crlf => text.replace('\n', "\r\n"),
        }
    }

    fn scroll_into_view(&mut self, policy: ScrollPolicy) {
        self.scroll_log.push(policy);
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn emit(&mut self, event: &str, payload: EventPayload) {
        self.events.push((event.to_string(), payload));
    }

    fn perform(&mut self, capability: Capability) -> Result<(), HostError> {
        tracing::trace!(capability = capability.name(), "perform");
        self.apply(&capability)?;
        self.performed.push(capability);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_shifts_later_carets() {
        let mut editor = MemoryEditor::new("abc\ndef").with_selections([
            SelectionRange::cursor(Position::new(0, 1)),
            SelectionRange::cursor(Position::new(1, 2)),
        ]);

        editor
            .replace(SelectionRange::cursor(Position::new(0, 0)), "xy\n")
            .unwrap();

        assert_eq!(editor.lines(), vec!["xy", "abc", "def"]);
        assert_eq!(
            editor.selection_ranges(),
            vec![
                SelectionRange::cursor(Position::new(1, 1)),
                SelectionRange::cursor(Position::new(2, 2)),
            ]
        );
    }

    #[test]
    fn test_crlf_is_kept_at_the_edges() {
        let editor = MemoryEditor::new("a\r\nb");
        assert_eq!(editor.newline, LineEnding::Crlf);
        assert_eq!(editor.lines(), vec!["a", "b"]);
        assert_eq!(editor.text(), "a\r\nb");
        assert_eq!(
            editor.text_in_range(SelectionRange::from_coords((0, 0), (1, 1))),
            "a\r\nb"
        );
    }

    #[test]
    fn test_lone_cursor_is_replaced_by_added_selection() {
        let mut editor = MemoryEditor::new("hello");
        editor.add_selection(SelectionRange::from_coords((0, 1), (0, 3)));
        assert_eq!(
            editor.selection_ranges(),
            vec![SelectionRange::from_coords((0, 1), (0, 3))]
        );
    }

    #[test]
    fn test_explicit_cursor_is_kept_by_added_selection() {
        let mut editor = MemoryEditor::new("abcdef");
        editor.set_selection_range(SelectionRange::cursor(Position::new(0, 2)));
        editor.add_selection(SelectionRange::from_coords((0, 4), (0, 6)));
        assert_eq!(
            editor.selection_ranges(),
            vec![
                SelectionRange::cursor(Position::new(0, 2)),
                SelectionRange::from_coords((0, 4), (0, 6)),
            ]
        );
    }

    #[test]
    fn test_word_motions() {
        let editor = MemoryEditor::new("let foo_bar = 1;");
        assert_eq!(
            editor.step(Position::new(0, 4), Motion::WordRight),
            Position::new(0, 11)
        );
        assert_eq!(
            editor.step(Position::new(0, 12), Motion::WordLeft),
            Position::new(0, 4)
        );
        assert_eq!(
            editor.step(Position::new(0, 11), Motion::WordRight),
            Position::new(0, 13)
        );
    }

    #[test]
    fn test_word_motion_counts_characters_not_bytes() {
        let editor = MemoryEditor::new("héllo wörld");
        assert_eq!(
            editor.step(Position::new(0, 0), Motion::WordRight),
            Position::new(0, 5)
        );
        assert_eq!(
            editor.step(Position::new(0, 11), Motion::WordLeft),
            Position::new(0, 6)
        );
    }
}
