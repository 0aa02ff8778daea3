//! Structural text transforms.
//!
//! Two commands whose behavior is more than a single host capability call:
//!
//! - [`join_lines`] merges the lines spanned by the active range and restores the cursor or
//!   selection afterwards.
//! - [`invert_selection`] replaces the selection set with its complement within the document.
//!
//! Both are plain handlers and can be registered under any name.

use crate::descriptor::{CommandArg, CommandContext, HandlerOutcome, HandlerResult};
use crate::host::{document_end, line_len};
use crate::selection::{Position, SelectionRange};

/// Join the lines spanned by the active range.
///
/// Every line after the first, up to and including the line following the range, is trimmed
/// and appended after a single space; a line that trims to nothing is appended without one. No
/// terminator is added when the merge consumes the last line of the document.
///
/// A non-empty range is re-selected from its original start over the same number of
/// characters, counted with its first line break (and the whitespace after it) collapsed into
/// one space. A cursor lands at the end of the first line's original text, or one column further
/// when text was appended.
pub fn join_lines(ctx: &mut CommandContext<'_>, _arg: Option<&CommandArg>) -> HandlerResult {
    let host = &mut *ctx.host;
    let range = host.selection_range();
    let (start, end) = (range.start, range.end);

    let first_line = host.line(start.line).unwrap_or_default();
    let first_line_len = first_line.chars().count();
    let selected_count = collapsed_len(&host.text_in_range(range));

    let mut joined = first_line;
    for line in start.line + 1..=end.line + 1 {
        let text = host.line(line).unwrap_or_default();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            joined.push(' ');
            joined.push_str(trimmed);
        }
    }

    let line_count = host.line_count();
    let replace_end = if end.line + 2 < line_count {
        joined.push_str(host.newline().as_str());
        Position::new(end.line + 2, 0)
    } else {
        document_end(host)
    };

    host.clear_selection();
    host.replace(
        SelectionRange::new(Position::new(start.line, 0), replace_end),
        &joined,
    )?;

    if selected_count > 0 {
        host.move_cursor_to(start);
        host.select_to(Position::new(start.line, start.column + selected_count));
    } else {
        let column = if line_len(host, start.line) > first_line_len {
            first_line_len + 1
        } else {
            first_line_len
        };
        host.move_cursor_to(Position::new(start.line, column));
    }

    Ok(HandlerOutcome::Handled)
}

// Character count of `text` with its first line break and the whitespace after it collapsed to
// one space.
fn collapsed_len(text: &str) -> usize {
    match text.split_once('\n') {
        None => text.chars().count(),
        Some((head, tail)) => {
            let head = head.strip_suffix('\r').unwrap_or(head);
            head.chars().count() + 1 + tail.trim_start().chars().count()
        }
    }
}

/// Complement of a sorted, non-overlapping range list within `(0, 0)..document_end`.
///
/// Produces, in document order:
///
/// - a range before the first selection, unless it starts at the document start;
/// - one range between each adjacent pair;
/// - a range after the last selection, unless it ends at `document_end`.
///
/// An empty input inverts to the whole document.
///
/// ```rust
/// use editor_commands::{Position, SelectionRange, invert_ranges};
///
/// let middle = SelectionRange::from_coords((1, 0), (1, 3));
/// let inverted = invert_ranges(&[middle], Position::new(2, 3));
/// assert_eq!(
///     inverted,
///     vec![
///         SelectionRange::from_coords((0, 0), (1, 0)),
///         SelectionRange::from_coords((1, 3), (2, 3)),
///     ]
/// );
/// ```
pub fn invert_ranges(ranges: &[SelectionRange], document_end: Position) -> Vec<SelectionRange> {
    let origin = Position::origin();
    let (Some(first), Some(last)) = (ranges.first(), ranges.last()) else {
        return vec![SelectionRange::new(origin, document_end)];
    };

    let mut inverted = Vec::with_capacity(ranges.len() + 1);
    if first.start != origin {
        inverted.push(SelectionRange::new(origin, first.start));
    }
    for pair in ranges.windows(2) {
        inverted.push(SelectionRange::new(pair[0].end, pair[1].start));
    }
    if last.end != document_end {
        inverted.push(SelectionRange::new(last.end, document_end));
    }
    inverted
}

/// Replace the selection set with its complement.
///
/// Leaves multi-select mode, clears the selection, then adds every complement range as an
/// independent selection.
pub fn invert_selection(ctx: &mut CommandContext<'_>, _arg: Option<&CommandArg>) -> HandlerResult {
    let host = &mut *ctx.host;
    let mut ranges = host.selections();
    if ranges.is_empty() {
        ranges.push(host.selection_range());
    }

    let inverted = invert_ranges(&ranges, document_end(host));
    tracing::trace!(
        before = ranges.len(),
        after = inverted.len(),
        "inverting selection"
    );

    host.exit_multi_select();
    host.clear_selection();
    // The first range takes over the cleared cursor, so an empty gap is not replaced later.
    let mut inverted = inverted.into_iter();
    if let Some(first) = inverted.next() {
        host.set_selection_range(first);
    }
    for range in inverted {
        host.add_selection(range);
    }

    Ok(HandlerOutcome::Handled)
}
