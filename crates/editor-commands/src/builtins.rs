//! Builtin command table.
//!
//! The default command set of the editor widget, expressed as data: every entry is a
//! [`CommandDescriptor`] whose handler sequences host capabilities. Bindings are written
//! per platform exactly as users know them (`Ctrl-…` on the primary profile, `Command-…` /
//! `Option-…` on the secondary one).
//!
//! Commands that only navigate or inspect are marked read-only-allowed; everything that edits
//! the document is blocked in read-only mode.
//!
//! Parametrized families are generated rather than listed; see [`fold_to_level_commands`].

use crate::chord::BindingSpec;
use crate::descriptor::{
    CommandArg, CommandContext, CommandDescriptor, FanOutPolicy, HandlerError, HandlerOutcome,
    HandlerResult, ScrollPolicy,
};
use crate::host::{
    Capability, Direction, EventPayload, Motion, Prompt, clamp_position, line_len, line_range,
};
use crate::registry::CommandRegistry;
use crate::selection::{Position, SelectionRange};
use crate::transforms::{invert_selection, join_lines};
use std::ops::RangeInclusive;

/// Group tag shared by the document start/end jumps.
pub const FILE_JUMP_GROUP: &str = "fileJump";

/// The complete default command set, including `foldToLevel1` to `foldToLevel8`.
pub fn default_commands() -> Vec<CommandDescriptor> {
    let mut commands = view_commands();
    commands.extend(navigation_commands());
    commands.extend(editing_commands());
    commands.extend(misc_commands());
    commands.extend(fold_to_level_commands(1..=8));
    commands
}

/// A registry holding [`default_commands`].
pub fn default_registry() -> CommandRegistry {
    default_commands().into_iter().collect()
}

/// One `foldToLevelN` command per level. Each command folds to its own fixed level.
pub fn fold_to_level_commands(levels: RangeInclusive<u8>) -> Vec<CommandDescriptor> {
    levels
        .map(|level| {
            CommandDescriptor::new(format!("foldToLevel{level}"), move |ctx, _| {
                ctx.host.perform(Capability::FoldToLevel(level))?;
                Ok(HandlerOutcome::Handled)
            })
            .description("commands.fold-to-level", format!("Fold To Level {level}"))
            .scroll(ScrollPolicy::Center)
            .read_only(true)
        })
        .collect()
}

fn keys(primary: Option<&'static str>, secondary: Option<&'static str>) -> BindingSpec {
    BindingSpec::new(primary, secondary)
}

fn command<F>(
    name: &'static str,
    key: &'static str,
    text: &'static str,
    handler: F,
) -> CommandDescriptor
where
    F: Fn(&mut CommandContext<'_>, Option<&CommandArg>) -> HandlerResult + Send + Sync + 'static,
{
    CommandDescriptor::new(name, handler).description(key, text)
}

fn perform(
    name: &'static str,
    key: &'static str,
    text: &'static str,
    capability: Capability,
) -> CommandDescriptor {
    command(name, key, text, move |ctx, _| {
        ctx.host.perform(capability.clone())?;
        Ok(HandlerOutcome::Handled)
    })
}

fn navigate(
    name: &'static str,
    key: &'static str,
    text: &'static str,
    motion: Motion,
    select: bool,
) -> CommandDescriptor {
    command(name, key, text, move |ctx, arg| {
        ctx.host.perform(Capability::Move {
            motion,
            select,
            times: CommandArg::times(arg),
        })?;
        Ok(HandlerOutcome::Handled)
    })
    .fan_out(FanOutPolicy::PerSelection)
    .scroll(ScrollPolicy::Cursor)
    .read_only(true)
}

fn view_commands() -> Vec<CommandDescriptor> {
    vec![
        perform(
            "showSettingsMenu",
            "commands.show-settings-menu",
            "Show settings menu",
            Capability::ShowSettingsMenu,
        )
        .bind(keys(Some("Ctrl-,"), Some("Command-,")))
        .read_only(true),
        perform(
            "goToNextError",
            "commands.go-to-next-error",
            "Go to next error",
            Capability::ShowErrorMarker { forward: true },
        )
        .bind(keys(Some("Alt-E"), Some("F4")))
        .scroll(ScrollPolicy::Animate)
        .read_only(true),
        perform(
            "goToPreviousError",
            "commands.go-to-previous-error",
            "Go to previous error",
            Capability::ShowErrorMarker { forward: false },
        )
        .bind(keys(Some("Alt-Shift-E"), Some("Shift-F4")))
        .scroll(ScrollPolicy::Animate)
        .read_only(true),
        perform(
            "selectall",
            "commands.selectall",
            "Select all",
            Capability::SelectAll,
        )
        .bind(keys(Some("Ctrl-A"), Some("Command-A")))
        .read_only(true),
        perform(
            "centerselection",
            "commands.centerselection",
            "Center selection",
            Capability::CenterSelection,
        )
        .bind(keys(None, Some("Ctrl-L")))
        .read_only(true),
        command("gotoline", "commands.gotoline", "Go to line...", |ctx, arg| {
            if let Some(CommandArg::Number(line)) = arg
                && let Ok(line) = usize::try_from(*line)
            {
                ctx.host.perform(Capability::GotoLine(line))?;
            }
            ctx.host.perform(Capability::Prompt(Prompt::GotoLine))?;
            Ok(HandlerOutcome::Handled)
        })
        .bind(keys(Some("Ctrl-L"), Some("Command-L")))
        .read_only(true),
        CommandDescriptor::new("fold", |ctx, _| {
            ctx.host.perform(Capability::ToggleFold {
                try_to_unfold: false,
            })?;
            Ok(HandlerOutcome::Handled)
        })
        .bind(keys(
            Some("Alt-L|Ctrl-F1"),
            Some("Command-Alt-L|Command-F1"),
        ))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        CommandDescriptor::new("unfold", |ctx, _| {
            ctx.host.perform(Capability::ToggleFold {
                try_to_unfold: true,
            })?;
            Ok(HandlerOutcome::Handled)
        })
        .bind(keys(
            Some("Alt-Shift-L|Ctrl-Shift-F1"),
            Some("Command-Alt-Shift-L|Command-Shift-F1"),
        ))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "toggleFoldWidget",
            "commands.toggle-fold-widget",
            "Toggle fold widget",
            Capability::ToggleFoldWidget { parent: false },
        )
        .bind(keys(Some("F2"), Some("F2")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "toggleParentFoldWidget",
            "commands.toggle-parent-fold-widget",
            "Toggle parent fold widget",
            Capability::ToggleFoldWidget { parent: true },
        )
        .bind(keys(Some("Alt-F2"), Some("Alt-F2")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "foldall",
            "commands.foldall",
            "Fold all",
            Capability::FoldAll,
        )
        .bind(keys(None, Some("Ctrl-Command-Option-0")))
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "foldAllComments",
            "commands.fold-all-comments",
            "Fold all comments",
            Capability::FoldAllComments,
        )
        .bind(keys(None, Some("Ctrl-Command-Option-0")))
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        command("foldOther", "commands.fold-other", "Fold other", |ctx, _| {
            ctx.host.perform(Capability::FoldAll)?;
            let selections = ctx.host.selections();
            ctx.host.perform(Capability::Unfold(selections))?;
            Ok(HandlerOutcome::Handled)
        })
        .bind(keys(Some("Alt-0"), Some("Command-Option-0")))
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "unfoldall",
            "commands.unfoldall",
            "Unfold all",
            Capability::UnfoldAll,
        )
        .bind(keys(Some("Alt-Shift-0"), Some("Command-Option-Shift-0")))
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "findnext",
            "commands.findnext",
            "Find next",
            Capability::Find { backwards: false },
        )
        .bind(keys(Some("Ctrl-K"), Some("Command-G")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        perform(
            "findprevious",
            "commands.findprevious",
            "Find previous",
            Capability::Find { backwards: true },
        )
        .bind(keys(Some("Ctrl-Shift-K"), Some("Command-Shift-G")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Center)
        .read_only(true),
        command(
            "selectOrFindNext",
            "commands.select-or-find-next",
            "Select or find next",
            |ctx, _| select_or_find(ctx, false),
        )
        .bind(keys(Some("Alt-K"), Some("Ctrl-G")))
        .read_only(true),
        command(
            "selectOrFindPrevious",
            "commands.select-or-find-previous",
            "Select or find previous",
            |ctx, _| select_or_find(ctx, true),
        )
        .bind(keys(Some("Alt-Shift-K"), Some("Ctrl-Shift-G")))
        .read_only(true),
        perform(
            "find",
            "commands.find",
            "Find",
            Capability::OpenSearchBox { replace: false },
        )
        .bind(keys(Some("Ctrl-F"), Some("Command-F")))
        .read_only(true),
        perform(
            "overwrite",
            "commands.overwrite",
            "Overwrite",
            Capability::ToggleOverwrite,
        )
        .bind(BindingSpec::shared("Insert"))
        .read_only(true),
    ]
}

fn select_or_find(ctx: &mut CommandContext<'_>, backwards: bool) -> HandlerResult {
    let capability = if ctx.host.is_selection_empty() {
        Capability::SelectWord
    } else {
        Capability::Find { backwards }
    };
    ctx.host.perform(capability)?;
    Ok(HandlerOutcome::Handled)
}

fn navigation_commands() -> Vec<CommandDescriptor> {
    vec![
        navigate(
            "selecttostart",
            "commands.selecttostart",
            "Select to start",
            Motion::FileStart,
            true,
        )
        .bind(keys(
            Some("Ctrl-Shift-Home"),
            Some("Command-Shift-Home|Command-Shift-Up"),
        ))
        .scroll(ScrollPolicy::Animate)
        .group(FILE_JUMP_GROUP),
        navigate(
            "gotostart",
            "commands.gotostart",
            "Go to start",
            Motion::FileStart,
            false,
        )
        .bind(keys(Some("Ctrl-Home"), Some("Command-Home|Command-Up")))
        .scroll(ScrollPolicy::Animate)
        .group(FILE_JUMP_GROUP),
        navigate(
            "selectup",
            "commands.selectup",
            "Select up",
            Motion::Up,
            true,
        )
        .bind(keys(Some("Shift-Up"), Some("Shift-Up|Ctrl-Shift-P"))),
        navigate(
            "golineup",
            "commands.golineup",
            "Go line up",
            Motion::Up,
            false,
        )
        .bind(keys(Some("Up"), Some("Up|Ctrl-P"))),
        navigate(
            "selecttoend",
            "commands.selecttoend",
            "Select to end",
            Motion::FileEnd,
            true,
        )
        .bind(keys(
            Some("Ctrl-Shift-End"),
            Some("Command-Shift-End|Command-Shift-Down"),
        ))
        .scroll(ScrollPolicy::Animate)
        .group(FILE_JUMP_GROUP),
        navigate(
            "gotoend",
            "commands.gotoend",
            "Go to end",
            Motion::FileEnd,
            false,
        )
        .bind(keys(Some("Ctrl-End"), Some("Command-End|Command-Down")))
        .scroll(ScrollPolicy::Animate)
        .group(FILE_JUMP_GROUP),
        navigate(
            "selectdown",
            "commands.selectdown",
            "Select down",
            Motion::Down,
            true,
        )
        .bind(keys(Some("Shift-Down"), Some("Shift-Down|Ctrl-Shift-N"))),
        navigate(
            "golinedown",
            "commands.golinedown",
            "Go line down",
            Motion::Down,
            false,
        )
        .bind(keys(Some("Down"), Some("Down|Ctrl-N"))),
        navigate(
            "selectwordleft",
            "commands.selectwordleft",
            "Select word left",
            Motion::WordLeft,
            true,
        )
        .bind(keys(Some("Ctrl-Shift-Left"), Some("Option-Shift-Left"))),
        navigate(
            "gotowordleft",
            "commands.gotowordleft",
            "Go to word left",
            Motion::WordLeft,
            false,
        )
        .bind(keys(Some("Ctrl-Left"), Some("Option-Left"))),
        navigate(
            "selecttolinestart",
            "commands.selecttolinestart",
            "Select to line start",
            Motion::LineStart,
            true,
        )
        .bind(keys(
            Some("Alt-Shift-Left"),
            Some("Command-Shift-Left|Ctrl-Shift-A"),
        )),
        navigate(
            "gotolinestart",
            "commands.gotolinestart",
            "Go to line start",
            Motion::LineStart,
            false,
        )
        .bind(keys(Some("Alt-Left|Home"), Some("Command-Left|Home|Ctrl-A"))),
        navigate(
            "selectleft",
            "commands.selectleft",
            "Select left",
            Motion::Left,
            true,
        )
        .bind(keys(Some("Shift-Left"), Some("Shift-Left|Ctrl-Shift-B"))),
        navigate(
            "gotoleft",
            "commands.gotoleft",
            "Go to left",
            Motion::Left,
            false,
        )
        .bind(keys(Some("Left"), Some("Left|Ctrl-B"))),
        navigate(
            "selectwordright",
            "commands.selectwordright",
            "Select word right",
            Motion::WordRight,
            true,
        )
        .bind(keys(Some("Ctrl-Shift-Right"), Some("Option-Shift-Right"))),
        navigate(
            "gotowordright",
            "commands.gotowordright",
            "Go to word right",
            Motion::WordRight,
            false,
        )
        .bind(keys(Some("Ctrl-Right"), Some("Option-Right"))),
        navigate(
            "selecttolineend",
            "commands.selecttolineend",
            "Select to line end",
            Motion::LineEnd,
            true,
        )
        .bind(keys(
            Some("Alt-Shift-Right"),
            Some("Command-Shift-Right|Shift-End|Ctrl-Shift-E"),
        )),
        navigate(
            "gotolineend",
            "commands.gotolineend",
            "Go to line end",
            Motion::LineEnd,
            false,
        )
        .bind(keys(Some("Alt-Right|End"), Some("Command-Right|End|Ctrl-E"))),
        navigate(
            "selectright",
            "commands.selectright",
            "Select right",
            Motion::Right,
            true,
        )
        .bind(keys(Some("Shift-Right"), Some("Shift-Right"))),
        navigate(
            "gotoright",
            "commands.gotoright",
            "Go to right",
            Motion::Right,
            false,
        )
        .bind(keys(Some("Right"), Some("Right|Ctrl-F"))),
        navigate(
            "selectpagedown",
            "commands.selectpagedown",
            "Select page down",
            Motion::PageDown,
            true,
        )
        .bind(BindingSpec::shared("Shift-PageDown"))
        .fan_out(FanOutPolicy::Single)
        .scroll(ScrollPolicy::None),
        perform(
            "pagedown",
            "commands.pagedown",
            "Page down",
            Capability::ScrollPage { down: true },
        )
        .bind(keys(None, Some("Option-PageDown")))
        .read_only(true),
        navigate(
            "gotopagedown",
            "commands.gotopagedown",
            "Go to page down",
            Motion::PageDown,
            false,
        )
        .bind(keys(Some("PageDown"), Some("PageDown|Ctrl-V")))
        .fan_out(FanOutPolicy::Single)
        .scroll(ScrollPolicy::None),
        navigate(
            "selectpageup",
            "commands.selectpageup",
            "Select page up",
            Motion::PageUp,
            true,
        )
        .bind(BindingSpec::shared("Shift-PageUp"))
        .fan_out(FanOutPolicy::Single)
        .scroll(ScrollPolicy::None),
        perform(
            "pageup",
            "commands.pageup",
            "Page up",
            Capability::ScrollPage { down: false },
        )
        .bind(keys(None, Some("Option-PageUp")))
        .read_only(true),
        navigate(
            "gotopageup",
            "commands.gotopageup",
            "Go to page up",
            Motion::PageUp,
            false,
        )
        .bind(BindingSpec::shared("PageUp"))
        .fan_out(FanOutPolicy::Single)
        .scroll(ScrollPolicy::None),
        perform(
            "scrollup",
            "commands.scrollup",
            "Scroll up",
            Capability::ScrollLines(-2),
        )
        .bind(keys(Some("Ctrl-Up"), None))
        .read_only(true),
        perform(
            "scrolldown",
            "commands.scrolldown",
            "Scroll down",
            Capability::ScrollLines(2),
        )
        .bind(keys(Some("Ctrl-Down"), None))
        .read_only(true),
        navigate(
            "selectlinestart",
            "commands.selectlinestart",
            "Select line start",
            Motion::LineStart,
            true,
        )
        .bind(BindingSpec::shared("Shift-Home")),
        navigate(
            "selectlineend",
            "commands.selectlineend",
            "Select line end",
            Motion::LineEnd,
            true,
        )
        .bind(BindingSpec::shared("Shift-End")),
        perform(
            "togglerecording",
            "commands.togglerecording",
            "Toggle recording",
            Capability::ToggleRecording,
        )
        .bind(keys(Some("Ctrl-Alt-E"), Some("Command-Option-E")))
        .read_only(true),
        perform(
            "replaymacro",
            "commands.replaymacro",
            "Replay macro",
            Capability::ReplayMacro,
        )
        .bind(keys(Some("Ctrl-Shift-E"), Some("Command-Shift-E")))
        .read_only(true),
        perform(
            "jumptomatching",
            "commands.jumptomatching",
            "Jump to matching",
            Capability::JumpToMatching {
                select: false,
                expand: false,
            },
        )
        .bind(keys(Some("Ctrl-\\|Ctrl-P"), Some("Command-\\")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Animate)
        .read_only(true),
        perform(
            "selecttomatching",
            "commands.selecttomatching",
            "Select to matching",
            Capability::JumpToMatching {
                select: true,
                expand: false,
            },
        )
        .bind(keys(
            Some("Ctrl-Shift-\\|Ctrl-Shift-P"),
            Some("Command-Shift-\\"),
        ))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Animate)
        .read_only(true),
        perform(
            "expandToMatching",
            "commands.expand-to-matching",
            "Expand to matching",
            Capability::JumpToMatching {
                select: true,
                expand: true,
            },
        )
        .bind(keys(Some("Ctrl-Shift-M"), Some("Ctrl-Shift-M")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Animate)
        .read_only(true),
        command(
            "passKeysToBrowser",
            "commands.pass-keys-to-browser",
            "Pass keys to browser",
            |_, _| Ok(HandlerOutcome::NoOp),
        )
        .bind(keys(None, None))
        .passthrough(true)
        .read_only(true),
        command("copy", "commands.copy", "Copy", |_, _| {
            Ok(HandlerOutcome::NoOp)
        })
        .read_only(true),
    ]
}

fn cut(ctx: &mut CommandContext<'_>, _arg: Option<&CommandArg>) -> HandlerResult {
    let selection = ctx.host.selection_range();
    let range = if ctx.config.copy_with_empty_selection && selection.is_empty() {
        line_range(&*ctx.host, selection.start.line)
    } else {
        selection
    };
    ctx.host.emit("cut", EventPayload::Range(range));

    if !range.is_empty() {
        ctx.host.replace(range, "")?;
    }
    ctx.host.clear_selection();
    Ok(HandlerOutcome::Handled)
}

fn editing_commands() -> Vec<CommandDescriptor> {
    vec![
        command("cut", "commands.cut", "Cut", cut)
            .fan_out(FanOutPolicy::PerSelection)
            .scroll(ScrollPolicy::Cursor),
        command("paste", "commands.paste", "Paste", |ctx, arg| {
            let Some(text) = CommandArg::text(arg) else {
                return Ok(HandlerOutcome::NoOp);
            };
            ctx.host.perform(Capability::Paste(text.to_string()))?;
            Ok(HandlerOutcome::Handled)
        })
        .scroll(ScrollPolicy::Cursor),
        perform(
            "removeline",
            "commands.removeline",
            "Remove line",
            Capability::RemoveLines,
        )
        .bind(keys(Some("Ctrl-D"), Some("Command-D")))
        .fan_out(FanOutPolicy::PerAffectedLine)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "duplicateSelection",
            "commands.duplicate-selection",
            "Duplicate selection",
            Capability::DuplicateSelection,
        )
        .bind(keys(Some("Ctrl-Shift-D"), Some("Command-Shift-D")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "sortlines",
            "commands.sortlines",
            "Sort lines",
            Capability::SortLines,
        )
        .bind(keys(Some("Ctrl-Alt-S"), Some("Command-Alt-S")))
        .fan_out(FanOutPolicy::PerAffectedLine)
        .scroll(ScrollPolicy::Selection),
        perform(
            "togglecomment",
            "commands.togglecomment",
            "Toggle comment",
            Capability::ToggleCommentLines,
        )
        .bind(keys(Some("Ctrl-/"), Some("Command-/")))
        .fan_out(FanOutPolicy::PerAffectedLine)
        .scroll(ScrollPolicy::SelectionPart),
        perform(
            "toggleBlockComment",
            "commands.toggle-block-comment",
            "Toggle block comment",
            Capability::ToggleBlockComment,
        )
        .bind(keys(Some("Ctrl-Shift-/"), Some("Command-Shift-/")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::SelectionPart),
        perform(
            "modifyNumberUp",
            "commands.modify-number-up",
            "Modify number up",
            Capability::ModifyNumber(1),
        )
        .bind(keys(Some("Ctrl-Shift-Up"), Some("Alt-Shift-Up")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "modifyNumberDown",
            "commands.modify-number-down",
            "Modify number down",
            Capability::ModifyNumber(-1),
        )
        .bind(keys(Some("Ctrl-Shift-Down"), Some("Alt-Shift-Down")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "replace",
            "commands.replace",
            "Replace",
            Capability::OpenSearchBox { replace: true },
        )
        .bind(keys(Some("Ctrl-H"), Some("Command-Option-F"))),
        perform("undo", "commands.undo", "Undo", Capability::Undo)
            .bind(keys(Some("Ctrl-Z"), Some("Command-Z"))),
        perform("redo", "commands.redo", "Redo", Capability::Redo).bind(keys(
            Some("Ctrl-Shift-Z|Ctrl-Y"),
            Some("Command-Shift-Z|Command-Y"),
        )),
        perform(
            "copylinesup",
            "commands.copylinesup",
            "Copy lines up",
            Capability::CopyLines { down: false },
        )
        .bind(keys(Some("Alt-Shift-Up"), Some("Command-Option-Up")))
        .scroll(ScrollPolicy::Cursor),
        perform(
            "movelinesup",
            "commands.movelinesup",
            "Move lines up",
            Capability::MoveLines { down: false },
        )
        .bind(keys(Some("Alt-Up"), Some("Option-Up")))
        .scroll(ScrollPolicy::Cursor),
        perform(
            "copylinesdown",
            "commands.copylinesdown",
            "Copy lines down",
            Capability::CopyLines { down: true },
        )
        .bind(keys(Some("Alt-Shift-Down"), Some("Command-Option-Down")))
        .scroll(ScrollPolicy::Cursor),
        perform(
            "movelinesdown",
            "commands.movelinesdown",
            "Move lines down",
            Capability::MoveLines { down: true },
        )
        .bind(keys(Some("Alt-Down"), Some("Option-Down")))
        .scroll(ScrollPolicy::Cursor),
        perform(
            "del",
            "commands.del",
            "Delete",
            Capability::Remove(Direction::Right),
        )
        .bind(keys(Some("Delete"), Some("Delete|Ctrl-D|Shift-Delete")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "backspace",
            "commands.backspace",
            "Backspace",
            Capability::Remove(Direction::Left),
        )
        .bind(keys(
            Some("Shift-Backspace|Backspace"),
            Some("Ctrl-Backspace|Shift-Backspace|Backspace|Ctrl-H"),
        ))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        command(
            "cut_or_delete",
            "commands.cut_or_delete",
            "Cut or delete",
            |ctx, _| {
                if !ctx.host.is_selection_empty() {
                    return Ok(HandlerOutcome::NotHandled);
                }
                ctx.host.perform(Capability::Remove(Direction::Left))?;
                Ok(HandlerOutcome::Handled)
            },
        )
        .bind(keys(Some("Shift-Delete"), None))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "removetolinestart",
            "commands.removetolinestart",
            "Remove to line start",
            Capability::RemoveToLineStart,
        )
        .bind(keys(Some("Alt-Backspace"), Some("Command-Backspace")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "removetolineend",
            "commands.removetolineend",
            "Remove to line end",
            Capability::RemoveToLineEnd,
        )
        .bind(keys(Some("Alt-Delete"), Some("Ctrl-K|Command-Delete")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        command(
            "removetolinestarthard",
            "commands.removetolinestarthard",
            "Remove to line start hard",
            |ctx, _| {
                let range = ctx.host.selection_range();
                let start = Position::new(range.start.line, 0);
                ctx.host.replace(SelectionRange::new(start, range.end), "")?;
                Ok(HandlerOutcome::Handled)
            },
        )
        .bind(keys(Some("Ctrl-Shift-Backspace"), None))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        command(
            "removetolineendhard",
            "commands.removetolineendhard",
            "Remove to line end hard",
            |ctx, _| {
                let range = ctx.host.selection_range();
                let end = Position::new(range.end.line, line_len(&*ctx.host, range.end.line));
                ctx.host.replace(SelectionRange::new(range.start, end), "")?;
                Ok(HandlerOutcome::Handled)
            },
        )
        .bind(keys(Some("Ctrl-Shift-Delete"), None))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "removewordleft",
            "commands.removewordleft",
            "Remove word left",
            Capability::RemoveWord(Direction::Left),
        )
        .bind(keys(
            Some("Ctrl-Backspace"),
            Some("Alt-Backspace|Ctrl-Alt-Backspace"),
        ))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "removewordright",
            "commands.removewordright",
            "Remove word right",
            Capability::RemoveWord(Direction::Right),
        )
        .bind(keys(Some("Ctrl-Delete"), Some("Alt-Delete")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "outdent",
            "commands.outdent",
            "Outdent",
            Capability::BlockOutdent,
        )
        .bind(keys(Some("Shift-Tab"), Some("Shift-Tab")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::SelectionPart),
        perform("indent", "commands.indent", "Indent", Capability::Indent)
            .bind(keys(Some("Tab"), Some("Tab")))
            .fan_out(FanOutPolicy::PerSelection)
            .scroll(ScrollPolicy::SelectionPart),
        perform(
            "blockoutdent",
            "commands.blockoutdent",
            "Block outdent",
            Capability::BlockOutdent,
        )
        .bind(keys(Some("Ctrl-["), Some("Ctrl-[")))
        .fan_out(FanOutPolicy::PerAffectedLine)
        .scroll(ScrollPolicy::SelectionPart),
        perform(
            "blockindent",
            "commands.blockindent",
            "Block indent",
            Capability::BlockIndent,
        )
        .bind(keys(Some("Ctrl-]"), Some("Ctrl-]")))
        .fan_out(FanOutPolicy::PerAffectedLine)
        .scroll(ScrollPolicy::SelectionPart),
        command(
            "insertstring",
            "commands.insertstring",
            "Insert string",
            |ctx, arg| {
                let text = CommandArg::text(arg)
                    .ok_or(HandlerError::InvalidArgument { expected: "text" })?;
                ctx.host.perform(Capability::Insert(text.to_string()))?;
                Ok(HandlerOutcome::Handled)
            },
        )
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        command(
            "inserttext",
            "commands.inserttext",
            "Insert text",
            |ctx, arg| {
                let text = CommandArg::text(arg).unwrap_or_default();
                let times = CommandArg::times(arg);
                ctx.host.perform(Capability::Insert(text.repeat(times)))?;
                Ok(HandlerOutcome::Handled)
            },
        )
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "splitline",
            "commands.splitline",
            "Split line",
            Capability::SplitLine,
        )
        .bind(keys(None, Some("Ctrl-O")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "transposeletters",
            "commands.transposeletters",
            "Transpose letters",
            Capability::TransposeLetters,
        )
        .bind(keys(Some("Alt-Shift-X"), Some("Ctrl-T")))
        .fan_out(FanOutPolicy::custom(|ctx, ranges, _| {
            let capability = if ranges.len() > 1 {
                Capability::TransposeSelections(1)
            } else {
                Capability::TransposeLetters
            };
            ctx.host.perform(capability)?;
            Ok(HandlerOutcome::Handled)
        }))
        .scroll(ScrollPolicy::Cursor),
        perform(
            "touppercase",
            "commands.touppercase",
            "To uppercase",
            Capability::ToUpperCase,
        )
        .bind(keys(Some("Ctrl-U"), Some("Ctrl-U")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "tolowercase",
            "commands.tolowercase",
            "To lowercase",
            Capability::ToLowerCase,
        )
        .bind(keys(Some("Ctrl-Shift-U"), Some("Ctrl-Shift-U")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        perform(
            "autoindent",
            "commands.autoindent",
            "Auto Indent",
            Capability::AutoIndent,
        )
        .bind(keys(None, None))
        .scroll(ScrollPolicy::Animate),
        command(
            "expandtoline",
            "commands.expandtoline",
            "Expand to line",
            |ctx, _| {
                let range = ctx.host.selection_range();
                let end = clamp_position(&*ctx.host, Position::new(range.end.line + 1, 0));
                let expanded = SelectionRange::new(Position::new(range.start.line, 0), end);
                ctx.host.set_selection_range(expanded);
                Ok(HandlerOutcome::Handled)
            },
        )
        .bind(keys(Some("Ctrl-Shift-L"), Some("Command-Shift-L")))
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor)
        .read_only(true),
        CommandDescriptor::new("openlink", |ctx, _| {
            ctx.host.perform(Capability::OpenLink)?;
            Ok(HandlerOutcome::Handled)
        })
        .bind(keys(Some("Ctrl+F3"), Some("F3"))),
    ]
}

fn misc_commands() -> Vec<CommandDescriptor> {
    vec![
        command("joinlines", "commands.joinlines", "Join lines", join_lines)
            .bind(keys(None, None))
            .fan_out(FanOutPolicy::PerSelection)
            .read_only(true),
        command(
            "invertSelection",
            "commands.invert-selection",
            "Invert selection",
            invert_selection,
        )
        .bind(keys(None, None))
        .scroll(ScrollPolicy::None)
        .read_only(true),
        command(
            "addLineAfter",
            "commands.add-line-after",
            "Add new line after the current line",
            |ctx, _| {
                ctx.host.clear_selection();
                ctx.host.perform(Capability::Move {
                    motion: Motion::LineEnd,
                    select: false,
                    times: 1,
                })?;
                ctx.host.perform(Capability::Insert("\n".to_string()))?;
                Ok(HandlerOutcome::Handled)
            },
        )
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        command(
            "addLineBefore",
            "commands.add-line-before",
            "Add new line before the current line",
            |ctx, _| {
                ctx.host.clear_selection();
                let cursor = ctx.host.cursor();
                if cursor.line == 0 {
                    ctx.host.move_cursor_to(Position::origin());
                    ctx.host.perform(Capability::Insert("\n".to_string()))?;
                    ctx.host.perform(Capability::Move {
                        motion: Motion::Up,
                        select: false,
                        times: 1,
                    })?;
                } else {
                    let above = cursor.line - 1;
                    let end = Position::new(above, line_len(&*ctx.host, above));
                    ctx.host.move_cursor_to(end);
                    ctx.host.perform(Capability::Insert("\n".to_string()))?;
                }
                Ok(HandlerOutcome::Handled)
            },
        )
        .fan_out(FanOutPolicy::PerSelection)
        .scroll(ScrollPolicy::Cursor),
        CommandDescriptor::new("openCommandPallete", |ctx, _| {
            tracing::warn!(
                command = ctx.command,
                "obsolete command; use `openCommandPalette` instead"
            );
            ctx.host.perform(Capability::Prompt(Prompt::Commands))?;
            Ok(HandlerOutcome::Handled)
        })
        .read_only(true),
        perform(
            "openCommandPalette",
            "commands.open-command-palette",
            "Open command palette",
            Capability::Prompt(Prompt::Commands),
        )
        .bind(keys(Some("F1"), Some("F1")))
        .read_only(true),
        perform(
            "modeSelect",
            "commands.mode-select",
            "Change language mode...",
            Capability::Prompt(Prompt::Modes),
        )
        .bind(keys(None, None))
        .read_only(true),
    ]
}
