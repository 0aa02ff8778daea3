//! Multi-Cursor Dispatcher
//!
//! Applies one descriptor's handler across the host's selection set according to its
//! [`FanOutPolicy`].
//!
//! Dispatch happens in two steps:
//!
//! 1. [`plan_fan_out`] turns a snapshot of the selection set into a [`FanOutPlan`]. This step is
//!    pure and is where the policy semantics live: an empty set becomes one implicit cursor and
//!    `PerAffectedLine` reduces ranges to distinct line indices.
//! 2. [`dispatch`] executes the plan against the host, narrowing the active range with the
//!    host's scope calls, and stops at the first failing iteration.
//!
//! Scopes are entered per iteration and exited once, after the last iteration or the failure.
//! Indices therefore keep referring to the pre-dispatch snapshot even while handlers edit the
//! document; the host re-normalizes the set on exit.

use crate::config::EngineConfig;
use crate::descriptor::{
    CommandArg, CommandContext, CommandDescriptor, FanOutPolicy, HandlerError, HandlerOutcome,
    Scope,
};
use crate::host::{EditorHost, HostError};
use crate::selection::{Position, SelectionRange};
use thiserror::Error;

/// The iterations a fan-out policy expands to for one selection snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanOutPlan {
    /// One invocation with the editor in scope.
    Single,
    /// One invocation per range, in snapshot order.
    PerSelection(Vec<SelectionRange>),
    /// One invocation per distinct line, ascending.
    PerLine(Vec<usize>),
    /// One call to the custom function with the full set.
    Custom(Vec<SelectionRange>),
}

impl FanOutPlan {
    /// Number of handler invocations this plan performs.
    pub fn invocations(&self) -> usize {
        match self {
            Self::Single | Self::Custom(_) => 1,
            Self::PerSelection(ranges) => ranges.len(),
            Self::PerLine(lines) => lines.len(),
        }
    }
}

/// Expand `policy` over a selection snapshot.
///
/// An empty `selections` is treated as a single cursor at `cursor`.
pub fn plan_fan_out(
    policy: &FanOutPolicy,
    selections: Vec<SelectionRange>,
    cursor: Position,
) -> FanOutPlan {
    let selections = if selections.is_empty() {
        vec![SelectionRange::cursor(cursor)]
    } else {
        selections
    };

    match policy {
        FanOutPolicy::Single => FanOutPlan::Single,
        FanOutPolicy::PerSelection => FanOutPlan::PerSelection(selections),
        FanOutPolicy::PerAffectedLine => {
            let mut lines: Vec<usize> = selections.iter().flat_map(|range| range.lines()).collect();
            lines.sort_unstable();
            lines.dedup();
            FanOutPlan::PerLine(lines)
        }
        FanOutPolicy::Custom(_) => FanOutPlan::Custom(selections),
    }
}

/// Tally of the invocations that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Invocations that returned without failing.
    pub invocations: usize,
    /// Of those, how many returned [`HandlerOutcome::Handled`].
    pub handled: usize,
    /// Of those, how many returned [`HandlerOutcome::NoOp`].
    pub no_op: usize,
    /// Of those, how many returned [`HandlerOutcome::NotHandled`].
    pub not_handled: usize,
}

impl DispatchReport {
    fn record(&mut self, outcome: HandlerOutcome) {
        self.invocations += 1;
        match outcome {
            HandlerOutcome::Handled => self.handled += 1,
            HandlerOutcome::NoOp => self.no_op += 1,
            HandlerOutcome::NotHandled => self.not_handled += 1,
        }
    }

    /// Whether at least one invocation accepted the request.
    pub fn succeeded(&self) -> bool {
        self.handled + self.no_op > 0
    }

    /// Whether every invocation declined the request.
    pub fn declined(&self) -> bool {
        self.invocations > 0 && self.not_handled == self.invocations
    }
}

/// A handler failure that aborted the fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("iteration {index} failed: {error}")]
pub struct DispatchFailure {
    /// Invocations completed before the failing one.
    pub completed: DispatchReport,
    /// Zero-based index of the failing iteration.
    pub index: usize,
    /// The handler error.
    #[source]
    pub error: HandlerError,
}

/// Run `descriptor`'s handler according to its fan-out policy.
///
/// Iterations run sequentially. The first failure aborts the remaining iterations; the host's
/// scope is exited either way.
pub fn dispatch(
    descriptor: &CommandDescriptor,
    host: &mut dyn EditorHost,
    config: &EngineConfig,
    arg: Option<&CommandArg>,
) -> Result<DispatchReport, DispatchFailure> {
    let selections = host.selections();
    // With no selection set there is no range to enter; the implicit cursor is passed as is.
    let implicit_cursor = selections.is_empty();
    let plan = plan_fan_out(descriptor.fan_out_policy(), selections, host.cursor());
    tracing::trace!(
        command = descriptor.name(),
        policy = ?descriptor.fan_out_policy(),
        invocations = plan.invocations(),
        "planned fan-out"
    );

    let mut report = DispatchReport::default();
    let command = descriptor.name();

    match plan {
        FanOutPlan::Single => {
            let mut ctx = CommandContext {
                host,
                scope: Scope::Editor,
                config,
                command,
            };
            let outcome = (descriptor.handler())(&mut ctx, arg).map_err(|error| DispatchFailure {
                completed: report,
                index: 0,
                error,
            })?;
            report.record(outcome);
        }
        FanOutPlan::Custom(ranges) => {
            let mut ctx = CommandContext {
                host,
                scope: Scope::Editor,
                config,
                command,
            };
            let result = match descriptor.fan_out_policy() {
                FanOutPolicy::Custom(fan_out) => fan_out(&mut ctx, &ranges, arg),
                _ => (descriptor.handler())(&mut ctx, arg),
            };
            let outcome = result.map_err(|error| DispatchFailure {
                completed: report,
                index: 0,
                error,
            })?;
            report.record(outcome);
        }
        FanOutPlan::PerSelection(ranges) => {
            let result = run_scoped(host, ranges.len(), &mut report, |host, index| {
                let range = if implicit_cursor {
                    ranges[index]
                } else {
                    host.enter_selection_scope(index).ok_or_else(|| {
                        HostError::Other(format!("selection {index} no longer exists"))
                    })?
                };
                tracing::trace!(command, index, %range, "per-selection iteration");
                let mut ctx = CommandContext {
                    host,
                    scope: Scope::Selection { index, range },
                    config,
                    command,
                };
                (descriptor.handler())(&mut ctx, arg)
            });
            result?;
        }
        FanOutPlan::PerLine(lines) => {
            let result = run_scoped(host, lines.len(), &mut report, |host, index| {
                let line = lines[index];
                host.enter_line_scope(line);
                tracing::trace!(command, index, line, "per-line iteration");
                let mut ctx = CommandContext {
                    host,
                    scope: Scope::Line(line),
                    config,
                    command,
                };
                (descriptor.handler())(&mut ctx, arg)
            });
            result?;
        }
    }

    Ok(report)
}

fn run_scoped<F>(
    host: &mut dyn EditorHost,
    count: usize,
    report: &mut DispatchReport,
    mut iteration: F,
) -> Result<(), DispatchFailure>
where
    F: FnMut(&mut dyn EditorHost, usize) -> Result<HandlerOutcome, HandlerError>,
{
    let mut failure = None;
    for index in 0..count {
        match iteration(&mut *host, index) {
            Ok(outcome) => report.record(outcome),
            Err(error) => {
                tracing::trace!(index, %error, "aborting fan-out");
                failure = Some(DispatchFailure {
                    completed: *report,
                    index,
                    error,
                });
                break;
            }
        }
    }
    host.exit_scope();

    match failure {
        Some(failure) => Err(failure),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set_becomes_implicit_cursor() {
        let plan = plan_fan_out(&FanOutPolicy::PerSelection, Vec::new(), Position::new(4, 2));
        assert_eq!(
            plan,
            FanOutPlan::PerSelection(vec![SelectionRange::cursor(Position::new(4, 2))])
        );
    }

    #[test]
    fn test_per_affected_line_dedups_in_line_order() {
        let selections = vec![
            SelectionRange::from_coords((1, 0), (1, 2)),
            SelectionRange::from_coords((1, 4), (3, 0)),
            SelectionRange::from_coords((5, 1), (5, 1)),
        ];
        let plan = plan_fan_out(&FanOutPolicy::PerAffectedLine, selections, Position::origin());
        assert_eq!(plan, FanOutPlan::PerLine(vec![1, 2, 5]));
        assert_eq!(plan.invocations(), 3);
    }

    #[test]
    fn test_single_ignores_selection_count() {
        let selections = vec![
            SelectionRange::from_coords((0, 0), (0, 1)),
            SelectionRange::from_coords((2, 0), (2, 1)),
        ];
        assert_eq!(
            plan_fan_out(&FanOutPolicy::Single, selections, Position::origin()).invocations(),
            1
        );
    }
}
