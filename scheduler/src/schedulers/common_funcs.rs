use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::error::Result;
use crate::selection::SelectionContext;
use crate::{Pid, Process};

/// Appends every newly arrived, unfinished process to `ready`
///
/// Processes already queued are skipped. New entries keep registration
/// order, which callers rely on as their tie-break.
pub fn admit_arrivals(ctx: &SelectionContext<'_>, ready: &mut VecDeque<Pid>, skip: Option<Pid>) {
    let arrived: Vec<Pid> = ctx
        .arrived()
        .map(Process::pid)
        .filter(|pid| Some(*pid) != skip && !ready.contains(pid))
        .collect();

    ready.extend(arrived);
}

/// Drops queued pids that completed or disappeared
pub fn prune_ready(ctx: &SelectionContext<'_>, ready: &mut VecDeque<Pid>) {
    ready.retain(|pid| ctx.process(*pid).map_or(false, |process| !process.is_completed()));
}

/// The arrived process that sorts first under `order`
///
/// Ties go to the earlier registered process.
pub fn select_best<F>(ctx: &SelectionContext<'_>, order: F) -> Option<Pid>
where
    F: Fn(&Process, &Process) -> Ordering,
{
    ctx.arrived().min_by(|a, b| order(*a, *b)).map(Process::pid)
}

/// Preemptive choice between the running process and the best arrival
///
/// The running process keeps the CPU unless a challenger sorts strictly
/// before it.
pub fn select_preemptive<F>(ctx: &SelectionContext<'_>, order: F) -> Option<Pid>
where
    F: Fn(&Process, &Process) -> Ordering,
{
    let best = select_best(ctx, &order)?;

    if let Some(current) = ctx.current() {
        if let Some(challenger) = ctx.process(best) {
            if order(challenger, current) != Ordering::Less {
                return Some(current.pid());
            }
        }
    }

    Some(best)
}

/// Stamps the dispatch and hands the pid back to the engine
pub fn run(ctx: &mut SelectionContext<'_>, pid: Pid) -> Result<Option<Pid>> {
    ctx.dispatch(pid)?;
    Ok(Some(pid))
}
