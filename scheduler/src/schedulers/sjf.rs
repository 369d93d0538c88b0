use std::cmp::Ordering;

use crate::error::Result;
use crate::schedulers::common_funcs::{run, select_best, select_preemptive};
use crate::schedulers::SchedulingPolicy;
use crate::selection::SelectionContext;
use crate::{Pid, Process};

/// Shortest job first
///
/// The plain variant compares total burst times and never preempts. The
/// preemptive variant (shortest remaining time first) compares remaining
/// times on every slice and switches as soon as a shorter job is ready.
/// Ties fall back to arrival time, then registration order.
pub struct ShortestJobFirst {
    preemptive: bool,
}

impl ShortestJobFirst {
    pub fn new() -> ShortestJobFirst {
        ShortestJobFirst { preemptive: false }
    }

    pub fn preemptive() -> ShortestJobFirst {
        ShortestJobFirst { preemptive: true }
    }
}

impl Default for ShortestJobFirst {
    fn default() -> Self {
        ShortestJobFirst::new()
    }
}

fn by_burst(a: &Process, b: &Process) -> Ordering {
    a.burst_time()
        .total_cmp(&b.burst_time())
        .then(a.arrival_time().total_cmp(&b.arrival_time()))
}

fn by_remaining(a: &Process, b: &Process) -> Ordering {
    a.remaining_time()
        .total_cmp(&b.remaining_time())
        .then(a.arrival_time().total_cmp(&b.arrival_time()))
}

impl SchedulingPolicy for ShortestJobFirst {
    fn name(&self) -> &'static str {
        if self.preemptive {
            "srtf"
        } else {
            "sjf"
        }
    }

    fn next_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
        let pick = if self.preemptive {
            select_preemptive(ctx, by_remaining)
        } else if let Some(current) = ctx.current() {
            Some(current.pid())
        } else {
            select_best(ctx, by_burst)
        };

        match pick {
            Some(pid) => run(ctx, pid),
            None => Ok(None),
        }
    }
}
