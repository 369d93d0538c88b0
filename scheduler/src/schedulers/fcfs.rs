use std::collections::VecDeque;

use crate::error::Result;
use crate::schedulers::common_funcs::{admit_arrivals, prune_ready, run};
use crate::schedulers::SchedulingPolicy;
use crate::selection::SelectionContext;
use crate::Pid;

/// First come, first served
///
/// Non preemptive: the running process keeps the CPU until it completes.
/// The ready queue is ordered by arrival time, equal arrivals keep their
/// registration order.
#[derive(Default)]
pub struct FirstComeFirstServed {
    ready: VecDeque<Pid>,
}

impl FirstComeFirstServed {
    pub fn new() -> FirstComeFirstServed {
        FirstComeFirstServed::default()
    }
}

impl SchedulingPolicy for FirstComeFirstServed {
    fn name(&self) -> &'static str {
        "fcfs"
    }

    fn next_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
        if let Some(current) = ctx.current() {
            return Ok(Some(current.pid()));
        }

        prune_ready(ctx, &mut self.ready);
        admit_arrivals(ctx, &mut self.ready, None);

        /* sort_by is stable, so equal arrivals stay in queue order */
        self.ready.make_contiguous().sort_by(|a, b| {
            let arrival = |pid: &Pid| ctx.process(*pid).map_or(f64::INFINITY, |p| p.arrival_time());
            arrival(a).total_cmp(&arrival(b))
        });

        let pid = match self.ready.pop_front() {
            Some(pid) => pid,
            None => return Ok(None),
        };

        if ctx.dispatch(pid)? {
            let remaining = ctx.process(pid).map_or(0.0, |p| p.remaining_time());
            let end = ctx.now() + remaining;
            ctx.forecast(pid, end);
        }

        run(ctx, pid)
    }

    fn reset(&mut self) {
        self.ready.clear();
    }
}
