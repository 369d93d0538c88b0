use std::collections::VecDeque;

use log::debug;

use crate::common_types::COMPLETION_EPSILON;
use crate::error::{Result, SchedError};
use crate::schedulers::common_funcs::{admit_arrivals, prune_ready, run};
use crate::schedulers::SchedulingPolicy;
use crate::selection::SelectionContext;
use crate::Pid;

/// Round robin with a fixed time quantum
///
/// A process keeps the CPU for up to `quantum` time units, then goes to
/// the back of the ready queue behind everything that arrived meanwhile.
/// With nothing else ready, it simply starts a fresh quantum.
pub struct RoundRobin {
    ready: VecDeque<Pid>,
    /// Process holding the CPU and the time its current quantum started
    running: Option<(Pid, f64)>,
    quanta: f64,
}

impl RoundRobin {
    /// Creates a new round robin policy
    ///
    /// * `quantum` - the time a process can run before it is preempted.
    ///               Step sizes larger than the quantum preempt on every
    ///               step.
    pub fn new(quantum: f64) -> Result<RoundRobin> {
        if !quantum.is_finite() || quantum <= 0.0 {
            return Err(SchedError::InvalidQuantum(quantum));
        }

        Ok(RoundRobin {
            ready: VecDeque::new(),
            running: None,
            quanta: quantum,
        })
    }

    fn enqueue_running_process(&mut self) {
        if let Some((pid, _)) = self.running.take() {
            self.ready.push_back(pid);
        }
    }

    fn dequeue_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
        match self.ready.pop_front() {
            Some(pid) => {
                self.running = Some((pid, ctx.now()));
                run(ctx, pid)
            }
            None => {
                self.running = None;
                Ok(None)
            }
        }
    }
}

impl SchedulingPolicy for RoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn next_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
        prune_ready(ctx, &mut self.ready);
        let current = ctx.current().map(|process| process.pid());

        match (self.running, current) {
            (Some((pid, since)), Some(on_cpu)) if pid == on_cpu => {
                admit_arrivals(ctx, &mut self.ready, Some(pid));

                if ctx.now() - since < self.quanta - COMPLETION_EPSILON {
                    return run(ctx, pid);
                }

                if self.ready.is_empty() {
                    self.running = Some((pid, ctx.now()));
                    return run(ctx, pid);
                }

                debug!("{} used up its quantum at t={}", pid, ctx.now());
                self.enqueue_running_process();
            }
            _ => {
                /* the previous holder finished, or nothing was running */
                self.running = None;
                admit_arrivals(ctx, &mut self.ready, None);
            }
        }

        self.dequeue_process(ctx)
    }

    fn reset(&mut self) {
        self.ready.clear();
        self.running = None;
    }
}
