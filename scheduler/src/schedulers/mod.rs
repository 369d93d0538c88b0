//! Process selection policies
//!
//! Every policy implements [`SchedulingPolicy`] and is injected into the
//! engine. The engine calls `next_process` once per step, before the slice
//! is executed, and validates whatever the policy returns.
//!

use crate::error::Result;
use crate::selection::SelectionContext;
use crate::Pid;

mod common_funcs;

mod fcfs;
pub use fcfs::FirstComeFirstServed;

mod sjf;
pub use sjf::ShortestJobFirst;

mod priority;
pub use priority::PriorityScheduler;

mod round_robin;
pub use round_robin::RoundRobin;

mod dvfs;
pub use dvfs::{DvfsAware, DvfsLevel};

/// Picks the process that runs during the next slice
pub trait SchedulingPolicy {
    /// Short human readable name, used in logs and errors
    fn name(&self) -> &'static str;

    /// Returns the pid that runs during the slice starting at `ctx.now()`,
    /// or `None` to leave the CPU idle
    ///
    /// The returned process must be registered, not completed and arrived
    /// by `ctx.now()`.
    fn next_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>>;

    /// Forgets all per-run state (ready queues, slice bookkeeping)
    fn reset(&mut self) {}
}
