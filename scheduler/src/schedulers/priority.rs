use crate::error::Result;
use crate::schedulers::common_funcs::{run, select_best, select_preemptive};
use crate::schedulers::SchedulingPolicy;
use crate::selection::SelectionContext;
use crate::{Pid, PriorityOrder, Process};

/// Static priority scheduling
///
/// `order` decides whether lower or higher values win. Equal priorities
/// run in arrival order, then registration order.
pub struct PriorityScheduler {
    order: PriorityOrder,
    preemptive: bool,
}

impl PriorityScheduler {
    /// Creates a new priority policy
    ///
    /// * `order` - which end of the priority range runs first
    /// * `preemptive` - if true, a newly arrived process with a better
    ///                  priority takes the CPU from the running one
    pub fn new(order: PriorityOrder, preemptive: bool) -> PriorityScheduler {
        PriorityScheduler { order, preemptive }
    }
}

impl SchedulingPolicy for PriorityScheduler {
    fn name(&self) -> &'static str {
        if self.preemptive {
            "priority-preemptive"
        } else {
            "priority"
        }
    }

    fn next_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
        let order = self.order;
        let by_priority = move |a: &Process, b: &Process| {
            order
                .rank(a.priority())
                .cmp(&order.rank(b.priority()))
                .then(a.arrival_time().total_cmp(&b.arrival_time()))
        };

        let pick = if self.preemptive {
            select_preemptive(ctx, by_priority)
        } else if let Some(current) = ctx.current() {
            Some(current.pid())
        } else {
            select_best(ctx, by_priority)
        };

        match pick {
            Some(pid) => run(ctx, pid),
            None => Ok(None),
        }
    }
}
