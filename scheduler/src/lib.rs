//! A CPU scheduling simulator.
//!
//! This library provides a time stepped engine that runs a set of
//! processes under a pluggable selection policy, records the resulting
//! Gantt chart and computes timing and energy metrics.
//!
//! ```
//! use sched_sim::{fcfs, Pid, Process};
//!
//! let mut scheduler = fcfs();
//! scheduler.add_process(Process::new(Pid::new(1), 0.0, 4.0, 0).unwrap()).unwrap();
//! scheduler.add_process(Process::new(Pid::new(2), 1.0, 2.0, 0).unwrap()).unwrap();
//! scheduler.run_to_completion(1.0, 100).unwrap();
//!
//! assert_eq!(scheduler.get_metrics().avg_waiting_time, 1.5);
//! ```
//!

use std::fmt;

mod common_types;
pub use crate::common_types::{Pid, PriorityOrder, ProcessState, COMPLETION_EPSILON};

mod error;
pub use crate::error::{Result, SchedError};

mod process;
pub use crate::process::Process;

mod table;

mod gantt;
pub use crate::gantt::{GanttChart, GanttEntry};

mod selection;
pub use crate::selection::SelectionContext;

mod schedulers;
pub use crate::schedulers::{
    DvfsAware, DvfsLevel, FirstComeFirstServed, PriorityScheduler, RoundRobin, SchedulingPolicy,
    ShortestJobFirst,
};

mod collector;
pub use crate::collector::{collect_all, Collector};

mod metrics;
pub use crate::metrics::Metrics;

mod scheduler;
pub use crate::scheduler::{Scheduler, DEFAULT_TIME_STEP};

/// Returns an engine with a first come, first served policy
pub fn fcfs() -> Scheduler {
    Scheduler::with_policy(FirstComeFirstServed::new())
}

/// Returns an engine with a non preemptive shortest job first policy
pub fn sjf() -> Scheduler {
    Scheduler::with_policy(ShortestJobFirst::new())
}

/// Returns an engine with a shortest remaining time first policy
pub fn srtf() -> Scheduler {
    Scheduler::with_policy(ShortestJobFirst::preemptive())
}

/// Returns an engine with a static priority policy
///
/// * `order` - whether lower or higher priority values run first
/// * `preemptive` - whether a better priority arrival takes the CPU
pub fn priority(order: PriorityOrder, preemptive: bool) -> Scheduler {
    Scheduler::with_policy(PriorityScheduler::new(order, preemptive))
}

/// Returns an engine with a round robin policy
///
/// * `quantum` - the time a process can run before it is preempted
pub fn round_robin(quantum: f64) -> Result<Scheduler> {
    Ok(Scheduler::with_policy(RoundRobin::new(quantum)?))
}

/// Returns an engine that runs `inner` and scales voltage and frequency
/// per dispatch
pub fn dvfs(inner: &PolicyKind) -> Result<Scheduler> {
    Ok(Scheduler::with_policy(DvfsAware::new(inner.build()?)))
}

/// Description of a policy, buildable into a fresh instance
#[derive(Clone, Debug, PartialEq)]
pub enum PolicyKind {
    Fcfs,
    Sjf,
    Srtf,
    Priority { order: PriorityOrder, preemptive: bool },
    RoundRobin { quantum: f64 },
    Dvfs(Box<PolicyKind>),
}

impl PolicyKind {
    /// Builds a new policy with empty run state
    pub fn build(&self) -> Result<Box<dyn SchedulingPolicy>> {
        let policy: Box<dyn SchedulingPolicy> = match self {
            PolicyKind::Fcfs => Box::new(FirstComeFirstServed::new()),
            PolicyKind::Sjf => Box::new(ShortestJobFirst::new()),
            PolicyKind::Srtf => Box::new(ShortestJobFirst::preemptive()),
            PolicyKind::Priority { order, preemptive } => {
                Box::new(PriorityScheduler::new(*order, *preemptive))
            }
            PolicyKind::RoundRobin { quantum } => Box::new(RoundRobin::new(*quantum)?),
            PolicyKind::Dvfs(inner) => Box::new(DvfsAware::new(inner.build()?)),
        };

        Ok(policy)
    }

    /// Builds an empty engine driven by this policy
    pub fn scheduler(&self) -> Result<Scheduler> {
        Ok(Scheduler::new(self.build()?))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Fcfs => write!(f, "fcfs"),
            PolicyKind::Sjf => write!(f, "sjf"),
            PolicyKind::Srtf => write!(f, "srtf"),
            PolicyKind::Priority { order, preemptive } => {
                f.write_str("priority")?;
                if *preemptive {
                    f.write_str("-preemptive")?;
                }
                match order {
                    PriorityOrder::LowerFirst => Ok(()),
                    PriorityOrder::HigherFirst => write!(f, ":{}", order),
                }
            }
            PolicyKind::RoundRobin { quantum } => write!(f, "rr:{}", quantum),
            PolicyKind::Dvfs(inner) => write!(f, "dvfs:{}", inner),
        }
    }
}
