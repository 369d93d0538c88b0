use log::debug;

use crate::error::Result;
use crate::schedulers::SchedulingPolicy;
use crate::selection::SelectionContext;
use crate::{Pid, Process};

/// One voltage / frequency operating point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DvfsLevel {
    pub voltage: f64,
    pub frequency: f64,
}

impl DvfsLevel {
    pub const LOW: DvfsLevel = DvfsLevel { voltage: 0.8, frequency: 0.6 };
    pub const NOMINAL: DvfsLevel = DvfsLevel { voltage: 1.0, frequency: 1.0 };
    pub const HIGH: DvfsLevel = DvfsLevel { voltage: 1.2, frequency: 1.3 };

    /// `voltage^2 * frequency`
    pub fn power(&self) -> f64 {
        self.voltage * self.voltage * self.frequency
    }
}

/// Energy aware wrapper around another policy
///
/// The inner policy decides who runs; this wrapper then picks the
/// operating point for the chosen process:
///
/// * with a deadline, from the slack `deadline - now - remaining`:
///   slack of at least the remaining work runs at [`DvfsLevel::LOW`],
///   non negative slack at [`DvfsLevel::NOMINAL`], a late process at
///   [`DvfsLevel::HIGH`]
/// * without one, from how many other processes are waiting:
///   none runs low, up to `busy_threshold` nominal, more than that high
pub struct DvfsAware {
    inner: Box<dyn SchedulingPolicy>,
    busy_threshold: usize,
}

impl DvfsAware {
    pub fn new(inner: Box<dyn SchedulingPolicy>) -> DvfsAware {
        DvfsAware {
            inner,
            busy_threshold: 2,
        }
    }

    fn choose_level(&self, ctx: &SelectionContext<'_>, process: &Process) -> DvfsLevel {
        if let Some(deadline) = process.deadline() {
            let slack = deadline - ctx.now() - process.remaining_time();

            return if slack >= process.remaining_time() {
                DvfsLevel::LOW
            } else if slack >= 0.0 {
                DvfsLevel::NOMINAL
            } else {
                DvfsLevel::HIGH
            };
        }

        let waiting = ctx.arrived().filter(|p| p.pid() != process.pid()).count();
        match waiting {
            0 => DvfsLevel::LOW,
            n if n <= self.busy_threshold => DvfsLevel::NOMINAL,
            _ => DvfsLevel::HIGH,
        }
    }
}

impl SchedulingPolicy for DvfsAware {
    fn name(&self) -> &'static str {
        "dvfs"
    }

    fn next_process(&mut self, ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
        let pid = match self.inner.next_process(ctx)? {
            Some(pid) => pid,
            None => return Ok(None),
        };

        let level = match ctx.process(pid) {
            Some(process) => self.choose_level(ctx, process),
            /* unknown pid, the engine rejects the selection */
            None => return Ok(Some(pid)),
        };

        debug!(
            "{} runs at {} V / {} at t={}",
            pid,
            level.voltage,
            level.frequency,
            ctx.now()
        );
        ctx.set_dvfs_parameters(pid, level.voltage, level.frequency)?;

        Ok(Some(pid))
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
