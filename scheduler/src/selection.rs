use log::debug;

use crate::error::{Result, SchedError};
use crate::gantt::GanttEntry;
use crate::table::ProcessTable;
use crate::{Pid, Process};

/// What a policy may see and touch while picking the next process
///
/// Every process is readable. The only writes are selection bookkeeping:
/// the first dispatch stamp, forecast intervals and the DVFS multipliers.
/// Clock, energy totals and the real timeline stay with the engine.
pub struct SelectionContext<'a> {
    table: &'a mut ProcessTable,
    forecasts: &'a mut Vec<GanttEntry>,
    now: f64,
    current: Option<Pid>,
}

impl<'a> SelectionContext<'a> {
    pub(crate) fn new(
        table: &'a mut ProcessTable,
        forecasts: &'a mut Vec<GanttEntry>,
        now: f64,
        current: Option<Pid>,
    ) -> SelectionContext<'a> {
        SelectionContext {
            table,
            forecasts,
            now,
            current,
        }
    }

    /// Dispatch time of the slice being scheduled
    pub fn now(&self) -> f64 {
        self.now
    }

    /// The process that held the CPU during the previous slice, if it
    /// still has work left
    pub fn current(&self) -> Option<&Process> {
        self.current
            .and_then(|pid| self.table.get(pid))
            .filter(|process| !process.is_completed())
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.table.get(pid)
    }

    /// Every registered process, in registration order
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.table.iter()
    }

    /// Processes that arrived by `now` and still have work left
    pub fn arrived(&self) -> impl Iterator<Item = &Process> {
        let now = self.now;
        self.table
            .iter()
            .filter(move |process| !process.is_completed() && process.has_arrived(now))
    }

    /// Stamps `start_time = now` if `pid` was never dispatched
    ///
    /// Returns true on the first dispatch.
    pub fn dispatch(&mut self, pid: Pid) -> Result<bool> {
        let now = self.now;
        let first = self.table.lookup_mut(pid)?.mark_started(now);
        if first {
            debug!("{} dispatched for the first time at t={}", pid, now);
        }

        Ok(first)
    }

    /// Records a predicted run of `pid` from `now` until `end`
    pub fn forecast(&mut self, pid: Pid, end: f64) {
        self.forecasts.push(GanttEntry::new(pid, self.now, end));
    }

    /// Sets the multipliers `pid` runs at from this slice on
    pub fn set_dvfs_parameters(&mut self, pid: Pid, voltage: f64, frequency: f64) -> Result<()> {
        let valid = |value: f64| value.is_finite() && value > 0.0;
        if !valid(voltage) || !valid(frequency) {
            return Err(SchedError::InvalidDvfs { pid, voltage, frequency });
        }

        self.table.lookup_mut(pid)?.set_dvfs_parameters(voltage, frequency);
        Ok(())
    }
}
