use log::debug;
use serde::Serialize;

use crate::Pid;

/// One contiguous stretch of CPU time given to a process
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GanttEntry {
    pub pid: Pid,
    pub start: f64,
    pub end: f64,
}

impl GanttEntry {
    pub fn new(pid: Pid, start: f64, end: f64) -> GanttEntry {
        GanttEntry { pid, start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Execution timeline
///
/// Holds the closed intervals plus at most one open interval for the
/// process currently on the CPU. Consecutive steps of the same process
/// extend the open interval, so every entry is one contiguous run.
#[derive(Default)]
pub struct GanttChart {
    entries: Vec<GanttEntry>,
    open: Option<(Pid, f64)>,
}

impl GanttChart {
    pub fn new() -> GanttChart {
        GanttChart::default()
    }

    /// Makes `pid` the owner of the CPU from `time` on
    ///
    /// Closes the running interval of another process at `time`. Does
    /// nothing if `pid` already owns the open interval.
    pub fn switch_to(&mut self, pid: Pid, time: f64) {
        match self.open {
            Some((owner, _)) if owner == pid => (),
            Some(_) => {
                self.close(time);
                self.open = Some((pid, time));
            }
            None => self.open = Some((pid, time)),
        }
    }

    /// Closes the open interval at `time`, if there is one
    pub fn close(&mut self, time: f64) {
        if let Some((pid, start)) = self.open.take() {
            debug!("gantt: {} ran [{}, {}]", pid, start, time);
            self.entries.push(GanttEntry::new(pid, start, time));
        }
    }

    /// Closed intervals, in the order they ended
    pub fn entries(&self) -> &[GanttEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.open = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_owner_extends_the_open_interval() {
        let mut chart = GanttChart::new();
        chart.switch_to(Pid::new(1), 0.0);
        chart.switch_to(Pid::new(1), 1.0);
        chart.switch_to(Pid::new(1), 2.0);
        chart.close(3.0);

        assert_eq!(chart.entries(), &[GanttEntry::new(Pid::new(1), 0.0, 3.0)]);
    }

    #[test]
    fn switching_owner_closes_the_previous_run() {
        let mut chart = GanttChart::new();
        chart.switch_to(Pid::new(1), 0.0);
        chart.switch_to(Pid::new(2), 2.0);
        chart.switch_to(Pid::new(1), 3.0);
        chart.close(4.0);

        assert_eq!(
            chart.entries(),
            &[
                GanttEntry::new(Pid::new(1), 0.0, 2.0),
                GanttEntry::new(Pid::new(2), 2.0, 3.0),
                GanttEntry::new(Pid::new(1), 3.0, 4.0),
            ]
        );
    }

    #[test]
    fn close_without_open_interval_is_a_no_op() {
        let mut chart = GanttChart::new();
        chart.close(1.0);
        assert!(chart.entries().is_empty());
    }
}
