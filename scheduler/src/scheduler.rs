use log::{debug, info, trace, warn};

use crate::error::{Result, SchedError};
use crate::gantt::{GanttChart, GanttEntry};
use crate::metrics::Metrics;
use crate::schedulers::SchedulingPolicy;
use crate::selection::SelectionContext;
use crate::table::ProcessTable;
use crate::{Collector, Pid, Process};

/// Step size used by [`Scheduler::tick`]
pub const DEFAULT_TIME_STEP: f64 = 1.0;

/// Time stepped simulation engine
///
/// Owns the processes, the clock, the timeline and the energy total.
/// Picking who runs is delegated to the injected [`SchedulingPolicy`].
///
/// A step covers the slice `[t, t + dt)`: the clock moves to `t + dt`
/// first, the policy selects for dispatch time `t`, and a process that
/// finishes during the slice is stamped complete at `t + dt`.
pub struct Scheduler {
    policy: Box<dyn SchedulingPolicy>,
    processes: ProcessTable,
    /// Process on the CPU during the last slice, cleared on completion
    current_process: Option<Pid>,
    current_time: f64,
    /// Completion log, append only
    completed_processes: Vec<Pid>,
    gantt: GanttChart,
    /// Predicted intervals recorded by policies at dispatch time
    forecasts: Vec<GanttEntry>,
    total_energy_consumption: f64,
}

impl Scheduler {
    /// Creates an empty engine driven by `policy`
    pub fn new(policy: Box<dyn SchedulingPolicy>) -> Scheduler {
        Scheduler {
            policy,
            processes: ProcessTable::new(),
            current_process: None,
            current_time: 0.0,
            completed_processes: Vec::new(),
            gantt: GanttChart::new(),
            forecasts: Vec::new(),
            total_energy_consumption: 0.0,
        }
    }

    pub fn with_policy<P: SchedulingPolicy + 'static>(policy: P) -> Scheduler {
        Scheduler::new(Box::new(policy))
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Registers one process
    pub fn add_process(&mut self, process: Process) -> Result<()> {
        debug!(
            "registered {} (arrival={}, burst={}, priority={})",
            process.pid(),
            process.arrival_time(),
            process.burst_time(),
            process.priority()
        );
        self.processes.insert(process)
    }

    /// Registers processes in iteration order, stopping at the first error
    pub fn add_processes<I>(&mut self, processes: I) -> Result<()>
    where
        I: IntoIterator<Item = Process>,
    {
        for process in processes {
            self.add_process(process)?;
        }

        Ok(())
    }

    /// Simulates one slice of `time_interval` units
    ///
    /// Returns false if no process ran, either because nothing has arrived
    /// yet or because everything is done. The clock advances in both cases.
    ///
    /// A failed step leaves the clock, the Gantt chart and the running
    /// process untouched, so the engine can be stepped again. Policy state
    /// such as ready queues may already have moved.
    pub fn step(&mut self, time_interval: f64) -> Result<bool> {
        if !time_interval.is_finite() || time_interval <= 0.0 {
            return Err(SchedError::InvalidTimeInterval(time_interval));
        }

        let slice_start = self.current_time;
        let previous = self.current_process;
        let picked = {
            let mut ctx = SelectionContext::new(
                &mut self.processes,
                &mut self.forecasts,
                slice_start,
                previous,
            );
            self.policy.next_process(&mut ctx)?
        };

        let pid = match picked {
            Some(pid) => pid,
            None => {
                trace!("t={}: cpu idle", slice_start);
                self.current_process = None;
                self.gantt.close(slice_start);
                self.current_time += time_interval;
                return Ok(false);
            }
        };

        self.check_selection(pid, slice_start)?;
        trace!("t={}: {} selected by {}", slice_start, pid, self.policy.name());

        if let Some(prev) = previous {
            if prev != pid && !self.is_finished(prev) {
                debug!("{} preempted by {} at t={}", prev, pid, slice_start);
            }
        }

        self.processes.lookup_mut(pid)?.mark_started(slice_start);
        self.gantt.switch_to(pid, slice_start);
        self.current_process = Some(pid);
        self.current_time += time_interval;

        self.execute_process(time_interval)?;
        Ok(true)
    }

    /// [`Scheduler::step`] with [`DEFAULT_TIME_STEP`]
    pub fn tick(&mut self) -> Result<bool> {
        self.step(DEFAULT_TIME_STEP)
    }

    /// Runs the current process for `time_interval` units
    ///
    /// Returns whether it completed. Does nothing and returns false when
    /// no process holds the CPU.
    pub fn execute_process(&mut self, time_interval: f64) -> Result<bool> {
        let pid = match self.current_process {
            Some(pid) => pid,
            None => return Ok(false),
        };

        let now = self.current_time;
        let process = self.processes.lookup_mut(pid)?;
        let energy = process.power() * time_interval;
        let completed = process.execute(time_interval)?;
        self.total_energy_consumption += energy;

        if completed {
            process.mark_completed(now)?;
            process.calculate_metrics()?;
            info!(
                "{} completed at t={} (waiting={}, turnaround={})",
                pid,
                now,
                process.waiting_time().unwrap_or_default(),
                process.turnaround_time().unwrap_or_default()
            );

            self.completed_processes.push(pid);
            self.current_process = None;
            self.gantt.close(now);
        }

        Ok(completed)
    }

    /// Steps until every process completed
    ///
    /// Returns the number of steps taken, or [`SchedError::StepLimit`] if
    /// `max_steps` were not enough.
    pub fn run_to_completion(&mut self, time_interval: f64, max_steps: usize) -> Result<usize> {
        let mut steps = 0;

        while !self.is_complete() {
            if steps == max_steps {
                return Err(SchedError::StepLimit(max_steps));
            }

            self.step(time_interval)?;
            steps += 1;
        }

        Ok(steps)
    }

    pub fn get_metrics(&self) -> Metrics {
        Metrics::collect(self.completed_processes(), self.total_energy_consumption)
    }

    /// True once every registered process completed, vacuously true when
    /// nothing is registered
    pub fn is_complete(&self) -> bool {
        self.processes.iter().all(Process::is_completed)
    }

    /// Back to the empty engine: no processes, clock at zero, empty logs
    pub fn reset(&mut self) {
        debug!("resetting {} scheduler", self.policy.name());

        self.processes.clear();
        self.current_process = None;
        self.current_time = 0.0;
        self.completed_processes.clear();
        self.gantt.clear();
        self.forecasts.clear();
        self.total_energy_consumption = 0.0;
        self.policy.reset();
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn current_process(&self) -> Option<&Process> {
        self.current_process.and_then(|pid| self.processes.get(pid))
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes.get(pid)
    }

    /// Every registered process, in registration order
    pub fn processes(&self) -> impl Iterator<Item = &Process> {
        self.processes.iter()
    }

    /// Completed processes, in completion order
    pub fn completed_processes(&self) -> impl Iterator<Item = &Process> {
        self.completed_processes
            .iter()
            .filter_map(|pid| self.processes.get(*pid))
    }

    /// Closed execution intervals, one per contiguous run
    pub fn gantt_chart(&self) -> &[GanttEntry] {
        self.gantt.entries()
    }

    /// Intervals predicted by the policy when it first dispatched a process
    pub fn forecast_chart(&self) -> &[GanttEntry] {
        &self.forecasts
    }

    pub fn total_energy_consumption(&self) -> f64 {
        self.total_energy_consumption
    }

    fn is_finished(&self, pid: Pid) -> bool {
        self.processes.get(pid).map_or(true, Process::is_completed)
    }

    fn check_selection(&self, pid: Pid, time: f64) -> Result<()> {
        let reason = match self.processes.get(pid) {
            None => "not registered",
            Some(process) if process.is_completed() => "already completed",
            Some(process) if !process.has_arrived(time) => "has not arrived yet",
            Some(_) => return Ok(()),
        };

        warn!("rejected selection of {} at t={}: {}", pid, time, reason);
        Err(SchedError::InvalidSelection {
            policy: self.policy.name(),
            pid,
            time,
            reason,
        })
    }
}

impl Collector for Scheduler {
    fn collect_running(&self) -> Vec<&Process> {
        self.current_process().into_iter().collect()
    }

    fn collect_ready(&self) -> Vec<&Process> {
        self.processes
            .iter()
            .filter(|p| {
                !p.is_completed()
                    && p.has_arrived(self.current_time)
                    && Some(p.pid()) != self.current_process
            })
            .collect()
    }

    fn collect_waiting(&self) -> Vec<&Process> {
        self.processes
            .iter()
            .filter(|p| !p.has_arrived(self.current_time))
            .collect()
    }

    fn collect_completed(&self) -> Vec<&Process> {
        self.completed_processes().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FirstComeFirstServed;

    /// Always picks the same pid, whatever its state
    struct Stubborn(Pid);

    impl SchedulingPolicy for Stubborn {
        fn name(&self) -> &'static str {
            "stubborn"
        }

        fn next_process(&mut self, _ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
            Ok(Some(self.0))
        }
    }

    /// Replays a fixed list of picks, one per step
    struct Scripted(Vec<Pid>);

    impl SchedulingPolicy for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn next_process(&mut self, _ctx: &mut SelectionContext<'_>) -> Result<Option<Pid>> {
            Ok(if self.0.is_empty() { None } else { Some(self.0.remove(0)) })
        }
    }

    fn proc(pid: usize, arrival: f64, burst: f64) -> Process {
        Process::new(Pid::new(pid), arrival, burst, 0).unwrap()
    }

    #[test]
    fn empty_engine_is_complete_and_idle() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());

        assert!(scheduler.is_complete());
        assert!(!scheduler.step(1.0).unwrap());
        assert_eq!(scheduler.current_time(), 1.0);
        assert_eq!(scheduler.get_metrics(), Metrics::default());
    }

    #[test]
    fn execute_process_without_current_is_a_no_op() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());
        scheduler.add_process(proc(1, 0.0, 2.0)).unwrap();

        assert!(!scheduler.execute_process(1.0).unwrap());
        assert_eq!(scheduler.process(Pid::new(1)).unwrap().remaining_time(), 2.0);
    }

    #[test]
    fn bad_step_size_leaves_the_clock_alone() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());
        assert_eq!(scheduler.step(-1.0), Err(SchedError::InvalidTimeInterval(-1.0)));
        assert!(scheduler.step(f64::NAN).is_err());
        assert_eq!(scheduler.current_time(), 0.0);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());
        let result = scheduler.add_processes(vec![proc(1, 0.0, 1.0), proc(1, 2.0, 1.0)]);

        assert_eq!(result, Err(SchedError::DuplicatePid(Pid::new(1))));
        assert_eq!(scheduler.process_count(), 1);
    }

    #[test]
    fn unknown_selection_is_rejected() {
        let mut scheduler = Scheduler::with_policy(Stubborn(Pid::new(9)));
        scheduler.add_process(proc(1, 0.0, 1.0)).unwrap();

        let err = scheduler.step(1.0).unwrap_err();
        assert!(matches!(err, SchedError::InvalidSelection { reason: "not registered", .. }));
    }

    #[test]
    fn early_selection_is_rejected() {
        let mut scheduler = Scheduler::with_policy(Stubborn(Pid::new(1)));
        scheduler.add_process(proc(1, 3.0, 1.0)).unwrap();

        let err = scheduler.step(1.0).unwrap_err();
        assert!(matches!(err, SchedError::InvalidSelection { reason: "has not arrived yet", .. }));
        assert_eq!(scheduler.process(Pid::new(1)).unwrap().start_time(), None);
    }

    #[test]
    fn rejected_selection_leaves_the_engine_resumable() {
        let (p1, p9) = (Pid::new(1), Pid::new(9));
        let mut scheduler = Scheduler::with_policy(Scripted(vec![p1, p9, p1]));
        scheduler.add_process(proc(1, 0.0, 2.0)).unwrap();

        assert!(scheduler.step(1.0).unwrap());
        assert!(scheduler.step(1.0).is_err());
        assert_eq!(scheduler.current_time(), 1.0);
        assert_eq!(scheduler.current_process().map(Process::pid), Some(p1));
        assert!(scheduler.gantt_chart().is_empty());

        assert!(scheduler.step(1.0).unwrap());
        assert_eq!(scheduler.current_time(), 2.0);
        assert!(scheduler.is_complete());
        assert_eq!(scheduler.gantt_chart(), &[GanttEntry::new(p1, 0.0, 2.0)]);
    }

    #[test]
    fn completed_selection_is_rejected() {
        let mut scheduler = Scheduler::with_policy(Stubborn(Pid::new(1)));
        scheduler.add_process(proc(1, 0.0, 1.0)).unwrap();

        assert!(scheduler.step(1.0).unwrap());
        let err = scheduler.step(1.0).unwrap_err();
        assert!(matches!(err, SchedError::InvalidSelection { reason: "already completed", .. }));
        assert_eq!(scheduler.completed_processes().count(), 1);
    }

    #[test]
    fn engine_energy_adds_interval_energy_only() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());
        scheduler.add_process(proc(1, 0.0, 3.0)).unwrap();

        scheduler.run_to_completion(1.0, 10).unwrap();

        assert_eq!(scheduler.total_energy_consumption(), 3.0);
        assert_eq!(scheduler.get_metrics().total_energy_consumption, 3.0);
    }

    #[test]
    fn step_limit_is_reported() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());
        scheduler.add_process(proc(1, 0.0, 5.0)).unwrap();

        assert_eq!(scheduler.run_to_completion(1.0, 3), Err(SchedError::StepLimit(3)));
        assert_eq!(scheduler.run_to_completion(1.0, 3), Ok(2));
    }

    #[test]
    fn collector_buckets_by_queue() {
        let mut scheduler = Scheduler::with_policy(FirstComeFirstServed::new());
        scheduler
            .add_processes(vec![proc(1, 0.0, 1.0), proc(2, 0.0, 3.0), proc(3, 0.0, 1.0), proc(4, 9.0, 1.0)])
            .unwrap();

        scheduler.step(1.0).unwrap();
        scheduler.step(1.0).unwrap();

        let pids = |procs: Vec<&Process>| procs.iter().map(|p| p.pid().get()).collect::<Vec<_>>();
        assert_eq!(pids(scheduler.collect_running()), vec![2]);
        assert_eq!(pids(scheduler.collect_ready()), vec![3]);
        assert_eq!(pids(scheduler.collect_waiting()), vec![4]);
        assert_eq!(pids(scheduler.collect_completed()), vec![1]);
        assert_eq!(pids(crate::collect_all(&scheduler)), vec![2, 3, 4, 1]);
    }
}
