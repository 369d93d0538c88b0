use crate::Process;

/// Snapshot of the run queues, as seen at the current clock
pub trait Collector {
    // Returns the process on the CPU, if any
    fn collect_running(&self) -> Vec<&Process>;

    // Returns the arrived processes waiting for the CPU
    fn collect_ready(&self) -> Vec<&Process>;

    // Returns the processes that have not arrived yet
    fn collect_waiting(&self) -> Vec<&Process>;

    // Returns the completed processes, in completion order
    fn collect_completed(&self) -> Vec<&Process>;
}

/// Every process, grouped running, ready, waiting, completed
pub fn collect_all(scheduler: &dyn Collector) -> Vec<&Process> {
    let mut procs: Vec<&Process> = Vec::new();

    procs.extend(scheduler.collect_running());
    procs.extend(scheduler.collect_ready());
    procs.extend(scheduler.collect_waiting());
    procs.extend(scheduler.collect_completed());

    procs
}
