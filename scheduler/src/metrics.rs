use std::collections::BTreeMap;

use serde::Serialize;

use crate::Process;

/// Aggregate statistics over the completed processes of a run
///
/// Every field is zero until at least one process has completed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub avg_waiting_time: f64,
    pub avg_turnaround_time: f64,
    pub avg_response_time: f64,
    /// Completed processes per time unit
    pub throughput: f64,
    /// Busy share of the time until the last completion, in percent
    pub cpu_utilization: f64,
    pub total_energy_consumption: f64,
    /// Number of completed processes
    pub completed: usize,
    /// Completed processes that finished after their deadline
    pub missed_deadlines: usize,
    /// Latest completion time
    pub makespan: f64,
}

impl Metrics {
    /// Computes the metrics of `completed`
    ///
    /// * `completed` - processes that finished, in any order
    /// * `total_energy` - energy the engine accumulated over the whole run
    pub fn collect<'a, I>(completed: I, total_energy: f64) -> Metrics
    where
        I: IntoIterator<Item = &'a Process>,
    {
        let mut count = 0usize;
        let mut waiting = 0.0;
        let mut turnaround = 0.0;
        let mut response = 0.0;
        let mut burst = 0.0;
        let mut makespan: f64 = 0.0;
        let mut missed = 0usize;

        for process in completed {
            count += 1;
            waiting += process.waiting_time().unwrap_or(0.0);
            turnaround += process.turnaround_time().unwrap_or(0.0);
            response += process.response_time().unwrap_or(0.0);
            burst += process.burst_time();
            makespan = makespan.max(process.completion_time().unwrap_or(0.0));

            if process.missed_deadline() {
                missed += 1;
            }
        }

        if count == 0 {
            return Metrics::default();
        }

        let n = count as f64;
        let (throughput, cpu_utilization) = if makespan > 0.0 {
            (n / makespan, burst / makespan * 100.0)
        } else {
            (0.0, 0.0)
        };

        Metrics {
            avg_waiting_time: waiting / n,
            avg_turnaround_time: turnaround / n,
            avg_response_time: response / n,
            throughput,
            cpu_utilization,
            total_energy_consumption: total_energy,
            completed: count,
            missed_deadlines: missed,
            makespan,
        }
    }

    /// The six headline figures, keyed by name
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("avg_waiting_time", self.avg_waiting_time),
            ("avg_turnaround_time", self.avg_turnaround_time),
            ("avg_response_time", self.avg_response_time),
            ("throughput", self.throughput),
            ("cpu_utilization", self.cpu_utilization),
            ("total_energy_consumption", self.total_energy_consumption),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pid;

    fn finished(pid: usize, arrival: f64, burst: f64, start: f64, end: f64) -> Process {
        let mut process = Process::new(Pid::new(pid), arrival, burst, 0).unwrap();
        process.mark_started(start);
        process.execute(burst).unwrap();
        process.mark_completed(end).unwrap();
        process.calculate_metrics().unwrap();
        process
    }

    #[test]
    fn no_completions_means_all_zero() {
        let metrics = Metrics::collect(std::iter::empty(), 12.0);
        assert_eq!(metrics, Metrics::default());
        assert!(metrics.as_map().values().all(|value| *value == 0.0));
    }

    #[test]
    fn averages_over_completed_processes() {
        let p1 = finished(1, 0.0, 4.0, 0.0, 4.0);
        let p2 = finished(2, 1.0, 2.0, 4.0, 6.0);

        let metrics = Metrics::collect([&p1, &p2], 6.0);

        assert_eq!(metrics.avg_waiting_time, 1.5);
        assert_eq!(metrics.avg_turnaround_time, 4.5);
        assert_eq!(metrics.avg_response_time, 1.5);
        assert_eq!(metrics.cpu_utilization, 100.0);
        assert!((metrics.throughput - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(metrics.total_energy_consumption, 6.0);
        assert_eq!(metrics.completed, 2);
        assert_eq!(metrics.makespan, 6.0);
    }

    #[test]
    fn idle_gaps_lower_utilization() {
        let p1 = finished(1, 2.0, 2.0, 2.0, 4.0);
        let metrics = Metrics::collect([&p1], 2.0);
        assert_eq!(metrics.cpu_utilization, 50.0);
    }

    #[test]
    fn map_uses_the_published_keys() {
        let keys: Vec<&str> = Metrics::default().as_map().keys().copied().collect();
        assert_eq!(
            keys,
            vec![
                "avg_response_time",
                "avg_turnaround_time",
                "avg_waiting_time",
                "cpu_utilization",
                "throughput",
                "total_energy_consumption",
            ]
        );
    }
}
