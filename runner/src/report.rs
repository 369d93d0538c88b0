use std::fmt;

use anyhow::Result;
use sched_sim::{Collector, GanttEntry, Metrics, Pid, Process, ProcessState, Scheduler};
use serde::Serialize;

/// One line of the per process table
#[derive(Debug, Serialize)]
pub struct ProcessRow {
    pub pid: Pid,
    pub arrival: f64,
    pub burst: f64,
    pub priority: i32,
    pub state: ProcessState,
    pub start: Option<f64>,
    pub completion: Option<f64>,
    pub waiting: Option<f64>,
    pub turnaround: Option<f64>,
    pub response: Option<f64>,
    pub energy: f64,
    pub voltage: f64,
    pub frequency: f64,
    pub missed_deadline: bool,
}

impl From<&Process> for ProcessRow {
    fn from(process: &Process) -> Self {
        ProcessRow {
            pid: process.pid(),
            arrival: process.arrival_time(),
            burst: process.burst_time(),
            priority: process.priority(),
            state: process.state(),
            start: process.start_time(),
            completion: process.completion_time(),
            waiting: process.waiting_time(),
            turnaround: process.turnaround_time(),
            response: process.response_time(),
            energy: process.energy_consumption(),
            voltage: process.voltage(),
            frequency: process.frequency(),
            missed_deadline: process.missed_deadline(),
        }
    }
}

/// Final state of a run
#[derive(Debug, Serialize)]
pub struct Report {
    pub policy: String,
    pub time_step: f64,
    pub steps: usize,
    pub metrics: Metrics,
    pub gantt: Vec<GanttEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub forecast: Vec<GanttEntry>,
    pub processes: Vec<ProcessRow>,
}

impl Report {
    pub fn new(scheduler: &Scheduler, policy: String, time_step: f64, steps: usize) -> Report {
        Report {
            policy,
            time_step,
            steps,
            metrics: scheduler.get_metrics(),
            gantt: scheduler.gantt_chart().to_vec(),
            forecast: scheduler.forecast_chart().to_vec(),
            processes: scheduler.processes().map(ProcessRow::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Plain text report: process table, Gantt line and metrics
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "policy: {}  step: {}  steps: {}", self.policy, self.time_step, self.steps)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<6} {:>8} {:>8} {:>5} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
            "PID", "ARRIVAL", "BURST", "PRIO", "STATE", "START", "END", "WAIT", "TAT", "RESP", "ENERGY"
        )?;

        for row in &self.processes {
            writeln!(
                f,
                "{:<6} {:>8.2} {:>8.2} {:>5} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8.2}{}",
                row.pid.to_string(),
                row.arrival,
                row.burst,
                row.priority,
                row.state.to_string(),
                optional(row.start),
                optional(row.completion),
                optional(row.waiting),
                optional(row.turnaround),
                optional(row.response),
                row.energy,
                if row.missed_deadline { "  (late)" } else { "" }
            )?;
        }

        writeln!(f)?;
        writeln!(f, "gantt: {}", GanttLine(&self.gantt))?;
        writeln!(f)?;

        let m = &self.metrics;
        writeln!(f, "avg waiting time:     {:.2}", m.avg_waiting_time)?;
        writeln!(f, "avg turnaround time:  {:.2}", m.avg_turnaround_time)?;
        writeln!(f, "avg response time:    {:.2}", m.avg_response_time)?;
        writeln!(f, "throughput:           {:.4}", m.throughput)?;
        writeln!(f, "cpu utilization:      {:.2}%", m.cpu_utilization)?;
        writeln!(f, "total energy:         {:.2}", m.total_energy_consumption)?;
        writeln!(f, "missed deadlines:     {}", m.missed_deadlines)
    }
}

fn optional(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{:.2}", value),
        None => "-".to_owned(),
    }
}

/// `| P1 0-4 | P2 4-6 |`, with idle gaps shown as `idle`
struct GanttLine<'a>(&'a [GanttEntry]);

impl fmt::Display for GanttLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(empty)");
        }

        f.write_str("|")?;
        let mut last_end: Option<f64> = None;

        for entry in self.0 {
            if let Some(end) = last_end {
                if entry.start > end {
                    write!(f, " idle {}-{} |", end, entry.start)?;
                }
            }

            write!(f, " {} {}-{} |", entry.pid, entry.start, entry.end)?;
            last_end = Some(entry.end);
        }

        Ok(())
    }
}

pub fn render_gantt(entries: &[GanttEntry]) -> String {
    GanttLine(entries).to_string()
}

/// One line describing the run queues after a step
pub fn render_step(scheduler: &Scheduler) -> String {
    let names = |procs: Vec<&Process>| {
        procs
            .iter()
            .map(|p| p.pid().to_string())
            .collect::<Vec<_>>()
            .join(",")
    };

    format!(
        "t={:<8} running=[{}] ready=[{}] waiting=[{}] done=[{}]",
        scheduler.current_time(),
        names(scheduler.collect_running()),
        names(scheduler.collect_ready()),
        names(scheduler.collect_waiting()),
        names(scheduler.collect_completed()),
    )
}
