use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use regex::Regex;
use sched_sim::{Pid, PolicyKind, PriorityOrder, Process};
use serde::Deserialize;

pub const DEFAULT_MAX_STEPS: usize = 100_000;

const POLICY_PATTERN: &str =
    r"^(dvfs(:.+)?|fcfs|sjf|srtf|priority(-preemptive)?(:(lower|higher)-first)?|rr:\d+(\.\d+)?)$";

/// A scenario file
///
/// ```toml
/// [simulation]
/// policy = "rr:2"
/// time_step = 1.0
///
/// [[process]]
/// pid = 1
/// arrival = 0.0
/// burst = 4.0
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default, rename = "process")]
    pub processes: Vec<ProcessConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub policy: String,
    pub time_step: f64,
    pub priority_order: PriorityOrder,
    pub max_steps: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            policy: "fcfs".to_owned(),
            time_step: sched_sim::DEFAULT_TIME_STEP,
            priority_order: PriorityOrder::default(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessConfig {
    pub pid: usize,
    pub arrival: f64,
    pub burst: f64,
    #[serde(default)]
    pub priority: i32,
    pub deadline: Option<f64>,
    pub voltage: Option<f64>,
    pub frequency: Option<f64>,
}

impl ProcessConfig {
    /// Builds the process, validating the static demand
    pub fn build(&self) -> sched_sim::Result<Process> {
        let mut process = Process::new(Pid::new(self.pid), self.arrival, self.burst, self.priority)?;

        if let Some(deadline) = self.deadline {
            process = process.with_deadline(deadline)?;
        }

        if self.voltage.is_some() || self.frequency.is_some() {
            process.set_dvfs_parameters(self.voltage.unwrap_or(1.0), self.frequency.unwrap_or(1.0));
        }

        Ok(process)
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Scenario> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;

        Scenario::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Scenario> {
        let scenario: Scenario = toml::from_str(text)?;
        valid_policy(scenario.simulation.policy.clone()).map_err(anyhow::Error::msg)?;
        Ok(scenario)
    }
}

/// Validator for policy strings, usable directly by clap
pub fn valid_policy(value: String) -> std::result::Result<(), String> {
    let re = Regex::new(POLICY_PATTERN).map_err(|err| err.to_string())?;
    if !re.is_match(&value) {
        Err(format!(
            "Invalid policy: {}. Must be one of fcfs, sjf, srtf, priority[-preemptive][:<order>], rr:<quantum> or dvfs[:<policy>]",
            value
        ))
    } else {
        Ok(())
    }
}

/// Parses a policy string
///
/// * `spec` - e.g. `fcfs`, `rr:2.5`, `dvfs:srtf`; plain `dvfs` wraps fcfs
/// * `order` - ranking used by the priority policies, unless `spec` names
///   one itself (`priority:higher-first`)
pub fn parse_policy(spec: &str, order: PriorityOrder) -> Result<PolicyKind> {
    valid_policy(spec.to_owned()).map_err(anyhow::Error::msg)?;

    let (name, order) = match spec.strip_suffix(":higher-first") {
        Some(name) if name.starts_with("priority") => (name, PriorityOrder::HigherFirst),
        _ => match spec.strip_suffix(":lower-first") {
            Some(name) if name.starts_with("priority") => (name, PriorityOrder::LowerFirst),
            _ => (spec, order),
        },
    };

    let kind = match name {
        "fcfs" => PolicyKind::Fcfs,
        "sjf" => PolicyKind::Sjf,
        "srtf" => PolicyKind::Srtf,
        "priority" => PolicyKind::Priority { order, preemptive: false },
        "priority-preemptive" => PolicyKind::Priority { order, preemptive: true },
        "dvfs" => PolicyKind::Dvfs(Box::new(PolicyKind::Fcfs)),
        _ => {
            if let Some(inner) = spec.strip_prefix("dvfs:") {
                if inner.starts_with("dvfs") {
                    bail!("dvfs cannot wrap itself: {}", spec);
                }
                PolicyKind::Dvfs(Box::new(parse_policy(inner, order)?))
            } else if let Some(quantum) = spec.strip_prefix("rr:") {
                let quantum: f64 = quantum
                    .parse()
                    .with_context(|| format!("invalid round robin quantum in {}", spec))?;
                PolicyKind::RoundRobin { quantum }
            } else {
                bail!("unknown policy {}", spec);
            }
        }
    };

    Ok(kind)
}

/// Parses an inline process `pid,arrival,burst[,priority[,deadline]]`
pub fn parse_process(spec: &str) -> Result<ProcessConfig> {
    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 5 {
        bail!("expected pid,arrival,burst[,priority[,deadline]], got `{}`", spec);
    }

    let pid = parts[0]
        .parse()
        .with_context(|| format!("invalid pid in `{}`", spec))?;
    let arrival = parts[1]
        .parse()
        .with_context(|| format!("invalid arrival time in `{}`", spec))?;
    let burst = parts[2]
        .parse()
        .with_context(|| format!("invalid burst time in `{}`", spec))?;
    let priority = match parts.get(3) {
        Some(value) => value
            .parse()
            .with_context(|| format!("invalid priority in `{}`", spec))?,
        None => 0,
    };
    let deadline = match parts.get(4) {
        Some(value) => Some(
            value
                .parse()
                .with_context(|| format!("invalid deadline in `{}`", spec))?,
        ),
        None => None,
    };

    Ok(ProcessConfig {
        pid,
        arrival,
        burst,
        priority,
        deadline,
        voltage: None,
        frequency: None,
    })
}

/// Everything a run needs, after merging the scenario file and the flags
#[derive(Debug)]
pub struct Settings {
    pub policy: PolicyKind,
    pub time_step: f64,
    pub max_steps: usize,
    pub processes: Vec<Process>,
}

/// Command line values that override the scenario file
#[derive(Debug, Default)]
pub struct Overrides {
    pub policy: Option<String>,
    pub priority_order: Option<PriorityOrder>,
    pub time_step: Option<f64>,
    pub max_steps: Option<usize>,
    pub processes: Vec<ProcessConfig>,
}

impl Settings {
    pub fn resolve(scenario: Scenario, overrides: Overrides) -> Result<Settings> {
        let sim = scenario.simulation;
        let order = overrides.priority_order.unwrap_or(sim.priority_order);
        let policy_spec = overrides.policy.unwrap_or(sim.policy);
        let policy = parse_policy(&policy_spec, order)?;

        let time_step = overrides.time_step.unwrap_or(sim.time_step);
        if !time_step.is_finite() || time_step <= 0.0 {
            bail!("time step must be a positive number, got {}", time_step);
        }

        let mut configs = scenario.processes;
        configs.extend(overrides.processes);
        if configs.is_empty() {
            bail!("no processes to simulate");
        }

        let processes = configs
            .iter()
            .map(ProcessConfig::build)
            .collect::<sched_sim::Result<Vec<_>>>()?;

        Ok(Settings {
            policy,
            time_step,
            max_steps: overrides.max_steps.unwrap_or(sim.max_steps),
            processes,
        })
    }
}
