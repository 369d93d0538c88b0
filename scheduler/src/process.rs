use crate::common_types::COMPLETION_EPSILON;
use crate::error::{Result, SchedError};
use crate::{Pid, ProcessState};

/// One schedulable unit of work
///
/// The static demand (`arrival_time`, `burst_time`, `priority`, `deadline`)
/// is fixed at construction. The execution state is only changed through
/// [`Process::execute`], [`Process::calculate_metrics`] and the engine's
/// dispatch / completion stamps, so the timing invariants hold for every
/// process an engine hands out.
#[derive(Clone, Debug)]
pub struct Process {
    /// The pid of the process
    pid: Pid,
    /// The time when the process becomes eligible to run
    arrival_time: f64,
    /// The total CPU time the process needs
    burst_time: f64,
    /// Meaning of the value (lower or higher wins) is chosen by the policy
    priority: i32,
    /// Optional absolute completion deadline
    deadline: Option<f64>,

    /// CPU time still needed, never increases
    remaining_time: f64,
    /// Set once, on first dispatch
    start_time: Option<f64>,
    /// Set once, when `remaining_time` reaches zero
    completion_time: Option<f64>,
    is_completed: bool,

    turnaround_time: Option<f64>,
    waiting_time: Option<f64>,
    response_time: Option<f64>,

    /// Accumulated `voltage^2 * frequency * t`
    energy_consumption: f64,
    voltage: f64,
    frequency: f64,
}

impl Process {
    /// Creates a new process
    ///
    /// * `pid` - identifier, unique inside the engine it is registered to
    /// * `arrival_time` - clock value at which the process may be selected
    /// * `burst_time` - total CPU time needed
    /// * `priority` - policy defined ranking value
    pub fn new(pid: Pid, arrival_time: f64, burst_time: f64, priority: i32) -> Result<Process> {
        if !arrival_time.is_finite() || arrival_time < 0.0 {
            return Err(SchedError::InvalidArrival { pid, value: arrival_time });
        }

        if !burst_time.is_finite() || burst_time <= 0.0 {
            return Err(SchedError::InvalidBurst { pid, value: burst_time });
        }

        Ok(Process {
            pid,
            arrival_time,
            burst_time,
            priority,
            deadline: None,
            remaining_time: burst_time,
            start_time: None,
            completion_time: None,
            is_completed: false,
            turnaround_time: None,
            waiting_time: None,
            response_time: None,
            energy_consumption: 0.0,
            voltage: 1.0,
            frequency: 1.0,
        })
    }

    /// Attaches an absolute deadline, which may not precede the arrival
    pub fn with_deadline(mut self, deadline: f64) -> Result<Process> {
        if !deadline.is_finite() || deadline < self.arrival_time {
            return Err(SchedError::InvalidDeadline {
                pid: self.pid,
                deadline,
                arrival: self.arrival_time,
            });
        }

        self.deadline = Some(deadline);
        Ok(self)
    }

    /// Runs the process for `time_interval` units
    ///
    /// Accrues `voltage^2 * frequency * time_interval` energy and returns
    /// whether the process completed during this call. The remaining time
    /// is clamped at zero when the interval overshoots it.
    pub fn execute(&mut self, time_interval: f64) -> Result<bool> {
        if self.is_completed {
            return Err(SchedError::AlreadyCompleted(self.pid));
        }

        if !time_interval.is_finite() || time_interval <= 0.0 {
            return Err(SchedError::InvalidTimeInterval(time_interval));
        }

        self.remaining_time -= time_interval;
        self.energy_consumption += self.power() * time_interval;

        if self.remaining_time <= COMPLETION_EPSILON {
            self.remaining_time = 0.0;
            self.is_completed = true;
        }

        Ok(self.is_completed)
    }

    /// Fills in turnaround, waiting and response time
    ///
    /// Only valid once the process has both a start and a completion stamp.
    pub fn calculate_metrics(&mut self) -> Result<()> {
        let completion = match self.completion_time {
            Some(time) if self.is_completed => time,
            _ => return Err(SchedError::NotCompleted(self.pid)),
        };
        let start = self.start_time.ok_or(SchedError::NotStarted(self.pid))?;

        let turnaround = completion - self.arrival_time;
        self.turnaround_time = Some(turnaround);
        self.waiting_time = Some((turnaround - self.burst_time).max(0.0));
        self.response_time = Some((start - self.arrival_time).max(0.0));

        Ok(())
    }

    /// Overwrites the multipliers used by later `execute` calls
    ///
    /// No range is enforced here, policies are expected to pick sane levels.
    pub fn set_dvfs_parameters(&mut self, voltage: f64, frequency: f64) {
        self.voltage = voltage;
        self.frequency = frequency;
    }

    /// Instantaneous power draw of the simplified model
    pub fn power(&self) -> f64 {
        self.voltage * self.voltage * self.frequency
    }

    /// Stamps the first dispatch, returns true if this was it
    pub(crate) fn mark_started(&mut self, time: f64) -> bool {
        if self.start_time.is_some() {
            return false;
        }

        self.start_time = Some(time);
        true
    }

    /// Stamps the completion time, a second call leaves the first stamp alone
    pub(crate) fn mark_completed(&mut self, time: f64) -> Result<()> {
        if !self.is_completed {
            return Err(SchedError::NotCompleted(self.pid));
        }

        if self.completion_time.is_none() {
            self.completion_time = Some(time);
        }

        Ok(())
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn burst_time(&self) -> f64 {
        self.burst_time
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    pub fn remaining_time(&self) -> f64 {
        self.remaining_time
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn completion_time(&self) -> Option<f64> {
        self.completion_time
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn turnaround_time(&self) -> Option<f64> {
        self.turnaround_time
    }

    pub fn waiting_time(&self) -> Option<f64> {
        self.waiting_time
    }

    pub fn response_time(&self) -> Option<f64> {
        self.response_time
    }

    pub fn energy_consumption(&self) -> f64 {
        self.energy_consumption
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn state(&self) -> ProcessState {
        if self.is_completed {
            ProcessState::Completed
        } else if self.start_time.is_some() {
            ProcessState::Running
        } else {
            ProcessState::Pending
        }
    }

    /// Has the process arrived by `time`, within [`COMPLETION_EPSILON`]
    pub fn has_arrived(&self, time: f64) -> bool {
        self.arrival_time <= time + COMPLETION_EPSILON
    }

    /// True if the process finished after its deadline
    pub fn missed_deadline(&self) -> bool {
        match (self.deadline, self.completion_time) {
            (Some(deadline), Some(completion)) => completion > deadline + COMPLETION_EPSILON,
            _ => false,
        }
    }
}
