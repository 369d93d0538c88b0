use thiserror::Error;

use crate::Pid;

/// Everything that can go wrong while building or driving a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedError {
    #[error("{pid}: arrival time must be a finite value >= 0, got {value}")]
    InvalidArrival { pid: Pid, value: f64 },

    #[error("{pid}: burst time must be a finite value > 0, got {value}")]
    InvalidBurst { pid: Pid, value: f64 },

    #[error("{pid}: deadline {deadline} is before arrival {arrival}")]
    InvalidDeadline { pid: Pid, deadline: f64, arrival: f64 },

    #[error("time interval must be a finite value > 0, got {0}")]
    InvalidTimeInterval(f64),

    #[error("{pid}: voltage and frequency must be finite values > 0, got {voltage} V / {frequency}")]
    InvalidDvfs { pid: Pid, voltage: f64, frequency: f64 },

    #[error("round robin quantum must be a finite value > 0, got {0}")]
    InvalidQuantum(f64),

    #[error("{0} is already registered")]
    DuplicatePid(Pid),

    #[error("{0} is not registered")]
    UnknownPid(Pid),

    #[error("{0} has already completed")]
    AlreadyCompleted(Pid),

    #[error("{0} has not completed yet")]
    NotCompleted(Pid),

    #[error("{0} was never dispatched")]
    NotStarted(Pid),

    #[error("simulation still running after {0} steps")]
    StepLimit(usize),

    #[error("policy `{policy}` selected {pid} at t={time}: {reason}")]
    InvalidSelection {
        policy: &'static str,
        pid: Pid,
        time: f64,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, SchedError>;
