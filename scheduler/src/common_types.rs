use std::fmt;

use serde::{Deserialize, Serialize};

/// Remaining time at or below this value counts as zero.
///
/// Fractional step sizes (0.1, 0.25, ...) do not sum exactly in binary
/// floating point, so a process would otherwise need one extra step to
/// drain a residue like `5.5e-17`.
pub const COMPLETION_EPSILON: f64 = 1e-9;

/// Process identifier, unique inside one engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(usize);

impl Pid {
    /// Creates a new Pid object
    ///
    /// * `pid` - the numeric identifier
    pub fn new(pid: usize) -> Pid {
        Pid(pid)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// How priority values are ranked by priority based policies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityOrder {
    /// 0 beats 1 (unix nice style)
    #[default]
    LowerFirst,
    /// 1 beats 0
    HigherFirst,
}

impl PriorityOrder {
    /// Maps a priority to a key that sorts ascending in run order
    pub fn rank(&self, priority: i32) -> i64 {
        match self {
            PriorityOrder::LowerFirst => priority as i64,
            PriorityOrder::HigherFirst => -(priority as i64),
        }
    }
}

impl fmt::Display for PriorityOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityOrder::LowerFirst => f.write_str("lower-first"),
            PriorityOrder::HigherFirst => f.write_str("higher-first"),
        }
    }
}

/// Lifecycle of a process
///
/// `Pending -> Running -> Completed`. A process stays `Running` between
/// dispatches once it has been started, even while another process holds
/// the CPU.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Pending,
    Running,
    Completed,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessState::Pending => "pending",
            ProcessState::Running => "running",
            ProcessState::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_first_prefers_smaller_values() {
        let order = PriorityOrder::LowerFirst;
        assert!(order.rank(0) < order.rank(3));
        assert_eq!(order.to_string(), "lower-first");
    }

    #[test]
    fn higher_first_prefers_larger_values() {
        let order = PriorityOrder::HigherFirst;
        assert!(order.rank(5) < order.rank(1));
        assert_eq!(order.rank(1), order.rank(1));
        assert_eq!(order.to_string(), "higher-first");
    }

    #[test]
    fn pid_displays_with_prefix() {
        assert_eq!(Pid::new(7).to_string(), "P7");
    }
}
