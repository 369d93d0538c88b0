use std::collections::HashMap;

use crate::error::{Result, SchedError};
use crate::{Pid, Process};

/// The engine owned process store
///
/// Processes keep their registration order, which is the implicit
/// tie-break for every policy that orders by something else first.
#[derive(Default)]
pub struct ProcessTable {
    /// Registered processes, in registration order
    slots: Vec<Process>,
    /// Position of each pid inside `slots`
    index: HashMap<Pid, usize>,
}

impl ProcessTable {
    pub fn new() -> ProcessTable {
        ProcessTable::default()
    }

    /// Appends a process, failing if its pid is already taken
    pub fn insert(&mut self, process: Process) -> Result<()> {
        let pid = process.pid();
        if self.index.contains_key(&pid) {
            return Err(SchedError::DuplicatePid(pid));
        }

        self.index.insert(pid, self.slots.len());
        self.slots.push(process);
        Ok(())
    }

    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.index.get(&pid).map(|&slot| &self.slots[slot])
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        match self.index.get(&pid) {
            Some(&slot) => self.slots.get_mut(slot),
            None => None,
        }
    }

    /// Like `get_mut`, but an unknown pid is an error
    pub fn lookup_mut(&mut self, pid: Pid) -> Result<&mut Process> {
        self.get_mut(pid).ok_or(SchedError::UnknownPid(pid))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proc(pid: usize) -> Process {
        Process::new(Pid::new(pid), 0.0, 1.0, 0).unwrap()
    }

    #[test]
    fn keeps_registration_order() {
        let mut table = ProcessTable::new();
        for pid in [3, 1, 2] {
            table.insert(proc(pid)).unwrap();
        }

        let order: Vec<usize> = table.iter().map(|p| p.pid().get()).collect();
        assert_eq!(order, vec![3, 1, 2]);
        assert_eq!(table.get(Pid::new(1)).unwrap().pid(), Pid::new(1));
    }

    #[test]
    fn duplicate_pid_is_rejected() {
        let mut table = ProcessTable::new();
        table.insert(proc(1)).unwrap();
        assert_eq!(table.insert(proc(1)), Err(SchedError::DuplicatePid(Pid::new(1))));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut table = ProcessTable::new();
        table.insert(proc(1)).unwrap();
        table.clear();
        assert_eq!(table.len(), 0);
        assert!(table.get(Pid::new(1)).is_none());
        assert!(matches!(table.lookup_mut(Pid::new(1)), Err(SchedError::UnknownPid(_))));
    }
}
