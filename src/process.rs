//! Process records and the registry that owns them.
//!
//! The registry is the single authoritative copy of every process. The
//! scheduler only ever holds pids (plus the sort key it needs), so there is
//! nothing to resynchronize after a transition.

use serde::Serialize;

use crate::types::{Pid, SimTime};
use crate::workload::ProcessSpec;

/// Lifecycle state of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProcState {
    /// Loaded, arrival not processed yet.
    Created,
    /// Waiting in the scheduler's ready structure.
    Ready,
    /// Owns the CPU.
    Running,
    /// Performing I/O.
    Blocked,
    /// Finished all of its CPU demand.
    Done,
}

/// Where a preempted process goes after aging its dynamic priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aging {
    /// Still has a level left; re-enters an active bucket.
    Active,
    /// Dropped below 0; reset and parked until the active set drains.
    Expired,
}

/// A simulated process: trace parameters plus mutable simulation state.
#[derive(Debug, Clone)]
pub struct Process {
    pub spec: ProcessSpec,
    pub state: ProcState,
    /// CPU demand not yet charged to a dispatch.
    pub remaining: SimTime,
    /// CPU burst left over from a quantum-limited dispatch (RR/PRIO only).
    pub burst_left: SimTime,
    pub static_prio: u32,
    pub dynamic_prio: u32,
    /// When the process last entered the ready state.
    pub last_ready: SimTime,
    /// Total time spent blocked.
    pub io_time: SimTime,
    /// Total time spent ready but not running.
    pub wait_time: SimTime,
    /// When the process entered its current state.
    pub state_since: SimTime,
    pub finish: Option<SimTime>,
}

impl Process {
    pub fn new(spec: ProcessSpec, static_prio: u32) -> Self {
        assert!(static_prio >= 1, "static priority must be at least 1");
        Process {
            spec,
            state: ProcState::Created,
            remaining: spec.total_cpu,
            burst_left: 0,
            static_prio,
            dynamic_prio: static_prio - 1,
            last_ready: spec.arrival,
            io_time: 0,
            wait_time: 0,
            state_since: spec.arrival,
            finish: None,
        }
    }

    pub fn pid(&self) -> Pid {
        self.spec.pid
    }

    /// Move to `state` at `now`, returning how long the prior state lasted.
    pub fn enter(&mut self, state: ProcState, now: SimTime) -> SimTime {
        let in_state = now - self.state_since;
        self.state = state;
        self.state_since = now;
        in_state
    }

    /// Mark the process ready at `now`.
    pub fn make_ready(&mut self, now: SimTime) -> SimTime {
        self.last_ready = now;
        self.enter(ProcState::Ready, now)
    }

    /// Restore the dynamic priority to the top of its range.
    pub fn reset_priority(&mut self) {
        self.dynamic_prio = self.static_prio - 1;
    }

    /// Apply one step of priority aging after a quantum expiry.
    pub fn age(&mut self) -> Aging {
        if self.dynamic_prio == 0 {
            self.reset_priority();
            Aging::Expired
        } else {
            self.dynamic_prio -= 1;
            Aging::Active
        }
    }

    /// Record completion. The finish time is set exactly once.
    pub fn finish_at(&mut self, now: SimTime) -> SimTime {
        assert!(self.finish.is_none(), "process {} finished twice", self.pid());
        self.finish = Some(now);
        self.enter(ProcState::Done, now)
    }

    /// Finish time minus arrival time, once finished.
    pub fn turnaround(&self) -> Option<SimTime> {
        self.finish.map(|ft| ft - self.spec.arrival)
    }
}

/// Owner of all process records, indexed by pid.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    procs: Vec<Process>,
}

impl ProcessTable {
    pub fn new(procs: Vec<Process>) -> Self {
        debug_assert!(procs.iter().enumerate().all(|(i, p)| p.pid() == Pid(i)));
        ProcessTable { procs }
    }

    pub fn get(&self, pid: Pid) -> &Process {
        &self.procs[pid.0]
    }

    pub fn get_mut(&mut self, pid: Pid) -> &mut Process {
        &mut self.procs[pid.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    /// Whether every process has reached DONE with no demand left.
    pub fn all_done(&self) -> bool {
        self.procs
            .iter()
            .all(|p| p.state == ProcState::Done && p.remaining == 0 && p.finish.is_some())
    }

    pub fn into_vec(self) -> Vec<Process> {
        self.procs
    }
}
