//! Ready-queue disciplines.
//!
//! The policy is fixed for a run, so the five disciplines form a closed
//! enum rather than a trait object. Every variant answers the same four
//! questions: where a ready process goes (`enqueue_ready`), which process
//! runs next (`dispatch_next`), where an aged-out process waits
//! (`requeue_expired`), and how long a slice may last (`quantum`).
//!
//! Queues hold pids only. Whatever a discipline needs to order its entries
//! (remaining demand, dynamic priority) is read from the process when it is
//! enqueued; a ready process does not change until it is dispatched.

use std::collections::VecDeque;

use crate::policy::Policy;
use crate::process::Process;
use crate::types::{Pid, SimTime, MAX_PRIO};

const NR_LEVELS: usize = MAX_PRIO as usize;

/// Per-level FIFO queues for one half (active or expired) of the PRIO scheduler.
#[derive(Debug, Default)]
struct PrioLevels {
    levels: [VecDeque<Pid>; NR_LEVELS],
}

impl PrioLevels {
    fn push(&mut self, pid: Pid, prio: u32) {
        assert!(
            (prio as usize) < NR_LEVELS,
            "dynamic priority {prio} out of range for pid {pid}"
        );
        self.levels[prio as usize].push_back(pid);
    }

    /// Pop the head of the highest non-empty level.
    fn pop_highest(&mut self) -> Option<Pid> {
        self.levels
            .iter_mut()
            .rev()
            .find_map(|level| level.pop_front())
    }

    fn has_ready(&self) -> bool {
        self.levels.iter().any(|level| !level.is_empty())
    }

    fn len(&self) -> usize {
        self.levels.iter().map(VecDeque::len).sum()
    }
}

/// Multilevel priority queues with an active and an expired set.
#[derive(Debug, Default)]
pub struct PrioQueues {
    active: PrioLevels,
    expired: PrioLevels,
}

impl PrioQueues {
    fn dispatch(&mut self) -> Option<Pid> {
        if !self.active.has_ready() {
            std::mem::swap(&mut self.active, &mut self.expired);
        }
        self.active.pop_highest()
    }

    /// Number of processes in the active set.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Number of processes waiting in the expired set.
    pub fn expired_len(&self) -> usize {
        self.expired.len()
    }
}

/// The ready structure of the selected policy.
#[derive(Debug)]
pub enum Scheduler {
    Fcfs(VecDeque<Pid>),
    Lcfs(Vec<Pid>),
    /// Unordered; each entry carries the remaining demand at enqueue time.
    Sjf(Vec<(Pid, SimTime)>),
    RoundRobin {
        ready: VecDeque<Pid>,
        quantum: SimTime,
    },
    Prio {
        queues: PrioQueues,
        quantum: SimTime,
    },
}

impl Scheduler {
    pub fn new(policy: Policy) -> Self {
        match policy {
            Policy::Fcfs => Scheduler::Fcfs(VecDeque::new()),
            Policy::Lcfs => Scheduler::Lcfs(Vec::new()),
            Policy::Sjf => Scheduler::Sjf(Vec::new()),
            Policy::RoundRobin { quantum } => Scheduler::RoundRobin {
                ready: VecDeque::new(),
                quantum,
            },
            Policy::Prio { quantum } => Scheduler::Prio {
                queues: PrioQueues::default(),
                quantum,
            },
        }
    }

    pub fn policy(&self) -> Policy {
        match *self {
            Scheduler::Fcfs(_) => Policy::Fcfs,
            Scheduler::Lcfs(_) => Policy::Lcfs,
            Scheduler::Sjf(_) => Policy::Sjf,
            Scheduler::RoundRobin { quantum, .. } => Policy::RoundRobin { quantum },
            Scheduler::Prio { quantum, .. } => Policy::Prio { quantum },
        }
    }

    /// Place a READY process into the ready structure.
    pub fn enqueue_ready(&mut self, proc: &Process) {
        let pid = proc.pid();
        match self {
            Scheduler::Fcfs(ready) | Scheduler::RoundRobin { ready, .. } => ready.push_back(pid),
            Scheduler::Lcfs(stack) => stack.push(pid),
            Scheduler::Sjf(ready) => ready.push((pid, proc.remaining)),
            Scheduler::Prio { queues, .. } => queues.active.push(pid, proc.dynamic_prio),
        }
    }

    /// Remove and return the next process to run.
    pub fn dispatch_next(&mut self) -> Option<Pid> {
        match self {
            Scheduler::Fcfs(ready) | Scheduler::RoundRobin { ready, .. } => ready.pop_front(),
            Scheduler::Lcfs(stack) => stack.pop(),
            Scheduler::Sjf(ready) => {
                // First occurrence of the minimum wins ties.
                let (idx, _) = ready
                    .iter()
                    .enumerate()
                    .min_by_key(|(idx, (_, remaining))| (*remaining, *idx))?;
                Some(ready.remove(idx).0)
            }
            Scheduler::Prio { queues, .. } => queues.dispatch(),
        }
    }

    /// Park a process whose dynamic priority was just reset by aging.
    ///
    /// Only PRIO keeps an expired set; the driver never calls this for the
    /// other policies, which ignore it.
    pub fn requeue_expired(&mut self, proc: &Process) {
        if let Scheduler::Prio { queues, .. } = self {
            queues.expired.push(proc.pid(), proc.dynamic_prio);
        }
    }

    /// Time-slice bound, or `None` when bursts run to completion.
    pub fn quantum(&self) -> Option<SimTime> {
        match *self {
            Scheduler::RoundRobin { quantum, .. } | Scheduler::Prio { quantum, .. } => {
                Some(quantum)
            }
            Scheduler::Fcfs(_) | Scheduler::Lcfs(_) | Scheduler::Sjf(_) => None,
        }
    }

    /// Number of processes held, including PRIO's expired set.
    pub fn len(&self) -> usize {
        match self {
            Scheduler::Fcfs(ready) | Scheduler::RoundRobin { ready, .. } => ready.len(),
            Scheduler::Lcfs(stack) => stack.len(),
            Scheduler::Sjf(ready) => ready.len(),
            Scheduler::Prio { queues, .. } => queues.active_len() + queues.expired_len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// PRIO queues, for inspection.
    pub fn prio_queues(&self) -> Option<&PrioQueues> {
        match self {
            Scheduler::Prio { queues, .. } => Some(queues),
            _ => None,
        }
    }
}
