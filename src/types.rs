//! Newtype wrappers and type aliases for domain concepts.
//!
//! Process identifiers get a newtype so they cannot be confused with the
//! plain quantities (times, demands, bounds) that flow through the driver.
//! Those stay a bare alias: they are added and compared constantly and
//! never mixed with anything else.

use std::fmt;

use serde::Serialize;

/// Process identifier: the 0-based index of the process in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Pid(pub usize);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simulated time, also used for demands and burst lengths.
pub type SimTime = u64;

/// Number of priority levels. Static priorities are drawn from `1..=MAX_PRIO`.
pub const MAX_PRIO: u32 = 4;

/// The state change an event applies to its process when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// NEW -> READY.
    Arrived,
    /// RUNNING -> BLOCKED: the CPU burst is used up and demand remains.
    RunToBlock,
    /// RUNNING -> READY: the quantum expired before the CPU burst did.
    RunToReady,
    /// READY -> RUNNING.
    ReadyToRun,
    /// BLOCKED -> READY: the I/O burst completed.
    BlockToReady,
    /// RUNNING -> DONE.
    Finished,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (from, to) = match self {
            Transition::Arrived => ("CREATED", "READY"),
            Transition::RunToBlock => ("RUNNG", "BLOCK"),
            Transition::RunToReady => ("RUNNG", "READY"),
            Transition::ReadyToRun => ("READY", "RUNNG"),
            Transition::BlockToReady => ("BLOCK", "READY"),
            Transition::Finished => ("RUNNG", "DONE"),
        };
        write!(f, "{from}->{to}")
    }
}
