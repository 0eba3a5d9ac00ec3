//! Transition trace recording.
//!
//! Every transition the driver applies is recorded as a `TraceEvent` with
//! the simulated time, the process, and how long the process spent in the
//! state it just left. The `Display` impl renders the verbose trace line.

use std::fmt;

use crate::types::{Pid, SimTime};

/// A single recorded transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    /// Simulated time of the transition.
    pub time: SimTime,
    pub pid: Pid,
    /// Time spent in the state the process just left.
    pub in_state: SimTime,
    pub kind: TraceKind,
}

/// The transition recorded, with the values shown in the verbose trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceKind {
    /// The process arrived.
    Created,
    /// The process was dispatched. `cpu_burst` is the burst that bounds
    /// this slice, `remaining` the demand before the slice is charged.
    Dispatched {
        cpu_burst: SimTime,
        remaining: SimTime,
        prio: u32,
    },
    /// The quantum expired. `prio` is the dynamic priority before aging.
    Preempted {
        cpu_burst: SimTime,
        remaining: SimTime,
        prio: u32,
    },
    /// The CPU burst ended and the process started an I/O burst.
    Blocked { io_burst: SimTime, remaining: SimTime },
    /// The I/O burst completed.
    Unblocked,
    /// The process finished.
    Done,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}: ", self.time, self.pid, self.in_state)?;
        match self.kind {
            TraceKind::Created => write!(f, "CREATED -> READY"),
            TraceKind::Dispatched {
                cpu_burst,
                remaining,
                prio,
            } => write!(f, "READY -> RUNNG cb={cpu_burst} rem={remaining} prio={prio}"),
            TraceKind::Preempted {
                cpu_burst,
                remaining,
                prio,
            } => write!(f, "RUNNG -> READY  cb={cpu_burst} rem={remaining} prio={prio}"),
            TraceKind::Blocked {
                io_burst,
                remaining,
            } => write!(f, "RUNNG -> BLOCK  ib={io_burst} rem={remaining}"),
            TraceKind::Unblocked => write!(f, "BLOCK -> READY"),
            TraceKind::Done => write!(f, "Done"),
        }
    }
}

/// All transitions of one run, in the order they were applied.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, time: SimTime, pid: Pid, in_state: SimTime, kind: TraceKind) {
        self.events.push(TraceEvent {
            time,
            pid,
            in_state,
            kind,
        });
    }

    /// Get all events in the order they were applied.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Events of a single process.
    pub fn for_pid(&self, pid: Pid) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.pid == pid)
    }

    /// Count the number of times a process was dispatched.
    pub fn dispatch_count(&self, pid: Pid) -> usize {
        self.for_pid(pid)
            .filter(|e| matches!(e.kind, TraceKind::Dispatched { .. }))
            .count()
    }

    /// Count the number of quantum expiries of a process.
    pub fn preempt_count(&self, pid: Pid) -> usize {
        self.for_pid(pid)
            .filter(|e| matches!(e.kind, TraceKind::Preempted { .. }))
            .count()
    }

    /// Pids in dispatch order, with the dispatch time.
    pub fn dispatches(&self) -> Vec<(SimTime, Pid)> {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, TraceKind::Dispatched { .. }))
            .map(|e| (e.time, e.pid))
            .collect()
    }

    /// Write the verbose trace, one line per transition.
    pub fn write_to(&self, out: &mut impl std::io::Write) -> std::io::Result<()> {
        for event in &self.events {
            writeln!(out, "{event}")?;
        }
        Ok(())
    }
}
