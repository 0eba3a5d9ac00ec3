//! Scheduling policy selection.

use std::fmt;
use std::str::FromStr;

use anyhow::{bail, ensure, Context, Result};

use crate::types::SimTime;

/// The five supported ready-queue disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// First come, first served.
    Fcfs,
    /// Last come, first served.
    Lcfs,
    /// Shortest remaining demand first (non-preemptive).
    Sjf,
    /// Round robin with a fixed quantum.
    RoundRobin { quantum: SimTime },
    /// Four priority levels with aging and active/expired sets.
    Prio { quantum: SimTime },
}

impl Policy {
    /// Report name, without the quantum.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Lcfs => "LCFS",
            Policy::Sjf => "SJF",
            Policy::RoundRobin { .. } => "RR",
            Policy::Prio { .. } => "PRIO",
        }
    }

    /// Time-slice bound, for the policies that have one.
    pub fn quantum(&self) -> Option<SimTime> {
        match *self {
            Policy::RoundRobin { quantum } | Policy::Prio { quantum } => Some(quantum),
            Policy::Fcfs | Policy::Lcfs | Policy::Sjf => None,
        }
    }

    /// Whether quantum expiry ages the dynamic priority.
    pub fn ages_priority(&self) -> bool {
        matches!(self, Policy::Prio { .. })
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantum() {
            Some(q) => write!(f, "{} {q}", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

impl FromStr for Policy {
    type Err = anyhow::Error;

    /// Parse a scheduler code: `F`, `L`, `S`, `R<quantum>` or `P<quantum>`.
    fn from_str(code: &str) -> Result<Self> {
        let mut chars = code.chars();
        let policy = match chars.next() {
            Some('F') if code.len() == 1 => Policy::Fcfs,
            Some('L') if code.len() == 1 => Policy::Lcfs,
            Some('S') if code.len() == 1 => Policy::Sjf,
            Some(kind @ ('R' | 'P')) => {
                let quantum: SimTime = chars
                    .as_str()
                    .parse()
                    .with_context(|| format!("invalid quantum in scheduler code {code:?}"))?;
                ensure!(quantum > 0, "quantum must be positive in scheduler code {code:?}");
                if kind == 'R' {
                    Policy::RoundRobin { quantum }
                } else {
                    Policy::Prio { quantum }
                }
            }
            _ => bail!("unknown scheduler code {code:?}; expected F, L, S, R<num> or P<num>"),
        };
        Ok(policy)
    }
}
