//! Final report rendering.

use std::fmt;

use serde::Serialize;

use crate::engine::Outcome;
use crate::stats::Summary;
use crate::types::{Pid, SimTime};

/// One row of the per-process table.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRow {
    pub pid: Pid,
    pub arrival: SimTime,
    pub total_cpu: SimTime,
    pub cpu_burst: SimTime,
    pub io_burst: SimTime,
    pub static_prio: u32,
    pub finish: SimTime,
    pub turnaround: SimTime,
    pub io_time: SimTime,
    pub wait_time: SimTime,
}

/// The complete report of a run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub policy: &'static str,
    pub quantum: Option<SimTime>,
    pub processes: Vec<ProcessRow>,
    pub summary: Summary,
}

impl Report {
    pub fn new(outcome: &Outcome) -> Self {
        let processes = outcome
            .processes
            .iter()
            .map(|p| {
                let finish = p.finish.unwrap_or_default();
                ProcessRow {
                    pid: p.pid(),
                    arrival: p.spec.arrival,
                    total_cpu: p.spec.total_cpu,
                    cpu_burst: p.spec.cpu_burst,
                    io_burst: p.spec.io_burst,
                    static_prio: p.static_prio,
                    finish,
                    turnaround: finish.saturating_sub(p.spec.arrival),
                    io_time: p.io_time,
                    wait_time: p.wait_time,
                }
            })
            .collect();

        Report {
            policy: outcome.policy.name(),
            quantum: outcome.policy.quantum(),
            processes,
            summary: Summary::compute(&outcome.processes, &outcome.io_intervals),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantum {
            Some(q) => writeln!(f, "{} {q}", self.policy)?,
            None => writeln!(f, "{}", self.policy)?,
        }
        for row in &self.processes {
            writeln!(
                f,
                "{:04}: {:4} {:4} {:4} {:4} {:1} | {:5} {:5} {:5} {:5}",
                row.pid.0,
                row.arrival,
                row.total_cpu,
                row.cpu_burst,
                row.io_burst,
                row.static_prio,
                row.finish,
                row.turnaround,
                row.io_time,
                row.wait_time
            )?;
        }
        let s = &self.summary;
        writeln!(
            f,
            "SUM: {} {:.2} {:.2} {:.2} {:.2} {:.3}",
            s.last_finish, s.cpu_util, s.io_util, s.avg_turnaround, s.avg_wait, s.throughput
        )
    }
}
