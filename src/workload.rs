//! Process trace definition, builder API and file loader.
//!
//! A trace file has one line per process with four whitespace-separated
//! integers: `arrival total_cpu cpu_burst io_burst`. The process id is the
//! 0-based index of the line among the non-blank lines.

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use tracing::warn;

use crate::types::{Pid, SimTime};

/// Immutable parameters of one process, as read from the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSpec {
    pub pid: Pid,
    /// When the process first becomes ready.
    pub arrival: SimTime,
    /// Total CPU time the process needs before it is done.
    pub total_cpu: SimTime,
    /// Upper bound for sampled CPU bursts.
    pub cpu_burst: SimTime,
    /// Upper bound for sampled I/O bursts.
    pub io_burst: SimTime,
}

/// A complete simulation input: the ordered list of processes.
#[derive(Debug, Clone)]
pub struct Workload {
    pub processes: Vec<ProcessSpec>,
}

/// Builder for constructing workloads in code.
pub struct WorkloadBuilder {
    processes: Vec<ProcessSpec>,
}

impl Workload {
    pub fn builder() -> WorkloadBuilder {
        WorkloadBuilder {
            processes: Vec::new(),
        }
    }

    /// Parse the contents of a process trace file.
    pub fn parse(text: &str) -> Result<Self> {
        let mut builder = Self::builder();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = line
                .split_whitespace()
                .map(|tok| {
                    tok.parse::<SimTime>()
                        .with_context(|| format!("line {}: invalid number {tok:?}", idx + 1))
                })
                .collect::<Result<Vec<_>>>()?;
            let &[arrival, total_cpu, cpu_burst, io_burst] = fields.as_slice() else {
                bail!(
                    "line {}: expected 4 fields (arrival total_cpu cpu_burst io_burst), found {}",
                    idx + 1,
                    fields.len()
                );
            };
            builder = builder.process(arrival, total_cpu, cpu_burst, io_burst);
        }
        builder.build()
    }

    /// Load and parse a process trace file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read process trace {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("malformed process trace {}", path.display()))
    }

    /// Latest time any event of this workload can fire, or `None` if it
    /// does not fit in `SimTime`.
    ///
    /// Every CPU burst is at least one unit long, so a process blocks at most
    /// `total_cpu` times for at most `io_burst` each. After the last arrival
    /// the CPU is either running a process or every unfinished process is
    /// blocked.
    pub fn horizon(&self) -> Option<SimTime> {
        let last_arrival = self.processes.iter().map(|p| p.arrival).max()?;
        self.processes.iter().try_fold(last_arrival, |acc, p| {
            let busy = p.total_cpu.checked_mul(p.io_burst.checked_add(1)?)?;
            acc.checked_add(busy)
        })
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl WorkloadBuilder {
    /// Append a process; its pid is its position in the workload.
    pub fn process(
        mut self,
        arrival: SimTime,
        total_cpu: SimTime,
        cpu_burst: SimTime,
        io_burst: SimTime,
    ) -> Self {
        let pid = Pid(self.processes.len());
        self.processes.push(ProcessSpec {
            pid,
            arrival,
            total_cpu,
            cpu_burst,
            io_burst,
        });
        self
    }

    /// Validate and build the workload.
    pub fn build(self) -> Result<Workload> {
        ensure!(!self.processes.is_empty(), "process trace is empty");
        for spec in &self.processes {
            ensure!(
                spec.total_cpu == 0 || spec.cpu_burst > 0,
                "process {}: cpu burst bound is 0 but {} units of cpu time are needed",
                spec.pid,
                spec.total_cpu
            );
            if spec.io_burst == 0 {
                warn!(pid = spec.pid.0, "io burst bound is 0, blocked periods will be empty");
            }
        }
        let workload = Workload {
            processes: self.processes,
        };
        // Per-process totals (turnaround, wait) are summed over the whole
        // trace, so the horizon has to fit once per process.
        let fits = workload
            .horizon()
            .and_then(|h| h.checked_mul(workload.len() as SimTime))
            .is_some();
        ensure!(fits, "process trace overflows the simulated clock");
        Ok(workload)
    }
}
