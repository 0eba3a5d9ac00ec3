//! Summary statistics over a finished run.
//!
//! # Metrics Computed
//!
//! - **Last finish**: the makespan every percentage is relative to
//! - **CPU utilization**: total demand over the makespan
//! - **I/O utilization**: time during which *any* process was blocked.
//!   Blocked periods of different processes overlap, so the recorded
//!   intervals are merged before summing.
//! - **Average turnaround / wait** over all processes
//! - **Throughput**: processes finished per 100 time units

use serde::Serialize;

use crate::process::Process;
use crate::types::SimTime;

/// One blocked period `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct IoInterval {
    pub begin: SimTime,
    pub end: SimTime,
}

impl IoInterval {
    pub fn new(begin: SimTime, end: SimTime) -> Self {
        debug_assert!(begin <= end);
        IoInterval { begin, end }
    }
}

/// Total time covered by the union of `intervals`.
pub fn merged_io_time(intervals: &[IoInterval]) -> SimTime {
    let mut sorted = intervals.to_vec();
    // Derived ordering: by begin, then by end.
    sorted.sort_unstable();

    let mut total = 0;
    let mut covered_until: Option<SimTime> = None;
    for iv in sorted {
        match covered_until {
            Some(end) if iv.begin < end => {
                if iv.end > end {
                    total += iv.end - end;
                    covered_until = Some(iv.end);
                }
            }
            _ => {
                total += iv.end - iv.begin;
                covered_until = Some(iv.end);
            }
        }
    }
    total
}

/// The figures of the report's `SUM:` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub last_finish: SimTime,
    pub cpu_util: f64,
    pub io_util: f64,
    pub avg_turnaround: f64,
    pub avg_wait: f64,
    pub throughput: f64,
}

impl Summary {
    /// Aggregate over finished processes and all recorded blocked periods.
    pub fn compute(procs: &[Process], io_intervals: &[IoInterval]) -> Self {
        let last_finish = procs.iter().filter_map(|p| p.finish).max().unwrap_or(0);
        let total_cpu: SimTime = procs.iter().map(|p| p.spec.total_cpu).sum();
        let total_turnaround: SimTime = procs.iter().filter_map(Process::turnaround).sum();
        let total_wait: SimTime = procs.iter().map(|p| p.wait_time).sum();
        let io_busy = merged_io_time(io_intervals);

        let percent_of_run = |value: f64| {
            if last_finish == 0 {
                0.0
            } else {
                value * 100.0 / last_finish as f64
            }
        };
        let mean = |value: SimTime| {
            if procs.is_empty() {
                0.0
            } else {
                value as f64 / procs.len() as f64
            }
        };

        Summary {
            last_finish,
            cpu_util: percent_of_run(total_cpu as f64),
            io_util: percent_of_run(io_busy as f64),
            avg_turnaround: mean(total_turnaround),
            avg_wait: mean(total_wait),
            throughput: percent_of_run(procs.len() as f64),
        }
    }
}
