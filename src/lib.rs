//! sched_sim - Deterministic discrete-event simulator for CPU scheduling.
//!
//! Replays a trace of process arrivals and CPU/I/O burst bounds against one
//! of five ready-queue disciplines on a single simulated CPU, and reports
//! per-process and aggregate statistics. Burst lengths and priorities come
//! from a preloaded cyclic list of integers, so a run is fully determined
//! by its inputs.
//!
//! # Architecture
//!
//! - **Workload**: the process trace (arrival, demand, burst bounds)
//! - **Random source**: cyclic bounded draws for bursts and priorities
//! - **Engine**: event loop applying the six lifecycle transitions
//! - **Scheduler**: FCFS, LCFS, SJF, RR and PRIO ready structures
//! - **Stats / Report**: utilization with merged I/O intervals
//!
//! # Usage
//!
//! ```rust
//! use sched_sim::*;
//!
//! let workload = Workload::builder().process(0, 10, 4, 0).build().unwrap();
//! let rng = RandomSource::new(vec![1]).unwrap();
//!
//! let outcome = Simulator::new(Policy::Fcfs).run(&workload, rng);
//! let report = Report::new(&outcome);
//! assert_eq!(report.summary.last_finish, 10);
//! ```

pub mod engine;
pub mod event;
pub mod fmt;
pub mod policy;
pub mod process;
pub mod random;
pub mod report;
pub mod sched;
pub mod stats;
pub mod trace;
pub mod types;
pub mod workload;

// Re-export the main public types for convenience.
pub use engine::{sim_clock, sim_pid, Outcome, Simulator};
pub use event::{Event, EventQueue};
pub use fmt::{init_tracing, FmtStamp, SimFormat};
pub use policy::Policy;
pub use process::{ProcState, Process};
pub use random::RandomSource;
pub use report::Report;
pub use sched::Scheduler;
pub use stats::{merged_io_time, IoInterval, Summary};
pub use trace::{Trace, TraceEvent, TraceKind};
pub use types::{Pid, SimTime, Transition, MAX_PRIO};
pub use workload::{ProcessSpec, Workload};
