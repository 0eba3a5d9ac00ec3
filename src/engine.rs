//! Event-driven simulation engine.
//!
//! This is the core of the simulator. It owns the event queue, simulated
//! clock, process registry and ready structure, and applies one transition
//! per popped event.
//!
//! Dispatch is deferred: after a transition that leaves a decision pending,
//! the engine only consults the scheduler once no other event shares the
//! current timestamp. Every simultaneous arrival, unblock and preemption is
//! therefore in the ready structure before a process is picked.
//!
//! Event times are plain `SimTime` sums; `Workload::build` rejects traces
//! whose horizon does not fit.

use std::cell::Cell;

use tracing::{debug, info, trace};

use crate::event::{Event, EventQueue};
use crate::policy::Policy;
use crate::process::{Aging, ProcState, Process, ProcessTable};
use crate::random::RandomSource;
use crate::sched::Scheduler;
use crate::stats::IoInterval;
use crate::trace::{Trace, TraceKind};
use crate::types::{Pid, SimTime, Transition, MAX_PRIO};
use crate::workload::Workload;

thread_local! {
    static SIM_CLOCK: Cell<SimTime> = const { Cell::new(0) };
    static SIM_PID: Cell<Option<Pid>> = const { Cell::new(None) };
    static SIM_PID_WIDTH: Cell<usize> = const { Cell::new(1) };
}

/// Simulated time of the event being handled on this thread.
pub fn sim_clock() -> SimTime {
    SIM_CLOCK.with(Cell::get)
}

/// Process whose event is being handled on this thread, if any.
pub fn sim_pid() -> Option<Pid> {
    SIM_PID.with(Cell::get)
}

/// Digits needed for the largest pid of the current run.
pub fn sim_pid_width() -> usize {
    SIM_PID_WIDTH.with(Cell::get)
}

pub(crate) fn set_sim_context(now: SimTime, pid: Option<Pid>) {
    SIM_CLOCK.with(|clock| clock.set(now));
    SIM_PID.with(|cur| cur.set(pid));
}

pub(crate) fn set_sim_pid_width(nr_procs: usize) {
    let width = nr_procs.saturating_sub(1).to_string().len();
    SIM_PID_WIDTH.with(|w| w.set(width));
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct Outcome {
    pub policy: Policy,
    /// Final process records, indexed by pid.
    pub processes: Vec<Process>,
    /// Every blocked period, in the order it started.
    pub io_intervals: Vec<IoInterval>,
    pub trace: Trace,
}

/// Mutable state of one run.
struct SimState {
    clock: SimTime,
    events: EventQueue,
    procs: ProcessTable,
    scheduler: Scheduler,
    rng: RandomSource,
    io_intervals: Vec<IoInterval>,
    trace: Trace,
    /// A dispatch decision is owed once the current timestamp is drained.
    call_scheduler: bool,
    cpu_busy: bool,
}

impl SimState {
    fn schedule(&mut self, time: SimTime, pid: Pid, transition: Transition) {
        self.events
            .schedule(Event::new(time, self.clock, pid, transition));
    }
}

/// The main simulator.
pub struct Simulator {
    policy: Policy,
}

impl Simulator {
    pub fn new(policy: Policy) -> Self {
        Simulator { policy }
    }

    /// Run a workload to completion and return its outcome.
    ///
    /// Static priorities are drawn from `rng` in pid order before the first
    /// event fires; every later draw is a CPU or I/O burst.
    pub fn run(&self, workload: &Workload, mut rng: RandomSource) -> Outcome {
        let procs: Vec<Process> = workload
            .processes
            .iter()
            .map(|spec| Process::new(*spec, rng.next(MAX_PRIO as u64) as u32))
            .collect();

        let mut events = EventQueue::new();
        for p in &procs {
            events.schedule(Event::new(
                p.spec.arrival,
                p.spec.arrival,
                p.pid(),
                Transition::Arrived,
            ));
        }

        set_sim_pid_width(procs.len());
        set_sim_context(0, None);
        info!(policy = %self.policy, nr_procs = procs.len(), "starting simulation");

        let mut state = SimState {
            clock: 0,
            events,
            procs: ProcessTable::new(procs),
            scheduler: Scheduler::new(self.policy),
            rng,
            io_intervals: Vec::new(),
            trace: Trace::new(),
            call_scheduler: false,
            cpu_busy: false,
        };

        // Main event loop
        while let Some(event) = state.events.pop_earliest() {
            debug_assert!(event.time >= state.clock, "event queue went backwards");
            state.clock = event.time;
            set_sim_context(state.clock, Some(event.pid));
            trace!(
                pid = event.pid.0,
                transition = %event.transition,
                created = event.created,
                "event"
            );

            match event.transition {
                Transition::Arrived => self.handle_arrived(event.pid, &mut state),
                Transition::RunToBlock => self.handle_run_to_block(event.pid, &mut state),
                Transition::RunToReady => self.handle_run_to_ready(event.pid, &mut state),
                Transition::ReadyToRun => self.handle_ready_to_run(event.pid, &mut state),
                Transition::BlockToReady => self.handle_block_to_ready(event.pid, &mut state),
                Transition::Finished => self.handle_finished(event.pid, &mut state),
            }

            debug_assert!(
                state.procs.iter().all(|p| p.dynamic_prio < p.static_prio),
                "dynamic priority out of range"
            );

            if state.call_scheduler {
                if state.events.peek_time() == Some(state.clock) {
                    continue;
                }
                state.call_scheduler = false;
                if !state.cpu_busy {
                    self.try_dispatch(&mut state);
                }
            }
        }

        set_sim_context(state.clock, None);
        assert!(
            state.procs.all_done(),
            "event queue drained with unfinished processes"
        );
        assert!(state.scheduler.is_empty(), "ready structure not drained");
        info!(
            last_finish = state.clock,
            nr_dispatches = state.trace.dispatches().len(),
            "simulation complete"
        );

        Outcome {
            policy: self.policy,
            processes: state.procs.into_vec(),
            io_intervals: state.io_intervals,
            trace: state.trace,
        }
    }

    /// Pick the next process, if any, and dispatch it at the current time.
    fn try_dispatch(&self, state: &mut SimState) {
        match state.scheduler.dispatch_next() {
            Some(pid) => {
                debug!(pid = pid.0, queued = state.scheduler.len(), "dispatch");
                state.schedule(state.clock, pid, Transition::ReadyToRun);
            }
            None => debug!("cpu idle"),
        }
    }

    /// NEW -> READY.
    fn handle_arrived(&self, pid: Pid, state: &mut SimState) {
        let now = state.clock;
        let proc = state.procs.get_mut(pid);
        let in_state = proc.make_ready(now);
        state.trace.record(now, pid, in_state, TraceKind::Created);
        debug!(pid = pid.0, prio = proc.static_prio, "arrived");

        state.scheduler.enqueue_ready(proc);
        state.call_scheduler = true;
    }

    /// RUNNING -> BLOCKED: sample an I/O burst and schedule its end.
    fn handle_run_to_block(&self, pid: Pid, state: &mut SimState) {
        let now = state.clock;
        let proc = state.procs.get_mut(pid);
        let io_burst = state.rng.next(proc.spec.io_burst);
        let in_state = proc.enter(ProcState::Blocked, now);
        proc.io_time += io_burst;
        let remaining = proc.remaining;
        state.trace.record(
            now,
            pid,
            in_state,
            TraceKind::Blocked {
                io_burst,
                remaining,
            },
        );
        debug!(pid = pid.0, io_burst, remaining, "block");

        state.io_intervals.push(IoInterval::new(now, now + io_burst));
        state.schedule(now + io_burst, pid, Transition::BlockToReady);
        state.call_scheduler = true;
        state.cpu_busy = false;
    }

    /// RUNNING -> READY: the quantum expired with burst and demand left.
    fn handle_run_to_ready(&self, pid: Pid, state: &mut SimState) {
        let now = state.clock;
        let proc = state.procs.get_mut(pid);
        let in_state = proc.make_ready(now);
        state.trace.record(
            now,
            pid,
            in_state,
            TraceKind::Preempted {
                cpu_burst: proc.burst_left,
                remaining: proc.remaining,
                prio: proc.dynamic_prio,
            },
        );

        if self.policy.ages_priority() && proc.age() == Aging::Expired {
            debug!(pid = pid.0, prio = proc.dynamic_prio, "preempt, expired");
            state.scheduler.requeue_expired(proc);
        } else {
            debug!(pid = pid.0, prio = proc.dynamic_prio, "preempt");
            state.scheduler.enqueue_ready(proc);
        }
        state.call_scheduler = true;
        state.cpu_busy = false;
    }

    /// READY -> RUNNING: size the slice and schedule how it ends.
    ///
    /// The slice is bounded by the CPU burst and, for quantum policies, by
    /// the quantum. A quantum policy keeps an unfinished burst across
    /// preemptions and only samples a new one once it is used up; the other
    /// policies sample a fresh burst on every dispatch. The whole slice is
    /// charged against the remaining demand up front.
    fn handle_ready_to_run(&self, pid: Pid, state: &mut SimState) {
        let now = state.clock;
        let quantum = state.scheduler.quantum();
        let proc = state.procs.get_mut(pid);

        proc.wait_time += now - proc.last_ready;
        let in_state = proc.enter(ProcState::Running, now);
        state.cpu_busy = true;

        if quantum.is_none() || proc.burst_left == 0 {
            proc.burst_left = state.rng.next(proc.spec.cpu_burst);
        }
        let burst = proc.burst_left;
        let slice = quantum.map_or(burst, |q| q.min(burst));
        let remaining = proc.remaining;
        let prio = proc.dynamic_prio;

        let (cpu_burst, end, transition) = if remaining <= slice {
            proc.remaining = 0;
            proc.burst_left = 0;
            (remaining, now + remaining, Transition::Finished)
        } else {
            proc.remaining -= slice;
            proc.burst_left = burst - slice;
            let transition = if proc.burst_left == 0 {
                Transition::RunToBlock
            } else {
                Transition::RunToReady
            };
            (burst, now + slice, transition)
        };

        state.trace.record(
            now,
            pid,
            in_state,
            TraceKind::Dispatched {
                cpu_burst,
                remaining,
                prio,
            },
        );
        debug!(pid = pid.0, burst, slice, remaining, %transition, "run");

        state.schedule(end, pid, transition);
    }

    /// BLOCKED -> READY: I/O done, priority restored.
    fn handle_block_to_ready(&self, pid: Pid, state: &mut SimState) {
        let now = state.clock;
        let proc = state.procs.get_mut(pid);
        proc.reset_priority();
        let in_state = proc.make_ready(now);
        state.trace.record(now, pid, in_state, TraceKind::Unblocked);
        debug!(pid = pid.0, prio = proc.dynamic_prio, "unblock");

        state.scheduler.enqueue_ready(proc);
        state.call_scheduler = true;
    }

    /// RUNNING -> DONE.
    fn handle_finished(&self, pid: Pid, state: &mut SimState) {
        let now = state.clock;
        let proc = state.procs.get_mut(pid);
        let in_state = proc.finish_at(now);
        state.trace.record(now, pid, in_state, TraceKind::Done);
        debug!(pid = pid.0, turnaround = ?proc.turnaround(), "done");

        state.call_scheduler = true;
        state.cpu_busy = false;
    }
}
