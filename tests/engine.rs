use sched_sim::*;

mod common;

use common::{all_policies, report_text, simulate, MIXED_RANDOM, MIXED_TRACE};

fn trace_lines(outcome: &Outcome) -> Vec<String> {
    outcome.trace.events().iter().map(|e| e.to_string()).collect()
}

/// Single process, FCFS, constant draws: five bursts of 2 with empty I/O.
#[test]
fn test_fcfs_single_process_end_to_end() {
    common::setup_test();
    let outcome = simulate(Policy::Fcfs, "0 10 4 0\n", &[1]);

    assert_eq!(outcome.processes[0].static_prio, 2);
    assert_eq!(outcome.trace.dispatch_count(Pid(0)), 5);
    assert_eq!(outcome.io_intervals.len(), 4);

    let lines = trace_lines(&outcome);
    assert_eq!(lines[0], "0 0 0: CREATED -> READY");
    assert_eq!(lines[1], "0 0 0: READY -> RUNNG cb=2 rem=10 prio=1");
    assert_eq!(lines[2], "2 0 2: RUNNG -> BLOCK  ib=0 rem=8");
    assert_eq!(lines[3], "2 0 0: BLOCK -> READY");
    assert_eq!(lines.last().unwrap(), "10 0 2: Done");

    let report = Report::new(&outcome).to_string();
    assert_eq!(
        report,
        "FCFS\n\
         0000:    0   10    4    0 2 |    10    10     0     0\n\
         SUM: 10 100.00 0.00 10.00 0.00 10.000\n"
    );
}

/// RR q=4 with a single burst of 10: preempted at 4 and 8, done at 10.
#[test]
fn test_rr_quantum_slices_one_burst() {
    common::setup_test();
    let outcome = simulate(Policy::RoundRobin { quantum: 4 }, "0 10 10 0\n", &[9]);

    assert_eq!(
        trace_lines(&outcome),
        vec![
            "0 0 0: CREATED -> READY",
            "0 0 0: READY -> RUNNG cb=10 rem=10 prio=1",
            "4 0 4: RUNNG -> READY  cb=6 rem=6 prio=1",
            "4 0 0: READY -> RUNNG cb=6 rem=6 prio=1",
            "8 0 4: RUNNG -> READY  cb=2 rem=2 prio=1",
            "8 0 0: READY -> RUNNG cb=2 rem=2 prio=1",
            "10 0 2: Done",
        ]
    );
    assert_eq!(outcome.trace.preempt_count(Pid(0)), 2);
    assert_eq!(outcome.processes[0].finish, Some(10));
    assert!(outcome.io_intervals.is_empty());
}

/// A process with static priority 1 goes to the expired set on its first
/// preemption, so a higher process that later expires is still picked first
/// after the swap.
#[test]
fn test_prio_demotes_to_expired_set() {
    common::setup_test();
    // Draws: static prio 1 for pid 0, 2 for pid 1; bursts 97 and 98.
    let outcome = simulate(Policy::Prio { quantum: 2 }, "0 4 100 0\n0 8 100 0\n", &[96, 97]);

    assert_eq!(outcome.processes[0].static_prio, 1);
    assert_eq!(outcome.processes[1].static_prio, 2);
    assert_eq!(
        outcome.trace.dispatches(),
        vec![
            (0, Pid(1)),
            (2, Pid(0)),
            (4, Pid(1)),
            (6, Pid(1)),
            (8, Pid(0)),
            (10, Pid(1)),
        ]
    );

    let pid0_preempts: Vec<u32> = outcome
        .trace
        .for_pid(Pid(0))
        .filter_map(|e| match e.kind {
            TraceKind::Preempted { prio, .. } => Some(prio),
            _ => None,
        })
        .collect();
    assert_eq!(pid0_preempts, vec![0]);

    assert_eq!(outcome.processes[0].finish, Some(10));
    assert_eq!(outcome.processes[1].finish, Some(12));
    assert_eq!(outcome.processes[0].wait_time, 6);
    assert_eq!(outcome.processes[1].wait_time, 4);
}

/// Returning from I/O restores the dynamic priority and lands in the active
/// set, so the unblocked process runs before a peer that keeps expiring.
#[test]
fn test_prio_unblock_restores_priority_into_active_set() {
    common::setup_test();
    // Draws: static prio 2 for pid 0 and 1 for pid 1, pid 0 burst 4,
    // pid 0 io 3, pid 1 burst 10, pid 0 burst 2.
    let outcome = simulate(
        Policy::Prio { quantum: 2 },
        "0 6 4 3\n4 10 10 1\n",
        &[1, 4, 3, 2, 9, 1],
    );
    assert_eq!(outcome.processes[0].static_prio, 2);
    assert_eq!(outcome.processes[1].static_prio, 1);

    let pid0: Vec<String> = outcome
        .trace
        .for_pid(Pid(0))
        .map(|e| e.to_string())
        .collect();
    assert_eq!(
        pid0,
        vec![
            "0 0 0: CREATED -> READY",
            "0 0 0: READY -> RUNNG cb=4 rem=6 prio=1",
            "2 0 2: RUNNG -> READY  cb=2 rem=4 prio=1",
            "2 0 0: READY -> RUNNG cb=2 rem=4 prio=0",
            "4 0 2: RUNNG -> BLOCK  ib=3 rem=2",
            "7 0 3: BLOCK -> READY",
            "8 0 1: READY -> RUNNG cb=2 rem=2 prio=1",
            "10 0 2: Done",
        ]
    );

    // pid 1 expires on every preemption; at 8 it goes to the expired set
    // while pid 0 waits in the active one.
    assert_eq!(
        outcome.trace.dispatches(),
        vec![
            (0, Pid(0)),
            (2, Pid(0)),
            (4, Pid(1)),
            (6, Pid(1)),
            (8, Pid(0)),
            (10, Pid(1)),
            (12, Pid(1)),
            (14, Pid(1)),
        ]
    );
    let pid1_prios: Vec<u32> = outcome
        .trace
        .for_pid(Pid(1))
        .filter_map(|e| match e.kind {
            TraceKind::Preempted { prio, .. } => Some(prio),
            _ => None,
        })
        .collect();
    assert_eq!(pid1_prios, vec![0, 0, 0, 0]);

    assert_eq!(outcome.processes[0].finish, Some(10));
    assert_eq!(outcome.processes[1].finish, Some(16));
    assert_eq!(outcome.processes[0].io_time, 3);
}

/// SJF picks by remaining demand when the CPU frees up, never mid-burst.
#[test]
fn test_sjf_runs_shortest_demand_first() {
    common::setup_test();
    let outcome = simulate(Policy::Sjf, "0 30 100 1\n0 10 100 1\n0 20 100 1\n", &[99]);

    assert_eq!(
        outcome.trace.dispatches(),
        vec![(0, Pid(1)), (10, Pid(2)), (30, Pid(0))]
    );
    let finishes: Vec<_> = outcome.processes.iter().map(|p| p.finish).collect();
    assert_eq!(finishes, vec![Some(60), Some(10), Some(30)]);
}

/// wait + io + demand accounts for the whole lifetime of every process.
#[test]
fn test_conservation_all_policies() {
    common::setup_test();
    for policy in all_policies() {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        for p in &outcome.processes {
            let finish = p.finish.expect("process did not finish");
            assert_eq!(
                p.wait_time + p.io_time + p.spec.total_cpu,
                finish - p.spec.arrival,
                "{policy}: conservation broken for pid {}",
                p.pid()
            );
        }
    }
}

#[test]
fn test_every_process_done_all_policies() {
    common::setup_test();
    for policy in all_policies() {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        for p in &outcome.processes {
            assert_eq!(p.state, ProcState::Done, "{policy}: pid {}", p.pid());
            assert_eq!(p.remaining, 0, "{policy}: pid {}", p.pid());
            assert_eq!(p.burst_left, 0, "{policy}: pid {}", p.pid());
        }
        let done = outcome
            .trace
            .events()
            .iter()
            .filter(|e| e.kind == TraceKind::Done)
            .count();
        assert_eq!(done, outcome.processes.len(), "{policy}");
    }
}

#[test]
fn test_dynamic_priority_stays_in_range() {
    common::setup_test();
    for policy in all_policies() {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        for e in outcome.trace.events() {
            let static_prio = outcome.processes[e.pid.0].static_prio;
            assert!((1..=MAX_PRIO).contains(&static_prio));
            if let TraceKind::Dispatched { prio, .. } | TraceKind::Preempted { prio, .. } = e.kind
            {
                assert!(
                    prio < static_prio,
                    "{policy}: pid {} at prio {prio} with static {static_prio}",
                    e.pid
                );
            }
        }
    }
}

#[test]
fn test_transitions_never_go_back_in_time() {
    common::setup_test();
    for policy in all_policies() {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        let times: Vec<SimTime> = outcome.trace.events().iter().map(|e| e.time).collect();
        assert!(
            times.windows(2).all(|w| w[0] <= w[1]),
            "{policy}: trace out of order"
        );
    }
}

/// Only one process runs at a time: dispatches and run-ends alternate.
#[test]
fn test_single_cpu_is_never_shared() {
    common::setup_test();
    for policy in all_policies() {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        let mut running: Option<Pid> = None;
        for e in outcome.trace.events() {
            match e.kind {
                TraceKind::Dispatched { .. } => {
                    assert_eq!(running, None, "{policy}: dispatch of {} at {}", e.pid, e.time);
                    running = Some(e.pid);
                }
                TraceKind::Preempted { .. } | TraceKind::Blocked { .. } | TraceKind::Done => {
                    assert_eq!(running, Some(e.pid), "{policy}: at {}", e.time);
                    running = None;
                }
                TraceKind::Created | TraceKind::Unblocked => {}
            }
        }
    }
}

#[test]
fn test_determinism() {
    common::setup_test();
    for policy in all_policies() {
        let a = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        let b = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        assert_eq!(trace_lines(&a), trace_lines(&b), "{policy}: traces differ");
        assert_eq!(
            report_text(policy, MIXED_TRACE, MIXED_RANDOM),
            report_text(policy, MIXED_TRACE, MIXED_RANDOM),
            "{policy}: reports differ"
        );
    }
}

/// Overlapping blocked periods are only counted once in I/O utilization.
#[test]
fn test_io_utilization_uses_merged_intervals() {
    common::setup_test();
    for policy in all_policies() {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        let raw_io: SimTime = outcome.processes.iter().map(|p| p.io_time).sum();
        let merged = merged_io_time(&outcome.io_intervals);
        assert!(merged <= raw_io, "{policy}");

        let summary = Report::new(&outcome).summary;
        let expected = merged as f64 * 100.0 / summary.last_finish as f64;
        assert!((summary.io_util - expected).abs() < 1e-9, "{policy}");
    }
}

/// The non-quantum policies never preempt.
#[test]
fn test_non_quantum_policies_never_preempt() {
    common::setup_test();
    for policy in [Policy::Fcfs, Policy::Lcfs, Policy::Sjf] {
        let outcome = simulate(policy, MIXED_TRACE, MIXED_RANDOM);
        assert!(
            outcome
                .trace
                .events()
                .iter()
                .all(|e| !matches!(e.kind, TraceKind::Preempted { .. })),
            "{policy}"
        );
    }
}
