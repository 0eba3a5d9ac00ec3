#![allow(dead_code)]

use sched_sim::{init_tracing, Outcome, Policy, RandomSource, Report, Simulator, Workload};

/// Initialize tracing from `RUST_LOG`.
///
/// `try_init()` is idempotent: first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup_test() {
    init_tracing();
}

/// A mixed workload with overlapping I/O, late arrivals and a zero I/O bound.
pub const MIXED_TRACE: &str = "\
0 100 10 10
500 100 20 10
0 200 15 5
20 50 5 30
20 60 8 0
300 40 40 12
";

/// A cyclic draw list long enough to exercise wrap-around.
pub const MIXED_RANDOM: &[u64] = &[
    1804289383, 846930886, 1681692777, 1714636915, 1957747793, 424238335, 719885386, 1649760492,
    596516649, 1189641421, 1025202362, 1350490027, 783368690, 1102520059, 2044897763, 1967513926,
];

/// Every policy, with quanta small enough to force preemption.
pub fn all_policies() -> Vec<Policy> {
    vec![
        Policy::Fcfs,
        Policy::Lcfs,
        Policy::Sjf,
        Policy::RoundRobin { quantum: 2 },
        Policy::RoundRobin { quantum: 5 },
        Policy::Prio { quantum: 2 },
        Policy::Prio { quantum: 5 },
    ]
}

pub fn simulate(policy: Policy, trace: &str, random: &[u64]) -> Outcome {
    let workload = Workload::parse(trace).unwrap();
    let rng = RandomSource::new(random.to_vec()).unwrap();
    Simulator::new(policy).run(&workload, rng)
}

pub fn report_text(policy: Policy, trace: &str, random: &[u64]) -> String {
    Report::new(&simulate(policy, trace, random)).to_string()
}
