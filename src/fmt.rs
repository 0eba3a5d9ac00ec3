//! Log formatting stamped with simulated time and the current process.

use std::fmt;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::engine::{sim_clock, sim_pid, sim_pid_width};
use crate::types::{Pid, SimTime};

/// Log line prefix: the simulated clock and, while an event is being
/// handled, the pid it belongs to, zero-padded to the widest pid of the run.
///
/// - `[      42:P03]`: event of pid 3 in a run with at least 11 processes
/// - `[       0:---]`: outside any event (start and end of a run)
pub struct FmtStamp {
    pub now: SimTime,
    pub pid: Option<Pid>,
    pub width: usize,
}

impl FmtStamp {
    /// Stamp for the event currently handled on this thread.
    pub fn current() -> Self {
        FmtStamp {
            now: sim_clock(),
            pid: sim_pid(),
            width: sim_pid_width(),
        }
    }
}

impl fmt::Display for FmtStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.width.max(1);
        match self.pid {
            Some(pid) => write!(f, "{:>8}:P{:0>w$}", self.now, pid.0),
            None => write!(f, "{:>8}:-{:-<w$}", self.now, ""),
        }
    }
}

/// Event formatter for simulator logs.
///
/// The `pid` field is dropped when it names the process already in the
/// stamp; transitions are logged through their `Display` form.
///
/// ```text
/// [      42:P3] DEBUG run burst=7 slice=5 remaining=40 transition=RUNNG->READY
/// [      42:P3] DEBUG dispatch pid=5 queued=2
/// ```
pub struct SimFormat;

impl<S, N> FormatEvent<S, N> for SimFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let stamp = FmtStamp::current();
        write!(writer, "[{stamp}] ")?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            write!(writer, "{}{level:>5}\x1b[0m ", level_color(level))?;
        } else {
            write!(writer, "{level:>5} ")?;
        }

        let mut fields = FieldCollector::new(stamp.pid);
        event.record(&mut fields);
        write!(writer, "{}", fields.message)?;
        for (key, value) in &fields.pairs {
            write!(writer, " {key}={value}")?;
        }
        writeln!(writer)
    }
}

fn level_color(level: Level) -> &'static str {
    match level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

/// Splits an event into its message and `key=value` pairs.
struct FieldCollector {
    /// Pid shown in the stamp; a matching `pid` field is redundant.
    stamped: Option<Pid>,
    message: String,
    pairs: Vec<(&'static str, String)>,
}

impl FieldCollector {
    fn new(stamped: Option<Pid>) -> Self {
        FieldCollector {
            stamped,
            message: String::new(),
            pairs: Vec::new(),
        }
    }

    fn push(&mut self, field: &Field, value: String) {
        match field.name() {
            "message" => self.message = value,
            name => self.pairs.push((name, value)),
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == "pid" && self.stamped.is_some_and(|pid| pid.0 as u64 == value) {
            return;
        }
        self.push(field, value.to_string());
    }
}

/// Install a `tracing` subscriber that filters from `RUST_LOG` and writes
/// `SimFormat` lines to stderr. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .event_format(SimFormat)
        .try_init();
}
