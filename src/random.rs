//! Deterministic bounded "random" source.
//!
//! The simulator never uses an entropy source. Every burst length and
//! static priority comes from a preloaded list of integers consumed in
//! order, wrapping back to the start when the list is exhausted. Replaying
//! the same list therefore replays the same simulation exactly.
//!
//! The list is read from a file whose first line declares how many values
//! follow, one per line.

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};

/// Cyclic source of bounded draws.
#[derive(Debug, Clone)]
pub struct RandomSource {
    values: Vec<u64>,
    cursor: usize,
}

impl RandomSource {
    /// Build a source over `values`, starting at the first one.
    pub fn new(values: Vec<u64>) -> Result<Self> {
        ensure!(!values.is_empty(), "random source needs at least one value");
        Ok(RandomSource { values, cursor: 0 })
    }

    /// Parse the contents of a random-number file.
    ///
    /// The first non-blank line is the declared count. Exactly that many
    /// values must follow; blank lines are ignored. A short or long file is
    /// rejected rather than wrapping over partial data.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((idx, header)) = lines.next() else {
            bail!("random-number file is empty");
        };
        let count: usize = header
            .trim()
            .parse()
            .with_context(|| format!("line {}: invalid value count {:?}", idx + 1, header.trim()))?;
        ensure!(count > 0, "random-number file declares zero values");

        let values = lines
            .map(|(idx, line)| {
                line.trim()
                    .parse::<u64>()
                    .with_context(|| format!("line {}: invalid random value {:?}", idx + 1, line.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        ensure!(
            values.len() == count,
            "random-number file declares {count} values but contains {}",
            values.len()
        );

        Self::new(values)
    }

    /// Load and parse a random-number file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read random-number file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("malformed random-number file {}", path.display()))
    }

    /// Consume the next raw value, wrapping at the end of the list.
    pub fn raw(&mut self) -> u64 {
        let value = self.values[self.cursor];
        self.cursor += 1;
        if self.cursor == self.values.len() {
            self.cursor = 0;
        }
        value
    }

    /// Draw a value in `1..=bound`.
    ///
    /// A zero bound means "no burst": the draw is still consumed, and the
    /// result is 0.
    pub fn next(&mut self, bound: u64) -> u64 {
        let raw = self.raw();
        if bound == 0 {
            0
        } else {
            1 + raw % bound
        }
    }

    /// Number of values in one cycle.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false: construction rejects an empty list.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the value the next draw will consume.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
