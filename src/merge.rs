//! Reduce-side grouped merge.
//!
//! The merger assumes its input is grouped: every partial line for a key is
//! contiguous. That assumption is what lets it run with a single current-key
//! accumulator and O(1) memory. It is also the central correctness risk of
//! the pipeline: a key split across non-contiguous runs is finalized more
//! than once, silently, because a finalized key is never re-opened. The
//! upstream sort over fixed-width keys is what makes the assumption hold.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::debug;

use crate::aggregate::{parse_partial, RatingTally};

/// Fully merged statistics for one movie, ready for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finalized {
    pub movie_id: u32,
    pub tally: RatingTally,
}

impl Finalized {
    /// Mean rating; `0.0` when the tally is empty, never a division error.
    pub fn average(&self) -> f64 {
        self.tally.average()
    }

    /// The comma-delimited output line:
    /// `movie_id,avg,pos,neg,neu,total` with the average at two decimal
    /// places (ties round half to even, as float formatting does).
    pub fn to_line(&self) -> String {
        format!(
            "{},{:.2},{},{},{},{}",
            self.movie_id,
            self.average(),
            self.tally.positive,
            self.tally.negative,
            self.tally.neutral,
            self.tally.total
        )
    }
}

/// Single current-key accumulator over a grouped partial stream.
#[derive(Debug, Default)]
pub struct Merger {
    current: Option<(u32, RatingTally)>,
}

impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partial in. Returns the previous key's finalized record when
    /// `movie_id` opens a new group, [`None`] while the group continues.
    pub fn push(&mut self, movie_id: u32, tally: RatingTally) -> Option<Finalized> {
        match &mut self.current {
            Some((id, acc)) if *id == movie_id => {
                acc.merge(&tally);
                None
            }
            _ => {
                let finished = self.take_finalized();
                self.current = Some((movie_id, tally));
                finished
            }
        }
    }

    /// Finalize whatever group is still open. Must be called after input
    /// exhaustion or the last key is lost.
    pub fn finish(mut self) -> Option<Finalized> {
        self.take_finalized()
    }

    fn take_finalized(&mut self) -> Option<Finalized> {
        self.current
            .take()
            .map(|(movie_id, tally)| Finalized { movie_id, tally })
    }
}

/// Merge a grouped partial-aggregate stream into finalized lines.
///
/// Malformed lines (wrong field count, non-integer fields) are skipped, in
/// line with the map phase's tolerant parse. Returns `(groups_emitted,
/// lines_skipped)`.
pub fn merge_stream(reader: impl BufRead, mut writer: impl Write) -> Result<(u64, u64)> {
    let mut merger = Merger::new();
    let mut emitted = 0u64;
    let mut skipped = 0u64;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_partial(&line) {
            Ok((movie_id, tally)) => {
                if let Some(finalized) = merger.push(movie_id, tally) {
                    writeln!(writer, "{}", finalized.to_line())?;
                    emitted += 1;
                }
            }
            Err(_) => skipped += 1,
        }
    }
    if let Some(finalized) = merger.finish() {
        writeln!(writer, "{}", finalized.to_line())?;
        emitted += 1;
    }

    debug!(emitted, skipped, "merged partial aggregates");
    Ok((emitted, skipped))
}
