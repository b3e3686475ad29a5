//! Map-side local aggregation.
//!
//! One [`LocalAggregator`] instance consumes a raw rating stream and folds it
//! into one [`RatingTally`] per distinct movie, so the shuffle moves one line
//! per movie instead of one line per rating. Nothing is emitted until the
//! input for this invocation is exhausted. Memory is proportional to the
//! number of distinct movie ids, not to the row count.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use anyhow::Result;
use thiserror::Error;
use tracing::debug;

use crate::key;
use crate::record::RatingRecord;

/// Additive rating statistics for one movie.
///
/// Merging is plain field-wise addition, so partial tallies can be combined
/// in any grouping and any order. Holds `positive + negative + neutral ==
/// total` as long as every folded rating is in 1..=5, which
/// [`RatingRecord::parse`] guarantees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingTally {
    pub sum: u64,
    pub positive: u64,
    pub negative: u64,
    pub neutral: u64,
    pub total: u64,
}

impl RatingTally {
    /// Fold one rating in. 4-5 is positive, 1-2 negative, 3 neutral.
    pub fn observe(&mut self, rating: u8) {
        self.sum += u64::from(rating);
        match rating {
            4 | 5 => self.positive += 1,
            1 | 2 => self.negative += 1,
            _ => self.neutral += 1,
        }
        self.total += 1;
    }

    /// Fold another tally in. Associative and commutative.
    pub fn merge(&mut self, other: &RatingTally) {
        self.sum += other.sum;
        self.positive += other.positive;
        self.negative += other.negative;
        self.neutral += other.neutral;
        self.total += other.total;
    }

    /// Mean rating, `0.0` for an empty tally.
    pub fn average(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.sum as f64 / self.total as f64
        }
    }

    /// The tab-delimited numeric tail of a partial-aggregate line:
    /// `sum\tpos\tneg\tneu\ttotal`.
    pub fn to_tsv(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.sum, self.positive, self.negative, self.neutral, self.total
        )
    }

    /// Parse the numeric tail produced by [`RatingTally::to_tsv`].
    pub fn from_tsv(tail: &str) -> Result<Self, PartialError> {
        let fields: Vec<&str> = tail.split('\t').collect();
        if fields.len() != 5 {
            return Err(PartialError::FieldCount(fields.len() + 1));
        }
        let mut nums = [0u64; 5];
        for (slot, field) in nums.iter_mut().zip(&fields) {
            *slot = field
                .trim()
                .parse()
                .map_err(|_| PartialError::BadField(field.to_string()))?;
        }
        let [sum, positive, negative, neutral, total] = nums;
        Ok(RatingTally {
            sum,
            positive,
            negative,
            neutral,
            total,
        })
    }
}

/// A partial-aggregate line that the merge phase cannot use.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartialError {
    #[error("partial line has {0} fields, expected 6")]
    FieldCount(usize),
    #[error("partial field is not an integer: `{0}`")]
    BadField(String),
    #[error(transparent)]
    Key(#[from] key::KeyError),
}

/// Encode one full partial-aggregate line: padded key plus tally tail.
pub fn encode_partial(movie_id: u32, tally: &RatingTally) -> String {
    format!("{}\t{}", key::pad(movie_id), tally.to_tsv())
}

/// Decode one full partial-aggregate line, dropping the key padding.
pub fn parse_partial(line: &str) -> Result<(u32, RatingTally), PartialError> {
    match line.split_once('\t') {
        Some((padded, tail)) => Ok((key::unpad(padded)?, RatingTally::from_tsv(tail)?)),
        None => Err(PartialError::FieldCount(1)),
    }
}

/// Per-movie accumulators for one map invocation.
#[derive(Debug, Default)]
pub struct LocalAggregator {
    stats: BTreeMap<u32, RatingTally>,
    lines: u64,
    skipped: u64,
}

impl LocalAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one raw line in. Unparseable lines (headers, short rows, bad or
    /// out-of-range numbers) are counted and dropped, never an error.
    pub fn consume_line(&mut self, line: &str) {
        self.lines += 1;
        match RatingRecord::parse(line) {
            Ok(rec) => self.stats.entry(rec.movie_id).or_default().observe(rec.rating),
            Err(_) => self.skipped += 1,
        }
    }

    /// Fold an entire raw input stream.
    pub fn fold_stream(&mut self, reader: impl BufRead) -> Result<()> {
        for line in reader.lines() {
            self.consume_line(&line?);
        }
        Ok(())
    }

    /// Emit one partial-aggregate line per distinct movie, ascending by id.
    pub fn write_partials(&self, mut writer: impl Write) -> Result<()> {
        for (movie_id, tally) in &self.stats {
            writeln!(writer, "{}", encode_partial(*movie_id, tally))?;
        }
        debug!(
            keys = self.stats.len(),
            lines = self.lines,
            skipped = self.skipped,
            "emitted partial aggregates"
        );
        Ok(())
    }

    /// Iterate the accumulated per-movie tallies, ascending by id.
    pub fn partials(&self) -> impl Iterator<Item = (u32, &RatingTally)> {
        self.stats.iter().map(|(id, tally)| (*id, tally))
    }

    pub fn distinct_keys(&self) -> usize {
        self.stats.len()
    }

    pub fn lines_seen(&self) -> u64 {
        self.lines
    }

    pub fn lines_skipped(&self) -> u64 {
        self.skipped
    }
}
