//! Report configuration from the environment.
//!
//! The report knobs are environment variables rather than CLI flags so the
//! same binaries work unchanged under a streaming framework that only passes
//! file paths: `MRS_MIN_REVIEWS`, `MRS_TOP_N`, `MRS_COUNT_ORDER`.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Which semantics the three count columns of a finalized line carry.
/// The line format itself does not say, so consumers must be told.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountOrder {
    /// `positive, negative, neutral` (the merge phase's native order).
    #[default]
    PosNegNeu,
    /// `positive, neutral, negative`.
    PosNeuNeg,
}

impl FromStr for CountOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pos-neg-neu" | "pos_neg_neu" => Ok(CountOrder::PosNegNeu),
            "pos-neu-neg" | "pos_neu_neg" => Ok(CountOrder::PosNeuNeg),
            other => Err(format!("unrecognized count order `{other}`")),
        }
    }
}

/// Leaderboard construction knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Movies with fewer total reviews than this never reach a board.
    pub min_reviews: u64,
    /// Rows per board.
    pub top_n: usize,
    pub count_order: CountOrder,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            min_reviews: 100,
            top_n: 3,
            count_order: CountOrder::default(),
        }
    }
}

impl ReportOptions {
    /// Read options from `MRS_*` variables, keeping defaults for anything
    /// unset. An unparseable override is ignored with a warning.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(v) = env_override("MRS_MIN_REVIEWS") {
            opts.min_reviews = v;
        }
        if let Some(v) = env_override("MRS_TOP_N") {
            opts.top_n = v;
        }
        if let Some(v) = env_override("MRS_COUNT_ORDER") {
            opts.count_order = v;
        }
        opts
    }
}

fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(%name, %raw, "ignoring unparseable override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = ReportOptions::default();
        assert_eq!(opts.min_reviews, 100);
        assert_eq!(opts.top_n, 3);
        assert_eq!(opts.count_order, CountOrder::PosNegNeu);
    }

    #[test]
    fn count_order_labels() {
        assert_eq!("pos-neg-neu".parse(), Ok(CountOrder::PosNegNeu));
        assert_eq!("POS_NEU_NEG".parse(), Ok(CountOrder::PosNeuNeg));
        assert!("neg-first".parse::<CountOrder>().is_err());
    }

    #[test]
    fn env_overrides_apply() {
        // Serialized in one test since the environment is process-global.
        env::set_var("MRS_MIN_REVIEWS", "5");
        env::set_var("MRS_TOP_N", "not a number");
        env::set_var("MRS_COUNT_ORDER", "pos-neu-neg");
        let opts = ReportOptions::from_env();
        env::remove_var("MRS_MIN_REVIEWS");
        env::remove_var("MRS_TOP_N");
        env::remove_var("MRS_COUNT_ORDER");

        assert_eq!(opts.min_reviews, 5);
        assert_eq!(opts.top_n, 3); // bad override ignored
        assert_eq!(opts.count_order, CountOrder::PosNeuNeg);
    }
}
