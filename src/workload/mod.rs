//! Converts MapReduce application names to actual application code.
//!
//! # Example
//!
//! To get the rating-statistics application:
//! ```
//! # use anyhow::Result;
//! // This is the correct import to use if you are outside the crate:
//! use mrstats::workload;
//! // Since you will be working within the `mrstats` crate,
//! // you should write `use crate::workload;` instead.
//! # fn main() -> Result<()> {
//! let stats = workload::named("rating-stats")?;
//! # Ok(())
//! # }
//! ```

use crate::Workload;
use anyhow::{bail, Result};

pub mod rating_stats;

/// Gets the [`Workload`] named `name`.
///
/// Returns [`None`] if no application with the given name was found.
pub fn try_named(name: &str) -> Option<Workload> {
    match name {
        "rating-stats" => Some(Workload {
            map_fn: rating_stats::map,
            reduce_fn: rating_stats::reduce,
        }),
        _ => None,
    }
}

/// Gets the [`Workload`] named `name`.
///
/// Returns an [`anyhow::Error`] if no application with the given name was found.
pub fn named(name: &str) -> Result<Workload> {
    match try_named(name) {
        Some(app) => Ok(app),
        None => bail!("No app named `{}` found.", name),
    }
}
