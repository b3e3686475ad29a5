//! Utility functions that may be helpful for implementing
//! and testing MapReduce workloads.
//!

use anyhow::Result;
use bytes::Bytes;

/// Read an entire [`Bytes`] slice into a [`String`].
///
/// Note that the entire slice will be read into the string.
/// It is the caller's responsibility to ensure the slice is
/// of the correct length. Failure to do so may result in
/// an error being returned, or the string data being incorrect.
///
/// Returns an error if the slice contains invalid UTF-8.
pub fn string_from_bytes(buf: Bytes) -> Result<String> {
    Ok(String::from_utf8(buf.as_ref().into())?)
}

/// Convert a [`String`] to [`Bytes`].
#[inline]
pub fn string_to_bytes(s: String) -> Bytes {
    Bytes::from(s)
}

/// Initialize process-wide logging for a binary.
///
/// Logs go to stderr; stdout stays clean for the data stream. `verbose`
/// widens the filter: 0 info, 1 debug, 2+ trace.
pub fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose >= 2)
        .with_writer(std::io::stderr)
        .init();
}
