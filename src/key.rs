//! Fixed-width movie-id keys.
//!
//! Intermediate keys travel through the grouping step as text, and the
//! grouping step sorts lexicographically. Zero-padding every id to the same
//! width makes that text order identical to numeric order, which is what the
//! merge phase's key-boundary detection depends on. Every producer feeding
//! one merger must use the same width.

use thiserror::Error;

/// Digits in a padded key. Accommodates ids up to 99_999.
pub const KEY_WIDTH: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("key is not an integer: `{0}`")]
    NotAnInteger(String),
}

/// Zero-pad `movie_id` to [`KEY_WIDTH`] digits.
///
/// Ids wider than [`KEY_WIDTH`] digits are formatted at their natural width;
/// they still merge correctly but break the lexicographic-order guarantee,
/// so the width must be raised if such ids are expected.
#[inline]
pub fn pad(movie_id: u32) -> String {
    format!("{movie_id:0KEY_WIDTH$}")
}

/// Parse a padded key back to the movie id, dropping the zero padding.
#[inline]
pub fn unpad(key: &str) -> Result<u32, KeyError> {
    key.trim()
        .parse()
        .map_err(|_| KeyError::NotAnInteger(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_is_fixed_width() {
        assert_eq!(pad(7), "00007");
        assert_eq!(pad(0), "00000");
        assert_eq!(pad(99999), "99999");
    }

    #[test]
    fn round_trip_over_full_range() {
        for id in (0..=99999).step_by(7) {
            assert_eq!(unpad(&pad(id)), Ok(id));
        }
        assert_eq!(unpad(&pad(99999)), Ok(99999));
    }

    #[test]
    fn padded_order_matches_numeric_order() {
        let mut ids = vec![3u32, 99999, 42, 7, 12345, 0];
        let mut keys: Vec<String> = ids.iter().map(|&id| pad(id)).collect();
        ids.sort_unstable();
        keys.sort_unstable();
        let unpadded: Vec<u32> = keys.iter().map(|k| unpad(k).unwrap()).collect();
        assert_eq!(unpadded, ids);
    }

    #[test]
    fn unpad_rejects_garbage() {
        assert!(unpad("x0007").is_err());
        assert!(unpad("").is_err());
    }
}
