//! Tolerant parsing of raw rating lines.
//!
//! Input is noisy real-world text: `customer_id,movie_id,rating[,...]`, with
//! an optional header row. Parsing is a best-effort contract: the caller gets
//! either a well-formed [`RatingRecord`] or a [`ParseError`] describing why
//! the line was unusable, and decides to count-and-skip.

use thiserror::Error;

/// One valid input row. Transient; consumed by the local aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRecord {
    pub customer_id: String,
    pub movie_id: u32,
    /// Always in 1..=5 after a successful parse.
    pub rating: u8,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line has {0} fields, need at least 3")]
    TooFewFields(usize),
    #[error("header row")]
    Header,
    #[error("movie_id is not an integer: `{0}`")]
    BadMovieId(String),
    #[error("rating is not an integer: `{0}`")]
    BadRating(String),
    #[error("rating {0} outside 1..=5")]
    RatingOutOfRange(i64),
}

/// Column names that mark a header row, matched case-insensitively against
/// the field in the matching position.
const HEADER_NAMES: [&str; 3] = ["customer_id", "movie_id", "rating"];

impl RatingRecord {
    /// Parse one comma-delimited line. Trailing fields beyond the third are
    /// ignored. Ratings outside 1..=5 are rejected here rather than carried
    /// as unclassifiable, so downstream counts always sum to the total.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            return Err(ParseError::TooFewFields(fields.len()));
        }
        if fields
            .iter()
            .zip(HEADER_NAMES)
            .any(|(f, name)| f.trim().eq_ignore_ascii_case(name))
        {
            return Err(ParseError::Header);
        }

        let movie_id = fields[1]
            .trim()
            .parse::<u32>()
            .map_err(|_| ParseError::BadMovieId(fields[1].trim().to_string()))?;
        let raw_rating = fields[2]
            .trim()
            .parse::<i64>()
            .map_err(|_| ParseError::BadRating(fields[2].trim().to_string()))?;
        if !(1..=5).contains(&raw_rating) {
            return Err(ParseError::RatingOutOfRange(raw_rating));
        }

        Ok(RatingRecord {
            customer_id: fields[0].trim().to_string(),
            movie_id,
            rating: raw_rating as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_row() {
        let rec = RatingRecord::parse("c1,7,5").unwrap();
        assert_eq!(
            rec,
            RatingRecord {
                customer_id: "c1".to_string(),
                movie_id: 7,
                rating: 5,
            }
        );
    }

    #[test]
    fn trailing_fields_ignored() {
        let rec = RatingRecord::parse("c9, 42 ,3,2005-09-06,extra").unwrap();
        assert_eq!(rec.movie_id, 42);
        assert_eq!(rec.rating, 3);
    }

    #[test]
    fn header_row_detected_case_insensitively() {
        assert_eq!(
            RatingRecord::parse("Customer_ID,Movie_ID,Rating"),
            Err(ParseError::Header)
        );
        // Header name only counts in its own column.
        assert!(RatingRecord::parse("rating_fan_99,7,5").is_ok());
    }

    #[test]
    fn short_and_non_numeric_rows_rejected() {
        assert_eq!(RatingRecord::parse("c1,7"), Err(ParseError::TooFewFields(2)));
        assert_eq!(RatingRecord::parse(""), Err(ParseError::TooFewFields(1)));
        assert!(matches!(
            RatingRecord::parse("c1,seven,5"),
            Err(ParseError::BadMovieId(_))
        ));
        assert!(matches!(
            RatingRecord::parse("c1,7,five"),
            Err(ParseError::BadRating(_))
        ));
    }

    #[test]
    fn out_of_range_ratings_rejected() {
        // Rejected at parse time so bucket counts always sum to the total.
        assert_eq!(
            RatingRecord::parse("c1,7,0"),
            Err(ParseError::RatingOutOfRange(0))
        );
        assert_eq!(
            RatingRecord::parse("c1,7,6"),
            Err(ParseError::RatingOutOfRange(6))
        );
        assert_eq!(
            RatingRecord::parse("c1,7,-2"),
            Err(ParseError::RatingOutOfRange(-2))
        );
    }
}
