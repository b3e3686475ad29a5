//! A MapReduce-compatible implementation of per-movie rating statistics.
//!
//! The map side folds a whole input shard through [`LocalAggregator`] and
//! emits one pair per distinct movie: the fixed-width padded id as the key
//! and the tally's tab-delimited tail as the value. The reduce side merges a
//! key's tallies and emits the finalized CSV line. The framework's sort over
//! the padded keys is what delivers grouped input to reduce.

use crate::aggregate::{LocalAggregator, RatingTally};
use crate::merge::Finalized;
use crate::utils::{string_from_bytes, string_to_bytes};
use crate::{key, KeyValue, MapOutput};
use anyhow::Result;
use bytes::{BufMut, Bytes, BytesMut};

pub fn map(kv: KeyValue, _aux: Bytes) -> MapOutput {
    let shard = string_from_bytes(kv.value)?;
    let mut agg = LocalAggregator::new();
    for line in shard.lines() {
        agg.consume_line(line);
    }
    let partials: Vec<(u32, RatingTally)> =
        agg.partials().map(|(id, tally)| (id, *tally)).collect();

    let iter = partials.into_iter().map(|(movie_id, tally)| {
        Ok(KeyValue {
            key: string_to_bytes(key::pad(movie_id)),
            value: string_to_bytes(tally.to_tsv()),
        })
    });
    Ok(Box::new(iter))
}

pub fn reduce(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    _aux: Bytes,
) -> Result<Bytes> {
    let movie_id = key::unpad(&string_from_bytes(key)?)?;

    let mut tally = RatingTally::default();
    for value in values {
        tally.merge(&RatingTally::from_tsv(&string_from_bytes(value)?)?);
    }

    let finalized = Finalized { movie_id, tally };
    let mut writer = BytesMut::new();
    writer.put(format!("{}\n", finalized.to_line()).as_bytes());
    Ok(writer.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kv(key: &str, value: &str) -> KeyValue {
        KeyValue::new(
            Bytes::from(key.to_string()),
            Bytes::from(value.to_string()),
        )
    }

    #[test]
    fn map_folds_shard_to_one_pair_per_movie() {
        let shard = "c1,7,5\nc2,7,4\nc3,7,1\nc4,42,3\n";
        let pairs: Vec<KeyValue> = map(kv("shard-0", shard), Bytes::new())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(
            pairs,
            vec![
                kv("00007", "10\t2\t1\t0\t3"),
                kv("00042", "3\t0\t0\t1\t1"),
            ]
        );
    }

    #[test]
    fn reduce_merges_grouped_tallies() {
        let values: Vec<Bytes> = vec![
            Bytes::from("12\t3\t0\t0\t3"),
            Bytes::from("6\t1\t1\t1\t3"),
        ];
        let out = reduce(
            Bytes::from("00042"),
            Box::new(values.into_iter()),
            Bytes::new(),
        )
        .unwrap();
        assert_eq!(out, Bytes::from("42,3.00,4,1,1,6\n"));
    }
}
