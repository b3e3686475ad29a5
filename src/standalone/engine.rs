//! Single-process MapReduce engine.
//!
//! This is the in-crate stand-in for an external framework's shuffle: map
//! every input shard, bucket intermediate pairs by key hash, then sort each
//! bucket so all pairs for a key are contiguous before reduce sees them.

use anyhow::Result;
use bytes::Bytes;
use dashmap::DashMap;
use glob::glob;
use itertools::Itertools;
use std::{
    fs::{self, File},
    io::{Read, Write},
};
use tracing::info;

use crate::standalone::Job;
use crate::*;

// types related to this engine
type BucketIndex = u32;
type Buckets = DashMap<BucketIndex, Vec<KeyValue>>;

pub fn perform_map(job: &Job, engine: &Workload, serialized_args: &Bytes) -> Result<Buckets> {
    // Iterator going through all shards matching the input glob
    let input_files = glob(&job.input)?;
    let buckets: Buckets = Buckets::new();
    let n_reduce = job.n_reduce.max(1);
    let mut shards = 0usize;
    for pathspec in input_files.flatten() {
        let mut buf = Vec::new();
        {
            // a scope so that the file is closed right after reading
            let mut file = File::open(&pathspec)?;
            file.read_to_end(&mut buf)?;
        }
        let buf = Bytes::from(buf);
        let filename = pathspec.to_str().unwrap_or("unknown").to_string();
        // Each shard reaches the map function as <shard name, shard contents>
        let input_kv = KeyValue {
            key: Bytes::from(filename),
            value: buf,
        };
        let map_func = engine.map_fn;
        // Every pair the map function emits lands in the bucket picked by
        // its key hash, mod the reduce bucket count
        for item in map_func(input_kv, serialized_args.clone())? {
            let KeyValue { key, value } = item?;
            let bucket_no = ihash(&key) % n_reduce;

            buckets
                .entry(bucket_no)
                .or_default()
                .push(KeyValue { key, value });
        }
        shards += 1;
    }
    info!(shards, buckets = buckets.len(), "map phase complete");

    Ok(buckets)
}

pub fn perform_reduce(
    job: &Job,
    engine: &Workload,
    serialized_args: &Bytes,
    buckets: Buckets,
) -> Result<()> {
    let reduce_func = engine.reduce_fn;
    let output_dir = &job.output;
    fs::create_dir_all(output_dir)?;
    // Sorting each bucket makes every key's pairs contiguous, which is the
    // grouping contract the reduce side depends on. Fixed-width keys make
    // this byte sort identical to numeric key order.
    for (reduce_id, mut bkt) in buckets.into_iter().sorted_by_key(|(id, _)| *id) {
        let out_pathspec = format!("{}/mr-out-{}", &output_dir, reduce_id);
        let mut out_file = File::create(&out_pathspec)?;
        bkt.sort_unstable_by_key(KeyValue::key);
        // Apply the reduce function once per contiguous key group
        for (key, value_group) in &bkt.into_iter().chunk_by(KeyValue::key) {
            let iter = value_group.map(KeyValue::into_value);
            let out = reduce_func(key.clone(), Box::new(iter), serialized_args.clone())?;
            out_file.write_all(&out)?;
        }
        info!(reduce_id, out = %out_pathspec, "reduce bucket written");
    }
    Ok(())
}
