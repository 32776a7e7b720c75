//! Fuzz target for record stream parsing.
//!
//! This fuzzer feeds arbitrary bytes through both the checksum-verifying
//! reader and the structural iterator, checking for panics, hangs, and
//! disagreement between the two framing paths.

#![no_main]

use framecheck::{iterate_structural, RecordReader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let mut reader = RecordReader::new("fuzz", data);
    let checked = reader.by_ref().filter(|r| r.is_ok()).count() as u64;
    let summary = reader.into_summary();
    assert_eq!(checked, summary.records_checked);
    assert!(summary.bytes_read <= data.len() as u64);

    let structural = iterate_structural(data).filter(|r| r.is_ok()).count() as u64;
    assert_eq!(checked, structural);
});
