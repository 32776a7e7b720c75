#![allow(dead_code)]

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn arb_payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    vec(any::<u8>(), 0..=max_len)
}

pub fn arb_payloads(max_records: usize, max_len: usize) -> impl Strategy<Value = Vec<Vec<u8>>> {
    vec(arb_payload(max_len), 0..=max_records)
}

/// End offset of every frame when `payloads` are encoded back to back.
pub fn frame_ends(payloads: &[Vec<u8>]) -> Vec<usize> {
    payloads
        .iter()
        .scan(0usize, |end, p| {
            *end += 16 + p.len();
            Some(*end)
        })
        .collect()
}

pub fn encode_all(payloads: &[Vec<u8>]) -> Vec<u8> {
    payloads
        .iter()
        .flat_map(|p| framecheck::encode_frame(p))
        .collect()
}
