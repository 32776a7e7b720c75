//! Criterion microbenches for framecheck checksumming and frame reading.
//!
//! Run with: `cargo bench`
//!
//! These benchmarks measure the performance of:
//! - Masked CRC-32C over a single payload
//! - Checksum-verifying validation of an in-memory record stream
//! - Structural-only scanning of the same stream

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

use framecheck::validation::validate_reader;
use framecheck::{encode_frame, iterate_structural, masked_crc32c, ValidateOptions, ValidationMode};

const RECORDS: usize = 1_000;
const PAYLOAD_LEN: usize = 4 * 1024;

/// Builds a stream of fixed-size records (outside the timed region).
fn record_stream() -> Vec<u8> {
    (0..RECORDS)
        .flat_map(|i| encode_frame(&vec![(i % 251) as u8; PAYLOAD_LEN]))
        .collect()
}

/// Benchmark the masked checksum alone.
fn bench_masked_crc(c: &mut Criterion) {
    let payload = vec![0xA5u8; PAYLOAD_LEN];
    let mut group = c.benchmark_group("checksum");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("masked_crc32c_4k", |b| {
        b.iter(|| black_box(masked_crc32c(black_box(&payload))))
    });

    group.finish();
}

/// Benchmark full validation with checksum verification.
fn bench_validate_checksums(c: &mut Criterion) {
    let stream = record_stream();
    let opts = ValidateOptions::default();
    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("checksums", |b| {
        b.iter(|| {
            let summary = validate_reader("bench", black_box(stream.as_slice()), &opts);
            black_box(summary)
        })
    });

    group.finish();
}

/// Benchmark the structural fast path (for comparison).
fn bench_validate_structural(c: &mut Criterion) {
    let stream = record_stream();
    let opts = ValidateOptions {
        mode: ValidationMode::Structural,
        ..Default::default()
    };
    let mut group = c.benchmark_group("validate");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("structural", |b| {
        b.iter(|| {
            let summary = validate_reader("bench", black_box(stream.as_slice()), &opts);
            black_box(summary)
        })
    });

    group.bench_function("iterate_structural", |b| {
        b.iter(|| {
            let frames = iterate_structural(black_box(stream.as_slice())).count();
            black_box(frames)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_masked_crc,
    bench_validate_checksums,
    bench_validate_structural,
);
criterion_main!(benches);
