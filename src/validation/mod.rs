//! Record file validation.
//!
//! This module drives the readers over one or more inputs:
//! - Checksum mode verifies both masked CRC-32C values of every frame
//! - Structural mode only checks that every frame is consumable
//!
//! Each input gets its own [`RunSummary`]. A truncated or unreadable input
//! ends that input's processing only; the run moves on to the next one.

mod input;
mod report;

pub use input::{expand_paths, Input};
pub use report::{RecordIssue, RunError, RunReport, RunSummary, RunTotals, ValidationMode};

use std::io::Read;

use rayon::prelude::*;

use crate::reader::{iterate_structural, RecordReader};

/// Options for validation behavior.
#[derive(Clone, Debug)]
pub struct ValidateOptions {
    /// Checksum verification or structural scan.
    pub mode: ValidationMode,
    /// Stop each input after this many parsed records.
    pub max_records: Option<u64>,
    /// Worker threads for multi-input runs (0 = one per CPU, 1 = sequential).
    pub jobs: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Checksums,
            max_records: None,
            jobs: 1,
        }
    }
}

/// Validates every input independently, returning one summary per input in
/// input order.
///
/// With `jobs != 1` inputs are spread over a rayon pool; frames within one
/// input are always read sequentially.
pub fn validate(inputs: &[Input], opts: &ValidateOptions) -> Vec<RunSummary> {
    if opts.jobs == 1 || inputs.len() < 2 {
        return inputs.iter().map(|input| validate_input(input, opts)).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(opts.jobs)
        .build()
    {
        Ok(pool) => pool.install(|| {
            inputs
                .par_iter()
                .map(|input| validate_input(input, opts))
                .collect()
        }),
        Err(err) => {
            tracing::warn!(error = %err, "cannot build worker pool, validating sequentially");
            inputs.iter().map(|input| validate_input(input, opts)).collect()
        }
    }
}

/// Validates a single input. Open failures yield an `Unreadable` summary.
pub fn validate_input(input: &Input, opts: &ValidateOptions) -> RunSummary {
    let label = input.label();
    match input.open() {
        Ok(reader) => validate_reader(label, reader, opts),
        Err(err) => {
            tracing::warn!(source = %label, error = %err, "cannot open input");
            RunSummary::unopenable(label, opts.mode, &err)
        }
    }
}

/// Validates an already-open byte stream.
pub fn validate_reader<R: Read>(
    source: impl Into<String>,
    reader: R,
    opts: &ValidateOptions,
) -> RunSummary {
    let source = source.into();
    tracing::info!(source = %source, mode = %opts.mode, "validating");

    let summary = match opts.mode {
        ValidationMode::Checksums => check_frames(source, reader, opts.max_records),
        ValidationMode::Structural => scan_frames(source, reader, opts.max_records),
    };

    tracing::info!(
        source = %summary.source,
        records = summary.records_checked,
        bad_length_crc = summary.bad_length_crc_count,
        bad_payload_crc = summary.bad_payload_crc_count,
        truncated = summary.truncated,
        "finished"
    );
    summary
}

fn limit_reached(records: u64, max_records: Option<u64>) -> bool {
    max_records.is_some_and(|max| records >= max)
}

fn check_frames<R: Read>(source: String, reader: R, max_records: Option<u64>) -> RunSummary {
    let mut reader = RecordReader::new(source, reader);
    loop {
        if limit_reached(reader.summary().records_checked, max_records) {
            let mut summary = reader.into_summary();
            summary.limited = true;
            return summary;
        }
        match reader.next_frame() {
            Some(Ok(checked)) => {
                tracing::debug!(
                    record = checked.frame.index,
                    length = checked.frame.length,
                    valid = checked.is_valid(),
                    "frame"
                );
            }
            // The reader already folded the error into its summary.
            Some(Err(_)) | None => return reader.into_summary(),
        }
    }
}

fn scan_frames<R: Read>(source: String, reader: R, max_records: Option<u64>) -> RunSummary {
    let mut summary = RunSummary::new(source, ValidationMode::Structural);
    let mut frames = iterate_structural(reader);
    loop {
        if limit_reached(summary.records_checked, max_records) {
            summary.limited = true;
            break;
        }
        match frames.next() {
            Some(Ok(frame)) => {
                tracing::debug!(record = frame.index, length = frame.length, "frame");
                summary.record_frame(&frame, None);
            }
            Some(Err(err)) => {
                summary.record_error(&err);
                break;
            }
            None => {
                summary.complete = true;
                break;
            }
        }
    }
    summary.bytes_read = frames.bytes_read();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;
    use crate::reader::ValidationOutcome;

    fn stream(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| encode_frame(format!("record-{i}").as_bytes()))
            .collect()
    }

    fn memory(name: &str, bytes: Vec<u8>) -> Input {
        Input::Memory {
            name: name.to_string(),
            bytes,
        }
    }

    #[test]
    fn test_empty_stream_is_clean() {
        let summary = validate_reader("empty", &[0u8; 0][..], &ValidateOptions::default());
        assert_eq!(summary.records_checked, 0);
        assert!(!summary.truncated);
        assert!(summary.complete);
        assert!(summary.is_clean());
    }

    #[test]
    fn test_counts_bad_payload_checksums() {
        let mut bytes = Vec::new();
        for i in 0..5u8 {
            let mut frame = encode_frame(&[i; 10]);
            if i % 2 == 0 {
                let last = frame.len() - 1;
                frame[last] ^= 0x01;
            }
            bytes.extend(frame);
        }

        let summary = validate_reader("mixed", bytes.as_slice(), &ValidateOptions::default());
        assert_eq!(summary.records_checked, 5);
        assert_eq!(summary.bad_payload_crc_count, 3);
        assert_eq!(summary.bad_length_crc_count, 0);
        assert!(summary.complete);
        assert!(!summary.is_clean());
        let records: Vec<u64> = summary.issues.iter().map(|i| i.record).collect();
        assert_eq!(records, vec![0, 2, 4]);
    }

    #[test]
    fn test_structural_mode_skips_checksums() {
        let mut bytes = stream(3);
        bytes[8] ^= 0xFF; // first length checksum
        let opts = ValidateOptions {
            mode: ValidationMode::Structural,
            ..Default::default()
        };
        let summary = validate_reader("scan", bytes.as_slice(), &opts);
        assert_eq!(summary.mode, ValidationMode::Structural);
        assert_eq!(summary.records_checked, 3);
        assert_eq!(summary.bad_length_crc_count, 0);
        assert!(summary.is_clean());
        assert_eq!(summary.bytes_read, bytes.len() as u64);
    }

    #[test]
    fn test_structural_mode_reports_truncation_index() {
        let mut bytes = stream(3);
        bytes.truncate(bytes.len() - 1);
        let opts = ValidateOptions {
            mode: ValidationMode::Structural,
            ..Default::default()
        };
        let summary = validate_reader("scan", bytes.as_slice(), &opts);
        assert!(summary.truncated);
        assert_eq!(summary.records_checked, 2);
        assert_eq!(summary.error.as_ref().and_then(|e| e.record), Some(2));
    }

    #[test]
    fn test_record_limit_stops_early() {
        let opts = ValidateOptions {
            max_records: Some(2),
            ..Default::default()
        };
        let summary = validate_reader("limited", stream(5).as_slice(), &opts);
        assert_eq!(summary.records_checked, 2);
        assert!(summary.limited);
        assert!(!summary.complete);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_zero_record_limit_never_passes_a_cut_stream() {
        let mut bytes = encode_frame(b"a");
        bytes.truncate(5);
        for mode in [ValidationMode::Checksums, ValidationMode::Structural] {
            let opts = ValidateOptions {
                mode,
                max_records: Some(0),
                ..Default::default()
            };
            let summary = validate_reader("cut", bytes.as_slice(), &opts);
            assert_eq!(summary.records_checked, 0);
            assert!(summary.limited);
            assert!(!summary.is_clean());
        }
    }

    struct DeviceError;

    impl Read for DeviceError {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device error"))
        }
    }

    #[test]
    fn test_device_error_after_good_frame_is_unreadable() {
        let bytes = [encode_frame(b"hello"), encode_frame(b"hello")].concat();
        for mode in [ValidationMode::Checksums, ValidationMode::Structural] {
            let opts = ValidateOptions {
                mode,
                ..Default::default()
            };
            // Fails two bytes into the second payload.
            let reader = (&bytes[..35]).chain(DeviceError);
            let summary = validate_reader("device", reader, &opts);

            assert_eq!(summary.records_checked, 1);
            assert!(!summary.truncated);
            assert!(!summary.complete);
            assert_eq!(summary.bytes_read, 35);
            let error = summary.error.as_ref().unwrap();
            assert_eq!(error.kind, ValidationOutcome::Unreadable);
            assert_eq!(error.record, Some(1));
            assert_eq!(error.offset, Some(21));
        }
    }

    #[test]
    fn test_multi_input_isolation() {
        let good = stream(4);
        let mut truncated = stream(4);
        truncated.truncate(truncated.len() - 3);
        let inputs = vec![
            memory("truncated", truncated),
            memory("good", good),
            Input::File("does/not/exist.tfrecord".into()),
        ];

        let summaries = validate(&inputs, &ValidateOptions::default());
        assert_eq!(summaries.len(), 3);

        assert!(summaries[0].truncated);
        assert_eq!(summaries[0].records_checked, 3);

        assert_eq!(summaries[1].source, "good");
        assert!(summaries[1].is_clean());
        assert_eq!(summaries[1].records_checked, 4);

        assert_eq!(
            summaries[2].error.as_ref().map(|e| e.kind),
            Some(ValidationOutcome::Unreadable)
        );
    }

    #[test]
    fn test_parallel_run_preserves_input_order() {
        let inputs: Vec<Input> = (0..8)
            .map(|i| memory(&format!("input-{i}"), stream(i)))
            .collect();
        let opts = ValidateOptions {
            jobs: 4,
            ..Default::default()
        };

        let summaries = validate(&inputs, &opts);
        for (i, summary) in summaries.iter().enumerate() {
            assert_eq!(summary.source, format!("input-{i}"));
            assert_eq!(summary.records_checked, i as u64);
            assert!(summary.is_clean());
        }
    }
}
