//! Validation report types for structured error reporting.
//!
//! A [`RunSummary`] describes one input; a [`RunReport`] gathers the summaries
//! of a whole run together with run-wide totals. Both render as text via
//! `Display` and as JSON via `serde`.

use std::fmt;
use std::io;

use serde::Serialize;

use crate::frame::{ChecksumStatus, Frame, FrameError};
use crate::reader::ValidationOutcome;

/// How frames are checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Parse every frame and verify both checksums.
    #[default]
    Checksums,
    /// Parse every frame; skip checksum verification.
    Structural,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationMode::Checksums => write!(f, "checksums"),
            ValidationMode::Structural => write!(f, "structural"),
        }
    }
}

/// Aggregate result of validating one input.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Input identity (path or caller-supplied label).
    pub source: String,
    pub mode: ValidationMode,
    /// Frames parsed completely. A truncated frame is not counted.
    pub records_checked: u64,
    pub bad_length_crc_count: u64,
    pub bad_payload_crc_count: u64,
    /// Bytes consumed from the input, including any partial trailing frame.
    pub bytes_read: u64,
    /// True if the input ended in the middle of a frame.
    pub truncated: bool,
    /// True if the input reached a clean end-of-stream.
    pub complete: bool,
    /// True if reading stopped at the caller's record limit.
    pub limited: bool,
    /// The failure that ended processing, if any.
    pub error: Option<RunError>,
    /// Per-record checksum mismatches, in stream order.
    pub issues: Vec<RecordIssue>,
}

impl RunSummary {
    pub fn new(source: impl Into<String>, mode: ValidationMode) -> Self {
        Self {
            source: source.into(),
            mode,
            records_checked: 0,
            bad_length_crc_count: 0,
            bad_payload_crc_count: 0,
            bytes_read: 0,
            truncated: false,
            complete: false,
            limited: false,
            error: None,
            issues: Vec::new(),
        }
    }

    /// Summary for an input that could not be opened at all.
    pub fn unopenable(source: impl Into<String>, mode: ValidationMode, err: &io::Error) -> Self {
        let mut summary = Self::new(source, mode);
        summary.error = Some(RunError {
            kind: ValidationOutcome::Unreadable,
            record: None,
            offset: None,
            message: format!("cannot open input: {}", err),
        });
        summary
    }

    /// Counts one parsed frame. `checksums` is `None` in structural mode.
    pub fn record_frame(&mut self, frame: &Frame, checksums: Option<ChecksumStatus>) {
        self.records_checked += 1;

        let Some(status) = checksums else {
            return;
        };
        if !status.length_ok {
            self.bad_length_crc_count += 1;
            self.push_issue(ValidationOutcome::BadLengthChecksum, frame);
        }
        if !status.payload_ok {
            self.bad_payload_crc_count += 1;
            self.push_issue(ValidationOutcome::BadPayloadChecksum, frame);
        }
    }

    fn push_issue(&mut self, code: ValidationOutcome, frame: &Frame) {
        tracing::warn!(
            source = %self.source,
            record = frame.index,
            offset = frame.offset,
            "{}",
            code
        );
        self.issues.push(RecordIssue {
            code,
            record: frame.index,
            offset: frame.offset,
            length: frame.length,
        });
    }

    /// Records the failure that ended this input.
    pub fn record_error(&mut self, err: &FrameError) {
        tracing::warn!(
            source = %self.source,
            record = err.index(),
            offset = err.offset(),
            "{}",
            err
        );
        self.truncated = err.is_truncation();
        self.error = Some(RunError {
            kind: ValidationOutcome::from(err),
            record: Some(err.index()),
            offset: Some(err.offset()),
            message: err.to_string(),
        });
    }

    /// Total checksum mismatches (a frame failing both counts twice).
    pub fn bad_checksum_count(&self) -> u64 {
        self.bad_length_crc_count + self.bad_payload_crc_count
    }

    /// Returns true if the input reached a clean end with no bad checksums.
    ///
    /// An input stopped at the record limit was not fully checked and is never
    /// clean.
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.complete && self.bad_checksum_count() == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validating {}", self.source)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  {}", error)?;
        }

        write!(
            f,
            "  checked {} record(s), {} byte(s)",
            self.records_checked, self.bytes_read
        )?;
        if self.limited {
            write!(f, " (stopped at record limit)")?;
        }
        writeln!(f)
    }
}

/// A checksum mismatch in one record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    pub code: ValidationOutcome,
    /// Zero-based record index.
    pub record: u64,
    /// Byte offset of the frame.
    pub offset: u64,
    /// Payload length as read from the frame.
    pub length: u64,
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[BAD ] {} at record {} (byte {}, length {})",
            self.code, self.record, self.offset, self.length
        )
    }
}

/// The failure that ended processing of one input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunError {
    /// Either `Truncated` or `Unreadable`.
    pub kind: ValidationOutcome,
    /// Record index, when the failure happened inside the stream.
    pub record: Option<u64>,
    /// Frame byte offset, when the failure happened inside the stream.
    pub offset: Option<u64>,
    pub message: String,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FAIL] {}: {}", self.kind, self.message)
    }
}

/// Counters summed over every input of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub inputs: usize,
    pub failed_inputs: usize,
    pub records_checked: u64,
    pub bad_length_crc_count: u64,
    pub bad_payload_crc_count: u64,
    pub truncated_inputs: usize,
    pub unreadable_inputs: usize,
    /// Inputs stopped at the record limit before their end.
    pub limited_inputs: usize,
    pub bytes_read: u64,
}

impl RunTotals {
    /// Sums the counters of independent per-input summaries.
    pub fn from_summaries(summaries: &[RunSummary]) -> Self {
        summaries.iter().fold(Self::default(), |mut totals, s| {
            totals.inputs += 1;
            totals.records_checked += s.records_checked;
            totals.bad_length_crc_count += s.bad_length_crc_count;
            totals.bad_payload_crc_count += s.bad_payload_crc_count;
            totals.bytes_read += s.bytes_read;
            if !s.is_clean() {
                totals.failed_inputs += 1;
            }
            if s.truncated {
                totals.truncated_inputs += 1;
            }
            if matches!(&s.error, Some(e) if e.kind == ValidationOutcome::Unreadable) {
                totals.unreadable_inputs += 1;
            }
            if s.limited {
                totals.limited_inputs += 1;
            }
            totals
        })
    }
}

/// The result of a multi-input run.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub mode: ValidationMode,
    pub totals: RunTotals,
    pub summaries: Vec<RunSummary>,
}

impl RunReport {
    pub fn new(mode: ValidationMode, summaries: Vec<RunSummary>) -> Self {
        Self {
            mode,
            totals: RunTotals::from_summaries(&summaries),
            summaries,
        }
    }

    /// True if every input reached a clean end with zero bad checksums.
    pub fn is_success(&self) -> bool {
        !self.summaries.is_empty() && self.totals.failed_inputs == 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for summary in &self.summaries {
            write!(f, "{}", summary)?;
        }

        let t = &self.totals;
        writeln!(f)?;
        writeln!(
            f,
            "checked {} total record(s) in {} input(s) ({} mode)",
            t.records_checked, t.inputs, self.mode
        )?;
        if self.mode == ValidationMode::Checksums {
            writeln!(f, "total with bad length crc: {}", t.bad_length_crc_count)?;
            writeln!(f, "total with bad data crc: {}", t.bad_payload_crc_count)?;
        }
        writeln!(f, "truncated inputs: {}", t.truncated_inputs)?;
        writeln!(f, "unreadable inputs: {}", t.unreadable_inputs)?;
        if t.limited_inputs > 0 {
            writeln!(f, "limited inputs: {}", t.limited_inputs)?;
        }

        if self.is_success() {
            writeln!(f, "Validation passed: all inputs intact")
        } else if t.limited_inputs == t.failed_inputs
            && t.bad_length_crc_count + t.bad_payload_crc_count == 0
        {
            writeln!(
                f,
                "Validation incomplete: {} of {} input(s) stopped at record limit, not fully checked",
                t.limited_inputs, t.inputs
            )
        } else {
            writeln!(
                f,
                "Validation failed: {} of {} input(s) with errors",
                t.failed_inputs, t.inputs
            )
        }
    }
}
