//! Pull-based readers over a framed record stream.
//!
//! [`RecordReader`] verifies both checksums of every frame and keeps a running
//! [`RunSummary`]. [`StructuralFrames`] is the fast path: it only checks that
//! frames are consumable and never recomputes a checksum. Both sit on the same
//! framing parser, so length and byte-order handling cannot diverge.

use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::frame::{ChecksumStatus, Frame, FrameCursor, FrameError};
use crate::validation::{RunSummary, ValidationMode};

/// Per-frame verdict, flattened for reporting.
///
/// A parsed frame can carry both checksum verdicts at once; the two fatal
/// outcomes end the stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    BadLengthChecksum,
    BadPayloadChecksum,
    Truncated,
    Unreadable,
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationOutcome::Valid => "valid",
            ValidationOutcome::BadLengthChecksum => "bad length checksum",
            ValidationOutcome::BadPayloadChecksum => "bad payload checksum",
            ValidationOutcome::Truncated => "truncated",
            ValidationOutcome::Unreadable => "unreadable",
        };
        f.write_str(text)
    }
}

impl From<&FrameError> for ValidationOutcome {
    fn from(err: &FrameError) -> Self {
        match err {
            FrameError::Truncated { .. } => ValidationOutcome::Truncated,
            FrameError::Unreadable { .. } => ValidationOutcome::Unreadable,
        }
    }
}

/// A fully parsed frame together with its checksum verdicts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedFrame {
    pub frame: Frame,
    pub checksums: ChecksumStatus,
}

impl CheckedFrame {
    pub fn is_valid(&self) -> bool {
        self.checksums.is_valid()
    }

    /// The verdicts that apply to this frame: `[Valid]`, or one or both
    /// checksum failures.
    pub fn outcomes(&self) -> Vec<ValidationOutcome> {
        if self.is_valid() {
            return vec![ValidationOutcome::Valid];
        }
        let mut outcomes = Vec::with_capacity(2);
        if !self.checksums.length_ok {
            outcomes.push(ValidationOutcome::BadLengthChecksum);
        }
        if !self.checksums.payload_ok {
            outcomes.push(ValidationOutcome::BadPayloadChecksum);
        }
        outcomes
    }
}

/// Checksum-verifying reader for one input.
///
/// Checksum mismatches are counted and reading continues with the next frame.
/// Truncation and I/O failures end the stream; after that, and after a clean
/// end, [`RecordReader::next_frame`] keeps returning `None`.
pub struct RecordReader<R> {
    cursor: FrameCursor<R>,
    summary: RunSummary,
}

impl<R: Read> RecordReader<R> {
    /// Creates a reader; `source` labels the input in the summary and in logs.
    pub fn new(source: impl Into<String>, inner: R) -> Self {
        Self {
            cursor: FrameCursor::new(inner),
            summary: RunSummary::new(source, ValidationMode::Checksums),
        }
    }

    /// Reads and verifies the next frame.
    ///
    /// Returns `None` at clean end-of-stream, or once a previous call
    /// returned an error.
    pub fn next_frame(&mut self) -> Option<Result<CheckedFrame, FrameError>> {
        let next = self.cursor.next_frame();
        self.summary.bytes_read = self.cursor.offset();

        match next {
            None => {
                if self.summary.error.is_none() {
                    self.summary.complete = true;
                }
                None
            }
            Some(Ok(frame)) => {
                let checksums = frame.verify();
                self.summary.record_frame(&frame, Some(checksums));
                Some(Ok(CheckedFrame { frame, checksums }))
            }
            Some(Err(err)) => {
                self.summary.record_error(&err);
                Some(Err(err))
            }
        }
    }

    /// The summary as accumulated so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Consumes the reader, returning its summary. The input is released here.
    pub fn into_summary(self) -> RunSummary {
        self.summary
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<CheckedFrame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}

/// Structural-only iterator: frames are parsed but checksums are never
/// recomputed. Fuses after the first error.
pub struct StructuralFrames<R> {
    cursor: FrameCursor<R>,
}

impl<R: Read> StructuralFrames<R> {
    /// Bytes consumed from the input so far.
    pub fn bytes_read(&self) -> u64 {
        self.cursor.offset()
    }

    /// Returns true once the stream has ended, cleanly or not.
    pub fn is_finished(&self) -> bool {
        self.cursor.is_finished()
    }
}

impl<R: Read> Iterator for StructuralFrames<R> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_frame()
    }
}

/// Iterates the frames of `input` without verifying checksums.
pub fn iterate_structural<R: Read>(input: R) -> StructuralFrames<R> {
    StructuralFrames {
        cursor: FrameCursor::new(input),
    }
}
