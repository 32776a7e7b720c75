//! Frame layout and the framing parser shared by both reading modes.
//!
//! A record file is a plain concatenation of frames:
//!
//! ```text
//! length           : u64 little-endian
//! length_checksum  : u32 little-endian, masked CRC-32C of the 8 length bytes
//! payload          : `length` opaque bytes
//! payload_checksum : u32 little-endian, masked CRC-32C of the payload
//! ```
//!
//! There is no index or file header. End-of-stream is only legal at a frame
//! boundary; any other shortfall is a truncation.

mod writer;

pub use writer::{encode_frame, RecordWriter};

use std::fmt;
use std::io::{self, ErrorKind, Read};

use serde::Serialize;
use thiserror::Error;

use crate::checksum::masked_crc32c;

/// Size of the encoded `length` field.
pub const LENGTH_FIELD_LEN: usize = 8;

/// Size of each encoded checksum field.
pub const CHECKSUM_FIELD_LEN: usize = 4;

/// Bytes of framing around every payload (length + two checksums).
pub const FRAME_OVERHEAD: u64 = (LENGTH_FIELD_LEN + 2 * CHECKSUM_FIELD_LEN) as u64;

/// Initial payload buffer cap. The buffer grows with the bytes actually read,
/// so a corrupted length never drives a giant allocation up front.
const MAX_INITIAL_PAYLOAD_CAPACITY: u64 = 64 * 1024;

/// A single parsed frame. Checksums are stored as read, not verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Zero-based position of the frame in its stream.
    pub index: u64,
    /// Byte offset of the frame's first length byte.
    pub offset: u64,
    /// Payload length in bytes.
    pub length: u64,
    /// Stored masked checksum of the length bytes.
    pub length_checksum: u32,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Stored masked checksum of the payload.
    pub payload_checksum: u32,
}

impl Frame {
    /// The raw little-endian length bytes as they appeared on the wire.
    pub fn length_bytes(&self) -> [u8; LENGTH_FIELD_LEN] {
        self.length.to_le_bytes()
    }

    /// Total encoded size of this frame, framing included.
    pub fn encoded_len(&self) -> u64 {
        FRAME_OVERHEAD + self.length
    }

    /// Recomputes both checksums and compares them to the stored values.
    pub fn verify(&self) -> ChecksumStatus {
        ChecksumStatus {
            length_ok: masked_crc32c(&self.length_bytes()) == self.length_checksum,
            payload_ok: masked_crc32c(&self.payload) == self.payload_checksum,
        }
    }
}

/// Result of checking both checksums of one frame.
///
/// The two checks are independent: a frame can fail either or both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ChecksumStatus {
    pub length_ok: bool,
    pub payload_ok: bool,
}

impl ChecksumStatus {
    /// Returns true if both checksums match.
    pub fn is_valid(&self) -> bool {
        self.length_ok && self.payload_ok
    }
}

/// The field of a frame being read when a failure occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FramePart {
    Length,
    LengthChecksum,
    Payload,
    PayloadChecksum,
}

impl fmt::Display for FramePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FramePart::Length => "length",
            FramePart::LengthChecksum => "length checksum",
            FramePart::Payload => "payload",
            FramePart::PayloadChecksum => "payload checksum",
        };
        f.write_str(name)
    }
}

/// A failure that ends processing of the current stream.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The stream ended in the middle of a frame.
    #[error(
        "truncated {part} in record {index} (frame at byte {offset}): \
         expected {expected} byte(s), found {found}"
    )]
    Truncated {
        index: u64,
        offset: u64,
        part: FramePart,
        expected: u64,
        found: u64,
    },

    /// The underlying reader failed.
    #[error("read error in record {index} (frame at byte {offset}): {source}")]
    Unreadable {
        index: u64,
        offset: u64,
        #[source]
        source: io::Error,
    },
}

impl FrameError {
    /// Index of the record that could not be read.
    pub fn index(&self) -> u64 {
        match self {
            FrameError::Truncated { index, .. } | FrameError::Unreadable { index, .. } => *index,
        }
    }

    /// Byte offset of the frame that could not be read.
    pub fn offset(&self) -> u64 {
        match self {
            FrameError::Truncated { offset, .. } | FrameError::Unreadable { offset, .. } => *offset,
        }
    }

    /// Returns true for the truncation variant.
    pub fn is_truncation(&self) -> bool {
        matches!(self, FrameError::Truncated { .. })
    }
}

/// Sequential framing parser over any byte source.
///
/// Yields frames in order and fuses after clean end-of-stream or the first
/// error. This is the only place frame bytes are decoded.
#[derive(Debug)]
pub(crate) struct FrameCursor<R> {
    inner: R,
    offset: u64,
    next_index: u64,
    finished: bool,
}

impl<R: Read> FrameCursor<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            next_index: 0,
            finished: false,
        }
    }

    /// Bytes consumed from the source so far.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns true once the stream has ended, cleanly or not.
    pub(crate) fn is_finished(&self) -> bool {
        self.finished
    }

    pub(crate) fn next_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        if self.finished {
            return None;
        }
        let result = self.read_frame();
        if !matches!(result, Ok(Some(_))) {
            self.finished = true;
        }
        result.transpose()
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        let index = self.next_index;
        let start = self.offset;

        let mut length_bytes = [0u8; LENGTH_FIELD_LEN];
        let found = self.fill(&mut length_bytes, index, start)?;
        if found == 0 {
            return Ok(None);
        }
        check_complete(FramePart::Length, found, LENGTH_FIELD_LEN, index, start)?;
        let length = u64::from_le_bytes(length_bytes);

        let length_checksum = self.read_checksum(FramePart::LengthChecksum, index, start)?;
        let payload = self.read_payload(length, index, start)?;
        let payload_checksum = self.read_checksum(FramePart::PayloadChecksum, index, start)?;

        self.next_index += 1;
        Ok(Some(Frame {
            index,
            offset: start,
            length,
            length_checksum,
            payload,
            payload_checksum,
        }))
    }

    fn read_checksum(&mut self, part: FramePart, index: u64, start: u64) -> Result<u32, FrameError> {
        let mut buf = [0u8; CHECKSUM_FIELD_LEN];
        let found = self.fill(&mut buf, index, start)?;
        check_complete(part, found, CHECKSUM_FIELD_LEN, index, start)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_payload(&mut self, length: u64, index: u64, start: u64) -> Result<Vec<u8>, FrameError> {
        let mut payload = Vec::with_capacity(length.min(MAX_INITIAL_PAYLOAD_CAPACITY) as usize);
        // Bytes read before a failure stay in `payload` and count as consumed.
        let result = self.inner.by_ref().take(length).read_to_end(&mut payload);
        self.offset += payload.len() as u64;
        let found = result.map_err(|source| FrameError::Unreadable {
            index,
            offset: start,
            source,
        })?;

        if (found as u64) < length {
            return Err(FrameError::Truncated {
                index,
                offset: start,
                part: FramePart::Payload,
                expected: length,
                found: found as u64,
            });
        }
        Ok(payload)
    }

    /// Reads until `buf` is full or the source is exhausted, returning the
    /// number of bytes read. Interrupted reads are retried.
    fn fill(&mut self, buf: &mut [u8], index: u64, start: u64) -> Result<usize, FrameError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    self.offset += filled as u64;
                    return Err(FrameError::Unreadable {
                        index,
                        offset: start,
                        source,
                    });
                }
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }
}

fn check_complete(
    part: FramePart,
    found: usize,
    expected: usize,
    index: u64,
    start: u64,
) -> Result<(), FrameError> {
    if found < expected {
        return Err(FrameError::Truncated {
            index,
            offset: start,
            part,
            expected: expected as u64,
            found: found as u64,
        });
    }
    Ok(())
}
