//! Frame encoding, the inverse of the framing parser.

use std::io::{self, BufWriter, Write};

use crate::checksum::masked_crc32c;

use super::FRAME_OVERHEAD;

/// Encodes one payload as a complete frame with both checksums.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let length_bytes = (payload.len() as u64).to_le_bytes();
    let mut out = Vec::with_capacity(FRAME_OVERHEAD as usize + payload.len());
    out.extend_from_slice(&length_bytes);
    out.extend_from_slice(&masked_crc32c(&length_bytes).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&masked_crc32c(payload).to_le_bytes());
    out
}

fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let length_bytes = (payload.len() as u64).to_le_bytes();
    writer.write_all(&length_bytes)?;
    writer.write_all(&masked_crc32c(&length_bytes).to_le_bytes())?;
    writer.write_all(payload)?;
    writer.write_all(&masked_crc32c(payload).to_le_bytes())?;
    Ok(())
}

/// Buffered writer that appends framed records to a byte sink.
#[derive(Debug)]
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,
    records_written: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            records_written: 0,
        }
    }

    /// Appends one record.
    pub fn write_record(&mut self, payload: &[u8]) -> io::Result<()> {
        write_frame(&mut self.inner, payload)?;
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flushes buffered data and returns the underlying sink.
    pub fn finish(self) -> io::Result<W> {
        self.inner.into_inner().map_err(|e| e.into_error())
    }
}
