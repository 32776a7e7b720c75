#![allow(dead_code)]

use std::fs;
use std::path::Path;

use framecheck::frame::{encode_frame, RecordWriter};

/// Frame bytes for `count` small, distinct payloads.
pub fn record_bytes(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| encode_frame(format!("example-{i:04}").as_bytes()))
        .collect()
}

pub fn write_records(path: &Path, payloads: &[&[u8]]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let file = fs::File::create(path).expect("create record file");
    let mut writer = RecordWriter::new(file);
    for payload in payloads {
        writer.write_record(payload).expect("write record");
    }
    writer.finish().expect("flush record file");
}

/// Writes `count` valid records, then flips one bit in the payload
/// checksum of every record listed in `corrupt`.
pub fn write_with_bad_payload_crc(path: &Path, count: usize, corrupt: &[usize]) {
    let mut bytes = Vec::new();
    for i in 0..count {
        let mut frame = encode_frame(format!("example-{i:04}").as_bytes());
        if corrupt.contains(&i) {
            let last = frame.len() - 1;
            frame[last] ^= 0x40;
        }
        bytes.extend(frame);
    }
    fs::write(path, bytes).expect("write record file");
}

/// Writes `count` valid records with the final `cut` bytes removed.
pub fn write_truncated(path: &Path, count: usize, cut: usize) {
    let mut bytes = record_bytes(count);
    bytes.truncate(bytes.len() - cut);
    fs::write(path, bytes).expect("write record file");
}
