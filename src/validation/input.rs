//! Input sources for a validation run.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// One byte stream to validate.
#[derive(Clone, Debug)]
pub enum Input {
    /// A file on disk, opened when it is validated.
    File(PathBuf),
    /// An in-memory buffer with a caller-chosen label.
    Memory { name: String, bytes: Vec<u8> },
    /// A path discovered during directory expansion that could not be listed.
    Unavailable { path: PathBuf, reason: String },
}

impl Input {
    /// Human-readable identity used in reports and logs.
    pub fn label(&self) -> String {
        match self {
            Input::File(path) | Input::Unavailable { path, .. } => path.display().to_string(),
            Input::Memory { name, .. } => name.clone(),
        }
    }

    /// Opens the input for sequential reading.
    ///
    /// The returned reader owns the file handle; dropping it closes the file.
    pub fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match self {
            Input::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Input::Memory { bytes, .. } => Ok(Box::new(bytes.as_slice())),
            Input::Unavailable { reason, .. } => Err(io::Error::other(reason.clone())),
        }
    }
}

/// Expands command-line paths into inputs.
///
/// Files are taken as given. Directories are walked recursively and their
/// regular files added in file-name order, keeping only those whose extension
/// equals `extension` when one is given. Entries that cannot be listed become
/// [`Input::Unavailable`] so the run reports them instead of aborting.
pub fn expand_paths(paths: &[PathBuf], extension: Option<&str>) -> Vec<Input> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            expand_dir(path, extension, &mut inputs);
        } else {
            inputs.push(Input::File(path.clone()));
        }
    }
    inputs
}

fn expand_dir(dir: &Path, extension: Option<&str>, inputs: &mut Vec<Input>) {
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(dir).to_path_buf();
                tracing::warn!(path = %path.display(), error = %err, "cannot list directory entry");
                inputs.push(Input::Unavailable {
                    path,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(wanted) = extension {
            let matches = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(wanted.trim_start_matches('.')));
            if !matches {
                continue;
            }
        }
        inputs.push(Input::File(entry.into_path()));
    }
}
