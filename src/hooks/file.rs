//! File hook: one JSON object per line

use super::Diagnostics;
use crate::core::{Encoder, Entry, ErrorCallback, Hook, JsonEncoder, LoggerError, Result};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileHook {
    path: PathBuf,
    file: Mutex<File>,
    encoder: JsonEncoder,
    diagnostics: Diagnostics,
}

impl FileHook {
    /// Open `path` for appending, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `FileHookError` if the file cannot be opened.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::file_hook(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            encoder: JsonEncoder::new(),
            diagnostics: Diagnostics::default(),
        })
    }

    /// Report write failures to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.diagnostics.set(callback);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &Entry) -> Result<()> {
        let mut line = self.encoder.encode(entry)?;
        line.push(b'\n');
        self.file.lock().write_all(&line).map_err(|e| {
            LoggerError::io_operation(
                "writing file hook",
                self.path.display().to_string(),
                e,
            )
        })
    }
}

impl Hook for FileHook {
    fn fire(&self, entry: &Entry) {
        if let Err(e) = self.append(entry) {
            self.diagnostics.report(&e);
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}
