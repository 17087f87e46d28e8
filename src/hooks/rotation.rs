//! Rotation hook: JSON lines with size-triggered rotation
//!
//! The active file is `path`; rotated files are `path.1` (newest) up to
//! `path.N`, gzip-compressed to `path.N.gz` when compression is on.

use super::Diagnostics;
use crate::core::{Encoder, Entry, ErrorCallback, Hook, JsonEncoder, LoggerError, Result};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const MEGABYTE: u64 = 1024 * 1024;
const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Size used when `max_size_mb` is zero
pub const DEFAULT_MAX_SIZE_MB: u64 = 100;

struct RotatingFile {
    base_path: PathBuf,
    file: Option<File>,
    current_size: u64,
    max_size: u64,
    max_backups: usize,
    max_age: Option<Duration>,
    compress: bool,
    diagnostics: Diagnostics,
}

impl RotatingFile {
    fn open(path: &Path) -> Result<(File, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_hook(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::file_hook(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();
        Ok((file, size))
    }

    fn write(&mut self, line: &[u8]) -> Result<()> {
        let incoming = line.len() as u64;
        if self.current_size > 0 && self.current_size + incoming > self.max_size {
            if let Err(e) = self.rotate() {
                self.diagnostics.report(&e);
                if self.file.is_none() {
                    let (file, size) = Self::open(&self.base_path)?;
                    self.file = Some(file);
                    self.current_size = size;
                }
            }
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LoggerError::write("Rotation file not open"))?;
        file.write_all(line)?;
        self.current_size += incoming;
        Ok(())
    }

    fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let filename = self
            .base_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log");
        let name = if compressed {
            format!("{}.{}.gz", filename, index)
        } else {
            format!("{}.{}", filename, index)
        };
        self.base_path.with_file_name(name)
    }

    /// Existing backup for `index`, compressed or not
    fn existing_backup(&self, index: usize) -> Option<PathBuf> {
        [true, false]
            .into_iter()
            .map(|compressed| self.backup_path(index, compressed))
            .find(|p| p.exists())
    }

    fn highest_backup(&self) -> usize {
        let mut index = 0;
        while self.existing_backup(index + 1).is_some() {
            index += 1;
        }
        index
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        // Shift path.i -> path.(i+1), newest last so nothing is overwritten
        for index in (1..=self.highest_backup()).rev() {
            if let Some(old_path) = self.existing_backup(index) {
                let compressed = old_path.extension().is_some_and(|ext| ext == "gz");
                let new_path = self.backup_path(index + 1, compressed);
                fs::rename(&old_path, &new_path).map_err(|e| {
                    LoggerError::file_rotation(
                        old_path.display().to_string(),
                        format!("Failed to shift backup file: {}", e),
                    )
                })?;
            }
        }

        let first_backup = self.backup_path(1, false);
        if self.base_path.exists() {
            fs::rename(&self.base_path, &first_backup).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
        }

        let (file, size) = Self::open(&self.base_path)?;
        self.file = Some(file);
        self.current_size = size;

        if self.compress && first_backup.exists() {
            let gz_path = self.backup_path(1, true);
            compress_file(&first_backup, &gz_path)?;
        }

        self.remove_expired();
        Ok(())
    }

    /// Drop backups beyond `max_backups` and older than `max_age`
    fn remove_expired(&self) {
        let now = SystemTime::now();
        for index in 1..=self.highest_backup() {
            let Some(path) = self.existing_backup(index) else {
                continue;
            };

            let over_count = self.max_backups > 0 && index > self.max_backups;
            let too_old = self.max_age.is_some_and(|max_age| {
                fs::metadata(&path)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > max_age)
            });

            if over_count || too_old {
                if let Err(e) = fs::remove_file(&path) {
                    self.diagnostics.report(&LoggerError::file_rotation(
                        path.display().to_string(),
                        format!("Failed to remove old backup: {}", e),
                    ));
                }
            }
        }
    }
}

/// Compress `path` into `gz_path`, removing the original only after the
/// compressed file is complete.
fn compress_file(path: &Path, gz_path: &Path) -> Result<()> {
    let mut temp_name = gz_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_gz_path = PathBuf::from(temp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&temp_gz_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!(
                "Failed to create temporary compressed file: {}",
                temp_gz_path.display()
            ),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    let streamed: std::io::Result<()> = (|| {
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            encoder.write_all(&buffer[..bytes_read])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed {
        let _ = fs::remove_file(&temp_gz_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&temp_gz_path, gz_path).map_err(|e| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

/// JSON-lines hook with size-based rotation
///
/// # Examples
///
/// ```no_run
/// use logx::hooks::RotationHook;
/// use logx::Logger;
///
/// // 10 MB per file, keep 5 backups for at most 7 days, gzip compressed
/// let hook = RotationHook::new("/var/log/app.log", 10, 5, 7).unwrap();
///
/// let logger = Logger::new();
/// logger.add_hook(hook);
/// ```
pub struct RotationHook {
    state: Mutex<RotatingFile>,
    encoder: JsonEncoder,
    diagnostics: Diagnostics,
}

impl RotationHook {
    /// `max_size_mb` of 0 selects [`DEFAULT_MAX_SIZE_MB`]; `max_backups` of
    /// 0 keeps every backup; `max_age_days` of 0 disables age-based removal.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created.
    pub fn new(
        path: impl AsRef<Path>,
        max_size_mb: u64,
        max_backups: usize,
        max_age_days: u64,
    ) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        let max_size_mb = if max_size_mb == 0 {
            DEFAULT_MAX_SIZE_MB
        } else {
            max_size_mb
        };
        let max_size = max_size_mb.checked_mul(MEGABYTE).ok_or_else(|| {
            LoggerError::config(
                "RotationHook",
                format!("max_size_mb {} is too large", max_size_mb),
            )
        })?;
        let max_age = match max_age_days {
            0 => None,
            days => Some(Duration::from_secs(
                days.checked_mul(SECONDS_PER_DAY).ok_or_else(|| {
                    LoggerError::config(
                        "RotationHook",
                        format!("max_age_days {} is too large", days),
                    )
                })?,
            )),
        };

        if let Some(parent) = base_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::io_operation(
                        "create log directory",
                        format!("Failed to create directory '{}'", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let (file, current_size) = RotatingFile::open(&base_path)?;
        let diagnostics = Diagnostics::default();

        Ok(Self {
            state: Mutex::new(RotatingFile {
                base_path,
                file: Some(file),
                current_size,
                max_size,
                max_backups,
                max_age,
                compress: true,
                diagnostics: diagnostics.clone(),
            }),
            encoder: JsonEncoder::new(),
            diagnostics,
        })
    }

    /// Rotation threshold in bytes instead of megabytes
    #[must_use]
    pub fn with_max_size_bytes(self, bytes: u64) -> Self {
        self.state.lock().max_size = bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_compression(self, enabled: bool) -> Self {
        self.state.lock().compress = enabled;
        self
    }

    /// Report write and rotation failures to `callback` instead of stderr
    #[must_use]
    pub fn with_error_callback(self, callback: ErrorCallback) -> Self {
        self.diagnostics.set(callback);
        self
    }

    pub fn path(&self) -> PathBuf {
        self.state.lock().base_path.clone()
    }

    pub fn current_size(&self) -> u64 {
        self.state.lock().current_size
    }

    /// Rotate now regardless of size
    pub fn rotate(&self) -> Result<()> {
        self.state.lock().rotate()
    }
}

impl Hook for RotationHook {
    fn fire(&self, entry: &Entry) {
        let result = self.encoder.encode(entry).and_then(|mut line| {
            line.push(b'\n');
            self.state.lock().write(&line)
        });
        if let Err(e) = result {
            self.diagnostics.report(&e);
        }
    }

    fn name(&self) -> &str {
        "rotation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use flate2::read::GzDecoder;
    use tempfile::TempDir;

    fn fire_many(hook: &RotationHook, count: usize) {
        for i in 0..count {
            hook.fire(&Entry::new(LogLevel::Info, format!("message number {}", i)));
        }
    }

    #[test]
    fn test_rotates_and_compresses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let hook = RotationHook::new(&path, 1, 3, 0)
            .unwrap()
            .with_max_size_bytes(200);

        fire_many(&hook, 10);

        let gz = temp_dir.path().join("app.log.1.gz");
        assert!(gz.exists());
        assert!(!temp_dir.path().join("app.log.1").exists());

        let mut decoded = String::new();
        GzDecoder::new(File::open(&gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("message number"));
        assert!(hook.current_size() <= 200);
    }

    #[test]
    fn test_max_backups_respected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let hook = RotationHook::new(&path, 1, 2, 0)
            .unwrap()
            .with_max_size_bytes(100)
            .with_compression(false);

        fire_many(&hook, 20);

        assert!(temp_dir.path().join("app.log.1").exists());
        assert!(temp_dir.path().join("app.log.2").exists());
        assert!(!temp_dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_manual_rotate_keeps_writing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("app.log");
        let hook = RotationHook::new(&path, 0, 0, 0)
            .unwrap()
            .with_compression(false);

        fire_many(&hook, 1);
        hook.rotate().unwrap();
        fire_many(&hook, 1);

        let rotated = std::fs::read_to_string(path.with_file_name("app.log.1")).unwrap();
        let active = std::fs::read_to_string(&path).unwrap();
        assert_eq!(rotated.lines().count(), 1);
        assert_eq!(active.lines().count(), 1);
    }

    #[test]
    fn test_oversized_limits_are_config_errors() {
        let temp_dir = TempDir::new().unwrap();

        let age = RotationHook::new(temp_dir.path().join("a.log"), 1, 1, u64::MAX);
        assert!(matches!(age, Err(LoggerError::InvalidConfiguration { .. })));

        let size = RotationHook::new(temp_dir.path().join("b.log"), u64::MAX, 1, 0);
        assert!(matches!(size, Err(LoggerError::InvalidConfiguration { .. })));
        assert!(!temp_dir.path().join("b.log").exists());
    }

    #[test]
    fn test_backups_older_than_max_age_removed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("app.log");
        let stale = temp_dir.path().join("app.log.1");
        fs::write(&stale, "old line\n").unwrap();
        File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(3 * SECONDS_PER_DAY))
            .unwrap();

        let hook = RotationHook::new(&path, 0, 0, 1)
            .unwrap()
            .with_compression(false);
        fire_many(&hook, 1);
        hook.rotate().unwrap();

        // The stale backup was shifted to .2 and then expired
        assert!(!temp_dir.path().join("app.log.2").exists());
        let fresh = fs::read_to_string(&stale).unwrap();
        assert!(fresh.contains("message number 0"));
    }
}
