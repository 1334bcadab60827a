//! Advisory lock held for the whole import sequence.
//!
//! The lock is an OS file lock rather than the file's existence, so a crashed
//! import leaves at most an unlocked file behind and never blocks the next one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::{debug, warn};

/// Exclusive lock on the device theme paths; released on drop.
#[derive(Debug)]
pub struct ImportLock {
    file: File,
    path: PathBuf,
}

impl ImportLock {
    /// Open (or create) the lock file at `path` and take an exclusive lock
    /// on it without waiting. The holder's PID is written for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error of kind [`io::ErrorKind::WouldBlock`] when another
    /// import holds the lock, or any other I/O error.
    pub fn acquire(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("'{}' is locked by another import", path.display()),
                ));
            }
            return Err(e);
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        writeln!(file, "{}", std::process::id())?;
        debug!("acquired import lock {}", path.display());
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for ImportLock {
    fn drop(&mut self) {
        // The file stays; removing it would let a waiter lock an orphaned inode.
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!("failed to release import lock {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_acquire_fails_until_released() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared/.lock");
        let first = ImportLock::acquire(&path).unwrap();
        let err = ImportLock::acquire(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        drop(first);
        assert!(ImportLock::acquire(&path).is_ok());
    }

    #[test]
    fn leftover_file_from_dead_process_does_not_block() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".lock");
        fs::write(&path, "999999\n").unwrap();

        let _lock = ImportLock::acquire(&path).unwrap();
        let pid = fs::read_to_string(&path).unwrap();
        assert_eq!(pid.trim(), std::process::id().to_string());
    }
}
