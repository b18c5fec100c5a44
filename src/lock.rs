//! File-based advisory lock for a snapshot file (optional extension).
//!
//! Cross-platform (fs2) advisory lock, exclusive, non-blocking:
//! - Lock file path: <file>.lock (рядом со снапшотом, сам снапшот не трогаем).
//! - Held for the lifetime of the cache; released on Drop.
//!
//! Базовый контракт кэша не защищает от конкурентных процессов; lock включается
//! только через CacheConfig::lock.

use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CacheError, Result};

pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard").field("path", &self.path).finish()
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

pub fn lock_file_path(snapshot: &Path) -> PathBuf {
    let mut name = snapshot
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    snapshot.with_file_name(name)
}

/// Try to take the exclusive lock. Returns `Locked` if someone else holds it.
pub fn try_acquire_exclusive_lock(snapshot: &Path) -> Result<LockGuard> {
    let path = lock_file_path(snapshot);
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&path)
        .map_err(|e| CacheError::io(&path, "open lock file", e))?;

    match file.try_lock_exclusive() {
        Ok(()) => Ok(LockGuard { file, path }),
        Err(e) if is_contended(&e) => Err(CacheError::Locked { path }),
        Err(e) => Err(CacheError::io(&path, "try_lock_exclusive", e)),
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_sits_next_to_snapshot() {
        assert_eq!(
            lock_file_path(Path::new("/data/cache.snap")),
            PathBuf::from("/data/cache.snap.lock")
        );
    }
}
