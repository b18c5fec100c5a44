//! error — типизированные ошибки SnapCache.
//!
//! Таксономия:
//! - KeyNotFound: get/delete по отсутствующему ключу.
//! - CorruptData: непустой файл снапшота не декодируется (данные в памяти не трогаем).
//! - Io: ошибка файловой системы при load/flush (кроме "файла нет").
//! - Encode: не удалось сериализовать/сжать payload при flush.
//! - Locked: эксклюзивный lock уже держит другой владелец (только при lock=true).
//!
//! Никаких ретраев и подстановок по умолчанию: всё отдаётся вызывающему.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("key not found: '{key}'")]
    KeyNotFound { key: String },

    #[error("corrupt snapshot {}: {reason}", path.display())]
    CorruptData { path: PathBuf, reason: String },

    #[error("{op} {}: {source}", path.display())]
    Io {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("encode snapshot: {reason}")]
    Encode { reason: String },

    #[error("snapshot is locked by another owner: {}", path.display())]
    Locked { path: PathBuf },
}

impl CacheError {
    pub fn key_not_found(key: &str) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
        }
    }

    pub fn corrupt(path: &Path, reason: impl Into<String>) -> Self {
        Self::CorruptData {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub fn io(path: &Path, op: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            op,
            source,
        }
    }

    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_key_and_path() {
        let e = CacheError::key_not_found("alpha");
        assert!(e.is_key_not_found());
        assert_eq!(e.to_string(), "key not found: 'alpha'");

        let e = CacheError::corrupt(Path::new("/tmp/x.snap"), "bad magic");
        assert!(e.is_corrupt());
        assert!(e.to_string().contains("/tmp/x.snap"));
        assert!(e.to_string().contains("bad magic"));

        let e = CacheError::io(
            Path::new("/nope/x.snap"),
            "open for write",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        );
        assert!(e.is_io());
        assert!(e.to_string().starts_with("open for write /nope/x.snap"));
    }
}
