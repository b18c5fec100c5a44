//! cache/open — конструирование SnapshotCache.
//!
//! Порядок: (опционально) lock → пустая карта → load().
//! Отсутствующий или пустой файл — это "кэш пуст", а не ошибка; сам файл здесь не создаётся.

use log::info;
use std::path::Path;

use crate::config::{CacheBuilder, CacheConfig};
use crate::error::Result;
use crate::lock::try_acquire_exclusive_lock;
use crate::policy::SyncPolicy;

use super::core::SnapshotCache;

impl SnapshotCache {
    pub fn open_with_config(cfg: CacheConfig) -> Result<Self> {
        let lock = if cfg.lock {
            Some(try_acquire_exclusive_lock(&cfg.path)?)
        } else {
            None
        };

        let mut cache = Self::empty(cfg, lock);
        cache.load()?;

        info!(
            "cache: opened {} ({} entries, policy={})",
            cache.path().display(),
            cache.data.len(),
            cache.cfg.policy
        );
        Ok(cache)
    }

    pub fn open<P: AsRef<Path>>(path: P, policy: SyncPolicy) -> Result<Self> {
        Self::open_with_config(CacheConfig::for_path(path).with_policy(policy))
    }

    /// Classic constructor shape: `(file_path, autosync)`.
    pub fn with_autosync<P: AsRef<Path>>(path: P, autosync: bool) -> Result<Self> {
        Self::open(path, SyncPolicy::from_autosync(autosync))
    }

    /// `datastore.snap` in the current directory, manual sync.
    pub fn open_default() -> Result<Self> {
        Self::open_with_config(CacheConfig::default())
    }

    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }
}
