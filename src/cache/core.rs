//! cache/core — структура SnapshotCache и её аксессоры.
//!
//! Инварианты:
//! - path задаётся при создании и больше не меняется;
//! - data — авторитетное состояние в памяти; файл меняет только flush();
//! - Drop НЕ делает flush: без write-through несохранённые мутации теряются.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::config::CacheConfig;
use crate::lock::LockGuard;
use crate::policy::SyncPolicy;
use crate::value::Value;

pub struct SnapshotCache {
    pub(crate) cfg: CacheConfig,
    pub(crate) data: BTreeMap<String, Value>,
    /// >0 while inside batch(): mutations only mark `dirty`.
    pub(crate) defer_depth: u32,
    pub(crate) dirty: bool,
    pub(crate) _lock: Option<LockGuard>,
}

impl SnapshotCache {
    pub(crate) fn empty(cfg: CacheConfig, lock: Option<LockGuard>) -> Self {
        Self {
            cfg,
            data: BTreeMap::new(),
            defer_depth: 0,
            dirty: false,
            _lock: lock,
        }
    }

    /// Backing snapshot file.
    pub fn path(&self) -> &Path {
        &self.cfg.path
    }

    pub fn policy(&self) -> SyncPolicy {
        self.cfg.policy
    }

    pub fn is_autosync(&self) -> bool {
        self.cfg.policy.is_autosync()
    }

    /// Switch the sync policy. Switching to write-through does not flush by itself;
    /// the next mutation (or an explicit flush) writes the snapshot.
    pub fn set_policy(&mut self, policy: SyncPolicy) {
        self.cfg.policy = policy;
    }

    pub fn set_autosync(&mut self, on: bool) {
        self.set_policy(SyncPolicy::from_autosync(on));
    }

    pub fn config(&self) -> &CacheConfig {
        &self.cfg
    }

    /// Whether this instance holds the advisory lock on `<file>.lock`.
    pub fn is_locked(&self) -> bool {
        self._lock.is_some()
    }
}

impl fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("path", &self.cfg.path)
            .field("policy", &self.cfg.policy)
            .field("entries", &self.data.len())
            .field("locked", &self._lock.is_some())
            .finish()
    }
}
