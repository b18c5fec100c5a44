//! Centralized configuration and builder for SnapCache.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - CacheConfig::from_env() reads SNAPCACHE_* variables; Default is env-free.
//! - CacheBuilder produces a CacheConfig and can open the cache directly.
//!
//! Defaults match the baseline behavior: manual sync, in-place overwrite,
//! no fsync, no compression, no lock.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cache::SnapshotCache;
use crate::error::Result;
use crate::policy::SyncPolicy;
use crate::snapshot::{Codec, WriteOpts};

pub const DEFAULT_FILE: &str = "datastore.snap";

/// Top-level configuration for a SnapshotCache.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Backing snapshot file.
    /// Env: SNAPCACHE_PATH (default "datastore.snap")
    pub path: PathBuf,

    /// When mutations are persisted.
    /// Env: SNAPCACHE_AUTOSYNC (default false => Manual; "1|true|on|yes" => WriteThrough)
    pub policy: SyncPolicy,

    /// Replace the file via <file>.tmp + rename instead of truncating in place.
    /// Env: SNAPCACHE_ATOMIC_FLUSH (default false)
    pub atomic_flush: bool,

    /// sync_all the snapshot (and its directory, for atomic flush) on every flush.
    /// Env: SNAPCACHE_FSYNC (default false)
    pub fsync: bool,

    /// Payload codec for new snapshots. Reading accepts any known codec.
    /// Env: SNAPCACHE_CODEC = none|zstd (default none)
    pub codec: Codec,

    /// Hold an exclusive advisory lock on <file>.lock for the cache lifetime.
    /// Env: SNAPCACHE_LOCK (default false)
    pub lock: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FILE),
            policy: SyncPolicy::Manual,
            atomic_flush: false,
            fsync: false,
            codec: Codec::None,
            lock: false,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| {
        let s = v.trim().to_ascii_lowercase();
        s == "1" || s == "true" || s == "on" || s == "yes"
    })
}

impl CacheConfig {
    /// Config for a given path with everything else at defaults.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("SNAPCACHE_PATH") {
            let s = v.trim();
            if !s.is_empty() {
                cfg.path = PathBuf::from(s);
            }
        }

        if let Some(on) = env_flag("SNAPCACHE_AUTOSYNC") {
            cfg.policy = SyncPolicy::from_autosync(on);
        }
        if let Some(on) = env_flag("SNAPCACHE_ATOMIC_FLUSH") {
            cfg.atomic_flush = on;
        }
        if let Some(on) = env_flag("SNAPCACHE_FSYNC") {
            cfg.fsync = on;
        }
        if let Ok(v) = std::env::var("SNAPCACHE_CODEC") {
            match v.parse::<Codec>() {
                Ok(c) => cfg.codec = c,
                Err(e) => log::warn!("config: SNAPCACHE_CODEC ignored: {}", e),
            }
        }
        if let Some(on) = env_flag("SNAPCACHE_LOCK") {
            cfg.lock = on;
        }

        cfg
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_autosync(mut self, on: bool) -> Self {
        self.policy = SyncPolicy::from_autosync(on);
        self
    }

    pub fn with_atomic_flush(mut self, on: bool) -> Self {
        self.atomic_flush = on;
        self
    }

    pub fn with_fsync(mut self, on: bool) -> Self {
        self.fsync = on;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_lock(mut self, on: bool) -> Self {
        self.lock = on;
        self
    }

    pub(crate) fn write_opts(&self) -> WriteOpts {
        WriteOpts {
            atomic: self.atomic_flush,
            fsync: self.fsync,
        }
    }
}

impl fmt::Display for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheConfig {{ path: {}, policy: {}, atomic_flush: {}, fsync: {}, codec: {}, lock: {} }}",
            self.path.display(),
            self.policy,
            self.atomic_flush,
            self.fsync,
            self.codec,
            self.lock,
        )
    }
}

/// Lightweight builder: `SnapshotCache::builder().path(..).autosync(true).open()`.
#[derive(Clone, Debug)]
pub struct CacheBuilder {
    cfg: CacheConfig,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: CacheConfig::from_env(),
        }
    }
}

impl CacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: CacheConfig::default(),
        }
    }

    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cfg.path = path.as_ref().to_path_buf();
        self
    }

    pub fn policy(mut self, policy: SyncPolicy) -> Self {
        self.cfg.policy = policy;
        self
    }

    pub fn autosync(mut self, on: bool) -> Self {
        self.cfg.policy = SyncPolicy::from_autosync(on);
        self
    }

    pub fn atomic_flush(mut self, on: bool) -> Self {
        self.cfg.atomic_flush = on;
        self
    }

    pub fn fsync(mut self, on: bool) -> Self {
        self.cfg.fsync = on;
        self
    }

    pub fn codec(mut self, codec: Codec) -> Self {
        self.cfg.codec = codec;
        self
    }

    pub fn lock(mut self, on: bool) -> Self {
        self.cfg.lock = on;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> CacheConfig {
        self.cfg
    }

    /// Finish the builder and open the cache (loads the snapshot).
    pub fn open(self) -> Result<SnapshotCache> {
        SnapshotCache::open_with_config(self.cfg)
    }
}
