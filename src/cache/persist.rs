//! cache/persist — синхронизация карты в памяти со снапшотом на диске.
//!
//! - load(): файл есть и непустой → декодировать целиком и заменить data (без слияния);
//!   файла нет / 0 B → data не трогаем; повреждён → CorruptData, data не трогаем.
//! - flush(): сериализовать всю карту и перезаписать файл (полный снапшот).
//! - maybe_persist(): единственное место, где политика решает, писать ли после мутации.
//! - batch(): мутации внутри замыкания откладывают flush до конца (один flush под write-through).

use log::{debug, warn};

use crate::error::Result;
use crate::metrics;
use crate::snapshot::{encode_snapshot, read_snapshot, write_snapshot};

use super::core::SnapshotCache;

impl SnapshotCache {
    /// Reload from the backing file.
    ///
    /// Returns `true` if `data` was replaced, `false` if the file is absent or empty.
    pub fn load(&mut self) -> Result<bool> {
        match read_snapshot(self.path()) {
            Ok(Some(snap)) => {
                metrics::record_load(snap.file_bytes);
                debug!(
                    "cache: load {} -> {} entries ({} B)",
                    self.path().display(),
                    snap.data.len(),
                    snap.file_bytes
                );
                self.data = snap.data;
                self.dirty = false;
                Ok(true)
            }
            Ok(None) => {
                metrics::record_load_skipped_empty();
                debug!(
                    "cache: load {} skipped (absent or empty)",
                    self.path().display()
                );
                Ok(false)
            }
            Err(e) => {
                if e.is_corrupt() {
                    metrics::record_corrupt_load();
                    warn!("cache: {}", e);
                }
                Err(e)
            }
        }
    }

    /// Write the whole map to the backing file, replacing its content.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_inner(false)
    }

    /// Mutations made since the last successful load/flush are not on disk yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run `f` with persistence deferred, then flush once if the policy asks for it.
    ///
    /// There is no rollback: mutations are applied to memory as they happen. If `f`
    /// fails under write-through, whatever it already changed is still flushed so
    /// that the file mirrors memory, and `f`'s error is returned.
    pub fn batch<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Self) -> Result<R>,
    {
        let mut deferred = Deferred::enter(self);
        let res = f(&mut *deferred.cache);
        drop(deferred);

        if self.defer_depth > 0 || !self.dirty || !self.cfg.policy.flush_after_mutation() {
            return res;
        }

        let flushed = self.flush_inner(true);
        match (res, flushed) {
            (Ok(r), Ok(())) => Ok(r),
            (Ok(_), Err(fe)) => Err(fe),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(fe)) => {
                warn!("cache: flush after failed batch: {}", fe);
                Err(e)
            }
        }
    }

    pub(crate) fn maybe_persist(&mut self) -> Result<()> {
        self.dirty = true;
        if self.defer_depth > 0 || !self.cfg.policy.flush_after_mutation() {
            return Ok(());
        }
        self.flush_inner(true)
    }

    fn flush_inner(&mut self, autosync: bool) -> Result<()> {
        let bytes = encode_snapshot(&self.data, self.cfg.codec)?;
        write_snapshot(self.path(), &bytes, self.cfg.write_opts())?;
        self.dirty = false;

        metrics::record_flush(bytes.len() as u64, autosync);
        debug!(
            "cache: flush {} ({} entries, {} B, codec={}, atomic={}, auto={})",
            self.path().display(),
            self.data.len(),
            bytes.len(),
            self.cfg.codec,
            self.cfg.atomic_flush,
            autosync
        );
        Ok(())
    }
}

/// Открытый batch: defer_depth поднят, пока guard жив (в том числе при панике в замыкании).
struct Deferred<'a> {
    cache: &'a mut SnapshotCache,
}

impl<'a> Deferred<'a> {
    fn enter(cache: &'a mut SnapshotCache) -> Self {
        cache.defer_depth += 1;
        Self { cache }
    }
}

impl Drop for Deferred<'_> {
    fn drop(&mut self) {
        self.cache.defer_depth -= 1;
    }
}
