//! Lightweight global metrics for SnapCache.
//!
//! Потокобезопасные атомарные счётчики (process-wide):
//! - load: успешные/пропущенные (нет файла или 0 B)/повреждённые
//! - flush: всего и сколько из них сделано автоматически (write-through)
//! - байты прочитанные/записанные

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

// ----- load -----
static LOADS_TOTAL: AtomicU64 = AtomicU64::new(0);
static LOADS_SKIPPED_EMPTY: AtomicU64 = AtomicU64::new(0);
static CORRUPT_LOADS: AtomicU64 = AtomicU64::new(0);
static BYTES_READ: AtomicU64 = AtomicU64::new(0);

// ----- flush -----
static FLUSHES_TOTAL: AtomicU64 = AtomicU64::new(0);
static AUTOSYNC_FLUSHES: AtomicU64 = AtomicU64::new(0);
static BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsSnapshot {
    pub loads_total: u64,
    pub loads_skipped_empty: u64,
    pub corrupt_loads: u64,
    pub bytes_read: u64,

    pub flushes_total: u64,
    pub autosync_flushes: u64,
    pub bytes_written: u64,
}

impl MetricsSnapshot {
    pub fn avg_flush_bytes(&self) -> f64 {
        if self.flushes_total == 0 {
            0.0
        } else {
            self.bytes_written as f64 / self.flushes_total as f64
        }
    }
}

pub fn record_load(bytes: u64) {
    LOADS_TOTAL.fetch_add(1, Ordering::Relaxed);
    BYTES_READ.fetch_add(bytes, Ordering::Relaxed);
}

pub fn record_load_skipped_empty() {
    LOADS_SKIPPED_EMPTY.fetch_add(1, Ordering::Relaxed);
}

pub fn record_corrupt_load() {
    CORRUPT_LOADS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_flush(bytes: u64, autosync: bool) {
    FLUSHES_TOTAL.fetch_add(1, Ordering::Relaxed);
    BYTES_WRITTEN.fetch_add(bytes, Ordering::Relaxed);
    if autosync {
        AUTOSYNC_FLUSHES.fetch_add(1, Ordering::Relaxed);
    }
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        loads_total: LOADS_TOTAL.load(Ordering::Relaxed),
        loads_skipped_empty: LOADS_SKIPPED_EMPTY.load(Ordering::Relaxed),
        corrupt_loads: CORRUPT_LOADS.load(Ordering::Relaxed),
        bytes_read: BYTES_READ.load(Ordering::Relaxed),
        flushes_total: FLUSHES_TOTAL.load(Ordering::Relaxed),
        autosync_flushes: AUTOSYNC_FLUSHES.load(Ordering::Relaxed),
        bytes_written: BYTES_WRITTEN.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    LOADS_TOTAL.store(0, Ordering::Relaxed);
    LOADS_SKIPPED_EMPTY.store(0, Ordering::Relaxed);
    CORRUPT_LOADS.store(0, Ordering::Relaxed);
    BYTES_READ.store(0, Ordering::Relaxed);
    FLUSHES_TOTAL.store(0, Ordering::Relaxed);
    AUTOSYNC_FLUSHES.store(0, Ordering::Relaxed);
    BYTES_WRITTEN.store(0, Ordering::Relaxed);
}
