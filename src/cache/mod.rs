//! cache — SnapshotCache: in-memory map + single-file snapshot.
//!
//! Разделение по подмодулям:
//! - core.rs    — структура SnapshotCache, аксессоры, политика синхронизации
//! - open.rs    — конструкторы (open/with_autosync/open_with_config), lock, первичный load
//! - kv.rs      — операции над картой (set/get/delete/size/clear/iter)
//! - persist.rs — load/flush, единая точка maybe_persist, batch (отложенный flush)

pub mod core;
pub mod kv;
pub mod open;
pub mod persist;

pub use self::core::SnapshotCache;
