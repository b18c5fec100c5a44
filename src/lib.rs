#![allow(non_snake_case)]

// Базовые модули
pub mod error;
pub mod value;
pub mod policy;
pub mod config;
pub mod metrics;
pub mod lock;

// Формат файла снапшота и его IO
pub mod snapshot; // src/snapshot/{mod,format,io}.rs

// Сам кэш
pub mod cache; // src/cache/{mod,core,open,kv,persist}.rs

// Удобные реэкспорты
pub use cache::SnapshotCache;
pub use config::{CacheBuilder, CacheConfig, DEFAULT_FILE};
pub use error::{CacheError, Result};
pub use policy::SyncPolicy;
pub use snapshot::Codec;
pub use value::Value;
