use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI для SnapCache (обёртка над SnapshotCache)
#[derive(Parser, Debug)]
#[command(name = "snapcache", version, about = "SnapCache CLI: single-file snapshot KV cache")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Set key to value (write-through: the snapshot is flushed immediately)
    ///
    /// Формы значения:
    ///   hello            — строка
    ///   json:42          — JSON (число/bool/null/массив/объект)
    ///   hex:deadbeef     — байты
    ///   @./file.bin      — байты из файла
    ///   -                — байты из stdin
    Set {
        /// Snapshot file (default: $SNAPCACHE_PATH or ./datastore.snap)
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
    /// Get key
    Get {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        key: String,
        /// Optional file to write raw bytes/string into
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the tagged JSON form
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Delete key (write-through)
    Del {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long)]
        key: String,
    },
    /// List entries in key order (--json prints one JSON object)
    List {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Batch operations from JSON, one flush at the end
    ///
    /// JSON формат (массив объектов):
    /// [
    ///   {"op":"set","key":"alpha","value":"1"},
    ///   {"op":"set","key":"bin","value":"hex:deadbeef"},
    ///   {"op":"del","key":"alpha"}
    /// ]
    Batch {
        #[arg(long)]
        path: Option<PathBuf>,
        /// JSON-файл с операциями
        #[arg(long)]
        ops_file: Option<PathBuf>,
        /// JSON-строка с операциями (если ops_file не задан)
        #[arg(long)]
        ops_json: Option<String>,
    },
    /// Rewrite the snapshot (e.g. to switch codec)
    ///
    /// Пример:
    ///   snapcache flush --path ./cache.snap --codec zstd
    Flush {
        #[arg(long)]
        path: Option<PathBuf>,
        /// none|zstd (default: $SNAPCACHE_CODEC or none)
        #[arg(long)]
        codec: Option<String>,
    },
    /// Print snapshot header, entry count, config and metrics
    Status {
        #[arg(long)]
        path: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
