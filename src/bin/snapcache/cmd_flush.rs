use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use SnapCache::{Codec, SnapshotCache, SyncPolicy};

use super::util::config_for;

pub fn exec(path: Option<PathBuf>, codec: Option<String>) -> Result<()> {
    let mut cfg = config_for(path).with_policy(SyncPolicy::Manual);
    if let Some(c) = codec {
        cfg.codec = c.parse::<Codec>().map_err(|e| anyhow!(e))?;
    }
    let shown = cfg.path.display().to_string();

    let mut cache = SnapshotCache::open_with_config(cfg)
        .with_context(|| format!("open cache {}", shown))?;
    cache.flush()?;

    let bytes = std::fs::metadata(cache.path()).map(|m| m.len()).unwrap_or(0);
    println!(
        "Flushed {}: {} entries, {} B, codec={}",
        shown,
        cache.size(),
        bytes,
        cache.config().codec
    );
    Ok(())
}
