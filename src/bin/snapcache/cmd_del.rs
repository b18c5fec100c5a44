use anyhow::Result;
use std::path::PathBuf;

use SnapCache::SyncPolicy;

use super::util::open_cache;

pub fn exec(path: Option<PathBuf>, key: String) -> Result<()> {
    let mut cache = open_cache(path, SyncPolicy::WriteThrough)?;
    let old = cache.delete(&key)?;
    println!(
        "DELETED '{}' (was {}), entries={}",
        key,
        old.type_name(),
        cache.size()
    );
    Ok(())
}
