use anyhow::Result;
use std::path::PathBuf;

use SnapCache::SyncPolicy;

use super::util::{decode_value_arg, open_cache};

pub fn exec(path: Option<PathBuf>, key: String, value: String) -> Result<()> {
    let (val, src) = decode_value_arg(&value)?;
    let type_name = val.type_name();

    let mut cache = open_cache(path, SyncPolicy::WriteThrough)?;
    let existed = cache.contains_key(&key);
    cache.set(key.as_str(), val)?;
    println!(
        "OK set: key='{}' type={} ({}){}, entries={}",
        key,
        type_name,
        src,
        if existed { " [overwrote]" } else { "" },
        cache.size()
    );
    Ok(())
}
