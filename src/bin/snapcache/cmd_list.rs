use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

use SnapCache::{SyncPolicy, Value};

use super::util::open_cache;

pub fn exec(path: Option<PathBuf>, json: bool) -> Result<()> {
    let cache = open_cache(path, SyncPolicy::Manual)?;

    if json {
        let m: BTreeMap<&str, &Value> = cache.iter().map(|(k, v)| (k.as_str(), v)).collect();
        println!("{}", serde_json::to_string_pretty(&m)?);
        return Ok(());
    }

    for (k, v) in &cache {
        println!("{}\t{}\t{}", k, v.type_name(), v);
    }
    println!("-- {} entries", cache.size());
    Ok(())
}
