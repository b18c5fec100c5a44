use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use SnapCache::{SyncPolicy, Value};

use super::util::{hex_dump, open_cache};

pub fn exec(path: Option<PathBuf>, key: String, out: Option<PathBuf>, json: bool) -> Result<()> {
    let cache = open_cache(path, SyncPolicy::Manual)?;
    let v = cache.get(&key)?;

    if json {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(());
    }

    if let Some(out_path) = out {
        let raw: Vec<u8> = match v.as_bytes() {
            Some(b) => b.to_vec(),
            None => v.to_string().into_bytes(),
        };
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut f = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)?;
        f.write_all(&raw)?;
        f.sync_all()?;
        println!(
            "FOUND '{}': {} B -> wrote to {}",
            key,
            raw.len(),
            out_path.display()
        );
        return Ok(());
    }

    match v {
        Value::Bytes(b) => {
            println!("FOUND '{}': bytes, {} B", key, b.len());
            println!("hex:  {}", hex_dump(b, 64));
        }
        other => println!("FOUND '{}': {} = {}", key, other.type_name(), other),
    }
    Ok(())
}
