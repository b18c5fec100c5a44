use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use SnapCache::SyncPolicy;

use super::util::{decode_value_arg, open_cache};

#[derive(Debug, Deserialize)]
struct RawOp {
    op: String,
    key: String,
    value: Option<String>,
}

pub fn exec(path: Option<PathBuf>, ops_file: Option<PathBuf>, ops_json: Option<String>) -> Result<()> {
    let raw = if let Some(p) = ops_file {
        std::fs::read_to_string(&p).with_context(|| format!("read ops file {}", p.display()))?
    } else if let Some(s) = ops_json {
        s
    } else {
        return Err(anyhow!("provide --ops-file or --ops-json"));
    };

    let ops: Vec<RawOp> = serde_json::from_str(&raw).context("parse ops json (array of objects)")?;
    if ops.is_empty() {
        println!("No ops to execute.");
        return Ok(());
    }

    // Разбираем значения до открытия кэша: ошибка в аргументах не должна ничего менять.
    let mut prepared = Vec::with_capacity(ops.len());
    for op in ops {
        match op.op.to_ascii_lowercase().as_str() {
            "set" | "put" => {
                let v = op
                    .value
                    .ok_or_else(|| anyhow!("set requires value for key '{}'", op.key))?;
                let (val, _src) = decode_value_arg(&v)?;
                prepared.push((op.key, Some(val)));
            }
            "del" | "delete" => prepared.push((op.key, None)),
            other => return Err(anyhow!("unknown op '{}'", other)),
        }
    }

    let total = prepared.len();
    let mut cache = open_cache(path, SyncPolicy::WriteThrough)?;
    cache.batch(|c| {
        for (key, val) in prepared {
            match val {
                Some(v) => c.set(key, v)?,
                None => {
                    c.delete(&key)?;
                }
            }
        }
        Ok(())
    })?;

    println!("Batch: OK ({} ops), entries={}", total, cache.size());
    Ok(())
}
