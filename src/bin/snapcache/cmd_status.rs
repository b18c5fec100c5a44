use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use SnapCache::metrics;
use SnapCache::snapshot::{read_snapshot, SNAP_HDR_SIZE};

use super::util::config_for;

/// Статус снапшота. Файл читается напрямую, кэш не открывается (и lock не берётся).
pub fn exec(path: Option<PathBuf>, json: bool) -> Result<()> {
    let cfg = config_for(path);
    let file_len = std::fs::metadata(&cfg.path).ok().map(|m| m.len());

    // corrupt — не ошибка команды, а часть отчёта
    let (header, entries, problem) = match read_snapshot(&cfg.path) {
        Ok(Some(s)) => (Some(s.header), s.data.len(), None),
        Ok(None) => (None, 0, None),
        Err(e) => (None, 0, Some(e.to_string())),
    };

    if json {
        let ms = metrics::snapshot();
        let out = json!({
            "path": cfg.path.display().to_string(),
            "exists": file_len.is_some(),
            "file_bytes": file_len,
            "entries": entries,
            "header": header.as_ref().map(|h| json!({
                "version": h.version,
                "codec": h.codec.to_string(),
                "header_bytes": SNAP_HDR_SIZE,
                "payload_len": h.payload_len,
                "payload_crc": format!("{:08x}", h.payload_crc),
            })),
            "problem": problem,
            "config": {
                "policy": cfg.policy.to_string(),
                "atomic_flush": cfg.atomic_flush,
                "fsync": cfg.fsync,
                "codec": cfg.codec.to_string(),
                "lock": cfg.lock,
            },
            "metrics": ms,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Snapshot: {}", cfg.path.display());
    match file_len {
        None => println!("  file:        absent (cache starts empty)"),
        Some(0) => println!("  file:        0 B (treated as empty)"),
        Some(n) => println!("  file:        {} B", n),
    }
    if let Some(h) = &header {
        println!("  version:     {}", h.version);
        println!("  codec:       {}", h.codec);
        println!("  payload:     {} B (crc32 {:08x})", h.payload_len, h.payload_crc);
    }
    println!("  entries:     {}", entries);
    if let Some(p) = &problem {
        println!("  PROBLEM:     {}", p);
    }
    println!("  {}", cfg);
    Ok(())
}
