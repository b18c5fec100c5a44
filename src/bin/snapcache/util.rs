use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::io::Read;
use std::path::PathBuf;

use SnapCache::{CacheConfig, SnapshotCache, SyncPolicy, Value};

/// Конфиг из ENV с переопределением пути из --path.
pub fn config_for(path: Option<PathBuf>) -> CacheConfig {
    let cfg = CacheConfig::from_env();
    match path {
        Some(p) => cfg.with_path(p),
        None => cfg,
    }
}

pub fn open_cache(path: Option<PathBuf>, policy: SyncPolicy) -> Result<SnapshotCache> {
    let cfg = config_for(path).with_policy(policy);
    let shown = cfg.path.display().to_string();
    SnapshotCache::open_with_config(cfg).with_context(|| format!("open cache {}", shown))
}

pub fn decode_value_arg(arg: &str) -> Result<(Value, &'static str)> {
    if arg == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok((Value::Bytes(buf), "stdin"));
    }
    if let Some(p) = arg.strip_prefix('@') {
        let path = PathBuf::from(p);
        let mut f = OpenOptions::new()
            .read(true)
            .open(&path)
            .map_err(|e| anyhow!("open value file {}: {}", path.display(), e))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)?;
        return Ok((Value::Bytes(buf), "file"));
    }
    if let Some(hx) = arg.strip_prefix("hex:") {
        let v = decode_hex(hx)?;
        return Ok((Value::Bytes(v), "hex"));
    }
    if let Some(js) = arg.strip_prefix("json:") {
        let j: serde_json::Value =
            serde_json::from_str(js).with_context(|| format!("parse json value '{}'", js))?;
        return Ok((Value::from(j), "json"));
    }
    Ok((Value::Str(arg.to_string()), "literal"))
}

/// "hex:" аргумент: пары hex-цифр, пробелы и префикс 0x допускаются.
pub fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let digits: String = s.trim().trim_start_matches("0x").split_whitespace().collect();
    if digits.len() % 2 != 0 {
        return Err(anyhow!("hex value has odd number of digits ({})", digits.len()));
    }
    digits
        .as_bytes()
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .ok_or_else(|| anyhow!("bad hex byte #{} '{}'", i, String::from_utf8_lossy(pair)))
        })
        .collect()
}

/// Первые `max` байт по 16 в строке; хвост сверх `max` — пометкой "(+N B)".
pub fn hex_dump(bytes: &[u8], max: usize) -> String {
    let shown = &bytes[..bytes.len().min(max)];
    let mut lines: Vec<String> = shown
        .chunks(16)
        .map(|row| row.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "))
        .collect();
    if bytes.len() > shown.len() {
        lines.push(format!("... (+{} B)", bytes.len() - shown.len()));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_arg_forms() {
        assert_eq!(decode_hex("deadBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_hex("0x00 ff").unwrap(), vec![0x00, 0xff]);
        assert!(decode_hex("abc").is_err());
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn hex_dump_caps_output() {
        let bytes: Vec<u8> = (0u8..20).collect();
        let full = hex_dump(&bytes, 64);
        assert_eq!(full.lines().count(), 2);
        assert!(full.starts_with("00 01 02"));

        let cut = hex_dump(&bytes, 4);
        assert_eq!(cut, "00 01 02 03\n... (+16 B)");
    }
}
