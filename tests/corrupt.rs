use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use SnapCache::snapshot::{SNAP_HDR_SIZE, SNAP_MAGIC};
use SnapCache::{CacheError, SnapshotCache, SyncPolicy, Value};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("snapctest-corrupt-{prefix}-{pid}-{t}-{id}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn open_on_garbage_is_corrupt_data() -> Result<()> {
    let root = unique_root("garbage");
    let path = root.join("bad.snap");
    fs::write(&path, b"\x80\x03}q\x00(X\x04\x00\x00\x00testq\x01")?;

    let err = SnapshotCache::open(&path, SyncPolicy::Manual).unwrap_err();
    assert!(err.is_corrupt(), "expected CorruptData, got {}", err);
    match err {
        CacheError::CorruptData { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }

    // файл не тронут
    assert_eq!(fs::read(&path)?, b"\x80\x03}q\x00(X\x04\x00\x00\x00testq\x01");
    Ok(())
}

#[test]
fn truncated_snapshot_is_corrupt_data() -> Result<()> {
    let root = unique_root("truncated");
    let path = root.join("data.snap");
    {
        let mut cache = SnapshotCache::open(&path, SyncPolicy::Manual)?;
        cache.set("key", "a fairly long value so that truncation hits the payload")?;
        cache.flush()?;
    }

    let full = fs::read(&path)?;
    assert_eq!(&full[..8], SNAP_MAGIC);
    assert!(full.len() > SNAP_HDR_SIZE + 10);

    // partial write: обрезаем хвост payload
    fs::write(&path, &full[..full.len() - 10])?;
    assert!(SnapshotCache::open(&path, SyncPolicy::Manual)
        .unwrap_err()
        .is_corrupt());

    // только половина заголовка
    fs::write(&path, &full[..SNAP_HDR_SIZE / 2])?;
    assert!(SnapshotCache::open(&path, SyncPolicy::Manual)
        .unwrap_err()
        .is_corrupt());
    Ok(())
}

#[test]
fn corrupt_reload_leaves_memory_unchanged() -> Result<()> {
    let root = unique_root("reload");
    let path = root.join("data.snap");

    let mut cache = SnapshotCache::open(&path, SyncPolicy::Manual)?;
    cache.set("a", 1)?;
    cache.set("b", "two")?;
    cache.flush()?;

    // кто-то испортил файл снаружи
    let mut bytes = fs::read(&path)?;
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, &bytes)?;

    let err = cache.load().unwrap_err();
    assert!(err.is_corrupt());
    assert_eq!(cache.size(), 2);
    assert_eq!(cache.get("a")?, &Value::Int(1));
    assert_eq!(cache.get("b")?, &Value::from("two"));

    // flush перезаписывает повреждённый файл целиком
    cache.flush()?;
    let reopened = SnapshotCache::open(&path, SyncPolicy::Manual)?;
    assert_eq!(reopened.size(), 2);
    Ok(())
}

#[test]
fn flush_into_missing_directory_is_io_error() -> Result<()> {
    let root = unique_root("nodir");
    let path = root.join("no").join("such").join("dir").join("data.snap");

    // open проходит: файла нет — кэш пуст
    let mut cache = SnapshotCache::open(&path, SyncPolicy::Manual)?;
    cache.set("k", "v")?;

    let err = cache.flush().unwrap_err();
    assert!(err.is_io(), "expected Io, got {}", err);
    // данные в памяти остались, кэш по-прежнему "грязный"
    assert_eq!(cache.size(), 1);
    assert!(cache.is_dirty());
    Ok(())
}

#[test]
fn write_through_surfaces_flush_failure_but_keeps_value() -> Result<()> {
    let root = unique_root("wt-fail");
    let path = root.join("missing-dir").join("data.snap");

    let mut cache = SnapshotCache::open(&path, SyncPolicy::WriteThrough)?;
    let err = cache.set("k", "v").unwrap_err();
    assert!(err.is_io());
    assert_eq!(cache.get("k")?, &Value::from("v"));
    Ok(())
}

#[test]
fn directory_in_place_of_file_is_io_error() -> Result<()> {
    let root = unique_root("isdir");
    let path = root.join("actually-a-dir");
    fs::create_dir_all(&path)?;

    let err = SnapshotCache::open(&path, SyncPolicy::Manual).unwrap_err();
    assert!(err.is_io(), "expected Io, got {}", err);
    Ok(())
}
