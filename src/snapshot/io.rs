//! snapshot/io — чтение/запись файла снапшота целиком.
//!
//! - read_snapshot: файла нет или он нулевой длины → Ok(None); иначе читаем всё и декодируем.
//! - write_snapshot: полная перезапись. Два режима:
//!   * in-place: create+truncate+write (базовое поведение);
//!   * atomic: <file>.tmp → sync_all → rename → fsync родительского каталога (best‑effort).
//!
//! Хэндлы файлов живут только внутри вызова и закрываются на любом выходе.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
#[cfg(unix)]
use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{CacheError, Result};
use crate::value::Value;

use super::format::{decode_snapshot, SnapHeader};

/// Параметры записи снапшота.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOpts {
    pub atomic: bool,
    pub fsync: bool,
}

/// Результат успешного чтения.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub header: SnapHeader,
    pub data: BTreeMap<String, Value>,
    pub file_bytes: u64,
}

/// Путь временного файла для атомарной записи: <file>.tmp
pub fn tmp_path_for(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        CacheError::io(
            path,
            "resolve file name",
            std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;
    let mut tmp_name = name.to_os_string();
    tmp_name.push(".tmp");
    Ok(path.with_file_name(tmp_name))
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Прочитать и декодировать снапшот.
///
/// Ok(None) — "пусто": файла нет, либо он нулевой длины.
pub fn read_snapshot(path: &Path) -> Result<Option<LoadedSnapshot>> {
    let md = match fs::metadata(path) {
        Ok(md) => md,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CacheError::io(path, "stat", e)),
    };
    if md.is_dir() {
        return Err(CacheError::io(
            path,
            "stat",
            std::io::Error::new(ErrorKind::Other, "snapshot path is a directory"),
        ));
    }
    if md.len() == 0 {
        return Ok(None);
    }

    let buf = {
        let mut f = match OpenOptions::new().read(true).open(path) {
            Ok(f) => f,
            // удалили между stat и open — считаем, что файла нет
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, "open for read", e)),
        };
        let mut buf = Vec::with_capacity(md.len() as usize);
        f.read_to_end(&mut buf)
            .map_err(|e| CacheError::io(path, "read", e))?;
        buf
    };
    if buf.is_empty() {
        return Ok(None);
    }

    let (header, data) =
        decode_snapshot(&buf).map_err(|reason| CacheError::corrupt(path, reason))?;
    debug!(
        "snapshot: read {} ({} B, {} entries, codec={})",
        path.display(),
        buf.len(),
        data.len(),
        header.codec
    );
    Ok(Some(LoadedSnapshot {
        header,
        data,
        file_bytes: buf.len() as u64,
    }))
}

/// Записать готовые байты снапшота по пути, полностью заменяя содержимое.
pub fn write_snapshot(path: &Path, bytes: &[u8], opts: WriteOpts) -> Result<()> {
    if opts.atomic {
        write_atomic(path, bytes, opts.fsync)
    } else {
        write_in_place(path, bytes, opts.fsync)
    }
}

fn write_in_place(path: &Path, bytes: &[u8], fsync: bool) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| CacheError::io(path, "open for write", e))?;
    f.write_all(bytes)
        .map_err(|e| CacheError::io(path, "write", e))?;
    if fsync {
        f.sync_all().map_err(|e| CacheError::io(path, "fsync", e))?;
    }
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8], fsync: bool) -> Result<()> {
    let tmp = tmp_path_for(path)?;
    let _ = fs::remove_file(&tmp); // best‑effort

    let res = (|| -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(|e| CacheError::io(&tmp, "open for write", e))?;
        f.write_all(bytes)
            .map_err(|e| CacheError::io(&tmp, "write", e))?;
        // tmp обязан быть на диске до rename, иначе после краша можно получить пустой файл
        f.sync_all().map_err(|e| CacheError::io(&tmp, "fsync", e))?;
        drop(f);

        fs::rename(&tmp, path).map_err(|e| CacheError::io(path, "rename tmp over", e))?;
        Ok(())
    })();

    if let Err(e) = res {
        if let Err(rm) = fs::remove_file(&tmp) {
            if rm.kind() != ErrorKind::NotFound {
                warn!("snapshot: leftover tmp {}: {}", tmp.display(), rm);
            }
        }
        return Err(e);
    }

    if fsync {
        if let Err(e) = fsync_dir(path) {
            warn!("snapshot: fsync dir for {}: {}", path.display(), e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::format::{encode_snapshot, Codec};

    fn unique_path(prefix: &str) -> PathBuf {
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("snapc-io-{}-{}-{}", prefix, std::process::id(), t));
        fs::create_dir_all(&dir).unwrap();
        dir.join("data.snap")
    }

    #[test]
    fn missing_and_empty_files_read_as_none() {
        let p = unique_path("none");
        assert!(read_snapshot(&p).unwrap().is_none());

        fs::write(&p, b"").unwrap();
        assert!(read_snapshot(&p).unwrap().is_none());
    }

    #[test]
    fn in_place_and_atomic_writes_replace_content() {
        for atomic in [false, true] {
            let p = unique_path(if atomic { "atomic" } else { "inplace" });
            fs::write(&p, vec![0xAA; 4096]).unwrap();

            let mut m = BTreeMap::new();
            m.insert("k".to_string(), Value::from("v"));
            let bytes = encode_snapshot(&m, Codec::None).unwrap();
            write_snapshot(&p, &bytes, WriteOpts { atomic, fsync: true }).unwrap();

            assert_eq!(fs::read(&p).unwrap(), bytes);
            assert!(!tmp_path_for(&p).unwrap().exists());
            let got = read_snapshot(&p).unwrap().expect("must load");
            assert_eq!(got.data, m);
            assert_eq!(got.file_bytes, bytes.len() as u64);
        }
    }

    #[test]
    fn garbage_is_corrupt_not_io() {
        let p = unique_path("garbage");
        fs::write(&p, b"not a snapshot at all, definitely").unwrap();
        let err = read_snapshot(&p).unwrap_err();
        assert!(err.is_corrupt(), "{}", err);
    }

    #[test]
    fn tmp_name_appends_suffix() {
        let p = Path::new("/var/tmp/datastore.snap");
        assert_eq!(tmp_path_for(p).unwrap(), PathBuf::from("/var/tmp/datastore.snap.tmp"));
        assert!(tmp_path_for(Path::new("/")).is_err());
    }
}
