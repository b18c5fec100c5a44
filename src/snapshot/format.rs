// src/snapshot/format.rs — формат файла снапшота (v1)
//
// Формат <file> (LE):
// MAGIC8 = "SNAPCACH"
// u32 version      = 1
// u16 codec        (0=none, 1=zstd)
// u16 reserved     = 0
// u64 payload_len  (байт после заголовка)
// u32 payload_crc  (crc32 по хранимым байтам payload, т.е. после сжатия)
// payload          JSON-объект { key: Value }, опционально сжатый zstd
//
// Политика:
// - Любая ошибка разбора (заголовок, crc, распаковка, JSON) — это "corrupt", причина строкой.
// - Пустой файл сюда не попадает: его отсекает io::read_snapshot.
// - Распакованный zstd payload ограничен MAX_DECODED_PAYLOAD; больше не пишем и не читаем.
// - Значения глубже value::MAX_DEPTH не пишем: serde_json не прочитает их обратно.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read};
use std::str::FromStr;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;

use crate::error::{CacheError, Result};
use crate::value::{check_depth, Value};

pub const SNAP_MAGIC: &[u8; 8] = b"SNAPCACH";
pub const SNAP_VERSION: u32 = 1;
pub const SNAP_HDR_SIZE: usize = 28;

pub const CODEC_NONE: u16 = 0;
pub const CODEC_ZSTD: u16 = 1;

const ZSTD_LEVEL: i32 = 3;

/// Потолок для распакованного payload (1 GiB).
pub const MAX_DECODED_PAYLOAD: u64 = 1 << 30;

/// Сжатие payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    None,
    Zstd,
}

impl Codec {
    pub fn id(self) -> u16 {
        match self {
            Codec::None => CODEC_NONE,
            Codec::Zstd => CODEC_ZSTD,
        }
    }

    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            CODEC_NONE => Some(Codec::None),
            CODEC_ZSTD => Some(Codec::Zstd),
            _ => None,
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::None => f.write_str("none"),
            Codec::Zstd => f.write_str("zstd"),
        }
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "raw" | "" => Ok(Codec::None),
            "zstd" => Ok(Codec::Zstd),
            other => Err(format!("unknown codec '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapHeader {
    pub version: u32,
    pub codec: Codec,
    pub payload_len: u64,
    pub payload_crc: u32,
}

impl SnapHeader {
    pub fn write_to(&self, out: &mut Vec<u8>) {
        // Запись в Vec не падает.
        out.extend_from_slice(SNAP_MAGIC);
        let _ = out.write_u32::<LittleEndian>(self.version);
        let _ = out.write_u16::<LittleEndian>(self.codec.id());
        let _ = out.write_u16::<LittleEndian>(0);
        let _ = out.write_u64::<LittleEndian>(self.payload_len);
        let _ = out.write_u32::<LittleEndian>(self.payload_crc);
    }

    /// Разобрать заголовок из начала буфера.
    pub fn parse(buf: &[u8]) -> std::result::Result<Self, String> {
        if buf.len() < SNAP_HDR_SIZE {
            return Err(format!(
                "short header: {} B (need {} B)",
                buf.len(),
                SNAP_HDR_SIZE
            ));
        }
        if &buf[..8] != SNAP_MAGIC {
            return Err(format!("bad magic {:?}", &buf[..8]));
        }
        let mut rd = Cursor::new(&buf[8..SNAP_HDR_SIZE]);
        let version = rd.read_u32::<LittleEndian>().map_err(|e| e.to_string())?;
        if version != SNAP_VERSION {
            return Err(format!(
                "unsupported version {} (expected {})",
                version, SNAP_VERSION
            ));
        }
        let codec_id = rd.read_u16::<LittleEndian>().map_err(|e| e.to_string())?;
        let codec = Codec::from_id(codec_id).ok_or_else(|| format!("unknown codec id {}", codec_id))?;
        let _reserved = rd.read_u16::<LittleEndian>().map_err(|e| e.to_string())?;
        let payload_len = rd.read_u64::<LittleEndian>().map_err(|e| e.to_string())?;
        let payload_crc = rd.read_u32::<LittleEndian>().map_err(|e| e.to_string())?;
        Ok(Self {
            version,
            codec,
            payload_len,
            payload_crc,
        })
    }
}

fn crc32(bytes: &[u8]) -> u32 {
    let mut h = Crc32::new();
    h.update(bytes);
    h.finalize()
}

/// Сериализовать всю карту в байты файла (заголовок + payload).
pub fn encode_snapshot(data: &BTreeMap<String, Value>, codec: Codec) -> Result<Vec<u8>> {
    for (k, v) in data {
        check_depth(k, v)?;
    }
    let json = serde_json::to_vec(data).map_err(|e| CacheError::Encode {
        reason: format!("serialize payload: {}", e),
    })?;
    let payload = match codec {
        Codec::None => json,
        Codec::Zstd if json.len() as u64 > MAX_DECODED_PAYLOAD => {
            return Err(CacheError::Encode {
                reason: format!(
                    "payload {} B exceeds zstd decode limit {} B",
                    json.len(),
                    MAX_DECODED_PAYLOAD
                ),
            })
        }
        Codec::Zstd => zstd::bulk::compress(&json, ZSTD_LEVEL).map_err(|e| CacheError::Encode {
            reason: format!("zstd compress: {}", e),
        })?,
    };

    let hdr = SnapHeader {
        version: SNAP_VERSION,
        codec,
        payload_len: payload.len() as u64,
        payload_crc: crc32(&payload),
    };
    let mut out = Vec::with_capacity(SNAP_HDR_SIZE + payload.len());
    hdr.write_to(&mut out);
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Разобрать байты файла целиком. Err(reason) — файл повреждён.
pub fn decode_snapshot(buf: &[u8]) -> std::result::Result<(SnapHeader, BTreeMap<String, Value>), String> {
    let hdr = SnapHeader::parse(buf)?;
    let payload = &buf[SNAP_HDR_SIZE..];
    if payload.len() as u64 != hdr.payload_len {
        return Err(format!(
            "payload length mismatch: header says {} B, file has {} B",
            hdr.payload_len,
            payload.len()
        ));
    }
    let crc = crc32(payload);
    if crc != hdr.payload_crc {
        return Err(format!(
            "payload crc mismatch: expected {:08x}, got {:08x}",
            hdr.payload_crc, crc
        ));
    }

    let data = match hdr.codec {
        Codec::None => serde_json::from_slice(payload),
        Codec::Zstd => {
            let raw = zstd_decode_capped(payload, MAX_DECODED_PAYLOAD)?;
            serde_json::from_slice(&raw)
        }
    }
    .map_err(|e| format!("payload is not a key/value mapping: {}", e))?;

    Ok((hdr, data))
}

/// Распаковка с потолком: читаем не больше limit+1 байт, лишний байт = превышение.
fn zstd_decode_capped(payload: &[u8], limit: u64) -> std::result::Result<Vec<u8>, String> {
    let dec = zstd::stream::read::Decoder::new(payload).map_err(|e| format!("zstd decompress: {}", e))?;
    let mut rd = dec.take(limit + 1);
    let mut out = Vec::new();
    rd.read_to_end(&mut out)
        .map_err(|e| format!("zstd decompress: {}", e))?;
    if out.len() as u64 > limit {
        return Err(format!("zstd payload expands beyond {} B", limit));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<String, Value> {
        let mut m = BTreeMap::new();
        m.insert("test".to_string(), Value::from("hello"));
        m.insert("n".to_string(), Value::Int(42));
        m.insert("blob".to_string(), Value::Bytes(vec![0, 1, 2, 0xff]));
        m
    }

    #[test]
    fn header_layout_is_fixed() {
        let bytes = encode_snapshot(&BTreeMap::new(), Codec::None).unwrap();
        assert_eq!(&bytes[..8], SNAP_MAGIC);
        // пустая карта — это "{}"
        assert_eq!(bytes.len(), SNAP_HDR_SIZE + 2);
        let hdr = SnapHeader::parse(&bytes).unwrap();
        assert_eq!(hdr.version, SNAP_VERSION);
        assert_eq!(hdr.codec, Codec::None);
        assert_eq!(hdr.payload_len, 2);
    }

    #[test]
    fn both_codecs_decode_back() {
        for codec in [Codec::None, Codec::Zstd] {
            let bytes = encode_snapshot(&sample(), codec).unwrap();
            let (hdr, data) = decode_snapshot(&bytes).unwrap();
            assert_eq!(hdr.codec, codec);
            assert_eq!(data, sample());
        }
    }

    #[test]
    fn corruption_is_detected() {
        let good = encode_snapshot(&sample(), Codec::None).unwrap();

        assert!(decode_snapshot(b"garbage").unwrap_err().contains("short header"));

        let mut bad_magic = good.clone();
        bad_magic[0] ^= 0xff;
        assert!(decode_snapshot(&bad_magic).unwrap_err().contains("bad magic"));

        let mut bad_ver = good.clone();
        bad_ver[8] = 9;
        assert!(decode_snapshot(&bad_ver).unwrap_err().contains("unsupported version"));

        let mut bad_codec = good.clone();
        bad_codec[12] = 7;
        assert!(decode_snapshot(&bad_codec).unwrap_err().contains("unknown codec"));

        let truncated = &good[..good.len() - 1];
        assert!(decode_snapshot(truncated).unwrap_err().contains("length mismatch"));

        let mut flipped = good.clone();
        let last = flipped.len() - 2;
        flipped[last] ^= 0x01;
        assert!(decode_snapshot(&flipped).unwrap_err().contains("crc mismatch"));
    }

    #[test]
    fn valid_frame_with_wrong_shape_is_rejected() {
        // корректный заголовок и crc, но payload — JSON-массив
        let payload = b"[1,2,3]";
        let hdr = SnapHeader {
            version: SNAP_VERSION,
            codec: Codec::None,
            payload_len: payload.len() as u64,
            payload_crc: crc32(payload),
        };
        let mut buf = Vec::new();
        hdr.write_to(&mut buf);
        buf.extend_from_slice(payload);
        let err = decode_snapshot(&buf).unwrap_err();
        assert!(err.contains("not a key/value mapping"), "{}", err);
    }

    #[test]
    fn nesting_at_limit_decodes_and_deeper_is_refused() {
        use crate::value::MAX_DEPTH;

        let nest = |levels: usize| {
            let mut v = Value::Int(1);
            for _ in 0..levels {
                v = Value::List(vec![v]);
            }
            v
        };

        for codec in [Codec::None, Codec::Zstd] {
            let mut m = BTreeMap::new();
            m.insert("deep".to_string(), nest(MAX_DEPTH));
            let bytes = encode_snapshot(&m, codec).unwrap();
            let (_, back) = decode_snapshot(&bytes).unwrap();
            assert_eq!(back, m);

            m.insert("deeper".to_string(), nest(MAX_DEPTH + 1));
            let err = encode_snapshot(&m, codec).unwrap_err();
            assert!(matches!(err, CacheError::Encode { .. }), "{}", err);
        }
    }

    #[test]
    fn zstd_output_is_capped() {
        let raw = vec![b'a'; 4096];
        let packed = zstd::bulk::compress(&raw, ZSTD_LEVEL).unwrap();
        assert!(packed.len() < raw.len());

        assert_eq!(zstd_decode_capped(&packed, 4096).unwrap(), raw);
        let err = zstd_decode_capped(&packed, 1024).unwrap_err();
        assert!(err.contains("expands beyond 1024"), "{}", err);
    }

    #[test]
    fn codec_parse() {
        assert_eq!("zstd".parse::<Codec>(), Ok(Codec::Zstd));
        assert_eq!("NONE".parse::<Codec>(), Ok(Codec::None));
        assert!("lz4".parse::<Codec>().is_err());
    }
}
