//! snapshot — on-disk snapshot file: format (header + payload) and whole-file IO.

pub mod format;
pub mod io;

pub use format::{
    decode_snapshot, encode_snapshot, Codec, SnapHeader, CODEC_NONE, CODEC_ZSTD, SNAP_HDR_SIZE,
    SNAP_MAGIC, SNAP_VERSION,
};
pub use io::{read_snapshot, tmp_path_for, write_snapshot, LoadedSnapshot, WriteOpts};
