//! Sync policy: when mutations reach the backing file.

use std::fmt;
use std::str::FromStr;

/// How mutating calls (set/delete/clear) are persisted.
///
/// - `Manual` (default): only an explicit `flush()` writes the snapshot.
/// - `WriteThrough`: every successful mutation flushes before returning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPolicy {
    #[default]
    Manual,
    WriteThrough,
}

impl SyncPolicy {
    /// Map the classic `autosync` boolean onto a policy.
    pub fn from_autosync(autosync: bool) -> Self {
        if autosync {
            SyncPolicy::WriteThrough
        } else {
            SyncPolicy::Manual
        }
    }

    pub fn is_autosync(self) -> bool {
        self == SyncPolicy::WriteThrough
    }

    /// Whether a completed mutation must be followed by a flush.
    #[inline]
    pub fn flush_after_mutation(self) -> bool {
        self.is_autosync()
    }
}

impl fmt::Display for SyncPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncPolicy::Manual => f.write_str("manual"),
            SyncPolicy::WriteThrough => f.write_str("write-through"),
        }
    }
}

impl FromStr for SyncPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" | "0" | "false" | "off" | "no" => Ok(SyncPolicy::Manual),
            "write-through" | "writethrough" | "autosync" | "1" | "true" | "on" | "yes" => {
                Ok(SyncPolicy::WriteThrough)
            }
            other => Err(format!("unknown sync policy '{}'", other)),
        }
    }
}
