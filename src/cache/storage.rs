//! Disk persistence for the response cache
//!
//! Snapshots carry absolute expiry timestamps so entries keep aging across
//! process restarts. Entries already expired at load time are dropped, which
//! keeps the freshness invariant: a reload can only produce misses, never
//! stale hits. Persistence is optional; a memory-only cache simply starts
//! cold after a restart, and a cold start is itself a valid reason to
//! refetch.

use super::ResponseCache;
use crate::errors::{ClientError, ClientResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    key: String,
    value: Value,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheSnapshot {
    entries: Vec<SnapshotEntry>,
}

/// Write the cache's live entries to a JSON snapshot file.
pub fn save_snapshot<P: AsRef<Path>>(cache: &ResponseCache, path: P) -> ClientResult<()> {
    let now = Utc::now();
    let snapshot = CacheSnapshot {
        entries: cache
            .entries()
            .into_iter()
            .filter_map(|(key, value, remaining)| {
                let remaining = chrono::Duration::from_std(remaining).ok()?;
                Some(SnapshotEntry {
                    key,
                    value,
                    expires_at: now + remaining,
                })
            })
            .collect(),
    };

    let data = serde_json::to_string_pretty(&snapshot)?;
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, data)?;
    Ok(())
}

/// Restore entries from a snapshot file, skipping anything already expired.
///
/// Returns the number of entries restored. A missing file is an empty
/// snapshot, not an error.
pub fn load_snapshot<P: AsRef<Path>>(cache: &ResponseCache, path: P) -> ClientResult<usize> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(0);
    }

    let data = fs::read_to_string(path)?;
    let snapshot: CacheSnapshot = serde_json::from_str(&data).map_err(|e| {
        ClientError::Data(format!(
            "Cache snapshot {} is not readable: {}",
            path.display(),
            e
        ))
    })?;

    let now = Utc::now();
    let mut restored = 0;
    for entry in snapshot.entries {
        let remaining = entry.expires_at - now;
        match remaining.to_std() {
            Ok(remaining) if !remaining.is_zero() => {
                cache.restore(entry.key, entry.value, remaining);
                restored += 1;
            }
            // Negative or zero remaining lifetime: expired while we were away
            _ => {}
        }
    }

    Ok(restored)
}
