use crate::core::errors::{Error, Result};
use crate::core::prefix::Prefix;
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/*-------------------------------------------------------------------------------------------------
  Snapshot
-------------------------------------------------------------------------------------------------*/

/// One source's prefixes as of its last successful refresh.
///
/// The prefix list is always the output of a single parse of one feed document; refreshes
/// replace the whole snapshot rather than editing it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub last_update: DateTime<Utc>,
    pub prefixes: Vec<Prefix>,
}

impl Snapshot {
    pub fn new(prefixes: Vec<Prefix>) -> Self {
        Self {
            last_update: Utc::now(),
            prefixes,
        }
    }

    /// Whether the snapshot is younger than `refresh_interval`. A `last_update` in the future
    /// (clock skew between runs) counts as fresh.
    pub fn is_fresh(&self, refresh_interval: Duration) -> bool {
        match Utc::now().signed_duration_since(self.last_update).to_std() {
            Ok(elapsed) => elapsed < refresh_interval,
            Err(_) => true,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Snapshot Store
-------------------------------------------------------------------------------------------------*/

/*
    Callers serialize access per cache file (the owning source holds its refresh
    lock). Writes go to a temporary sibling file that is renamed over the target,
    so another process reading the cache never sees a partially written file.
*/

/// Persist a snapshot to `path`, creating parent directories when missing.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let temp_path = temp_path(path);
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .map_err(Error::from)
        .and_then(|_| write_snapshot(&temp_path, snapshot))
        .and_then(|_| fs::rename(&temp_path, path).map_err(Error::from));

    match result {
        Ok(()) => {
            info!(
                "Saved {} prefixes to: {:?}",
                snapshot.prefixes.len(),
                path
            );
            Ok(())
        }
        Err(error) => {
            let _ = fs::remove_file(&temp_path);
            error!("Failed to save snapshot to `{:?}`: {}", path, error);
            Err(error)
        }
    }
}

/// Restore a snapshot from `path`.
///
/// A file that exists but cannot be read or decoded is removed (best-effort) so the next
/// refresh falls through to the network instead of failing on the same bytes again.
pub fn load(path: &Path) -> Result<Snapshot> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!("No snapshot at: {:?}", path);
            return Err(error.into());
        }
        Err(error) => {
            error!("Failed to read snapshot `{:?}`: {}", path, error);
            remove_unreadable(path);
            return Err(error.into());
        }
    };

    serde_json::from_slice::<Snapshot>(&bytes)
        .inspect(|snapshot| {
            debug!(
                "Loaded {} prefixes updated at {} from: {:?}",
                snapshot.prefixes.len(),
                snapshot.last_update,
                path
            )
        })
        .map_err(Error::from)
        .inspect_err(|error| {
            error!("Failed to decode snapshot `{:?}`: {}", path, error);
            remove_unreadable(path);
        })
}

/*--------------------------------------------------------------------------------------
  Helper Functions
--------------------------------------------------------------------------------------*/

fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer(&mut writer, snapshot)?;
    writer.flush()?;
    Ok(())
}

static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

// Unique per process and per call, so concurrent writers never share a temporary file.
fn temp_path(path: &Path) -> PathBuf {
    let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut file_name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    file_name.push(format!(".{}.{}.tmp", std::process::id(), sequence));
    path.with_file_name(file_name)
}

fn remove_unreadable(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => warn!("Removed unreadable snapshot: {:?}", path),
        Err(error) => error!("Failed to remove unreadable snapshot `{:?}`: {}", path, error),
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
