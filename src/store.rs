//! Hot-reloadable holder for the airline index.
//!
//! Readers call [`AirlineStore::snapshot`] once per batch and resolve every
//! record against that one `Arc`, so a reload that lands mid-batch is only
//! visible to the next batch.

use crate::airlines::{AirlineIndex, AirlinesPayload, ReferenceRecord};
use crate::error::{RefDataError, Result};
use arc_swap::ArcSwap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{error, info, warn};

/// Reads and normalizes an airlines file.
pub fn read_airlines_file(path: &Path) -> Result<Vec<ReferenceRecord>> {
    let content = fs::read_to_string(path).map_err(|source| RefDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let payload: AirlinesPayload =
        serde_json::from_str(&content).map_err(|source| RefDataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(payload.into_records())
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

pub struct AirlineStore {
    path: PathBuf,
    current: ArcSwap<AirlineIndex>,
}

impl AirlineStore {
    /// Loads the file at `path`. A missing or malformed file yields an empty
    /// store that picks the file up once it changes.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let index = build_index(&path);
        Self {
            path,
            current: ArcSwap::from_pointee(index),
        }
    }

    /// Wraps an already built index. Used for fixtures and one-shot lookups.
    pub fn from_index(path: impl Into<PathBuf>, index: AirlineIndex) -> Self {
        Self {
            path: path.into(),
            current: ArcSwap::from_pointee(index),
        }
    }

    /// The index as of now. Holding on to it pins that version.
    pub fn snapshot(&self) -> Arc<AirlineIndex> {
        self.current.load_full()
    }

    /// Rebuilds the index when the file's mtime differs from the one the
    /// current index was built from. Returns whether a swap happened.
    pub fn reload_if_changed(&self) -> bool {
        let mtime = match modified(&self.path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if self.current.load().source_mtime().is_some() {
                    warn!(
                        "Airlines file {} disappeared, keeping the loaded index",
                        self.path.display()
                    );
                }
                return false;
            }
            Err(e) => {
                warn!("Could not stat {}: {}", self.path.display(), e);
                return false;
            }
        };

        if self.current.load().source_mtime() == Some(mtime) {
            return false;
        }

        self.reload();
        true
    }

    /// Unconditionally rebuilds the index from disk and swaps it in.
    pub fn reload(&self) {
        let index = build_index(&self.path);
        self.current.store(Arc::new(index));
    }
}

fn build_index(path: &Path) -> AirlineIndex {
    let mtime = match modified(path) {
        Ok(m) => m,
        Err(e) => {
            warn!("airlines file not found at {} ({})", path.display(), e);
            return AirlineIndex::default();
        }
    };

    match read_airlines_file(path) {
        Ok(records) => {
            let index = AirlineIndex::new(records).with_mtime(Some(mtime));
            info!("Loaded {} airlines from {}", index.len(), path.display());
            index
        }
        Err(e) => {
            // Remember the mtime so a broken file is not re-parsed every check.
            error!("{}. Serving an empty airline table.", e);
            AirlineIndex::default().with_mtime(Some(mtime))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_empty_store() {
        let store = AirlineStore::open("/definitely/not/here/airlines.json");
        assert!(store.snapshot().is_empty());
        assert!(!store.reload_if_changed());
    }

    #[test]
    fn snapshots_survive_a_swap() {
        let store = AirlineStore::from_index("unused.json", AirlineIndex::default());
        let before = store.snapshot();
        store
            .current
            .store(Arc::new(AirlineIndex::new(vec![ReferenceRecord::from(
                crate::airlines::RawAirline {
                    icao: Some("KLM".into()),
                    ..Default::default()
                },
            )])));
        assert!(before.is_empty());
        assert_eq!(store.snapshot().len(), 1);
    }
}
