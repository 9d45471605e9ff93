// src/watch/store.rs

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::types::Fingerprint;
use crate::watch::list::Snapshot;

const SNAPSHOT_VERSION: u32 = 1;

/// One watch-list entry as written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTarget {
    pub url: String,
    #[serde(default)]
    pub fingerprint: Option<Fingerprint>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    targets: Vec<PersistedTarget>,
}

/// Abstract storage for watch-list snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Previously saved targets, empty when nothing was saved yet.
    fn load(&self) -> Result<Vec<PersistedTarget>>;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Stores the watch list as a JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> Result<Vec<PersistedTarget>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("opening snapshot file at {:?}", self.path))?;
        let parsed: SnapshotFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing snapshot file at {:?}", self.path))?;

        if parsed.version != SNAPSHOT_VERSION {
            anyhow::bail!(
                "unsupported snapshot version {} in {:?} (expected {})",
                parsed.version,
                self.path,
                SNAPSHOT_VERSION
            );
        }

        Ok(parsed.targets)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot directory at {:?}", dir))?;

        let contents = SnapshotFile {
            version: SNAPSHOT_VERSION,
            targets: snapshot
                .iter()
                .map(|t| PersistedTarget {
                    url: t.url.clone(),
                    fingerprint: t.fingerprint.clone(),
                    message: t.alert_message.clone(),
                })
                .collect(),
        };

        let tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("creating temp file in {:?}", dir))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, &contents)?;
            writer.flush()?;
        }
        tmp.persist(&self.path)
            .with_context(|| format!("replacing snapshot file at {:?}", self.path))?;

        debug!(path = ?self.path, targets = snapshot.len(), "persisted watch list");
        Ok(())
    }
}
