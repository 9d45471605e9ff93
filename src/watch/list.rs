// src/watch/list.rs

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::TargetConfig;
use crate::errors::{Result, SitewatchError};
use crate::types::{Fingerprint, WatchTarget};
use crate::watch::store::{PersistedTarget, SnapshotStore};

/// Result of [`WatchList::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    /// The url was already watched; its message was replaced and its
    /// fingerprint reset.
    Replaced,
}

#[derive(Debug, Default)]
struct State {
    /// Insertion order is the poll order.
    targets: Vec<WatchTarget>,
    next_revision: u64,
}

impl State {
    fn position(&self, url: &str) -> Option<usize> {
        self.targets.iter().position(|t| t.url == url)
    }

    fn bump_revision(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }
}

#[derive(Default)]
struct Inner {
    state: RwLock<State>,
    store: Option<Arc<dyn SnapshotStore>>,
    /// Serializes snapshot+save so an older snapshot never overwrites a
    /// newer one on disk.
    persist_lock: Mutex<()>,
}

/// Concurrent mapping url → [`WatchTarget`].
///
/// Cheap to clone; all clones share the same list.
///
/// - `add` is last-write-wins: re-adding a url replaces its message and
///   resets its fingerprint, keeping its position.
/// - `snapshot` returns a consistent point-in-time copy.
/// - `update_fingerprint` only writes to the exact entry the snapshot saw,
///   so removal (or replacement) during a cycle discards that cycle's
///   result instead of resurrecting or polluting the entry.
#[derive(Clone, Default)]
pub struct WatchList {
    inner: Arc<Inner>,
}

impl fmt::Debug for WatchList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchList")
            .field("len", &self.len())
            .field("persistent", &self.inner.store.is_some())
            .finish()
    }
}

impl WatchList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A watch list that asks `store` to persist itself after every change.
    pub fn with_store(store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Some(store),
                ..Inner::default()
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, url: impl Into<String>, alert_message: impl Into<String>) -> AddOutcome {
        let url = url.into();
        let alert_message = alert_message.into();

        let outcome = {
            let mut state = self.write();
            let revision = state.bump_revision();
            let target = WatchTarget {
                url: url.clone(),
                fingerprint: None,
                alert_message,
                revision,
            };
            match state.position(&url) {
                Some(idx) => {
                    state.targets[idx] = target;
                    AddOutcome::Replaced
                }
                None => {
                    state.targets.push(target);
                    AddOutcome::Inserted
                }
            }
        };

        info!(url = %url, ?outcome, "target added");
        self.persist();
        outcome
    }

    /// Remove `url`, returning the entry that was dropped.
    pub fn remove(&self, url: &str) -> Result<WatchTarget> {
        let removed = {
            let mut state = self.write();
            match state.position(url) {
                Some(idx) => state.targets.remove(idx),
                None => return Err(SitewatchError::NotFound(url.to_string())),
            }
        };

        info!(url = %url, "target removed");
        self.persist();
        Ok(removed)
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.read();
        Snapshot {
            targets: state.targets.clone(),
            taken_at: Local::now(),
        }
    }

    /// Store `fingerprint` for the entry `observed` was copied from.
    ///
    /// Returns `false` (and writes nothing) when that entry no longer exists:
    /// the url was removed, or removed and re-added, or replaced by `add`.
    pub fn update_fingerprint(&self, observed: &WatchTarget, fingerprint: Fingerprint) -> bool {
        let changed = {
            let mut state = self.write();
            let Some(idx) = state.position(&observed.url) else {
                debug!(url = %observed.url, "target removed mid-cycle; discarding fingerprint");
                return false;
            };
            let entry = &mut state.targets[idx];
            if entry.revision != observed.revision {
                debug!(
                    url = %observed.url,
                    observed = observed.revision,
                    current = entry.revision,
                    "target replaced mid-cycle; discarding fingerprint"
                );
                return false;
            }
            let changed = entry.fingerprint.as_ref() != Some(&fingerprint);
            entry.fingerprint = Some(fingerprint);
            changed
        };

        if changed {
            self.persist();
        }
        true
    }

    /// Insert the initial targets without triggering persistence.
    ///
    /// Duplicate urls follow the same last-write-wins rule as [`add`].
    ///
    /// [`add`]: WatchList::add
    pub fn seed(&self, targets: &[TargetConfig]) {
        let mut state = self.write();
        for target in targets {
            let revision = state.bump_revision();
            let entry = WatchTarget {
                url: target.url.clone(),
                fingerprint: None,
                alert_message: target.message.clone(),
                revision,
            };
            match state.position(&target.url) {
                Some(idx) => state.targets[idx] = entry,
                None => state.targets.push(entry),
            }
        }
    }

    /// Merge previously persisted targets into the list without triggering
    /// persistence.
    ///
    /// Known urls get their stored fingerprint back; unknown urls are
    /// appended with their persisted message and fingerprint.
    pub fn restore(&self, persisted: Vec<PersistedTarget>) {
        let mut state = self.write();
        let mut restored = 0usize;
        let mut appended = 0usize;

        for item in persisted {
            match state.position(&item.url) {
                Some(idx) => {
                    state.targets[idx].fingerprint = item.fingerprint;
                    restored += 1;
                }
                None => {
                    let revision = state.bump_revision();
                    state.targets.push(WatchTarget {
                        url: item.url,
                        fingerprint: item.fingerprint,
                        alert_message: item.message,
                        revision,
                    });
                    appended += 1;
                }
            }
        }

        info!(restored, appended, "restored persisted watch list");
    }

    /// Whether the entry `observed` was copied from is still in the list.
    pub fn is_current(&self, observed: &WatchTarget) -> bool {
        let state = self.read();
        state
            .position(&observed.url)
            .is_some_and(|idx| state.targets[idx].revision == observed.revision)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.read().position(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.read().targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().targets.is_empty()
    }

    /// Fire-and-forget persistence of the current state.
    fn persist(&self) {
        let Some(store) = self.inner.store.as_ref() else {
            return;
        };
        let _guard = self
            .inner
            .persist_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let snapshot = self.snapshot();
        if let Err(err) = store.save(&snapshot) {
            warn!(error = %err, "failed to persist watch list; continuing");
        }
    }
}

/// Immutable point-in-time copy of the watch list.
#[derive(Debug, Clone)]
pub struct Snapshot {
    targets: Vec<WatchTarget>,
    taken_at: DateTime<Local>,
}

impl Snapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, WatchTarget> {
        self.targets.iter()
    }

    pub fn get(&self, url: &str) -> Option<&WatchTarget> {
        self.targets.iter().find(|t| t.url == url)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.url.as_str()).collect()
    }

    /// Human-readable status listing.
    ///
    /// ```text
    /// 2024-05-01 12:00:00 - Current status of monitored websites:
    /// https://example.com/: 3f2a..., Custom alert: example changed
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} - Current status of monitored websites:",
            self.taken_at.format("%Y-%m-%d %H:%M:%S")
        );
        if self.targets.is_empty() {
            out.push_str("\n(no websites are being monitored)");
        }
        for target in &self.targets {
            out.push_str(&format!(
                "\n{}: {}, Custom alert: {}",
                target.url,
                target.fingerprint_display(),
                target.alert_message
            ));
        }
        out
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a WatchTarget;
    type IntoIter = std::slice::Iter<'a, WatchTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}
