// src/watch/mod.rs

//! The live watch list and its optional persistence.
//!
//! [`WatchList`] is the only shared mutable state in the program. The poll
//! cycle, the status reporter and the console command handlers all go
//! through its synchronized operations; no raw container is exposed.

pub mod list;
pub mod store;

pub use list::{AddOutcome, Snapshot, WatchList};
pub use store::{FileSnapshotStore, PersistedTarget, SnapshotStore};
