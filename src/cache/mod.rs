//! Local cache for content collections.
//!
//! This module provides the on-device half of the sync layer:
//! - A namespaced key-value store holding one entry per collection
//! - The `Record` trait every cached content type implements
//! - Local-origin identifiers and content fingerprints used when merging

mod storage;
mod traits;

pub use storage::{LocalStore, MemoryStore, SqliteStore};
pub use traits::{is_local_id, new_local_id, DataSource, Loaded, Record};
