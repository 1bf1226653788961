//! Synchronization between the local cache and the remote store.
//!
//! Reads merge remote rows with records that exist only on this device;
//! writes are optimistic and reach the remote best-effort. There is no
//! background retry: reconciliation happens on the next explicit read or write.

mod merge;
mod repository;

pub use repository::{SyncRepository, UpsertOutcome};
