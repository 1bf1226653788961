//! Core traits and types shared by the cache and the sync repository.

use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::content::Collection;

/// Prefix marking identifiers assigned on this device.
///
/// Records carrying it have never been confirmed by the remote store.
pub const LOCAL_ID_PREFIX: &str = "local_";

/// Generate a fresh local-origin identifier.
pub fn new_local_id() -> String {
  format!("{}{}", LOCAL_ID_PREFIX, Uuid::new_v4().simple())
}

/// Whether an identifier was assigned locally and not yet confirmed remotely.
pub fn is_local_id(id: &str) -> bool {
  id.starts_with(LOCAL_ID_PREFIX)
}

/// Trait for content records that can be cached and synchronized.
///
/// Implementors provide the identifier accessors and the text used to detect
/// that two records with different identifiers are the same logical item.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Collection this record type belongs to
  fn collection() -> Collection;

  fn id(&self) -> Option<&str>;

  fn set_id(&mut self, id: Option<String>);

  /// Identifying text for de-duplication (e.g. a title or a question).
  fn identity_text(&self) -> String;

  /// Whether a public visitor would see this record.
  fn is_public(&self) -> bool {
    true
  }

  /// Put a merged collection into its display order.
  fn arrange(_items: &mut [Self]) {}

  /// Content fingerprint, or None when there is no identifying text.
  fn fingerprint(&self) -> Option<String> {
    fingerprint(&self.identity_text())
  }
}

/// Hash normalized identifying text into a stable comparison key.
///
/// Whitespace is collapsed and case folded so cosmetic edits on either side
/// still match.
pub fn fingerprint(text: &str) -> Option<String> {
  let normalized = text
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase();
  if normalized.is_empty() {
    return None;
  }

  let mut hasher = Sha256::new();
  hasher.update(normalized.as_bytes());
  Some(hex::encode(hasher.finalize()))
}

/// Result of a read, including data and metadata about where it came from.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
  pub data: T,
  pub source: DataSource,
}

impl<T> Loaded<T> {
  pub fn remote(data: T) -> Self {
    Self {
      data,
      source: DataSource::Remote,
    }
  }

  pub fn cache(data: T) -> Self {
    Self {
      data,
      source: DataSource::Cache,
    }
  }

  pub fn defaults(data: T) -> Self {
    Self {
      data,
      source: DataSource::Defaults,
    }
  }
}

/// Indicates where loaded data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
  /// Remote fetch succeeded; data is the merged view
  Remote,
  /// Remote unavailable, serving the last cached copy
  Cache,
  /// Remote unavailable and nothing cached, serving built-in seed data
  Defaults,
}

impl DataSource {
  pub fn label(&self) -> &'static str {
    match self {
      Self::Remote => "remote",
      Self::Cache => "offline cache",
      Self::Defaults => "built-in defaults",
    }
  }
}
