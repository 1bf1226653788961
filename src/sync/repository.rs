//! Repository that reconciles the local cache with the remote store.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{is_local_id, new_local_id, Loaded, LocalStore, Record};
use crate::content::{Collection, Inquiry, SiteSettings};
use crate::remote::{RemoteError, RemoteStore};

use super::merge::{merge, replace_or_push};

/// Outcome of an optimistic write.
#[derive(Debug, Clone)]
pub struct UpsertOutcome<T> {
  /// The local write happened. Always true; kept so callers can treat the
  /// outcome uniformly with other status reports.
  pub accepted: bool,
  /// The remote store confirmed the write
  pub persisted_remotely: bool,
  /// The record as it now stands in the cache
  pub record: T,
  /// Why the remote write did not happen, if it didn't
  pub error: Option<RemoteError>,
}

impl<T> UpsertOutcome<T> {
  fn synced(record: T) -> Self {
    Self {
      accepted: true,
      persisted_remotely: true,
      record,
      error: None,
    }
  }

  fn local_only(record: T, error: RemoteError) -> Self {
    Self {
      accepted: true,
      persisted_remotely: false,
      record,
      error: Some(error),
    }
  }
}

/// Synchronizing repository over all content collections.
///
/// Reads merge the remote view with locally-held records and fall back to the
/// cache (or the caller's defaults) when the remote is unavailable. Writes land
/// in the cache first and are pushed to the remote best-effort. Remote failures
/// are logged and reported in outcomes, never returned as errors.
pub struct SyncRepository<S: LocalStore> {
  local: Arc<S>,
  remote: Arc<dyn RemoteStore>,
}

impl<S: LocalStore> Clone for SyncRepository<S> {
  fn clone(&self) -> Self {
    Self {
      local: Arc::clone(&self.local),
      remote: Arc::clone(&self.remote),
    }
  }
}

impl<S: LocalStore> SyncRepository<S> {
  pub fn new(local: Arc<S>, remote: Arc<dyn RemoteStore>) -> Self {
    Self { local, remote }
  }

  pub fn is_connected(&self) -> bool {
    self.remote.is_connected()
  }

  // ==========================================================================
  // Local cache helpers
  // ==========================================================================

  fn load_local<T: DeserializeOwned>(&self, collection: Collection) -> Vec<T> {
    match self.local.load::<T>(collection.name()) {
      Ok(items) => items.unwrap_or_default(),
      Err(e) => {
        warn!(%collection, error = %e, "unreadable cache entry, treating as empty");
        Vec::new()
      }
    }
  }

  fn save_local<T: Serialize>(&self, collection: Collection, items: &[T]) {
    if let Err(e) = self.local.save(collection.name(), items) {
      error!(%collection, error = %e, "failed to write cache");
    }
  }

  fn deleted_key(collection: Collection) -> String {
    format!("{}:deleted", collection.name())
  }

  /// Ids deleted on this device, kept so built-in defaults stay deleted.
  fn deleted_ids(&self, collection: Collection) -> HashSet<String> {
    self
      .local
      .load::<String>(&Self::deleted_key(collection))
      .ok()
      .flatten()
      .unwrap_or_default()
      .into_iter()
      .collect()
  }

  fn set_deleted_ids(&self, collection: Collection, ids: &HashSet<String>) {
    let mut ids: Vec<&String> = ids.iter().collect();
    ids.sort();
    if let Err(e) = self.local.save(&Self::deleted_key(collection), &ids) {
      error!(%collection, error = %e, "failed to record deleted ids");
    }
  }

  fn decode_rows<T: Record>(collection: Collection, rows: Vec<Value>) -> Vec<T> {
    rows
      .into_iter()
      .filter_map(|row| match serde_json::from_value::<T>(row) {
        Ok(record) => Some(record),
        Err(e) => {
          warn!(%collection, error = %e, "skipping malformed remote row");
          None
        }
      })
      .collect()
  }

  fn fallback<T: Record>(mut local: Vec<T>, mut defaults: Vec<T>) -> Loaded<Vec<T>> {
    if !local.is_empty() {
      T::arrange(&mut local);
      Loaded::cache(local)
    } else {
      T::arrange(&mut defaults);
      Loaded::defaults(defaults)
    }
  }

  // ==========================================================================
  // Collections
  // ==========================================================================

  /// Read a collection.
  ///
  /// 1. Load the cached copy
  /// 2. Without a remote, serve the cache (or defaults when it is empty)
  /// 3. Fetch from the remote; on failure serve the cache or defaults
  /// 4. On success merge defaults < remote < unsynced local records
  /// 5. Write the merged view back to the cache
  pub async fn get_all<T: Record>(&self, defaults: &[T]) -> Loaded<Vec<T>> {
    let collection = T::collection();
    let local = self.load_local::<T>(collection);

    let deleted = self.deleted_ids(collection);
    let defaults: Vec<T> = defaults
      .iter()
      .filter(|d| d.id().map_or(true, |id| !deleted.contains(id)))
      .cloned()
      .collect();

    if !self.remote.is_connected() {
      return Self::fallback(local, defaults);
    }

    match self.remote.fetch_all(collection.table()).await {
      Ok(rows) => {
        let remote = Self::decode_rows::<T>(collection, rows);
        let merged = merge(&defaults, &remote, &local);
        debug!(
          %collection,
          remote = remote.len(),
          merged = merged.len(),
          "merged remote collection"
        );
        self.save_local(collection, &merged);
        Loaded::remote(merged)
      }
      Err(e) => {
        warn!(%collection, error = %e, "remote read failed, serving local copy");
        Self::fallback(local, defaults)
      }
    }
  }

  /// Write a record locally, then push it to the remote.
  ///
  /// Records without an id get a local-origin id. When the remote confirms a
  /// local-origin record under its own id, the cache entry migrates to that id.
  pub async fn upsert<T: Record>(&self, mut record: T) -> UpsertOutcome<T> {
    let collection = T::collection();

    let local_id = match record.id() {
      Some(id) => id.to_string(),
      None => {
        let id = new_local_id();
        record.set_id(Some(id.clone()));
        id
      }
    };

    let mut items = self.load_local::<T>(collection);
    replace_or_push(&mut items, &local_id, record.clone());
    self.save_local(collection, &items);

    let mut deleted = self.deleted_ids(collection);
    if deleted.remove(&local_id) {
      self.set_deleted_ids(collection, &deleted);
    }

    if !self.remote.is_connected() {
      return UpsertOutcome::local_only(record, RemoteError::Disconnected);
    }

    // The remote issues canonical ids for records it has never seen
    let mut payload = record.clone();
    if is_local_id(&local_id) {
      payload.set_id(None);
    }
    let row = match serde_json::to_value(&payload) {
      Ok(row) => row,
      Err(e) => {
        let err = RemoteError::InvalidRequest(e.to_string());
        error!(%collection, error = %err, "cannot encode record");
        return UpsertOutcome::local_only(record, err);
      }
    };

    let stored = match self.remote.upsert(collection.table(), row).await {
      Ok(stored) => stored,
      Err(e) => {
        warn!(%collection, id = %local_id, error = %e, "remote write failed, kept locally");
        return UpsertOutcome::local_only(record, e);
      }
    };

    let confirmed = match serde_json::from_value::<T>(stored) {
      Ok(confirmed) if confirmed.id().is_some() => confirmed,
      Ok(_) => return UpsertOutcome::synced(record),
      Err(e) => {
        warn!(%collection, error = %e, "remote accepted write but returned an unreadable row");
        return UpsertOutcome::synced(record);
      }
    };

    // Reload: the cache may have changed while the remote call was in flight
    let mut items = self.load_local::<T>(collection);
    if confirmed.id() != Some(local_id.as_str()) {
      info!(
        %collection,
        from = %local_id,
        to = confirmed.id().unwrap_or_default(),
        "record confirmed under remote id"
      );
      let new_id = confirmed.id().unwrap_or_default().to_string();
      items.retain(|r| r.id() != Some(new_id.as_str()));
    }
    replace_or_push(&mut items, &local_id, confirmed.clone());
    self.save_local(collection, &items);

    UpsertOutcome::synced(confirmed)
  }

  /// Remove a record locally and, best-effort, from the remote.
  ///
  /// Returns true when the remote no longer holds the record, including
  /// local-origin records it never saw.
  pub async fn delete<T: Record>(&self, id: &str) -> bool {
    let collection = T::collection();

    let mut items = self.load_local::<T>(collection);
    items.retain(|r| r.id() != Some(id));
    self.save_local(collection, &items);

    if is_local_id(id) {
      debug!(%collection, id, "record never reached the remote, local delete only");
      return true;
    }

    let mut deleted = self.deleted_ids(collection);
    if deleted.insert(id.to_string()) {
      self.set_deleted_ids(collection, &deleted);
    }

    if !self.remote.is_connected() {
      return false;
    }

    match self.remote.delete(collection.table(), id).await {
      Ok(()) => true,
      Err(e) => {
        warn!(%collection, id, error = %e, "remote delete failed");
        false
      }
    }
  }

  /// Submit a contact-form inquiry. Nothing is cached.
  pub async fn submit_inquiry(&self, inquiry: &Inquiry) -> bool {
    if !self.remote.is_connected() {
      info!("no remote configured, inquiry not submitted");
      return false;
    }
    self.remote.submit_inquiry(inquiry).await
  }

  // ==========================================================================
  // Settings singleton
  // ==========================================================================

  fn load_settings(&self) -> Option<SiteSettings> {
    self
      .load_local::<SiteSettings>(Collection::Settings)
      .into_iter()
      .next()
  }

  fn save_settings(&self, settings: &SiteSettings) {
    self.save_local(Collection::Settings, std::slice::from_ref(settings));
  }

  /// Read the site settings, remote first, then cache, then `defaults`.
  pub async fn get_settings(&self, defaults: Option<SiteSettings>) -> Loaded<Option<SiteSettings>> {
    let collection = Collection::Settings;
    let local = self.load_settings();

    let fallback = |local: Option<SiteSettings>| match local {
      Some(settings) => Loaded::cache(Some(settings)),
      None => Loaded::defaults(defaults.clone()),
    };

    if !self.remote.is_connected() {
      return fallback(local);
    }

    match self.remote.fetch_singleton(collection.table()).await {
      Ok(Some(row)) => match serde_json::from_value::<SiteSettings>(row) {
        Ok(settings) => {
          self.save_settings(&settings);
          Loaded::remote(Some(settings))
        }
        Err(e) => {
          warn!(error = %e, "malformed remote settings row");
          fallback(local)
        }
      },
      Ok(None) => {
        debug!("remote has no settings row yet");
        fallback(local)
      }
      Err(e) => {
        warn!(error = %e, "remote settings read failed, serving local copy");
        fallback(local)
      }
    }
  }

  /// Save the site settings locally, then push them to the remote.
  ///
  /// Settings without an id take the id of the existing row, cached or
  /// remote, so the singleton is updated in place. A new row is only
  /// inserted when the remote has none.
  pub async fn update_settings(&self, mut settings: SiteSettings) -> UpsertOutcome<SiteSettings> {
    let collection = Collection::Settings;
    if settings.id.is_none() {
      settings.id = self.load_settings().and_then(|s| s.id);
    }
    self.save_settings(&settings);

    if !self.remote.is_connected() {
      return UpsertOutcome::local_only(settings, RemoteError::Disconnected);
    }

    if settings.id.is_none() {
      match self.remote.fetch_singleton(collection.table()).await {
        Ok(Some(row)) => match serde_json::from_value::<SiteSettings>(row) {
          Ok(existing) => settings.id = existing.id,
          Err(e) => {
            let err = RemoteError::InvalidResponse(e.to_string());
            warn!(error = %err, "cannot read existing settings row, kept locally");
            return UpsertOutcome::local_only(settings, err);
          }
        },
        Ok(None) => debug!("no settings row on the remote, inserting one"),
        Err(e) => {
          warn!(error = %e, "settings lookup failed, kept locally");
          return UpsertOutcome::local_only(settings, e);
        }
      }
    }

    let row = match serde_json::to_value(&settings) {
      Ok(row) => row,
      Err(e) => return UpsertOutcome::local_only(settings, RemoteError::InvalidRequest(e.to_string())),
    };

    match self.remote.update_singleton(collection.table(), row).await {
      Ok(stored) => match serde_json::from_value::<SiteSettings>(stored) {
        Ok(confirmed) => {
          self.save_settings(&confirmed);
          UpsertOutcome::synced(confirmed)
        }
        Err(e) => {
          warn!(error = %e, "remote accepted settings but returned an unreadable row");
          UpsertOutcome::synced(settings)
        }
      },
      Err(e) => {
        warn!(error = %e, "remote settings write failed, kept locally");
        UpsertOutcome::local_only(settings, e)
      }
    }
  }
}
