use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::content::Inquiry;

use super::error::{AuthError, RemoteError, RemoteResult};

/// Authenticated admin session issued by the auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: String,
  pub email: String,
  pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
  pub fn is_expired(&self) -> bool {
    self.expires_at.is_some_and(|at| at <= Utc::now())
  }
}

/// Request/response access to the hosted backend.
///
/// Rows travel as JSON values; typed decoding is the caller's job. No method
/// retries - retry policy belongs to the caller.
#[async_trait]
pub trait RemoteStore: Send + Sync {
  /// Whether a backend is configured at all.
  fn is_connected(&self) -> bool {
    true
  }

  async fn fetch_all(&self, table: &str) -> RemoteResult<Vec<Value>>;

  /// Insert or update a row. Rows without an id are inserted and the remote
  /// assigns one. Returns the row as stored.
  async fn upsert(&self, table: &str, row: Value) -> RemoteResult<Value>;

  async fn delete(&self, table: &str, id: &str) -> RemoteResult<()>;

  async fn fetch_singleton(&self, table: &str) -> RemoteResult<Option<Value>>;

  async fn update_singleton(&self, table: &str, row: Value) -> RemoteResult<Value>;

  /// Record a contact-form submission. True when the backend stored it.
  async fn submit_inquiry(&self, inquiry: &Inquiry) -> bool;

  async fn login(&self, email: &str, secret: &str) -> Result<Session, AuthError>;

  async fn logout(&self);

  fn has_active_session(&self) -> bool;

  /// Reuse a session persisted by an earlier run.
  fn restore_session(&self, session: Session);
}

/// Remote store used when no backend is configured.
///
/// Every call fails with `RemoteError::Disconnected`, so callers only ever
/// see local data.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disconnected;

#[async_trait]
impl RemoteStore for Disconnected {
  fn is_connected(&self) -> bool {
    false
  }

  async fn fetch_all(&self, _table: &str) -> RemoteResult<Vec<Value>> {
    Err(RemoteError::Disconnected)
  }

  async fn upsert(&self, _table: &str, _row: Value) -> RemoteResult<Value> {
    Err(RemoteError::Disconnected)
  }

  async fn delete(&self, _table: &str, _id: &str) -> RemoteResult<()> {
    Err(RemoteError::Disconnected)
  }

  async fn fetch_singleton(&self, _table: &str) -> RemoteResult<Option<Value>> {
    Err(RemoteError::Disconnected)
  }

  async fn update_singleton(&self, _table: &str, _row: Value) -> RemoteResult<Value> {
    Err(RemoteError::Disconnected)
  }

  async fn submit_inquiry(&self, _inquiry: &Inquiry) -> bool {
    false
  }

  async fn login(&self, _email: &str, _secret: &str) -> Result<Session, AuthError> {
    Err(AuthError::NotConfigured)
  }

  async fn logout(&self) {}

  fn has_active_session(&self) -> bool {
    false
  }

  fn restore_session(&self, _session: Session) {}
}
