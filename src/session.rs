//! Admin session tracking.
//!
//! Two guards share one interface: a demo guard with a single fixed
//! credential, and a guard that defers to the remote auth service. The
//! configuration picks exactly one. Neither is a security boundary - the
//! backend's own access policy has the final say on writes.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::LocalStore;
use crate::remote::{AuthError, RemoteStore, Session};

/// Local store key holding the persisted session
const SESSION_KEY: &str = "session";

/// How long a demo login stays valid
const DEMO_SESSION_HOURS: i64 = 12;

#[async_trait]
pub trait SessionGuard: Send + Sync {
  fn is_authorized(&self) -> bool;

  async fn login(&self, email: &str, secret: &str) -> Result<(), AuthError>;

  async fn logout(&self);

  /// Email of the signed-in admin, if any.
  fn current_user(&self) -> Option<String>;
}

fn load_session<S: LocalStore>(store: &S) -> Option<Session> {
  let raw = match store.read(SESSION_KEY) {
    Ok(raw) => raw?,
    Err(e) => {
      warn!(error = %e, "cannot read stored session");
      return None;
    }
  };

  match serde_json::from_str::<Session>(&raw) {
    Ok(session) if !session.is_expired() => Some(session),
    Ok(_) => {
      info!("stored session expired");
      clear_session(store);
      None
    }
    Err(e) => {
      warn!(error = %e, "discarding unreadable stored session");
      clear_session(store);
      None
    }
  }
}

fn save_session<S: LocalStore>(store: &S, session: &Session) {
  let result = serde_json::to_string(session)
    .map_err(|e| color_eyre::eyre::eyre!("Failed to encode session: {}", e))
    .and_then(|raw| store.write(SESSION_KEY, &raw));

  if let Err(e) = result {
    warn!(error = %e, "session will not survive this run");
  }
}

fn clear_session<S: LocalStore>(store: &S) {
  if let Err(e) = store.remove(SESSION_KEY) {
    warn!(error = %e, "failed to clear stored session");
  }
}

/// Guard with one fixed credential, for demos and local development.
pub struct DemoSessionGuard<S: LocalStore> {
  store: Arc<S>,
  email: String,
  secret: String,
}

impl<S: LocalStore> DemoSessionGuard<S> {
  pub fn new(store: Arc<S>, email: &str, secret: &str) -> Self {
    Self {
      store,
      email: email.trim().to_lowercase(),
      secret: secret.to_string(),
    }
  }
}

#[async_trait]
impl<S: LocalStore> SessionGuard for DemoSessionGuard<S> {
  fn is_authorized(&self) -> bool {
    load_session(self.store.as_ref()).is_some()
  }

  async fn login(&self, email: &str, secret: &str) -> Result<(), AuthError> {
    if email.trim().to_lowercase() != self.email || secret != self.secret {
      return Err(AuthError::CredentialsRejected);
    }

    let session = Session {
      access_token: format!("demo_{}", Uuid::new_v4().simple()),
      email: self.email.clone(),
      expires_at: Some(Utc::now() + Duration::hours(DEMO_SESSION_HOURS)),
    };
    save_session(self.store.as_ref(), &session);
    info!(email = %self.email, "demo login");
    Ok(())
  }

  async fn logout(&self) {
    clear_session(self.store.as_ref());
  }

  fn current_user(&self) -> Option<String> {
    load_session(self.store.as_ref()).map(|s| s.email)
  }
}

/// Guard that verifies credentials with the remote auth service.
pub struct RemoteSessionGuard<S: LocalStore> {
  store: Arc<S>,
  remote: Arc<dyn RemoteStore>,
}

impl<S: LocalStore> RemoteSessionGuard<S> {
  /// Create the guard and hand any still-valid stored session to the remote.
  pub fn new(store: Arc<S>, remote: Arc<dyn RemoteStore>) -> Self {
    if let Some(session) = load_session(store.as_ref()) {
      remote.restore_session(session);
    }
    Self { store, remote }
  }
}

#[async_trait]
impl<S: LocalStore> SessionGuard for RemoteSessionGuard<S> {
  fn is_authorized(&self) -> bool {
    self.remote.has_active_session()
  }

  async fn login(&self, email: &str, secret: &str) -> Result<(), AuthError> {
    let session = self.remote.login(email, secret).await?;
    save_session(self.store.as_ref(), &session);
    info!(email = %session.email, "admin login");
    Ok(())
  }

  async fn logout(&self) {
    self.remote.logout().await;
    clear_session(self.store.as_ref());
  }

  fn current_user(&self) -> Option<String> {
    if !self.remote.has_active_session() {
      return None;
    }
    load_session(self.store.as_ref()).map(|s| s.email)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStore;
  use crate::content::Inquiry;
  use crate::remote::{Disconnected, RemoteResult};
  use serde_json::Value;
  use std::sync::Mutex;

  #[tokio::test]
  async fn test_demo_guard_checks_fixed_credential() {
    let store = Arc::new(MemoryStore::new("test"));
    let guard = DemoSessionGuard::new(Arc::clone(&store), "Admin@Example.com", "s3cret");
    assert!(!guard.is_authorized());

    assert_eq!(
      guard.login("admin@example.com", "wrong").await,
      Err(AuthError::CredentialsRejected)
    );
    assert!(!guard.is_authorized());

    guard.login(" ADMIN@example.com ", "s3cret").await.unwrap();
    assert!(guard.is_authorized());
    assert_eq!(guard.current_user().as_deref(), Some("admin@example.com"));

    // A fresh guard over the same store sees the persisted session
    let again = DemoSessionGuard::new(Arc::clone(&store), "admin@example.com", "s3cret");
    assert!(again.is_authorized());

    again.logout().await;
    assert!(!guard.is_authorized());
  }

  #[tokio::test]
  async fn test_expired_session_is_discarded() {
    let store = Arc::new(MemoryStore::new("test"));
    save_session(
      store.as_ref(),
      &Session {
        access_token: "t".to_string(),
        email: "admin@example.com".to_string(),
        expires_at: Some(Utc::now() - Duration::minutes(1)),
      },
    );

    let guard = DemoSessionGuard::new(Arc::clone(&store), "admin@example.com", "pw");
    assert!(!guard.is_authorized());
    assert_eq!(store.read(SESSION_KEY).unwrap(), None);
  }

  #[tokio::test]
  async fn test_remote_guard_without_backend() {
    let store = Arc::new(MemoryStore::new("test"));
    let guard = RemoteSessionGuard::new(store, Arc::new(Disconnected));

    assert_eq!(
      guard.login("admin@example.com", "pw").await,
      Err(AuthError::NotConfigured)
    );
    assert!(!guard.is_authorized());
  }

  /// Remote whose only working surface is auth.
  #[derive(Default)]
  struct AuthOnlyRemote {
    session: Mutex<Option<Session>>,
  }

  #[async_trait]
  impl RemoteStore for AuthOnlyRemote {
    async fn fetch_all(&self, _table: &str) -> RemoteResult<Vec<Value>> {
      Ok(Vec::new())
    }

    async fn upsert(&self, _table: &str, row: Value) -> RemoteResult<Value> {
      Ok(row)
    }

    async fn delete(&self, _table: &str, _id: &str) -> RemoteResult<()> {
      Ok(())
    }

    async fn fetch_singleton(&self, _table: &str) -> RemoteResult<Option<Value>> {
      Ok(None)
    }

    async fn update_singleton(&self, _table: &str, row: Value) -> RemoteResult<Value> {
      Ok(row)
    }

    async fn submit_inquiry(&self, _inquiry: &Inquiry) -> bool {
      true
    }

    async fn login(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
      match (email, secret) {
        ("admin@example.com", "pw") => {
          let session = Session {
            access_token: "token".to_string(),
            email: email.to_string(),
            expires_at: Some(Utc::now() + Duration::hours(1)),
          };
          *self.session.lock().unwrap() = Some(session.clone());
          Ok(session)
        }
        ("new@example.com", _) => Err(AuthError::AccountRequiresSetup),
        _ => Err(AuthError::CredentialsRejected),
      }
    }

    async fn logout(&self) {
      *self.session.lock().unwrap() = None;
    }

    fn has_active_session(&self) -> bool {
      self.session.lock().unwrap().is_some()
    }

    fn restore_session(&self, session: Session) {
      *self.session.lock().unwrap() = Some(session);
    }
  }

  #[tokio::test]
  async fn test_remote_guard_delegates_and_persists() {
    let store = Arc::new(MemoryStore::new("test"));
    let remote = Arc::new(AuthOnlyRemote::default());
    let guard = RemoteSessionGuard::new(Arc::clone(&store), remote.clone());

    assert_eq!(
      guard.login("new@example.com", "pw").await,
      Err(AuthError::AccountRequiresSetup)
    );
    assert_eq!(
      guard.login("admin@example.com", "nope").await,
      Err(AuthError::CredentialsRejected)
    );

    guard.login("admin@example.com", "pw").await.unwrap();
    assert!(guard.is_authorized());
    assert_eq!(guard.current_user().as_deref(), Some("admin@example.com"));

    // Next run: a fresh remote gets the stored session back
    let fresh = Arc::new(AuthOnlyRemote::default());
    let restored = RemoteSessionGuard::new(Arc::clone(&store), fresh.clone());
    assert!(restored.is_authorized());

    restored.logout().await;
    assert!(!restored.is_authorized());
    assert_eq!(store.read(SESSION_KEY).unwrap(), None);
  }
}
