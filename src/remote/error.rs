//! Remote store error types

use thiserror::Error;

/// Failure talking to the remote store.
///
/// None of these are fatal; the sync repository degrades to local-only
/// operation on every variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
  /// No remote store configured
  #[error("remote store is not configured")]
  Disconnected,

  /// Network failure or timeout
  #[error("remote store unreachable: {0}")]
  Unreachable(String),

  /// Table missing on the remote (not migrated yet)
  #[error("collection `{0}` does not exist on the remote store")]
  MissingCollection(String),

  /// Row-level security or credentials rejected the request
  #[error("permission denied: {0}")]
  PermissionDenied(String),

  /// Any other non-success response
  #[error("remote rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  /// Response body could not be decoded
  #[error("invalid response from remote store: {0}")]
  InvalidResponse(String),

  /// Request payload could not be encoded
  #[error("could not encode request: {0}")]
  InvalidRequest(String),
}

impl From<reqwest::Error> for RemoteError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_decode() {
      RemoteError::InvalidResponse(err.to_string())
    } else {
      RemoteError::Unreachable(err.to_string())
    }
  }
}

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Login failure, kept distinct so each case gets its own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
  #[error("credentials rejected")]
  CredentialsRejected,

  #[error("account requires setup")]
  AccountRequiresSetup,

  #[error("authentication service unreachable: {0}")]
  ServiceUnreachable(String),

  #[error("no authentication service configured")]
  NotConfigured,
}

impl AuthError {
  /// Message shown to the person trying to log in.
  pub fn user_message(&self) -> &'static str {
    match self {
      AuthError::CredentialsRejected => "Invalid credentials.",
      AuthError::AccountRequiresSetup => {
        "This account is not ready yet. Confirm the email address or finish setup first."
      }
      AuthError::ServiceUnreachable(_) => {
        "Could not reach the login service. Check your connection and try again."
      }
      AuthError::NotConfigured => {
        "Login is unavailable: no backend is configured for this site."
      }
    }
  }
}
