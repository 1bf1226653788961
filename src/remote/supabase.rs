//! Remote store backed by a hosted Postgres REST + auth service.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::sync::Mutex;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::RemoteConfig;
use crate::content::{Collection, Inquiry};

use super::api_types::{
  ApiAuthError, ApiError, ApiInquiryNotice, ApiInquiryRow, ApiPasswordGrant, ApiTokenResponse,
};
use super::client::{RemoteStore, Session};
use super::error::{AuthError, RemoteError, RemoteResult};

/// REST client for the hosted backend
pub struct SupabaseStore {
  http: reqwest::Client,
  base: Url,
  anon_key: String,
  /// Edge function notified after each inquiry, if any
  notify_function: Option<String>,
  session: Mutex<Option<Session>>,
}

impl SupabaseStore {
  pub fn new(config: &RemoteConfig, anon_key: String) -> Result<Self> {
    let mut base =
      Url::parse(&config.url).map_err(|e| eyre!("Invalid remote url {}: {}", config.url, e))?;

    // Url::join drops the last path segment unless it ends with a slash
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }

    let http = reqwest::Client::builder()
      .user_agent(concat!("studiosync/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      anon_key,
      notify_function: config.notify_function.clone(),
      session: Mutex::new(None),
    })
  }

  fn endpoint(&self, path: &str) -> RemoteResult<Url> {
    self
      .base
      .join(path)
      .map_err(|e| RemoteError::InvalidRequest(format!("bad endpoint {}: {}", path, e)))
  }

  fn table_url(&self, table: &str) -> RemoteResult<Url> {
    self.endpoint(&format!("rest/v1/{}", table))
  }

  /// Token for the Authorization header: the admin session if one is live,
  /// otherwise the public key.
  fn bearer(&self) -> String {
    self
      .session
      .lock()
      .ok()
      .and_then(|s| {
        s.as_ref()
          .filter(|s| !s.is_expired())
          .map(|s| s.access_token.clone())
      })
      .unwrap_or_else(|| self.anon_key.clone())
  }

  fn request(&self, method: Method, url: Url) -> RequestBuilder {
    self
      .http
      .request(method, url)
      .header("apikey", &self.anon_key)
      .bearer_auth(self.bearer())
  }

  async fn send(&self, table: &str, request: RequestBuilder) -> RemoteResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify(status, table, &body);
    debug!(table, %status, error = %err, "remote request failed");
    Err(err)
  }

  async fn rows(response: Response) -> RemoteResult<Vec<Value>> {
    response
      .json::<Vec<Value>>()
      .await
      .map_err(|e| RemoteError::InvalidResponse(e.to_string()))
  }

  async fn first_row(response: Response) -> RemoteResult<Value> {
    Self::rows(response)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| RemoteError::InvalidResponse("empty representation".to_string()))
  }

  async fn notify_inquiry(&self, function: &str, inquiry: &Inquiry) -> RemoteResult<()> {
    let url = self.endpoint(&format!("functions/v1/{}", function))?;
    let notice = ApiInquiryNotice {
      name: &inquiry.name,
      email: &inquiry.email,
      phone: &inquiry.phone,
      message: &inquiry.message,
    };

    self
      .send(function, self.request(Method::POST, url).json(&notice))
      .await?;
    Ok(())
  }
}

/// Map a failed REST response onto the error taxonomy.
pub(crate) fn classify(status: StatusCode, table: &str, body: &str) -> RemoteError {
  let api = ApiError::parse(body);

  match api.code.as_deref() {
    // undefined_table / schema cache miss
    Some("42P01") | Some("PGRST205") => return RemoteError::MissingCollection(table.to_string()),
    // insufficient_privilege, raised by row-level security
    Some("42501") => return RemoteError::PermissionDenied(api.describe(body)),
    _ => {}
  }

  match status {
    StatusCode::NOT_FOUND => RemoteError::MissingCollection(table.to_string()),
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
      RemoteError::PermissionDenied(api.describe(body))
    }
    StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
      RemoteError::Unreachable(format!("HTTP {}", status))
    }
    _ => RemoteError::Rejected {
      status: status.as_u16(),
      message: api.describe(body),
    },
  }
}

/// Map a failed auth response onto the login outcomes.
pub(crate) fn classify_auth(status: StatusCode, body: &str) -> AuthError {
  if status.is_server_error() {
    return AuthError::ServiceUnreachable(format!("HTTP {}", status));
  }

  let text = ApiAuthError::parse(body).text();
  if text.contains("not_confirmed") || text.contains("not confirmed") {
    AuthError::AccountRequiresSetup
  } else {
    AuthError::CredentialsRejected
  }
}

fn row_id(row: &Value) -> Option<String> {
  match row.get("id")? {
    Value::String(s) => Some(s.clone()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
  async fn fetch_all(&self, table: &str) -> RemoteResult<Vec<Value>> {
    let mut url = self.table_url(table)?;
    url.query_pairs_mut().append_pair("select", "*");
    if table == Collection::Inquiries.table() {
      url
        .query_pairs_mut()
        .append_pair("order", "created_at.desc");
    }

    let response = self
      .send(table, self.request(Method::GET, url))
      .await?;
    Self::rows(response).await
  }

  async fn upsert(&self, table: &str, row: Value) -> RemoteResult<Value> {
    let url = self.table_url(table)?;
    let request = self
      .request(Method::POST, url)
      .header("Prefer", "resolution=merge-duplicates,return=representation")
      .json(&row);

    let response = self.send(table, request).await?;
    Self::first_row(response).await
  }

  async fn delete(&self, table: &str, id: &str) -> RemoteResult<()> {
    let mut url = self.table_url(table)?;
    url
      .query_pairs_mut()
      .append_pair("id", &format!("eq.{}", id));

    self
      .send(table, self.request(Method::DELETE, url))
      .await?;
    Ok(())
  }

  async fn fetch_singleton(&self, table: &str) -> RemoteResult<Option<Value>> {
    let mut url = self.table_url(table)?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("limit", "1");

    let response = self
      .send(table, self.request(Method::GET, url))
      .await?;
    Ok(Self::rows(response).await?.into_iter().next())
  }

  async fn update_singleton(&self, table: &str, row: Value) -> RemoteResult<Value> {
    let Some(id) = row_id(&row) else {
      return self.upsert(table, row).await;
    };

    let mut url = self.table_url(table)?;
    url
      .query_pairs_mut()
      .append_pair("id", &format!("eq.{}", id));
    let request = self
      .request(Method::PATCH, url)
      .header("Prefer", "return=representation")
      .json(&row);

    let response = self.send(table, request).await?;
    // Row-level security filters the update instead of failing it
    Self::rows(response)
      .await?
      .into_iter()
      .next()
      .ok_or_else(|| RemoteError::PermissionDenied(format!("no {} row was updated", table)))
  }

  async fn submit_inquiry(&self, inquiry: &Inquiry) -> bool {
    let table = Collection::Inquiries.table();
    let url = match self.table_url(table) {
      Ok(url) => url,
      Err(e) => {
        error!(error = %e, "cannot build inquiry endpoint");
        return false;
      }
    };

    let row = ApiInquiryRow {
      name: &inquiry.name,
      email: &inquiry.email,
      phone: &inquiry.phone,
      message: &inquiry.message,
      plan: inquiry.plan.as_deref(),
    };
    let request = self
      .request(Method::POST, url)
      .header("Prefer", "return=minimal")
      .json(&row);

    if let Err(e) = self.send(table, request).await {
      error!(error = %e, "failed to store inquiry");
      return false;
    }

    // The inquiry is stored; a missed email notification does not undo that
    if let Some(function) = &self.notify_function {
      if let Err(e) = self.notify_inquiry(function, inquiry).await {
        warn!(function, error = %e, "inquiry stored but notification failed");
      }
    }

    true
  }

  async fn login(&self, email: &str, secret: &str) -> Result<Session, AuthError> {
    let mut url = self
      .endpoint("auth/v1/token")
      .map_err(|e| AuthError::ServiceUnreachable(e.to_string()))?;
    url
      .query_pairs_mut()
      .append_pair("grant_type", "password");

    let response = self
      .http
      .post(url)
      .header("apikey", &self.anon_key)
      .json(&ApiPasswordGrant {
        email,
        password: secret,
      })
      .send()
      .await
      .map_err(|e| AuthError::ServiceUnreachable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(classify_auth(status, &body));
    }

    let token: ApiTokenResponse = response
      .json()
      .await
      .map_err(|e| AuthError::ServiceUnreachable(format!("unreadable token response: {}", e)))?;

    let session = Session {
      access_token: token.access_token,
      email: token
        .user
        .and_then(|u| u.email)
        .unwrap_or_else(|| email.to_string()),
      expires_at: token
        .expires_in
        .map(|secs| Utc::now() + Duration::seconds(secs)),
    };

    if let Ok(mut current) = self.session.lock() {
      *current = Some(session.clone());
    }

    Ok(session)
  }

  async fn logout(&self) {
    let session = match self.session.lock() {
      Ok(mut current) => current.take(),
      Err(_) => None,
    };
    let Some(session) = session else {
      return;
    };

    let url = match self.endpoint("auth/v1/logout") {
      Ok(url) => url,
      Err(e) => {
        warn!(error = %e, "cannot build logout endpoint");
        return;
      }
    };

    let result = self
      .http
      .post(url)
      .header("apikey", &self.anon_key)
      .bearer_auth(&session.access_token)
      .send()
      .await;

    match result {
      Ok(response) if !response.status().is_success() => {
        warn!(status = %response.status(), "remote logout rejected");
      }
      Err(e) => warn!(error = %e, "remote logout failed"),
      Ok(_) => {}
    }
  }

  fn has_active_session(&self) -> bool {
    self
      .session
      .lock()
      .map(|s| s.as_ref().is_some_and(|s| !s.is_expired()))
      .unwrap_or(false)
  }

  fn restore_session(&self, session: Session) {
    if let Ok(mut current) = self.session.lock() {
      *current = Some(session);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> SupabaseStore {
    let config = RemoteConfig {
      url: "https://example.supabase.co".to_string(),
      notify_function: None,
    };
    SupabaseStore::new(&config, "anon".to_string()).unwrap()
  }

  #[test]
  fn test_missing_table_codes() {
    let body = r#"{"code":"42P01","message":"relation \"public.faqs\" does not exist"}"#;
    assert_eq!(
      classify(StatusCode::BAD_REQUEST, "faqs", body),
      RemoteError::MissingCollection("faqs".to_string())
    );

    let body = r#"{"code":"PGRST205","message":"Could not find the table"}"#;
    assert_eq!(
      classify(StatusCode::NOT_FOUND, "faqs", body),
      RemoteError::MissingCollection("faqs".to_string())
    );
  }

  #[test]
  fn test_permission_rejections() {
    let body = r#"{"code":"42501","message":"new row violates row-level security policy"}"#;
    assert_eq!(
      classify(StatusCode::BAD_REQUEST, "services", body),
      RemoteError::PermissionDenied("new row violates row-level security policy".to_string())
    );

    assert!(matches!(
      classify(StatusCode::UNAUTHORIZED, "services", "{}"),
      RemoteError::PermissionDenied(_)
    ));
  }

  #[test]
  fn test_other_failures() {
    assert!(matches!(
      classify(StatusCode::SERVICE_UNAVAILABLE, "services", ""),
      RemoteError::Unreachable(_)
    ));
    assert_eq!(
      classify(StatusCode::CONFLICT, "services", "duplicate"),
      RemoteError::Rejected {
        status: 409,
        message: "duplicate".to_string()
      }
    );
  }

  #[test]
  fn test_auth_failures() {
    let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
    assert_eq!(
      classify_auth(StatusCode::BAD_REQUEST, body),
      AuthError::CredentialsRejected
    );

    let body = r#"{"code":400,"error_code":"email_not_confirmed","msg":"Email not confirmed"}"#;
    assert_eq!(
      classify_auth(StatusCode::BAD_REQUEST, body),
      AuthError::AccountRequiresSetup
    );

    assert!(matches!(
      classify_auth(StatusCode::BAD_GATEWAY, ""),
      AuthError::ServiceUnreachable(_)
    ));
  }

  #[test]
  fn test_endpoints_keep_base_path() {
    let config = RemoteConfig {
      url: "https://example.com/proxy".to_string(),
      notify_function: None,
    };
    let store = SupabaseStore::new(&config, "anon".to_string()).unwrap();
    assert_eq!(
      store.table_url("faqs").unwrap().as_str(),
      "https://example.com/proxy/rest/v1/faqs"
    );
  }

  #[test]
  fn test_session_token_replaces_anon_key() {
    let store = store();
    assert_eq!(store.bearer(), "anon");
    assert!(!store.has_active_session());

    store.restore_session(Session {
      access_token: "admin-token".to_string(),
      email: "admin@example.com".to_string(),
      expires_at: Some(Utc::now() + Duration::hours(1)),
    });
    assert_eq!(store.bearer(), "admin-token");
    assert!(store.has_active_session());

    store.restore_session(Session {
      access_token: "old-token".to_string(),
      email: "admin@example.com".to_string(),
      expires_at: Some(Utc::now() - Duration::hours(1)),
    });
    assert_eq!(store.bearer(), "anon");
    assert!(!store.has_active_session());
  }

  #[test]
  fn test_row_id_accepts_numbers() {
    assert_eq!(row_id(&serde_json::json!({"id": 7})), Some("7".to_string()));
    assert_eq!(row_id(&serde_json::json!({"id": "abc"})), Some("abc".to_string()));
    assert_eq!(row_id(&serde_json::json!({"site_name": "x"})), None);
  }
}
