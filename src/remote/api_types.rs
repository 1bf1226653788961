//! Serde types matching the hosted backend's REST and auth responses.

use serde::{Deserialize, Serialize};

/// Error body returned by the REST endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ApiError {
  pub code: Option<String>,
  pub message: Option<String>,
  pub details: Option<String>,
  pub hint: Option<String>,
}

impl ApiError {
  pub fn parse(body: &str) -> Self {
    serde_json::from_str(body).unwrap_or_default()
  }

  /// Best human-readable message, falling back to the raw body.
  pub fn describe(&self, body: &str) -> String {
    self
      .message
      .clone()
      .or_else(|| self.details.clone())
      .or_else(|| self.hint.clone())
      .unwrap_or_else(|| body.trim().to_string())
  }
}

/// Error body returned by the auth endpoints.
///
/// Older and newer auth servers disagree on field names, so all are optional.
#[derive(Debug, Default, Deserialize)]
pub struct ApiAuthError {
  pub error: Option<String>,
  pub error_code: Option<String>,
  pub error_description: Option<String>,
  pub msg: Option<String>,
}

impl ApiAuthError {
  pub fn parse(body: &str) -> Self {
    serde_json::from_str(body).unwrap_or_default()
  }

  /// All text fields joined and lowercased for matching.
  pub fn text(&self) -> String {
    [
      &self.error,
      &self.error_code,
      &self.error_description,
      &self.msg,
    ]
    .iter()
    .filter_map(|f| f.as_deref())
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
  }
}

#[derive(Debug, Serialize)]
pub struct ApiPasswordGrant<'a> {
  pub email: &'a str,
  pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
  pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTokenResponse {
  pub access_token: String,
  /// Lifetime in seconds
  pub expires_in: Option<i64>,
  pub user: Option<ApiUser>,
}

/// Row inserted for a contact-form submission.
#[derive(Debug, Serialize)]
pub struct ApiInquiryRow<'a> {
  pub name: &'a str,
  pub email: &'a str,
  pub phone: &'a str,
  pub message: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub plan: Option<&'a str>,
}

/// Payload for the inquiry notification function.
#[derive(Debug, Serialize)]
pub struct ApiInquiryNotice<'a> {
  pub name: &'a str,
  pub email: &'a str,
  pub phone: &'a str,
  pub message: &'a str,
}
