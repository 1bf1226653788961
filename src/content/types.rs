use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::cache::Record;

use super::Collection;

/// Remote rows may carry numeric or text ids; both are kept as text.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawId {
    Text(String),
    Number(i64),
  }

  Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
    RawId::Text(s) => s,
    RawId::Number(n) => n.to_string(),
  }))
}

/// Site-wide settings (singleton)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
  #[serde(
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub site_name: String,
  pub tagline: String,
  pub logo_url: Option<String>,
  pub whatsapp_number: Option<String>,
  pub contact_phone: Option<String>,
  pub contact_email: Option<String>,
  pub address: Option<String>,
  pub instagram_url: Option<String>,
  pub twitter_url: Option<String>,
  pub linkedin_url: Option<String>,
  pub footer_text: Option<String>,
  pub seo_description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
  #[default]
  Active,
  Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
  #[serde(
    default,
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub title: String,
  #[serde(default)]
  pub description: String,
  /// Icon name understood by the site's icon set (e.g. "Layout")
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub status: ServiceStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
  #[default]
  Published,
  Draft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
  Real,
  Demo,
}

/// Portfolio project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
  #[serde(
    default,
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub title: String,
  #[serde(default)]
  pub category: String,
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub description: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link: Option<String>,
  #[serde(default)]
  pub status: PublishStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project_type: Option<ProjectKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
  #[default]
  Pending,
  Approved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Testimonial {
  #[serde(
    default,
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub name: String,
  #[serde(default)]
  pub role: String,
  pub content: String,
  #[serde(default)]
  pub avatar: String,
  /// Star rating, 1 to 5
  #[serde(default = "default_rating")]
  pub rating: u8,
  #[serde(default)]
  pub status: ReviewStatus,
}

fn default_rating() -> u8 {
  5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqItem {
  #[serde(
    default,
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub question: String,
  pub answer: String,
}

/// Contact-form submission. Write-once; admins only read and delete these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
  #[serde(
    default,
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub phone: String,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub plan: Option<String>,
  #[serde(default = "Utc::now")]
  pub created_at: DateTime<Utc>,
}

impl Inquiry {
  pub fn new(name: &str, email: &str, phone: &str, message: &str, plan: Option<&str>) -> Self {
    Self {
      id: None,
      name: name.to_string(),
      email: email.to_string(),
      phone: phone.to_string(),
      message: message.to_string(),
      plan: plan.map(String::from),
      created_at: Utc::now(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPlan {
  #[serde(
    default,
    deserialize_with = "deserialize_id",
    skip_serializing_if = "Option::is_none"
  )]
  pub id: Option<String>,
  pub name: String,
  pub price: String,
  #[serde(default)]
  pub pages: String,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub is_popular: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub color: Option<String>,
}

// ============================================================================
// Record implementations
// ============================================================================

impl Record for Service {
  fn collection() -> Collection {
    Collection::Services
  }

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: Option<String>) {
    self.id = id;
  }

  fn identity_text(&self) -> String {
    self.title.clone()
  }

  fn is_public(&self) -> bool {
    self.status == ServiceStatus::Active
  }
}

impl Record for PortfolioItem {
  fn collection() -> Collection {
    Collection::Portfolio
  }

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: Option<String>) {
    self.id = id;
  }

  fn identity_text(&self) -> String {
    self.title.clone()
  }

  fn is_public(&self) -> bool {
    self.status == PublishStatus::Published
  }
}

impl Record for Testimonial {
  fn collection() -> Collection {
    Collection::Testimonials
  }

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: Option<String>) {
    self.id = id;
  }

  fn identity_text(&self) -> String {
    format!("{} {}", self.name, self.content)
  }

  fn is_public(&self) -> bool {
    self.status == ReviewStatus::Approved
  }
}

impl Record for FaqItem {
  fn collection() -> Collection {
    Collection::Faqs
  }

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: Option<String>) {
    self.id = id;
  }

  fn identity_text(&self) -> String {
    self.question.clone()
  }
}

impl Record for Inquiry {
  fn collection() -> Collection {
    Collection::Inquiries
  }

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: Option<String>) {
    self.id = id;
  }

  fn identity_text(&self) -> String {
    format!("{} {} {}", self.email, self.message, self.created_at.to_rfc3339())
  }

  fn is_public(&self) -> bool {
    false
  }

  /// Newest first
  fn arrange(items: &mut [Self]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
  }
}

impl Record for PricingPlan {
  fn collection() -> Collection {
    Collection::Pricing
  }

  fn id(&self) -> Option<&str> {
    self.id.as_deref()
  }

  fn set_id(&mut self, id: Option<String>) {
    self.id = id;
  }

  fn identity_text(&self) -> String {
    self.name.clone()
  }

  /// Cheapest first; prices are display text like "₹5,999"
  fn arrange(items: &mut [Self]) {
    items.sort_by_key(|p| price_amount(&p.price));
  }
}

/// Numeric value of a display price, ignoring currency and separators.
fn price_amount(price: &str) -> Option<u64> {
  let digits: String = price
    .split('.')
    .next()
    .unwrap_or_default()
    .chars()
    .filter(|c| c.is_ascii_digit())
    .collect();
  digits.parse().ok()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn test_numeric_ids_decode_as_text() {
    let faq: FaqItem =
      serde_json::from_str(r#"{"id": 42, "question": "Q?", "answer": "A."}"#).unwrap();
    assert_eq!(faq.id.as_deref(), Some("42"));

    let faq: FaqItem =
      serde_json::from_str(r#"{"id": null, "question": "Q?", "answer": "A."}"#).unwrap();
    assert_eq!(faq.id, None);
  }

  #[test]
  fn test_missing_id_is_not_serialized() {
    let faq = FaqItem {
      id: None,
      question: "Q?".to_string(),
      answer: "A.".to_string(),
    };
    let value = serde_json::to_value(&faq).unwrap();
    assert!(value.get("id").is_none());
  }

  #[test]
  fn test_settings_tolerate_null_columns() {
    let settings: SiteSettings = serde_json::from_str(
      r#"{"id": "1", "site_name": "RIDDHAAN", "tagline": "Web", "logo_url": null}"#,
    )
    .unwrap();
    assert_eq!(settings.site_name, "RIDDHAAN");
    assert_eq!(settings.logo_url, None);
    assert_eq!(settings.address, None);
  }

  #[test]
  fn test_visibility_follows_status() {
    let mut service = Service {
      id: None,
      title: "SEO".to_string(),
      description: String::new(),
      icon: "Search".to_string(),
      status: ServiceStatus::Active,
    };
    assert!(service.is_public());
    service.status = ServiceStatus::Hidden;
    assert!(!service.is_public());

    let inquiry = Inquiry::new("A", "a@example.com", "", "Hi", None);
    assert!(!inquiry.is_public());
  }

  #[test]
  fn test_inquiries_arrange_newest_first() {
    let mut older = Inquiry::new("A", "a@example.com", "", "first", None);
    older.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut newer = Inquiry::new("B", "b@example.com", "", "second", Some("basic"));
    newer.created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let mut items = vec![older, newer];
    Inquiry::arrange(&mut items);
    assert_eq!(items[0].message, "second");
  }

  #[test]
  fn test_pricing_arranges_by_amount() {
    let plan = |name: &str, price: &str| PricingPlan {
      id: None,
      name: name.to_string(),
      price: price.to_string(),
      pages: String::new(),
      features: Vec::new(),
      is_popular: false,
      color: None,
    };
    let mut plans = vec![
      plan("enterprise", "₹12,999"),
      plan("custom", "On request"),
      plan("basic", "₹2,999"),
      plan("standard", "₹5,999.50"),
    ];
    PricingPlan::arrange(&mut plans);

    let names: Vec<&str> = plans.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["custom", "basic", "standard", "enterprise"]);
  }
}
