//! Content types for the studio site and the collections that hold them.

pub mod defaults;
mod entry;
mod types;

pub use entry::Entry;
pub use types::{
  FaqItem, Inquiry, PortfolioItem, PricingPlan, ProjectKind, PublishStatus, ReviewStatus,
  Service, ServiceStatus, SiteSettings, Testimonial,
};

/// Named content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
  Settings,
  Services,
  Portfolio,
  Testimonials,
  Faqs,
  Inquiries,
  Pricing,
}

impl Collection {
  pub const ALL: [Collection; 7] = [
    Collection::Settings,
    Collection::Services,
    Collection::Portfolio,
    Collection::Testimonials,
    Collection::Faqs,
    Collection::Inquiries,
    Collection::Pricing,
  ];

  /// Name used for the local cache entry.
  pub fn name(&self) -> &'static str {
    match self {
      Self::Settings => "settings",
      Self::Services => "services",
      Self::Portfolio => "portfolio",
      Self::Testimonials => "testimonials",
      Self::Faqs => "faqs",
      Self::Inquiries => "inquiries",
      Self::Pricing => "pricing",
    }
  }

  /// Table name on the remote store.
  pub fn table(&self) -> &'static str {
    match self {
      Self::Settings => "site_settings",
      Self::Services => "services",
      Self::Portfolio => "portfolio",
      Self::Testimonials => "testimonials",
      Self::Faqs => "faqs",
      Self::Inquiries => "inquiries",
      Self::Pricing => "pricing_plans",
    }
  }

  /// Collections only an authorized admin may read.
  pub fn is_private(&self) -> bool {
    matches!(self, Self::Inquiries)
  }
}

impl std::fmt::Display for Collection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}
