use color_eyre::{eyre::eyre, Result};

use super::types::{FaqItem, PortfolioItem, PricingPlan, Service, SiteSettings, Testimonial};
use super::Collection;

/// A record being edited - exactly one content type at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
  Settings(SiteSettings),
  Service(Service),
  Portfolio(PortfolioItem),
  Testimonial(Testimonial),
  Faq(FaqItem),
  Pricing(PricingPlan),
}

impl Entry {
  /// Parse editor input (JSON) as a record of the given collection.
  pub fn parse(collection: Collection, json: &str) -> Result<Self> {
    let parse_err = |e: serde_json::Error| eyre!("Invalid {} record: {}", collection, e);

    let entry = match collection {
      Collection::Settings => Entry::Settings(serde_json::from_str(json).map_err(parse_err)?),
      Collection::Services => Entry::Service(serde_json::from_str(json).map_err(parse_err)?),
      Collection::Portfolio => Entry::Portfolio(serde_json::from_str(json).map_err(parse_err)?),
      Collection::Testimonials => {
        Entry::Testimonial(serde_json::from_str(json).map_err(parse_err)?)
      }
      Collection::Faqs => Entry::Faq(serde_json::from_str(json).map_err(parse_err)?),
      Collection::Pricing => Entry::Pricing(serde_json::from_str(json).map_err(parse_err)?),
      Collection::Inquiries => {
        return Err(eyre!(
          "Inquiries are submitted through the contact form and cannot be edited"
        ))
      }
    };

    Ok(entry)
  }

  pub fn collection(&self) -> Collection {
    match self {
      Entry::Settings(_) => Collection::Settings,
      Entry::Service(_) => Collection::Services,
      Entry::Portfolio(_) => Collection::Portfolio,
      Entry::Testimonial(_) => Collection::Testimonials,
      Entry::Faq(_) => Collection::Faqs,
      Entry::Pricing(_) => Collection::Pricing,
    }
  }

  /// Required fields left blank. The editor refuses to save until this is empty.
  pub fn missing_fields(&self) -> Vec<&'static str> {
    let required: Vec<(&'static str, &str)> = match self {
      Entry::Settings(s) => vec![("site_name", s.site_name.as_str())],
      Entry::Service(s) => vec![
        ("title", s.title.as_str()),
        ("description", s.description.as_str()),
      ],
      Entry::Portfolio(p) => vec![
        ("title", p.title.as_str()),
        ("category", p.category.as_str()),
        ("image", p.image.as_str()),
      ],
      Entry::Testimonial(t) => vec![("name", t.name.as_str()), ("content", t.content.as_str())],
      Entry::Faq(f) => vec![("question", f.question.as_str()), ("answer", f.answer.as_str())],
      Entry::Pricing(p) => vec![("name", p.name.as_str()), ("price", p.price.as_str())],
    };

    let mut missing: Vec<&'static str> = required
      .into_iter()
      .filter(|(_, value)| value.trim().is_empty())
      .map(|(field, _)| field)
      .collect();

    if let Entry::Testimonial(t) = self {
      if !(1..=5).contains(&t.rating) {
        missing.push("rating (1-5)");
      }
    }

    missing
  }
}
