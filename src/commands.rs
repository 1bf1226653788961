//! Collection names accepted on the command line.
use color_eyre::{eyre::eyre, Result};

use crate::content::Collection;

#[derive(Debug, Clone)]
pub struct CollectionName {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  pub collection: Collection,
}

/// All addressable collections
pub const COLLECTIONS: &[CollectionName] = &[
  CollectionName {
    name: "settings",
    aliases: &["site", "config"],
    description: "Site-wide settings",
    collection: Collection::Settings,
  },
  CollectionName {
    name: "services",
    aliases: &["s", "svc", "service"],
    description: "Services offered",
    collection: Collection::Services,
  },
  CollectionName {
    name: "portfolio",
    aliases: &["p", "projects", "work"],
    description: "Portfolio projects",
    collection: Collection::Portfolio,
  },
  CollectionName {
    name: "testimonials",
    aliases: &["t", "reviews"],
    description: "Client testimonials",
    collection: Collection::Testimonials,
  },
  CollectionName {
    name: "faqs",
    aliases: &["f", "faq"],
    description: "Frequently asked questions",
    collection: Collection::Faqs,
  },
  CollectionName {
    name: "inquiries",
    aliases: &["i", "inquiry", "leads"],
    description: "Contact-form submissions (admin only)",
    collection: Collection::Inquiries,
  },
  CollectionName {
    name: "pricing",
    aliases: &["plans", "prices"],
    description: "Pricing plans",
    collection: Collection::Pricing,
  },
];

impl CollectionName {
  /// How well `input` (already lowercased) names this collection; lower is
  /// closer. None when it does not match at all.
  fn rank(&self, input: &str) -> Option<u8> {
    let aliases = || self.aliases.iter();
    if self.name == input || aliases().any(|a| *a == input) {
      Some(0)
    } else if self.name.starts_with(input) || aliases().any(|a| a.starts_with(input)) {
      Some(1)
    } else if self.name.contains(input) {
      Some(2)
    } else {
      None
    }
  }
}

/// Resolve user input to a collection.
///
/// Only the closest matches count: an exact name or alias beats a prefix,
/// which beats a substring of the name. Input must single out one collection.
pub fn resolve(input: &str) -> Result<Collection> {
  let input_lower = input.trim().to_lowercase();
  if input_lower.is_empty() {
    return Err(eyre!("No collection given. Known collections: {}", names().join(", ")));
  }

  let ranked: Vec<(&CollectionName, u8)> = COLLECTIONS
    .iter()
    .filter_map(|c| c.rank(&input_lower).map(|r| (c, r)))
    .collect();
  let Some(best) = ranked.iter().map(|(_, r)| *r).min() else {
    return Err(eyre!(
      "Unknown collection '{}'. Known collections: {}",
      input,
      names().join(", ")
    ));
  };

  let closest: Vec<&CollectionName> = ranked
    .into_iter()
    .filter(|(_, r)| *r == best)
    .map(|(c, _)| c)
    .collect();
  match closest.as_slice() {
    [only] => Ok(only.collection),
    several => Err(eyre!(
      "Ambiguous collection '{}': could be {}",
      input,
      several.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
    )),
  }
}

fn names() -> Vec<String> {
  Collection::ALL
    .iter()
    .filter_map(|c| COLLECTIONS.iter().find(|n| n.collection == *c))
    .map(|n| format!("{} ({})", n.name, n.description))
    .collect()
}
