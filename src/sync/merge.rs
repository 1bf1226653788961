//! Reconciliation of defaults, remote rows and locally-held records.

use std::collections::{HashMap, HashSet};

use crate::cache::{is_local_id, Record};

/// Ordered collection keyed by identifier, falling back to fingerprint.
struct Keyed<T> {
  items: Vec<T>,
  index: HashMap<String, usize>,
}

impl<T: Record> Keyed<T> {
  fn new() -> Self {
    Self {
      items: Vec::new(),
      index: HashMap::new(),
    }
  }

  fn key(record: &T) -> Option<String> {
    match record.id() {
      Some(id) => Some(format!("id:{}", id)),
      None => record.fingerprint().map(|fp| format!("fp:{}", fp)),
    }
  }

  /// Insert, or overwrite the entry with the same key in place.
  fn put(&mut self, record: T) {
    match Self::key(&record) {
      Some(key) => {
        if let Some(&pos) = self.index.get(&key) {
          self.items[pos] = record;
        } else {
          self.index.insert(key, self.items.len());
          self.items.push(record);
        }
      }
      None => self.items.push(record),
    }
  }
}

/// Merge a successful remote fetch with defaults and the local cache.
///
/// Precedence, lowest to highest: `defaults`, `remote`, then local-origin
/// records from `local` that the remote does not already hold - either under
/// the same id or, after an id migration, under the same fingerprint.
/// Remote-confirmed records in `local` are dropped; the remote speaks for them.
pub fn merge<T: Record>(defaults: &[T], remote: &[T], local: &[T]) -> Vec<T> {
  let mut merged = Keyed::new();

  for record in defaults.iter().chain(remote) {
    merged.put(record.clone());
  }

  let remote_ids: HashSet<&str> = remote.iter().filter_map(|r| r.id()).collect();
  let remote_fingerprints: HashSet<String> =
    remote.iter().filter_map(|r| r.fingerprint()).collect();

  for record in local {
    let Some(id) = record.id().filter(|id| is_local_id(id)) else {
      continue;
    };
    if remote_ids.contains(id) {
      continue;
    }
    if record
      .fingerprint()
      .is_some_and(|fp| remote_fingerprints.contains(&fp))
    {
      continue;
    }
    merged.put(record.clone());
  }

  let mut items = merged.items;
  T::arrange(&mut items);
  items
}

/// Replace the record stored under `id`, or append when there is none.
pub fn replace_or_push<T: Record>(items: &mut Vec<T>, id: &str, record: T) {
  match items.iter().position(|r| r.id() == Some(id)) {
    Some(pos) => items[pos] = record,
    None => items.push(record),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::{FaqItem, Service, ServiceStatus};

  fn service(id: &str, title: &str) -> Service {
    Service {
      id: Some(id.to_string()),
      title: title.to_string(),
      description: format!("{} description", title),
      icon: "Layout".to_string(),
      status: ServiceStatus::Active,
    }
  }

  fn ids(items: &[Service]) -> Vec<&str> {
    items.iter().filter_map(|s| s.id()).collect()
  }

  #[test]
  fn test_remote_overrides_defaults() {
    let defaults = vec![service("a", "A"), service("b", "B old")];
    let remote = vec![service("b", "B new"), service("c", "C")];

    let merged = merge(&defaults, &remote, &[]);
    assert_eq!(ids(&merged), vec!["a", "b", "c"]);
    assert_eq!(merged[1].title, "B new");
  }

  #[test]
  fn test_local_origin_records_survive() {
    let local_d = service("local_d", "D");
    let merged = merge(
      &[service("a", "A"), service("b", "B")],
      &[service("b", "B remote"), service("c", "C")],
      &[service("b", "B cached"), local_d],
    );

    assert_eq!(ids(&merged), vec!["a", "b", "c", "local_d"]);
    assert_eq!(merged[1].title, "B remote");
  }

  #[test]
  fn test_confirmed_copy_replaces_local_by_fingerprint() {
    let merged = merge(
      &[],
      &[service("42", "SEO & Performance")],
      &[service("local_x", "seo &  performance")],
    );
    assert_eq!(ids(&merged), vec!["42"]);
  }

  #[test]
  fn test_remote_confirmed_cache_entries_are_dropped() {
    // Deleted on the remote by someone else: the remote no longer returns it
    let merged = merge(&[], &[service("1", "A")], &[service("2", "B")]);
    assert_eq!(ids(&merged), vec!["1"]);
  }

  #[test]
  fn test_records_without_ids_key_on_fingerprint() {
    let faq = |q: &str, a: &str| FaqItem {
      id: None,
      question: q.to_string(),
      answer: a.to_string(),
    };
    let merged = merge(&[faq("Q1?", "old")], &[faq("q1?", "new")], &[]);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].answer, "new");
  }

  #[test]
  fn test_replace_or_push() {
    let mut items = vec![service("a", "A")];
    replace_or_push(&mut items, "a", service("a", "A2"));
    replace_or_push(&mut items, "b", service("b", "B"));
    assert_eq!(ids(&items), vec!["a", "b"]);
    assert_eq!(items[0].title, "A2");
  }
}
