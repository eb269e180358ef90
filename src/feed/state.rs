use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Error;
use crate::filter::RawFilter;

/// Page numbers start at one.
pub const FIRST_PAGE: u32 = 1;

const HIGHLIGHT_FIELD: &str = "Highlighted";

/// Items the feed can accumulate and deduplicate.
pub trait FeedItem: Clone + Send + Sync + 'static {
  fn id(&self) -> &str;
}

/// Which pagination pass the feed is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  /// Pinned content, served first
  #[default]
  Highlighted,
  /// Everything else
  Normal,
}

impl Phase {
  /// Filter term restricting results to this phase.
  pub fn filter(&self) -> RawFilter {
    match self {
      Phase::Highlighted => RawFilter::eq_bool(HIGHLIGHT_FIELD, true),
      Phase::Normal => RawFilter::Or(vec![
        RawFilter::eq_bool(HIGHLIGHT_FIELD, false),
        RawFilter::is_null(HIGHLIGHT_FIELD),
      ]),
    }
  }
}

/// One decoded page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage<T> {
  pub items: Vec<T>,
  pub current_page: u32,
  /// `None` once there is nothing after this page
  pub next_page: Option<u32>,
  pub total_results: u64,
}

/// Published state of a feed.
#[derive(Debug, Clone)]
pub struct FeedState<T> {
  /// Accumulated items in fetch order, unique by id
  pub items: Vec<T>,
  /// Next page to request in the current phase
  pub cursor: Option<u32>,
  pub phase: Phase,
  pub is_loading: bool,
  pub last_error: Option<Arc<Error>>,
  /// Total matches for the active filter, known once the feed is exhausted
  pub total_result_count: Option<u64>,
}

impl<T> Default for FeedState<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      cursor: Some(FIRST_PAGE),
      phase: Phase::Highlighted,
      is_loading: false,
      last_error: None,
      total_result_count: None,
    }
  }
}

impl<T: FeedItem> FeedState<T> {
  pub fn has_next_page(&self) -> bool {
    self.cursor.is_some()
  }

  /// Append items, skipping ids that are already present.
  pub(crate) fn append_unique(&mut self, items: Vec<T>) {
    let mut seen: HashSet<String> = self.items.iter().map(|i| i.id().to_string()).collect();
    for item in items {
      if seen.insert(item.id().to_string()) {
        self.items.push(item);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Clone, PartialEq)]
  struct Item(&'static str);

  impl FeedItem for Item {
    fn id(&self) -> &str {
      self.0
    }
  }

  #[test]
  fn test_initial_state() {
    let state: FeedState<Item> = FeedState::default();
    assert!(state.items.is_empty());
    assert_eq!(state.cursor, Some(FIRST_PAGE));
    assert_eq!(state.phase, Phase::Highlighted);
    assert!(state.has_next_page());
    assert!(!state.is_loading);
  }

  #[test]
  fn test_append_keeps_first_occurrence() {
    let mut state = FeedState::default();
    state.append_unique(vec![Item("a"), Item("b")]);
    state.append_unique(vec![Item("b"), Item("c"), Item("c")]);
    assert_eq!(state.items, vec![Item("a"), Item("b"), Item("c")]);
  }

  #[test]
  fn test_phase_filters() {
    assert_eq!(Phase::Highlighted.filter().to_string(), "eq(Highlighted,true)");
    assert_eq!(
      Phase::Normal.filter().to_string(),
      "or(eq(Highlighted,false),isnull(Highlighted))"
    );
  }
}
