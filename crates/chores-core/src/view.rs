//! Read models derived from the ledger.
//!
//! None of these are stored; they are computed by the store at query time
//! and handed to the presentation layer as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{
  Action, ActionId, Chore, ChoreId, Person, PersonId, Role,
};

// ─── Overview ────────────────────────────────────────────────────────────────

/// One action joined with the names it references. Names are `None` when the
/// referenced row no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewEntry {
  pub action_id:   ActionId,
  pub action_date: NaiveDate,
  pub chore_id:    ChoreId,
  pub chore:       Option<String>,
  pub person_id:   PersonId,
  pub person:      Option<String>,
}

/// A row of the overview. An empty ledger yields exactly one
/// [`OverviewRow::NoChoresYet`] instead of an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverviewRow {
  Entry(OverviewEntry),
  NoChoresYet,
}

impl OverviewRow {
  pub const NO_CHORES_YET: &'static str = "No chores yet";

  pub fn entry(&self) -> Option<&OverviewEntry> {
    match self {
      Self::Entry(e) => Some(e),
      Self::NoChoresYet => None,
    }
  }
}

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Resolved page window over a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
  /// 1-based, always within `1..=page_count`.
  pub page:       usize,
  pub page_count: usize,
  /// `None` means a single unbounded page.
  pub per_page:   Option<usize>,
}

impl Paging {
  /// Work out the window for `requested` over `total` rows. Out-of-range page
  /// numbers clamp to the nearest valid page; a page size of zero is treated
  /// as unbounded.
  pub fn resolve(total: usize, per_page: Option<usize>, requested: usize) -> Self {
    let per_page = per_page.filter(|n| *n > 0);
    let page_count = match per_page {
      Some(n) => total.div_ceil(n).max(1),
      None => 1,
    };
    Self { page: requested.clamp(1, page_count), page_count, per_page }
  }

  pub fn offset(&self) -> usize {
    self.per_page.map_or(0, |n| (self.page - 1) * n)
  }

  pub fn limit(&self) -> Option<usize> { self.per_page }

  /// The current-page indicator, only shown when there is more than one page.
  pub fn current_page(&self) -> Option<usize> {
    (self.page_count > 1).then_some(self.page)
  }
}

/// One page of rows plus the indicator a pager needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub rows:         Vec<T>,
  pub current_page: Option<usize>,
  pub page_count:   usize,
}

impl<T> Page<T> {
  pub fn new(rows: Vec<T>, paging: Paging) -> Self {
    Self {
      rows,
      current_page: paging.current_page(),
      page_count: paging.page_count,
    }
  }
}

// ─── Chore summary ───────────────────────────────────────────────────────────

/// A chore with the date it was last performed, `None` if never.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreLastAction {
  pub chore_id:    ChoreId,
  pub chore:       String,
  pub last_action: Option<NaiveDate>,
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreCount {
  pub chore_id: ChoreId,
  pub chore:    Option<String>,
  pub count:    u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonCount {
  pub person_id: PersonId,
  pub person:    Option<String>,
  pub count:     u64,
}

/// Action counts ranked by descending count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
  pub top_chores:    Vec<ChoreCount>,
  pub who_does_what: Vec<PersonCount>,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Every persisted record, used for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub roles:   Vec<Role>,
  pub persons: Vec<Person>,
  pub chores:  Vec<Chore>,
  pub actions: Vec<Action>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unbounded_is_one_page_without_indicator() {
    let p = Paging::resolve(50, None, 1);
    assert_eq!(p.page_count, 1);
    assert_eq!(p.offset(), 0);
    assert_eq!(p.limit(), None);
    assert_eq!(p.current_page(), None);
  }

  #[test]
  fn zero_page_size_is_unbounded() {
    assert_eq!(Paging::resolve(7, Some(0), 3), Paging::resolve(7, None, 1));
  }

  #[test]
  fn five_rows_three_per_page() {
    let first = Paging::resolve(5, Some(3), 1);
    assert_eq!(first.page_count, 2);
    assert_eq!(first.offset(), 0);
    assert_eq!(first.current_page(), Some(1));

    let second = Paging::resolve(5, Some(3), 2);
    assert_eq!(second.offset(), 3);
    assert_eq!(second.current_page(), Some(2));
  }

  #[test]
  fn out_of_range_pages_clamp() {
    assert_eq!(Paging::resolve(5, Some(3), 99).page, 2);
    assert_eq!(Paging::resolve(5, Some(3), 0).page, 1);
    assert_eq!(Paging::resolve(0, Some(3), 4).page, 1);
  }

  #[test]
  fn exact_fit_has_no_empty_trailing_page() {
    assert_eq!(Paging::resolve(6, Some(3), 9).page_count, 2);
    assert_eq!(Paging::resolve(3, Some(3), 1).current_page(), None);
  }

  #[test]
  fn sentinel_row_serialises_with_marker() {
    let json = serde_json::to_value(OverviewRow::NoChoresYet).unwrap();
    assert_eq!(json, serde_json::json!({ "kind": "no_chores_yet" }));
    assert!(OverviewRow::NoChoresYet.entry().is_none());
  }
}
