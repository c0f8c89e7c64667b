//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` strings. Booleans are stored as 0/1
//! integers. Ids are SQLite integer primary keys.

use chores_core::{
  model::{Action, DATE_FORMAT, Person},
  view::{ChoreLastAction, OverviewEntry},
};
use chrono::NaiveDate;

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Person names ────────────────────────────────────────────────────────────

/// Lookup key for a person name. Unicode-aware, unlike SQLite's `NOCASE`.
pub fn encode_name_key(name: &str) -> String { name.to_lowercase() }

// ─── Meta values ─────────────────────────────────────────────────────────────

pub fn encode_per_page(per_page: Option<usize>) -> String {
  per_page.unwrap_or(0).to_string()
}

pub fn decode_per_page(key: &str, value: &str) -> Result<Option<usize>> {
  let n: usize = value.trim().parse().map_err(|_| Error::BadMetaValue {
    key:   key.to_owned(),
    value: value.to_owned(),
  })?;
  Ok((n > 0).then_some(n))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `actions` row.
pub struct RawAction {
  pub id:          i64,
  pub action_date: String,
  pub person_id:   i64,
  pub chore_id:    i64,
}

impl RawAction {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      action_date: row.get(1)?,
      person_id:   row.get(2)?,
      chore_id:    row.get(3)?,
    })
  }

  pub fn into_action(self) -> Result<Action> {
    Ok(Action {
      action_id:   self.id,
      action_date: decode_date(&self.action_date)?,
      person_id:   self.person_id,
      chore_id:    self.chore_id,
    })
  }
}

/// Raw values read directly from a `persons` row.
pub struct RawPerson {
  pub id:                   i64,
  pub name:                 String,
  pub password:             String,
  pub role_id:              i64,
  pub must_change_password: bool,
}

impl RawPerson {
  pub const COLUMNS: &'static str =
    "id, name, password, role_id, must_change_password";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      name:                 row.get(1)?,
      password:             row.get(2)?,
      role_id:              row.get(3)?,
      must_change_password: row.get(4)?,
    })
  }

  pub fn into_person(self) -> Person {
    Person {
      person_id:            self.id,
      name:                 self.name,
      role_id:              self.role_id,
      must_change_password: self.must_change_password,
      password_hash:        self.password,
    }
  }
}

/// Raw values read from the `overview` view.
pub struct RawOverview {
  pub id:          i64,
  pub action_date: String,
  pub chore_id:    i64,
  pub chore:       Option<String>,
  pub person_id:   i64,
  pub person:      Option<String>,
}

impl RawOverview {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      action_date: row.get(1)?,
      chore_id:    row.get(2)?,
      chore:       row.get(3)?,
      person_id:   row.get(4)?,
      person:      row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<OverviewEntry> {
    Ok(OverviewEntry {
      action_id:   self.id,
      action_date: decode_date(&self.action_date)?,
      chore_id:    self.chore_id,
      chore:       self.chore,
      person_id:   self.person_id,
      person:      self.person,
    })
  }
}

/// Raw values read from the `chores_lastaction` view.
pub struct RawLastAction {
  pub chore_id:    i64,
  pub chore:       String,
  pub last_action: Option<String>,
}

impl RawLastAction {
  pub fn into_summary(self) -> Result<ChoreLastAction> {
    Ok(ChoreLastAction {
      chore_id:    self.chore_id,
      chore:       self.chore,
      last_action: self.last_action.as_deref().map(decode_date).transpose()?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_round_trip_in_iso_form() {
    let d = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    assert_eq!(encode_date(d), "2020-01-02");
    assert_eq!(decode_date("2020-01-02").unwrap(), d);
  }

  #[test]
  fn day_first_dates_are_rejected() {
    assert!(matches!(decode_date("20-10-2015"), Err(Error::DateParse(_))));
  }

  #[test]
  fn zero_page_size_means_unbounded() {
    assert_eq!(decode_per_page("actions_per_page", "0").unwrap(), None);
    assert_eq!(decode_per_page("actions_per_page", " 3 ").unwrap(), Some(3));
    assert_eq!(encode_per_page(None), "0");
    assert!(decode_per_page("actions_per_page", "many").is_err());
  }
}
