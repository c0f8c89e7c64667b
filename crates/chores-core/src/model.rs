//! Persisted records: persons, roles, chores, actions and meta settings.
//!
//! An action is one completed chore. Actions are freely edited and deleted by
//! any logged-in person; persons and chores form the taxonomy that only
//! administrators change.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type PersonId = i64;
pub type RoleId = i64;
pub type ChoreId = i64;
pub type ActionId = i64;

/// Calendar format used for `action_date` everywhere: on the wire, in forms,
/// and in the database column. Lexical order equals chronological order.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ─── Roles ───────────────────────────────────────────────────────────────────

/// Name of the role that unlocks taxonomy and maintenance operations.
pub const ADMIN_ROLE: &str = "admin";
/// Name of the role every other person gets.
pub const USER_ROLE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub role_id: RoleId,
  pub name:    String,
}

impl Role {
  pub fn is_admin(&self) -> bool { self.name == ADMIN_ROLE }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

/// Someone who can log in and be credited with completing chores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub person_id:            PersonId,
  pub name:                 String,
  pub role_id:              RoleId,
  /// Set while the person still has the default password.
  pub must_change_password: bool,
  /// argon2 PHC string. Never serialised.
  #[serde(skip)]
  pub password_hash:        String,
}

/// Input to [`crate::store::ChoreStore::create_person`].
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub name:          String,
  pub role_id:       RoleId,
  pub password_hash: String,
}

/// Input to [`crate::store::ChoreStore::edit_person`]. A `None` password hash
/// leaves the stored credentials untouched.
#[derive(Debug, Clone)]
pub struct PersonEdit {
  pub person_id:     PersonId,
  pub name:          String,
  pub role_id:       RoleId,
  pub password_hash: Option<String>,
}

// ─── Chores ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chore {
  pub chore_id: ChoreId,
  pub name:     String,
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// One record of a chore being completed by a person on a date.
///
/// The referenced ids are not guaranteed to exist: persons can be deleted
/// from under their actions, and creation does not check the ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
  pub action_id:   ActionId,
  pub action_date: NaiveDate,
  pub person_id:   PersonId,
  pub chore_id:    ChoreId,
}

/// Input to [`crate::store::ChoreStore::record_action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAction {
  pub action_date: NaiveDate,
  pub person_id:   PersonId,
  pub chore_id:    ChoreId,
}

/// Input to [`crate::store::ChoreStore::edit_action`]. Person and chore are
/// given by name and resolved by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEdit {
  pub action_id:   ActionId,
  pub action_date: NaiveDate,
  pub person_name: String,
  pub chore_name:  String,
}

// ─── Meta ────────────────────────────────────────────────────────────────────

/// Keys of the persisted key/value settings table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::Display,
  strum::EnumString,
)]
pub enum MetaKey {
  #[strum(serialize = "appversion")]
  AppVersion,
  #[strum(serialize = "dbversion")]
  DbVersion,
  /// Overview page size; `0` means a single unbounded page.
  #[strum(serialize = "actions_per_page")]
  ActionsPerPage,
}

/// Application and schema versions, resolved on every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versions {
  pub app_version: String,
  pub db_version:  String,
}

/// Everything needed to (re)create a store from scratch.
#[derive(Debug, Clone)]
pub struct Bootstrap {
  pub app_version:         String,
  pub admin_name:          String,
  pub admin_password_hash: String,
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn meta_keys_use_stored_names() {
    assert_eq!(MetaKey::AppVersion.as_ref(), "appversion");
    assert_eq!(MetaKey::DbVersion.to_string(), "dbversion");
    assert_eq!(
      MetaKey::from_str("actions_per_page").unwrap(),
      MetaKey::ActionsPerPage
    );
  }

  #[test]
  fn person_serialisation_hides_password() {
    let person = Person {
      person_id:            1,
      name:                 "admin".into(),
      role_id:              1,
      must_change_password: false,
      password_hash:        "$argon2id$secret".into(),
    };
    let json = serde_json::to_string(&person).unwrap();
    assert!(!json.contains("argon2"), "{json}");
  }
}
