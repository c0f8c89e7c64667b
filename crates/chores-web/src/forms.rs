//! Form bodies accepted by the mutating routes.
//!
//! Every field arrives as an optional string and is validated here into the
//! core input types, so handlers never see a half-filled record.

use chores_core::{
  Error, Result,
  model::{ActionEdit, Chore, DATE_FORMAT, NewAction, PersonId, RoleId},
};
use chrono::NaiveDate;
use serde::Deserialize;

// ─── Field helpers ───────────────────────────────────────────────────────────

/// A present, non-blank field, trimmed.
pub fn required(field: &str, value: Option<String>) -> Result<String> {
  match value.as_deref().map(str::trim) {
    Some(v) if !v.is_empty() => Ok(v.to_string()),
    _ => Err(Error::Validation(field.to_string())),
  }
}

pub fn parse_id(field: &str, value: Option<String>) -> Result<i64> {
  required(field, value)?
    .parse()
    .map_err(|_| Error::Validation(field.to_string()))
}

/// Dates are accepted only in `YYYY-MM-DD` form. Day-first input such as
/// `20-10-2015` is rejected instead of being stored as an unsortable string.
pub fn parse_date(field: &str, value: Option<String>) -> Result<NaiveDate> {
  let raw = required(field, value)?;
  NaiveDate::parse_from_str(&raw, DATE_FORMAT)
    .map_err(|_| Error::Validation(format!("{field} (expected YYYY-MM-DD)")))
}

// ─── Actions ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct NewActionForm {
  pub date:   Option<String>,
  pub person: Option<String>,
  pub chore:  Option<String>,
}

impl NewActionForm {
  pub fn validate(self) -> Result<NewAction> {
    Ok(NewAction {
      action_date: parse_date("date", self.date)?,
      person_id:   parse_id("person", self.person)?,
      chore_id:    parse_id("chore", self.chore)?,
    })
  }
}

/// Person and chore are given by name here, unlike [`NewActionForm`].
#[derive(Debug, Default, Deserialize)]
pub struct EditActionForm {
  pub id:     Option<String>,
  pub date:   Option<String>,
  pub person: Option<String>,
  pub chore:  Option<String>,
}

impl EditActionForm {
  pub fn validate(self) -> Result<ActionEdit> {
    Ok(ActionEdit {
      action_id:   parse_id("id", self.id)?,
      action_date: parse_date("date", self.date)?,
      person_name: required("person", self.person)?,
      chore_name:  required("chore", self.chore)?,
    })
  }
}

// ─── Chores ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct NewChoreForm {
  pub chore: Option<String>,
}

impl NewChoreForm {
  pub fn validate(self) -> Result<String> { required("chore", self.chore) }
}

#[derive(Debug, Default, Deserialize)]
pub struct EditChoreForm {
  pub id:    Option<String>,
  pub chore: Option<String>,
}

impl EditChoreForm {
  pub fn validate(self) -> Result<Chore> {
    Ok(Chore {
      chore_id: parse_id("id", self.id)?,
      name:     required("chore", self.chore)?,
    })
  }
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct NewPersonForm {
  pub name:    Option<String>,
  pub role_id: Option<String>,
}

impl NewPersonForm {
  pub fn validate(self) -> Result<(String, RoleId)> {
    Ok((required("name", self.name)?, parse_id("role_id", self.role_id)?))
  }
}

/// Validated [`EditPersonForm`]; the password is still in clear text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonChange {
  pub person_id: PersonId,
  pub name:      String,
  pub role_id:   RoleId,
  pub password:  Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditPersonForm {
  pub id:       Option<String>,
  pub name:     Option<String>,
  pub role_id:  Option<String>,
  pub password: Option<String>,
}

impl EditPersonForm {
  pub fn validate(self) -> Result<PersonChange> {
    Ok(PersonChange {
      person_id: parse_id("id", self.id)?,
      name:      required("name", self.name)?,
      role_id:   parse_id("role_id", self.role_id)?,
      // Blank means "keep the current password"; passwords are not trimmed.
      password:  self.password.filter(|p| !p.is_empty()),
    })
  }
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
  pub actions_per_page: Option<String>,
}

impl SettingsForm {
  /// `0` switches paging off.
  pub fn validate(self) -> Result<Option<usize>> {
    let n: usize = required("actions_per_page", self.actions_per_page)?
      .parse()
      .map_err(|_| Error::Validation("actions_per_page".into()))?;
    Ok((n > 0).then_some(n))
  }
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
  pub user:     Option<String>,
  pub password: Option<String>,
}

impl LoginForm {
  /// Missing credentials fail exactly like wrong ones.
  pub fn validate(self) -> Result<(String, String)> {
    let user = required("user", self.user)
      .map_err(|_| Error::AuthenticationFailure)?;
    let password = self
      .password
      .filter(|p| !p.is_empty())
      .ok_or(Error::AuthenticationFailure)?;
    Ok((user, password))
  }
}

/// An id taken from the URL path.
pub fn path_id(raw: String) -> Result<i64> { parse_id("id", Some(raw)) }

#[cfg(test)]
mod tests {
  use super::*;

  fn some(s: &str) -> Option<String> { Some(s.to_string()) }

  #[test]
  fn new_action_accepts_iso_dates_and_integer_ids() {
    let form = NewActionForm {
      date:   some("2015-10-20"),
      person: some(" 1 "),
      chore:  some("4"),
    };
    let action = form.validate().unwrap();
    assert_eq!(action.action_date, NaiveDate::from_ymd_opt(2015, 10, 20).unwrap());
    assert_eq!((action.person_id, action.chore_id), (1, 4));
  }

  #[test]
  fn new_action_rejects_day_first_dates() {
    let form = NewActionForm {
      date:   some("20-10-2015"),
      person: some("1"),
      chore:  some("4"),
    };
    assert!(matches!(form.validate(), Err(Error::Validation(f)) if f.starts_with("date")));
  }

  #[test]
  fn missing_or_blank_fields_are_validation_errors() {
    let form = NewActionForm { date: some("2015-10-20"), person: None, chore: some("4") };
    assert_eq!(form.validate(), Err(Error::Validation("person".into())));

    let form = NewChoreForm { chore: some("   ") };
    assert_eq!(form.validate(), Err(Error::Validation("chore".into())));

    let form = EditChoreForm { id: some("five"), chore: some("mop") };
    assert_eq!(form.validate(), Err(Error::Validation("id".into())));
  }

  #[test]
  fn edit_action_keeps_names() {
    let form = EditActionForm {
      id:     some("1"),
      date:   some("1980-01-01"),
      person: some("random"),
      chore:  some("groceries lidl"),
    };
    let edit = form.validate().unwrap();
    assert_eq!(edit.person_name, "random");
    assert_eq!(edit.chore_name, "groceries lidl");
  }

  #[test]
  fn blank_password_keeps_current_one() {
    let form = EditPersonForm {
      id:       some("2"),
      name:     some("random"),
      role_id:  some("2"),
      password: some(""),
    };
    assert_eq!(form.validate().unwrap().password, None);
  }

  #[test]
  fn zero_page_size_disables_paging() {
    let form = SettingsForm { actions_per_page: some("0") };
    assert_eq!(form.validate().unwrap(), None);
    let form = SettingsForm { actions_per_page: some("25") };
    assert_eq!(form.validate().unwrap(), Some(25));
    let form = SettingsForm { actions_per_page: some("-1") };
    assert!(form.validate().is_err());
  }

  #[test]
  fn incomplete_login_is_an_authentication_failure() {
    let form = LoginForm { user: None, password: some("admin") };
    assert_eq!(form.validate(), Err(Error::AuthenticationFailure));
    let form = LoginForm { user: some("admin"), password: None };
    assert_eq!(form.validate(), Err(Error::AuthenticationFailure));
  }
}
