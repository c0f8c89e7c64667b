//! Password hashing and credential checks.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chores_core::{model::Person, store::ChoreStore};
use rand_core::OsRng;

use crate::error::Error;

/// Name of the administrator seeded into a fresh store.
pub const DEFAULT_ADMIN: &str = "admin";
/// Password of the seeded administrator. Flagged for change on first login.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";
/// Password given to persons created by an administrator.
pub const DEFAULT_PASSWORD: &str = "changeme";

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Hash(e.to_string()))
}

/// `false` for a wrong password and for a malformed stored hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(hash) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Look up `name` and check `password` against it. Unknown names and wrong
/// passwords fail the same way.
pub async fn authenticate<S: ChoreStore>(
  store: &S,
  name: &str,
  password: &str,
) -> Result<Person, Error> {
  let person = store
    .find_person_by_name(name.to_string())
    .await
    .map_err(Error::from_store)?;

  match person {
    Some(p) if verify_password(password, &p.password_hash) => Ok(p),
    _ => Err(chores_core::Error::AuthenticationFailure.into()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashes_verify_against_their_password_only() {
    let hash = hash_password("secret").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("secret", &hash));
    assert!(!verify_password("Secret", &hash));
  }

  #[test]
  fn salts_differ_between_hashes() {
    assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
  }

  #[test]
  fn malformed_hashes_never_verify() {
    assert!(!verify_password("anything", "not-a-phc-string"));
    assert!(!verify_password("", ""));
  }
}
