//! Server-side sessions and the notices they carry.
//!
//! A session is identified by a random token that travels in the
//! [`COOKIE_NAME`] cookie. The server only keeps a keyed SHA-256 digest of each
//! token, never the token itself.
//!
//! Sessions come in two flavours: authenticated ones bound to a person, and
//! anonymous ones that exist only to carry notices (e.g. "Login first!") to the
//! login screen.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
  time::{Duration, Instant},
};

use axum::http::{HeaderMap, header};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chores_core::model::PersonId;
use rand_core::{OsRng, RngCore as _};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const COOKIE_NAME: &str = "housechores_session";

const TOKEN_BYTES: usize = 32;

/// Anonymous sessions only carry notices to the next page, so they never
/// outlive this, whatever the configured TTL.
const ANONYMOUS_TTL: Duration = Duration::from_secs(10 * 60);

// ─── Notices ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Success,
  Warning,
  Danger,
}

/// A message shown once on the next rendered view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
  pub level:   Level,
  pub message: String,
}

impl Notice {
  pub fn success(message: impl Into<String>) -> Self {
    Self { level: Level::Success, message: message.into() }
  }

  pub fn warning(message: impl Into<String>) -> Self {
    Self { level: Level::Warning, message: message.into() }
  }

  pub fn danger(message: impl Into<String>) -> Self {
    Self { level: Level::Danger, message: message.into() }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

struct Session {
  person_id: Option<PersonId>,
  notices:   Vec<Notice>,
  last_seen: Instant,
}

/// In-memory session table shared by every request.
pub struct SessionStore {
  secret:        Vec<u8>,
  ttl:           Option<Duration>,
  anonymous_ttl: Duration,
  sessions:      Mutex<HashMap<String, Session>>,
}

impl SessionStore {
  /// `secret` keys the token digests; without one a random key is drawn, so
  /// sessions do not survive a restart either way. `ttl` enables idle expiry.
  pub fn new(secret: Option<&str>, ttl: Option<Duration>) -> Self {
    let secret = match secret {
      Some(s) if !s.is_empty() => s.as_bytes().to_vec(),
      _ => random_bytes().to_vec(),
    };
    Self {
      secret,
      ttl,
      anonymous_ttl: ANONYMOUS_TTL,
      sessions: Mutex::new(HashMap::new()),
    }
  }

  /// Start an authenticated session and return its token.
  pub fn create(&self, person_id: PersonId) -> String {
    self.insert(Some(person_id))
  }

  /// Start a session that only carries notices.
  pub fn create_anonymous(&self) -> String { self.insert(None) }

  /// The person bound to `token`, if the session exists, is authenticated and
  /// has not expired. Expired sessions are dropped here and whenever a new
  /// session is started.
  pub fn resolve(&self, token: &str) -> Option<PersonId> {
    let key = self.digest(token);
    let mut sessions = self.lock();
    let session = sessions.get_mut(&key)?;
    if self.is_expired(session) {
      sessions.remove(&key);
      return None;
    }
    session.last_seen = Instant::now();
    session.person_id
  }

  pub fn destroy(&self, token: &str) {
    let key = self.digest(token);
    self.lock().remove(&key);
  }

  /// Queue a notice on an existing session. Returns `false` if there is no
  /// live session for `token`.
  pub fn notify(&self, token: &str, notice: Notice) -> bool {
    let key = self.digest(token);
    let mut sessions = self.lock();
    match sessions.get_mut(&key) {
      Some(session) if !self.is_expired(session) => {
        session.notices.push(notice);
        true
      }
      _ => false,
    }
  }

  /// Queue a notice on `token`'s session, or on a fresh anonymous session if
  /// there is none. Returns the new token when one had to be created.
  pub fn notify_or_create(
    &self,
    token: Option<&str>,
    notice: Notice,
  ) -> Option<String> {
    if let Some(token) = token
      && self.notify(token, notice.clone())
    {
      return None;
    }
    let token = self.create_anonymous();
    self.notify(&token, notice);
    Some(token)
  }

  /// Drain the notices queued on `token`'s session.
  pub fn take_notices(&self, token: &str) -> Vec<Notice> {
    let key = self.digest(token);
    self
      .lock()
      .get_mut(&key)
      .map(|s| std::mem::take(&mut s.notices))
      .unwrap_or_default()
  }

  fn insert(&self, person_id: Option<PersonId>) -> String {
    let token = B64.encode(random_bytes());
    let session = Session {
      person_id,
      notices: Vec::new(),
      last_seen: Instant::now(),
    };
    let mut sessions = self.lock();
    sessions.retain(|_, s| !self.is_expired(s));
    sessions.insert(self.digest(&token), session);
    token
  }

  fn is_expired(&self, session: &Session) -> bool {
    let ttl = match session.person_id {
      Some(_) => self.ttl,
      None => Some(self.ttl.map_or(self.anonymous_ttl, |t| {
        t.min(self.anonymous_ttl)
      })),
    };
    ttl.is_some_and(|ttl| session.last_seen.elapsed() >= ttl)
  }

  fn digest(&self, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&self.secret);
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn random_bytes() -> [u8; TOKEN_BYTES] {
  let mut bytes = [0u8; TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  bytes
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

/// Pull the session token out of the request's `Cookie` headers.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
    .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value carrying `token`.
pub fn session_cookie(token: &str) -> String {
  format!("{COOKIE_NAME}={token}; HttpOnly; SameSite=Lax; Path=/")
}
