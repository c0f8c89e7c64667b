//! [`SqliteStore`]: the SQLite implementation of [`ChoreStore`].

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::OptionalExtension as _;

use chores_core::{
  model::{
    Action, ActionEdit, ActionId, Bootstrap, Chore, ChoreId, MetaKey, NewAction,
    NewPerson, Person, PersonEdit, PersonId, Role, Versions, ADMIN_ROLE,
  },
  store::ChoreStore,
  view::{
    ChoreCount, ChoreLastAction, OverviewRow, Page, PersonCount, Paging,
    Snapshot, Statistics,
  },
};

use crate::{
  encode::{
    decode_per_page, encode_date, encode_name_key, encode_per_page, RawAction,
    RawLastAction, RawOverview, RawPerson,
  },
  schema::{
    ADMIN_ROLE_ID, PRAGMAS, SAMPLE_DATA, SAMPLE_PERSONS, SCHEMA, SCHEMA_VERSION,
  },
  Result,
};

/// Outcome of a closure that may fail with a domain error after the
/// connection work itself succeeded.
type Outcome<T> = std::result::Result<T, chores_core::Error>;

const ACTION_COLUMNS: &str = "id, action_date, person_id, chore_id";

const OVERVIEW_ORDER: &str = "ORDER BY action_date DESC, chore ASC, id ASC";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Housechores store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Opening a
/// store does not create the schema; see [`ChoreStore::initialize`].
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database file at `path`.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.apply_pragmas().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.apply_pragmas().await?;
    Ok(store)
  }

  async fn apply_pragmas(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_meta(&self, key: MetaKey) -> Result<Option<String>> {
    let value = self
      .conn
      .call(move |conn| Ok(meta_value(conn, key)?))
      .await?;
    Ok(value)
  }
}

fn meta_value(
  conn: &rusqlite::Connection,
  key: MetaKey,
) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT value FROM meta WHERE key = ?1",
      rusqlite::params![key.as_ref()],
      |r| r.get(0),
    )
    .optional()
}

fn missing(key: MetaKey) -> crate::Error {
  chores_core::Error::MissingMeta(key.to_string()).into()
}

fn person_by<P: rusqlite::Params>(
  conn: &rusqlite::Connection,
  filter: &str,
  params: P,
) -> rusqlite::Result<Option<RawPerson>> {
  conn
    .query_row(
      &format!("SELECT {} FROM persons WHERE {filter}", RawPerson::COLUMNS),
      params,
      RawPerson::from_row,
    )
    .optional()
}

fn action_by_id(
  conn: &rusqlite::Connection,
  id: ActionId,
) -> rusqlite::Result<Option<RawAction>> {
  conn
    .query_row(
      &format!("SELECT {ACTION_COLUMNS} FROM actions WHERE id = ?1"),
      rusqlite::params![id],
      RawAction::from_row,
    )
    .optional()
}

// ─── ChoreStore impl ─────────────────────────────────────────────────────────

impl ChoreStore for SqliteStore {
  type Error = crate::Error;

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn is_initialized(&self) -> Result<bool> {
    let exists = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'meta'",
              [],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(exists)
  }

  async fn initialize(&self, bootstrap: Bootstrap) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        tx.execute(
          "INSERT INTO meta (key, value) VALUES (?1, ?2), (?3, ?4)",
          rusqlite::params![
            MetaKey::AppVersion.as_ref(),
            bootstrap.app_version,
            MetaKey::DbVersion.as_ref(),
            SCHEMA_VERSION,
          ],
        )?;
        tx.execute(
          "INSERT INTO persons
             (name, name_key, password, role_id, must_change_password)
           VALUES (?1, ?2, ?3, ?4, 1)",
          rusqlite::params![
            bootstrap.admin_name,
            encode_name_key(&bootstrap.admin_name),
            bootstrap.admin_password_hash,
            ADMIN_ROLE_ID,
          ],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn load_sample_data(&self, default_password_hash: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for &(id, name, role_id) in SAMPLE_PERSONS {
          tx.execute(
            "INSERT OR IGNORE INTO persons
               (id, name, name_key, password, role_id, must_change_password)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            rusqlite::params![
              id,
              name,
              encode_name_key(name),
              default_password_hash,
              role_id,
            ],
          )?;
        }
        tx.execute_batch(SAMPLE_DATA)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Meta ──────────────────────────────────────────────────────────────────

  async fn versions(&self) -> Result<Versions> {
    let app = self.read_meta(MetaKey::AppVersion).await?;
    let db = self.read_meta(MetaKey::DbVersion).await?;
    match (app, db) {
      (Some(app_version), Some(db_version)) => {
        Ok(Versions { app_version, db_version })
      }
      (None, _) => Err(missing(MetaKey::AppVersion)),
      (_, None) => Err(missing(MetaKey::DbVersion)),
    }
  }

  async fn actions_per_page(&self) -> Result<Option<usize>> {
    let key = MetaKey::ActionsPerPage;
    match self.read_meta(key).await? {
      Some(value) => decode_per_page(key.as_ref(), &value),
      None => Ok(None),
    }
  }

  async fn set_actions_per_page(&self, per_page: Option<usize>) -> Result<()> {
    let value = encode_per_page(per_page);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO meta (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![MetaKey::ActionsPerPage.as_ref(), value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Identity ──────────────────────────────────────────────────────────────

  async fn list_roles(&self) -> Result<Vec<Role>> {
    let roles = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Role { role_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(roles)
  }

  async fn list_persons(&self) -> Result<Vec<Person>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM persons ORDER BY name_key, id",
          RawPerson::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(raws.into_iter().map(RawPerson::into_person).collect())
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let raw = self
      .conn
      .call(move |conn| Ok(person_by(conn, "id = ?1", rusqlite::params![id])?))
      .await?;
    Ok(raw.map(RawPerson::into_person))
  }

  async fn find_person_by_name(&self, name: String) -> Result<Option<Person>> {
    let key = encode_name_key(&name);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(person_by(conn, "name_key = ?1", rusqlite::params![key])?)
      })
      .await?;
    Ok(raw.map(RawPerson::into_person))
  }

  async fn is_admin(&self, id: PersonId) -> Result<bool> {
    let role: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT r.name FROM persons p
               JOIN roles r ON r.id = p.role_id
               WHERE p.id = ?1",
              rusqlite::params![id],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(role.as_deref() == Some(ADMIN_ROLE))
  }

  async fn create_person(&self, input: NewPerson) -> Result<Person> {
    let name = input.name.clone();
    let hash = input.password_hash.clone();
    let role_id = input.role_id;

    let outcome: Outcome<i64> = self
      .conn
      .call(move |conn| {
        let key = encode_name_key(&name);
        if person_by(conn, "name_key = ?1", rusqlite::params![key])?.is_some() {
          return Ok(Err(chores_core::Error::NameConflict(name)));
        }
        conn.execute(
          "INSERT INTO persons
             (name, name_key, password, role_id, must_change_password)
           VALUES (?1, ?2, ?3, ?4, 1)",
          rusqlite::params![name, key, hash, role_id],
        )?;
        Ok(Ok(conn.last_insert_rowid()))
      })
      .await?;

    Ok(Person {
      person_id:            outcome?,
      name:                 input.name,
      role_id:              input.role_id,
      must_change_password: true,
      password_hash:        input.password_hash,
    })
  }

  async fn edit_person(&self, edit: PersonEdit) -> Result<()> {
    let outcome: Outcome<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if person_by(&tx, "id = ?1", rusqlite::params![edit.person_id])?.is_none() {
          return Ok(Err(chores_core::Error::PersonNotFound(
            edit.person_id.to_string(),
          )));
        }
        let key = encode_name_key(&edit.name);
        let clash = person_by(
          &tx,
          "name_key = ?1 AND id != ?2",
          rusqlite::params![key, edit.person_id],
        )?;
        if clash.is_some() {
          return Ok(Err(chores_core::Error::NameConflict(edit.name)));
        }
        tx.execute(
          "UPDATE persons SET name = ?1, name_key = ?2, role_id = ?3
           WHERE id = ?4",
          rusqlite::params![edit.name, key, edit.role_id, edit.person_id],
        )?;
        if let Some(hash) = edit.password_hash {
          tx.execute(
            "UPDATE persons SET password = ?1, must_change_password = 0
             WHERE id = ?2",
            rusqlite::params![hash, edit.person_id],
          )?;
        }
        tx.commit()?;
        Ok(Ok(()))
      })
      .await?;
    Ok(outcome?)
  }

  async fn delete_person(&self, id: PersonId) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM persons WHERE id = ?1", rusqlite::params![id])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Chores ────────────────────────────────────────────────────────────────

  async fn list_chores(&self) -> Result<Vec<Chore>> {
    let chores = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT id, name FROM chores ORDER BY name, id")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Chore { chore_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(chores)
  }

  async fn create_chore(&self, name: String) -> Result<Chore> {
    let name_col = name.clone();
    let chore_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO chores (name) VALUES (?1)",
          rusqlite::params![name_col],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;
    Ok(Chore { chore_id, name })
  }

  async fn edit_chore(&self, chore: Chore) -> Result<()> {
    let id = chore.chore_id;
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE chores SET name = ?1 WHERE id = ?2",
          rusqlite::params![chore.name, chore.chore_id],
        )?)
      })
      .await?;
    if changed == 0 {
      return Err(chores_core::Error::ChoreNotFound(id.to_string()).into());
    }
    Ok(())
  }

  async fn delete_chore(&self, id: ChoreId) -> Result<usize> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let actions = tx.execute(
          "DELETE FROM actions WHERE chore_id = ?1",
          rusqlite::params![id],
        )?;
        tx.execute("DELETE FROM chores WHERE id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(actions)
      })
      .await?;
    Ok(removed)
  }

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn record_action(&self, input: NewAction) -> Result<Action> {
    let date_str = encode_date(input.action_date);
    let action_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO actions (action_date, person_id, chore_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![date_str, input.person_id, input.chore_id],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Action {
      action_id,
      action_date: input.action_date,
      person_id: input.person_id,
      chore_id: input.chore_id,
    })
  }

  async fn get_action(&self, id: ActionId) -> Result<Option<Action>> {
    let raw = self
      .conn
      .call(move |conn| Ok(action_by_id(conn, id)?))
      .await?;
    raw.map(RawAction::into_action).transpose()
  }

  async fn edit_action(&self, edit: ActionEdit) -> Result<Action> {
    let date_str = encode_date(edit.action_date);
    let action_id = edit.action_id;

    let outcome: Outcome<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if action_by_id(&tx, action_id)?.is_none() {
          return Ok(Err(chores_core::Error::ActionNotFound(action_id)));
        }
        let person_key = encode_name_key(&edit.person_name);
        let Some(person) =
          person_by(&tx, "name_key = ?1", rusqlite::params![person_key])?
        else {
          return Ok(Err(chores_core::Error::PersonNotFound(edit.person_name)));
        };
        let chore_id: Option<i64> = tx
          .query_row(
            "SELECT id FROM chores WHERE name = ?1 ORDER BY id LIMIT 1",
            rusqlite::params![edit.chore_name],
            |r| r.get(0),
          )
          .optional()?;
        let Some(chore_id) = chore_id else {
          return Ok(Err(chores_core::Error::ChoreNotFound(edit.chore_name)));
        };
        tx.execute(
          "UPDATE actions SET action_date = ?1, person_id = ?2, chore_id = ?3
           WHERE id = ?4",
          rusqlite::params![date_str, person.id, chore_id, action_id],
        )?;
        tx.commit()?;
        Ok(Ok((person.id, chore_id)))
      })
      .await?;

    let (person_id, chore_id) = outcome?;
    Ok(Action {
      action_id,
      action_date: edit.action_date,
      person_id,
      chore_id,
    })
  }

  async fn delete_action(&self, id: ActionId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM actions WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn copy_action(
    &self,
    source: ActionId,
    person_id: PersonId,
    date: NaiveDate,
  ) -> Result<Action> {
    let date_str = encode_date(date);

    let outcome: Outcome<(i64, i64)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(original) = action_by_id(&tx, source)? else {
          return Ok(Err(chores_core::Error::ActionNotFound(source)));
        };
        tx.execute(
          "INSERT INTO actions (action_date, person_id, chore_id)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![date_str, person_id, original.chore_id],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Ok((id, original.chore_id)))
      })
      .await?;

    let (action_id, chore_id) = outcome?;
    Ok(Action { action_id, action_date: date, person_id, chore_id })
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  async fn overview(&self) -> Result<Vec<OverviewRow>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT id, action_date, chore_id, chore, person_id, person
           FROM overview {OVERVIEW_ORDER}"
        ))?;
        let rows = stmt
          .query_map([], RawOverview::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    if raws.is_empty() {
      return Ok(vec![OverviewRow::NoChoresYet]);
    }
    raws
      .into_iter()
      .map(|raw| raw.into_entry().map(OverviewRow::Entry))
      .collect()
  }

  async fn overview_page(&self, page: usize) -> Result<Page<OverviewRow>> {
    let per_page = self.actions_per_page().await?;

    let (raws, paging) = self
      .conn
      .call(move |conn| {
        let total: i64 =
          conn.query_row("SELECT COUNT(*) FROM actions", [], |r| r.get(0))?;
        let paging = Paging::resolve(total as usize, per_page, page);
        // LIMIT -1 is SQLite for "no limit".
        let limit = paging.limit().map_or(-1, |n| n as i64);
        let mut stmt = conn.prepare(&format!(
          "SELECT id, action_date, chore_id, chore, person_id, person
           FROM overview {OVERVIEW_ORDER}
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![limit, paging.offset() as i64],
            RawOverview::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, paging))
      })
      .await?;

    let rows = if raws.is_empty() {
      vec![OverviewRow::NoChoresYet]
    } else {
      raws
        .into_iter()
        .map(|raw| raw.into_entry().map(OverviewRow::Entry))
        .collect::<Result<Vec<_>>>()?
    };
    Ok(Page::new(rows, paging))
  }

  async fn chores_last_action(&self) -> Result<Vec<ChoreLastAction>> {
    let raws = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT chore_id, chore, last_action FROM chores_lastaction
           ORDER BY last_action IS NOT NULL, last_action ASC, chore ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawLastAction {
              chore_id:    row.get(0)?,
              chore:       row.get(1)?,
              last_action: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLastAction::into_summary).collect()
  }

  async fn statistics(&self) -> Result<Statistics> {
    let stats = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT a.chore_id, c.name, COUNT(*) AS n
           FROM actions a
           LEFT JOIN chores c ON c.id = a.chore_id
           GROUP BY a.chore_id
           ORDER BY n DESC, c.name ASC",
        )?;
        let top_chores = stmt
          .query_map([], |row| {
            Ok(ChoreCount {
              chore_id: row.get(0)?,
              chore:    row.get(1)?,
              count:    row.get::<_, i64>(2)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT a.person_id, p.name, COUNT(*) AS n
           FROM actions a
           LEFT JOIN persons p ON p.id = a.person_id
           GROUP BY a.person_id
           ORDER BY n DESC, p.name ASC",
        )?;
        let who_does_what = stmt
          .query_map([], |row| {
            Ok(PersonCount {
              person_id: row.get(0)?,
              person:    row.get(1)?,
              count:     row.get::<_, i64>(2)? as u64,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Statistics { top_chores, who_does_what })
      })
      .await?;
    Ok(stats)
  }

  /// All four tables are read in one transaction, so the snapshot never
  /// holds an action whose chore was deleted halfway through.
  async fn snapshot(&self) -> Result<Snapshot> {
    let (roles, persons, chores, actions) = self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;

        let roles = tx
          .prepare("SELECT id, name FROM roles ORDER BY id")?
          .query_map([], |row| {
            Ok(Role { role_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let persons = tx
          .prepare(&format!(
            "SELECT {} FROM persons ORDER BY id",
            RawPerson::COLUMNS
          ))?
          .query_map([], RawPerson::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let chores = tx
          .prepare("SELECT id, name FROM chores ORDER BY id")?
          .query_map([], |row| {
            Ok(Chore { chore_id: row.get(0)?, name: row.get(1)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let actions = tx
          .prepare(&format!("SELECT {ACTION_COLUMNS} FROM actions ORDER BY id"))?
          .query_map([], RawAction::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        tx.commit()?;
        Ok((roles, persons, chores, actions))
      })
      .await?;

    Ok(Snapshot {
      roles,
      persons: persons.into_iter().map(RawPerson::into_person).collect(),
      chores,
      actions: actions
        .into_iter()
        .map(RawAction::into_action)
        .collect::<Result<_>>()?,
    })
  }
}
