//! Integration tests for `SqliteStore` against an in-memory database.

use chores_core::{
  model::{ActionEdit, Bootstrap, Chore, NewAction, NewPerson, PersonEdit},
  store::{ChoreStore, StoreError as _},
  view::OverviewRow,
};
use chrono::NaiveDate;

use crate::{Error, SCHEMA_VERSION, SqliteStore};

const USER_ROLE_ID: i64 = 2;

fn date(s: &str) -> NaiveDate {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

async fn empty_store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn store() -> SqliteStore {
  let s = empty_store().await;
  s.initialize(Bootstrap {
    app_version:         "0.1.0".into(),
    admin_name:          "admin".into(),
    admin_password_hash: "admin-hash".into(),
  })
  .await
  .unwrap();
  s
}

async fn sample_store() -> SqliteStore {
  let s = store().await;
  s.load_sample_data("sample-hash".into()).await.unwrap();
  s
}

fn domain(e: Error) -> chores_core::Error {
  e.into_domain().expect("domain error")
}

fn entries(rows: &[OverviewRow]) -> Vec<i64> {
  rows
    .iter()
    .filter_map(OverviewRow::entry)
    .map(|e| e.action_id)
    .collect()
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_is_uninitialized() {
  let s = empty_store().await;
  assert!(!s.is_initialized().await.unwrap());
}

#[tokio::test]
async fn initialize_seeds_versions_roles_and_admin() {
  let s = store().await;
  assert!(s.is_initialized().await.unwrap());

  let versions = s.versions().await.unwrap();
  assert_eq!(versions.app_version, "0.1.0");
  assert_eq!(versions.db_version, SCHEMA_VERSION);

  let roles = s.list_roles().await.unwrap();
  let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
  assert_eq!(names, ["admin", "user"]);

  let admin = s.find_person_by_name("admin".into()).await.unwrap().unwrap();
  assert!(admin.must_change_password);
  assert!(s.is_admin(admin.person_id).await.unwrap());

  assert_eq!(s.actions_per_page().await.unwrap(), None);
}

#[tokio::test]
async fn reinitialize_wipes_data() {
  let s = sample_store().await;
  s.initialize(Bootstrap {
    app_version:         "0.2.0".into(),
    admin_name:          "admin".into(),
    admin_password_hash: "h".into(),
  })
  .await
  .unwrap();

  assert!(s.list_chores().await.unwrap().is_empty());
  assert_eq!(s.list_persons().await.unwrap().len(), 1);
  assert_eq!(s.versions().await.unwrap().app_version, "0.2.0");
}

#[tokio::test]
async fn versions_on_uninitialized_store_fail() {
  let s = empty_store().await;
  assert!(s.versions().await.is_err());
}

#[tokio::test]
async fn sample_data_matches_fixture_and_is_idempotent() {
  let s = sample_store().await;
  s.load_sample_data("sample-hash".into()).await.unwrap();

  let chores = s.list_chores().await.unwrap();
  assert_eq!(chores.len(), 6);
  let dishes = chores.iter().find(|c| c.chore_id == 1).unwrap();
  assert_eq!(dishes.name, "dishes");

  assert_eq!(entries(&s.overview().await.unwrap()).len(), 6);
  assert!(s.find_person_by_name("random".into()).await.unwrap().is_some());
  assert_eq!(s.list_persons().await.unwrap().len(), 3);
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_person_requires_password_change() {
  let s = store().await;
  let p = s
    .create_person(NewPerson {
      name:          "bob".into(),
      role_id:       USER_ROLE_ID,
      password_hash: "h".into(),
    })
    .await
    .unwrap();

  assert!(p.must_change_password);
  assert!(!s.is_admin(p.person_id).await.unwrap());
  assert_eq!(s.get_person(p.person_id).await.unwrap().unwrap().name, "bob");
}

#[tokio::test]
async fn person_names_conflict_case_insensitively() {
  let s = store().await;
  let before = s.list_persons().await.unwrap();

  let err = s
    .create_person(NewPerson {
      name:          "ADMIN".into(),
      role_id:       USER_ROLE_ID,
      password_hash: "h".into(),
    })
    .await
    .unwrap_err();

  assert_eq!(domain(err), chores_core::Error::NameConflict("ADMIN".into()));
  assert_eq!(s.list_persons().await.unwrap(), before);
}

#[tokio::test]
async fn non_ascii_names_fold_case_too() {
  let s = store().await;
  let elodie = s
    .create_person(NewPerson {
      name:          "Élodie".into(),
      role_id:       USER_ROLE_ID,
      password_hash: "h".into(),
    })
    .await
    .unwrap();

  let err = s
    .create_person(NewPerson {
      name:          "élodie".into(),
      role_id:       USER_ROLE_ID,
      password_hash: "h".into(),
    })
    .await
    .unwrap_err();
  assert_eq!(domain(err), chores_core::Error::NameConflict("élodie".into()));

  let names: Vec<_> = s
    .list_persons()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, ["admin", "Élodie"]);

  let found = s.find_person_by_name("ÉLODIE".into()).await.unwrap().unwrap();
  assert_eq!(found.person_id, elodie.person_id);
  assert_eq!(found.name, "Élodie");

  let bob = s
    .create_person(NewPerson {
      name:          "Bob".into(),
      role_id:       USER_ROLE_ID,
      password_hash: "h".into(),
    })
    .await
    .unwrap();
  let err = s
    .edit_person(PersonEdit {
      person_id:     bob.person_id,
      name:          "éLODIE".into(),
      role_id:       USER_ROLE_ID,
      password_hash: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(err), chores_core::Error::NameConflict(_)));
}

#[tokio::test]
async fn renaming_onto_a_taken_name_conflicts() {
  let s = sample_store().await;
  let err = s
    .edit_person(PersonEdit {
      person_id:     2,
      name:          "Alice".into(),
      role_id:       USER_ROLE_ID,
      password_hash: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(domain(err), chores_core::Error::NameConflict(_)));

  // Keeping one's own name is not a conflict.
  s.edit_person(PersonEdit {
    person_id:     2,
    name:          "random".into(),
    role_id:       USER_ROLE_ID,
    password_hash: Some("new".into()),
  })
  .await
  .unwrap();
  let random = s.get_person(2).await.unwrap().unwrap();
  assert!(!random.must_change_password);
  assert_eq!(random.password_hash, "new");
}

#[tokio::test]
async fn edit_unknown_person_is_not_found() {
  let s = store().await;
  let err = s
    .edit_person(PersonEdit {
      person_id:     42,
      name:          "ghost".into(),
      role_id:       USER_ROLE_ID,
      password_hash: None,
    })
    .await
    .unwrap_err();
  assert!(domain(err).is_not_found());
}

#[tokio::test]
async fn deleting_a_person_keeps_their_actions() {
  let s = sample_store().await;
  s.delete_person(2).await.unwrap();

  let rows = s.overview().await.unwrap();
  let orphan = rows
    .iter()
    .filter_map(OverviewRow::entry)
    .find(|e| e.action_id == 5)
    .unwrap();
  assert_eq!(orphan.person, None);
  assert_eq!(orphan.chore.as_deref(), Some("change bedsheets"));
}

// ─── Chores ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_edit_chore() {
  let s = store().await;
  let chore = s.create_chore("windows".into()).await.unwrap();
  s.edit_chore(Chore { chore_id: chore.chore_id, name: "clean windows".into() })
    .await
    .unwrap();

  let chores = s.list_chores().await.unwrap();
  assert_eq!(chores, [Chore { chore_id: chore.chore_id, name: "clean windows".into() }]);

  let err = s
    .edit_chore(Chore { chore_id: 99, name: "x".into() })
    .await
    .unwrap_err();
  assert!(domain(err).is_not_found());
}

#[tokio::test]
async fn deleting_a_chore_removes_its_actions() {
  let s = sample_store().await;
  let removed = s.delete_chore(1).await.unwrap();
  assert_eq!(removed, 2);

  let remaining = entries(&s.overview().await.unwrap());
  assert!(!remaining.contains(&1));
  assert!(!remaining.contains(&2));
  assert_eq!(remaining.len(), 4);
  assert!(s.list_chores().await.unwrap().iter().all(|c| c.chore_id != 1));
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_action_accepts_unknown_ids() {
  let s = store().await;
  let action = s
    .record_action(NewAction {
      action_date: date("2024-03-01"),
      person_id:   77,
      chore_id:    88,
    })
    .await
    .unwrap();

  let fetched = s.get_action(action.action_id).await.unwrap().unwrap();
  assert_eq!(fetched, action);

  let rows = s.overview().await.unwrap();
  let entry = rows[0].entry().unwrap();
  assert_eq!(entry.chore, None);
  assert_eq!(entry.person, None);
}

#[tokio::test]
async fn edit_action_resolves_names() {
  let s = sample_store().await;
  let edited = s
    .edit_action(ActionEdit {
      action_id:   1,
      action_date: date("2015-11-11"),
      person_name: "alice".into(),
      chore_name:  "laundry".into(),
    })
    .await
    .unwrap();

  assert_eq!(edited.person_id, 3);
  assert_eq!(edited.chore_id, 3);
  assert_eq!(s.get_action(1).await.unwrap().unwrap(), edited);
}

#[tokio::test]
async fn edit_action_reports_unknown_names_and_ids() {
  let s = sample_store().await;
  let edit = |action_id, person: &str, chore: &str| ActionEdit {
    action_id,
    action_date: date("2015-11-11"),
    person_name: person.into(),
    chore_name: chore.into(),
  };

  let err = s.edit_action(edit(99, "alice", "laundry")).await.unwrap_err();
  assert_eq!(domain(err), chores_core::Error::ActionNotFound(99));

  let err = s.edit_action(edit(1, "nobody", "laundry")).await.unwrap_err();
  assert!(matches!(domain(err), chores_core::Error::PersonNotFound(_)));

  let err = s.edit_action(edit(1, "alice", "nothing")).await.unwrap_err();
  assert!(matches!(domain(err), chores_core::Error::ChoreNotFound(_)));

  // Nothing changed.
  assert_eq!(s.get_action(1).await.unwrap().unwrap().chore_id, 1);
}

#[tokio::test]
async fn delete_action_is_idempotent() {
  let s = sample_store().await;
  assert!(s.delete_action(3).await.unwrap());
  assert!(!s.delete_action(3).await.unwrap());
  assert!(s.get_action(3).await.unwrap().is_none());
}

#[tokio::test]
async fn copy_action_keeps_chore() {
  let s = sample_store().await;
  let copy = s.copy_action(5, 1, date("2024-01-01")).await.unwrap();
  assert_eq!(copy.chore_id, 5);
  assert_eq!(copy.person_id, 1);
  assert_ne!(copy.action_id, 5);

  let err = s.copy_action(404, 1, date("2024-01-01")).await.unwrap_err();
  assert_eq!(domain(err), chores_core::Error::ActionNotFound(404));
}

// ─── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_overview_has_sentinel_row() {
  let s = store().await;
  assert_eq!(s.overview().await.unwrap(), [OverviewRow::NoChoresYet]);

  let page = s.overview_page(1).await.unwrap();
  assert_eq!(page.rows, [OverviewRow::NoChoresYet]);
  assert_eq!(page.current_page, None);
}

#[tokio::test]
async fn overview_is_newest_first_with_chore_name_ties() {
  let s = sample_store().await;
  // 2015-10-02 holds action 2 (dishes) and action 3 (vacuum cleaning).
  assert_eq!(entries(&s.overview().await.unwrap()), [6, 5, 4, 2, 3, 1]);
}

#[tokio::test]
async fn overview_pages_by_setting() {
  let s = sample_store().await;
  s.set_actions_per_page(Some(4)).await.unwrap();
  assert_eq!(s.actions_per_page().await.unwrap(), Some(4));

  let first = s.overview_page(1).await.unwrap();
  assert_eq!(entries(&first.rows), [6, 5, 4, 2]);
  assert_eq!(first.current_page, Some(1));
  assert_eq!(first.page_count, 2);

  let second = s.overview_page(2).await.unwrap();
  assert_eq!(entries(&second.rows), [3, 1]);

  // Out-of-range pages clamp to the last page.
  let clamped = s.overview_page(99).await.unwrap();
  assert_eq!(clamped.current_page, Some(2));
  assert_eq!(entries(&clamped.rows), [3, 1]);
}

#[tokio::test]
async fn unbounded_paging_is_one_page() {
  let s = sample_store().await;
  s.set_actions_per_page(None).await.unwrap();
  let page = s.overview_page(3).await.unwrap();
  assert_eq!(page.rows.len(), 6);
  assert_eq!(page.current_page, None);
  assert_eq!(page.page_count, 1);
}

#[tokio::test]
async fn chores_last_action_lists_never_done_first() {
  let s = sample_store().await;
  let summary = s.chores_last_action().await.unwrap();
  assert_eq!(summary.len(), 6);

  assert_eq!(summary[0].chore, "groceries lidl");
  assert_eq!(summary[0].last_action, None);

  let dishes = summary.iter().find(|c| c.chore_id == 1).unwrap();
  assert_eq!(dishes.last_action, Some(date("2015-10-02")));

  let dated: Vec<_> = summary.iter().filter_map(|c| c.last_action).collect();
  assert!(dated.windows(2).all(|w| w[0] <= w[1]), "{dated:?}");
}

#[tokio::test]
async fn deleting_the_only_action_clears_last_action() {
  let s = sample_store().await;
  s.delete_action(5).await.unwrap();
  let summary = s.chores_last_action().await.unwrap();
  let bedsheets = summary.iter().find(|c| c.chore_id == 5).unwrap();
  assert_eq!(bedsheets.last_action, None);
}

#[tokio::test]
async fn statistics_count_by_chore_and_person() {
  let s = sample_store().await;
  let stats = s.statistics().await.unwrap();

  assert_eq!(stats.top_chores[0].chore.as_deref(), Some("dishes"));
  assert_eq!(stats.top_chores[0].count, 2);
  assert_eq!(stats.top_chores.iter().map(|c| c.count).sum::<u64>(), 6);

  let counts: Vec<_> = stats
    .who_does_what
    .iter()
    .map(|p| (p.person.as_deref(), p.count))
    .collect();
  assert_eq!(
    counts,
    [(Some("admin"), 2), (Some("alice"), 2), (Some("random"), 2)]
  );
}

#[tokio::test]
async fn snapshot_contains_everything() {
  let s = sample_store().await;
  let snap = s.snapshot().await.unwrap();
  assert_eq!(snap.roles.len(), 2);
  assert_eq!(snap.persons.len(), 3);
  assert_eq!(snap.chores.len(), 6);
  assert_eq!(snap.actions.len(), 6);
  assert_eq!(snap.actions[0].action_date, date("2015-10-01"));
}

#[tokio::test]
async fn snapshot_actions_reference_exported_chores() {
  let s = sample_store().await;
  s.delete_chore(1).await.unwrap();

  let snap = s.snapshot().await.unwrap();
  let chore_ids: Vec<_> = snap.chores.iter().map(|c| c.chore_id).collect();
  assert_eq!(chore_ids, [2, 3, 4, 5, 6]);
  assert_eq!(snap.actions.len(), 4);
  assert!(snap.actions.iter().all(|a| chore_ids.contains(&a.chore_id)));
}
