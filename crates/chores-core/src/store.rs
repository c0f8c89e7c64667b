//! The `ChoreStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `chores-store-sqlite`).
//! The web layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  Error,
  model::{
    Action, ActionEdit, ActionId, Bootstrap, Chore, ChoreId, NewAction,
    NewPerson, Person, PersonEdit, PersonId, Role, Versions,
  },
  view::{ChoreLastAction, OverviewRow, Page, Snapshot, Statistics},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Backend errors that may wrap a recoverable domain [`Error`].
///
/// Callers use this to tell "no such chore" apart from "the database is
/// gone" without knowing the concrete backend.
pub trait StoreError: std::error::Error + Send + Sync + Sized + 'static {
  /// Return the domain error if this is one, or give `self` back.
  fn into_domain(self) -> Result<Error, Self>;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Housechores store backend.
///
/// Every method is a single unit of work: multi-statement mutations are
/// atomic, and nothing is held open between calls.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ChoreStore: Send + Sync {
  type Error: StoreError;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Whether the schema exists.
  fn is_initialized(
    &self,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Drop everything and recreate the schema, seed roles and meta, and create
  /// the default administrator.
  fn initialize(
    &self,
    bootstrap: Bootstrap,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert the fixed sample household. Loading twice changes nothing.
  fn load_sample_data(
    &self,
    default_password_hash: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Meta ──────────────────────────────────────────────────────────────

  /// Fails with [`Error::MissingMeta`] on a store that was never initialised.
  fn versions(
    &self,
  ) -> impl Future<Output = Result<Versions, Self::Error>> + Send + '_;

  /// `None` means unbounded.
  fn actions_per_page(
    &self,
  ) -> impl Future<Output = Result<Option<usize>, Self::Error>> + Send + '_;

  fn set_actions_per_page(
    &self,
    per_page: Option<usize>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Identity ──────────────────────────────────────────────────────────

  fn list_roles(
    &self,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  fn list_persons(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by name.
  fn find_person_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// `true` when the person exists and their role is `admin`.
  fn is_admin(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fails with [`Error::NameConflict`] if the name is taken, leaving the
  /// store unchanged. The new person must change their password.
  fn create_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Fails with [`Error::NameConflict`] if another person has the new name,
  /// or [`Error::PersonNotFound`] if the id is unknown.
  fn edit_person(
    &self,
    edit: PersonEdit,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Actions referencing the person are left in place.
  fn delete_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Chores ────────────────────────────────────────────────────────────

  fn list_chores(
    &self,
  ) -> impl Future<Output = Result<Vec<Chore>, Self::Error>> + Send + '_;

  fn create_chore(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Chore, Self::Error>> + Send + '_;

  fn edit_chore(
    &self,
    chore: Chore,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete the chore and every action referencing it, atomically.
  /// Returns how many actions were removed with it.
  fn delete_chore(
    &self,
    id: ChoreId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Insert an action. The referenced ids are not checked.
  fn record_action(
    &self,
    input: NewAction,
  ) -> impl Future<Output = Result<Action, Self::Error>> + Send + '_;

  fn get_action(
    &self,
    id: ActionId,
  ) -> impl Future<Output = Result<Option<Action>, Self::Error>> + Send + '_;

  /// Resolve names to ids and rewrite all three fields of the action.
  fn edit_action(
    &self,
    edit: ActionEdit,
  ) -> impl Future<Output = Result<Action, Self::Error>> + Send + '_;

  /// Returns whether a row was removed; deleting an absent id is not an error.
  fn delete_action(
    &self,
    id: ActionId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Record a new action for `person_id` on `date` with the chore of the
  /// source action. Fails with [`Error::ActionNotFound`] if the source is
  /// absent.
  fn copy_action(
    &self,
    source: ActionId,
    person_id: PersonId,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Action, Self::Error>> + Send + '_;

  // ── Views ─────────────────────────────────────────────────────────────

  /// The whole overview, newest first, chore name breaking date ties.
  fn overview(
    &self,
  ) -> impl Future<Output = Result<Vec<OverviewRow>, Self::Error>> + Send + '_;

  /// One page of the overview, sized by the `actions_per_page` setting.
  fn overview_page(
    &self,
    page: usize,
  ) -> impl Future<Output = Result<Page<OverviewRow>, Self::Error>> + Send + '_;

  fn chores_last_action(
    &self,
  ) -> impl Future<Output = Result<Vec<ChoreLastAction>, Self::Error>> + Send + '_;

  fn statistics(
    &self,
  ) -> impl Future<Output = Result<Statistics, Self::Error>> + Send + '_;

  fn snapshot(
    &self,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;
}
