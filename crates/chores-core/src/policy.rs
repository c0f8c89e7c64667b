//! The catalogue of operations and which of them need the admin role.
//!
//! Ledger entries are open to every authenticated person, including edits to
//! other people's actions. The taxonomy (chores, persons) and maintenance are
//! reserved for administrators.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Operation {
  // ── Ledger ──────────────────────────────────────────────────────────────
  RecordAction,
  EditAction,
  DeleteAction,
  CopyToToday,
  NewFromChore,

  // ── Taxonomy ────────────────────────────────────────────────────────────
  CreateChore,
  EditChore,
  DeleteChore,
  CreatePerson,
  EditPerson,
  DeletePerson,

  // ── Maintenance ─────────────────────────────────────────────────────────
  Reinitialize,
  LoadSampleData,
  ChangeSettings,
  Export,
  DownloadExport,
}

impl Operation {
  pub fn requires_admin(self) -> bool {
    !matches!(
      self,
      Self::RecordAction
        | Self::EditAction
        | Self::DeleteAction
        | Self::CopyToToday
        | Self::NewFromChore
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ledger_operations_are_open() {
    for op in [
      Operation::RecordAction,
      Operation::EditAction,
      Operation::DeleteAction,
      Operation::CopyToToday,
      Operation::NewFromChore,
    ] {
      assert!(!op.requires_admin(), "{op}");
    }
  }

  #[test]
  fn taxonomy_and_maintenance_need_admin() {
    for op in [
      Operation::CreateChore,
      Operation::DeleteChore,
      Operation::EditPerson,
      Operation::Reinitialize,
      Operation::LoadSampleData,
      Operation::Export,
      Operation::DownloadExport,
    ] {
      assert!(op.requires_admin(), "{op}");
    }
  }

  #[test]
  fn display_is_snake_case() {
    assert_eq!(Operation::DeleteChore.to_string(), "delete_chore");
  }
}
