//! Role checks in front of admin-only operations.

use chores_core::{policy::Operation, store::ChoreStore};
use tracing::warn;

use crate::{AppState, error::Error, gate::RequestContext};

/// Fails with [`chores_core::Error::AuthorizationDenied`] when `op` needs the
/// admin role and the requester does not have it.
pub async fn authorize<S: ChoreStore>(
  state: &AppState<S>,
  ctx: &RequestContext,
  op: Operation,
) -> Result<(), Error> {
  if !op.requires_admin() {
    return Ok(());
  }
  let admin = state
    .store
    .is_admin(ctx.person_id)
    .await
    .map_err(Error::from_store)?;
  if admin {
    Ok(())
  } else {
    warn!(person_id = ctx.person_id, operation = %op, "admin operation denied");
    Err(chores_core::Error::AuthorizationDenied.into())
  }
}
