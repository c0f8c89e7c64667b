//! Maintenance routes (admin only): reinitialise, sample data, settings and
//! export.

use axum::{
  Form,
  extract::State,
  http::header,
  response::{IntoResponse, Response},
};
use chores_core::{model::Bootstrap, policy::Operation, store::ChoreStore};
use tracing::{info, warn};

use super::{finish, redirect_with_session};
use crate::{
  APP_VERSION, AppState,
  auth::{DEFAULT_ADMIN, DEFAULT_ADMIN_PASSWORD, DEFAULT_PASSWORD, hash_password},
  error::Error,
  export::{self, CONTENT_TYPE, DOWNLOAD_NAME},
  forms::SettingsForm,
  gate::RequestContext,
  policy::authorize,
  session::Notice,
};

/// Drop everything and seed a fresh store through `store`, returning the id of
/// the new default administrator.
pub(crate) async fn reinitialize<S: ChoreStore>(store: &S) -> Result<i64, Error> {
  let bootstrap = Bootstrap {
    app_version:         APP_VERSION.to_string(),
    admin_name:          DEFAULT_ADMIN.to_string(),
    admin_password_hash: hash_password(DEFAULT_ADMIN_PASSWORD)?,
  };
  store.initialize(bootstrap).await.map_err(Error::from_store)?;
  let admin = store
    .find_person_by_name(DEFAULT_ADMIN.to_string())
    .await
    .map_err(Error::from_store)?
    .ok_or_else(|| chores_core::Error::PersonNotFound(DEFAULT_ADMIN.to_string()))?;
  Ok(admin.person_id)
}

/// The requester's session is rebound to the new administrator, since the
/// person it pointed at no longer exists.
pub async fn initdb<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::Reinitialize).await?;
    reinitialize(state.store.as_ref()).await
  }
  .await;

  match outcome {
    Ok(admin_id) => {
      warn!(person_id = ctx.person_id, "store reinitialised");
      state.sessions.destroy(&ctx.token);
      let token = state.sessions.create(admin_id);
      state
        .sessions
        .notify(&token, Notice::warning("Created new database"));
      redirect_with_session("/", Some(token))
    }
    Err(e) => finish(&state.sessions, &ctx, "/", Err(e)),
  }
}

pub async fn sample_data<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::LoadSampleData).await?;
    let hash = hash_password(DEFAULT_PASSWORD)?;
    state
      .store
      .load_sample_data(hash)
      .await
      .map_err(Error::from_store)?;
    warn!(person_id = ctx.person_id, "sample data loaded");
    Ok::<_, Error>(Notice::warning("Filled database with sample data"))
  }
  .await;
  finish(&state.sessions, &ctx, "/", outcome)
}

pub async fn settings<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
  Form(form): Form<SettingsForm>,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::ChangeSettings).await?;
    let per_page = form.validate()?;
    state
      .store
      .set_actions_per_page(per_page)
      .await
      .map_err(Error::from_store)?;
    info!(?per_page, "actions per page changed");
    Ok::<_, Error>(Notice::success("Settings saved"))
  }
  .await;
  finish(&state.sessions, &ctx, "/overview", outcome)
}

pub async fn export<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::Export).await?;
    let snapshot = state.store.snapshot().await.map_err(Error::from_store)?;
    let path =
      export::write_export(&state.config.export_dir, ctx.person_id, &snapshot)
        .await?;
    info!(person_id = ctx.person_id, path = %path.display(), "export written");
    Ok::<_, Error>(Notice::success("Export written"))
  }
  .await;
  finish(&state.sessions, &ctx, "/", outcome)
}

/// Send the requester's last export as an attachment.
pub async fn download_export<S: ChoreStore>(
  State(state): State<AppState<S>>,
  ctx: RequestContext,
) -> Response {
  let outcome = async {
    authorize(&state, &ctx, Operation::DownloadExport).await?;
    export::read_export(&state.config.export_dir, ctx.person_id).await
  }
  .await;

  match outcome {
    Ok(bytes) => (
      [
        (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
        (
          header::CONTENT_DISPOSITION,
          format!("attachment; filename=\"{DOWNLOAD_NAME}\""),
        ),
      ],
      bytes,
    )
      .into_response(),
    Err(e) => finish(&state.sessions, &ctx, "/", Err(e)),
  }
}
