//! Handler for `/task` — executing workflow commands.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
};
use plenum_core::{store::RecordStore, table::Table};
use plenum_workflow::{Command, CommandOutcome, Workflow};
use uuid::Uuid;

use crate::{actor::resolve_actor, error::ApiError};

/// `POST /task/:command/:table/:id`
///
/// The table segment is redundant with the command but kept on the URL so
/// task links are self-describing; a mismatch is a malformed request.
pub async fn run<S>(
  State(engine): State<Arc<Workflow<S>>>,
  Path((command, table, id)): Path<(Command, Table, Uuid)>,
  headers: HeaderMap,
) -> Result<Json<CommandOutcome>, ApiError>
where
  S: RecordStore,
{
  if command.table() != table {
    return Err(ApiError::BadRequest(format!(
      "command {command} does not apply to table {table}"
    )));
  }
  let actor = resolve_actor(engine.store().as_ref(), &headers).await?;
  let outcome = engine.do_command(command, id, &actor).await?;
  Ok(Json(outcome))
}
