//! Handlers for `/contribs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/contribs` | Optional `?country=<uuid>` |
//! | `GET`  | `/contribs/:id/workflow` | The full derived record |
//! | `GET`  | `/contribs/:id/stage` | `?table=<table>[&kind=<kind>]` |
//! | `GET`  | `/contribs/:id/permission/:command` | Permit for the header user |
//! | `POST` | `/contribs/:id/recompute` | Rederive and return the record |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::HeaderMap,
};
use plenum_core::{
  store::RecordStore,
  table::{ReviewKind, Table},
  workflow::ContribWorkflow,
};
use plenum_workflow::{Command, Permit, StatusRow, Workflow};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{actor::resolve_actor, error::ApiError};

// ─── Overview ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OverviewParams {
  pub country: Option<Uuid>,
}

/// `GET /contribs[?country=<uuid>]`
pub async fn overview<S>(
  State(engine): State<Arc<Workflow<S>>>,
  Query(params): Query<OverviewParams>,
) -> Result<Json<Vec<StatusRow>>, ApiError>
where
  S: RecordStore,
{
  let rows = engine.overview(params.country).await?;
  Ok(Json(rows))
}

// ─── Workflow record ──────────────────────────────────────────────────────────

/// `GET /contribs/:id/workflow`
pub async fn workflow<S>(
  State(engine): State<Arc<Workflow<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ContribWorkflow>, ApiError>
where
  S: RecordStore,
{
  Ok(Json(engine.workflow(id).await?))
}

/// `POST /contribs/:id/recompute`
pub async fn recompute<S>(
  State(engine): State<Arc<Workflow<S>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ContribWorkflow>, ApiError>
where
  S: RecordStore,
{
  Ok(Json(engine.recompute(id).await?))
}

// ─── Stage ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StageParams {
  pub table: Table,
  pub kind:  Option<ReviewKind>,
}

#[derive(Debug, Serialize)]
pub struct StageResponse {
  /// `None` when no stage is recorded at that level yet.
  pub stage: Option<String>,
}

/// `GET /contribs/:id/stage?table=<table>[&kind=<kind>]`
pub async fn stage<S>(
  State(engine): State<Arc<Workflow<S>>>,
  Path(id): Path<Uuid>,
  Query(params): Query<StageParams>,
  headers: HeaderMap,
) -> Result<Json<StageResponse>, ApiError>
where
  S: RecordStore,
{
  let actor = resolve_actor(engine.store().as_ref(), &headers).await?;
  let record = engine.workflow(id).await?;
  let item = engine.item_for(&record, &actor);
  let stage = item
    .stage(params.table, params.kind)
    .map(|s| s.to_string());
  Ok(Json(StageResponse { stage }))
}

// ─── Permission ───────────────────────────────────────────────────────────────

/// `GET /contribs/:id/permission/:command`
pub async fn permission<S>(
  State(engine): State<Arc<Workflow<S>>>,
  Path((id, command)): Path<(Uuid, Command)>,
  headers: HeaderMap,
) -> Result<Json<Permit>, ApiError>
where
  S: RecordStore,
{
  let actor = resolve_actor(engine.store().as_ref(), &headers).await?;
  let record = engine.workflow(id).await?;
  let item = engine.item_for(&record, &actor);
  Ok(Json(item.permission(command)))
}
