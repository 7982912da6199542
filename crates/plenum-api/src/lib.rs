//! JSON REST API for the plenum workflow engine.
//!
//! Exposes an axum [`Router`] backed by any [`plenum_core::store::RecordStore`]
//! via a shared [`plenum_workflow::Workflow`] engine. Auth, TLS, and
//! transport concerns are the caller's responsibility; the acting user
//! arrives as a forwarded `x-user-id` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plenum_api::api_router(engine.clone()))
//! ```

pub mod actor;
pub mod config;
pub mod contribs;
pub mod error;
pub mod task;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use plenum_core::store::RecordStore;
use plenum_workflow::Workflow;

pub use config::ServerConfig;
pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<Workflow<S>>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Contributions
    .route("/contribs", get(contribs::overview::<S>))
    .route("/contribs/{id}/workflow", get(contribs::workflow::<S>))
    .route("/contribs/{id}/stage", get(contribs::stage::<S>))
    .route(
      "/contribs/{id}/permission/{command}",
      get(contribs::permission::<S>),
    )
    .route("/contribs/{id}/recompute", post(contribs::recompute::<S>))
    // Tasks
    .route("/task/{command}/{table}/{id}", post(task::run::<S>))
    .with_state(engine)
}
