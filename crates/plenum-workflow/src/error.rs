//! Error types for `plenum-workflow`.
//!
//! Only genuine failures live here. A refused command or a denied
//! permission is a regular return value, never an error: callers must not
//! be able to distinguish "refused by business rule" from "refused by
//! role" by catching different things.

use plenum_core::record::DecisionVerb;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("contribution not found: {0}")]
  ContribNotFound(Uuid),

  #[error("assessment not found: {0}")]
  AssessmentNotFound(Uuid),

  #[error("review not found: {0}")]
  ReviewNotFound(Uuid),

  #[error("table has no workflow level: {0}")]
  UnknownTable(String),

  /// The decision value table has no entry for this verb; the store's
  /// seed data is incomplete.
  #[error("no decision value for verb {0:?}")]
  MissingDecisionValue(DecisionVerb),

  /// A store failure during recompute means the cached derived state may
  /// now be stale; callers should surface a retryable failure rather than
  /// serve the old record as fresh.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
