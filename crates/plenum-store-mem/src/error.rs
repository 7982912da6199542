//! Error type for `plenum-store-mem`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Attempted to replace a record that was never inserted.
  #[error("contribution not found: {0}")]
  ContribNotFound(uuid::Uuid),

  #[error("assessment not found: {0}")]
  AssessmentNotFound(uuid::Uuid),

  #[error("review not found: {0}")]
  ReviewNotFound(uuid::Uuid),

  #[error("criteria entry not found: {0}")]
  CriteriaEntryNotFound(uuid::Uuid),

  /// A writer panicked while holding the table lock.
  #[error("store lock poisoned")]
  LockPoisoned,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
