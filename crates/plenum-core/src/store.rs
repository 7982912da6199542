//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `plenum-store-mem`).
//! The workflow engine and the API depend on this abstraction, not on any
//! concrete backend. The engine treats the store as an external document
//! store: typed fetches per table, whole-record inserts and replaces.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use uuid::Uuid;

use crate::{
  record::{
    Assessment, Contribution, CriteriaEntry, Criterion, DecisionValue, Review,
    ReviewEntry, ScoreValue, User,
  },
  workflow::ContribWorkflow,
};

pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Value tables ──────────────────────────────────────────────────────
  // Reference data; read once per process into the engine's context.

  fn criteria(
    &self,
  ) -> impl Future<Output = Result<Vec<Criterion>, Self::Error>> + Send + '_;

  fn score_values(
    &self,
  ) -> impl Future<Output = Result<Vec<ScoreValue>, Self::Error>> + Send + '_;

  fn decision_values(
    &self,
  ) -> impl Future<Output = Result<Vec<DecisionValue>, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Retrieve a user by id. Returns `None` if not found.
  fn user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Contributions ─────────────────────────────────────────────────────

  fn contrib(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contribution>, Self::Error>> + Send + '_;

  /// All contributions, optionally restricted to one country.
  fn contribs(
    &self,
    country: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Contribution>, Self::Error>> + Send + '_;

  fn insert_contrib(
    &self,
    record: Contribution,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace a contribution wholesale. Errors if the id is unknown.
  fn replace_contrib(
    &self,
    record: Contribution,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_contrib(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Assessments ───────────────────────────────────────────────────────

  fn assessment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Assessment>, Self::Error>> + Send + '_;

  /// Detail records of one contribution, in unspecified order.
  fn assessments_of(
    &self,
    contrib_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Assessment>, Self::Error>> + Send + '_;

  fn insert_assessment(
    &self,
    record: Assessment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn replace_assessment(
    &self,
    record: Assessment,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  fn review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Review>, Self::Error>> + Send + '_;

  fn reviews_of(
    &self,
    assessment_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Review>, Self::Error>> + Send + '_;

  fn insert_review(
    &self,
    record: Review,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn replace_review(
    &self,
    record: Review,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Entries ───────────────────────────────────────────────────────────

  fn criteria_entries_of(
    &self,
    assessment_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CriteriaEntry>, Self::Error>> + Send + '_;

  fn insert_criteria_entries(
    &self,
    records: Vec<CriteriaEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn replace_criteria_entry(
    &self,
    record: CriteriaEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn review_entries_of(
    &self,
    review_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ReviewEntry>, Self::Error>> + Send + '_;

  fn insert_review_entries(
    &self,
    records: Vec<ReviewEntry>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Workflow cache ────────────────────────────────────────────────────
  // One derived record per contribution, same id; replaced wholesale on
  // every recompute, never partially updated.

  fn workflow(
    &self,
    contrib_id: Uuid,
  ) -> impl Future<Output = Result<Option<ContribWorkflow>, Self::Error>> + Send + '_;

  /// All cached workflow records, optionally restricted to one country.
  fn workflows(
    &self,
    country: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<ContribWorkflow>, Self::Error>> + Send + '_;

  /// Insert or replace one workflow record.
  fn put_workflow(
    &self,
    record: ContribWorkflow,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn put_workflow_many(
    &self,
    records: Vec<ContribWorkflow>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn delete_workflow(
    &self,
    contrib_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Drop the whole cache; used before a full rebuild at startup.
  fn clear_workflows(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
