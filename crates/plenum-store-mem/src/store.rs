//! [`MemStore`] — the in-memory implementation of [`RecordStore`].

use std::{
  collections::HashMap,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use plenum_core::{
  record::{
    Assessment, Contribution, CriteriaEntry, Criterion, DecisionValue, Review,
    ReviewEntry, ScoreValue, User,
  },
  store::RecordStore,
  workflow::ContribWorkflow,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
  criteria:         Vec<Criterion>,
  score_values:     Vec<ScoreValue>,
  decision_values:  Vec<DecisionValue>,
  users:            HashMap<Uuid, User>,
  contribs:         HashMap<Uuid, Contribution>,
  assessments:      HashMap<Uuid, Assessment>,
  reviews:          HashMap<Uuid, Review>,
  criteria_entries: HashMap<Uuid, CriteriaEntry>,
  review_entries:   HashMap<Uuid, ReviewEntry>,
  workflows:        HashMap<Uuid, ContribWorkflow>,
}

/// All tables in process memory behind one lock.
///
/// Cloning is cheap — the tables are reference-counted and shared.
#[derive(Clone, Default)]
pub struct MemStore {
  inner: Arc<RwLock<Inner>>,
}

impl MemStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
    self.inner.read().map_err(|_| Error::LockPoisoned)
  }

  fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
    self.inner.write().map_err(|_| Error::LockPoisoned)
  }

  // ── Seeding ───────────────────────────────────────────────────────────
  // Value tables and users have no workflow commands of their own; they
  // are loaded directly, at startup or from tests.

  pub fn add_criteria(&self, records: Vec<Criterion>) -> Result<()> {
    self.write()?.criteria.extend(records);
    Ok(())
  }

  pub fn add_score_values(&self, records: Vec<ScoreValue>) -> Result<()> {
    self.write()?.score_values.extend(records);
    Ok(())
  }

  pub fn add_decision_values(&self, records: Vec<DecisionValue>) -> Result<()> {
    self.write()?.decision_values.extend(records);
    Ok(())
  }

  pub fn add_user(&self, record: User) -> Result<()> {
    self.write()?.users.insert(record.user_id, record);
    Ok(())
  }
}

// ─── RecordStore ─────────────────────────────────────────────────────────────

impl RecordStore for MemStore {
  type Error = Error;

  // ── Value tables ──────────────────────────────────────────────────────

  async fn criteria(&self) -> Result<Vec<Criterion>> {
    Ok(self.read()?.criteria.clone())
  }

  async fn score_values(&self) -> Result<Vec<ScoreValue>> {
    Ok(self.read()?.score_values.clone())
  }

  async fn decision_values(&self) -> Result<Vec<DecisionValue>> {
    Ok(self.read()?.decision_values.clone())
  }

  // ── Users ─────────────────────────────────────────────────────────────

  async fn user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.read()?.users.get(&id).cloned())
  }

  // ── Contributions ─────────────────────────────────────────────────────

  async fn contrib(&self, id: Uuid) -> Result<Option<Contribution>> {
    Ok(self.read()?.contribs.get(&id).cloned())
  }

  async fn contribs(&self, country: Option<Uuid>) -> Result<Vec<Contribution>> {
    let inner = self.read()?;
    Ok(
      inner
        .contribs
        .values()
        .filter(|c| country.is_none() || c.country == country)
        .cloned()
        .collect(),
    )
  }

  async fn insert_contrib(&self, record: Contribution) -> Result<()> {
    self.write()?.contribs.insert(record.contrib_id, record);
    Ok(())
  }

  async fn replace_contrib(&self, record: Contribution) -> Result<()> {
    let mut inner = self.write()?;
    if !inner.contribs.contains_key(&record.contrib_id) {
      return Err(Error::ContribNotFound(record.contrib_id));
    }
    inner.contribs.insert(record.contrib_id, record);
    Ok(())
  }

  async fn delete_contrib(&self, id: Uuid) -> Result<()> {
    self.write()?.contribs.remove(&id);
    Ok(())
  }

  // ── Assessments ───────────────────────────────────────────────────────

  async fn assessment(&self, id: Uuid) -> Result<Option<Assessment>> {
    Ok(self.read()?.assessments.get(&id).cloned())
  }

  async fn assessments_of(&self, contrib_id: Uuid) -> Result<Vec<Assessment>> {
    let inner = self.read()?;
    Ok(
      inner
        .assessments
        .values()
        .filter(|a| a.contrib == contrib_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_assessment(&self, record: Assessment) -> Result<()> {
    self.write()?.assessments.insert(record.assessment_id, record);
    Ok(())
  }

  async fn replace_assessment(&self, record: Assessment) -> Result<()> {
    let mut inner = self.write()?;
    if !inner.assessments.contains_key(&record.assessment_id) {
      return Err(Error::AssessmentNotFound(record.assessment_id));
    }
    inner.assessments.insert(record.assessment_id, record);
    Ok(())
  }

  // ── Reviews ───────────────────────────────────────────────────────────

  async fn review(&self, id: Uuid) -> Result<Option<Review>> {
    Ok(self.read()?.reviews.get(&id).cloned())
  }

  async fn reviews_of(&self, assessment_id: Uuid) -> Result<Vec<Review>> {
    let inner = self.read()?;
    Ok(
      inner
        .reviews
        .values()
        .filter(|r| r.assessment == assessment_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_review(&self, record: Review) -> Result<()> {
    self.write()?.reviews.insert(record.review_id, record);
    Ok(())
  }

  async fn replace_review(&self, record: Review) -> Result<()> {
    let mut inner = self.write()?;
    if !inner.reviews.contains_key(&record.review_id) {
      return Err(Error::ReviewNotFound(record.review_id));
    }
    inner.reviews.insert(record.review_id, record);
    Ok(())
  }

  // ── Entries ───────────────────────────────────────────────────────────

  async fn criteria_entries_of(
    &self,
    assessment_id: Uuid,
  ) -> Result<Vec<CriteriaEntry>> {
    let inner = self.read()?;
    Ok(
      inner
        .criteria_entries
        .values()
        .filter(|e| e.assessment == assessment_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_criteria_entries(
    &self,
    records: Vec<CriteriaEntry>,
  ) -> Result<()> {
    let mut inner = self.write()?;
    for record in records {
      inner.criteria_entries.insert(record.entry_id, record);
    }
    Ok(())
  }

  async fn replace_criteria_entry(&self, record: CriteriaEntry) -> Result<()> {
    let mut inner = self.write()?;
    if !inner.criteria_entries.contains_key(&record.entry_id) {
      return Err(Error::CriteriaEntryNotFound(record.entry_id));
    }
    inner.criteria_entries.insert(record.entry_id, record);
    Ok(())
  }

  async fn review_entries_of(
    &self,
    review_id: Uuid,
  ) -> Result<Vec<ReviewEntry>> {
    let inner = self.read()?;
    Ok(
      inner
        .review_entries
        .values()
        .filter(|e| e.review == review_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_review_entries(
    &self,
    records: Vec<ReviewEntry>,
  ) -> Result<()> {
    let mut inner = self.write()?;
    for record in records {
      inner.review_entries.insert(record.entry_id, record);
    }
    Ok(())
  }

  // ── Workflow cache ────────────────────────────────────────────────────

  async fn workflow(&self, contrib_id: Uuid) -> Result<Option<ContribWorkflow>> {
    Ok(self.read()?.workflows.get(&contrib_id).cloned())
  }

  async fn workflows(
    &self,
    country: Option<Uuid>,
  ) -> Result<Vec<ContribWorkflow>> {
    let inner = self.read()?;
    Ok(
      inner
        .workflows
        .values()
        .filter(|w| country.is_none() || w.country == country)
        .cloned()
        .collect(),
    )
  }

  async fn put_workflow(&self, record: ContribWorkflow) -> Result<()> {
    self.write()?.workflows.insert(record.contrib_id, record);
    Ok(())
  }

  async fn put_workflow_many(
    &self,
    records: Vec<ContribWorkflow>,
  ) -> Result<()> {
    let mut inner = self.write()?;
    for record in records {
      inner.workflows.insert(record.contrib_id, record);
    }
    Ok(())
  }

  async fn delete_workflow(&self, contrib_id: Uuid) -> Result<()> {
    self.write()?.workflows.remove(&contrib_id);
    Ok(())
  }

  async fn clear_workflows(&self) -> Result<()> {
    self.write()?.workflows.clear();
    Ok(())
  }
}
