//! The workflow engine: computes derived records from raw records, keeps
//! the per-contribution cache fresh, and executes permitted commands.
//!
//! A recompute always reads the persisted records as they are at that
//! moment and replaces the cached record wholesale. Two concurrent writes
//! to the same contribution therefore race benignly: the recompute that
//! finishes last wins, and it derived from a state at least as new as the
//! other's. There is no per-contribution lock.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use plenum_core::{
  actor::Actor,
  record::{Assessment, CriteriaEntry, Review, ReviewEntry, Selection},
  store::RecordStore,
  table::{ReviewKind, Table},
  workflow::{ContribStage, ContribWorkflow, PerKind},
};
use serde::Serialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
  aggregate::ContribBundle,
  clock::Clock,
  command::{Command, CommandOutcome, Effect},
  error::{Error, Result},
  item::WorkflowItem,
  refdata::{EngineConfig, RefData},
  stage::resolve_contrib,
};

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct Workflow<S> {
  store:    Arc<S>,
  ref_data: RefData,
  config:   EngineConfig,
  clock:    Arc<dyn Clock>,
}

impl<S: RecordStore> Workflow<S> {
  /// Build an engine over `store`, reading the value tables once.
  pub async fn new(
    store: Arc<S>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
  ) -> Result<Self> {
    let ref_data = RefData::load(store.as_ref()).await?;
    Ok(Self { store, ref_data, config, clock })
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  pub fn config(&self) -> &EngineConfig {
    &self.config
  }

  /// Recompute every contribution and rebuild the cache from scratch.
  #[instrument(skip(self))]
  pub async fn init_all(&self) -> Result<usize> {
    let contributions =
      self.store.contribs(None).await.map_err(Error::store)?;
    let mut records = Vec::with_capacity(contributions.len());
    for contribution in contributions {
      let bundle =
        ContribBundle::fetch_details(self.store.as_ref(), contribution)
          .await?;
      records.push(resolve_contrib(&bundle, &self.ref_data));
    }
    let n = records.len();
    self.store.clear_workflows().await.map_err(Error::store)?;
    self
      .store
      .put_workflow_many(records)
      .await
      .map_err(Error::store)?;
    info!(count = n, "workflow cache rebuilt");
    Ok(n)
  }

  /// Derive the workflow record of one contribution from its current raw
  /// records and replace the cached copy.
  ///
  /// A failed recompute means the cache may be stale; callers must surface
  /// the error rather than serve the old record as fresh.
  #[instrument(skip(self))]
  pub async fn recompute(&self, contrib_id: Uuid) -> Result<ContribWorkflow> {
    let bundle = ContribBundle::fetch(self.store.as_ref(), contrib_id)
      .await?
      .ok_or(Error::ContribNotFound(contrib_id))?;
    let record = resolve_contrib(&bundle, &self.ref_data);
    self
      .store
      .put_workflow(record.clone())
      .await
      .map_err(Error::store)?;
    debug!(stage = %record.stage, "workflow recomputed");
    Ok(record)
  }

  /// Drop the cached record of a deleted contribution.
  pub async fn forget(&self, contrib_id: Uuid) -> Result<()> {
    self
      .store
      .delete_workflow(contrib_id)
      .await
      .map_err(Error::store)
  }

  /// The cached workflow record, recomputing on a cache miss.
  pub async fn workflow(&self, contrib_id: Uuid) -> Result<ContribWorkflow> {
    match self.store.workflow(contrib_id).await.map_err(Error::store)? {
      Some(record) => Ok(record),
      None => self.recompute(contrib_id).await,
    }
  }

  /// A facade over `record` for `actor`, pinned to the current instant.
  pub fn item_for<'a>(
    &'a self,
    record: &'a ContribWorkflow,
    actor: &'a Actor,
  ) -> WorkflowItem<'a> {
    WorkflowItem::new(record, actor, &self.config, self.clock.now())
  }

  /// Overview rows for all contributions, optionally limited to a country.
  pub async fn overview(
    &self,
    country: Option<Uuid>,
  ) -> Result<Vec<StatusRow>> {
    let mut records =
      self.store.workflows(country).await.map_err(Error::store)?;
    records.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(records.iter().map(StatusRow::from).collect())
  }

  // ─── Command execution ─────────────────────────────────────────────────────

  /// Execute `command` against the record identified by `record_id` in the
  /// command's table, on behalf of `actor`.
  ///
  /// Refusal is an `ok: false` outcome, never an error; errors are reserved
  /// for store failures and dangling references.
  #[instrument(skip(self, actor), fields(user = ?actor.user))]
  pub async fn do_command(
    &self,
    command: Command,
    record_id: Uuid,
    actor: &Actor,
  ) -> Result<CommandOutcome> {
    let contrib_id = self.contrib_of(command.table(), record_id).await?;
    let record = self.workflow(contrib_id).await?;
    let item = self.item_for(&record, actor);

    // Review commands must target the valid review of their own kind, not
    // just any valid review.
    let valid_target = match command.kind() {
      Some(kind) => {
        record.review(kind).is_some_and(|r| r.review_id == record_id)
      }
      None => item.is_valid(command.table(), record_id),
    };
    if !valid_target || !item.permission(command).allowed() {
      debug!(%command, "command refused");
      return Ok(CommandOutcome::denied());
    }
    let my_kind = item.my_reviewer_kind();

    // permission() only passes authenticated actors.
    let Some(acting_user) = actor.user else {
      return Ok(CommandOutcome::denied());
    };

    let now = self.clock.now();
    let message = match command.effect() {
      Effect::SetSelection(selection) => {
        let mut contribution = self
          .store
          .contrib(contrib_id)
          .await
          .map_err(Error::store)?
          .ok_or(Error::ContribNotFound(contrib_id))?;
        contribution.selection = selection;
        // Revoking a selection clears the decision date as well.
        contribution.date_decided =
          (selection != Selection::Undecided).then_some(now);
        self
          .store
          .replace_contrib(contribution)
          .await
          .map_err(Error::store)?;
        match selection {
          Selection::Yes => "contribution selected".to_string(),
          Selection::No => "contribution deselected".to_string(),
          Selection::Undecided => "selection revoked".to_string(),
        }
      }
      Effect::SetSubmitted(submitted) => {
        let mut assessment = self.assessment(record_id).await?;
        assessment.submitted = submitted;
        if submitted {
          assessment.date_submitted = Some(now);
          assessment.date_withdrawn = None;
        } else {
          assessment.date_withdrawn = Some(now);
        }
        self
          .store
          .replace_assessment(assessment)
          .await
          .map_err(Error::store)?;
        if submitted {
          "assessment submitted".to_string()
        } else {
          "assessment withdrawn".to_string()
        }
      }
      Effect::SetDecision(verb) => {
        let mut review = self.review(record_id).await?;
        review.decision = match verb {
          Some(verb) => Some(
            self
              .ref_data
              .decision_ids
              .get(&verb)
              .copied()
              .ok_or(Error::MissingDecisionValue(verb))?,
          ),
          None => None,
        };
        review.date_decided = verb.is_some().then_some(now);
        self
          .store
          .replace_review(review)
          .await
          .map_err(Error::store)?;
        match verb {
          Some(verb) => {
            let participle = self
              .ref_data
              .decision_ids
              .get(&verb)
              .and_then(|id| self.ref_data.participles.get(id))
              .cloned()
              .unwrap_or_else(|| "decided".to_string());
            format!("review {participle}")
          }
          None => "review decision revoked".to_string(),
        }
      }
      Effect::AddAssessment => {
        self.start_assessment(&record, acting_user, now).await?;
        "assessment started".to_string()
      }
      Effect::AddReview => {
        let Some(kind) = my_kind else {
          return Ok(CommandOutcome::denied());
        };
        self.start_review(record_id, acting_user, kind, now).await?;
        "review started".to_string()
      }
    };

    self.recompute(contrib_id).await?;
    info!(%command, "command executed");
    Ok(CommandOutcome::done(message))
  }

  /// Insert a fresh assessment plus one blank criteria entry per criterion
  /// of the contribution's type.
  async fn start_assessment(
    &self,
    record: &ContribWorkflow,
    creator: Uuid,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let assessment_id = Uuid::new_v4();
    let assessment = Assessment {
      assessment_id,
      created_at: now,
      creator,
      editors: vec![],
      contrib: record.contrib_id,
      title: format!("assessment of {}", record.title),
      assessment_type: record.contrib_type,
      submitted: false,
      date_submitted: None,
      date_withdrawn: None,
      reviewer_expert: None,
      reviewer_final: None,
    };
    self
      .store
      .insert_assessment(assessment)
      .await
      .map_err(Error::store)?;

    let entries: Vec<CriteriaEntry> = self
      .ref_data
      .criteria_of(record.contrib_type)
      .iter()
      .map(|criterion| CriteriaEntry {
        entry_id:   Uuid::new_v4(),
        created_at: now,
        creator,
        editors:    vec![],
        assessment: assessment_id,
        seq:        criterion.seq,
        criterion:  Some(criterion.criterion_id),
        score:      None,
        evidence:   None,
      })
      .collect();
    self
      .store
      .insert_criteria_entries(entries)
      .await
      .map_err(Error::store)
  }

  /// Insert a fresh review plus one blank review entry per criteria entry
  /// of the assessment.
  async fn start_review(
    &self,
    assessment_id: Uuid,
    creator: Uuid,
    kind: ReviewKind,
    now: DateTime<Utc>,
  ) -> Result<()> {
    let assessment = self.assessment(assessment_id).await?;
    let review_id = Uuid::new_v4();
    let review = Review {
      review_id,
      created_at: now,
      creator,
      editors: vec![],
      assessment: assessment_id,
      title: format!("{kind} review of {}", assessment.title),
      review_type: assessment.assessment_type,
      decision: None,
      date_decided: None,
    };
    self.store.insert_review(review).await.map_err(Error::store)?;

    let criteria_entries = self
      .store
      .criteria_entries_of(assessment_id)
      .await
      .map_err(Error::store)?;
    let entries: Vec<ReviewEntry> = criteria_entries
      .iter()
      .map(|entry| ReviewEntry {
        entry_id:   Uuid::new_v4(),
        created_at: now,
        creator,
        editors:    vec![],
        review:     review_id,
        assessment: assessment_id,
        seq:        entry.seq,
        criterion:  entry.criterion,
        comments:   None,
      })
      .collect();
    self
      .store
      .insert_review_entries(entries)
      .await
      .map_err(Error::store)
  }

  // ─── Reference resolution ──────────────────────────────────────────────────

  /// Walk a record id up to its owning contribution.
  async fn contrib_of(&self, table: Table, record_id: Uuid) -> Result<Uuid> {
    match table.level() {
      Table::Contrib => Ok(record_id),
      Table::Assessment => Ok(self.assessment(record_id).await?.contrib),
      Table::Review => {
        let review = self.review(record_id).await?;
        Ok(self.assessment(review.assessment).await?.contrib)
      }
      _ => Err(Error::UnknownTable(table.to_string())),
    }
  }

  async fn assessment(&self, id: Uuid) -> Result<Assessment> {
    self
      .store
      .assessment(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::AssessmentNotFound(id))
  }

  async fn review(&self, id: Uuid) -> Result<Review> {
    self
      .store
      .review(id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ReviewNotFound(id))
  }
}

// ─── Overview rows ───────────────────────────────────────────────────────────

/// One row of the contributions overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRow {
  pub contrib_id: Uuid,
  pub title:      String,
  pub country:    Option<Uuid>,
  pub stage:      ContribStage,
  pub frozen:     bool,
  pub locked:     bool,
  /// Overall score of the valid assessment, if one exists.
  pub score:      Option<i64>,
  /// Reviewer assignments of the valid assessment, if one exists.
  pub reviewers:  Option<PerKind<Option<Uuid>>>,
}

impl From<&ContribWorkflow> for StatusRow {
  fn from(record: &ContribWorkflow) -> Self {
    Self {
      contrib_id: record.contrib_id,
      title:      record.title.clone(),
      country:    record.country,
      stage:      record.stage,
      frozen:     record.frozen,
      locked:     record.locked,
      score:      record.score().map(|s| s.overall),
      reviewers:  record.assessment.as_ref().map(|a| a.reviewers.clone()),
    }
  }
}
