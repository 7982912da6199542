//! Derived workflow records — the computed read model, cached per contribution.
//!
//! A [`ContribWorkflow`] is never edited in place: it is computed from the
//! raw records by the workflow engine and replaced wholesale on every
//! recompute. It shares its id with the contribution it describes and has no
//! independent identity lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::table::ReviewKind;

// ─── Stages ──────────────────────────────────────────────────────────────────

/// Lifecycle stage of a contribution: a pure function of its selection field.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ContribStage {
  SelectNone,
  SelectYes,
  SelectNo,
}

/// Lifecycle stage of an assessment.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum AssessmentStage {
  Incomplete,
  Complete,
  Submitted,
  IncompleteWithdrawn,
  CompleteWithdrawn,
  IncompleteRevised,
  CompleteRevised,
  SubmittedRevised,
}

/// Lifecycle stage of a review.
///
/// An expert review only ever reaches `ReviewExpert`: its decision gates the
/// final review but carries no accept/reject semantics of its own.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ReviewStage {
  ReviewExpert,
  ReviewAccept,
  ReviewReject,
  ReviewRevise,
}

/// A stage at any level, for callers that address levels uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stage {
  Contrib(ContribStage),
  Assessment(AssessmentStage),
  Review(ReviewStage),
}

impl std::fmt::Display for Stage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Contrib(s) => s.fmt(f),
      Self::Assessment(s) => s.fmt(f),
      Self::Review(s) => s.fmt(f),
    }
  }
}

// ─── PerKind ─────────────────────────────────────────────────────────────────

/// A fixed pair of values addressed by [`ReviewKind`].
///
/// Replaces the kind-keyed dicts of the original system; both slots always
/// exist, so lookups cannot miss.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerKind<T> {
  pub expert:  T,
  pub r#final: T,
}

impl<T> PerKind<T> {
  pub fn new(expert: T, r#final: T) -> Self {
    Self { expert, r#final }
  }

  pub fn get(&self, kind: ReviewKind) -> &T {
    match kind {
      ReviewKind::Expert => &self.expert,
      ReviewKind::Final => &self.r#final,
    }
  }

  pub fn get_mut(&mut self, kind: ReviewKind) -> &mut T {
    match kind {
      ReviewKind::Expert => &mut self.expert,
      ReviewKind::Final => &mut self.r#final,
    }
  }
}

// ─── Score breakdown ─────────────────────────────────────────────────────────

/// The weighted percentage score of an assessment, with the quantities
/// needed to show its derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
  /// `round(relevant_score * 100 / relevant_max)`, or 0 when nothing is
  /// relevant.
  pub overall:        i64,
  pub relevant_score: i64,
  pub relevant_max:   i64,
  pub relevant_n:     usize,
  pub all_max:        i64,
  pub all_n:          usize,
}

// ─── Workflow records ────────────────────────────────────────────────────────

/// Derived state of one review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewWorkflow {
  pub review_id:  Uuid,
  pub creators:   Vec<Uuid>,
  pub title:      String,
  pub kind:       ReviewKind,
  /// `None` until a decision is recorded.
  pub stage:      Option<ReviewStage>,
  pub stage_date: Option<DateTime<Utc>>,
  pub frozen:     bool,
  pub locked:     bool,
}

/// Derived state of the valid assessment of a contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentWorkflow {
  pub assessment_id: Uuid,
  pub creators:      Vec<Uuid>,
  pub title:         String,
  pub reviewers:     PerKind<Option<Uuid>>,
  pub score:         ScoreBreakdown,
  pub stage:         AssessmentStage,
  pub stage_date:    Option<DateTime<Utc>>,
  pub frozen:        bool,
  pub locked:        bool,
  /// Per kind: may a review of that kind still be started?
  pub may_add:       PerKind<bool>,
  /// The valid review per kind, if any.
  pub reviews:       PerKind<Option<ReviewWorkflow>>,
}

impl AssessmentWorkflow {
  /// Whether a final decision other than "revise" has been recorded.
  /// Such a decision locks the whole subtree (the `rLocked` condition).
  pub fn decided(&self) -> bool {
    self
      .reviews
      .get(ReviewKind::Final)
      .as_ref()
      .and_then(|r| r.stage)
      .is_some_and(|s| s != ReviewStage::ReviewRevise)
  }
}

/// The cached derived state of one contribution — id equals the
/// contribution's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContribWorkflow {
  pub contrib_id:   Uuid,
  pub creators:     Vec<Uuid>,
  pub country:      Option<Uuid>,
  pub contrib_type: Option<Uuid>,
  pub title:        String,
  pub stage:        ContribStage,
  pub stage_date:   Option<DateTime<Utc>>,
  /// A selection decision has been recorded.
  pub frozen:       bool,
  /// Inherited from the valid assessment's locked flag.
  pub locked:       bool,
  /// May the owner start a new assessment?
  pub may_add:      bool,
  /// Non-empty iff a valid assessment exists for the current type.
  pub assessment:   Option<AssessmentWorkflow>,
}

impl ContribWorkflow {
  pub fn review(&self, kind: ReviewKind) -> Option<&ReviewWorkflow> {
    self.assessment.as_ref()?.reviews.get(kind).as_ref()
  }

  /// The score of the valid assessment, for overview pages.
  pub fn score(&self) -> Option<&ScoreBreakdown> {
    self.assessment.as_ref().map(|a| &a.score)
  }
}
