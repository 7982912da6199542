//! Read-only facade over one derived workflow record, bound to an acting
//! user and an instant in time.
//!
//! All permission questions are answered here, against the derived record
//! alone: no store access, no clock reads. The engine constructs an item
//! per request and the web layer only ever talks to the item.

use chrono::{DateTime, Utc};
use plenum_core::{
  actor::Actor,
  table::{ReviewKind, Table},
  workflow::{
    AssessmentStage, AssessmentWorkflow, ContribStage, ContribWorkflow,
    ReviewStage, ReviewWorkflow, Stage,
  },
};
use uuid::Uuid;

use crate::{
  command::{Command, Permit, window_until},
  refdata::EngineConfig,
};

/// Reviewer assignment fields on an assessment, which the office may change
/// even while the record is otherwise immutable.
const REVIEWER_FIELDS: [&str; 2] = ["reviewerExpert", "reviewerFinal"];

pub struct WorkflowItem<'a> {
  data:   &'a ContribWorkflow,
  actor:  &'a Actor,
  config: &'a EngineConfig,
  now:    DateTime<Utc>,
}

impl<'a> WorkflowItem<'a> {
  pub fn new(
    data: &'a ContribWorkflow,
    actor: &'a Actor,
    config: &'a EngineConfig,
    now: DateTime<Utc>,
  ) -> Self {
    Self { data, actor, config, now }
  }

  pub fn data(&self) -> &ContribWorkflow {
    self.data
  }

  fn assessment(&self) -> Option<&AssessmentWorkflow> {
    self.data.assessment.as_ref()
  }

  /// The reviewer kind the acting user is assigned as, if any.
  pub fn my_reviewer_kind(&self) -> Option<ReviewKind> {
    let user = self.actor.user?;
    let assessment = self.assessment()?;
    ReviewKind::ALL
      .into_iter()
      .find(|&kind| *assessment.reviewers.get(kind) == Some(user))
  }

  fn is_contrib_creator(&self) -> bool {
    self
      .actor
      .user
      .is_some_and(|u| self.data.creators.contains(&u))
  }

  fn is_assessment_creator(&self) -> bool {
    match (self.actor.user, self.assessment()) {
      (Some(u), Some(a)) => a.creators.contains(&u),
      _ => false,
    }
  }

  // ─── Queries ───────────────────────────────────────────────────────────────

  /// The current stage at a level, when one is recorded.
  pub fn stage(&self, table: Table, kind: Option<ReviewKind>) -> Option<Stage> {
    match table.level() {
      Table::Contrib => Some(Stage::Contrib(self.data.stage)),
      Table::Assessment => {
        self.assessment().map(|a| Stage::Assessment(a.stage))
      }
      Table::Review => {
        let review = self.data.review(kind?)?;
        review.stage.map(Stage::Review)
      }
      _ => None,
    }
  }

  /// Projected field reads at one level of the derived record, for
  /// callers that render a subset of it.
  ///
  /// Unknown fields are simply absent from the result; an empty `fields`
  /// list returns the whole level.
  pub fn info(
    &self,
    table: Table,
    kind: Option<ReviewKind>,
    fields: &[&str],
  ) -> serde_json::Map<String, serde_json::Value> {
    let snapshot = match table.level() {
      Table::Contrib => serde_json::to_value(self.data).ok(),
      Table::Assessment => {
        self.assessment().and_then(|a| serde_json::to_value(a).ok())
      }
      Table::Review => kind
        .and_then(|k| self.data.review(k))
        .and_then(|r| serde_json::to_value(r).ok()),
      _ => None,
    };
    let Some(serde_json::Value::Object(mut all)) = snapshot else {
      return serde_json::Map::new();
    };
    if fields.is_empty() {
      return all;
    }
    let mut picked = serde_json::Map::new();
    for field in fields {
      if let Some(value) = all.remove(*field) {
        picked.insert((*field).to_string(), value);
      }
    }
    picked
  }

  /// Whether `record_id` is the record currently considered valid at its
  /// level. Superseded and orphaned records answer `false`.
  pub fn is_valid(&self, table: Table, record_id: Uuid) -> bool {
    match table.level() {
      Table::Contrib => record_id == self.data.contrib_id,
      Table::Assessment => {
        self.assessment().is_some_and(|a| a.assessment_id == record_id)
      }
      Table::Review => ReviewKind::ALL.into_iter().any(|kind| {
        self
          .data
          .review(kind)
          .is_some_and(|r| r.review_id == record_id)
      }),
      _ => false,
    }
  }

  /// Whether a record (or one field of it) is immutable for this actor in
  /// the current state.
  ///
  /// The office may reassign reviewers at any time, including on locked
  /// assessments; everything else obeys the frozen/locked flags.
  pub fn check_fixed(
    &self,
    table: Table,
    kind: Option<ReviewKind>,
    field: Option<&str>,
  ) -> bool {
    let level = table.level();
    if level == Table::Assessment
      && field.is_some_and(|f| REVIEWER_FIELDS.contains(&f))
      && self.actor.is_office()
    {
      return false;
    }
    match level {
      Table::Contrib => self.data.frozen || self.data.locked,
      Table::Assessment => {
        self.assessment().is_none_or(|a| a.frozen || a.locked)
      }
      Table::Review => match kind.and_then(|k| self.data.review(k)) {
        Some(review) => review.frozen || review.locked,
        None => true,
      },
      _ => true,
    }
  }

  // ─── Permission ────────────────────────────────────────────────────────────

  /// Decide whether the acting user may run `command` against this record,
  /// now.
  ///
  /// A denial carries no reason. Elevated rules: country coordinators (and
  /// office) decide selections; the system role may act past an expired
  /// revocation window.
  pub fn permission(&self, command: Command) -> Permit {
    if !self.actor.is_authenticated() {
      return Permit::Denied;
    }
    match command.table() {
      Table::Contrib => self.contrib_permission(command),
      Table::Assessment => self.assessment_permission(command),
      Table::Review => self.review_permission(command),
      _ => Permit::Denied,
    }
  }

  fn contrib_permission(&self, command: Command) -> Permit {
    let wf = self.data;

    if command == Command::StartAssessment {
      return Permit::plain(self.is_contrib_creator() && wf.may_add);
    }

    // Selection decisions belong to the national coordinator (or office).
    if !self.actor.coordinates(wf.country) {
      return Permit::Denied;
    }

    let blocked_at = match command {
      Command::SelectContrib => ContribStage::SelectYes,
      Command::DeselectContrib => ContribStage::SelectNo,
      Command::UnselectContrib => ContribStage::SelectNone,
      _ => return Permit::Denied,
    };
    if wf.stage == blocked_at {
      return Permit::Denied;
    }

    self.timed_permit(wf.frozen, wf.stage_date, command)
  }

  fn assessment_permission(&self, command: Command) -> Permit {
    let Some(assessment) = self.assessment() else {
      return Permit::Denied;
    };
    if assessment.frozen || assessment.decided() {
      return Permit::Denied;
    }

    if command == Command::StartReview {
      let Some(kind) = self.my_reviewer_kind() else {
        return Permit::Denied;
      };
      return Permit::plain(*assessment.may_add.get(kind));
    }

    if !self.is_assessment_creator() {
      return Permit::Denied;
    }

    let stage_ok = match command {
      Command::SubmitAssessment => {
        assessment.stage == AssessmentStage::Complete
      }
      Command::ResubmitAssessment => {
        assessment.stage == AssessmentStage::CompleteWithdrawn
      }
      Command::SubmitRevised => {
        assessment.stage == AssessmentStage::CompleteRevised
      }
      Command::WithdrawAssessment => matches!(
        assessment.stage,
        AssessmentStage::Submitted | AssessmentStage::SubmittedRevised
      ),
      _ => return Permit::Denied,
    };
    if !stage_ok {
      return Permit::Denied;
    }

    self.timed_permit(assessment.locked, assessment.stage_date, command)
  }

  fn review_permission(&self, command: Command) -> Permit {
    let Some(assessment) = self.assessment() else {
      return Permit::Denied;
    };
    if assessment.frozen {
      return Permit::Denied;
    }
    // Command::kind() is total on review commands.
    let Some(kind) = command.kind() else {
      return Permit::Denied;
    };
    let Some(review) = self.data.review(kind) else {
      return Permit::Denied;
    };

    // Only the assigned reviewer of that kind decides; the system role may
    // intervene (e.g. to revoke a stale decision on someone's behalf).
    let is_reviewer = self.my_reviewer_kind() == Some(kind);
    if !is_reviewer && !self.actor.is_system() {
      return Permit::Denied;
    }

    if !self.review_stage_guard(command, review) {
      return Permit::Denied;
    }

    self.timed_permit(review.locked, review.stage_date, command)
  }

  fn review_stage_guard(&self, command: Command, review: &ReviewWorkflow) -> bool {
    let target = match command {
      Command::ExpertReviewRevoke | Command::FinalReviewRevoke => {
        // Revoking requires a recorded decision.
        return review.stage.is_some();
      }
      Command::FinalReviewAccept => Some(ReviewStage::ReviewAccept),
      Command::FinalReviewReject => Some(ReviewStage::ReviewReject),
      Command::FinalReviewRevise => Some(ReviewStage::ReviewRevise),
      // The expert stage does not record the verb, so an expert may switch
      // verbs freely until the subtree locks.
      _ => None,
    };
    match target {
      Some(target) => review.stage != Some(target),
      None => true,
    }
  }

  /// The shared frozen/locked gate: permitted while not yet frozen/locked,
  /// or while the command's revocation window is still open, or for the
  /// system role regardless.
  fn timed_permit(
    &self,
    blocked: bool,
    stage_date: Option<DateTime<Utc>>,
    command: Command,
  ) -> Permit {
    if !blocked {
      return Permit::Allowed { until: None };
    }
    if let Some(until) =
      window_until(stage_date, command.delay(self.config), self.now)
    {
      return Permit::Allowed { until: Some(until) };
    }
    Permit::plain(self.actor.is_system())
  }
}
