//! The command vocabulary: every lifecycle-changing action, with its target
//! table, reviewer kind, revocation delay class, and effect.
//!
//! Command names are part of the wire surface (they appear in task URLs),
//! so the enum serializes to the same camelCase strings everywhere.

use chrono::{DateTime, Duration, Utc};
use plenum_core::{
  record::{DecisionVerb, Selection},
  table::{ReviewKind, Table},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::refdata::EngineConfig;

// ─── Commands ────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Command {
  // contribution level
  SelectContrib,
  DeselectContrib,
  UnselectContrib,
  StartAssessment,
  // assessment level
  SubmitAssessment,
  ResubmitAssessment,
  SubmitRevised,
  WithdrawAssessment,
  StartReview,
  // review level
  ExpertReviewAccept,
  ExpertReviewReject,
  ExpertReviewRevise,
  ExpertReviewRevoke,
  FinalReviewAccept,
  FinalReviewReject,
  FinalReviewRevise,
  FinalReviewRevoke,
}

/// What executing a command does to the raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
  /// Insert a fresh assessment under the contribution.
  AddAssessment,
  /// Insert a fresh review under the assessment.
  AddReview,
  /// Write the contribution's selection field.
  SetSelection(Selection),
  /// Write the assessment's submitted flag.
  SetSubmitted(bool),
  /// Write the review's decision; `None` revokes it.
  SetDecision(Option<DecisionVerb>),
}

impl Command {
  /// The table a command addresses.
  pub fn table(self) -> Table {
    use Command::*;
    match self {
      SelectContrib | DeselectContrib | UnselectContrib | StartAssessment => {
        Table::Contrib
      }
      SubmitAssessment | ResubmitAssessment | SubmitRevised
      | WithdrawAssessment | StartReview => Table::Assessment,
      _ => Table::Review,
    }
  }

  /// The reviewer kind a review-level command is pinned to. `None` for
  /// commands whose kind, if any, comes from the acting user instead
  /// (`startReview`).
  pub fn kind(self) -> Option<ReviewKind> {
    use Command::*;
    match self {
      ExpertReviewAccept | ExpertReviewReject | ExpertReviewRevise
      | ExpertReviewRevoke => Some(ReviewKind::Expert),
      FinalReviewAccept | FinalReviewReject | FinalReviewRevise
      | FinalReviewRevoke => Some(ReviewKind::Final),
      _ => None,
    }
  }

  /// The revocation window the command grants, if any.
  ///
  /// Selection decisions, submission withdrawal, and final review decisions
  /// stay changeable within their windows. Expert decisions carry no
  /// window: they gate the final review rather than terminate anything, and
  /// revoking one is always possible until the subtree locks.
  pub fn delay(self, config: &EngineConfig) -> Option<Duration> {
    use Command::*;
    match self {
      SelectContrib | DeselectContrib | UnselectContrib => {
        Some(config.select_delay())
      }
      WithdrawAssessment => Some(config.assessment_delay()),
      FinalReviewAccept | FinalReviewReject | FinalReviewRevise
      | FinalReviewRevoke => Some(config.review_delay()),
      _ => None,
    }
  }

  pub fn effect(self) -> Effect {
    use Command::*;
    match self {
      SelectContrib => Effect::SetSelection(Selection::Yes),
      DeselectContrib => Effect::SetSelection(Selection::No),
      UnselectContrib => Effect::SetSelection(Selection::Undecided),
      StartAssessment => Effect::AddAssessment,
      SubmitAssessment | ResubmitAssessment | SubmitRevised => {
        Effect::SetSubmitted(true)
      }
      WithdrawAssessment => Effect::SetSubmitted(false),
      StartReview => Effect::AddReview,
      ExpertReviewAccept | FinalReviewAccept => {
        Effect::SetDecision(Some(DecisionVerb::Accept))
      }
      ExpertReviewReject | FinalReviewReject => {
        Effect::SetDecision(Some(DecisionVerb::Reject))
      }
      ExpertReviewRevise | FinalReviewRevise => {
        Effect::SetDecision(Some(DecisionVerb::Revise))
      }
      ExpertReviewRevoke | FinalReviewRevoke => Effect::SetDecision(None),
    }
  }
}

// ─── Permits ─────────────────────────────────────────────────────────────────

/// The answer of a permission check.
///
/// Denial is a value, not an error: "not permitted" is a correct terminal
/// response, and no distinction is made between refusal by role and refusal
/// by business rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Permit {
  Denied,
  Allowed {
    /// End of the revocation window, when the permit rests on one.
    until: Option<DateTime<Utc>>,
  },
}

impl Permit {
  pub fn allowed(self) -> bool {
    matches!(self, Permit::Allowed { .. })
  }

  pub(crate) fn plain(allowed: bool) -> Self {
    if allowed { Permit::Allowed { until: None } } else { Permit::Denied }
  }
}

/// The result of executing (or refusing) a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
  pub ok:      bool,
  pub message: String,
}

impl CommandOutcome {
  pub fn denied() -> Self {
    Self { ok: false, message: "command not permitted".into() }
  }

  pub fn done(message: impl Into<String>) -> Self {
    Self { ok: true, message: message.into() }
  }
}

/// End of the window opened by `stage_date`, if the window is still open
/// at `now`.
pub(crate) fn window_until(
  stage_date: Option<DateTime<Utc>>,
  delay: Option<Duration>,
  now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
  let until = stage_date? + delay?;
  (until > now).then_some(until)
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use strum::IntoEnumIterator;

  use super::*;

  #[test]
  fn names_round_trip_as_camel_case() {
    assert_eq!(Command::SelectContrib.to_string(), "selectContrib");
    assert_eq!(
      Command::ExpertReviewRevoke.to_string(),
      "expertReviewRevoke"
    );
    for command in Command::iter() {
      assert_eq!(Command::from_str(&command.to_string()), Ok(command));
    }
    assert!(Command::from_str("dropTables").is_err());
  }

  #[test]
  fn review_commands_are_pinned_to_their_kind() {
    for command in Command::iter() {
      match command.table() {
        Table::Review => assert!(command.kind().is_some()),
        _ => assert!(command.kind().is_none()),
      }
    }
  }

  #[test]
  fn window_closes_exactly_at_the_delay() {
    let decided = Utc::now();
    let delay = Some(Duration::hours(48));

    let open = window_until(Some(decided), delay, decided + Duration::hours(47));
    assert_eq!(open, Some(decided + Duration::hours(48)));
    assert!(
      window_until(Some(decided), delay, decided + Duration::hours(49))
        .is_none()
    );
    assert!(window_until(None, delay, decided).is_none());
    assert!(window_until(Some(decided), None, decided).is_none());
  }
}
