//! Raw record types — the contribution hierarchy and its value tables.
//!
//! These mirror the persisted documents one-to-one. All derived state
//! (stages, locks, scores) lives in the workflow crate; nothing here is
//! computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Selection ───────────────────────────────────────────────────────────────

/// The selection decision recorded on a contribution.
///
/// A three-way closed enum rather than `Option<bool>`: "no decision yet" and
/// "decision explicitly cleared" collapse to the same `Undecided` state, and
/// the stage derivation matches exhaustively on it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
  #[default]
  Undecided,
  Yes,
  No,
}

// ─── Contribution ────────────────────────────────────────────────────────────

/// The top-level submitted item being evaluated. Root of the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
  pub contrib_id:   Uuid,
  /// Server-assigned; orders siblings and never changes after creation.
  pub created_at:   DateTime<Utc>,
  pub creator:      Uuid,
  pub editors:      Vec<Uuid>,
  pub title:        String,
  /// Reference into the contribution-type value table. Changing it silently
  /// orphans all assessments of the old type.
  pub contrib_type: Option<Uuid>,
  pub country:      Option<Uuid>,
  pub selection:    Selection,
  pub date_decided: Option<DateTime<Utc>>,
}

// ─── Assessment ──────────────────────────────────────────────────────────────

/// A self-evaluation of a contribution against a fixed criteria set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
  pub assessment_id:   Uuid,
  pub created_at:      DateTime<Utc>,
  pub creator:         Uuid,
  pub editors:         Vec<Uuid>,
  /// Back-reference to the owning contribution.
  pub contrib:         Uuid,
  pub title:           String,
  /// Must equal the contribution's current type for the assessment to be
  /// the valid one.
  pub assessment_type: Option<Uuid>,
  pub submitted:       bool,
  pub date_submitted:  Option<DateTime<Utc>>,
  pub date_withdrawn:  Option<DateTime<Utc>>,
  pub reviewer_expert: Option<Uuid>,
  pub reviewer_final:  Option<Uuid>,
}

// ─── Review ──────────────────────────────────────────────────────────────────

/// An expert or final reviewer's judgment of an assessment.
///
/// The reviewer kind is not stored; it is inferred from `creator` matching
/// the assessment's `reviewer_expert` or `reviewer_final`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub review_id:    Uuid,
  pub created_at:   DateTime<Utc>,
  pub creator:      Uuid,
  pub editors:      Vec<Uuid>,
  /// Back-reference to the assessment under review.
  pub assessment:   Uuid,
  pub title:        String,
  pub review_type:  Option<Uuid>,
  /// Reference into the decision value table; `None` until decided.
  pub decision:     Option<Uuid>,
  pub date_decided: Option<DateTime<Utc>>,
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// A per-criterion score + evidence record nested under an assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaEntry {
  pub entry_id:   Uuid,
  pub created_at: DateTime<Utc>,
  pub creator:    Uuid,
  pub editors:    Vec<Uuid>,
  pub assessment: Uuid,
  pub seq:        u32,
  pub criterion:  Option<Uuid>,
  /// Reference into the score value table.
  pub score:      Option<Uuid>,
  pub evidence:   Option<String>,
}

impl CriteriaEntry {
  /// An entry is filled in when it has a score and non-blank evidence.
  pub fn is_filled(&self) -> bool {
    self.score.is_some()
      && self
        .evidence
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty())
  }
}

/// A reviewer's per-criterion comment record, mirroring a criteria entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
  pub entry_id:   Uuid,
  pub created_at: DateTime<Utc>,
  pub creator:    Uuid,
  pub editors:    Vec<Uuid>,
  pub review:     Uuid,
  pub assessment: Uuid,
  pub seq:        u32,
  pub criterion:  Option<Uuid>,
  pub comments:   Option<String>,
}

// ─── Value tables ────────────────────────────────────────────────────────────

/// One criterion applicable to a contribution type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criterion {
  pub criterion_id: Uuid,
  /// The contribution type this criterion applies to.
  pub contrib_type: Uuid,
  pub seq:          u32,
  pub title:        String,
}

/// One level on a criterion's scoring scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreValue {
  pub score_id:  Uuid,
  /// The criterion this level belongs to.
  pub criterion: Option<Uuid>,
  /// Negative points mean "not applicable": the entry is excluded from the
  /// relevant score sums. `None` means the level carries no points at all.
  pub points:    Option<i64>,
  pub level:     String,
}

/// The verb of a review decision.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DecisionVerb {
  Accept,
  Reject,
  Revise,
}

/// One entry of the decision value table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionValue {
  pub decision_id: Uuid,
  pub verb:        DecisionVerb,
  /// Past form for display, e.g. "Accepted".
  pub participle:  String,
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// A registered user. Role assignment itself happens outside this system;
/// the record is read-only here and feeds the permission predicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id: Uuid,
  pub name:    String,
  pub country: Option<Uuid>,
  pub role:    crate::actor::Role,
}

// ─── Provenance helper ───────────────────────────────────────────────────────

/// The set of users who own a record: its creator plus its editors,
/// deduplicated, in stable order.
pub fn creators(creator: Uuid, editors: &[Uuid]) -> Vec<Uuid> {
  let mut all = vec![creator];
  for e in editors {
    if !all.contains(e) {
      all.push(*e);
    }
  }
  all
}
