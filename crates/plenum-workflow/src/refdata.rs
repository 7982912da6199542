//! Engine configuration and per-process reference data.
//!
//! The original system kept value-table lookups in process-wide mutable
//! caches keyed by table name. Here they are loaded once into an explicit
//! [`RefData`] context that is passed to whoever needs it; nothing is
//! global.

use std::collections::HashMap;

use chrono::Duration;
use plenum_core::{
  record::{Criterion, DecisionVerb},
  store::RecordStore,
};
use uuid::Uuid;

use crate::error::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Engine tunables: the revocation windows, in hours.
///
/// Within the window after a decision, the decision may still be changed or
/// revoked even though the record's nominal stage says frozen/locked.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
  /// Window after a selection decision on a contribution.
  pub select_delay_hours:     i64,
  /// Window after submitting an assessment (withdrawal window).
  pub assessment_delay_hours: i64,
  /// Window after a final review decision.
  pub review_delay_hours:     i64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      select_delay_hours:     48,
      assessment_delay_hours: 48,
      review_delay_hours:     48,
    }
  }
}

impl EngineConfig {
  pub fn select_delay(&self) -> Duration {
    Duration::hours(self.select_delay_hours)
  }

  pub fn assessment_delay(&self) -> Duration {
    Duration::hours(self.assessment_delay_hours)
  }

  pub fn review_delay(&self) -> Duration {
    Duration::hours(self.review_delay_hours)
  }
}

// ─── Reference data ──────────────────────────────────────────────────────────

/// Value-table lookups needed many times per derivation, read once per
/// process.
#[derive(Debug, Clone, Default)]
pub struct RefData {
  /// Decision id → decision verb.
  pub decisions:        HashMap<Uuid, DecisionVerb>,
  /// Decision id → past form, for outcome messages.
  pub participles:      HashMap<Uuid, String>,
  /// Decision verb → the decision id the set-effects write.
  pub decision_ids:     HashMap<DecisionVerb, Uuid>,
  /// Score id → points. Absent for score levels without points.
  pub points:           HashMap<Uuid, i64>,
  /// Criterion id → the maximum points any of its levels carries.
  pub max_by_criterion: HashMap<Uuid, i64>,
  /// Contribution type → its applicable criteria, in sequence order.
  pub criteria_by_type: HashMap<Uuid, Vec<Criterion>>,
}

impl RefData {
  pub async fn load<S: RecordStore>(store: &S) -> Result<Self> {
    let mut data = RefData::default();

    for d in store.decision_values().await.map_err(Error::store)? {
      data.decisions.insert(d.decision_id, d.verb);
      data.participles.insert(d.decision_id, d.participle);
      data.decision_ids.entry(d.verb).or_insert(d.decision_id);
    }

    for s in store.score_values().await.map_err(Error::store)? {
      let Some(points) = s.points else { continue };
      data.points.insert(s.score_id, points);
      if let Some(criterion) = s.criterion {
        let max = data.max_by_criterion.entry(criterion).or_insert(points);
        if points > *max {
          *max = points;
        }
      }
    }

    let mut criteria = store.criteria().await.map_err(Error::store)?;
    criteria.sort_by_key(|c| c.seq);
    for c in criteria {
      data.criteria_by_type.entry(c.contrib_type).or_default().push(c);
    }

    Ok(data)
  }

  /// The criteria applicable to `contrib_type`, in sequence order.
  pub fn criteria_of(&self, contrib_type: Option<Uuid>) -> &[Criterion] {
    contrib_type
      .and_then(|t| self.criteria_by_type.get(&t))
      .map_or(&[], Vec::as_slice)
  }

  /// How many criteria entries an assessment of `contrib_type` must fill.
  pub fn required_criteria(&self, contrib_type: Option<Uuid>) -> usize {
    self.criteria_of(contrib_type).len()
  }
}
