//! Canned value-table data.
//!
//! The decision and score scales are reference data the workflow engine
//! cannot run without; tests and the demo server load them from here
//! instead of each inventing their own.

use plenum_core::record::{
  Criterion, DecisionValue, DecisionVerb, ScoreValue,
};
use uuid::Uuid;

/// The three review decisions with their display participles.
pub fn decision_values() -> Vec<DecisionValue> {
  [
    (DecisionVerb::Accept, "accepted"),
    (DecisionVerb::Reject, "rejected"),
    (DecisionVerb::Revise, "sent back for revision"),
  ]
  .into_iter()
  .map(|(verb, participle)| DecisionValue {
    decision_id: Uuid::new_v4(),
    verb,
    participle: participle.to_string(),
  })
  .collect()
}

/// A criteria set for one contribution type: `n` criteria, each with a
/// 0..=4 scale plus a negative "not applicable" level.
pub fn criteria_set(
  contrib_type: Uuid,
  n: u32,
) -> (Vec<Criterion>, Vec<ScoreValue>) {
  let mut criteria = Vec::new();
  let mut scores = Vec::new();
  for seq in 0..n {
    let criterion_id = Uuid::new_v4();
    criteria.push(Criterion {
      criterion_id,
      contrib_type,
      seq,
      title: format!("criterion {seq}"),
    });
    for points in 0..=4 {
      scores.push(ScoreValue {
        score_id:  Uuid::new_v4(),
        criterion: Some(criterion_id),
        points:    Some(points),
        level:     format!("level {points}"),
      });
    }
    scores.push(ScoreValue {
      score_id:  Uuid::new_v4(),
      criterion: Some(criterion_id),
      points:    Some(-1),
      level:     "not applicable".to_string(),
    });
  }
  (criteria, scores)
}
