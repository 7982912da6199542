//! Score calculation: a weighted percentage over the criteria entries of an
//! assessment, with the full breakdown so a derivation can be shown.

use plenum_core::{record::CriteriaEntry, workflow::ScoreBreakdown};

use crate::refdata::RefData;

/// The resolved points of one criteria entry.
///
/// Distinguishes "no score chosen yet" from "a level that marks the
/// criterion not applicable" — the original collapsed both onto sentinel
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsOutcome {
  /// No score reference, or the reference resolves to nothing.
  /// Counts as zero points and is still relevant.
  Undecided,
  /// The chosen level carries negative points: the criterion does not
  /// apply. Excluded from the relevant sums, still counted overall.
  NotApplicable,
  Decided(i64),
}

pub fn resolve_points(entry: &CriteriaEntry, ref_data: &RefData) -> PointsOutcome {
  let Some(points) =
    entry.score.and_then(|s| ref_data.points.get(&s).copied())
  else {
    return PointsOutcome::Undecided;
  };
  if points < 0 {
    PointsOutcome::NotApplicable
  } else {
    PointsOutcome::Decided(points)
  }
}

/// Compute the score breakdown over `entries`.
///
/// `overall = round(relevant_score * 100 / relevant_max)`, rounding half
/// away from zero; 0 when the relevant maximum is 0.
pub fn compute_score<'a>(
  entries: impl IntoIterator<Item = &'a CriteriaEntry>,
  ref_data: &RefData,
) -> ScoreBreakdown {
  let mut breakdown = ScoreBreakdown::default();

  for entry in entries {
    let max = entry
      .criterion
      .and_then(|c| ref_data.max_by_criterion.get(&c).copied())
      .unwrap_or(0);

    breakdown.all_n += 1;
    breakdown.all_max += max;

    let points = match resolve_points(entry, ref_data) {
      PointsOutcome::NotApplicable => continue,
      PointsOutcome::Undecided => 0,
      PointsOutcome::Decided(p) => p,
    };
    breakdown.relevant_n += 1;
    breakdown.relevant_max += max;
    breakdown.relevant_score += points;
  }

  breakdown.overall = if breakdown.relevant_max == 0 {
    0
  } else {
    (breakdown.relevant_score as f64 * 100.0 / breakdown.relevant_max as f64)
      .round() as i64
  };
  breakdown
}
