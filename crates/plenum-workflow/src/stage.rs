//! The stage resolvers: pure functions from raw field values to lifecycle
//! stages, composed bottom-up so cross-level propagation is explicit.
//!
//! Propagation rules:
//! - `frozen` flows down from the contribution's selection decision;
//! - an assessment is locked while submitted (`aLocked`) or once the final
//!   review decided anything but "revise" (`rLocked`), and that lock flows
//!   up to the contribution;
//! - `rLocked` locks both reviews; otherwise the final review stays locked
//!   until the expert review has recorded a decision.

use plenum_core::{
  record::{Review, Selection, creators},
  table::ReviewKind,
  workflow::{
    AssessmentStage, AssessmentWorkflow, ContribStage, ContribWorkflow,
    PerKind, ReviewStage, ReviewWorkflow,
  },
};

use crate::{
  aggregate::{AssessmentBundle, ContribBundle},
  refdata::RefData,
  score::compute_score,
};

// ─── Review level ────────────────────────────────────────────────────────────

/// Resolve one review, before lock propagation.
///
/// The `locked` flag is provisional (`false`); [`resolve_assessment`] owns
/// the lock rule because it needs both reviews at once.
pub fn resolve_review(
  kind: ReviewKind,
  review: &Review,
  frozen: bool,
  ref_data: &RefData,
) -> ReviewWorkflow {
  let decision = review.decision.and_then(|d| ref_data.decisions.get(&d));

  let stage = match kind {
    // An expert decision has no accept/reject semantics of its own; it
    // only marks that the expert has spoken.
    ReviewKind::Expert => decision.map(|_| ReviewStage::ReviewExpert),
    ReviewKind::Final => decision.map(|verb| match verb {
      plenum_core::record::DecisionVerb::Accept => ReviewStage::ReviewAccept,
      plenum_core::record::DecisionVerb::Reject => ReviewStage::ReviewReject,
      plenum_core::record::DecisionVerb::Revise => ReviewStage::ReviewRevise,
    }),
  };

  ReviewWorkflow {
    review_id: review.review_id,
    creators: creators(review.creator, &review.editors),
    title: review.title.clone(),
    kind,
    stage,
    stage_date: review.date_decided,
    frozen,
    locked: false,
  }
}

// ─── Assessment level ────────────────────────────────────────────────────────

/// Resolve the valid assessment of a contribution, including its reviews.
pub fn resolve_assessment(
  bundle: &AssessmentBundle,
  frozen: bool,
  ref_data: &RefData,
) -> AssessmentWorkflow {
  let assessment = &bundle.assessment;

  let n_required = ref_data.required_criteria(assessment.assessment_type);
  let entries: Vec<_> = bundle.own_entries().collect();
  let complete =
    entries.len() == n_required && entries.iter().all(|e| e.is_filled());

  let submitted = assessment.submitted;
  let withdrawn = !submitted && assessment.date_withdrawn.is_some();

  let score = compute_score(entries.iter().copied(), ref_data);

  let expert_wf = bundle
    .valid_review(ReviewKind::Expert)
    .map(|r| resolve_review(ReviewKind::Expert, r, frozen, ref_data));
  let final_wf = bundle
    .valid_review(ReviewKind::Final)
    .map(|r| resolve_review(ReviewKind::Final, r, frozen, ref_data));

  let expert_stage = expert_wf.as_ref().and_then(|w| w.stage);
  let final_stage = final_wf.as_ref().and_then(|w| w.stage);
  let final_date = final_wf.as_ref().and_then(|w| w.stage_date);

  // A "revise" decision splits on whether the author has since resubmitted:
  // decision after the submission date means revision is in progress,
  // before it means the revised version is already submitted.
  let revise = final_stage == Some(ReviewStage::ReviewRevise);
  let revised_progress = submitted
    && revise
    && matches!(
      (final_date, assessment.date_submitted),
      (Some(fd), Some(sd)) if fd > sd
    );
  let revised_done = submitted
    && revise
    && matches!(
      (final_date, assessment.date_submitted),
      (Some(fd), Some(sd)) if fd < sd
    );

  let stage = if withdrawn {
    if complete {
      AssessmentStage::CompleteWithdrawn
    } else {
      AssessmentStage::IncompleteWithdrawn
    }
  } else if revised_progress {
    if complete {
      AssessmentStage::CompleteRevised
    } else {
      AssessmentStage::IncompleteRevised
    }
  } else if revised_done {
    AssessmentStage::SubmittedRevised
  } else if submitted {
    AssessmentStage::Submitted
  } else if complete {
    AssessmentStage::Complete
  } else {
    AssessmentStage::Incomplete
  };

  let stage_date = if withdrawn {
    assessment.date_withdrawn
  } else {
    assessment.date_submitted
  };

  let a_locked = matches!(
    stage,
    AssessmentStage::Submitted | AssessmentStage::SubmittedRevised
  );
  let r_locked = final_stage.is_some_and(|s| s != ReviewStage::ReviewRevise);

  // Lock propagation across the two reviews.
  let lock = |wf: Option<ReviewWorkflow>, locked: bool| {
    wf.map(|w| ReviewWorkflow { locked, ..w })
  };
  let reviews = if r_locked {
    PerKind::new(lock(expert_wf, true), lock(final_wf, true))
  } else {
    PerKind::new(
      lock(expert_wf, false),
      lock(final_wf, expert_stage.is_none()),
    )
  };

  let locked = a_locked || r_locked;

  // Whether a review of each kind may still be started. Submission does
  // not close this (reviews are written against submitted assessments);
  // only a freeze or a terminal final decision does.
  let may_add = PerKind::new(
    !r_locked && !frozen && reviews.get(ReviewKind::Expert).is_none(),
    !r_locked && !frozen && reviews.get(ReviewKind::Final).is_none(),
  );

  AssessmentWorkflow {
    assessment_id: assessment.assessment_id,
    creators: creators(assessment.creator, &assessment.editors),
    title: assessment.title.clone(),
    reviewers: PerKind::new(
      assessment.reviewer_expert,
      assessment.reviewer_final,
    ),
    score,
    stage,
    stage_date,
    frozen,
    locked,
    may_add,
    reviews,
  }
}

// ─── Contribution level ──────────────────────────────────────────────────────

/// Resolve a full contribution subtree into its derived workflow record.
pub fn resolve_contrib(
  bundle: &ContribBundle,
  ref_data: &RefData,
) -> ContribWorkflow {
  let contribution = &bundle.contribution;

  let stage = match contribution.selection {
    Selection::Undecided => ContribStage::SelectNone,
    Selection::Yes => ContribStage::SelectYes,
    Selection::No => ContribStage::SelectNo,
  };
  let frozen = stage != ContribStage::SelectNone;

  let assessment = bundle
    .valid_assessment()
    .map(|a| resolve_assessment(a, frozen, ref_data));

  // The child's lock status surfaces on the parent.
  let locked = assessment.as_ref().is_some_and(|a| a.locked);
  let may_add = !locked && !frozen && assessment.is_none();

  ContribWorkflow {
    contrib_id: contribution.contrib_id,
    creators: creators(contribution.creator, &contribution.editors),
    country: contribution.country,
    contrib_type: contribution.contrib_type,
    title: contribution.title.clone(),
    stage,
    stage_date: contribution.date_decided,
    frozen,
    locked,
    may_add,
    assessment,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, Utc};
  use plenum_core::record::{
    Assessment, Contribution, CriteriaEntry, DecisionVerb,
  };
  use uuid::Uuid;

  use super::*;

  fn ref_data_one_decision(verb: DecisionVerb) -> (RefData, Uuid) {
    let mut data = RefData::default();
    let id = Uuid::new_v4();
    data.decisions.insert(id, verb);
    (data, id)
  }

  fn require_criteria(data: &mut RefData, a: &Assessment, n: u32) {
    let ctype = a.assessment_type.unwrap();
    for seq in 0..n {
      data.criteria_by_type.entry(ctype).or_default().push(
        plenum_core::record::Criterion {
          criterion_id: Uuid::new_v4(),
          contrib_type: ctype,
          seq,
          title: format!("criterion {seq}"),
        },
      );
    }
  }

  fn assessment(contrib: Uuid) -> Assessment {
    Assessment {
      assessment_id:   Uuid::new_v4(),
      created_at:      Utc::now(),
      creator:         Uuid::new_v4(),
      editors:         vec![],
      contrib,
      title:           "self-assessment".into(),
      assessment_type: Some(Uuid::new_v4()),
      submitted:       false,
      date_submitted:  None,
      date_withdrawn:  None,
      reviewer_expert: None,
      reviewer_final:  None,
    }
  }

  fn review(assessment: &Assessment, creator: Uuid) -> Review {
    Review {
      review_id:    Uuid::new_v4(),
      created_at:   Utc::now(),
      creator,
      editors:      vec![],
      assessment:   assessment.assessment_id,
      title:        "review".into(),
      review_type:  assessment.assessment_type,
      decision:     None,
      date_decided: None,
    }
  }

  fn entry(assessment: &Assessment, filled: bool) -> CriteriaEntry {
    CriteriaEntry {
      entry_id:   Uuid::new_v4(),
      created_at: Utc::now(),
      creator:    assessment.creator,
      editors:    vec![],
      assessment: assessment.assessment_id,
      seq:        1,
      criterion:  Some(Uuid::new_v4()),
      score:      filled.then(Uuid::new_v4),
      evidence:   filled.then(|| "because".to_string()),
    }
  }

  fn bundle(
    assessment: Assessment,
    criteria_entries: Vec<CriteriaEntry>,
    reviews: Vec<Review>,
  ) -> AssessmentBundle {
    AssessmentBundle { assessment, criteria_entries, reviews }
  }

  #[test]
  fn incomplete_until_all_entries_filled() {
    let mut data = RefData::default();
    let a = assessment(Uuid::new_v4());
    require_criteria(&mut data, &a, 2);

    let entries = vec![entry(&a, true), entry(&a, false)];
    let wf = resolve_assessment(&bundle(a.clone(), entries, vec![]), false, &data);
    assert_eq!(wf.stage, AssessmentStage::Incomplete);
    assert!(!wf.locked);

    let entries = vec![entry(&a, true), entry(&a, true)];
    let wf = resolve_assessment(&bundle(a, entries, vec![]), false, &data);
    assert_eq!(wf.stage, AssessmentStage::Complete);
  }

  #[test]
  fn submitted_assessment_is_locked_and_locks_the_contribution() {
    let data = RefData::default();
    let contrib_id = Uuid::new_v4();
    let mut a = assessment(contrib_id);
    a.submitted = true;
    a.date_submitted = Some(Utc::now());

    let contribution = Contribution {
      contrib_id,
      created_at: Utc::now(),
      creator: a.creator,
      editors: vec![],
      title: "contribution".into(),
      contrib_type: a.assessment_type,
      country: None,
      selection: Selection::Undecided,
      date_decided: None,
    };
    let wf = resolve_contrib(
      &ContribBundle {
        contribution,
        assessments: vec![bundle(a, vec![], vec![])],
      },
      &data,
    );

    let awf = wf.assessment.as_ref().unwrap();
    assert_eq!(awf.stage, AssessmentStage::Submitted);
    assert!(awf.locked);
    assert!(wf.locked);
    assert!(!wf.frozen);
    assert!(!wf.may_add);
  }

  #[test]
  fn final_review_stays_locked_until_expert_decides() {
    let (data, accept) = ref_data_one_decision(DecisionVerb::Accept);
    let mut a = assessment(Uuid::new_v4());
    let expert = Uuid::new_v4();
    let fin = Uuid::new_v4();
    a.reviewer_expert = Some(expert);
    a.reviewer_final = Some(fin);

    let expert_review = review(&a, expert);
    let final_review = review(&a, fin);

    // No expert decision yet: final review locked, expert free.
    let wf = resolve_assessment(
      &bundle(a.clone(), vec![], vec![
        expert_review.clone(),
        final_review.clone(),
      ]),
      false,
      &data,
    );
    assert!(wf.reviews.get(ReviewKind::Final).as_ref().unwrap().locked);
    assert!(!wf.reviews.get(ReviewKind::Expert).as_ref().unwrap().locked);

    // Expert decides: final review unlocked.
    let mut expert_review = expert_review;
    expert_review.decision = Some(accept);
    expert_review.date_decided = Some(Utc::now());
    let wf = resolve_assessment(
      &bundle(a, vec![], vec![expert_review, final_review]),
      false,
      &data,
    );
    let expert_wf = wf.reviews.get(ReviewKind::Expert).as_ref().unwrap();
    assert_eq!(expert_wf.stage, Some(ReviewStage::ReviewExpert));
    assert!(!wf.reviews.get(ReviewKind::Final).as_ref().unwrap().locked);
  }

  #[test]
  fn final_accept_locks_both_reviews() {
    let (data, accept) = ref_data_one_decision(DecisionVerb::Accept);
    let mut a = assessment(Uuid::new_v4());
    let expert = Uuid::new_v4();
    let fin = Uuid::new_v4();
    a.reviewer_expert = Some(expert);
    a.reviewer_final = Some(fin);

    let mut expert_review = review(&a, expert);
    expert_review.decision = Some(accept);
    expert_review.date_decided = Some(Utc::now());
    let mut final_review = review(&a, fin);
    final_review.decision = Some(accept);
    final_review.date_decided = Some(Utc::now());

    let wf = resolve_assessment(
      &bundle(a, vec![], vec![expert_review, final_review]),
      false,
      &data,
    );
    let final_wf = wf.reviews.get(ReviewKind::Final).as_ref().unwrap();
    assert_eq!(final_wf.stage, Some(ReviewStage::ReviewAccept));
    assert!(final_wf.locked);
    assert!(wf.reviews.get(ReviewKind::Expert).as_ref().unwrap().locked);
    assert!(wf.decided());
    assert!(wf.locked);
  }

  #[test]
  fn revise_decision_splits_on_resubmission_date() {
    let (mut data, revise) = ref_data_one_decision(DecisionVerb::Revise);
    let submitted_at = Utc::now();
    let mut a = assessment(Uuid::new_v4());
    require_criteria(&mut data, &a, 1);
    let expert = Uuid::new_v4();
    let fin = Uuid::new_v4();
    a.reviewer_expert = Some(expert);
    a.reviewer_final = Some(fin);
    a.submitted = true;
    a.date_submitted = Some(submitted_at);

    let mut final_review = review(&a, fin);
    final_review.decision = Some(revise);

    // Decision after submission: revision in progress.
    final_review.date_decided = Some(submitted_at + Duration::hours(1));
    let wf = resolve_assessment(
      &bundle(a.clone(), vec![], vec![final_review.clone()]),
      false,
      &data,
    );
    assert_eq!(wf.stage, AssessmentStage::IncompleteRevised);
    assert!(!wf.locked, "a revise decision does not lock");

    // With the entry filled the revision in progress reads as complete.
    let wf = resolve_assessment(
      &bundle(a.clone(), vec![entry(&a, true)], vec![final_review.clone()]),
      false,
      &data,
    );
    assert_eq!(wf.stage, AssessmentStage::CompleteRevised);

    // Author resubmitted after the decision: revised version submitted.
    a.date_submitted = Some(submitted_at + Duration::hours(2));
    let wf =
      resolve_assessment(&bundle(a, vec![], vec![final_review]), false, &data);
    assert_eq!(wf.stage, AssessmentStage::SubmittedRevised);
    assert!(wf.locked);
  }

  #[test]
  fn withdrawal_beats_every_other_stage() {
    let mut data = RefData::default();
    let mut a = assessment(Uuid::new_v4());
    require_criteria(&mut data, &a, 1);
    a.submitted = false;
    a.date_submitted = Some(Utc::now() - Duration::hours(1));
    a.date_withdrawn = Some(Utc::now());

    let wf = resolve_assessment(&bundle(a.clone(), vec![], vec![]), false, &data);
    assert_eq!(wf.stage, AssessmentStage::IncompleteWithdrawn);
    assert_eq!(wf.stage_date, a.date_withdrawn);
    assert!(!wf.locked);

    // Completion only picks the withdrawn flavour, it never outranks it.
    let wf = resolve_assessment(
      &bundle(a.clone(), vec![entry(&a, true)], vec![]),
      false,
      &data,
    );
    assert_eq!(wf.stage, AssessmentStage::CompleteWithdrawn);
  }

  #[test]
  fn selection_freezes_the_contribution() {
    let data = RefData::default();
    let contribution = Contribution {
      contrib_id:   Uuid::new_v4(),
      created_at:   Utc::now(),
      creator:      Uuid::new_v4(),
      editors:      vec![],
      title:        "contribution".into(),
      contrib_type: Some(Uuid::new_v4()),
      country:      None,
      selection:    Selection::No,
      date_decided: Some(Utc::now()),
    };
    let wf = resolve_contrib(
      &ContribBundle { contribution, assessments: vec![] },
      &data,
    );
    assert_eq!(wf.stage, ContribStage::SelectNo);
    assert!(wf.frozen);
    assert!(!wf.may_add);
  }

  #[test]
  fn mismatched_assessment_type_leaves_no_valid_assessment() {
    let data = RefData::default();
    let contrib_id = Uuid::new_v4();
    let mut a = assessment(contrib_id);
    a.assessment_type = Some(Uuid::new_v4());

    let contribution = Contribution {
      contrib_id,
      created_at: Utc::now(),
      creator: a.creator,
      editors: vec![],
      title: "contribution".into(),
      contrib_type: Some(Uuid::new_v4()),
      country: None,
      selection: Selection::Undecided,
      date_decided: None,
    };
    let wf = resolve_contrib(
      &ContribBundle {
        contribution,
        assessments: vec![bundle(a, vec![], vec![])],
      },
      &data,
    );
    assert!(wf.assessment.is_none());
    assert!(wf.may_add, "an orphaned assessment does not block a new one");
  }
}
