//! Joining detail records under their masters.
//!
//! A [`ContribBundle`] is the in-memory tree the stage resolvers read:
//! contribution → assessments → {reviews, criteria entries}. Details are
//! ordered by creation time (id as tiebreak), which is what makes the
//! "valid child" rule deterministic.

use plenum_core::{
  record::{Assessment, Contribution, CriteriaEntry, Review},
  store::RecordStore,
  table::ReviewKind,
};
use uuid::Uuid;

use crate::error::{Error, Result};

// ─── Bundles ─────────────────────────────────────────────────────────────────

/// An assessment with its detail records, creation-ordered.
#[derive(Debug, Clone)]
pub struct AssessmentBundle {
  pub assessment:      Assessment,
  pub criteria_entries: Vec<CriteriaEntry>,
  pub reviews:         Vec<Review>,
}

impl AssessmentBundle {
  /// The assigned reviewer of `kind`, if any.
  pub fn reviewer(&self, kind: ReviewKind) -> Option<Uuid> {
    match kind {
      ReviewKind::Expert => self.assessment.reviewer_expert,
      ReviewKind::Final => self.assessment.reviewer_final,
    }
  }

  /// The valid review of `kind`: the last-created review authored by the
  /// assigned reviewer of that kind whose type matches the assessment's
  /// type. Superseded and mistyped reviews stay in storage but are not
  /// part of the workflow.
  pub fn valid_review(&self, kind: ReviewKind) -> Option<&Review> {
    let reviewer = self.reviewer(kind)?;
    self
      .reviews
      .iter()
      .filter(|r| {
        r.creator == reviewer
          && r.review_type.is_some()
          && r.review_type == self.assessment.assessment_type
      })
      .next_back()
  }

  /// The criteria entries that belong to this assessment's criteria set.
  /// Entries without a criterion reference are tolerated as orphans.
  pub fn own_entries(&self) -> impl Iterator<Item = &CriteriaEntry> {
    self.criteria_entries.iter().filter(|e| e.criterion.is_some())
  }
}

/// A contribution with all its assessment subtrees.
#[derive(Debug, Clone)]
pub struct ContribBundle {
  pub contribution: Contribution,
  pub assessments:  Vec<AssessmentBundle>,
}

impl ContribBundle {
  /// Fetch and join the full subtree of one contribution.
  ///
  /// Returns `Ok(None)` when the contribution does not exist.
  pub async fn fetch<S: RecordStore>(
    store: &S,
    contrib_id: Uuid,
  ) -> Result<Option<Self>> {
    let Some(contribution) =
      store.contrib(contrib_id).await.map_err(Error::store)?
    else {
      return Ok(None);
    };
    Ok(Some(Self::fetch_details(store, contribution).await?))
  }

  /// Join the subtree under an already-fetched contribution record.
  pub async fn fetch_details<S: RecordStore>(
    store: &S,
    contribution: Contribution,
  ) -> Result<Self> {
    let mut assessments = store
      .assessments_of(contribution.contrib_id)
      .await
      .map_err(Error::store)?;
    sort_created(&mut assessments, |a| (a.created_at, a.assessment_id));

    let mut bundles = Vec::with_capacity(assessments.len());
    for assessment in assessments {
      let mut criteria_entries = store
        .criteria_entries_of(assessment.assessment_id)
        .await
        .map_err(Error::store)?;
      sort_created(&mut criteria_entries, |e| (e.created_at, e.entry_id));

      let mut reviews = store
        .reviews_of(assessment.assessment_id)
        .await
        .map_err(Error::store)?;
      sort_created(&mut reviews, |r| (r.created_at, r.review_id));

      bundles.push(AssessmentBundle { assessment, criteria_entries, reviews });
    }

    Ok(Self { contribution, assessments: bundles })
  }

  /// The valid assessment: the last-created assessment whose type matches
  /// the contribution's current type. Changing the contribution's type
  /// silently orphans assessments of the old type; they are excluded here
  /// but never deleted.
  pub fn valid_assessment(&self) -> Option<&AssessmentBundle> {
    let contrib_type = self.contribution.contrib_type?;
    self
      .assessments
      .iter()
      .filter(|a| a.assessment.assessment_type == Some(contrib_type))
      .next_back()
  }
}

fn sort_created<T, K: Ord>(records: &mut [T], key: impl Fn(&T) -> K) {
  records.sort_by_key(key);
}
