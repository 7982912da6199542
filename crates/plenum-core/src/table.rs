//! Closed enums for the table and reviewer-kind names.
//!
//! The original system dispatched on table names as free strings. Here the
//! names are a closed set; the string forms survive only at the API edge
//! (URL segments, query parameters, serialised workflow records).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A user table that takes part in the workflow.
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
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Table {
  Contrib,
  Assessment,
  Review,
  CriteriaEntry,
  ReviewEntry,
}

impl Table {
  /// The workflow level this table reads its attributes from.
  ///
  /// Entry tables have no workflow attributes of their own; they share the
  /// snapshot of their master record.
  pub fn level(self) -> Table {
    match self {
      Self::Contrib => Self::Contrib,
      Self::Assessment | Self::CriteriaEntry => Self::Assessment,
      Self::Review | Self::ReviewEntry => Self::Review,
    }
  }
}

/// The two reviewer kinds of the two-stage peer review.
///
/// Nothing in a review record states its kind; it is inferred from the
/// review's creator matching one of the assessment's assigned reviewers.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReviewKind {
  Expert,
  Final,
}

impl ReviewKind {
  pub const ALL: [ReviewKind; 2] = [ReviewKind::Expert, ReviewKind::Final];
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn table_wire_names() {
    assert_eq!(Table::CriteriaEntry.to_string(), "criteriaEntry");
    assert_eq!(Table::from_str("contrib").unwrap(), Table::Contrib);
    assert!(Table::from_str("contribs").is_err());
  }

  #[test]
  fn entry_tables_share_their_master_level() {
    assert_eq!(Table::CriteriaEntry.level(), Table::Assessment);
    assert_eq!(Table::ReviewEntry.level(), Table::Review);
    assert_eq!(Table::Contrib.level(), Table::Contrib);
  }
}
