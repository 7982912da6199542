//! Actors and roles — who is attempting a workflow action.
//!
//! Identity and role *assignment* are outside this system; the engine only
//! consumes a resolved [`Actor`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::record::User;

/// Authority level, ordered from least to most powerful.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Unauthenticated visitor.
  #[default]
  Guest,
  /// Ordinary authenticated user.
  User,
  /// Coordinator for one country's contributions.
  Coordinator,
  /// Back-office staff.
  Office,
  /// System administrator.
  System,
}

/// A resolved identity: the inputs the permission predicates need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Actor {
  /// `None` for unauthenticated requests.
  pub user:    Option<Uuid>,
  pub role:    Role,
  /// The country a coordinator coordinates. Irrelevant for other roles.
  pub country: Option<Uuid>,
}

impl Actor {
  pub fn guest() -> Self {
    Self::default()
  }

  pub fn from_user(user: &User) -> Self {
    Self {
      user:    Some(user.user_id),
      role:    user.role,
      country: user.country,
    }
  }

  pub fn is_authenticated(&self) -> bool {
    self.user.is_some()
  }

  /// Office staff and the system administrator.
  pub fn is_office(&self) -> bool {
    self.role >= Role::Office
  }

  pub fn is_system(&self) -> bool {
    self.role == Role::System
  }

  /// Whether this actor coordinates contributions of `country`.
  ///
  /// Office and system actors coordinate everywhere; a coordinator only
  /// their own country.
  pub fn coordinates(&self, country: Option<Uuid>) -> bool {
    if self.is_office() {
      return true;
    }
    self.role == Role::Coordinator
      && country.is_some()
      && self.country == country
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn coordinator_is_scoped_to_their_country() {
    let here = Some(Uuid::new_v4());
    let there = Some(Uuid::new_v4());
    let coord = Actor {
      user:    Some(Uuid::new_v4()),
      role:    Role::Coordinator,
      country: here,
    };
    assert!(coord.coordinates(here));
    assert!(!coord.coordinates(there));
    assert!(!coord.coordinates(None));
  }

  #[test]
  fn office_coordinates_everywhere() {
    let office = Actor {
      user:    Some(Uuid::new_v4()),
      role:    Role::Office,
      country: None,
    };
    assert!(office.coordinates(Some(Uuid::new_v4())));
    assert!(!office.is_system());
  }
}
