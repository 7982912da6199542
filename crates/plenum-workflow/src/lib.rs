//! The workflow derivation and transition engine.
//!
//! From the raw hierarchy contribution → assessment → (expert review, final
//! review) → entries, this crate computes the cached derived state
//! ([`plenum_core::workflow::ContribWorkflow`]) and gates every
//! lifecycle-changing action through permission predicates.
//!
//! Layering, leaf first: [`aggregate`] joins detail records under their
//! masters; [`score`] computes the weighted percentage; [`stage`] is the
//! pure state machine per level with cross-level lock/freeze propagation;
//! [`command`] decides and applies workflow commands; [`engine`] owns the
//! recompute/replace cycle of the cache; [`item`] is the read-only facade
//! the web layer consumes.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod engine;
pub mod error;
pub mod item;
pub mod refdata;
pub mod score;
pub mod stage;


pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{Command, CommandOutcome, Effect, Permit};
pub use engine::{StatusRow, Workflow};
pub use error::{Error, Result};
pub use item::WorkflowItem;
pub use refdata::{EngineConfig, RefData};
