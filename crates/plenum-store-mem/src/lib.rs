//! In-memory backend for the plenum record store.
//!
//! Holds every table in process memory behind one read/write lock. This is
//! the backend the test suites run against and the default for the demo
//! server; the store trait keeps a persistent backend swappable in.

mod store;

pub mod error;
pub mod seed;

pub use error::{Error, Result};
pub use store::MemStore;
