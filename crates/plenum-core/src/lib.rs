//! Core types and trait definitions for the plenum contribution tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod actor;
pub mod record;
pub mod store;
pub mod table;
pub mod workflow;
