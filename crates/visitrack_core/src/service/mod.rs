//! Command execution over the entity store.
//!
//! # Responsibility
//! - Resolve command targets against the most recently shown lists.
//! - Invoke store operations and persist after each successful mutation.
//!
//! # Invariants
//! - A rejected command leaves the store unchanged.
//! - Store mutations run to completion before persistence starts.

mod render;
pub mod tracker_service;

pub use tracker_service::{
    CommandError, CommandOutcome, LocationView, PersonView, TrackerService,
};
