//! Domain model for the conversion pipeline.
//!
//! # Responsibility
//! - Define generic node records and the closed type vocabulary.
//! - Define typed entities and the arena that owns them during a run.
//!
//! # Invariants
//! - Generic nodes never leave the conversion stages; only typed entities
//!   reach the store.

pub mod entity;
pub mod graph;
pub mod node;
