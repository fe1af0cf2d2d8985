//! Persistence contracts for converted entities.
//!
//! # Responsibility
//! - Keep SQL details behind the [`graph_store::GraphStore`] trait so the
//!   conversion service stays storage agnostic.

pub mod graph_store;
