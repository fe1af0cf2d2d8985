//! Use-case services.
//!
//! # Responsibility
//! - Drive the conversion stages against a [`crate::repo::graph_store::GraphStore`].
//! - Keep the CLI decoupled from stage and storage details.

pub mod convert_service;
