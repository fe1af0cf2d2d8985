//! Converts a legacy Turtle export into the normalized entity graph of the
//! document store.
//!
//! Stages run in order: [`rdf`] parsing, node materialization,
//! classification, link resolution, project linking, then persistence
//! through [`repo::graph_store`]. [`service::convert_service::ConvertService`]
//! drives a whole run.

pub mod config;
pub mod convert;
pub mod db;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;
pub mod rdf;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ConfigFile, ConvertConfig};
pub use db::{open_db, open_db_in_memory, DbError};
pub use error::{ConvertError, ConvertResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::graph::ConvertedGraph;
pub use repo::graph_store::{
    Collection, CollectionCounts, GraphStore, SqliteGraphStore, StoreError, StoreResult,
};
pub use service::convert_service::{ConvertOptions, ConvertReport, ConvertService};
