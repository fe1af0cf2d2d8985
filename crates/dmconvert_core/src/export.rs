//! JSON export of the final entity graph.

use crate::error::{ConvertError, ConvertResult};
use crate::model::graph::ConvertedGraph;
use log::info;
use std::path::Path;

/// Writes `graph` as pretty-printed JSON to `path`, replacing any file there.
pub fn export_graph(graph: &ConvertedGraph, path: &Path) -> ConvertResult<()> {
    let json = serde_json::to_string_pretty(graph)?;
    std::fs::write(path, json).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "event=export module=export status=ok path={} documents={} links={}",
        path.display(),
        graph.documents().len(),
        graph.links().len()
    );
    Ok(())
}
