//! Conversion run orchestration.
//!
//! # Responsibility
//! - Run every stage in order against one store.
//! - Report what each stage produced.
//!
//! # Invariants
//! - Input is fully parsed before the store is reset.
//! - The store is reset before any entity is written.
//! - Any stage error aborts the run; there is no partial recovery.

use crate::convert::{
    classify, link_projects, materialize, resolve_links, ClassifyStats, LinkerReport,
    ResolveStats,
};
use crate::error::{ConvertError, ConvertResult};
use crate::export::export_graph;
use crate::model::graph::ConvertedGraph;
use crate::rdf::parse_turtle;
use crate::repo::graph_store::{CollectionCounts, GraphStore};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Per-run switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Run the project-membership fixpoint and prune unlinked entities.
    pub link_projects: bool,
    /// Also write the final graph as JSON here.
    pub export_path: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            link_projects: true,
            export_path: None,
        }
    }
}

/// Summary of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub run_id: Uuid,
    pub triples: usize,
    pub nodes: usize,
    pub classify: ClassifyStats,
    pub resolve: ResolveStats,
    /// `None` when project linking was disabled.
    pub linker: Option<LinkerReport>,
    /// Row counts after the write.
    pub persisted: CollectionCounts,
}

/// Use-case service for conversion runs.
pub struct ConvertService<S: GraphStore> {
    store: S,
    options: ConvertOptions,
}

impl<S: GraphStore> ConvertService<S> {
    pub fn new(store: S, options: ConvertOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Reads the Turtle file at `path` and converts it.
    pub fn run_file(&self, path: &Path) -> ConvertResult<ConvertReport> {
        let source = std::fs::read_to_string(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "event=input_read module=service status=ok path={} bytes={}",
            path.display(),
            source.len()
        );
        self.run(&source)
    }

    /// Converts a Turtle document and replaces the store contents with it.
    pub fn run(&self, source: &str) -> ConvertResult<ConvertReport> {
        let run_id = Uuid::new_v4();
        let started_at = Instant::now();
        info!(
            "event=convert_run module=service status=start run_id={} link_projects={}",
            run_id, self.options.link_projects
        );

        match self.run_stages(run_id, source) {
            Ok(report) => {
                info!(
                    "event=convert_run module=service status=ok run_id={} documents={} highlights={} links={} duration_ms={}",
                    run_id,
                    report.persisted.documents,
                    report.persisted.highlights,
                    report.persisted.links,
                    started_at.elapsed().as_millis()
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=convert_run module=service status=error run_id={} duration_ms={} error={}",
                    run_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn run_stages(&self, run_id: Uuid, source: &str) -> ConvertResult<ConvertReport> {
        let triples = parse_turtle(source)?;
        info!(
            "event=parse module=service status=ok run_id={} triples={}",
            run_id,
            triples.len()
        );

        self.store.reset()?;

        let table = materialize(&triples);
        let classified = classify(&table)?;
        let mut graph = classified.graph;
        let resolve = resolve_links(&table, &classified.annotations, &mut graph)?;
        let linker = self.link(&mut graph);

        self.store.write_graph(&graph)?;
        let persisted = self.store.counts()?;

        if let Some(path) = &self.options.export_path {
            export_graph(&graph, path)?;
        }

        Ok(ConvertReport {
            run_id,
            triples: triples.len(),
            nodes: table.len(),
            classify: classified.stats,
            resolve,
            linker,
            persisted,
        })
    }

    fn link(&self, graph: &mut ConvertedGraph) -> Option<LinkerReport> {
        if !self.options.link_projects {
            info!("event=link_project module=service status=skipped");
            return None;
        }
        Some(link_projects(graph))
    }
}
