//! Graph linker: propagates project membership over the link graph.
//!
//! # Responsibility
//! - Seed each project with its table of contents.
//! - Extend membership one link hop per pass until a pass adds nothing.
//! - Prune documents without a project and highlights without a document.
//!
//! A link carries membership when both sides resolve to a document. A
//! `Document` side is its own document; a `Highlight` side stands for the
//! document the highlight belongs to.
//!
//! # Invariants
//! - `project_uri` and `parent_uri` are never overwritten once set.
//! - A pass only extends from documents known when the pass started, so
//!   a new document's parent is always from the previous hop.
//!
//! # See also
//! - [`crate::convert::resolve`] for how link sides are produced.

use crate::model::entity::{ParentKind, SideKind};
use crate::model::graph::{ConvertedGraph, DocumentId, PruneStats};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Membership result for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLinkStats {
    pub project_uri: String,
    /// Documents assigned to the project, seeds included.
    pub documents: usize,
    /// Passes that added at least one document.
    pub passes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkerReport {
    pub projects: Vec<ProjectLinkStats>,
    pub pruned: PruneStats,
}

/// Runs the fixpoint for every project, then prunes unlinked entities.
pub fn link_projects(graph: &mut ConvertedGraph) -> LinkerReport {
    let edges = document_edges(graph);
    let projects: Vec<(String, Vec<String>)> = graph
        .projects()
        .iter()
        .map(|project| (project.uri.clone(), project.document_uris.clone()))
        .collect();

    let mut report = LinkerReport::default();
    for (project_uri, toc) in projects {
        let stats = link_project(graph, &edges, &project_uri, &toc);
        info!(
            "event=link_project module=convert status=ok project={} documents={} passes={}",
            stats.project_uri, stats.documents, stats.passes
        );
        report.projects.push(stats);
    }

    report.pruned = graph.prune_unlinked();
    report
}

/// Document pairs joined by a link, in link order.
///
/// Highlight sides stand for their owning document. Links without a
/// document on both sides, or within one document, carry no membership.
fn document_edges(graph: &ConvertedGraph) -> Vec<(DocumentId, DocumentId)> {
    let side_document = |uri: &str, kind: SideKind| -> Option<DocumentId> {
        match kind {
            SideKind::Document => graph.document_id(uri),
            SideKind::Highlight => {
                let highlight = graph.highlight(graph.highlight_id(uri)?);
                graph.document_id(highlight.document_uri.as_deref()?)
            }
        }
    };

    graph
        .links()
        .iter()
        .filter_map(|link| {
            let a = side_document(&link.side_a.uri, link.side_a.kind)?;
            let b = side_document(&link.side_b.uri, link.side_b.kind)?;
            (a != b).then_some((a, b))
        })
        .collect()
}

fn link_project(
    graph: &mut ConvertedGraph,
    edges: &[(DocumentId, DocumentId)],
    project_uri: &str,
    toc: &[String],
) -> ProjectLinkStats {
    let mut known = BTreeSet::new();
    let mut rejected = BTreeSet::new();

    for uri in toc {
        let Some(id) = graph.document_id(uri) else {
            warn!(
                "event=link_project module=convert status=toc_missing project={} document={}",
                project_uri, uri
            );
            continue;
        };
        if known.contains(&id) {
            continue;
        }
        if claim(graph, id, project_uri) {
            graph
                .document_mut(id)
                .adopt_parent(project_uri, ParentKind::Project);
            known.insert(id);
        }
    }

    let mut passes = 0;
    loop {
        let snapshot = known.clone();
        let mut added = 0usize;

        for &(a, b) in edges {
            let (from, to) = if snapshot.contains(&a) && !known.contains(&b) {
                (a, b)
            } else if snapshot.contains(&b) && !known.contains(&a) {
                (b, a)
            } else {
                continue;
            };
            if rejected.contains(&to) {
                continue;
            }
            if !claim(graph, to, project_uri) {
                rejected.insert(to);
                continue;
            }

            let parent_uri = graph.document(from).uri.clone();
            graph
                .document_mut(to)
                .adopt_parent(&parent_uri, ParentKind::Document);
            known.insert(to);
            added += 1;
        }

        if added == 0 {
            break;
        }
        passes += 1;
        debug!(
            "event=link_project module=convert status=pass project={} pass={} added={}",
            project_uri, passes, added
        );
    }

    ProjectLinkStats {
        project_uri: project_uri.to_string(),
        documents: known.len(),
        passes,
    }
}

/// Assigns the project unless another project already owns the document.
fn claim(graph: &mut ConvertedGraph, id: DocumentId, project_uri: &str) -> bool {
    let document = graph.document_mut(id);
    match document.project_uri.as_deref() {
        None => {
            document.project_uri = Some(project_uri.to_string());
            true
        }
        Some(owner) if owner == project_uri => true,
        Some(owner) => {
            warn!(
                "event=link_project module=convert status=already_claimed document={} owner={} project={}",
                document.uri, owner, project_uri
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::{
        Document, DocumentKind, Highlight, HighlightKind, Link, LinkSide, Project,
    };

    fn document(uri: &str) -> Document {
        Document {
            uri: uri.into(),
            name: None,
            kind: DocumentKind::Text,
            content: String::new(),
            search_text: Some(String::new()),
            width: None,
            height: None,
            image_uris: Vec::new(),
            project_uri: None,
            parent_uri: None,
            parent_kind: None,
        }
    }

    fn project(uri: &str, docs: &[&str]) -> Project {
        Project {
            uri: uri.into(),
            name: None,
            owner_uri: None,
            description: None,
            document_uris: docs.iter().map(|doc| doc.to_string()).collect(),
        }
    }

    fn doc_link(a: &str, b: &str) -> Link {
        Link {
            side_a: LinkSide {
                uri: a.into(),
                kind: SideKind::Document,
            },
            side_b: LinkSide {
                uri: b.into(),
                kind: SideKind::Document,
            },
        }
    }

    #[test]
    fn chain_reaches_fixpoint_in_three_passes() {
        let mut graph = ConvertedGraph::new();
        for uri in ["urn:d0", "urn:d1", "urn:d2", "urn:d3"] {
            graph.add_document(document(uri));
        }
        graph.add_project(project("urn:p", &["urn:d0"]));
        graph.add_link(doc_link("urn:d2", "urn:d3"));
        graph.add_link(doc_link("urn:d1", "urn:d2"));
        graph.add_link(doc_link("urn:d0", "urn:d1"));

        let report = link_projects(&mut graph);
        assert_eq!(
            report.projects,
            vec![ProjectLinkStats {
                project_uri: "urn:p".into(),
                documents: 4,
                passes: 3,
            }]
        );

        let parent = |uri: &str| {
            let doc = graph.document(graph.document_id(uri).unwrap());
            (doc.parent_uri.clone().unwrap(), doc.parent_kind.unwrap())
        };
        assert_eq!(parent("urn:d0"), ("urn:p".to_string(), ParentKind::Project));
        assert_eq!(parent("urn:d1"), ("urn:d0".to_string(), ParentKind::Document));
        assert_eq!(parent("urn:d2"), ("urn:d1".to_string(), ParentKind::Document));
        assert_eq!(parent("urn:d3"), ("urn:d2".to_string(), ParentKind::Document));
    }

    #[test]
    fn highlight_sides_link_through_their_document() {
        let mut graph = ConvertedGraph::new();
        graph.add_document(document("urn:d0"));
        graph.add_document(document("urn:d1"));
        graph.add_highlight(Highlight {
            uri: "urn:sel".into(),
            kind: HighlightKind::TextQuote,
            excerpt: None,
            color: String::new(),
            target: "urn:sel".into(),
            document_uri: Some("urn:d1".into()),
        });
        graph.add_project(project("urn:p", &["urn:d0"]));
        graph.add_link(Link {
            side_a: LinkSide {
                uri: "urn:d0".into(),
                kind: SideKind::Document,
            },
            side_b: LinkSide {
                uri: "urn:sel".into(),
                kind: SideKind::Highlight,
            },
        });

        let report = link_projects(&mut graph);
        assert_eq!(report.projects[0].documents, 2);
        assert_eq!(graph.documents().len(), 2);
        assert_eq!(graph.highlights().len(), 1);
    }

    #[test]
    fn unreachable_entities_are_pruned() {
        let mut graph = ConvertedGraph::new();
        graph.add_document(document("urn:d0"));
        graph.add_document(document("urn:orphan"));
        graph.add_highlight(Highlight {
            uri: "urn:loose".into(),
            kind: HighlightKind::Vector,
            excerpt: None,
            color: String::new(),
            target: "{}".into(),
            document_uri: None,
        });
        graph.add_project(project("urn:p", &["urn:d0", "urn:missing"]));
        graph.add_link(doc_link("urn:orphan", "urn:missing"));

        let report = link_projects(&mut graph);
        assert_eq!(report.pruned.dropped_documents, vec!["urn:orphan".to_string()]);
        assert_eq!(report.pruned.dropped_highlights, vec!["urn:loose".to_string()]);
        assert_eq!(report.pruned.dangling_links, 1);
        assert_eq!(graph.links().len(), 1);
        assert_eq!(graph.documents().len(), 1);
        assert!(graph.document_id("urn:orphan").is_none());
    }

    #[test]
    fn first_project_keeps_a_shared_document() {
        let mut graph = ConvertedGraph::new();
        graph.add_document(document("urn:shared"));
        graph.add_document(document("urn:other"));
        graph.add_project(project("urn:p1", &["urn:shared"]));
        graph.add_project(project("urn:p2", &["urn:shared", "urn:other"]));

        let report = link_projects(&mut graph);
        let shared = graph.document(graph.document_id("urn:shared").unwrap());
        assert_eq!(shared.project_uri.as_deref(), Some("urn:p1"));
        assert_eq!(shared.parent_uri.as_deref(), Some("urn:p1"));
        assert_eq!(report.projects[1].documents, 1);
    }
}
