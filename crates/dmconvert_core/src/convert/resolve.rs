//! Link resolver: turns pending annotations into links and image
//! associations.
//!
//! # Invariants
//! - Both ends of every annotation resolve to a node, or the run fails.
//! - An image URI appears at most once in a document's image list.
//! - Resolving a specific-resource side backfills the selected highlight's
//!   `document_uri` with the resource's source.

use crate::error::{ConvertError, ConvertResult};
use crate::model::entity::{Annotation, Link, LinkSide, SideKind};
use crate::model::graph::ConvertedGraph;
use crate::model::node::{GenericNode, NodeKind, NodeTable};
use crate::rdf::vocab::{OA_HAS_SELECTOR, OA_HAS_SOURCE};
use log::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub links: usize,
    pub image_associations: usize,
}

/// Resolves every annotation against the node table, mutating `graph`.
pub fn resolve_links(
    table: &NodeTable,
    annotations: &[Annotation],
    graph: &mut ConvertedGraph,
) -> ConvertResult<ResolveStats> {
    let mut stats = ResolveStats::default();

    for annotation in annotations {
        let body = lookup(table, &annotation.body_uri, &annotation.uri, "body")?;
        let target = lookup(table, &annotation.target_uri, &annotation.uri, "target")?;

        if body.kind == Some(NodeKind::Image) {
            associate_image(graph, body, target)?;
            stats.image_associations += 1;
            continue;
        }

        let side_a = link_side(table, graph, body)?;
        let side_b = link_side(table, graph, target)?;
        debug!(
            "event=resolve module=convert status=link annotation={} side_a={} side_b={}",
            annotation.uri, side_a.uri, side_b.uri
        );
        graph.add_link(Link { side_a, side_b });
        stats.links += 1;
    }

    info!(
        "event=resolve module=convert status=ok links={} image_associations={}",
        stats.links, stats.image_associations
    );
    Ok(stats)
}

fn lookup<'t>(
    table: &'t NodeTable,
    uri: &str,
    owner: &str,
    role: &str,
) -> ConvertResult<&'t GenericNode> {
    table
        .get(uri)
        .ok_or_else(|| ConvertError::reference(uri, format!("{role} of {owner}")))
}

fn associate_image(
    graph: &mut ConvertedGraph,
    image: &GenericNode,
    target: &GenericNode,
) -> ConvertResult<()> {
    let image_uri = match graph.image_id(&image.uri) {
        Some(id) => graph.image(id).uri.clone(),
        None => return Err(ConvertError::reference(&image.uri, "image was not parsed")),
    };
    let document_id = graph.document_id(&target.uri).ok_or_else(|| {
        ConvertError::reference(&target.uri, format!("image {image_uri} target is not a document"))
    })?;

    let document = graph.document_mut(document_id);
    if !document.image_uris.contains(&image_uri) {
        document.image_uris.push(image_uri);
    }
    Ok(())
}

/// Resolves one annotation end into a link side.
///
/// Specific resources resolve to their selector, as a highlight side;
/// everything else is a document side named by its own URI.
fn link_side(
    table: &NodeTable,
    graph: &mut ConvertedGraph,
    node: &GenericNode,
) -> ConvertResult<LinkSide> {
    if node.kind != Some(NodeKind::SpecificResource) {
        return Ok(LinkSide {
            uri: node.uri.clone(),
            kind: SideKind::Document,
        });
    }

    let source_uri = node
        .field(OA_HAS_SOURCE)
        .ok_or_else(|| ConvertError::reference(&node.uri, "specific resource has no source"))?;
    let selector_uri = node
        .field(OA_HAS_SELECTOR)
        .ok_or_else(|| ConvertError::reference(&node.uri, "specific resource has no selector"))?;
    let source = lookup(table, source_uri, &node.uri, "source")?;
    let selector = lookup(table, selector_uri, &node.uri, "selector")?;

    match graph.highlight_id(&selector.uri) {
        Some(id) => graph.highlight_mut(id).document_uri = Some(source.uri.clone()),
        None => warn!(
            "event=resolve module=convert status=selector_not_highlight resource={} selector={}",
            node.uri, selector.uri
        ),
    }

    Ok(LinkSide {
        uri: selector.uri.clone(),
        kind: SideKind::Highlight,
    })
}
