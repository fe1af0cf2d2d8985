//! Node classifier: typed entities from generic nodes.
//!
//! # Responsibility
//! - Dispatch every node on its [`NodeKind`] to exactly one parser.
//! - Collect annotations for link resolution instead of storing them.
//!
//! # Invariants
//! - Entities enter the arena in node-table order.
//! - Specific-resource nodes and untyped nodes never become entities.

use super::{richtext, selector};
use crate::error::{ConvertError, ConvertResult};
use crate::model::entity::{Annotation, Document, DocumentKind, Image, Project, User};
use crate::model::graph::ConvertedGraph;
use crate::model::node::{GenericNode, NodeKind, NodeTable};
use crate::rdf::vocab::{
    CNT_CHARS, DCTERMS_DESCRIPTION, DC_CREATOR, EXIF_HEIGHT, EXIF_WIDTH, FOAF_MBOX, FOAF_NAME,
    OA_HAS_BODY, OA_HAS_TARGET, ORE_AGGREGATES, RDFS_LABEL,
};
use log::{debug, info, warn};

const DEFAULT_EMAIL_DOMAIN: &str = "digitalmappa.org";

/// Node counts by classification outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyStats {
    pub entities: usize,
    pub annotations: usize,
    /// Specific-resource nodes, resolved later by URI.
    pub auxiliary: usize,
    /// Nodes without a recognized type.
    pub misses: usize,
}

/// Output of classification.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub graph: ConvertedGraph,
    /// Annotations awaiting link resolution, in node-table order.
    pub annotations: Vec<Annotation>,
    pub stats: ClassifyStats,
}

/// Classifies every node of `table`.
///
/// # Errors
/// - [`ConvertError::Reference`] when an annotation lacks its body or target.
/// - [`ConvertError::Decode`] when a vector selector has no drawable shape.
pub fn classify(table: &NodeTable) -> ConvertResult<Classified> {
    let mut out = Classified::default();

    for node in table.iter() {
        let Some(kind) = node.kind else {
            out.stats.misses += 1;
            debug!(
                "event=classify module=convert status=miss uri={} fields={}",
                node.uri,
                node.field_count()
            );
            continue;
        };

        match kind {
            NodeKind::User => out.graph.add_user(parse_user(node)),
            NodeKind::Project => out.graph.add_project(parse_project(node)),
            NodeKind::TextDocument => {
                out.graph.add_document(parse_text_document(node));
            }
            NodeKind::ImageDocument => {
                out.graph.add_document(parse_image_document(node));
            }
            NodeKind::Image => {
                out.graph.add_image(parse_image(node));
            }
            NodeKind::SvgSelector => {
                out.graph.add_highlight(selector::decode_vector(node)?);
            }
            NodeKind::TextQuoteSelector => {
                out.graph.add_highlight(selector::decode_text_quote(node));
            }
            NodeKind::Annotation => {
                out.annotations.push(parse_annotation(node)?);
                out.stats.annotations += 1;
                continue;
            }
            NodeKind::SpecificResource => {
                out.stats.auxiliary += 1;
                debug!(
                    "event=classify module=convert status=auxiliary uri={}",
                    node.uri
                );
                continue;
            }
        }
        out.stats.entities += 1;
    }

    info!(
        "event=classify module=convert status=ok users={} projects={} documents={} images={} highlights={} annotations={} auxiliary={} misses={}",
        out.graph.users().len(),
        out.graph.projects().len(),
        out.graph.documents().len(),
        out.graph.images().len(),
        out.graph.highlights().len(),
        out.stats.annotations,
        out.stats.auxiliary,
        out.stats.misses
    );
    Ok(out)
}

fn text(node: &GenericNode, predicate: &str) -> Option<String> {
    node.field(predicate).map(str::to_string)
}

fn parse_user(node: &GenericNode) -> User {
    let email = match node.field(FOAF_MBOX) {
        Some(mbox) => mbox.strip_prefix("mailto:").unwrap_or(mbox).to_string(),
        None => format!("{}@{DEFAULT_EMAIL_DOMAIN}", node.uri.replacen(':', "_", 1)),
    };
    User {
        uri: node.uri.clone(),
        name: text(node, FOAF_NAME),
        email,
    }
}

fn parse_project(node: &GenericNode) -> Project {
    Project {
        uri: node.uri.clone(),
        name: text(node, RDFS_LABEL),
        owner_uri: text(node, DC_CREATOR),
        description: text(node, DCTERMS_DESCRIPTION),
        document_uris: node.list(ORE_AGGREGATES).to_vec(),
    }
}

fn parse_text_document(node: &GenericNode) -> Document {
    let converted = richtext::convert_html(node.field(CNT_CHARS).unwrap_or_default());
    Document {
        uri: node.uri.clone(),
        name: text(node, RDFS_LABEL),
        kind: DocumentKind::Text,
        content: converted.content,
        search_text: Some(converted.search_text),
        width: None,
        height: None,
        image_uris: Vec::new(),
        project_uri: None,
        parent_uri: None,
        parent_kind: None,
    }
}

fn parse_image_document(node: &GenericNode) -> Document {
    Document {
        uri: node.uri.clone(),
        name: text(node, RDFS_LABEL),
        kind: DocumentKind::Canvas,
        content: String::new(),
        search_text: None,
        width: dimension(node, EXIF_WIDTH),
        height: dimension(node, EXIF_HEIGHT),
        image_uris: Vec::new(),
        project_uri: None,
        parent_uri: None,
        parent_kind: None,
    }
}

fn dimension(node: &GenericNode, predicate: &str) -> Option<u32> {
    let raw = node.field(predicate)?;
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) => {
            Some(value.round() as u32)
        }
        _ => {
            warn!(
                "event=classify module=convert status=invalid_dimension uri={} value={}",
                node.uri, raw
            );
            None
        }
    }
}

fn parse_image(node: &GenericNode) -> Image {
    Image {
        uri: node.uri.clone(),
        filename: node
            .uri
            .strip_prefix("image:")
            .unwrap_or(&node.uri)
            .to_string(),
    }
}

fn parse_annotation(node: &GenericNode) -> ConvertResult<Annotation> {
    let body_uri = node
        .field(OA_HAS_BODY)
        .ok_or_else(|| ConvertError::reference(&node.uri, "annotation has no body"))?;
    let target_uri = node
        .field(OA_HAS_TARGET)
        .ok_or_else(|| ConvertError::reference(&node.uri, "annotation has no target"))?;
    Ok(Annotation {
        uri: node.uri.clone(),
        body_uri: body_uri.to_string(),
        target_uri: target_uri.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::HighlightKind;
    use crate::model::node::normalize_uri;

    fn typed(table: &mut NodeTable, uri: &str, kind: NodeKind) {
        table.get_or_insert(uri).kind = Some(kind);
    }

    fn set(table: &mut NodeTable, uri: &str, predicate: &str, value: &str) {
        table
            .get_or_insert(uri)
            .set_field(normalize_uri(predicate), value.to_string());
    }

    #[test]
    fn user_email_defaults_from_uri() {
        let mut table = NodeTable::new();
        typed(&mut table, "user:nick", NodeKind::User);
        typed(&mut table, "user:ann", NodeKind::User);
        set(&mut table, "user:ann", FOAF_MBOX, "mailto:ann@example.org");

        let classified = classify(&table).unwrap();
        let users = classified.graph.users();
        assert_eq!(users[0].email, "user_nick@digitalmappa.org");
        assert_eq!(users[1].email, "ann@example.org");
    }

    #[test]
    fn untyped_and_auxiliary_nodes_are_counted_not_classified() {
        let mut table = NodeTable::new();
        table.get_or_insert("urn:plain");
        typed(&mut table, "urn:res", NodeKind::SpecificResource);
        typed(&mut table, "urn:doc", NodeKind::TextDocument);

        let classified = classify(&table).unwrap();
        assert_eq!(
            classified.stats,
            ClassifyStats {
                entities: 1,
                annotations: 0,
                auxiliary: 1,
                misses: 1,
            }
        );
        assert_eq!(classified.graph.documents().len(), 1);
    }

    #[test]
    fn image_filename_strips_scheme() {
        let mut table = NodeTable::new();
        typed(&mut table, "image:photo_jpg", NodeKind::Image);
        let classified = classify(&table).unwrap();
        assert_eq!(classified.graph.images()[0].filename, "photo_jpg");
    }

    #[test]
    fn canvas_dimensions_are_parsed_or_left_empty() {
        let mut table = NodeTable::new();
        typed(&mut table, "urn:canvas", NodeKind::ImageDocument);
        set(&mut table, "urn:canvas", EXIF_WIDTH, "800");
        set(&mut table, "urn:canvas", EXIF_HEIGHT, "tall");

        let classified = classify(&table).unwrap();
        let canvas = &classified.graph.documents()[0];
        assert_eq!(canvas.kind, DocumentKind::Canvas);
        assert_eq!(canvas.width, Some(800));
        assert_eq!(canvas.height, None);
        assert!(canvas.content.is_empty());
        assert!(canvas.image_uris.is_empty());
    }

    #[test]
    fn annotations_are_pending_not_entities() {
        let mut table = NodeTable::new();
        typed(&mut table, "urn:anno", NodeKind::Annotation);
        set(&mut table, "urn:anno", OA_HAS_BODY, "urn:a");
        set(&mut table, "urn:anno", OA_HAS_TARGET, "urn:b");

        let classified = classify(&table).unwrap();
        assert_eq!(classified.annotations.len(), 1);
        assert_eq!(classified.annotations[0].body_uri, "urn:a");
        assert_eq!(classified.stats.entities, 0);
    }

    #[test]
    fn annotation_without_target_is_fatal() {
        let mut table = NodeTable::new();
        typed(&mut table, "urn:anno", NodeKind::Annotation);
        set(&mut table, "urn:anno", OA_HAS_BODY, "urn:a");
        assert!(matches!(
            classify(&table),
            Err(ConvertError::Reference { .. })
        ));
    }

    #[test]
    fn text_quote_selectors_become_highlights() {
        let mut table = NodeTable::new();
        typed(&mut table, "urn:q", NodeKind::TextQuoteSelector);
        let classified = classify(&table).unwrap();
        assert_eq!(
            classified.graph.highlights()[0].kind,
            HighlightKind::TextQuote
        );
    }
}
