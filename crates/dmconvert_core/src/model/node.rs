//! Generic node records built from triples.
//!
//! # Responsibility
//! - Hold one predicate map per subject, in first-seen subject order.
//! - Define the closed type vocabulary used for classification.
//!
//! # Invariants
//! - Keys and node URIs are normalized with [`normalize_uri`].
//! - `kind` is only set from a type IRI inside the closed vocabulary.

use crate::rdf::vocab;
use std::collections::HashMap;

/// Normalizes a URI into the representation used for node keys.
///
/// Dots are replaced with underscores; the downstream document store keys
/// records on this form.
pub fn normalize_uri(uri: &str) -> String {
    uri.replace('.', "_")
}

/// Closed vocabulary of recognized node types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    User,
    Project,
    TextDocument,
    ImageDocument,
    Image,
    Annotation,
    SvgSelector,
    TextQuoteSelector,
    /// A selector applied to a source document. Never a top-level entity.
    SpecificResource,
}

impl NodeKind {
    pub const ALL: [NodeKind; 9] = [
        NodeKind::User,
        NodeKind::Project,
        NodeKind::TextDocument,
        NodeKind::ImageDocument,
        NodeKind::Image,
        NodeKind::Annotation,
        NodeKind::SvgSelector,
        NodeKind::TextQuoteSelector,
        NodeKind::SpecificResource,
    ];

    /// Raw type IRI as written in the export.
    pub fn type_iri(self) -> &'static str {
        match self {
            Self::User => vocab::FOAF_AGENT,
            Self::Project => vocab::DM_PROJECT,
            Self::TextDocument => vocab::DCMITYPE_TEXT,
            Self::ImageDocument => vocab::SC_CANVAS,
            Self::Image => vocab::DCMITYPE_IMAGE,
            Self::Annotation => vocab::OA_ANNOTATION,
            Self::SvgSelector => vocab::OA_SVG_SELECTOR,
            Self::TextQuoteSelector => vocab::OA_TEXT_QUOTE_SELECTOR,
            Self::SpecificResource => vocab::OA_SPECIFIC_RESOURCE,
        }
    }

    /// Looks up a kind by its normalized type URI.
    pub fn from_type_uri(normalized: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| normalize_uri(kind.type_iri()) == normalized)
    }
}

/// Value of one predicate on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    /// Aggregation predicate values in first-seen order.
    List(Vec<String>),
}

/// All triples sharing one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericNode {
    pub uri: String,
    pub kind: Option<NodeKind>,
    fields: HashMap<String, FieldValue>,
}

impl GenericNode {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: None,
            fields: HashMap::new(),
        }
    }

    /// Single value for a predicate given by its raw IRI.
    pub fn field(&self, predicate_iri: &str) -> Option<&str> {
        match self.fields.get(&normalize_uri(predicate_iri))? {
            FieldValue::Single(value) => Some(value.as_str()),
            FieldValue::List(_) => None,
        }
    }

    /// Ordered values for a predicate given by its raw IRI.
    ///
    /// A single-valued predicate reads as a one-element list.
    pub fn list(&self, predicate_iri: &str) -> &[String] {
        match self.fields.get(&normalize_uri(predicate_iri)) {
            Some(FieldValue::List(values)) => values,
            Some(FieldValue::Single(value)) => std::slice::from_ref(value),
            None => &[],
        }
    }

    /// Raw access by normalized predicate key.
    pub fn raw_field(&self, predicate_key: &str) -> Option<&FieldValue> {
        self.fields.get(predicate_key)
    }

    /// Overwrites a scalar field.
    pub fn set_field(&mut self, predicate_key: String, value: String) {
        self.fields.insert(predicate_key, FieldValue::Single(value));
    }

    /// Appends to a list field, replacing any scalar stored under the key.
    pub fn append_field(&mut self, predicate_key: String, value: String) {
        match self.fields.get_mut(&predicate_key) {
            Some(FieldValue::List(values)) => values.push(value),
            _ => {
                self.fields.insert(predicate_key, FieldValue::List(vec![value]));
            }
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

/// Lookup table of generic nodes in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<GenericNode>,
    index: HashMap<String, usize>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node by normalized URI.
    pub fn get(&self, uri: &str) -> Option<&GenericNode> {
        self.index.get(uri).map(|&idx| &self.nodes[idx])
    }

    /// Returns the node for `uri`, creating it on first sight.
    pub fn get_or_insert(&mut self, uri: &str) -> &mut GenericNode {
        let idx = match self.index.get(uri) {
            Some(&idx) => idx,
            None => {
                self.nodes.push(GenericNode::new(uri));
                self.index.insert(uri.to_string(), self.nodes.len() - 1);
                self.nodes.len() - 1
            }
        };
        &mut self.nodes[idx]
    }

    /// Iterates nodes in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &GenericNode> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uri_replaces_dots() {
        assert_eq!(
            normalize_uri("http://dm.drew.edu/ns/Project"),
            "http://dm_drew_edu/ns/Project"
        );
    }

    #[test]
    fn every_kind_round_trips_through_its_type_uri() {
        for kind in NodeKind::ALL {
            assert_eq!(
                NodeKind::from_type_uri(&normalize_uri(kind.type_iri())),
                Some(kind)
            );
        }
        assert_eq!(NodeKind::from_type_uri("http://example_org/Other"), None);
    }

    #[test]
    fn list_reads_single_values_as_one_element() {
        let mut node = GenericNode::new("urn:n");
        node.set_field(normalize_uri(vocab::RDFS_LABEL), "Label".into());
        assert_eq!(node.list(vocab::RDFS_LABEL), ["Label".to_string()]);
        assert!(node.list(vocab::ORE_AGGREGATES).is_empty());
    }

    #[test]
    fn table_keeps_first_seen_order() {
        let mut table = NodeTable::new();
        table.get_or_insert("urn:b");
        table.get_or_insert("urn:a");
        table.get_or_insert("urn:b");
        let uris: Vec<&str> = table.iter().map(|node| node.uri.as_str()).collect();
        assert_eq!(uris, vec!["urn:b", "urn:a"]);
        assert_eq!(table.len(), 2);
    }
}
