//! Node materializer: groups triples by subject into generic nodes.
//!
//! # Invariants
//! - One node per distinct subject, in first-seen order.
//! - `rdf:type` is recorded only for values in the closed vocabulary.
//! - The aggregation predicate accumulates in arrival order, duplicates kept.
//! - Every other predicate is last-write-wins.

use crate::model::node::{normalize_uri, NodeKind, NodeTable};
use crate::rdf::vocab::{ORE_AGGREGATES, RDF_TYPE};
use crate::rdf::RawTriple;
use log::{debug, info};

/// Builds the node table from an ordered triple sequence.
pub fn materialize(triples: &[RawTriple]) -> NodeTable {
    let type_key = normalize_uri(RDF_TYPE);
    let aggregates_key = normalize_uri(ORE_AGGREGATES);
    let mut table = NodeTable::new();
    let mut ignored_types = 0usize;

    for triple in triples {
        let subject = normalize_uri(&triple.subject);
        let predicate = normalize_uri(&triple.predicate);
        let object = object_value(triple);
        let node = table.get_or_insert(&subject);

        if predicate == type_key {
            match NodeKind::from_type_uri(&object) {
                Some(kind) => {
                    node.kind = Some(kind);
                    node.set_field(predicate, object);
                }
                None => {
                    ignored_types += 1;
                    debug!(
                        "event=materialize module=convert status=type_ignored uri={} type={}",
                        subject, object
                    );
                }
            }
        } else if predicate == aggregates_key {
            node.append_field(predicate, object);
        } else {
            node.set_field(predicate, object);
        }
    }

    info!(
        "event=materialize module=convert status=ok triples={} nodes={} ignored_types={}",
        triples.len(),
        table.len(),
        ignored_types
    );
    table
}

/// Literals and `mailto:` addresses pass through; node references are
/// normalized like subjects so lookups succeed.
fn object_value(triple: &RawTriple) -> String {
    if triple.literal || triple.object.starts_with("mailto:") {
        triple.object.clone()
    } else {
        normalize_uri(&triple.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::FieldValue;
    use crate::rdf::vocab::{FOAF_AGENT, FOAF_MBOX, FOAF_NAME, RDFS_LABEL};

    fn node_triple(subject: &str, predicate: &str, object: &str) -> RawTriple {
        RawTriple {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            literal: false,
        }
    }

    fn literal_triple(subject: &str, predicate: &str, object: &str) -> RawTriple {
        RawTriple {
            literal: true,
            ..node_triple(subject, predicate, object)
        }
    }

    #[test]
    fn aggregation_keeps_arrival_order_across_interleaving() {
        let triples = vec![
            node_triple("urn:p", ORE_AGGREGATES, "urn:a"),
            literal_triple("urn:p", RDFS_LABEL, "Project"),
            node_triple("urn:p", ORE_AGGREGATES, "urn:b"),
            node_triple("urn:other", ORE_AGGREGATES, "urn:z"),
            node_triple("urn:p", ORE_AGGREGATES, "urn:c"),
            node_triple("urn:p", ORE_AGGREGATES, "urn:a"),
        ];
        let table = materialize(&triples);
        let project = table.get("urn:p").unwrap();
        assert_eq!(
            project.list(ORE_AGGREGATES),
            ["urn:a", "urn:b", "urn:c", "urn:a"].map(String::from)
        );
    }

    #[test]
    fn unknown_type_is_ignored_but_node_exists() {
        let triples = vec![
            node_triple("urn:x", RDF_TYPE, "http://example.org/Unknown"),
            literal_triple("urn:x", RDFS_LABEL, "still here"),
        ];
        let table = materialize(&triples);
        let node = table.get("urn:x").unwrap();
        assert_eq!(node.kind, None);
        assert_eq!(node.field(RDF_TYPE), None);
        assert_eq!(node.field(RDFS_LABEL), Some("still here"));
    }

    #[test]
    fn unknown_type_does_not_clear_known_type() {
        let triples = vec![
            node_triple("urn:u", RDF_TYPE, FOAF_AGENT),
            node_triple("urn:u", RDF_TYPE, "http://example.org/Person"),
        ];
        let table = materialize(&triples);
        assert_eq!(table.get("urn:u").unwrap().kind, Some(NodeKind::User));
    }

    #[test]
    fn scalar_fields_are_last_write_wins() {
        let triples = vec![
            literal_triple("urn:u", FOAF_NAME, "First"),
            literal_triple("urn:u", FOAF_NAME, "Second"),
        ];
        let table = materialize(&triples);
        assert_eq!(table.get("urn:u").unwrap().field(FOAF_NAME), Some("Second"));
    }

    #[test]
    fn object_uris_are_normalized_except_mailto_and_literals() {
        let triples = vec![
            node_triple("http://a.org/u", FOAF_MBOX, "mailto:nick@example.org"),
            node_triple("http://a.org/u", RDFS_LABEL, "http://b.org/ref"),
            literal_triple("http://a.org/u", FOAF_NAME, "a.b.c"),
        ];
        let table = materialize(&triples);
        let node = table.get("http://a_org/u").unwrap();
        assert_eq!(node.field(FOAF_MBOX), Some("mailto:nick@example.org"));
        assert_eq!(node.field(RDFS_LABEL), Some("http://b_org/ref"));
        assert_eq!(node.field(FOAF_NAME), Some("a.b.c"));
    }

    #[test]
    fn unknown_predicates_are_stored_verbatim_by_key() {
        let triples = vec![literal_triple("urn:n", "http://ex.org/custom", "v")];
        let table = materialize(&triples);
        assert_eq!(
            table.get("urn:n").unwrap().raw_field("http://ex_org/custom"),
            Some(&FieldValue::Single("v".into()))
        );
    }
}
