//! Highlight decoders for the two selector kinds.

use super::svg;
use crate::error::{ConvertError, ConvertResult};
use crate::model::entity::{Highlight, HighlightKind, HIGHLIGHT_COLOR, VECTOR_HIGHLIGHT_EXCERPT};
use crate::model::node::GenericNode;
use crate::rdf::vocab::{CNT_CHARS, OA_EXACT};
use serde_json::{json, Value};

/// Decodes an SVG selector into a vector highlight.
///
/// The highlight target is the serialized canvas shape, stamped with the
/// highlight URI and drawn as an unfilled outline in the highlight color.
pub fn decode_vector(node: &GenericNode) -> ConvertResult<Highlight> {
    let markup = node.field(CNT_CHARS).unwrap_or_default();
    let mut shape =
        svg::first_shape(markup).map_err(|message| ConvertError::decode(&node.uri, message))?;
    shape.insert("_highlightUid".into(), json!(node.uri));
    shape.insert("fill".into(), json!("transparent"));
    shape.insert("stroke".into(), json!(HIGHLIGHT_COLOR));

    Ok(Highlight {
        uri: node.uri.clone(),
        kind: HighlightKind::Vector,
        excerpt: Some(VECTOR_HIGHLIGHT_EXCERPT.to_string()),
        color: HIGHLIGHT_COLOR.to_string(),
        target: Value::Object(shape).to_string(),
        document_uri: None,
    })
}

/// Decodes a text-quote selector. The anchor is the selector itself.
pub fn decode_text_quote(node: &GenericNode) -> Highlight {
    Highlight {
        uri: node.uri.clone(),
        kind: HighlightKind::TextQuote,
        excerpt: node.field(OA_EXACT).map(str::to_string),
        color: HIGHLIGHT_COLOR.to_string(),
        target: node.uri.clone(),
        document_uri: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::normalize_uri;

    fn selector(uri: &str, predicate: &str, value: &str) -> GenericNode {
        let mut node = GenericNode::new(uri);
        node.set_field(normalize_uri(predicate), value.to_string());
        node
    }

    #[test]
    fn vector_highlight_is_stamped_and_recolored() {
        let node = selector(
            "urn:sel_1",
            CNT_CHARS,
            r#"<rect x="1" y="2" width="3" height="4" fill="red" stroke="blue"/>"#,
        );
        let highlight = decode_vector(&node).unwrap();
        assert_eq!(highlight.kind, HighlightKind::Vector);
        assert_eq!(highlight.excerpt.as_deref(), Some("Highlight"));
        assert_eq!(highlight.color, HIGHLIGHT_COLOR);

        let shape: Value = serde_json::from_str(&highlight.target).unwrap();
        assert_eq!(shape["_highlightUid"], "urn:sel_1");
        assert_eq!(shape["fill"], "transparent");
        assert_eq!(shape["stroke"], HIGHLIGHT_COLOR);
        assert_eq!(shape["type"], "rect");
    }

    #[test]
    fn vector_without_shape_is_a_decode_error() {
        let node = selector("urn:sel_2", CNT_CHARS, "<g/>");
        match decode_vector(&node) {
            Err(ConvertError::Decode { uri, .. }) => assert_eq!(uri, "urn:sel_2"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn text_quote_targets_itself() {
        let node = selector("urn:q_1", OA_EXACT, "quoted words");
        let highlight = decode_text_quote(&node);
        assert_eq!(highlight.kind, HighlightKind::TextQuote);
        assert_eq!(highlight.target, "urn:q_1");
        assert_eq!(highlight.excerpt.as_deref(), Some("quoted words"));
        assert_eq!(highlight.document_uri, None);
    }
}
