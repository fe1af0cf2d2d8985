//! Typed entities produced by classification.
//!
//! # Responsibility
//! - Define the records read by the downstream CRUD/UI layer.
//!
//! # Invariants
//! - `uri` is unique across all entity kinds.
//! - `project_uri`, `parent_uri` and `document_uri` are empty at creation and
//!   filled in only by link resolution and project linking.

use serde::{Deserialize, Serialize};

/// Color assigned to every converted highlight.
pub const HIGHLIGHT_COLOR: &str = "#ffeb3b";

/// Excerpt shown for vector highlights, which have no text of their own.
pub const VECTOR_HIGHLIGHT_EXCERPT: &str = "Highlight";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uri: String,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub uri: String,
    pub name: Option<String>,
    #[serde(rename = "ownerURI")]
    pub owner_uri: Option<String>,
    pub description: Option<String>,
    /// Table of contents, in source order.
    #[serde(rename = "documentURIs")]
    pub document_uris: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Rich-text document.
    Text,
    /// Image canvas.
    Canvas,
}

/// What a document's `parent_uri` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentKind {
    Project,
    Document,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub uri: String,
    pub name: Option<String>,
    #[serde(rename = "documentKind")]
    pub kind: DocumentKind,
    /// Editor JSON for text documents, empty for canvases.
    pub content: String,
    #[serde(rename = "searchText")]
    pub search_text: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "imageURIs")]
    pub image_uris: Vec<String>,
    #[serde(rename = "projectURI")]
    pub project_uri: Option<String>,
    #[serde(rename = "parentURI")]
    pub parent_uri: Option<String>,
    #[serde(rename = "parentType")]
    pub parent_kind: Option<ParentKind>,
}

impl Document {
    /// Sets the parent unless one was already assigned.
    ///
    /// Returns whether the parent was set.
    pub fn adopt_parent(&mut self, parent_uri: &str, kind: ParentKind) -> bool {
        if self.parent_uri.is_some() {
            return false;
        }
        self.parent_uri = Some(parent_uri.to_string());
        self.parent_kind = Some(kind);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub uri: String,
    pub filename: String,
}

/// One-directional annotation edge. Consumed by link resolution, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub uri: String,
    pub body_uri: String,
    pub target_uri: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    /// Shape drawn on a canvas.
    Vector,
    /// Excerpt of a text document.
    TextQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub uri: String,
    pub kind: HighlightKind,
    pub excerpt: Option<String>,
    pub color: String,
    /// Serialized shape for vector highlights, anchor URI for text quotes.
    pub target: String,
    #[serde(rename = "documentURI")]
    pub document_uri: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SideKind {
    Document,
    Highlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSide {
    pub uri: String,
    pub kind: SideKind,
}

/// Undirected link between two documents or highlights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "sideA")]
    pub side_a: LinkSide,
    #[serde(rename = "sideB")]
    pub side_b: LinkSide,
}
