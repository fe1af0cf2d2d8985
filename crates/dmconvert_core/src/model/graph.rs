//! Entity arena for one conversion run.
//!
//! # Responsibility
//! - Own every typed entity by collection, in insertion order.
//! - Resolve URIs to arena indices for the resolution and linking stages.
//!
//! # Invariants
//! - Each index map mirrors its collection exactly; collections are only
//!   mutated through this type.
//! - Indices are invalidated by [`ConvertedGraph::prune_unlinked`].

use super::entity::{Document, Highlight, Image, Link, LinkSide, Project, SideKind, User};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

/// Entities dropped for lack of a project or document association.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub dropped_documents: Vec<String>,
    pub dropped_highlights: Vec<String>,
    /// Links kept although a side no longer resolves to an entity.
    pub dangling_links: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConvertedGraph {
    users: Vec<User>,
    projects: Vec<Project>,
    documents: Vec<Document>,
    images: Vec<Image>,
    highlights: Vec<Highlight>,
    links: Vec<Link>,
    #[serde(skip)]
    document_index: HashMap<String, DocumentId>,
    #[serde(skip)]
    highlight_index: HashMap<String, HighlightId>,
    #[serde(skip)]
    image_index: HashMap<String, ImageId>,
}

impl ConvertedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn add_project(&mut self, project: Project) {
        self.projects.push(project);
    }

    pub fn add_document(&mut self, document: Document) -> DocumentId {
        let id = DocumentId(self.documents.len());
        self.document_index.insert(document.uri.clone(), id);
        self.documents.push(document);
        id
    }

    pub fn add_image(&mut self, image: Image) -> ImageId {
        let id = ImageId(self.images.len());
        self.image_index.insert(image.uri.clone(), id);
        self.images.push(image);
        id
    }

    pub fn add_highlight(&mut self, highlight: Highlight) -> HighlightId {
        let id = HighlightId(self.highlights.len());
        self.highlight_index.insert(highlight.uri.clone(), id);
        self.highlights.push(highlight);
        id
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn document_id(&self, uri: &str) -> Option<DocumentId> {
        self.document_index.get(uri).copied()
    }

    pub fn document(&self, id: DocumentId) -> &Document {
        &self.documents[id.0]
    }

    pub fn document_mut(&mut self, id: DocumentId) -> &mut Document {
        &mut self.documents[id.0]
    }

    pub fn highlight_id(&self, uri: &str) -> Option<HighlightId> {
        self.highlight_index.get(uri).copied()
    }

    pub fn highlight(&self, id: HighlightId) -> &Highlight {
        &self.highlights[id.0]
    }

    pub fn highlight_mut(&mut self, id: HighlightId) -> &mut Highlight {
        &mut self.highlights[id.0]
    }

    pub fn image_id(&self, uri: &str) -> Option<ImageId> {
        self.image_index.get(uri).copied()
    }

    pub fn image(&self, id: ImageId) -> &Image {
        &self.images[id.0]
    }

    /// Drops documents without a project, then highlights whose document
    /// is unset or was dropped. Links are kept; the ones left pointing at a
    /// dropped entity are counted.
    pub fn prune_unlinked(&mut self) -> PruneStats {
        let mut stats = PruneStats::default();

        self.documents.retain(|document| {
            if document.project_uri.is_some() {
                return true;
            }
            debug!(
                "event=prune module=graph status=dropped kind=document uri={}",
                document.uri
            );
            stats.dropped_documents.push(document.uri.clone());
            false
        });
        let kept: HashSet<&str> = self
            .documents
            .iter()
            .map(|document| document.uri.as_str())
            .collect();
        self.highlights.retain(|highlight| {
            if highlight
                .document_uri
                .as_deref()
                .is_some_and(|uri| kept.contains(uri))
            {
                return true;
            }
            debug!(
                "event=prune module=graph status=dropped kind=highlight uri={}",
                highlight.uri
            );
            stats.dropped_highlights.push(highlight.uri.clone());
            false
        });

        self.reindex();
        stats.dangling_links = self
            .links
            .iter()
            .filter(|link| !self.resolves(&link.side_a) || !self.resolves(&link.side_b))
            .count();

        if !stats.dropped_documents.is_empty() || !stats.dropped_highlights.is_empty() {
            warn!(
                "event=prune module=graph status=ok unlinked_documents={} unlinked_highlights={} dangling_links={}",
                stats.dropped_documents.len(),
                stats.dropped_highlights.len(),
                stats.dangling_links
            );
        }
        stats
    }

    fn resolves(&self, side: &LinkSide) -> bool {
        match side.kind {
            SideKind::Document => self.document_index.contains_key(&side.uri),
            SideKind::Highlight => self.highlight_index.contains_key(&side.uri),
        }
    }

    fn reindex(&mut self) {
        self.document_index = self
            .documents
            .iter()
            .enumerate()
            .map(|(idx, document)| (document.uri.clone(), DocumentId(idx)))
            .collect();
        self.highlight_index = self
            .highlights
            .iter()
            .enumerate()
            .map(|(idx, highlight)| (highlight.uri.clone(), HighlightId(idx)))
            .collect();
    }
}
