//! Entity store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Reset the six collections at the start of a run.
//! - Persist a converted graph and read it back for downstream consumers.
//!
//! # Invariants
//! - `write_graph` is all-or-nothing.
//! - Read paths reject rows that do not decode instead of masking them.
//!
//! # See also
//! - `crate::db::migrations` for the table layout.

use crate::db::{migrations, DbError};
use crate::model::entity::{
    Document, DocumentKind, Highlight, HighlightKind, Image, Link, LinkSide, ParentKind, Project,
    SideKind, User,
};
use crate::model::graph::ConvertedGraph;
use log::info;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A persisted row could not be decoded.
    InvalidData(String),
    /// A list field could not be encoded as JSON.
    Encode(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "store error: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Encode(err) => write!(f, "cannot encode list field: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// The six persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Projects,
    Documents,
    Images,
    Highlights,
    Links,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Users,
        Collection::Projects,
        Collection::Documents,
        Collection::Images,
        Collection::Highlights,
        Collection::Links,
    ];

    pub fn table(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
            Self::Documents => "documents",
            Self::Images => "images",
            Self::Highlights => "highlights",
            Self::Links => "links",
        }
    }
}

/// Row counts of every collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionCounts {
    pub users: usize,
    pub projects: usize,
    pub documents: usize,
    pub images: usize,
    pub highlights: usize,
    pub links: usize,
}

impl CollectionCounts {
    pub fn get(&self, collection: Collection) -> usize {
        match collection {
            Collection::Users => self.users,
            Collection::Projects => self.projects,
            Collection::Documents => self.documents,
            Collection::Images => self.images,
            Collection::Highlights => self.highlights,
            Collection::Links => self.links,
        }
    }
}

/// A link as read back from the store, with its assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLink {
    pub id: i64,
    pub link: Link,
}

/// Store interface used by the conversion service.
pub trait GraphStore {
    /// Drops every collection and recreates the empty schema.
    fn reset(&self) -> StoreResult<()>;
    /// Inserts every collection of `graph` in arena order.
    fn write_graph(&self, graph: &ConvertedGraph) -> StoreResult<()>;
    fn list_users(&self) -> StoreResult<Vec<User>>;
    fn list_projects(&self) -> StoreResult<Vec<Project>>;
    fn list_documents(&self) -> StoreResult<Vec<Document>>;
    fn list_images(&self) -> StoreResult<Vec<Image>>;
    fn list_highlights(&self) -> StoreResult<Vec<Highlight>>;
    fn list_links(&self) -> StoreResult<Vec<StoredLink>>;
    fn count(&self, collection: Collection) -> StoreResult<usize>;

    fn counts(&self) -> StoreResult<CollectionCounts> {
        Ok(CollectionCounts {
            users: self.count(Collection::Users)?,
            projects: self.count(Collection::Projects)?,
            documents: self.count(Collection::Documents)?,
            images: self.count(Collection::Images)?,
            highlights: self.count(Collection::Highlights)?,
            links: self.count(Collection::Links)?,
        })
    }
}

/// SQLite-backed entity store.
pub struct SqliteGraphStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGraphStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl GraphStore for SqliteGraphStore<'_> {
    fn reset(&self) -> StoreResult<()> {
        migrations::reset_schema(self.conn)?;
        info!("event=store_reset module=repo status=ok");
        Ok(())
    }

    fn write_graph(&self, graph: &ConvertedGraph) -> StoreResult<()> {
        let started_at = Instant::now();
        let tx = self.conn.unchecked_transaction()?;

        for user in graph.users() {
            tx.execute(
                "INSERT INTO users (uri, name, email) VALUES (?1, ?2, ?3);",
                params![user.uri, user.name, user.email],
            )?;
        }
        for project in graph.projects() {
            tx.execute(
                "INSERT INTO projects (uri, name, owner_uri, description, document_uris)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    project.uri,
                    project.name,
                    project.owner_uri,
                    project.description,
                    encode_list(&project.document_uris)?,
                ],
            )?;
        }
        for document in graph.documents() {
            tx.execute(
                "INSERT INTO documents (
                    uri,
                    name,
                    document_kind,
                    content,
                    search_text,
                    width,
                    height,
                    image_uris,
                    project_uri,
                    parent_uri,
                    parent_kind
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    document.uri,
                    document.name,
                    document_kind_to_db(document.kind),
                    document.content,
                    document.search_text,
                    document.width,
                    document.height,
                    encode_list(&document.image_uris)?,
                    document.project_uri,
                    document.parent_uri,
                    document.parent_kind.map(parent_kind_to_db),
                ],
            )?;
        }
        for image in graph.images() {
            tx.execute(
                "INSERT INTO images (uri, filename) VALUES (?1, ?2);",
                params![image.uri, image.filename],
            )?;
        }
        for highlight in graph.highlights() {
            tx.execute(
                "INSERT INTO highlights (uri, kind, excerpt, color, target, document_uri)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    highlight.uri,
                    highlight_kind_to_db(highlight.kind),
                    highlight.excerpt,
                    highlight.color,
                    highlight.target,
                    highlight.document_uri,
                ],
            )?;
        }
        for link in graph.links() {
            tx.execute(
                "INSERT INTO links (side_a_uri, side_a_kind, side_b_uri, side_b_kind)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    link.side_a.uri,
                    side_kind_to_db(link.side_a.kind),
                    link.side_b.uri,
                    side_kind_to_db(link.side_b.kind),
                ],
            )?;
        }

        tx.commit()?;
        info!(
            "event=store_write module=repo status=ok users={} projects={} documents={} images={} highlights={} links={} duration_ms={}",
            graph.users().len(),
            graph.projects().len(),
            graph.documents().len(),
            graph.images().len(),
            graph.highlights().len(),
            graph.links().len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        self.collect("SELECT uri, name, email FROM users ORDER BY rowid;", |row| {
            Ok(User {
                uri: row.get("uri")?,
                name: row.get("name")?,
                email: row.get("email")?,
            })
        })
    }

    fn list_projects(&self) -> StoreResult<Vec<Project>> {
        self.collect(
            "SELECT uri, name, owner_uri, description, document_uris
             FROM projects ORDER BY rowid;",
            |row| {
                Ok(Project {
                    uri: row.get("uri")?,
                    name: row.get("name")?,
                    owner_uri: row.get("owner_uri")?,
                    description: row.get("description")?,
                    document_uris: decode_list(row, "projects.document_uris")?,
                })
            },
        )
    }

    fn list_documents(&self) -> StoreResult<Vec<Document>> {
        self.collect(
            "SELECT
                uri,
                name,
                document_kind,
                content,
                search_text,
                width,
                height,
                image_uris,
                project_uri,
                parent_uri,
                parent_kind
             FROM documents ORDER BY rowid;",
            parse_document_row,
        )
    }

    fn list_images(&self) -> StoreResult<Vec<Image>> {
        self.collect("SELECT uri, filename FROM images ORDER BY rowid;", |row| {
            Ok(Image {
                uri: row.get("uri")?,
                filename: row.get("filename")?,
            })
        })
    }

    fn list_highlights(&self) -> StoreResult<Vec<Highlight>> {
        self.collect(
            "SELECT uri, kind, excerpt, color, target, document_uri
             FROM highlights ORDER BY rowid;",
            |row| {
                let kind_text: String = row.get("kind")?;
                let kind = parse_highlight_kind(&kind_text).ok_or_else(|| {
                    StoreError::InvalidData(format!(
                        "invalid highlight kind `{kind_text}` in highlights.kind"
                    ))
                })?;
                Ok(Highlight {
                    uri: row.get("uri")?,
                    kind,
                    excerpt: row.get("excerpt")?,
                    color: row.get("color")?,
                    target: row.get("target")?,
                    document_uri: row.get("document_uri")?,
                })
            },
        )
    }

    fn list_links(&self) -> StoreResult<Vec<StoredLink>> {
        self.collect(
            "SELECT id, side_a_uri, side_a_kind, side_b_uri, side_b_kind
             FROM links ORDER BY id;",
            |row| {
                Ok(StoredLink {
                    id: row.get("id")?,
                    link: Link {
                        side_a: parse_side(row, "side_a_uri", "side_a_kind")?,
                        side_b: parse_side(row, "side_b_uri", "side_b_kind")?,
                    },
                })
            },
        )
    }

    fn count(&self, collection: Collection) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", collection.table()),
            [],
            |row| row.get(0),
        )?;
        usize::try_from(count).map_err(|_| {
            StoreError::InvalidData(format!("negative row count in {}", collection.table()))
        })
    }
}

impl SqliteGraphStore<'_> {
    fn collect<T>(
        &self,
        sql: &str,
        parse: impl Fn(&Row<'_>) -> StoreResult<T>,
    ) -> StoreResult<Vec<T>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse(row)?);
        }
        Ok(items)
    }
}

fn parse_document_row(row: &Row<'_>) -> StoreResult<Document> {
    let kind_text: String = row.get("document_kind")?;
    let kind = parse_document_kind(&kind_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid document kind `{kind_text}` in documents.document_kind"
        ))
    })?;

    let parent_kind = match row.get::<_, Option<String>>("parent_kind")? {
        Some(value) => Some(parse_parent_kind(&value).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "invalid parent kind `{value}` in documents.parent_kind"
            ))
        })?),
        None => None,
    };

    Ok(Document {
        uri: row.get("uri")?,
        name: row.get("name")?,
        kind,
        content: row.get("content")?,
        search_text: row.get("search_text")?,
        width: decode_dimension(row, "width")?,
        height: decode_dimension(row, "height")?,
        image_uris: decode_list(row, "documents.image_uris")?,
        project_uri: row.get("project_uri")?,
        parent_uri: row.get("parent_uri")?,
        parent_kind,
    })
}

fn parse_side(row: &Row<'_>, uri_column: &str, kind_column: &str) -> StoreResult<LinkSide> {
    let kind_text: String = row.get(kind_column)?;
    let kind = parse_side_kind(&kind_text).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid side kind `{kind_text}` in links.{kind_column}"))
    })?;
    Ok(LinkSide {
        uri: row.get(uri_column)?,
        kind,
    })
}

fn encode_list(values: &[String]) -> StoreResult<String> {
    serde_json::to_string(values).map_err(StoreError::Encode)
}

/// Decodes a JSON list column named `table.column`.
fn decode_list(row: &Row<'_>, qualified: &str) -> StoreResult<Vec<String>> {
    let column = qualified.rsplit('.').next().unwrap_or(qualified);
    let text: String = row.get(column)?;
    serde_json::from_str(&text)
        .map_err(|err| StoreError::InvalidData(format!("invalid JSON list in {qualified}: {err}")))
}

fn decode_dimension(row: &Row<'_>, column: &str) -> StoreResult<Option<u32>> {
    match row.get::<_, Option<i64>>(column)? {
        Some(value) => u32::try_from(value).map(Some).map_err(|_| {
            StoreError::InvalidData(format!("invalid {column} `{value}` in documents.{column}"))
        }),
        None => Ok(None),
    }
}

fn document_kind_to_db(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Text => "text",
        DocumentKind::Canvas => "canvas",
    }
}

fn parse_document_kind(value: &str) -> Option<DocumentKind> {
    match value {
        "text" => Some(DocumentKind::Text),
        "canvas" => Some(DocumentKind::Canvas),
        _ => None,
    }
}

fn parent_kind_to_db(kind: ParentKind) -> &'static str {
    match kind {
        ParentKind::Project => "Project",
        ParentKind::Document => "Document",
    }
}

fn parse_parent_kind(value: &str) -> Option<ParentKind> {
    match value {
        "Project" => Some(ParentKind::Project),
        "Document" => Some(ParentKind::Document),
        _ => None,
    }
}

fn highlight_kind_to_db(kind: HighlightKind) -> &'static str {
    match kind {
        HighlightKind::Vector => "vector",
        HighlightKind::TextQuote => "text_quote",
    }
}

fn parse_highlight_kind(value: &str) -> Option<HighlightKind> {
    match value {
        "vector" => Some(HighlightKind::Vector),
        "text_quote" => Some(HighlightKind::TextQuote),
        _ => None,
    }
}

fn side_kind_to_db(kind: SideKind) -> &'static str {
    match kind {
        SideKind::Document => "Document",
        SideKind::Highlight => "Highlight",
    }
}

fn parse_side_kind(value: &str) -> Option<SideKind> {
    match value {
        "Document" => Some(SideKind::Document),
        "Highlight" => Some(SideKind::Highlight),
        _ => None,
    }
}
