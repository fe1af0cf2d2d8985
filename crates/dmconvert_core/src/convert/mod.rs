//! Conversion stages from raw triples to the final entity graph.
//!
//! Stage order: [`materialize`], [`classify`], [`resolve`], [`linker`].
//! The decoders in [`selector`], [`svg`] and [`richtext`] are used by
//! classification.

pub mod classify;
pub mod linker;
pub mod materialize;
pub mod resolve;
pub mod richtext;
pub mod selector;
pub mod svg;

pub use classify::{classify, Classified, ClassifyStats};
pub use linker::{link_projects, LinkerReport, ProjectLinkStats};
pub use materialize::materialize;
pub use resolve::{resolve_links, ResolveStats};
