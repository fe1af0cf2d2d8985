//! Conversion run errors.
//!
//! Every variant is fatal: the run stops and the store keeps whatever state
//! it reached. The next run's reset is the only recovery path.

use crate::rdf::TurtleError;
use crate::repo::graph_store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type ConvertResult<T> = Result<T, ConvertError>;

#[derive(Debug)]
pub enum ConvertError {
    /// Input or export file could not be read or written.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Malformed Turtle input. Raised before the store is touched.
    Parse(TurtleError),
    /// A referenced URI has no corresponding node or entity.
    Reference { uri: String, context: String },
    /// A selector could not be decoded into a highlight.
    Decode { uri: String, message: String },
    /// Any persistence failure.
    Store(StoreError),
    /// Graph export could not be serialized.
    Export(serde_json::Error),
}

impl ConvertError {
    pub(crate) fn reference(uri: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Reference {
            uri: uri.into(),
            context: context.into(),
        }
    }

    pub(crate) fn decode(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            uri: uri.into(),
            message: message.into(),
        }
    }
}

impl Display for ConvertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot access `{}`: {source}", path.display()),
            Self::Parse(err) => write!(f, "{err}"),
            Self::Reference { uri, context } => {
                write!(f, "unresolved reference `{uri}` ({context})")
            }
            Self::Decode { uri, message } => write!(f, "cannot decode `{uri}`: {message}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "graph export failed: {err}"),
        }
    }
}

impl Error for ConvertError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Reference { .. } => None,
            Self::Decode { .. } => None,
            Self::Store(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<TurtleError> for ConvertError {
    fn from(value: TurtleError) -> Self {
        Self::Parse(value)
    }
}

impl From<StoreError> for ConvertError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(value: serde_json::Error) -> Self {
        Self::Export(value)
    }
}
