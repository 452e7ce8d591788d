//! Error taxonomy for loading and navigating books

use std::fmt::Display;

use thiserror::Error;

use crate::ContentId;

/// Errors that can occur while loading or navigating a book
#[derive(Error, Debug)]
pub enum BookError {
    #[error("content not found: {0}")]
    ContentNotFound(ContentId),

    #[error("malformed document {origin}: {reason}")]
    MalformedDocument { origin: String, reason: String },

    #[error("{node} links to unresolved {target}")]
    Linkage { node: ContentId, target: String },

    #[error("template {template} could not be constructed: {reason}")]
    Construction { template: ContentId, reason: String },

    #[error("unknown template {0}")]
    UnknownTemplate(ContentId),

    #[error("error while building {kind} {id}: {source}")]
    Build {
        kind: &'static str,
        id: ContentId,
        #[source]
        source: Box<BookError>,
    },

    #[error("unknown entry: {0}")]
    UnknownEntry(ContentId),

    #[error("unknown book: {0}")]
    UnknownBook(ContentId),

    #[error("{registry} registry is frozen, cannot register '{key}'")]
    RegistryFrozen { registry: &'static str, key: String },

    #[error("invalid content id: {0}")]
    InvalidId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BookError {
    pub fn malformed(origin: impl Display, reason: impl Display) -> Self {
        BookError::MalformedDocument {
            origin: origin.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn building(kind: &'static str, id: &ContentId, source: BookError) -> Self {
        BookError::Build {
            kind,
            id: id.clone(),
            source: Box::new(source),
        }
    }

    /// The innermost error once `Build` wrappers are peeled off
    pub fn root_cause(&self) -> &BookError {
        match self {
            BookError::Build { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
