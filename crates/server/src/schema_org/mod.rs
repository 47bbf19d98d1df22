//! Schema.org ontology explorer.
//!
//! Fetches the published JSON-LD vocabulary, indexes it in memory, and
//! serves type lookups, subtree expansion, and search. The index is
//! rebuilt from the network only when the cache TTL lapses.

mod client;
mod service;
mod types;

pub use client::OntologyIndex;
pub use service::SchemaOrgService;
pub use types::{LazyNode, PropertySummary, SchemaType, SearchResult, TypeHierarchy, TypeSummary};

use thiserror::Error;

/// Errors from the ontology loader.
#[derive(Debug, Error)]
pub enum SchemaOrgError {
    /// Fetching the vocabulary document failed.
    #[error("ontology fetch failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The document did not have the expected JSON-LD shape.
    #[error("malformed ontology document: {0}")]
    MalformedDocument(String),

    /// The requested type is not in the vocabulary.
    #[error("type '{0}' not found")]
    TypeNotFound(String),
}
