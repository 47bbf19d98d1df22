//! Cached ontology access and lazy tree expansion.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use super::client::OntologyIndex;
use super::types::{LazyNode, SearchResult, TypeSummary};
use super::SchemaOrgError;
use crate::config::SchemaOrgConfig;

/// The vocabulary document is one logical value; the cache holds a single
/// entry whose TTL drives refetching.
const INDEX_KEY: u8 = 0;

/// Cached, lazily refreshed view of the schema.org vocabulary.
#[derive(Clone)]
pub struct SchemaOrgService {
    http: reqwest::Client,
    document_url: String,
    cache: Cache<u8, Arc<OntologyIndex>>,
}

impl SchemaOrgService {
    /// Create a service fetching from the configured document URL.
    #[must_use]
    pub fn new(config: &SchemaOrgConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.cache_ttl_secs))
            .build();

        Self {
            http: reqwest::Client::new(),
            document_url: config.document_url.clone(),
            cache,
        }
    }

    /// Get the index, fetching the document if the cache is cold.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::Http` or `MalformedDocument` on fetch
    /// failure; a cached index keeps serving until its TTL lapses.
    pub async fn index(&self) -> Result<Arc<OntologyIndex>, SchemaOrgError> {
        if let Some(index) = self.cache.get(&INDEX_KEY).await {
            return Ok(index);
        }

        tracing::info!(url = %self.document_url, "Fetching schema.org vocabulary");
        let index = Arc::new(OntologyIndex::fetch(&self.http, &self.document_url).await?);
        tracing::info!(nodes = index.len(), "Indexed schema.org vocabulary");

        self.cache.insert(INDEX_KEY, Arc::clone(&index)).await;
        Ok(index)
    }

    /// The root of the explorer tree: `Thing` with its direct children as
    /// unexpanded stubs.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError` if the vocabulary cannot be loaded.
    pub async fn hierarchy_root(&self) -> Result<LazyNode, SchemaOrgError> {
        let index = self.index().await?;
        build_node(&index, "Thing")
    }

    /// Expand one type into a node with child stubs.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::TypeNotFound` for unknown types.
    pub async fn expand(&self, name: &str) -> Result<LazyNode, SchemaOrgError> {
        let index = self.index().await?;
        build_node(&index, name)
    }

    /// The sorted child stubs of one type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::TypeNotFound` for unknown types.
    pub async fn children(&self, name: &str) -> Result<Vec<LazyNode>, SchemaOrgError> {
        let index = self.index().await?;
        let hierarchy = index.hierarchy(name)?;
        let parent = TypeSummary {
            name: hierarchy.name,
            id: hierarchy.id,
        };
        Ok(child_stubs(&index, &hierarchy.children, &parent))
    }

    /// Search the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError` if the vocabulary cannot be loaded.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, SchemaOrgError> {
        let index = self.index().await?;
        Ok(index.search(query, limit))
    }
}

fn build_node(index: &OntologyIndex, name: &str) -> Result<LazyNode, SchemaOrgError> {
    let schema_type = index.get_type(name)?;
    let hierarchy = index.hierarchy(name)?;
    let properties = index.properties(name, false)?;

    let parent = TypeSummary {
        name: schema_type.name.clone(),
        id: schema_type.id.clone(),
    };
    let children = child_stubs(index, &hierarchy.children, &parent);

    Ok(LazyNode {
        id: schema_type.id,
        name: schema_type.name,
        description: schema_type.description,
        parent_types: hierarchy.parents,
        children_count: children.len(),
        properties_count: properties.len(),
        children: Some(children),
    })
}

/// Unexpanded children, each carrying its own child count so the client
/// knows whether it expands further. Folders sort before leaves, then
/// alphabetically.
fn child_stubs(
    index: &OntologyIndex,
    children: &[TypeSummary],
    parent: &TypeSummary,
) -> Vec<LazyNode> {
    let mut stubs: Vec<LazyNode> = children
        .iter()
        .map(|child| {
            let grandchildren = index.subtypes(&child.id).len();
            LazyNode {
                id: child.id.clone(),
                name: child.name.clone(),
                description: String::new(),
                parent_types: vec![parent.clone()],
                children_count: grandchildren,
                properties_count: 0,
                children: None,
            }
        })
        .collect();

    stubs.sort_by(|a, b| {
        let a_folder = a.children_count > 0;
        let b_folder = b.children_count > 0;
        b_folder
            .cmp(&a_folder)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });

    stubs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> OntologyIndex {
        OntologyIndex::from_document(&json!({
            "@graph": [
                {
                    "@id": "schema:Thing",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Thing",
                    "rdfs:comment": "Root."
                },
                {
                    "@id": "schema:Zebra",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Zebra",
                    "rdfs:comment": "A leaf.",
                    "rdfs:subClassOf": { "@id": "schema:Thing" }
                },
                {
                    "@id": "schema:Action",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Action",
                    "rdfs:comment": "A folder.",
                    "rdfs:subClassOf": { "@id": "schema:Thing" }
                },
                {
                    "@id": "schema:BuyAction",
                    "@type": "rdfs:Class",
                    "rdfs:label": "BuyAction",
                    "rdfs:comment": "A child of Action.",
                    "rdfs:subClassOf": { "@id": "schema:Action" }
                },
                {
                    "@id": "schema:Apple",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Apple",
                    "rdfs:comment": "Another leaf.",
                    "rdfs:subClassOf": { "@id": "schema:Thing" }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_build_node_counts() {
        let node = build_node(&index(), "Thing").unwrap();
        assert_eq!(node.name, "Thing");
        assert_eq!(node.children_count, 3);

        let children = node.children.unwrap();
        assert!(children.iter().all(|c| c.children.is_none()));
    }

    #[test]
    fn test_children_sort_folders_first_then_alphabetical() {
        let node = build_node(&index(), "Thing").unwrap();
        let names: Vec<String> = node
            .children
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();

        // Action has a subtype so it leads; Apple and Zebra follow
        // alphabetically.
        assert_eq!(names, vec!["Action", "Apple", "Zebra"]);
    }

    #[test]
    fn test_stub_carries_grandchild_count() {
        let node = build_node(&index(), "Thing").unwrap();
        let children = node.children.unwrap();
        let action = children.iter().find(|c| c.name == "Action").unwrap();
        assert_eq!(action.children_count, 1);
        assert_eq!(action.parent_types[0].name, "Thing");
    }

    #[test]
    fn test_expand_leaf() {
        let node = build_node(&index(), "Zebra").unwrap();
        assert_eq!(node.children_count, 0);
        assert_eq!(node.parent_types[0].name, "Thing");
        assert_eq!(node.children.unwrap().len(), 0);
    }
}
