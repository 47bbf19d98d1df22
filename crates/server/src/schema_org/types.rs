//! Response shapes for the ontology explorer.

use serde::Serialize;

/// A type reference: name plus its `@id` in the vocabulary.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeSummary {
    pub name: String,
    pub id: String,
}

/// A fully described vocabulary type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaType {
    pub name: String,
    pub description: String,
    pub id: String,
    pub url: String,
    pub super_types: Vec<TypeSummary>,
}

/// A type with its direct parents and children.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeHierarchy {
    pub name: String,
    pub id: String,
    pub parents: Vec<TypeSummary>,
    pub children: Vec<TypeSummary>,
}

/// A property attached to a type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub name: String,
    pub description: String,
    pub id: String,
    pub expected_types: Vec<String>,
    /// Set when the property comes from a supertype.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherited_from: Option<String>,
}

/// A tree node for progressive exploration.
///
/// `children` is present only when the node has been expanded; until then
/// `children_count` tells the client whether to render an expander.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parent_types: Vec<TypeSummary>,
    pub children_count: usize,
    pub properties_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<LazyNode>>,
}

/// A search hit over type labels and descriptions.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub name: String,
    pub description: String,
    pub id: String,
    pub url: String,
}
