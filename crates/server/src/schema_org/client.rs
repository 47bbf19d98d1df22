//! In-memory index over the schema.org JSON-LD vocabulary.
//!
//! The published document is one `@graph` array of class and property
//! nodes. Nodes are indexed by `@id` and by `schema:{label}`; for the
//! vocabulary those coincide, but indexing both keeps lookups working for
//! labels that differ from their identifier.

use std::collections::HashMap;

use serde_json::Value;

use super::SchemaOrgError;
use super::types::{PropertySummary, SchemaType, SearchResult, TypeHierarchy, TypeSummary};

/// Indexed vocabulary nodes.
#[derive(Debug)]
pub struct OntologyIndex {
    nodes: Vec<Value>,
    by_id: HashMap<String, usize>,
}

impl OntologyIndex {
    /// Fetch and index the vocabulary document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::Http` on network failure and
    /// `SchemaOrgError::MalformedDocument` if the body isn't the expected
    /// JSON-LD shape.
    pub async fn fetch(http: &reqwest::Client, url: &str) -> Result<Self, SchemaOrgError> {
        let document: Value = http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Self::from_document(&document)
    }

    /// Build an index from an already parsed JSON-LD document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::MalformedDocument` if `@graph` is missing
    /// or not an array.
    pub fn from_document(document: &Value) -> Result<Self, SchemaOrgError> {
        let graph = document
            .get("@graph")
            .and_then(Value::as_array)
            .ok_or_else(|| SchemaOrgError::MalformedDocument("missing @graph array".to_string()))?;

        let mut nodes = Vec::with_capacity(graph.len());
        let mut by_id = HashMap::with_capacity(graph.len() * 2);

        for item in graph {
            let Some(id) = item.get("@id").and_then(Value::as_str) else {
                continue;
            };
            let position = nodes.len();
            by_id.insert(id.to_string(), position);
            if let Some(label) = node_label(item) {
                by_id.entry(format!("schema:{label}")).or_insert(position);
            }
            nodes.push(item.clone());
        }

        Ok(Self { nodes, by_id })
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, name: &str) -> Option<&Value> {
        let key = qualify(name);
        self.by_id.get(key.as_ref()).map(|&i| &self.nodes[i])
    }

    /// Describe a vocabulary type.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::TypeNotFound` if the name isn't indexed.
    pub fn get_type(&self, name: &str) -> Result<SchemaType, SchemaOrgError> {
        let node = self
            .node(name)
            .ok_or_else(|| SchemaOrgError::TypeNotFound(name.to_string()))?;

        let label = node_label(node).unwrap_or(name).to_string();
        Ok(SchemaType {
            url: format!("https://schema.org/{label}"),
            name: label,
            description: node_comment(node),
            id: node_id(node),
            super_types: self.super_types(node),
        })
    }

    /// A type's direct parents and children.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::TypeNotFound` if the name isn't indexed.
    pub fn hierarchy(&self, name: &str) -> Result<TypeHierarchy, SchemaOrgError> {
        let node = self
            .node(name)
            .ok_or_else(|| SchemaOrgError::TypeNotFound(name.to_string()))?;

        let id = node_id(node);
        Ok(TypeHierarchy {
            name: node_label(node).unwrap_or(name).to_string(),
            parents: self.super_types(node),
            children: self.subtypes(&id),
            id,
        })
    }

    /// Classes whose `rdfs:subClassOf` points at this `@id`.
    #[must_use]
    pub fn subtypes(&self, type_id: &str) -> Vec<TypeSummary> {
        self.nodes
            .iter()
            .filter(|node| is_class(node))
            .filter(|node| {
                refs(node.get("rdfs:subClassOf"))
                    .iter()
                    .any(|parent| parent == type_id)
            })
            .map(|node| TypeSummary {
                name: node_label(node).unwrap_or_default().to_string(),
                id: node_id(node),
            })
            .collect()
    }

    /// Properties whose domain includes this type, optionally following
    /// supertypes one level up.
    ///
    /// # Errors
    ///
    /// Returns `SchemaOrgError::TypeNotFound` if the name isn't indexed.
    pub fn properties(
        &self,
        name: &str,
        include_inherited: bool,
    ) -> Result<Vec<PropertySummary>, SchemaOrgError> {
        let node = self
            .node(name)
            .ok_or_else(|| SchemaOrgError::TypeNotFound(name.to_string()))?;
        let type_id = node_id(node);

        let mut seen = std::collections::HashSet::new();
        let mut properties = Vec::new();

        for prop in self.nodes.iter().filter(|n| is_property(n)) {
            let domains = refs(prop.get("schema:domainIncludes"));
            if domains.iter().any(|d| *d == type_id) && seen.insert(node_id(prop)) {
                properties.push(self.format_property(prop, None));
            }
        }

        if include_inherited {
            for parent in self.super_types(node) {
                for prop in self.nodes.iter().filter(|n| is_property(n)) {
                    let domains = refs(prop.get("schema:domainIncludes"));
                    if domains.iter().any(|d| *d == parent.id) && seen.insert(node_id(prop)) {
                        properties.push(self.format_property(prop, Some(parent.name.clone())));
                    }
                }
            }
        }

        properties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(properties)
    }

    /// Case-insensitive search over class labels and descriptions.
    ///
    /// Label hits rank above description-only hits.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let query = query.to_lowercase();
        let mut hits: Vec<(u8, SearchResult)> = Vec::new();

        for node in self.nodes.iter().filter(|n| is_class(n)) {
            let label = node_label(node).unwrap_or_default();
            let comment = node_comment(node);

            let label_hit = label.to_lowercase().contains(&query);
            let comment_hit = comment.to_lowercase().contains(&query);
            if !label_hit && !comment_hit {
                continue;
            }

            hits.push((
                if label_hit { 2 } else { 1 },
                SearchResult {
                    name: label.to_string(),
                    description: comment,
                    id: node_id(node),
                    url: format!("https://schema.org/{label}"),
                },
            ));
        }

        hits.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
        hits.into_iter().take(limit).map(|(_, hit)| hit).collect()
    }

    fn super_types(&self, node: &Value) -> Vec<TypeSummary> {
        refs(node.get("rdfs:subClassOf"))
            .into_iter()
            .map(|id| TypeSummary {
                name: self
                    .by_id
                    .get(&id)
                    .and_then(|&i| node_label(&self.nodes[i]))
                    .map_or_else(|| id.replace("schema:", ""), ToString::to_string),
                id,
            })
            .collect()
    }

    fn format_property(&self, prop: &Value, inherited_from: Option<String>) -> PropertySummary {
        let expected_types = refs(prop.get("schema:rangeIncludes"))
            .into_iter()
            .map(|id| {
                self.by_id
                    .get(&id)
                    .and_then(|&i| node_label(&self.nodes[i]))
                    .map_or_else(|| id.replace("schema:", ""), ToString::to_string)
            })
            .collect();

        PropertySummary {
            name: node_label(prop).unwrap_or_default().to_string(),
            description: node_comment(prop),
            id: node_id(prop),
            expected_types,
            inherited_from,
        }
    }
}

/// Qualify a bare type name with the `schema:` prefix.
fn qualify(name: &str) -> std::borrow::Cow<'_, str> {
    if name.starts_with("schema:") {
        std::borrow::Cow::Borrowed(name)
    } else {
        std::borrow::Cow::Owned(format!("schema:{name}"))
    }
}

/// Read a JSON-LD string, which may be bare or wrapped in `{"@value": ...}`.
fn ld_str(value: &Value) -> Option<&str> {
    value
        .as_str()
        .or_else(|| value.get("@value").and_then(Value::as_str))
}

fn node_id(node: &Value) -> String {
    node.get("@id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn node_label(node: &Value) -> Option<&str> {
    node.get("rdfs:label").and_then(ld_str)
}

fn node_comment(node: &Value) -> String {
    node.get("rdfs:comment")
        .and_then(ld_str)
        .unwrap_or("No description available")
        .to_string()
}

/// `@type` values, normalized to a list.
fn type_list(node: &Value) -> Vec<&str> {
    match node.get("@type") {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

fn is_class(node: &Value) -> bool {
    type_list(node).contains(&"rdfs:Class")
}

fn is_property(node: &Value) -> bool {
    type_list(node).contains(&"rdf:Property")
}

/// Normalize a reference field (`{"@id": ...}` or a list of them) to IDs.
fn refs(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Object(_)) => value
            .and_then(|v| v.get("@id"))
            .and_then(Value::as_str)
            .map(|s| vec![s.to_string()])
            .unwrap_or_default(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("@id").and_then(Value::as_str))
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Value {
        json!({
            "@graph": [
                {
                    "@id": "schema:Thing",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Thing",
                    "rdfs:comment": "The most generic type of item."
                },
                {
                    "@id": "schema:Action",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Action",
                    "rdfs:comment": "An action performed by an agent.",
                    "rdfs:subClassOf": { "@id": "schema:Thing" }
                },
                {
                    "@id": "schema:TradeAction",
                    "@type": "rdfs:Class",
                    "rdfs:label": { "@value": "TradeAction" },
                    "rdfs:comment": "Exchanging goods for money.",
                    "rdfs:subClassOf": { "@id": "schema:Action" }
                },
                {
                    "@id": "schema:Product",
                    "@type": "rdfs:Class",
                    "rdfs:label": "Product",
                    "rdfs:comment": "Anything offered for sale.",
                    "rdfs:subClassOf": [{ "@id": "schema:Thing" }]
                },
                {
                    "@id": "schema:name",
                    "@type": "rdf:Property",
                    "rdfs:label": "name",
                    "rdfs:comment": "The name of the item.",
                    "schema:domainIncludes": { "@id": "schema:Thing" },
                    "schema:rangeIncludes": { "@id": "schema:Text" }
                },
                {
                    "@id": "schema:price",
                    "@type": "rdf:Property",
                    "rdfs:label": "price",
                    "rdfs:comment": "The offer price.",
                    "schema:domainIncludes": [{ "@id": "schema:Product" }],
                    "schema:rangeIncludes": [{ "@id": "schema:Text" }]
                }
            ]
        })
    }

    #[test]
    fn test_from_document_indexes_graph() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_missing_graph_is_malformed() {
        let result = OntologyIndex::from_document(&json!({"hello": "world"}));
        assert!(matches!(result, Err(SchemaOrgError::MalformedDocument(_))));
    }

    #[test]
    fn test_get_type_by_bare_and_prefixed_name() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();

        let bare = index.get_type("Action").unwrap();
        assert_eq!(bare.name, "Action");
        assert_eq!(bare.id, "schema:Action");
        assert_eq!(bare.url, "https://schema.org/Action");
        assert_eq!(bare.super_types, vec![TypeSummary {
            name: "Thing".to_string(),
            id: "schema:Thing".to_string(),
        }]);

        let prefixed = index.get_type("schema:Action").unwrap();
        assert_eq!(prefixed.id, bare.id);
    }

    #[test]
    fn test_unknown_type() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        assert!(matches!(
            index.get_type("Nonexistent"),
            Err(SchemaOrgError::TypeNotFound(_))
        ));
    }

    #[test]
    fn test_hierarchy_children() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        let hierarchy = index.hierarchy("Thing").unwrap();

        assert!(hierarchy.parents.is_empty());
        let mut names: Vec<&str> = hierarchy.children.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Action", "Product"]);
    }

    #[test]
    fn test_wrapped_label_is_normalized() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        let trade = index.get_type("TradeAction").unwrap();
        assert_eq!(trade.name, "TradeAction");
    }

    #[test]
    fn test_direct_properties() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        let props = index.properties("Product", false).unwrap();
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].name, "price");
        assert!(props[0].inherited_from.is_none());
    }

    #[test]
    fn test_inherited_properties() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        let props = index.properties("Product", true).unwrap();

        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["name", "price"]);

        let inherited = props.iter().find(|p| p.name == "name").unwrap();
        assert_eq!(inherited.inherited_from.as_deref(), Some("Thing"));
    }

    #[test]
    fn test_search_ranks_label_hits_first() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        // "action" appears in the Action/TradeAction labels and in the
        // Action comment only for those types.
        let results = index.search("action", 10);

        assert_eq!(results[0].name, "Action");
        assert!(results.iter().any(|r| r.name == "TradeAction"));
    }

    #[test]
    fn test_search_respects_limit() {
        let index = OntologyIndex::from_document(&fixture()).unwrap();
        assert_eq!(index.search("a", 1).len(), 1);
    }
}
