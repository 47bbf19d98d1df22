//! Knowledge-graph overlay: Schema.org typed nodes and action edges.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use mercantia_core::{EntityId, RelationId, UserId};

/// A Schema.org-typed node (e.g. `Person`, `Product`, `Organization`).
///
/// `properties` holds the node's Schema.org payload verbatim as JSON.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    /// Schema.org type name.
    pub entity_type: String,
    pub properties: serde_json::Value,
    /// 0-100 confidence in the node's claims.
    pub trust_score: Option<i32>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An action edge between two entities (e.g. `BuyAction`).
///
/// Triple structure: the `agent` performed the action on the `object`,
/// optionally at a `location`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: RelationId,
    /// Schema.org Action type name.
    pub relation_type: String,
    pub agent_id: EntityId,
    pub object_id: EntityId,
    pub location_id: Option<EntityId>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub context: Option<serde_json::Value>,
    pub trust_score: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Evidence attached to a relation (photo, receipt, document, chain anchor).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub id: Uuid,
    pub relation_id: RelationId,
    pub proof_type: String,
    pub url: Option<String>,
    pub hash: Option<String>,
    pub verified_by: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// An entity attesting that a relation happened.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Witness {
    pub id: Uuid,
    pub relation_id: RelationId,
    pub entity_id: EntityId,
    pub witnessed_at: DateTime<Utc>,
}

/// An identity/attribute verification attached to an entity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub id: Uuid,
    pub entity_id: EntityId,
    /// e.g. `government_id`, `email`.
    pub method: String,
    /// The verifying authority.
    pub verified_by: String,
    pub verified_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub proof: Option<serde_json::Value>,
}

/// A relation with its proofs and witnesses, for detail responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDetail {
    #[serde(flatten)]
    pub relation: Relation,
    pub proofs: Vec<Proof>,
    pub witnesses: Vec<Witness>,
}

/// An entity with its incident edges and verifications.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetail {
    #[serde(flatten)]
    pub entity: Entity,
    pub relations_as_agent: Vec<Relation>,
    pub relations_as_object: Vec<Relation>,
    pub verifications: Vec<Verification>,
}
