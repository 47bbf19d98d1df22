//! Knowledge-graph relation route handlers.
//!
//! Relations are action edges: an agent entity performed a Schema.org
//! Action on an object entity. Proofs and witnesses attach evidence.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::{EntityId, RelationId};

use crate::db::graph::{GraphRepository, RelationInput};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

/// Relation list query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Filter by Schema.org Action type name.
    #[serde(rename = "type")]
    pub relation_type: Option<String>,
    /// Filter to relations touching this entity as agent or object.
    pub entity_id: Option<EntityId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Relation create request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRequest {
    pub relation_type: String,
    pub agent_id: EntityId,
    pub object_id: EntityId,
    pub location_id: Option<EntityId>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub context: Option<serde_json::Value>,
    pub trust_score: Option<i32>,
}

/// Proof attachment request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequest {
    pub proof_type: String,
    pub url: Option<String>,
    pub hash: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Witness attachment request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WitnessRequest {
    pub entity_id: EntityId,
}

impl RelationRequest {
    fn into_input(self) -> Result<RelationInput> {
        if self.relation_type.trim().is_empty() {
            return Err(AppError::BadRequest(
                "relationType is required".to_string(),
            ));
        }
        if self.agent_id == self.object_id {
            return Err(AppError::BadRequest(
                "agent and object must be different entities".to_string(),
            ));
        }
        if let Some(score) = self.trust_score
            && !(0..=100).contains(&score)
        {
            return Err(AppError::BadRequest(
                "trustScore must be between 0 and 100".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time)
            && end < start
        {
            return Err(AppError::BadRequest(
                "endTime cannot precede startTime".to_string(),
            ));
        }

        Ok(RelationInput {
            relation_type: self.relation_type,
            agent_id: self.agent_id,
            object_id: self.object_id,
            location_id: self.location_id,
            start_time: self.start_time,
            end_time: self.end_time,
            context: self.context,
            trust_score: self.trust_score,
        })
    }
}

/// List relations, optionally filtered by type or incident entity.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let relations = GraphRepository::new(state.pool())
        .list_relations(
            query.relation_type.as_deref(),
            query.entity_id,
            limit,
            offset,
        )
        .await?;

    Ok(Json(json!({
        "relations": relations,
        "limit": limit,
        "offset": offset,
    })))
}

/// Create a relation between two existing entities.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Json(body): Json<RelationRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let relation = GraphRepository::new(state.pool())
        .create_relation(&input)
        .await?;

    tracing::info!(
        relation_id = %relation.id,
        relation_type = %relation.relation_type,
        "Relation created"
    );

    Ok((StatusCode::CREATED, Json(json!({ "relation": relation }))))
}

/// A relation with its proofs and witnesses.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<RelationId>,
) -> Result<impl IntoResponse> {
    let detail = GraphRepository::new(state.pool())
        .get_relation_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Relation".to_string()))?;

    Ok(Json(json!({ "relation": detail })))
}

/// Delete a relation. Its proofs and witnesses cascade.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<RelationId>,
) -> Result<impl IntoResponse> {
    if !GraphRepository::new(state.pool())
        .delete_relation(id)
        .await?
    {
        return Err(AppError::NotFound("Relation".to_string()));
    }

    Ok(Json(json!({ "message": "Relation deleted" })))
}

/// Attach evidence to a relation.
pub async fn add_proof(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<RelationId>,
    Json(body): Json<ProofRequest>,
) -> Result<impl IntoResponse> {
    if body.proof_type.trim().is_empty() {
        return Err(AppError::BadRequest("proofType is required".to_string()));
    }
    if body.url.is_none() && body.hash.is_none() {
        return Err(AppError::BadRequest(
            "a proof needs a url or a hash".to_string(),
        ));
    }

    let repo = GraphRepository::new(state.pool());
    repo.get_relation_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Relation".to_string()))?;

    let proof = repo
        .add_proof(
            id,
            &body.proof_type,
            body.url.as_deref(),
            body.hash.as_deref(),
            body.metadata.as_ref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "proof": proof }))))
}

/// Record an entity witnessing a relation.
pub async fn add_witness(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<RelationId>,
    Json(body): Json<WitnessRequest>,
) -> Result<impl IntoResponse> {
    let repo = GraphRepository::new(state.pool());
    repo.get_relation_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Relation".to_string()))?;

    let witness = repo.add_witness(id, body.entity_id).await?;

    Ok((StatusCode::CREATED, Json(json!({ "witness": witness }))))
}
