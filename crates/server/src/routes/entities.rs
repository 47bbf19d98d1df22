//! Knowledge-graph entity route handlers.
//!
//! Entities are Schema.org-typed nodes; reads are public, writes require a
//! session so every node has an accountable author.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::EntityId;

use crate::db::graph::{EntityInput, GraphRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

/// Entity list query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Filter by Schema.org type name.
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Entity create/update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRequest {
    pub entity_type: String,
    #[serde(default = "empty_object")]
    pub properties: serde_json::Value,
    pub trust_score: Option<i32>,
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

impl EntityRequest {
    fn into_input(self) -> Result<EntityInput> {
        if self.entity_type.trim().is_empty() {
            return Err(AppError::BadRequest("entityType is required".to_string()));
        }
        if let Some(score) = self.trust_score
            && !(0..=100).contains(&score)
        {
            return Err(AppError::BadRequest(
                "trustScore must be between 0 and 100".to_string(),
            ));
        }
        if !self.properties.is_object() {
            return Err(AppError::BadRequest(
                "properties must be an object".to_string(),
            ));
        }

        Ok(EntityInput {
            entity_type: self.entity_type,
            properties: self.properties,
            trust_score: self.trust_score,
        })
    }
}

/// List entities, optionally filtered by type.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let entities = GraphRepository::new(state.pool())
        .list_entities(query.entity_type.as_deref(), limit, offset)
        .await?;

    Ok(Json(json!({
        "entities": entities,
        "limit": limit,
        "offset": offset,
    })))
}

/// Create an entity.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<EntityRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let entity = GraphRepository::new(state.pool())
        .create_entity(&input, Some(user.id))
        .await?;

    tracing::info!(entity_id = %entity.id, entity_type = %entity.entity_type, "Entity created");

    Ok((StatusCode::CREATED, Json(json!({ "entity": entity }))))
}

/// An entity with its incident relations and verifications.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> Result<impl IntoResponse> {
    let detail = GraphRepository::new(state.pool())
        .get_entity_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Entity".to_string()))?;

    Ok(Json(json!({ "entity": detail })))
}

/// Replace an entity's type, properties, and trust score.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<EntityId>,
    Json(body): Json<EntityRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let entity = GraphRepository::new(state.pool())
        .update_entity(id, &input)
        .await?;

    Ok(Json(json!({ "entity": entity })))
}

/// Delete an entity. Incident relations cascade.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<EntityId>,
) -> Result<impl IntoResponse> {
    if !GraphRepository::new(state.pool()).delete_entity(id).await? {
        return Err(AppError::NotFound("Entity".to_string()));
    }

    tracing::info!(entity_id = %id, "Entity deleted");

    Ok(Json(json!({ "message": "Entity deleted" })))
}
