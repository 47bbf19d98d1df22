//! Schema.org explorer route handlers.
//!
//! Serves the vocabulary as a lazily expanded tree: the hierarchy endpoint
//! returns `Thing` with child stubs, and clients expand one node at a time.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::schema_org::SchemaOrgError;
use crate::state::AppState;

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// The root of the type tree: `Thing` with unexpanded children.
pub async fn hierarchy(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let root = state.schema_org().hierarchy_root().await?;
    Ok(Json(json!({ "root": root })))
}

/// One type, expanded with child stubs and its direct properties counted.
pub async fn expand_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let node = state
        .schema_org()
        .expand(&name)
        .await
        .map_err(not_found_or_upstream)?;

    Ok(Json(json!({ "type": node })))
}

/// A type's child stubs, folders first then alphabetical.
pub async fn children(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let children = state
        .schema_org()
        .children(&name)
        .await
        .map_err(not_found_or_upstream)?;

    Ok(Json(json!({ "children": children })))
}

/// Search types by name or description.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let q = query.q.trim();
    if q.is_empty() {
        return Err(AppError::BadRequest("q is required".to_string()));
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let results = state.schema_org().search(q, limit).await?;
    Ok(Json(json!({ "results": results })))
}

/// Unknown type names are the client's mistake, everything else is ours.
fn not_found_or_upstream(err: SchemaOrgError) -> AppError {
    match err {
        SchemaOrgError::TypeNotFound(name) => AppError::NotFound(format!("Type '{name}'")),
        other => AppError::SchemaOrg(other),
    }
}
