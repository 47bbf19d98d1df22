//! Store route handlers.
//!
//! Each user owns at most one store. Reads are public; every mutation checks
//! ownership before touching the row.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::{Slug, StoreId};

use crate::db::orders::OrderRepository;
use crate::db::products::ProductRepository;
use crate::db::stores::{StoreInput, StoreRepository};
use crate::error::{AppError, Result};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::CurrentUser;
use crate::models::store::Store;
use crate::routes::products::ProductRequest;
use crate::state::AppState;

/// Store create/update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub address: Option<serde_json::Value>,
}

impl StoreRequest {
    fn into_input(self) -> Result<StoreInput> {
        let slug = Slug::parse(&self.slug).map_err(|e| AppError::BadRequest(e.to_string()))?;

        if self.name.trim().is_empty() {
            return Err(AppError::BadRequest("store name is required".to_string()));
        }

        Ok(StoreInput {
            name: self.name,
            slug,
            description: self.description,
            email: self.email,
            phone: self.phone,
            website: self.website,
            logo_url: self.logo_url,
            banner_url: self.banner_url,
            address: self.address,
        })
    }
}

/// Active stores with their product counts.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stores = StoreRepository::new(state.pool()).list_active().await?;
    Ok(Json(json!({ "stores": stores })))
}

/// Create the caller's store.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<StoreRequest>,
) -> Result<impl IntoResponse> {
    let repo = StoreRepository::new(state.pool());

    if repo.get_by_owner(user.id).await?.is_some() {
        return Err(AppError::Conflict("You already have a store".to_string()));
    }

    let input = body.into_input()?;
    let store = repo.create(user.id, &input).await?;
    tracing::info!(store_id = %store.id, user_id = %user.id, "Store created");

    Ok((StatusCode::CREATED, Json(json!({ "store": store }))))
}

/// The caller's store.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let store = StoreRepository::new(state.pool())
        .get_by_owner(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

    Ok(Json(json!({ "store": store })))
}

/// Store detail by ID.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<impl IntoResponse> {
    let store = StoreRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

    Ok(Json(json!({ "store": store })))
}

/// Store detail by slug.
pub async fn show_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let slug = Slug::parse(&slug).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let store = StoreRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

    Ok(Json(json!({ "store": store })))
}

/// Update the caller's store.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<StoreId>,
    Json(body): Json<StoreRequest>,
) -> Result<impl IntoResponse> {
    owned_store(&state, &user, id).await?;

    let input = body.into_input()?;
    let store = StoreRepository::new(state.pool()).update(id, &input).await?;

    Ok(Json(json!({ "store": store })))
}

/// Deactivate the caller's store. Order history survives.
pub async fn deactivate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<StoreId>,
) -> Result<impl IntoResponse> {
    owned_store(&state, &user, id).await?;

    StoreRepository::new(state.pool()).deactivate(id).await?;
    tracing::info!(store_id = %id, "Store deactivated");

    Ok(Json(json!({ "message": "Store deactivated" })))
}

/// A store's catalog. Owners see every product, everyone else only active
/// ones.
pub async fn list_products(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<StoreId>,
) -> Result<impl IntoResponse> {
    let store = StoreRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

    let is_owner = user.is_some_and(|u| u.id == store.user_id);

    let mut products = ProductRepository::new(state.pool())
        .list_for_store(id)
        .await?;
    if !is_owner {
        products.retain(|p| p.is_active);
    }

    Ok(Json(json!({ "products": products })))
}

/// Add a product to the caller's store.
pub async fn create_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<StoreId>,
    Json(body): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    owned_store(&state, &user, id).await?;

    let input = body.into_input()?;
    let product = ProductRepository::new(state.pool()).create(id, &input).await?;
    tracing::info!(product_id = %product.id, store_id = %id, "Product created");

    Ok((StatusCode::CREATED, Json(json!({ "product": product }))))
}

/// A store's incoming orders, owner only.
pub async fn list_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<StoreId>,
) -> Result<impl IntoResponse> {
    owned_store(&state, &user, id).await?;

    let orders = OrderRepository::new(state.pool()).list_for_store(id).await?;
    Ok(Json(json!({ "orders": orders })))
}

/// Load a store and confirm the caller owns it.
pub(super) async fn owned_store(
    state: &AppState,
    user: &CurrentUser,
    id: StoreId,
) -> Result<Store> {
    let store = StoreRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store".to_string()))?;

    if store.user_id != user.id {
        return Err(AppError::Forbidden(
            "You do not own this store".to_string(),
        ));
    }

    Ok(store)
}
