//! Shipping address route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use mercantia_core::AddressId;

use crate::db::addresses::{AddressInput, AddressRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Address create/update request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

fn default_country() -> String {
    "BR".to_string()
}

impl AddressRequest {
    fn into_input(self) -> Result<AddressInput> {
        for (field, value) in [
            ("fullName", &self.full_name),
            ("street", &self.street),
            ("city", &self.city),
            ("zipCode", &self.zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::BadRequest(format!("{field} is required")));
            }
        }

        Ok(AddressInput {
            full_name: self.full_name,
            phone: self.phone,
            email: self.email,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            is_default: self.is_default,
        })
    }
}

/// The caller's address book, default first.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(json!({ "addresses": addresses })))
}

/// Add an address to the caller's book.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let address = AddressRepository::new(state.pool())
        .create(user.id, &input)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "address": address }))))
}

/// Update one of the caller's addresses.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let input = body.into_input()?;
    let address = AddressRepository::new(state.pool())
        .update(user.id, id, &input)
        .await?;

    Ok(Json(json!({ "address": address })))
}

/// Delete one of the caller's addresses.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<AddressId>,
) -> Result<impl IntoResponse> {
    if !AddressRepository::new(state.pool())
        .delete(user.id, id)
        .await?
    {
        return Err(AppError::NotFound("Shipping address".to_string()));
    }

    Ok(Json(json!({ "message": "Address deleted" })))
}
