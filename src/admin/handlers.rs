use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    admin::dto::{CreateProductRequest, UpdateUserRequest},
    auth::{extractors::AdminUser, repo::User},
    error::ApiError,
    extract::{ApiJson, ApiPath},
    products::repo::{NewProduct, Product, ProductPatch},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/products", post(create_product))
        .route(
            "/admin/products/:id",
            put(update_product).delete(delete_product),
        )
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", put(update_user).delete(delete_user))
}

#[instrument(skip(state, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    ApiJson(payload): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .unwrap_or("")
        .to_string();
    if name.is_empty() {
        return Err(ApiError::Validation("name es obligatorio".into()));
    }
    let price = payload
        .price
        .ok_or_else(|| ApiError::Validation("price es obligatorio".into()))?;

    let new = NewProduct {
        name,
        description: payload.description.unwrap_or_default(),
        price,
        stock: payload.stock.unwrap_or(0),
        image_url: payload.image_url.unwrap_or_default(),
        category: payload.category.unwrap_or_default(),
    };
    let product = Product::create(&state.db, &new)
        .await
        .map_err(ApiError::internal)?;

    info!(admin = %claims.sub, product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state, patch))]
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let product = Product::update(&state.db, id, &patch)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Producto no encontrado"))?;
    info!(admin = %claims.sub, product_id = %id, "product updated");
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !Product::delete(&state.db, id)
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::NotFound("Producto no encontrado"));
    }
    info!(admin = %claims.sub, product_id = %id, "product deleted");
    Ok(Json(json!({ "message": "Producto eliminado" })))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_claims): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list_all(&state.db).await.map_err(ApiError::internal)?;
    Ok(Json(users))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = User::set_role(&state.db, id, payload.is_admin)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Usuario no encontrado"))?;
    info!(admin = %claims.sub, user_id = %id, is_admin = user.is_admin, "user role updated");
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(claims): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::internal)?
        .ok_or(ApiError::NotFound("Usuario no encontrado"))?;
    User::delete(&state.db, user.id)
        .await
        .map_err(ApiError::internal)?;
    info!(admin = %claims.sub, user_id = %id, username = %user.username, "user deleted");
    Ok(Json(json!({ "message": "Usuario eliminado" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_list_never_serializes_hashes() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ana".into(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$secreto".into(),
            is_admin: false,
            created_at: time::OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&vec![user]).unwrap();
        assert!(json.contains("ana@example.com"));
        assert!(!json.contains("argon2id"));
    }
}
