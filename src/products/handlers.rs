use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::ApiError,
    extract::ApiPath,
    products::{dto::ListParams, query::CatalogQuery, repo::Product},
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let query = CatalogQuery::from_params(params)?;
    let products = Product::fetch_all(&state.db)
        .await
        .map_err(ApiError::internal)?;
    Ok(Json(query.apply(products)))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Product>, ApiError> {
    Product::find_by_id(&state.db, id)
        .await
        .map_err(ApiError::internal)?
        .map(Json)
        .ok_or(ApiError::NotFound("Producto no encontrado"))
}
