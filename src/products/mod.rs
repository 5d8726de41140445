use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod query;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
