use axum::Router;

use crate::state::AppState;

pub mod bootstrap;
mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod policy;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::auth_routes())
}
