use axum::Router;

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;
pub mod report;
pub mod services;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::analyses_routes())
        .merge(handlers::history_routes())
}
