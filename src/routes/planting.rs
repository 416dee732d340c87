use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/planting",
            get(commands::planting::get_planting_batches),
        )
        .route(
            "/api/planting/active",
            get(commands::planting::get_active_batches),
        )
        .route(
            "/api/planting/save",
            post(commands::planting::save_planting_batch),
        )
        .route(
            "/api/planting/status",
            post(commands::planting::update_planting_status),
        )
        .route(
            "/api/planting/delete/:id",
            post(commands::planting::delete_planting_batch),
        )
}
