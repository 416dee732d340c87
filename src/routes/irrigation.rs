use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/irrigation",
            get(commands::irrigation::get_irrigation_events),
        )
        .route(
            "/api/irrigation/save",
            post(commands::irrigation::save_irrigation),
        )
        .route(
            "/api/irrigation/delete/:id",
            post(commands::irrigation::delete_irrigation),
        )
}
