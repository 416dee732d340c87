use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/harvest", get(commands::harvest::get_harvests))
        .route("/api/harvest/save", post(commands::harvest::save_harvest))
        .route(
            "/api/harvest/delete/:id",
            post(commands::harvest::delete_harvest),
        )
        .route(
            "/api/harvest/stats",
            get(commands::harvest::get_harvest_stats),
        )
}
