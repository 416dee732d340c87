use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/attendance",
            get(commands::attendance::get_day_attendance),
        )
        .route(
            "/api/attendance/save",
            post(commands::attendance::save_attendance),
        )
        .route(
            "/api/attendance/week-stats",
            get(commands::attendance::get_week_stats),
        )
        .route(
            "/api/attendance/export",
            get(commands::attendance::export_attendance),
        )
}
