use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/staff", get(commands::staff::get_staff))
        .route("/api/staff/save", post(commands::staff::save_staff))
        .route(
            "/api/staff/deactivate/:id",
            post(commands::staff::deactivate_staff),
        )
        .route("/api/staff/tasks", get(commands::staff::get_tasks))
        .route("/api/staff/tasks/save", post(commands::staff::save_task))
        .route(
            "/api/staff/tasks/delete/:id",
            post(commands::staff::delete_task),
        )
        .route(
            "/api/staff/summary",
            get(commands::staff::get_staff_summary),
        )
        .route(
            "/api/staff/salary-total",
            get(commands::staff::get_monthly_salary_total),
        )
}
