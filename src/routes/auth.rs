use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(commands::auth::login))
        .route("/api/auth/logout", post(commands::auth::logout))
        .route("/api/auth/check", get(commands::auth::check_auth_status))
        .route("/api/auth/users", get(commands::auth::get_all_users))
        .route("/api/auth/users/create", post(commands::auth::create_user))
        .route("/api/auth/users/update", post(commands::auth::update_user))
        .route("/api/auth/users/delete", post(commands::auth::delete_user))
        .route(
            "/api/auth/login-attempts",
            get(commands::auth::get_login_attempts),
        )
}
