use axum::routing::get;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod audit;
mod business_logic_tests;
mod commands;
mod config;
mod db;
mod error;
mod integration_tests;
mod middleware;
mod routes;
mod state;
mod stock;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sera Backend...");

    let config = Config::from_env();

    let pool = match db::init_pool(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Database connection established");
            if let Err(e) = db::init_database(&pool, &config).await {
                tracing::error!("Failed to run migrations: {}", e);
                return;
            }
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return;
        }
    };

    let app_state = AppState {
        pool,
        config: config.clone(),
    };

    let app = routes::create_router()
        .route("/", get(root))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> &'static str {
    "Sera backend is running"
}
