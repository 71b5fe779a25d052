//! Deald Feedback Server
//!
//! HTTP service exposing per-ticket feedback for the Deald forum:
//! ratings, disputes and admin resolution, backed by Postgres.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;

use deald_feedback_server::app_state::AppState;
use deald_feedback_server::auth::JwtKeys;
use deald_feedback_server::config::Config;
use deald_feedback_server::feedback_service::FeedbackService;
use deald_feedback_server::identity::PgIdentityResolver;
use deald_feedback_server::notify::{ForumMessenger, LogMessenger, PrivateMessenger};
use deald_feedback_server::routes;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("invalid configuration");

    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .expect("failed to run migrations");

    let messenger: Arc<dyn PrivateMessenger> = match &config.forum_pm_url {
        Some(endpoint) => Arc::new(ForumMessenger::new(
            endpoint.clone(),
            config.forum_pm_token.clone(),
            config.system_actor.clone(),
        )),
        None => {
            tracing::warn!("FORUM_PM_URL not set; private messages will only be logged");
            Arc::new(LogMessenger)
        }
    };

    let state = AppState::new(
        Arc::new(FeedbackService::new(db_pool.clone())),
        Arc::new(PgIdentityResolver::new(db_pool)),
        messenger,
        JwtKeys::new(config.jwt_secret.as_bytes()),
    );

    let app = routes::app(state).layer(build_cors_layer());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    tracing::info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn build_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
