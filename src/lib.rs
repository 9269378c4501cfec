pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod ranking;
pub mod routes;
pub mod validate;

use std::path::Path;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

use auth::CookieSettings;
use db::Store;
use error::AppError;
use graphql::AppSchema;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub schema: AppSchema,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(store: Store, cookies: CookieSettings) -> Self {
        let schema = graphql::build_schema(store.clone(), cookies);
        Self {
            store,
            schema,
            cookies,
        }
    }
}

/// API and GraphQL routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Session
        .route("/api/login", post(routes::login))
        .route("/api/logout", post(routes::logout))
        .route("/api/me", get(routes::me))
        // Songs
        .route("/api/songs", get(routes::list_songs).post(routes::create_song))
        .route(
            "/api/songs/{id}/like",
            get(routes::like_status).post(routes::toggle_like),
        )
        .route("/api/recommendations", get(routes::recommendations))
        .route("/api/my-likes", get(routes::my_likes))
        // Genres
        .route("/api/genres", get(routes::list_genres))
        .route("/api/genres/options", get(routes::genre_options))
        .route("/api/{*rest}", any(unknown_api_route))
        // GraphQL
        .route(
            "/graphql",
            get(graphql::graphiql).post(graphql::graphql_handler),
        )
        // Health check
        .route("/health", get(health_check))
        .with_state(state)
}

/// Serve the built client for every path the router does not claim,
/// falling back to `index.html` so client-side routes resolve.
pub fn with_client(router: Router, static_dir: &Path) -> Router {
    let index = static_dir.join("index.html");
    router.fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
}

pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin.and_then(|o| o.parse::<HeaderValue>().ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        None => CorsLayer::permissive(),
    }
}

async fn unknown_api_route() -> AppError {
    AppError::NotFound("Unknown API route".to_string())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
