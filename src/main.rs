use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use songboard::{
    auth::CookieSettings, build_router, config::Config, cors_layer, db::Store, with_client,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "songboard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load config
    let config = Config::from_env()?;
    tracing::info!("Starting songboard server");
    tracing::info!("Database: {}", config.database_url);
    tracing::info!("Listening on: {}", config.bind_address());

    // Connect to database and run migrations
    let store = Store::connect(&config.database_url).await?;

    if let Some(path) = &config.import_path {
        tracing::info!("Importing {}", path.display());
        store.import_file(path).await?;
    }

    let state = AppState::new(
        store,
        CookieSettings {
            secure: config.cookie_secure,
        },
    );

    // Build router
    let app = with_client(build_router(state), &config.static_dir)
        .layer(cors_layer(config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http());

    // Run server
    let listener = tokio::net::TcpListener::bind(&config.bind_address()).await?;
    tracing::info!("REST API: http://{}/api", config.bind_address());
    tracing::info!("GraphQL: http://{}/graphql", config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
