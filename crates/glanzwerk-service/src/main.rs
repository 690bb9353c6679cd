use diesel::Connection;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use glanzwerk_service::{
    DefaultAppState, ProductionScheduler,
    config::ServiceConfig,
    generators::{OpenAiContentGenerator, OpenAiImageGenerator},
    repositories::{SqliteGenerationLogRepository, SqlitePostRepository, SqliteTopicRepository},
    routes::create_router,
    scheduler::BlogScheduler,
};
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("glanzwerk_service=debug".parse().unwrap()),
        )
        .init();

    let config = ServiceConfig::from_env().unwrap_or_else(|err| {
        error!(error = %err, "Invalid configuration");
        std::process::exit(1);
    });

    let mut connection = SqliteConnection::establish(&config.database_url).unwrap_or_else(|err| {
        error!(database_url = %config.database_url, error = %err, "Failed to connect to database");
        std::process::exit(1);
    });

    connection
        .run_pending_migrations(MIGRATIONS)
        .unwrap_or_else(|err| {
            error!(error = %err, "Failed to run database migrations");
            std::process::exit(1);
        });

    info!(database_url = %config.database_url, "Connected to database");

    let db = Arc::new(Mutex::new(connection));

    if config.content_generator.api_key.is_none() {
        info!("No text-generation API key configured; generation cycles will fail until one is set");
    }
    if config.image_generator.api_key.is_none() {
        info!("No image-generation API key configured; generation cycles will fail until one is set");
    }

    let scheduler: Arc<ProductionScheduler> = Arc::new(BlogScheduler::new(
        SqliteTopicRepository::new(db.clone()),
        SqlitePostRepository::new(db.clone()),
        SqliteGenerationLogRepository::new(db.clone()),
        OpenAiContentGenerator::new(config.content_generator.clone()),
        OpenAiImageGenerator::new(config.image_generator.clone()),
        config.scheduler.clone(),
    ));
    scheduler.clone().start().await;

    let app_state = DefaultAppState::new(db, scheduler.clone());

    let app = create_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(15))),
        )
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .unwrap_or_else(|err| {
            error!(bind_address = %config.bind_address, error = %err, "Failed to bind to address");
            std::process::exit(1);
        });

    info!(bind_address = %config.bind_address, "Server running");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    if let Err(err) = server.await {
        error!(error = %err, "Server error");
        std::process::exit(1);
    }

    scheduler.stop();
    info!("Shutdown complete");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
