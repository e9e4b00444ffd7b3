//! # Lumen API Server
//!
//! The main entry point for the Actix-web HTTP server.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use lumen_core::ports::{IdentityGateway, ObjectStore};
use lumen_infra::auth::JwtIdentityGateway;
use lumen_infra::storage::{InMemoryObjectStore, S3Config, S3ObjectStore};

mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Lumen API server on {}:{}",
        config.host,
        config.port
    );

    let db = lumen_infra::database::connect(&config.database)
        .await
        .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;

    let storage: Arc<dyn ObjectStore> = match S3Config::from_env() {
        Some(s3) => Arc::new(S3ObjectStore::new(s3).await),
        None => {
            tracing::warn!("S3_BUCKET not set. Using in-memory object store.");
            Arc::new(InMemoryObjectStore::new())
        }
    };

    let identity: Arc<dyn IdentityGateway> = Arc::new(JwtIdentityGateway::from_env());

    let state = AppState::new(db, storage);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(identity.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
