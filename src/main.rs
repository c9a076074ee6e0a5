// Main entry point for the photo-wall gallery server.
// Sets up the Tokio runtime, opens the record store, configures the Axum
// router, and starts the HTTP server.

mod config;
mod models;
mod pagination;
mod record_store;
mod shutdown_signal;
mod upload_validator;
mod web;

use clap::Parser;
use config::AppConfig;
use record_store::RecordStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::Level;
use upload_validator::{DiskStorage, UploadPolicy, UploadValidator};

#[tokio::main]
async fn main() {
    // Parse command line args and environment variables
    let config = AppConfig::parse();

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting photo-wall...");

    for dir in [&config.upload_dir, &config.staging_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::error!("FATAL: Failed to create directory {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    }
    tracing::info!(
        "Upload directory: {}, staging directory: {}, max file size: {} bytes",
        config.upload_dir.display(),
        config.staging_dir.display(),
        config.max_file_size
    );

    // --- Open the record store ---
    // Read problems are recovered by starting empty; only an unwritable
    // backing file stops the server.
    let store = match RecordStore::open(&config.images_file) {
        Ok((store, _)) => store,
        Err(e) => {
            tracing::error!(
                "FATAL: Failed to initialize record file {}: {}",
                config.images_file.display(),
                e
            );
            std::process::exit(1);
        }
    };

    let state = web::AppState {
        store: Arc::new(RwLock::new(store)),
        validator: Arc::new(UploadValidator::new(
            UploadPolicy::new(config.max_file_size),
            DiskStorage::new(&config.upload_dir),
        )),
        upload_dir: config.upload_dir.clone(),
        staging_dir: config.staging_dir.clone(),
        page_size: config.page_size,
    };

    let app = web::create_app(state);
    tracing::info!("Axum router configured.");

    // --- Start HTTP Server ---
    let listener = match web::create_listener(&config.host, config.port).await {
        Ok((addr, l)) => {
            tracing::info!("Server successfully bound. Listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("FATAL: Failed to bind server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal::shutdown_signal())
        .await
    {
        tracing::error!("Server run error: {}", e);
    }

    tracing::info!("photo-wall has shut down.");
}
