use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{info, warn};
use std::path::Path;

use photo_drop::api;
use photo_drop::app_state::AppState;
use photo_drop::config::{AppConfig, LoggingConfig};

/// log4rs from the configured file, env_logger when that file is absent or broken
fn init_logging(config: &LoggingConfig) {
    if Path::new(&config.config_file).exists() {
        match log4rs::init_file(&config.config_file, Default::default()) {
            Ok(()) => return,
            Err(e) => eprintln!("Failed to load log config {}: {}", config.config_file, e),
        }
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    warn!("Log config {} not usable, logging to stderr", config.config_file);
}

fn to_io_error(err: photo_drop::error::StoreError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load().map_err(to_io_error)?;
    init_logging(&config.logging);

    let server = config.server.clone();
    let app_state = web::Data::new(AppState::from_config(config).map_err(to_io_error)?);

    info!("Starting server on {}:{}", server.host, server.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(api::configure)
    })
    .workers(server.workers)
    .bind((server.host.as_str(), server.port))?
    .run()
    .await
}
