mod config;
mod services;

use crate::config::AppConfig;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use std::fs;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    fs::create_dir_all(&config.temp_dir)?;
    fs::create_dir_all(&config.generator.output_dir)?;
    if !config.icon_path.exists() {
        warn!(
            "Helpline icon {} not found; every upload will fail until it exists",
            config.icon_path.display()
        );
    }

    let host = config.host.clone();
    let port = config.port;
    info!("Server running at {}", config.url());
    info!(
        "Writing PDFs to {} using fonts from {}",
        config.generator.output_dir.display(),
        config.generator.fonts_dir.display()
    );

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(config.clone())
            .service(services::coupons::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
