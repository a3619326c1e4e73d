//! Vigil monitoring backend
//!
//! Main entry point: configuration, database setup and the HTTP server.

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use vigil::{api, config, store::MonitorStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::load_config()?;

    let store = MonitorStore::connect(&config.database.url).await?;
    store.init_schema().await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let assets_dir = config.server.assets_dir.clone();
    tracing::info!(%bind_addr, "starting server");

    let store_data = web::Data::new(store);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .configure(api::configure)
            .service(fs::Files::new("/", &assets_dir).index_file("index.html"))
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
