// src/main.rs

use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use taskflow::app_state::AppState;
use taskflow::config::{Config, StoreBackend};
use taskflow::middleware::RequestTrace;
use taskflow::store::{memory::MemoryStore, mongo::MongoStore, EntityStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let store: Arc<dyn EntityStore> = match &config.store_backend {
        StoreBackend::Mongo { uri } => Arc::new(
            MongoStore::init(uri, &config.database_name)
                .await
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?,
        ),
        StoreBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    info!("Server running at http://{}", config.bind_address);
    match &config.frontend_origin {
        Some(origin) => info!("Allowed CORS Origin: {}", origin),
        None => info!("Allowed CORS Origin: any"),
    }

    let state = AppState::new(store, config.clone());
    HttpServer::new(move || {
        let cors = match &state.config.frontend_origin {
            Some(origin) => Cors::default().allowed_origin(origin),
            None => Cors::default().allow_any_origin(),
        }
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
        .expose_headers(vec![http::header::LOCATION])
        .max_age(3600);

        App::new()
            .wrap(RequestTrace)
            .wrap(cors)
            .wrap(Logger::new(r#"%a "%r" %s %b %T [%{x-request-id}o]"#))
            .app_data(web::Data::new(state.clone()))
            .configure(taskflow::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
