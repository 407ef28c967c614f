use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod retriever;
mod service;

use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing credentials are fatal: the process must not start without them
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Configuration error, refusing to start");
            std::process::exit(1);
        }
    };
    let bind_addr = config.bind_addr();

    let state = match app::AppState::new(&config).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Service initialization failed, refusing to start");
            std::process::exit(1);
        }
    };

    let procedure_service = web::Data::from(state.procedure_service);
    let sigma_service = web::Data::from(state.sigma_service);
    let page_retriever = web::Data::new(state.page_retriever);
    let corpus_status = web::Data::new(state.corpus);

    tracing::info!("Starting Sigma Agent server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(procedure_service.clone())
            .app_data(sigma_service.clone())
            .app_data(page_retriever.clone())
            .app_data(corpus_status.clone())
            .configure(api::procedures::configure)
            .configure(api::sigma::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
