mod error;
mod html;
mod routes;
mod state;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use epichart::{AsyncReportEngine, EngineConfig};
use tower_http::cors::CorsLayer;
use tracing::info;

use state::AppState;

/// Optional path to a TOML configuration file.
const ENV_CONFIG: &str = "EPICHART_CONFIG";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match std::env::var(ENV_CONFIG) {
        Ok(path) => EngineConfig::from_file(&path).expect("Failed to read configuration file"),
        Err(_) => EngineConfig::default(),
    }
    .apply_env()
    .expect("Invalid EPICHART_* environment override");

    let engine = AsyncReportEngine::builder()
        .config(config)
        .build()
        .await
        .expect("Failed to initialize report engine");
    info!(engine = %engine.engine(), "engine ready");

    let state = Arc::new(AppState { engine });

    let app = Router::new()
        .route("/", get(routes::meta::index))
        .route("/api/reports", get(routes::meta::list_reports))
        .route("/api/reports/{id}", get(routes::reports::report_json))
        .route(
            "/reports/{id}",
            get(routes::reports::show).post(routes::reports::submit),
        )
        // Legacy paths: /grafico1 .. /grafico4.
        .route(
            "/{id}",
            get(routes::reports::show).post(routes::reports::submit),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = "0.0.0.0:3000";
    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
