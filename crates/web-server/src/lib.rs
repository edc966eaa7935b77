// In crates/web-server/src/lib.rs

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use app_config::ServerSettings;
use core_types::{BacktestSummary, ForecastEnvelope};
use engine::{Engine, SignalsView};
use tokio::net::TcpListener;

pub mod error;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};
use types::{BacktestParams, ForecastParams, SignalsParams};

/// The shared application state that is available to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

/// Creates the main application router with all routes and middleware.
pub fn create_router(app_state: AppState) -> Router {
    // Define a CORS layer to allow requests from our frontend.
    // In a production environment, you would restrict the origin to your actual frontend domain.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any) // For development, allow any origin
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/backtest", get(backtest_handler))
        .route("/forecast", get(forecast_handler))
        .route("/signals", get(signals_handler))
        .route("/health", get(health_check_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// A simple health check handler.
async fn health_check_handler() -> &'static str {
    "OK"
}

/// Handler for `GET /backtest`.
///
/// Runs the crossover scan for the requested symbol and answers with the
/// summary envelope. Upstream data failures map to 502, an empty series to
/// 400; predictor and commentary failures degrade inside a 200.
async fn backtest_handler(
    State(state): State<AppState>,
    Query(params): Query<BacktestParams>,
) -> Result<Json<BacktestSummary>> {
    let summary = state.engine.run_backtest(params.into_request()).await?;
    Ok(Json(summary))
}

/// Handler for `GET /forecast`.
async fn forecast_handler(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> Result<Json<ForecastEnvelope>> {
    let envelope = state.engine.run_forecast(params.into_request()).await?;
    Ok(Json(envelope))
}

/// Handler for `GET /signals`.
///
/// Pure cache read. An empty `symbol` parameter counts as absent and serves
/// the whole map.
async fn signals_handler(
    State(state): State<AppState>,
    Query(params): Query<SignalsParams>,
) -> Result<Json<SignalsView>> {
    let symbol = params.symbol.as_deref().filter(|symbol| !symbol.is_empty());
    let view = state.engine.query_signals(symbol, params.limit)?;
    Ok(Json(view))
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run forever until the process is terminated.
pub async fn run(settings: ServerSettings, engine: Arc<Engine>) -> Result<()> {
    let app_state = AppState { engine };
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address)
        .await
        .map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServerError)?;

    Ok(())
}
