//! Serve command - the HTTP front end for map rendering.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Args;
use mapconverter::cache::{CacheStats, TileCache};
use mapconverter::telemetry::{PipelineMetrics, ServiceReport, VisitorTracker};
use mapconverter::tile::TileFetcher;
use mapconverter::{HttpMapPipeline, MapPipeline, PipelineError, RawRequest, RequestGeometry};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::CliError;
use crate::runner::CliRunner;

/// How often expired visitors are dropped.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind (overrides [server] host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides [server] port)
    #[arg(long, short)]
    pub port: Option<u16>,
}

/// Shared state for every handler.
pub struct AppState<F: TileFetcher> {
    pub pipeline: Arc<MapPipeline<F>>,
    pub visitors: Arc<VisitorTracker>,
    pub metrics: Arc<PipelineMetrics>,
    pub cache: Option<Arc<TileCache>>,
}

impl<F: TileFetcher> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            visitors: Arc::clone(&self.visitors),
            metrics: Arc::clone(&self.metrics),
            cache: self.cache.clone(),
        }
    }
}

pub fn router<F: TileFetcher + 'static>(state: AppState<F>) -> Router {
    Router::new()
        .route("/get_image", get(get_image::<F>))
        .route("/get_image_json", get(get_image_json::<F>))
        .route("/metrics", get(metrics::<F>))
        .with_state(state)
}

fn error_status(e: &PipelineError) -> StatusCode {
    if e.is_invalid_input() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn get_image<F: TileFetcher + 'static>(
    State(state): State<AppState<F>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(raw): Query<RawRequest>,
) -> Response {
    state.visitors.record(addr.ip());

    let result = match RequestGeometry::from_raw(&raw) {
        Ok(geometry) => state.pipeline.produce_png(&geometry).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(e) => {
            debug!(client = %addr, error = %e, "Image request rejected");
            (error_status(&e), e.to_string()).into_response()
        }
    }
}

async fn get_image_json<F: TileFetcher + 'static>(
    State(state): State<AppState<F>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Query(raw): Query<RawRequest>,
) -> Response {
    state.visitors.record(addr.ip());

    let result = match RequestGeometry::from_raw(&raw) {
        Ok(geometry) => state.pipeline.produce_json(&geometry).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(document) => Json(document).into_response(),
        Err(e) => {
            debug!(client = %addr, error = %e, "JSON request rejected");
            (error_status(&e), Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}

async fn metrics<F: TileFetcher + 'static>(State(state): State<AppState<F>>) -> Json<ServiceReport> {
    let cache = match state.cache {
        Some(ref cache) => {
            cache.sync().await;
            cache.stats()
        }
        None => CacheStats::default(),
    };
    Json(ServiceReport::collect(
        state.metrics.snapshot(),
        cache,
        &state.visitors,
    ))
}

/// Run the serve command.
pub fn run(runner: &CliRunner, args: ServeArgs) -> Result<(), CliError> {
    let config = runner.config();
    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let metrics = Arc::new(PipelineMetrics::new());
    let pipeline = HttpMapPipeline::from_config(config, Arc::clone(&metrics))?;
    let cache = Arc::clone(pipeline.cache());

    info!(
        cache_dir = %config.cache.directory.display(),
        memory_size = config.cache.memory_size,
        timeout_secs = config.download.timeout,
        "Pipeline ready"
    );

    let runtime = runner.runtime()?;
    runtime.block_on(async move {
        cache.warm_up().await;
        let visitors = Arc::new(VisitorTracker::new());
        let sweeper = visitors.spawn_sweeper(SWEEP_INTERVAL);

        let state = AppState {
            pipeline: Arc::new(pipeline),
            visitors,
            metrics: Arc::clone(&metrics),
            cache: Some(cache),
        };
        let app = router(state).into_make_service_with_connect_info::<SocketAddr>();

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|error| CliError::Serve {
                addr: addr.clone(),
                error,
            })?;
        info!(%addr, "Listening");
        println!("Serving maps on http://{}", addr);
        println!("Press Ctrl+C to stop");

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();

        served.map_err(|error| CliError::Serve { addr, error })?;
        info!("Server stopped");
        println!("{}", metrics.snapshot());
        Ok(())
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
