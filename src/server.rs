use crate::config::AppConfig;
use crate::data::{load_boundary, load_points};
use crate::display::{prepare, CountMode, DisplaySync};
use crate::geofilter::filter_by_name;
use crate::render::INDEX_HTML;
use crate::source::DataSource;
use crate::surface::{MapDocument, MapSurface};
use anyhow::Result;
use axum::{
    extract::State,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use geojson::FeatureCollection;
use reqwest::Client;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{info, warn};

pub struct AppState {
    pub display: RwLock<DisplaySync<MapDocument>>,
    pub config: AppConfig,
    pub client: Client,
}

#[derive(Serialize)]
pub struct CountResponse {
    count: usize,
    label: String,
    mode: CountMode,
}

#[derive(Serialize, Default)]
pub struct ReloadResponse {
    boundary_loaded: bool,
    points_loaded: bool,
    markers: usize,
    count: usize,
    errors: Vec<String>,
}

/// API routes plus the generated site directory as a static fallback.
pub fn router(state: Arc<AppState>) -> Router {
    let site_dir = state.config.output.site_dir.clone();
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/health", get(|| async { "ok" }))
        .route("/map.json", get(map_handler))
        .route("/api/map", get(map_handler))
        .route("/api/boundary", get(boundary_handler))
        .route("/api/markers", get(markers_handler))
        .route("/api/count", get(count_handler))
        .route("/api/reload", post(reload_handler))
        .fallback_service(ServeDir::new(site_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig, client: Client, display: DisplaySync<MapDocument>) -> Result<()> {
    let addr = SocketAddr::from((config.server.host, config.server.port));

    let state = Arc::new(AppState {
        display: RwLock::new(display),
        config,
        client,
    });

    let app = router(state);

    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let serve = axum::serve(listener, app);
    tokio::select! {
        r = serve => { r?; },
        _ = signal::ctrl_c() => { info!("Shutdown signal received"); }
    }
    Ok(())
}

async fn map_handler(State(state): State<Arc<AppState>>) -> Json<MapDocument> {
    let display = state.display.read().await;
    Json(display.surface().clone())
}

async fn boundary_handler(State(state): State<Arc<AppState>>) -> Json<FeatureCollection> {
    let display = state.display.read().await;
    Json(display.surface().boundary_geojson())
}

async fn markers_handler(State(state): State<Arc<AppState>>) -> Json<FeatureCollection> {
    let display = state.display.read().await;
    Json(display.surface().markers_geojson())
}

async fn count_handler(State(state): State<Arc<AppState>>) -> Json<CountResponse> {
    let display = state.display.read().await;
    Json(CountResponse {
        count: display.count(),
        label: display.count_label(),
        mode: display.count_mode(),
    })
}

/// Re-fetch both sources, build the new marker set without the lock, then swap it in.
async fn reload_handler(State(state): State<Arc<AppState>>) -> Json<ReloadResponse> {
    let input = &state.config.input;
    let boundary_source = DataSource::parse(&input.boundary);
    let points_source = DataSource::parse(&input.points);

    let (boundary, points) = tokio::join!(
        load_boundary(&state.client, &boundary_source, &input.name_property),
        load_points(&state.client, &points_source),
    );

    let mut response = ReloadResponse::default();

    let boundary = match boundary {
        Ok(collection) => Some(filter_by_name(&collection, &input.boundary_name)),
        Err(e) => {
            warn!("Boundary reload failed, overlay left unchanged: {}", e);
            response.errors.push(format!("boundary: {}", e));
            None
        }
    };

    let snapshot = match points {
        Ok(rows) => match tokio::task::spawn_blocking(move || prepare(&rows)).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("Marker preparation failed: {}", e);
                response.errors.push(format!("points: {}", e));
                None
            }
        },
        Err(e) => {
            warn!("Point data reload failed, markers left unchanged: {}", e);
            response.errors.push(format!("points: {}", e));
            None
        }
    };

    let mut display = state.display.write().await;
    if let Some(filtered) = boundary {
        display
            .surface_mut()
            .show_boundary(&filtered, &state.config.map.boundary_style);
        response.boundary_loaded = true;
    }
    if let Some(snapshot) = snapshot {
        display.apply(snapshot);
        response.points_loaded = true;
    }
    response.markers = display.markers().len();
    response.count = display.count();

    let label = display.count_label();
    info!("Reload finished: {}", label);
    Json(response)
}
