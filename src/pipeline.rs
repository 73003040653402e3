use crate::config::AppConfig;
use crate::data::{load_boundary, load_points};
use crate::display::{prepare, DisplaySync, MarkerSnapshot};
use crate::error::LoadError;
use crate::geofilter::filter_by_name;
use crate::source::DataSource;
use crate::surface::MapSurface;
use crate::types::BoundaryCollection;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Outcome of one of the two independent loads.
#[derive(Debug)]
pub enum LoadEvent {
    Boundary(Result<BoundaryCollection, LoadError>),
    /// Rows already validated and projected, ready to swap in.
    Points(Result<MarkerSnapshot, LoadError>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub boundary_loaded: bool,
    pub points_loaded: bool,
}

/// Start both loads and apply each result to the display as soon as it arrives.
pub async fn run_initial_load<S: MapSurface>(
    config: &AppConfig,
    client: &Client,
    display: &mut DisplaySync<S>,
) -> LoadReport {
    let (tx, mut rx) = mpsc::channel(2);

    let boundary_task = {
        let tx = tx.clone();
        let client = client.clone();
        let source = DataSource::parse(&config.input.boundary);
        let name_property = config.input.name_property.clone();
        tokio::spawn(async move {
            let result = load_boundary(&client, &source, &name_property).await;
            let _ = tx.send(LoadEvent::Boundary(result)).await;
        })
    };
    let points_task = {
        let tx = tx.clone();
        let client = client.clone();
        let source = DataSource::parse(&config.input.points);
        tokio::spawn(async move {
            let result = match load_points(&client, &source).await {
                Ok(rows) => tokio::task::spawn_blocking(move || prepare(&rows))
                    .await
                    .map_err(LoadError::from),
                Err(e) => Err(e),
            };
            let _ = tx.send(LoadEvent::Points(result)).await;
        })
    };
    drop(tx);

    let mut report = LoadReport::default();
    while let Some(event) = rx.recv().await {
        apply_event(config, display, event, &mut report);
    }

    // A panicked task closes its sender without ever sending an event.
    join_load_task("boundary", boundary_task).await;
    join_load_task("point data", points_task).await;
    report
}

/// Await a finished load task, logging it if it panicked or was cancelled.
pub async fn join_load_task(kind: &str, handle: JoinHandle<()>) -> bool {
    match handle.await {
        Ok(()) => true,
        Err(e) => {
            warn!("{} load task failed, layer left unchanged: {}", kind, e);
            false
        }
    }
}

/// Boundary and markers are disjoint layers, so events may be applied in either order.
pub fn apply_event<S: MapSurface>(
    config: &AppConfig,
    display: &mut DisplaySync<S>,
    event: LoadEvent,
    report: &mut LoadReport,
) {
    match event {
        LoadEvent::Boundary(Ok(collection)) => {
            let filtered = filter_by_name(&collection, &config.input.boundary_name);
            if filtered.is_empty() {
                info!("No boundary feature named {:?}; overlay will be empty", config.input.boundary_name);
            }
            display
                .surface_mut()
                .show_boundary(&filtered, &config.map.boundary_style);
            report.boundary_loaded = true;
        }
        LoadEvent::Boundary(Err(e)) => {
            warn!("Boundary load failed, overlay left unchanged: {}", e);
        }
        LoadEvent::Points(Ok(snapshot)) => {
            display.apply(snapshot);
            let label = display.count_label();
            info!("{}", label);
            report.points_loaded = true;
        }
        LoadEvent::Points(Err(e)) => {
            warn!("Point data load failed, markers left unchanged: {}", e);
        }
    }
}
