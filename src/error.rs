//! Errors produced while loading the boundary and point sources.

use std::path::PathBuf;
use thiserror::Error;

/// A data source could not be fetched or did not parse as expected.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: reqwest::StatusCode },

    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("boundary GeoJSON must be a FeatureCollection")]
    NotFeatureCollection,

    #[error("shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("failed to convert {kind} geometry: {reason}")]
    Geometry { kind: &'static str, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported source: {0}")]
    Unsupported(String),

    #[error("load task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LoadError>;
