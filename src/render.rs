use crate::surface::MapDocument;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Leaflet page that draws whatever `map.json` describes.
pub const INDEX_HTML: &str = include_str!("../assets/index.html");

pub fn write_site(document: &MapDocument, out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", out_dir))?;

    fs::write(out_dir.join("index.html"), INDEX_HTML)
        .with_context(|| format!("Failed to write index.html to {:?}", out_dir))?;
    write_json(&out_dir.join("map.json"), document)?;
    write_json(&out_dir.join("boundary.geojson"), &document.boundary_geojson())?;
    write_json(&out_dir.join("markers.geojson"), &document.markers_geojson())?;

    info!("Wrote map with {} markers to {:?}", document.markers.len(), out_dir);
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}
