use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use anyhow::{Context, Result};

use crate::display::CountMode;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub display: DisplayConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// Path or http(s) URL of the boundary GeoJSON, or a local .shp file
    pub boundary: String,
    /// Path or http(s) URL of the e-scooter CSV
    pub points: String,
    pub boundary_name: String,
    pub name_property: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            boundary: "oshawa_boundary.geojson".to_string(),
            points: "escooters_.csv".to_string(),
            boundary_name: "Oshawa".to_string(),
            name_property: "NAME".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub center: [f64; 2], // [lat, lon]
    pub zoom: u8,
    pub base_layers: Vec<BaseLayerConfig>,
    pub cluster: ClusterConfig,
    pub boundary_style: BoundaryStyleConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: [43.9, -78.86],
            zoom: 12,
            base_layers: vec![
                BaseLayerConfig {
                    name: "OpenStreetMap (default)".to_string(),
                    url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                    attribution: "&copy; OpenStreetMap contributors".to_string(),
                    default: true,
                },
                BaseLayerConfig {
                    name: "Satellite".to_string(),
                    url: "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}".to_string(),
                    attribution: "Tiles &copy; Esri &mdash; Source: Esri, i-cubed, USDA, USGS, AEX, GeoEye, etc.".to_string(),
                    default: false,
                },
            ],
            cluster: ClusterConfig::default(),
            boundary_style: BoundaryStyleConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BaseLayerConfig {
    pub name: String,
    pub url: String,
    pub attribution: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ClusterConfig {
    pub max_cluster_radius: u32,
    pub spiderfy_distance_multiplier: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_cluster_radius: 1,
            spiderfy_distance_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BoundaryStyleConfig {
    pub color: String, // Hex code
    pub weight: u32,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for BoundaryStyleConfig {
    fn default() -> Self {
        Self {
            color: "#0000ff".to_string(),
            weight: 2,
            fill_color: "#0000ff".to_string(),
            fill_opacity: 0.1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DisplayConfig {
    pub count_mode: CountMode,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub site_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { site_dir: PathBuf::from("site") }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: [u8; 4],
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: [127, 0, 0, 1], port: 8080 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Missing file means defaults; a file that exists but fails to parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::warn!("Config file {:?} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_oshawa_page() {
        let config = AppConfig::default();
        assert_eq!(config.input.boundary_name, "Oshawa");
        assert_eq!(config.input.name_property, "NAME");
        assert_eq!(config.map.center, [43.9, -78.86]);
        assert_eq!(config.map.zoom, 12);
        assert_eq!(config.map.base_layers.len(), 2);
        assert!(config.map.base_layers[0].default);
        assert_eq!(config.map.cluster.max_cluster_radius, 1);
        assert_eq!(config.display.count_mode, CountMode::InputRows);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [input]
            points = "https://example.org/scooters.csv"

            [display]
            count_mode = "rendered"

            [server]
            port = 9000
            "#,
        )
        .unwrap();

        assert_eq!(config.input.points, "https://example.org/scooters.csv");
        assert_eq!(config.input.boundary, "oshawa_boundary.geojson");
        assert_eq!(config.display.count_mode, CountMode::Rendered);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, [127, 0, 0, 1]);
        assert_eq!(config.map.boundary_style.weight, 2);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(AppConfig::from_toml("[display]\ncount_mode = 3").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
