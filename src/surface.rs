use crate::config::{BaseLayerConfig, BoundaryStyleConfig, ClusterConfig, MapConfig};
use crate::marker::{Legend, MarkerDescriptor};
use crate::types::BoundaryCollection;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde::Serialize;

/// Operations the map page exposes. Base layers, the boundary overlay and the
/// marker group are disjoint layers.
pub trait MapSurface {
    fn set_base_layers(&mut self, layers: &[BaseLayerConfig]);
    fn set_cluster_options(&mut self, options: &ClusterConfig);
    fn set_legend(&mut self, legend: Legend);
    fn show_boundary(&mut self, boundary: &BoundaryCollection, style: &BoundaryStyleConfig);
    fn clear_markers(&mut self);
    fn add_marker(&mut self, marker: &MarkerDescriptor);
    fn set_count_label(&mut self, text: &str);
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MapView {
    pub center: [f64; 2],
    pub zoom: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoundaryOverlay {
    pub style: BoundaryStyleConfig,
    pub features: FeatureCollection,
}

/// Everything the page shows, as one serializable value (`map.json`).
#[derive(Debug, Clone, Serialize)]
pub struct MapDocument {
    pub view: MapView,
    pub base_layers: Vec<BaseLayerConfig>,
    pub cluster: Option<ClusterConfig>,
    pub legend: Option<Legend>,
    pub boundary: Option<BoundaryOverlay>,
    pub markers: Vec<MarkerDescriptor>,
    pub count_label: String,
}

impl MapDocument {
    pub fn new(view: MapView) -> Self {
        Self {
            view,
            base_layers: Vec::new(),
            cluster: None,
            legend: None,
            boundary: None,
            markers: Vec::new(),
            count_label: String::new(),
        }
    }

    /// A document with the static page furniture (base layers, clustering, legend) in place.
    pub fn from_config(map: &MapConfig) -> Self {
        let mut doc = Self::new(MapView { center: map.center, zoom: map.zoom });
        doc.set_base_layers(&map.base_layers);
        doc.set_cluster_options(&map.cluster);
        doc.set_legend(Legend::default());
        doc
    }

    pub fn boundary_geojson(&self) -> FeatureCollection {
        self.boundary
            .as_ref()
            .map(|b| b.features.clone())
            .unwrap_or_else(empty_collection)
    }

    pub fn markers_geojson(&self) -> FeatureCollection {
        let features = self.markers.iter().map(marker_feature).collect();
        FeatureCollection { bbox: None, features, foreign_members: None }
    }
}

impl MapSurface for MapDocument {
    fn set_base_layers(&mut self, layers: &[BaseLayerConfig]) {
        self.base_layers = layers.to_vec();
    }

    fn set_cluster_options(&mut self, options: &ClusterConfig) {
        self.cluster = Some(options.clone());
    }

    fn set_legend(&mut self, legend: Legend) {
        self.legend = Some(legend);
    }

    fn show_boundary(&mut self, boundary: &BoundaryCollection, style: &BoundaryStyleConfig) {
        self.boundary = Some(BoundaryOverlay {
            style: style.clone(),
            features: boundary_to_geojson(boundary),
        });
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn add_marker(&mut self, marker: &MarkerDescriptor) {
        self.markers.push(marker.clone());
    }

    fn set_count_label(&mut self, text: &str) {
        self.count_label = text.to_string();
    }
}

fn empty_collection() -> FeatureCollection {
    FeatureCollection { bbox: None, features: Vec::new(), foreign_members: None }
}

pub fn boundary_to_geojson(boundary: &BoundaryCollection) -> FeatureCollection {
    let features = boundary
        .features
        .iter()
        .map(|f| Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&f.geometry))),
            id: None,
            properties: Some(f.properties.clone()),
            foreign_members: None,
        })
        .collect();
    FeatureCollection { bbox: None, features, foreign_members: None }
}

fn marker_feature(marker: &MarkerDescriptor) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("description".to_string(), marker.popup.body.clone().into());
    properties.insert("popup".to_string(), marker.popup.html().into());
    properties.insert("icon_css".to_string(), marker.style.css().into());
    Feature {
        bbox: None,
        // GeoJSON positions are [lon, lat]
        geometry: Some(Geometry::new(Value::Point(vec![marker.lon, marker.lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::project;
    use crate::types::{BoundaryFeature, ValidPoint};
    use geo::{polygon, MultiPolygon};

    #[test]
    fn from_config_sets_page_furniture() {
        let doc = MapDocument::from_config(&MapConfig::default());
        assert_eq!(doc.view, MapView { center: [43.9, -78.86], zoom: 12 });
        assert_eq!(doc.base_layers.len(), 2);
        assert_eq!(doc.cluster.as_ref().map(|c| c.max_cluster_radius), Some(1));
        assert!(doc.legend.is_some());
        assert!(doc.boundary.is_none());
        assert!(doc.markers.is_empty());
    }

    #[test]
    fn markers_export_as_lon_lat_points() {
        let mut doc = MapDocument::new(MapView { center: [0.0, 0.0], zoom: 1 });
        doc.add_marker(&project(&ValidPoint { lat: 43.9, lon: -78.86, description: "Main St".into() }));

        let fc = doc.markers_geojson();
        assert_eq!(fc.features.len(), 1);
        let feature = &fc.features[0];
        match &feature.geometry.as_ref().unwrap().value {
            Value::Point(coords) => assert_eq!(coords, &vec![-78.86, 43.9]),
            other => panic!("expected point, got {:?}", other),
        }
        assert_eq!(feature.property("description").and_then(|v| v.as_str()), Some("Main St"));
    }

    #[test]
    fn boundary_overlay_keeps_properties() {
        let mut properties = JsonObject::new();
        properties.insert("NAME".to_string(), "Oshawa".into());
        let boundary = BoundaryCollection::new(vec![BoundaryFeature {
            name: Some("Oshawa".into()),
            properties,
            geometry: MultiPolygon::new(vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]]),
        }]);

        let mut doc = MapDocument::new(MapView { center: [0.0, 0.0], zoom: 1 });
        assert!(doc.boundary_geojson().features.is_empty());

        doc.show_boundary(&boundary, &BoundaryStyleConfig::default());
        let fc = doc.boundary_geojson();
        assert_eq!(fc.features.len(), 1);
        assert_eq!(fc.features[0].property("NAME").and_then(|v| v.as_str()), Some("Oshawa"));
        assert!(matches!(
            fc.features[0].geometry.as_ref().map(|g| &g.value),
            Some(Value::MultiPolygon(_))
        ));
    }
}
