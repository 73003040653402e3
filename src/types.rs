use geo::MultiPolygon;
use geojson::JsonObject;

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: Option<String>,
    pub properties: JsonObject,
    pub geometry: MultiPolygon<f64>,
}

/// A loaded polygon collection. Never mutated after load; filtering builds a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryCollection {
    pub fn new(features: Vec<BoundaryFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// One CSV record. Every column may be missing or empty at this stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPointRow {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub location_desc: Option<String>,
}

impl RawPointRow {
    pub fn new(latitude: &str, longitude: &str, location_desc: Option<&str>) -> Self {
        Self {
            latitude: Some(latitude.to_string()),
            longitude: Some(longitude.to_string()),
            location_desc: location_desc.map(str::to_string),
        }
    }

    /// Load-time pre-filter: both coordinate columns present and non-empty.
    pub fn has_coordinates(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.latitude) && present(&self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidPoint {
    pub lat: f64,
    pub lon: f64,
    pub description: String,
}
