use crate::error::{LoadError, Result};
use crate::source::{fetch, DataSource};
use crate::types::{BoundaryCollection, BoundaryFeature, RawPointRow};
use csv::ReaderBuilder;
use geo::MultiPolygon;
use geojson::{GeoJson, JsonObject, Value};
use reqwest::Client;
use shapefile::Reader;
use std::path::Path;
use tracing::{debug, info};

pub async fn load_boundary(
    client: &Client,
    source: &DataSource,
    name_property: &str,
) -> Result<BoundaryCollection> {
    info!("Loading boundary from {}", source);

    let boundary = match (source.extension().as_deref(), source) {
        (Some("shp"), DataSource::Path(path)) => {
            let path = path.clone();
            let name_property = name_property.to_string();
            tokio::task::spawn_blocking(move || load_boundary_shapefile(&path, &name_property)).await??
        }
        (Some("shp"), DataSource::Url(url)) => {
            return Err(LoadError::Unsupported(format!("shapefiles must be local files: {}", url)));
        }
        _ => {
            let bytes = fetch(client, source).await?;
            parse_boundary_geojson(&bytes, name_property)?
        }
    };

    info!("Loaded {} boundary features", boundary.len());
    Ok(boundary)
}

pub async fn load_points(client: &Client, source: &DataSource) -> Result<Vec<RawPointRow>> {
    info!("Loading point data from {}", source);
    let bytes = fetch(client, source).await?;
    let rows = parse_points_csv(&bytes)?;
    info!("Loaded {} rows with coordinates", rows.len());
    Ok(rows)
}

/// Parse a FeatureCollection, keeping polygon and multipolygon features.
pub fn parse_boundary_geojson(bytes: &[u8], name_property: &str) -> Result<BoundaryCollection> {
    let geojson = GeoJson::from_reader(bytes).map_err(geojson::Error::from)?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(LoadError::NotFeatureCollection),
    };

    let mut features = Vec::new();

    for feature in collection.features {
        let properties = feature.properties.unwrap_or_default();
        let name = match properties.get(name_property) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let geometry = match feature.geometry {
            Some(geom) => match geom.value {
                Value::Polygon(_) | Value::MultiPolygon(_) => {
                    let geo_geom: geo::Geometry<f64> = geom.value.try_into()?;
                    match geo_geom {
                        geo::Geometry::MultiPolygon(mp) => mp,
                        geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                        _ => continue,
                    }
                }
                _ => {
                    debug!("Skipping non-polygon boundary feature {:?}", name);
                    continue;
                }
            },
            None => continue,
        };

        features.push(BoundaryFeature { name, properties, geometry });
    }

    Ok(BoundaryCollection::new(features))
}

pub fn load_boundary_shapefile(path: &Path, name_property: &str) -> Result<BoundaryCollection> {
    let mut reader = Reader::from_path(path)?;

    let mut features = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result?;

        let name = match record.get(name_property) {
            Some(shapefile::dbase::FieldValue::Character(Some(s))) => Some(s.trim_end().to_string()),
            _ => None,
        };

        let geometry: MultiPolygon<f64> = match shape {
            shapefile::Shape::Polygon(polygon) => polygon.try_into()
                .map_err(|e| LoadError::Geometry { kind: "polygon", reason: format!("{:?}", e) })?,
            shapefile::Shape::PolygonM(polygon) => polygon.try_into()
                .map_err(|e| LoadError::Geometry { kind: "polygonM", reason: format!("{:?}", e) })?,
            shapefile::Shape::PolygonZ(polygon) => polygon.try_into()
                .map_err(|e| LoadError::Geometry { kind: "polygonZ", reason: format!("{:?}", e) })?,
            _ => continue,
        };

        let mut properties = JsonObject::new();
        if let Some(n) = &name {
            properties.insert(name_property.to_string(), n.clone().into());
        }

        features.push(BoundaryFeature { name, properties, geometry });
    }

    Ok(BoundaryCollection::new(features))
}

/// Parse the point CSV. Rows lacking either coordinate are dropped here, before validation.
///
/// Fields are decoded lossily, so a stray non-UTF-8 byte in one description
/// does not fail the whole file.
pub fn parse_points_csv(bytes: &[u8]) -> Result<Vec<RawPointRow>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = rdr.byte_headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| String::from_utf8_lossy(h) == name);
    let lat_idx = column("latitude");
    let lon_idx = column("longitude");
    let desc_idx = column("location_desc");

    let mut rows = Vec::new();
    let mut dropped = 0;

    for result in rdr.byte_records() {
        let record = result?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|b| !b.is_empty())
                .map(|b| String::from_utf8_lossy(b).into_owned())
        };

        let row = RawPointRow {
            latitude: field(lat_idx),
            longitude: field(lon_idx),
            location_desc: field(desc_idx),
        };
        if row.has_coordinates() {
            rows.push(row);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        debug!("Dropped {} rows without coordinates", dropped);
    }

    Ok(rows)
}
