use crate::error::{LoadError, Result};
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::Path(PathBuf::from(location))
        }
    }

    /// Lowercased file extension, ignoring any URL query or fragment.
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            DataSource::Path(p) => p.file_name()?.to_str()?.to_string(),
            DataSource::Url(u) => {
                let path = u.split(['?', '#']).next().unwrap_or(u);
                path.rsplit('/').next()?.to_string()
            }
        };
        let (_, ext) = name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(p) => write!(f, "{}", p.display()),
            DataSource::Url(u) => f.write_str(u),
        }
    }
}

/// Read a local file or issue a single GET. No retries.
pub async fn fetch(client: &Client, source: &DataSource) -> Result<Vec<u8>> {
    match source {
        DataSource::Path(path) => tokio::fs::read(path)
            .await
            .map_err(|source| LoadError::Io { path: path.clone(), source }),
        DataSource::Url(url) => {
            let resp = client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(LoadError::Status { url: url.clone(), status });
            }
            Ok(resp.bytes().await?.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_and_paths_are_told_apart() {
        assert_eq!(
            DataSource::parse("https://example.org/data.csv"),
            DataSource::Url("https://example.org/data.csv".into())
        );
        assert_eq!(
            DataSource::parse("HTTP://example.org/data.csv"),
            DataSource::Url("HTTP://example.org/data.csv".into())
        );
        assert_eq!(
            DataSource::parse("data/escooters_.csv"),
            DataSource::Path(PathBuf::from("data/escooters_.csv"))
        );
    }

    #[test]
    fn extension_ignores_query_and_case() {
        assert_eq!(DataSource::parse("boundary.GeoJSON").extension().as_deref(), Some("geojson"));
        assert_eq!(DataSource::parse("shapes/ontario.shp").extension().as_deref(), Some("shp"));
        assert_eq!(
            DataSource::parse("https://example.org/b.json?v=2#top").extension().as_deref(),
            Some("json")
        );
        assert_eq!(DataSource::parse("https://example.org/download").extension(), None);
    }

    #[tokio::test]
    async fn reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        std::fs::write(&path, "latitude,longitude\n1,2\n").unwrap();

        let bytes = fetch(&Client::new(), &DataSource::Path(path)).await.unwrap();
        assert_eq!(bytes, b"latitude,longitude\n1,2\n");
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetch(&Client::new(), &DataSource::Path(dir.path().join("nope.csv")))
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
