//! Mock MBTA client for running without API access.
//!
//! Loads captured V3 responses from JSON files and serves them as if they
//! were live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use super::client::parse_payload;
use super::error::FetchError;
use super::request::FeedRequest;
use super::types::RawPayload;

/// Mock client that serves payloads from a fixture directory.
///
/// Files are looked up by [`FeedRequest::fixture_name`]: `alerts.json`,
/// `predictions_place-alfcl.json`, `vehicles.json`, `shapes_Red.json` and
/// so on. A request with no matching file fails with a 404-style error, the
/// same way the dashboard would see an unknown route.
#[derive(Clone)]
pub struct MockMbtaClient {
    payloads: Arc<HashMap<String, RawPayload>>,
}

impl MockMbtaClient {
    /// Load every `*.json` file in `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let payloads = load_dir(data_dir.as_ref())?;
        Ok(Self {
            payloads: Arc::new(payloads),
        })
    }

    /// Build a mock from in-memory payloads, keyed by fixture name.
    pub fn from_payloads(payloads: HashMap<String, RawPayload>) -> Self {
        Self {
            payloads: Arc::new(payloads),
        }
    }

    /// Serve the fixture for `request`.
    pub async fn fetch(&self, request: &FeedRequest) -> Result<RawPayload, FetchError> {
        let name = request.fixture_name();

        self.payloads
            .get(&name)
            .cloned()
            .ok_or_else(|| FetchError::Api {
                status: 404,
                message: format!("no mock data for {name}"),
            })
    }

    /// Fixture names currently loaded.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = self.payloads.keys().cloned().collect();
        names.sort();
        names
    }
}

fn load_dir(data_dir: &Path) -> Result<HashMap<String, RawPayload>, FetchError> {
    let entries = std::fs::read_dir(data_dir).map_err(|e| {
        FetchError::Fixture(format!("failed to read {}: {e}", data_dir.display()))
    })?;

    let mut payloads = HashMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| FetchError::Fixture(e.to_string()))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let json = std::fs::read_to_string(&path)
            .map_err(|e| FetchError::Fixture(format!("failed to read {}: {e}", path.display())))?;
        let payload = parse_payload(&json)?;

        payloads.insert(stem.to_string(), payload);
    }

    if payloads.is_empty() {
        return Err(FetchError::Fixture(format!(
            "no fixture files found in {}",
            data_dir.display()
        )));
    }

    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURES: &str = "data/fixtures";

    #[tokio::test]
    async fn load_fixtures() {
        let client = MockMbtaClient::new(FIXTURES).unwrap();
        let names = client.available();

        assert!(names.contains(&"alerts".to_string()));
        assert!(names.contains(&"predictions_place-alfcl".to_string()));
        assert!(names.contains(&"vehicles".to_string()));
        assert!(names.contains(&"shapes_Red".to_string()));
    }

    #[tokio::test]
    async fn serves_predictions_with_included() {
        let client = MockMbtaClient::new(FIXTURES).unwrap();

        let payload = client
            .fetch(&FeedRequest::predictions_at("Red", "place-alfcl"))
            .await
            .unwrap();

        assert!(!payload.data.is_empty());
        assert!(!payload.included.is_empty());
    }

    #[tokio::test]
    async fn unknown_fixture_returns_error() {
        let client = MockMbtaClient::new(FIXTURES).unwrap();

        let result = client.fetch(&FeedRequest::shapes("Mattapan")).await;

        assert!(matches!(result, Err(FetchError::Api { status: 404, .. })));
    }

    #[test]
    fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MockMbtaClient::new(dir.path()),
            Err(FetchError::Fixture(_))
        ));
    }
}
