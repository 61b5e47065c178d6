use formats::{BoundaryRing, parse_boundary_dataset};
use serde_json::Value;
use tracing::{info, warn};

use crate::grid::fallback_grid;

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response.
    Network(String),
    /// The server answered with a non-success status.
    Status(u16),
    /// The body was not JSON.
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Network(reason) => write!(f, "network error: {reason}"),
            FetchError::Status(code) => write!(f, "HTTP status {code}"),
            FetchError::Decode(reason) => write!(f, "body is not JSON: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Host-provided HTTP GET that yields a parsed JSON body.
#[allow(async_fn_in_trait)]
pub trait DatasetFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentOrigin {
    /// Decoded from this dataset URL.
    Source(String),
    /// Every source failed; procedural graticule.
    Grid,
}

/// A source that was tried and skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFailure {
    pub url: String,
    pub reason: String,
}

impl std::fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.url, self.reason)
    }
}

/// Boundary rings ready to be turned into the point cloud, plus the sources
/// skipped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoContent {
    pub rings: Vec<BoundaryRing>,
    pub origin: ContentOrigin,
    pub failures: Vec<SourceFailure>,
}

impl GeoContent {
    pub fn grid() -> Self {
        Self {
            rings: fallback_grid(),
            origin: ContentOrigin::Grid,
            failures: Vec::new(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.rings.iter().map(BoundaryRing::len).sum()
    }
}

fn skip(failures: &mut Vec<SourceFailure>, url: &str, reason: String) {
    warn!(%url, %reason, "boundary source skipped");
    failures.push(SourceFailure {
        url: url.to_string(),
        reason,
    });
}

/// Tries each source in order and settles on the first one that decodes to
/// at least one ring. Never fails: exhaustion yields the fallback grid.
pub async fn load_boundaries<F: DatasetFetcher>(fetcher: &F, sources: &[String]) -> GeoContent {
    let mut failures = Vec::new();
    for url in sources {
        let value = match fetcher.fetch_json(url).await {
            Ok(value) => value,
            Err(e) => {
                skip(&mut failures, url, e.to_string());
                continue;
            }
        };
        match parse_boundary_dataset(&value) {
            Ok(rings) if !rings.is_empty() => {
                info!(%url, rings = rings.len(), "loaded boundary dataset");
                return GeoContent {
                    rings,
                    origin: ContentOrigin::Source(url.clone()),
                    failures,
                };
            }
            Ok(_) => skip(&mut failures, url, "no polygon rings".to_string()),
            Err(e) => skip(&mut failures, url, e.to_string()),
        }
    }
    info!("no boundary source usable, using grid");
    GeoContent {
        failures,
        ..GeoContent::grid()
    }
}

#[cfg(test)]
mod tests {
    use super::{ContentOrigin, DatasetFetcher, FetchError, load_boundaries};
    use serde_json::{Value, json};
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapFetcher {
        responses: HashMap<String, Result<Value, FetchError>>,
        requested: RefCell<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, response: Result<Value, FetchError>) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }
    }

    impl DatasetFetcher for MapFetcher {
        async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
            self.requested.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    fn sources(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|s| s.to_string()).collect()
    }

    fn square() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [10, 0], [10, 10], [0, 0]]]
                }
            }]
        })
    }

    #[test]
    fn first_usable_source_wins() {
        let fetcher = MapFetcher::default()
            .with("/a", Err(FetchError::Network("offline".into())))
            .with("/b", Ok(json!({"unrelated": true})))
            .with("/c", Ok(json!({"type": "FeatureCollection", "features": []})))
            .with("/d", Ok(square()))
            .with("/e", Ok(square()));
        let content = pollster::block_on(load_boundaries(&fetcher, &sources(&["/a", "/b", "/c", "/d", "/e"])));
        assert_eq!(content.origin, ContentOrigin::Source("/d".into()));
        assert_eq!(content.point_count(), 4);
        assert_eq!(*fetcher.requested.borrow(), sources(&["/a", "/b", "/c", "/d"]));
        let skipped: Vec<_> = content.failures.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(skipped, vec!["/a", "/b", "/c"]);
        assert_eq!(content.failures[0].to_string(), "/a: network error: offline");
        assert_eq!(content.failures[2].reason, "no polygon rings");
    }

    #[test]
    fn exhaustion_falls_back_to_grid() {
        let fetcher = MapFetcher::default();
        let content = pollster::block_on(load_boundaries(&fetcher, &sources(&["/x", "/y"])));
        assert_eq!(content.origin, ContentOrigin::Grid);
        assert_eq!(content.rings.len(), 18);
        assert_eq!(fetcher.requested.borrow().len(), 2);
        assert_eq!(content.failures.len(), 2);
        assert_eq!(content.failures[1].reason, "HTTP status 404");
    }

    #[test]
    fn no_sources_means_grid() {
        let content = pollster::block_on(load_boundaries(&MapFetcher::default(), &[]));
        assert_eq!(content.origin, ContentOrigin::Grid);
    }
}
