//! Caching layer for route geometry.
//!
//! Shapes change only with a new GTFS release, but every map layer needs
//! them. Decoded segments are cached per route id so toggling a layer on
//! the dashboard fetches its shapes once. Everything else goes straight to
//! the feed: predictions and vehicle positions are stale within seconds.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::{debug, warn};

use crate::domain::ShapeGeometry;
use crate::flatten::route_segments;
use crate::mbta::{FeedRequest, FeedResponse, FetchError, MbtaFeed};

/// Decoded segments for one route.
type ShapeEntry = Arc<Vec<ShapeGeometry>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached routes.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(6 * 60 * 60),
            max_capacity: 64,
        }
    }
}

/// MBTA feed with cached shapes.
///
/// Wraps an [`MbtaFeed`]; [`CachedFeed::fetch`] passes through untouched.
pub struct CachedFeed {
    feed: MbtaFeed,
    shapes: MokaCache<String, ShapeEntry>,
}

impl CachedFeed {
    /// Create a new cached feed.
    pub fn new(feed: MbtaFeed, config: &CacheConfig) -> Self {
        let shapes = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { feed, shapes }
    }

    /// Uncached fetch.
    pub async fn fetch(&self, request: &FeedRequest) -> FeedResponse {
        self.feed.fetch(request).await
    }

    /// Decoded shape segments for a route, using the cache if available.
    ///
    /// Failed fetches are not cached.
    pub async fn route_shapes(&self, route_id: &str) -> Result<ShapeEntry, FetchError> {
        if let Some(cached) = self.shapes.get(route_id).await {
            return Ok(cached);
        }

        let payload = self
            .feed
            .fetch(&FeedRequest::shapes(route_id))
            .await
            .inspect_err(|e| warn!(route = route_id, error = %e, "failed to fetch shapes"))?;

        let entry = Arc::new(route_segments(&Ok(payload)));
        debug!(route = route_id, segments = entry.len(), "caching shapes");
        self.shapes.insert(route_id.to_string(), entry.clone()).await;

        Ok(entry)
    }

    /// Segments for several routes, concatenated in route order.
    ///
    /// Routes whose fetch fails contribute nothing.
    pub async fn layer_shapes(&self, route_ids: &[&str]) -> Vec<ShapeGeometry> {
        let mut segments = Vec::new();
        for route_id in route_ids {
            if let Ok(shapes) = self.route_shapes(route_id).await {
                segments.extend(shapes.iter().cloned());
            }
        }
        segments
    }

    /// Replace a route's cached segments with freshly fetched ones.
    pub async fn store_route_shapes(&self, route_id: &str, segments: Vec<ShapeGeometry>) {
        self.shapes
            .insert(route_id.to_string(), Arc::new(segments))
            .await;
    }
}
