//! MBTA V3 API access.
//!
//! This module provides an HTTP client for the MBTA V3 API and a
//! fixture-backed stand-in for development.
//!
//! Key characteristics of V3:
//! - Responses are JSON:API: a `data` array plus an `included` side-table
//!   cross-referenced by `relationships`
//! - Timestamps are ISO-8601, usually with an offset, but schedule fields
//!   may arrive naive (agency local time)
//! - Authentication is a static `x-api-key` header

mod client;
mod error;
mod mock;
mod request;
mod types;

pub use client::{MbtaClient, MbtaConfig};
pub use error::FetchError;
pub use mock::MockMbtaClient;
pub use request::{FeedRequest, ResourceKind};
pub use types::{
    Attributes, ErrorBody, Linkage, RawPayload, RawResource, Relationship, ResourceIdentifier,
    value_as_f64,
};

/// Outcome of one fetch. Flatteners accept this directly and treat the
/// error case as "no rows".
pub type FeedResponse = Result<RawPayload, FetchError>;

/// Where payloads come from: the live API or captured fixtures.
#[derive(Clone)]
pub enum MbtaFeed {
    Live(MbtaClient),
    Mock(MockMbtaClient),
}

impl MbtaFeed {
    /// Fetch one resource collection.
    pub async fn fetch(&self, request: &FeedRequest) -> FeedResponse {
        match self {
            MbtaFeed::Live(client) => client.fetch(request).await,
            MbtaFeed::Mock(client) => client.fetch(request).await,
        }
    }

    /// Whether the feed can serve requests at all.
    ///
    /// The mock is always ready; the live client needs an API key.
    pub fn is_configured(&self) -> bool {
        match self {
            MbtaFeed::Live(client) => client.has_api_key(),
            MbtaFeed::Mock(_) => true,
        }
    }
}
