/// Upstream data ingestion.
///
/// Submodules:
/// - `usgs`: USGS earthquake summary feed (GeoJSON) client and parser.
///
/// The polling loop only sees the `FeedFetcher` trait, so tests can swap the
/// HTTP client for a scripted source.

pub mod usgs;

use crate::model::{FeedError, FeedWindow, SeismicEvent};
use std::future::Future;
use std::sync::Arc;

/// Source of seismic events for a feed window.
///
/// Implementations return events newest first. A failure is either a fetch
/// error (transport or HTTP status) or a parse error (malformed body).
pub trait FeedFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        window: FeedWindow,
    ) -> impl Future<Output = Result<Vec<SeismicEvent>, FeedError>> + Send;
}

impl<F: FeedFetcher> FeedFetcher for Arc<F> {
    fn fetch(
        &self,
        window: FeedWindow,
    ) -> impl Future<Output = Result<Vec<SeismicEvent>, FeedError>> + Send {
        (**self).fetch(window)
    }
}
