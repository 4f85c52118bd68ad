/// USGS Earthquake Hazards Program summary feed client
///
/// Retrieves the real-time GeoJSON summary feeds (all events in the past
/// hour, day or week) and converts each `Feature` into a `SeismicEvent`.
///
/// Feed documentation: https://earthquake.usgs.gov/earthquakes/feed/v1.0/geojson.php

use crate::ingest::FeedFetcher;
use crate::logging::{self, Component};
use crate::model::{FeedError, FeedWindow, SeismicEvent};
use serde::Deserialize;
use std::time::Duration;

pub const USGS_FEED_BASE_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary";

// ============================================================================
// GeoJSON Response Structures
// ============================================================================

/// Top-level `FeatureCollection`. Features are kept as raw JSON so a single
/// malformed record can be skipped without rejecting the whole batch.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub features: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct FeedFeature {
    pub id: Option<String>,
    pub properties: FeedProperties,
    pub geometry: Option<FeedGeometry>,
}

#[derive(Debug, Deserialize)]
pub struct FeedProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    pub time: Option<i64>,     // epoch milliseconds
    pub updated: Option<i64>,  // epoch milliseconds
    pub tsunami: Option<i64>,  // 0 or 1
    pub sig: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FeedGeometry {
    /// [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Result of decoding one feed body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFeed {
    /// Valid events, newest first.
    pub events: Vec<SeismicEvent>,
    /// Records dropped by field validation.
    pub skipped: usize,
}

// ============================================================================
// URL construction and parsing
// ============================================================================

/// Builds the summary feed URL for a window, e.g.
/// `https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_hour.geojson`.
pub fn build_feed_url(base_url: &str, window: FeedWindow) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), window.feed_file())
}

/// Decodes a GeoJSON summary feed body.
///
/// Returns `ParseError` only when the body itself is not a feature
/// collection; individual records failing validation are counted in
/// `skipped` and left out.
pub fn parse_feed_response(body: &str) -> Result<ParsedFeed, FeedError> {
    let response: FeedResponse =
        serde_json::from_str(body).map_err(|e| FeedError::ParseError(e.to_string()))?;

    let mut events = Vec::with_capacity(response.features.len());
    let mut skipped = 0;

    for raw in response.features {
        let event = serde_json::from_value::<FeedFeature>(raw)
            .map_err(|e| e.to_string())
            .and_then(feature_to_event);
        match event {
            Ok(event) => events.push(event),
            Err(reason) => {
                skipped += 1;
                logging::debug(Component::Feed, None, &format!("Skipping feed record: {}", reason));
            }
        }
    }

    sort_newest_first(&mut events);
    Ok(ParsedFeed { events, skipped })
}

/// Stable sort by event time, newest first.
pub fn sort_newest_first(events: &mut [SeismicEvent]) {
    events.sort_by(|a, b| b.occurred_at_ms.cmp(&a.occurred_at_ms));
}

/// Validates the required fields of one feature.
fn feature_to_event(feature: FeedFeature) -> Result<SeismicEvent, String> {
    let id = feature
        .id
        .filter(|id| !id.is_empty())
        .ok_or("missing event id")?;
    let props = feature.properties;

    let magnitude = props
        .mag
        .filter(|m| m.is_finite())
        .ok_or_else(|| format!("{}: missing magnitude", id))?;
    let place = props.place.ok_or_else(|| format!("{}: missing place", id))?;
    let occurred_at_ms = props.time.ok_or_else(|| format!("{}: missing time", id))?;

    let coords = feature
        .geometry
        .map(|g| g.coordinates)
        .ok_or_else(|| format!("{}: missing geometry", id))?;
    if coords.len() < 2 {
        return Err(format!("{}: expected at least 2 coordinates, got {}", id, coords.len()));
    }
    let (longitude, latitude) = (coords[0], coords[1]);
    let depth_km = coords.get(2).copied().unwrap_or(0.0);

    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("{}: latitude {} out of range", id, latitude));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("{}: longitude {} out of range", id, longitude));
    }

    Ok(SeismicEvent {
        magnitude,
        place,
        occurred_at_ms,
        updated_at_ms: props.updated.unwrap_or(occurred_at_ms),
        longitude,
        latitude,
        depth_km: if depth_km.is_finite() { depth_km } else { 0.0 },
        tsunami: props.tsunami == Some(1),
        significance: props.sig.unwrap_or(0),
        id,
    })
}

// ============================================================================
// API Client
// ============================================================================

/// HTTP client for the USGS summary feeds.
#[derive(Debug, Clone)]
pub struct UsgsFeedClient {
    client: reqwest::Client,
    base_url: String,
}

impl UsgsFeedClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl FeedFetcher for UsgsFeedClient {
    async fn fetch(&self, window: FeedWindow) -> Result<Vec<SeismicEvent>, FeedError> {
        let url = build_feed_url(&self.base_url, window);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::RequestFailed(e.to_string()))?;

        let parsed = parse_feed_response(&body)?;
        if parsed.skipped > 0 {
            logging::warn(
                Component::Feed,
                Some(window.as_str()),
                &format!("{} malformed records skipped", parsed.skipped),
            );
        }
        Ok(parsed.events)
    }
}

// ============================================================================
// Tests
// ============================================================================
