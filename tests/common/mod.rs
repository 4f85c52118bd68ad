//! Shared helpers for integration tests.

#![allow(dead_code)]

use quakemon_service::ingest::FeedFetcher;
use quakemon_service::model::{FeedError, FeedWindow, SeismicEvent};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Feed source that replays a script of responses, then repeats `fallback`.
/// Every call is recorded with the (paused) clock time and requested window.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<Vec<SeismicEvent>, FeedError>>>,
    fallback: Vec<SeismicEvent>,
    calls: Mutex<Vec<(Instant, FeedWindow)>>,
}

impl ScriptedFetcher {
    pub fn new(
        script: Vec<Result<Vec<SeismicEvent>, FeedError>>,
        fallback: Vec<SeismicEvent>,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Always returns the same batch.
    pub fn repeating(events: Vec<SeismicEvent>) -> Arc<Self> {
        Self::new(Vec::new(), events)
    }

    pub fn calls(&self) -> Vec<(Instant, FeedWindow)> {
        self.calls.lock().unwrap().clone()
    }

    /// Seconds after `start` at which each fetch happened.
    pub fn call_offsets(&self, start: Instant) -> Vec<u64> {
        self.calls()
            .into_iter()
            .map(|(at, _)| (at - start).as_secs())
            .collect()
    }
}

impl FeedFetcher for ScriptedFetcher {
    async fn fetch(&self, window: FeedWindow) -> Result<Vec<SeismicEvent>, FeedError> {
        self.calls.lock().unwrap().push((Instant::now(), window));
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

pub fn quake(id: &str, magnitude: f64, lat: f64, lon: f64, time_ms: i64) -> SeismicEvent {
    SeismicEvent {
        id: id.to_string(),
        magnitude,
        place: format!("event {}", id),
        occurred_at_ms: time_ms,
        updated_at_ms: time_ms,
        longitude: lon,
        latitude: lat,
        depth_km: 10.0,
        tsunami: false,
        significance: 100,
    }
}

/// An event about 22 km from Davao City.
pub fn near_davao(id: &str, magnitude: f64, time_ms: i64) -> SeismicEvent {
    quake(id, magnitude, 7.0, 125.5, time_ms)
}

/// An event about 600 km north of Davao City.
pub fn far_from_davao(id: &str, magnitude: f64, time_ms: i64) -> SeismicEvent {
    quake(id, magnitude, 12.6, 125.4553, time_ms)
}
