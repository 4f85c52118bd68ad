/// Core data types for the earthquake proximity monitoring service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond small accessors, no I/O, and no external
/// dependencies besides serde derives for configuration.

use serde::Deserialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Alert thresholds
// ---------------------------------------------------------------------------

/// Magnitude at or above which a nearby event raises a `Low` alert.
pub const THRESHOLD_LOW: f64 = 4.0;

/// Magnitude at or above which a nearby event raises a `Medium` alert.
pub const THRESHOLD_MEDIUM: f64 = 5.5;

/// Magnitude at or above which any event raises a `High` alert.
pub const THRESHOLD_HIGH: f64 = 7.0;

/// Magnitude at or above which any event raises a `Danger` alert.
pub const THRESHOLD_DANGEROUS: f64 = 8.0;

/// Events within this great-circle distance of the selected region are "near".
pub const PROXIMITY_RADIUS_KM: f64 = 500.0;

/// Maximum number of events kept in the global list after filtering.
pub const GLOBAL_LIST_LIMIT: usize = 20;

/// Number of global events considered by the classifier.
pub const GLOBAL_CANDIDATE_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A single seismic event from the USGS summary feed.
///
/// Built from one GeoJSON `Feature` after field validation. Never mutated
/// after construction; every poll produces a fresh list.
#[derive(Debug, Clone, PartialEq)]
pub struct SeismicEvent {
    pub id: String,
    pub magnitude: f64,
    pub place: String,
    pub occurred_at_ms: i64,
    pub updated_at_ms: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: f64,
    pub tsunami: bool,
    /// Upstream importance ranking, passed through unmodified.
    pub significance: i64,
}

/// A named location the tracker measures proximity against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Island group or world area, e.g. "Mindanao" or "East Asia".
    pub label: String,
}

// ---------------------------------------------------------------------------
// Feed window
// ---------------------------------------------------------------------------

/// Time span of events requested from the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedWindow {
    Hour,
    Day,
    Week,
}

impl FeedWindow {
    /// File name of the USGS summary feed covering this window.
    pub fn feed_file(&self) -> &'static str {
        match self {
            FeedWindow::Hour => "all_hour.geojson",
            FeedWindow::Day => "all_day.geojson",
            FeedWindow::Week => "all_week.geojson",
        }
    }

    /// Polling cadence for the foreground tracker when this window is selected.
    pub fn refresh_interval(&self) -> Duration {
        match self {
            FeedWindow::Hour => Duration::from_secs(30),
            FeedWindow::Day => Duration::from_secs(300),
            FeedWindow::Week => Duration::from_secs(600),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedWindow::Hour => "hour",
            FeedWindow::Day => "day",
            FeedWindow::Week => "week",
        }
    }
}

impl std::str::FromStr for FeedWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" => Ok(FeedWindow::Hour),
            "day" => Ok(FeedWindow::Day),
            "week" => Ok(FeedWindow::Week),
            other => Err(format!("unknown feed window '{}' (expected hour, day or week)", other)),
        }
    }
}

impl std::fmt::Display for FeedWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Alert types
// ---------------------------------------------------------------------------

/// Alert severity levels, in ascending order of severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AlertLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
    Danger,
}

impl AlertLevel {
    /// How long a notification at this level stays visible.
    pub fn display_duration(&self) -> Duration {
        match self {
            AlertLevel::High | AlertLevel::Danger => Duration::from_secs(30),
            _ => Duration::from_secs(10),
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::None => write!(f, "none"),
            AlertLevel::Low => write!(f, "low"),
            AlertLevel::Medium => write!(f, "medium"),
            AlertLevel::High => write!(f, "high"),
            AlertLevel::Danger => write!(f, "danger"),
        }
    }
}

/// A notification decided by a classifier, not yet displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub level: AlertLevel,
    pub message: String,
}

/// The notification currently shown to the user.
///
/// `last_observed_magnitude` is the newest magnitude the tracker saw on its
/// most recent non-empty pass; it survives expiry of the message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertState {
    pub message: String,
    pub level: AlertLevel,
    pub last_observed_magnitude: Option<f64>,
}

impl AlertState {
    pub fn is_active(&self) -> bool {
        self.level != AlertLevel::None
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Broad category of a feed failure, as surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedErrorKind {
    Fetch,
    Parse,
}

/// Errors that can arise when fetching or decoding the USGS feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    /// Non-2xx HTTP response from the feed endpoint.
    HttpError(u16),
    /// The request never produced a response (DNS, TLS, timeout, reset).
    RequestFailed(String),
    /// The response body could not be deserialized.
    ParseError(String),
}

impl FeedError {
    pub fn kind(&self) -> FeedErrorKind {
        match self {
            FeedError::HttpError(_) | FeedError::RequestFailed(_) => FeedErrorKind::Fetch,
            FeedError::ParseError(_) => FeedErrorKind::Parse,
        }
    }
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::HttpError(code) => write!(f, "HTTP error: {}", code),
            FeedError::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
            FeedError::ParseError(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for FeedError {}

/// Errors raised while loading the service configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file exists but could not be read.
    Io { path: String, source: std::io::Error },
    /// The configuration file is not valid TOML for our schema.
    Parse { path: String, message: String },
    /// The configuration parsed but a value is unusable.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Failed to read {}: {}", path, source),
            ConfigError::Parse { path, message } => write!(f, "Failed to parse {}: {}", path, message),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
