/// Service configuration loaded from `quakemon.toml`.
///
/// Every key is optional; a missing file means all defaults. Environment
/// variables (also read from `.env`) override a few deployment-specific
/// values:
///
/// - `QUAKEMON_CONFIG`: path of the TOML file (default `./quakemon.toml`)
/// - `QUAKEMON_FEED_URL`: feed base URL, e.g. a local mirror for testing
/// - `QUAKEMON_LOG_FILE`: append log entries to this file
///
/// ```toml
/// [feed]
/// base_url = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary"
/// timeout_secs = 30
///
/// [tracker]
/// region = "Davao City"
/// window = "hour"
/// magnitude_floor = 0.0
///
/// [sentinel]
/// enabled = true
/// region = "Davao City"
/// magnitude_floor = 4.0
/// interval_secs = 120
///
/// [logging]
/// level = "info"
/// timestamps = true
///
/// [[regions]]
/// name = "Palu"
/// latitude = -0.8917
/// longitude = 119.8707
/// label = "Sulawesi"
/// ```

use crate::ingest::usgs::USGS_FEED_BASE_URL;
use crate::logging::LogLevel;
use crate::model::{ConfigError, FeedWindow, Region, THRESHOLD_LOW};
use crate::regions::{self, DEFAULT_REGION};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "quakemon.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub feed: FeedConfig,
    pub tracker: TrackerConfig,
    pub sentinel: SentinelConfig,
    pub logging: LoggingConfig,
    /// Extra entries appended to the built-in region catalogue.
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: USGS_FEED_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    pub region: String,
    pub window: FeedWindow,
    pub magnitude_floor: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            window: FeedWindow::Hour,
            magnitude_floor: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SentinelConfig {
    pub enabled: bool,
    pub region: String,
    pub magnitude_floor: f64,
    pub interval_secs: u64,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            region: DEFAULT_REGION.to_string(),
            magnitude_floor: THRESHOLD_LOW,
            interval_secs: 120,
        }
    }
}

impl SentinelConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Loads `.env`, reads the config file named by `QUAKEMON_CONFIG` (or the
/// default path), applies environment overrides and validates the result.
pub fn load_config() -> Result<ServiceConfig, ConfigError> {
    dotenv::dotenv().ok();
    let path = std::env::var("QUAKEMON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_from_path(&path)?;

    if let Ok(url) = std::env::var("QUAKEMON_FEED_URL") {
        config.feed.base_url = url;
    }
    if let Ok(file) = std::env::var("QUAKEMON_LOG_FILE") {
        config.logging.file = Some(file);
    }

    config.validate()?;
    Ok(config)
}

/// Reads and parses a config file. A file that does not exist yields the
/// defaults; any other read failure is an error.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ServiceConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(ServiceConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&text, &path.display().to_string())
}

/// Parses TOML text. `origin` names the source in error messages.
pub fn parse_config(text: &str, origin: &str) -> Result<ServiceConfig, ConfigError> {
    toml::from_str(text).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Validation and resolution
// ---------------------------------------------------------------------------

impl ServiceConfig {
    /// Built-in catalogue plus configured extras.
    pub fn catalogue(&self) -> Vec<Region> {
        regions::catalogue_with(&self.regions)
    }

    pub fn tracker_region(&self) -> Result<Region, ConfigError> {
        self.resolve_region(&self.tracker.region, "tracker.region")
    }

    pub fn sentinel_region(&self) -> Result<Region, ConfigError> {
        self.resolve_region(&self.sentinel.region, "sentinel.region")
    }

    pub fn log_level(&self) -> Result<LogLevel, ConfigError> {
        self.logging
            .level
            .parse()
            .map_err(|e: String| ConfigError::Invalid(format!("logging.level: {}", e)))
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed.timeout_secs)
    }

    fn resolve_region(&self, name: &str, key: &str) -> Result<Region, ConfigError> {
        regions::find_in(&self.catalogue(), name)
            .cloned()
            .ok_or_else(|| ConfigError::Invalid(format!("{}: unknown region '{}'", key, name)))
    }

    /// Checks every value the service will rely on at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for region in &self.regions {
            validate_region(region)?;
        }
        self.tracker_region()?;
        self.sentinel_region()?;
        validate_floor(self.tracker.magnitude_floor, "tracker.magnitude_floor")?;
        validate_floor(self.sentinel.magnitude_floor, "sentinel.magnitude_floor")?;
        if self.sentinel.interval_secs == 0 {
            return Err(ConfigError::Invalid("sentinel.interval_secs must be positive".to_string()));
        }
        if self.feed.timeout_secs == 0 {
            return Err(ConfigError::Invalid("feed.timeout_secs must be positive".to_string()));
        }
        if self.feed.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("feed.base_url is empty".to_string()));
        }
        self.log_level()?;
        Ok(())
    }
}

pub fn validate_floor(floor: f64, key: &str) -> Result<(), ConfigError> {
    if floor.is_finite() && floor >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{}: {} is not a non-negative magnitude", key, floor)))
    }
}

fn validate_region(region: &Region) -> Result<(), ConfigError> {
    if region.name.trim().is_empty() {
        return Err(ConfigError::Invalid("regions: entry with empty name".to_string()));
    }
    if !(-90.0..=90.0).contains(&region.latitude) {
        return Err(ConfigError::Invalid(format!(
            "regions: latitude {} out of range for '{}'",
            region.latitude, region.name
        )));
    }
    if !(-180.0..=180.0).contains(&region.longitude) {
        return Err(ConfigError::Invalid(format!(
            "regions: longitude {} out of range for '{}'",
            region.longitude, region.name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        config.validate().expect("defaults must validate");
        assert_eq!(config.tracker_region().unwrap().name, "Davao City");
        assert_eq!(config.tracker.window, FeedWindow::Hour);
        assert_eq!(config.sentinel.interval(), Duration::from_secs(120));
        assert_eq!(config.sentinel.magnitude_floor, 4.0);
        assert_eq!(config.log_level().unwrap(), LogLevel::Info);
    }

    #[test]
    fn test_empty_file_means_defaults() {
        let config = parse_config("", "inline").expect("empty TOML is valid");
        assert_eq!(config.feed.base_url, USGS_FEED_BASE_URL);
        assert!(config.sentinel.enabled);
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let config = load_from_path("/nonexistent/quakemon.toml").expect("missing file is fine");
        assert!(config.regions.is_empty());
    }

    #[test]
    fn test_full_file_parses() {
        let text = r#"
            [feed]
            base_url = "http://localhost:9000/feeds"
            timeout_secs = 5

            [tracker]
            region = "palu"
            window = "week"
            magnitude_floor = 2.5

            [sentinel]
            enabled = false
            region = "Cebu City"
            magnitude_floor = 4.5
            interval_secs = 60

            [logging]
            level = "debug"
            file = "quakemon.log"
            timestamps = false

            [[regions]]
            name = "Palu"
            latitude = -0.8917
            longitude = 119.8707
            label = "Sulawesi"
        "#;
        let config = parse_config(text, "inline").expect("valid config");
        config.validate().expect("valid values");
        assert_eq!(config.tracker.window, FeedWindow::Week);
        assert_eq!(config.tracker_region().unwrap().name, "Palu");
        assert_eq!(config.sentinel_region().unwrap().label, "Visayas");
        assert_eq!(config.feed_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level().unwrap(), LogLevel::Debug);
        assert_eq!(config.logging.file.as_deref(), Some("quakemon.log"));
        assert!(!config.sentinel.enabled);
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = parse_config("[tracker\nregion = 1", "inline");
        assert!(matches!(result, Err(ConfigError::Parse { .. })), "{:?}", result);
    }

    #[test]
    fn test_unknown_window_is_parse_error() {
        let result = parse_config("[tracker]\nwindow = \"month\"", "inline");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_unknown_region_is_invalid() {
        let config = parse_config("[tracker]\nregion = \"Atlantis\"", "inline").unwrap();
        let err = config.validate().expect_err("unknown region must fail");
        assert!(err.to_string().contains("Atlantis"), "{}", err);
    }

    #[test]
    fn test_negative_floor_is_invalid() {
        let config = parse_config("[tracker]\nmagnitude_floor = -1.0", "inline").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_sentinel_interval_is_invalid() {
        let config = parse_config("[sentinel]\ninterval_secs = 0", "inline").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_out_of_range_extra_region_is_invalid() {
        let text = r#"
            [[regions]]
            name = "Nowhere"
            latitude = 91.0
            longitude = 0.0
            label = "Void"
        "#;
        let config = parse_config(text, "inline").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_log_level_is_invalid() {
        let config = parse_config("[logging]\nlevel = \"loud\"", "inline").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
