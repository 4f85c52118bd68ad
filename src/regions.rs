/// Region registry for the earthquake proximity monitor.
///
/// Defines the canonical list of places the tracker can measure proximity
/// against: major Philippine cities followed by seismically active world
/// regions. This is the single source of truth for region coordinates; the
/// config file may append entries but never edits these.

use crate::model::Region;

// ---------------------------------------------------------------------------
// Region metadata
// ---------------------------------------------------------------------------

/// Static catalogue entry. Converted to an owned `Region` on lookup.
pub struct RegionEntry {
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
    pub label: &'static str,
    pub scope: RegionScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionScope {
    Domestic,
    World,
}

/// Name of the region selected when nothing else is configured.
pub const DEFAULT_REGION: &str = "Davao City";

/// Built-in catalogue, domestic cities first.
pub static REGION_CATALOGUE: &[RegionEntry] = &[
    RegionEntry { name: "Davao City", latitude: 7.1907, longitude: 125.4553, label: "Mindanao", scope: RegionScope::Domestic },
    RegionEntry { name: "Metro Manila", latitude: 14.5995, longitude: 120.9842, label: "Luzon", scope: RegionScope::Domestic },
    RegionEntry { name: "Cebu City", latitude: 10.3157, longitude: 123.8854, label: "Visayas", scope: RegionScope::Domestic },
    RegionEntry { name: "Zamboanga City", latitude: 6.9214, longitude: 122.0790, label: "Mindanao", scope: RegionScope::Domestic },
    RegionEntry { name: "Cagayan de Oro", latitude: 8.4542, longitude: 124.6319, label: "Mindanao", scope: RegionScope::Domestic },
    RegionEntry { name: "Iloilo City", latitude: 10.7202, longitude: 122.5621, label: "Visayas", scope: RegionScope::Domestic },
    RegionEntry { name: "Bacolod City", latitude: 10.6270, longitude: 122.9918, label: "Visayas", scope: RegionScope::Domestic },
    RegionEntry { name: "General Santos", latitude: 6.1164, longitude: 125.1716, label: "Mindanao", scope: RegionScope::Domestic },
    RegionEntry { name: "Baguio City", latitude: 16.4023, longitude: 120.5960, label: "Luzon", scope: RegionScope::Domestic },
    RegionEntry { name: "Tacloban City", latitude: 11.2447, longitude: 125.0031, label: "Visayas", scope: RegionScope::Domestic },
    RegionEntry { name: "Philippines", latitude: 12.8797, longitude: 121.7740, label: "Southeast Asia", scope: RegionScope::World },
    RegionEntry { name: "Japan", latitude: 36.2048, longitude: 138.2529, label: "East Asia", scope: RegionScope::World },
    RegionEntry { name: "Indonesia", latitude: -0.7893, longitude: 113.9213, label: "Southeast Asia", scope: RegionScope::World },
    RegionEntry { name: "California, USA", latitude: 36.7783, longitude: -119.4179, label: "North America", scope: RegionScope::World },
    RegionEntry { name: "Chile", latitude: -35.6751, longitude: -71.5430, label: "South America", scope: RegionScope::World },
    RegionEntry { name: "Turkey", latitude: 38.9637, longitude: 35.2433, label: "Middle East", scope: RegionScope::World },
    RegionEntry { name: "New Zealand", latitude: -40.9006, longitude: 174.8860, label: "Oceania", scope: RegionScope::World },
    RegionEntry { name: "Alaska, USA", latitude: 61.2181, longitude: -149.9003, label: "North America", scope: RegionScope::World },
];

impl RegionEntry {
    pub fn to_region(&self) -> Region {
        Region {
            name: self.name.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            label: self.label.to_string(),
        }
    }
}

/// Full catalogue as owned regions, with any configured extras appended.
pub fn catalogue_with(extra: &[Region]) -> Vec<Region> {
    REGION_CATALOGUE
        .iter()
        .map(RegionEntry::to_region)
        .chain(extra.iter().cloned())
        .collect()
}

/// Looks up a built-in region by name, ignoring case and surrounding space.
pub fn find_region(name: &str) -> Option<Region> {
    let wanted = name.trim();
    REGION_CATALOGUE
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(wanted))
        .map(RegionEntry::to_region)
}

/// Looks up a region in an owned catalogue (built-ins plus extras).
pub fn find_in<'a>(catalogue: &'a [Region], name: &str) -> Option<&'a Region> {
    let wanted = name.trim();
    catalogue.iter().find(|r| r.name.eq_ignore_ascii_case(wanted))
}

/// The default region, Davao City.
pub fn default_region() -> Region {
    REGION_CATALOGUE[0].to_region()
}

pub fn regions_in_scope(scope: RegionScope) -> Vec<&'static str> {
    REGION_CATALOGUE
        .iter()
        .filter(|r| r.scope == scope)
        .map(|r| r.name)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
