/// Great-circle distance between coordinates.
///
/// Proximity checks throughout the service go through `distance_km` so that
/// the tracker, the sentinel and the presentation labels agree on what
/// "within 500 km" means.

use crate::model::{Region, SeismicEvent};

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
///
/// Total and symmetric; identical points give exactly 0.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair outside [0, 1] for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance from a region's reference point to an event's epicentre.
pub fn distance_to_event(region: &Region, event: &SeismicEvent) -> f64 {
    distance_km(region.latitude, region.longitude, event.latitude, event.longitude)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_POINTS: &[(f64, f64)] = &[
        (7.1907, 125.4553),    // Davao City
        (14.5995, 120.9842),   // Metro Manila
        (36.2048, 138.2529),   // Japan
        (-35.6751, -71.5430),  // Chile
        (61.2181, -149.9003),  // Alaska
        (0.0, 0.0),
        (90.0, 0.0),
        (-90.0, 180.0),
        (0.0, -180.0),
    ];

    #[test]
    fn test_distance_to_self_is_zero() {
        for &(lat, lon) in SAMPLE_POINTS {
            assert_eq!(distance_km(lat, lon, lat, lon), 0.0, "({}, {})", lat, lon);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        for &(lat1, lon1) in SAMPLE_POINTS {
            for &(lat2, lon2) in SAMPLE_POINTS {
                let ab = distance_km(lat1, lon1, lat2, lon2);
                let ba = distance_km(lat2, lon2, lat1, lon1);
                let tolerance = 1e-6 * ab.abs().max(1.0);
                assert!(
                    (ab - ba).abs() <= tolerance,
                    "asymmetric distance between ({}, {}) and ({}, {}): {} vs {}",
                    lat1, lon1, lat2, lon2, ab, ba
                );
                assert!(ab >= 0.0);
            }
        }
    }

    #[test]
    fn test_davao_to_nearby_epicentre_is_about_22_km() {
        let d = distance_km(7.1907, 125.4553, 7.0, 125.5);
        assert!((d - 21.8).abs() < 1.0, "expected ~22 km, got {}", d);
    }

    #[test]
    fn test_davao_to_manila_is_about_970_km() {
        let d = distance_km(7.1907, 125.4553, 14.5995, 120.9842);
        assert!((900.0..1050.0).contains(&d), "expected ~970 km, got {}", d);
    }

    #[test]
    fn test_antipodal_points_are_half_circumference_apart() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d - half).abs() < 1e-6, "expected {}, got {}", half, d);
    }
}
