//! Magnitude threshold classification for the foreground tracker.
//!
//! Decides, from one poll's `nearby` and `global` lists, whether to raise a
//! notification and at what level. The rules are applied in a fixed order
//! and each later rule may override the result of an earlier one:
//!
//! 1. magnitude thresholds (proximity-gated below `THRESHOLD_HIGH`)
//! 2. magnitude jump since the previous pass
//! 3. tsunami flag near the region
//!
//! Every rule is a pure function from the previous verdict to the next, so
//! the precedence can be tested rule by rule.

use crate::geo::distance_to_event;
use crate::model::{
    Alert, AlertLevel, GLOBAL_CANDIDATE_LIMIT, PROXIMITY_RADIUS_KM, Region, SeismicEvent,
    THRESHOLD_DANGEROUS, THRESHOLD_HIGH, THRESHOLD_LOW, THRESHOLD_MEDIUM,
};

/// A jump larger than this is a rapid increase.
pub const RAPID_INCREASE_DELTA: f64 = 2.0;

/// A jump larger than this (but not rapid) is increasing activity.
pub const INCREASING_DELTA: f64 = 1.0;

/// Outcome of one classification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// `None` when nothing should be shown; the current notification is
    /// then left as it is.
    pub alert: Option<Alert>,
    /// Magnitude to compare against on the next pass.
    pub previous_magnitude: Option<f64>,
}

/// Level and message accumulated across the rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub level: AlertLevel,
    pub message: String,
}

impl Verdict {
    fn quiet() -> Self {
        Verdict { level: AlertLevel::None, message: String::new() }
    }

    fn into_alert(self) -> Option<Alert> {
        match self.level {
            AlertLevel::None => None,
            level => Some(Alert { level, message: self.message }),
        }
    }
}

/// The event being judged and where it sits relative to the region.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub event: &'a SeismicEvent,
    pub region: &'a Region,
    pub distance_km: f64,
    pub is_near: bool,
}

impl<'a> Candidate<'a> {
    pub fn new(event: &'a SeismicEvent, region: &'a Region) -> Self {
        let distance_km = distance_to_event(region, event);
        Candidate {
            event,
            region,
            distance_km,
            is_near: distance_km <= PROXIMITY_RADIUS_KM,
        }
    }

    fn location_info(&self) -> String {
        if self.is_near {
            format!(
                "NEAR {} ({:.0}km away)",
                self.region.name.to_uppercase(),
                self.distance_km
            )
        } else {
            "GLOBAL".to_string()
        }
    }
}

/// Classifies one poll.
///
/// The candidate is the first of `nearby` followed by the first
/// `GLOBAL_CANDIDATE_LIMIT` entries of `global`. With no candidate at all the
/// previous magnitude is returned unchanged and no alert is produced.
pub fn classify(
    nearby: &[SeismicEvent],
    global: &[SeismicEvent],
    region: &Region,
    previous_magnitude: Option<f64>,
) -> Classification {
    let latest = nearby
        .iter()
        .chain(global.iter().take(GLOBAL_CANDIDATE_LIMIT))
        .next();
    let Some(latest) = latest else {
        return Classification { alert: None, previous_magnitude };
    };

    let candidate = Candidate::new(latest, region);
    let verdict = magnitude_rule(&candidate);
    let verdict = match previous_magnitude {
        Some(previous) => delta_rule(verdict, &candidate, previous),
        None => verdict,
    };
    let verdict = tsunami_rule(verdict, &candidate);

    Classification {
        alert: verdict.into_alert(),
        previous_magnitude: Some(latest.magnitude),
    }
}

/// Fixed thresholds. Only `High` and above fire for distant events.
pub fn magnitude_rule(candidate: &Candidate<'_>) -> Verdict {
    let mag = candidate.event.magnitude;
    let region = &candidate.region.name;

    if mag >= THRESHOLD_DANGEROUS {
        Verdict {
            level: AlertLevel::Danger,
            message: format!("🚨 EXTREME ALERT! M{} earthquake {}", mag, candidate.location_info()),
        }
    } else if mag >= THRESHOLD_HIGH {
        Verdict {
            level: AlertLevel::High,
            message: format!("⚠️ MAJOR ALERT! M{} earthquake {}", mag, candidate.location_info()),
        }
    } else if mag >= THRESHOLD_MEDIUM && candidate.is_near {
        Verdict {
            level: AlertLevel::Medium,
            message: format!("🔔 SIGNIFICANT ALERT! M{} earthquake near {}", mag, region),
        }
    } else if mag >= THRESHOLD_LOW && candidate.is_near {
        Verdict {
            level: AlertLevel::Low,
            message: format!("ℹ️ EARTHQUAKE ALERT! M{} earthquake near {}", mag, region),
        }
    } else {
        Verdict::quiet()
    }
}

/// Escalation on a magnitude jump since the previous pass. Never downgrades.
///
/// A rapid increase always replaces the message and lifts a quiet verdict to
/// `High`. A smaller increase only speaks up when nothing else did.
pub fn delta_rule(verdict: Verdict, candidate: &Candidate<'_>, previous: f64) -> Verdict {
    let mag = candidate.event.magnitude;
    let delta = mag - previous;

    if delta > RAPID_INCREASE_DELTA {
        let level = match verdict.level {
            AlertLevel::None => AlertLevel::High,
            level => level,
        };
        Verdict {
            level,
            message: format!(
                "📈 RAPID INCREASE! Magnitude jumped from M{:.1} to M{:.1} {}",
                previous,
                mag,
                candidate.location_info()
            ),
        }
    } else if delta > INCREASING_DELTA && verdict.level == AlertLevel::None {
        Verdict {
            level: AlertLevel::Medium,
            message: format!("↗️ INCREASING ACTIVITY! Magnitude rising {}", candidate.location_info()),
        }
    } else {
        verdict
    }
}

/// A tsunami-flagged event near the region is always `Danger`.
pub fn tsunami_rule(verdict: Verdict, candidate: &Candidate<'_>) -> Verdict {
    if candidate.event.tsunami && candidate.is_near {
        Verdict {
            level: AlertLevel::Danger,
            message: format!(
                "🌊 TSUNAMI WARNING! M{} earthquake near {}",
                candidate.event.magnitude, candidate.region.name
            ),
        }
    } else {
        verdict
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{default_region, find_region};

    fn quake(magnitude: f64, lat: f64, lon: f64, tsunami: bool) -> SeismicEvent {
        SeismicEvent {
            id: format!("q{}", magnitude),
            magnitude,
            place: "test".to_string(),
            occurred_at_ms: 1_714_560_000_000,
            updated_at_ms: 1_714_560_000_000,
            longitude: lon,
            latitude: lat,
            depth_km: 10.0,
            tsunami,
            significance: 0,
        }
    }

    /// ~22 km from Davao City.
    fn near(magnitude: f64) -> SeismicEvent {
        quake(magnitude, 7.0, 125.5, false)
    }

    /// Roughly 600 km north of Davao City, just outside the radius.
    fn far_600km(magnitude: f64) -> SeismicEvent {
        quake(magnitude, 12.6, 125.4553, false)
    }

    fn level_of(c: &Classification) -> AlertLevel {
        c.alert.as_ref().map(|a| a.level).unwrap_or(AlertLevel::None)
    }

    #[test]
    fn test_far_fixture_is_outside_radius() {
        let region = default_region();
        let event = far_600km(1.0);
        let candidate = Candidate::new(&event, &region);
        assert!(!candidate.is_near);
        assert!((candidate.distance_km - 601.5).abs() < 5.0, "got {}", candidate.distance_km);
    }

    // --- Empty candidate set --------------------------------------------------

    #[test]
    fn test_empty_candidates_raise_nothing_and_keep_previous() {
        let c = classify(&[], &[], &default_region(), Some(4.2));
        assert!(c.alert.is_none());
        assert_eq!(c.previous_magnitude, Some(4.2));

        let c = classify(&[], &[], &default_region(), None);
        assert_eq!(c.previous_magnitude, None);
    }

    // --- Magnitude thresholds -------------------------------------------------

    #[test]
    fn test_extreme_alert_near_davao() {
        let c = classify(&[near(8.2)], &[], &default_region(), None);
        let alert = c.alert.expect("M8.2 must alert");
        assert_eq!(alert.level, AlertLevel::Danger);
        assert!(alert.message.contains("EXTREME ALERT"), "{}", alert.message);
        assert!(alert.message.contains("NEAR DAVAO CITY (22km away)"), "{}", alert.message);
        assert_eq!(c.previous_magnitude, Some(8.2));
    }

    #[test]
    fn test_major_alert_fires_even_when_far() {
        let c = classify(&[], &[far_600km(7.1)], &default_region(), None);
        let alert = c.alert.expect("M7.1 must alert anywhere");
        assert_eq!(alert.level, AlertLevel::High);
        assert!(alert.message.contains("MAJOR ALERT"));
        assert!(alert.message.ends_with("GLOBAL"), "{}", alert.message);
    }

    #[test]
    fn test_medium_and_low_require_proximity() {
        let region = default_region();
        assert_eq!(level_of(&classify(&[near(5.5)], &[], &region, None)), AlertLevel::Medium);
        assert_eq!(level_of(&classify(&[near(4.0)], &[], &region, None)), AlertLevel::Low);
        assert_eq!(level_of(&classify(&[], &[far_600km(6.9)], &region, None)), AlertLevel::None);
        assert_eq!(level_of(&classify(&[near(3.9)], &[], &region, None)), AlertLevel::None);
    }

    #[test]
    fn test_quiet_pass_still_records_magnitude() {
        let c = classify(&[near(2.0)], &[], &default_region(), Some(1.5));
        assert!(c.alert.is_none());
        assert_eq!(c.previous_magnitude, Some(2.0));
    }

    #[test]
    fn test_nearby_takes_precedence_over_global_as_latest() {
        let region = default_region();
        let c = classify(&[near(4.1)], &[far_600km(7.5)], &region, None);
        let alert = c.alert.expect("nearby M4.1 alerts low");
        assert_eq!(alert.level, AlertLevel::Low);
        assert_eq!(c.previous_magnitude, Some(4.1));
    }

    #[test]
    fn test_only_first_five_global_entries_are_candidates() {
        let region = default_region();
        let global: Vec<_> = (0..5).map(|_| far_600km(1.0)).collect();
        let c = classify(&[], &global, &region, None);
        assert_eq!(c.previous_magnitude, Some(1.0));

        // Slicing never reaches past the fifth entry, and an empty nearby
        // list falls through to global[0].
        let mut global = vec![far_600km(7.2)];
        global.extend((0..10).map(|_| far_600km(9.0)));
        let c = classify(&[], &global, &region, None);
        assert_eq!(level_of(&c), AlertLevel::High);
    }

    // --- Magnitude delta ------------------------------------------------------

    #[test]
    fn test_rapid_increase_lifts_quiet_verdict_to_high() {
        let c = classify(&[], &[far_600km(6.5)], &default_region(), Some(4.0));
        let alert = c.alert.expect("delta 2.5 must alert");
        assert_eq!(alert.level, AlertLevel::High);
        assert!(alert.message.contains("RAPID INCREASE"), "{}", alert.message);
        assert!(alert.message.contains("from M4.0 to M6.5"), "{}", alert.message);
    }

    #[test]
    fn test_rapid_increase_keeps_higher_level_but_replaces_message() {
        let c = classify(&[near(8.5)], &[], &default_region(), Some(6.0));
        let alert = c.alert.expect("must alert");
        assert_eq!(alert.level, AlertLevel::Danger);
        assert!(alert.message.contains("RAPID INCREASE"));
    }

    #[test]
    fn test_rapid_increase_never_downgrades_low() {
        let c = classify(&[near(4.5)], &[], &default_region(), Some(2.0));
        let alert = c.alert.expect("must alert");
        assert_eq!(alert.level, AlertLevel::Low);
        assert!(alert.message.contains("RAPID INCREASE"));
    }

    #[test]
    fn test_increasing_activity_only_when_otherwise_quiet() {
        let region = default_region();

        let c = classify(&[], &[far_600km(5.0)], &region, Some(3.5));
        let alert = c.alert.expect("delta 1.5 on a quiet verdict alerts");
        assert_eq!(alert.level, AlertLevel::Medium);
        assert!(alert.message.contains("INCREASING ACTIVITY"));

        let c = classify(&[near(4.6)], &[], &region, Some(3.0));
        let alert = c.alert.expect("threshold rule already fired");
        assert_eq!(alert.level, AlertLevel::Low);
        assert!(alert.message.contains("EARTHQUAKE ALERT"), "{}", alert.message);
    }

    #[test]
    fn test_delta_bounds_are_exclusive() {
        let region = default_region();
        let c = classify(&[], &[far_600km(5.0)], &region, Some(3.0));
        let alert = c.alert.expect("delta of exactly 2.0 is still an increase");
        assert_eq!(alert.level, AlertLevel::Medium);
        assert!(alert.message.contains("INCREASING ACTIVITY"), "{}", alert.message);

        let c = classify(&[], &[far_600km(4.0)], &region, Some(3.0));
        assert!(c.alert.is_none(), "delta of exactly 1.0 is not an increase");
        assert_eq!(c.previous_magnitude, Some(4.0));
    }

    #[test]
    fn test_small_or_negative_delta_changes_nothing() {
        let region = default_region();
        assert!(classify(&[], &[far_600km(5.0)], &region, Some(4.0)).alert.is_none());
        assert!(classify(&[], &[far_600km(3.0)], &region, Some(6.0)).alert.is_none());
    }

    #[test]
    fn test_high_and_dangerous_thresholds_are_inclusive_anywhere() {
        let region = default_region();
        assert_eq!(level_of(&classify(&[], &[far_600km(7.0)], &region, None)), AlertLevel::High);
        assert_eq!(level_of(&classify(&[], &[far_600km(8.0)], &region, None)), AlertLevel::Danger);
        assert_eq!(level_of(&classify(&[], &[far_600km(6.9)], &region, None)), AlertLevel::None);
    }

    // --- Tsunami --------------------------------------------------------------

    #[test]
    fn test_tsunami_near_region_forces_danger() {
        let event = quake(4.2, 7.0, 125.5, true);
        let c = classify(&[event], &[], &default_region(), None);
        let alert = c.alert.expect("tsunami near region must alert");
        assert_eq!(alert.level, AlertLevel::Danger);
        assert!(alert.message.contains("TSUNAMI WARNING"));
    }

    #[test]
    fn test_tsunami_overrides_rapid_increase() {
        let event = quake(6.0, 7.0, 125.5, true);
        let c = classify(&[event], &[], &default_region(), Some(3.0));
        let alert = c.alert.expect("must alert");
        assert_eq!(alert.level, AlertLevel::Danger);
        assert!(alert.message.contains("TSUNAMI WARNING"));
    }

    #[test]
    fn test_distant_tsunami_is_ignored_by_tsunami_rule() {
        let event = quake(6.0, 12.6, 125.4553, true);
        let c = classify(&[], &[event], &default_region(), None);
        assert!(c.alert.is_none());
    }

    #[test]
    fn test_proximity_is_measured_from_selected_region() {
        let manila = find_region("Metro Manila").expect("Manila in catalogue");
        let c = classify(&[], &[near(5.6)], &manila, None);
        assert!(c.alert.is_none(), "Davao-area M5.6 is not near Manila");
        let c = classify(&[near(5.6)], &[], &default_region(), None);
        assert_eq!(level_of(&c), AlertLevel::Medium);
    }
}
