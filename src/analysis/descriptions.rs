/// Human-readable labels for events and the place search filter.

use crate::geo::distance_to_event;
use crate::model::{Region, SeismicEvent};

/// Expected impact for a magnitude, from micro to catastrophic.
pub fn risk_description(magnitude: f64) -> &'static str {
    if magnitude >= 8.0 {
        "Catastrophic damage expected"
    } else if magnitude >= 7.0 {
        "Major damage likely"
    } else if magnitude >= 6.0 {
        "Strong earthquake - damaging"
    } else if magnitude >= 5.0 {
        "Moderate earthquake - felt widely"
    } else if magnitude >= 4.0 {
        "Light earthquake - felt locally"
    } else if magnitude >= 3.0 {
        "Minor earthquake - barely felt"
    } else {
        "Micro earthquake - not felt"
    }
}

/// Short severity label for non-specialists.
pub fn simple_description(magnitude: f64) -> &'static str {
    if magnitude >= 7.0 {
        "Very Dangerous"
    } else if magnitude >= 6.0 {
        "Dangerous"
    } else if magnitude >= 5.0 {
        "Strong"
    } else if magnitude >= 4.0 {
        "Moderate"
    } else {
        "Light"
    }
}

/// e.g. "22km from Davao City"
pub fn distance_label(region: &Region, event: &SeismicEvent) -> String {
    format!("{:.0}km from {}", distance_to_event(region, event), region.name)
}

/// Case-insensitive substring match on the place text. An empty query
/// matches everything.
pub fn filter_by_place<'a>(events: &'a [SeismicEvent], query: &str) -> Vec<&'a SeismicEvent> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return events.iter().collect();
    }
    events
        .iter()
        .filter(|e| e.place.to_lowercase().contains(&query))
        .collect()
}
