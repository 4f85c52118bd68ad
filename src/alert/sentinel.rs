/// Decision rule for the always-on background sentinel.
///
/// The sentinel watches one fixed region on a slow cadence while the
/// foreground tracker may not be running. It only looks at events newer than
/// the last batch it examined, so each event is alerted at most once.

use crate::geo::distance_to_event;
use crate::model::{Alert, AlertLevel, PROXIMITY_RADIUS_KM, Region, SeismicEvent, THRESHOLD_MEDIUM};

#[derive(Debug, Clone, PartialEq)]
pub struct SentinelVerdict {
    pub alert: Option<Alert>,
    /// Newest event time examined so far, in epoch milliseconds.
    pub last_checked_ms: i64,
}

/// Looks for the newest unseen event within the proximity radius of
/// `region` with magnitude ≥ `magnitude_floor`.
///
/// Level is `High` at or above `THRESHOLD_MEDIUM`, otherwise `Medium`.
/// `last_checked_ms` advances to the newest event time in the batch whenever
/// any unseen event exists, alert or not.
pub fn evaluate(
    events: &[SeismicEvent],
    region: &Region,
    magnitude_floor: f64,
    last_checked_ms: i64,
) -> SentinelVerdict {
    let mut unseen: Vec<&SeismicEvent> = events
        .iter()
        .filter(|e| e.occurred_at_ms > last_checked_ms)
        .collect();
    if unseen.is_empty() {
        return SentinelVerdict { alert: None, last_checked_ms };
    }
    unseen.sort_by(|a, b| b.occurred_at_ms.cmp(&a.occurred_at_ms));

    let newest_ms = unseen[0].occurred_at_ms;
    let alert = unseen.iter().find_map(|event| {
        let distance = distance_to_event(region, event);
        if distance <= PROXIMITY_RADIUS_KM && event.magnitude >= magnitude_floor {
            Some(Alert {
                level: if event.magnitude >= THRESHOLD_MEDIUM {
                    AlertLevel::High
                } else {
                    AlertLevel::Medium
                },
                message: format!(
                    "🌍 M{} earthquake detected {:.0}km from {}",
                    event.magnitude, distance, region.name
                ),
            })
        } else {
            None
        }
    });

    SentinelVerdict { alert, last_checked_ms: newest_ms }
}
