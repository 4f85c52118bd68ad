/// Proximity partitioning of a fetched event batch.
///
/// The tracker shows two lists side by side: events close to the selected
/// region, and the most recent events worldwide above the magnitude floor.
/// An event may appear in both.

use crate::geo::distance_to_event;
use crate::model::{GLOBAL_LIST_LIMIT, Region, SeismicEvent};

/// The two views produced from one batch. Both are newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub nearby: Vec<SeismicEvent>,
    pub global: Vec<SeismicEvent>,
}

/// Splits `events` into events within `radius_km` of `region` and the
/// `GLOBAL_LIST_LIMIT` most recent events with magnitude ≥ `magnitude_floor`.
///
/// Input order does not matter; both outputs are ordered newest first with
/// ties kept in input order. The input is never modified.
pub fn partition(
    events: &[SeismicEvent],
    region: &Region,
    radius_km: f64,
    magnitude_floor: f64,
) -> Partition {
    let mut ordered: Vec<&SeismicEvent> = events.iter().collect();
    ordered.sort_by(|a, b| b.occurred_at_ms.cmp(&a.occurred_at_ms));

    let nearby = ordered
        .iter()
        .filter(|e| distance_to_event(region, e) <= radius_km)
        .map(|e| (*e).clone())
        .collect();

    let global = ordered
        .iter()
        .filter(|e| e.magnitude >= magnitude_floor)
        .take(GLOBAL_LIST_LIMIT)
        .map(|e| (*e).clone())
        .collect();

    Partition { nearby, global }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
