//! Trailing-window visitor dedup
//!
//! The tracking store keeps every observation, so a single visitor shows
//! up once per page view. Charts that talk about "visitors" first collapse
//! the window to one record per source IP.

use chrono::{DateTime, Duration, FixedOffset};
use std::collections::HashMap;

use crate::models::TrackingEvent;

/// Collapse a window of events to the most recent record per source IP.
///
/// Only events with `recorded_at` strictly after `reference - window` are
/// considered; records at the boundary are excluded. Among a given IP's
/// records the latest timestamp wins regardless of input order. Equal
/// timestamps keep the record seen first (accepted ambiguity: truly
/// simultaneous records carry no ordering of their own).
pub fn latest_per_ip<'a>(
    events: &'a [TrackingEvent],
    reference: DateTime<FixedOffset>,
    window: Duration,
) -> Vec<&'a TrackingEvent> {
    let cutoff = reference - window;
    let mut latest: HashMap<&str, &TrackingEvent> = HashMap::new();

    for event in events {
        if event.recorded_at <= cutoff {
            continue;
        }
        match latest.get(event.ip.as_str()) {
            Some(existing) if existing.recorded_at >= event.recorded_at => {}
            _ => {
                latest.insert(event.ip.as_str(), event);
            }
        }
    }

    latest.into_values().collect()
}
