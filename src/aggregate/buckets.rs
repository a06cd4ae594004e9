//! Hour and category bucketing over deduplicated events
//!
//! One parameterized engine replaces the per-chart counting loops: hour
//! series take a lane classifier, category counts take a label extractor.

use chrono::{DateTime, FixedOffset, Timelike};
use std::collections::{BTreeMap, HashMap};

use crate::models::TrackingEvent;

const HOURS_PER_DAY: u32 = 24;

/// Which of the two counters an event lands in. `None` from a classifier
/// leaves the event uncounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Primary,
    Secondary,
}

/// One hour-of-day slot with a two-way count split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourBucket {
    pub hour: u32,
    pub primary: u64,
    pub secondary: u64,
}

/// 24-slot hour-of-day series, rotated relative to the reference instant.
///
/// All 24 slots are pre-seeded so the series has no gaps even on empty
/// input. Each event is counted at its hour-of-day in the reference
/// instant's offset. Slots are ordered by the rotation key
/// `(hour - reference_hour + 24) % 24`: the slot sharing the reference's
/// hour number comes first (it is the 24-hours-old one) and the hour just
/// before the reference comes last.
pub fn hour_series<C>(
    events: &[&TrackingEvent],
    reference: DateTime<FixedOffset>,
    classify: C,
) -> Vec<HourBucket>
where
    C: Fn(&TrackingEvent) -> Option<Lane>,
{
    let reference_hour = reference.hour();
    let mut slots: HashMap<u32, (u64, u64)> =
        (0..HOURS_PER_DAY).map(|hour| (hour, (0, 0))).collect();

    for event in events {
        let hour = event.recorded_at.with_timezone(reference.offset()).hour();
        if let Some(counts) = slots.get_mut(&hour) {
            match classify(event) {
                Some(Lane::Primary) => counts.0 += 1,
                Some(Lane::Secondary) => counts.1 += 1,
                None => {}
            }
        }
    }

    let mut series: Vec<HourBucket> = slots
        .into_iter()
        .map(|(hour, (primary, secondary))| HourBucket {
            hour,
            primary,
            secondary,
        })
        .collect();
    series.sort_by_key(|bucket| (bucket.hour + HOURS_PER_DAY - reference_hour) % HOURS_PER_DAY);
    series
}

/// Same split, emitted in calendar 0-23 order.
pub fn hour_series_calendar<C>(
    events: &[&TrackingEvent],
    reference: DateTime<FixedOffset>,
    classify: C,
) -> Vec<HourBucket>
where
    C: Fn(&TrackingEvent) -> Option<Lane>,
{
    let mut series = hour_series(events, reference, classify);
    series.sort_by_key(|bucket| bucket.hour);
    series
}

/// Canonical form for free-text category labels: lower-cased, trimmed,
/// internal whitespace collapsed. Diacritics are preserved, so accented
/// spellings stay distinct buckets.
pub fn canonical_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Count items per canonical category label.
///
/// No pre-seeding: buckets exist only for categories actually present.
/// Items whose label canonicalizes to the empty string are skipped. The
/// map keys come back in ascending label order.
pub fn count_by_category<T, F>(items: &[T], extract: F) -> BTreeMap<String, u64>
where
    F: Fn(&T) -> Option<&str>,
{
    let mut counts = BTreeMap::new();
    for item in items {
        let Some(label) = extract(item) else { continue };
        let key = canonical_label(label);
        if key.is_empty() {
            continue;
        }
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Closed device categories for the device charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Mobile,
}

/// Classify by the collector-reported `isMobile` flag. Always conclusive.
pub fn classify_by_flag(event: &TrackingEvent) -> Option<DeviceClass> {
    Some(if event.is_mobile {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    })
}

/// Classify by platform substrings. Platforms matching neither family are
/// left uncounted, so this is not equivalent to the flag strategy.
pub fn classify_by_platform(event: &TrackingEvent) -> Option<DeviceClass> {
    let platform = event.platform.to_lowercase();
    if platform.contains("win") || platform.contains("mac") {
        Some(DeviceClass::Desktop)
    } else if ["android", "iphone", "armv81", "mobile"]
        .iter()
        .any(|marker| platform.contains(marker))
    {
        Some(DeviceClass::Mobile)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceCounts {
    pub desktop: u64,
    pub mobile: u64,
}

/// Device split over an already-deduplicated window.
pub fn count_devices<C>(events: &[&TrackingEvent], classify: C) -> DeviceCounts
where
    C: Fn(&TrackingEvent) -> Option<DeviceClass>,
{
    let mut counts = DeviceCounts::default();
    for event in events {
        match classify(event) {
            Some(DeviceClass::Desktop) => counts.desktop += 1,
            Some(DeviceClass::Mobile) => counts.mobile += 1,
            None => {}
        }
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCounts {
    pub logged_in: u64,
    pub anonymous: u64,
}

/// Logged-in vs anonymous split over an already-deduplicated window.
pub fn count_sessions(events: &[&TrackingEvent]) -> SessionCounts {
    let mut counts = SessionCounts::default();
    for event in events {
        if event.is_logged {
            counts.logged_in += 1;
        } else {
            counts.anonymous += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(ip: &str, recorded_at: DateTime<FixedOffset>, is_logged: bool) -> TrackingEvent {
        TrackingEvent {
            recorded_at,
            ip: ip.to_string(),
            is_logged,
            is_mobile: false,
            location: String::new(),
            platform: String::new(),
            screen_width: 0,
            user_agent: String::new(),
        }
    }

    fn reference() -> DateTime<FixedOffset> {
        "2024-06-01T12:00:00-03:00".parse().unwrap()
    }

    fn logged_split(event: &TrackingEvent) -> Option<Lane> {
        Some(if event.is_logged {
            Lane::Primary
        } else {
            Lane::Secondary
        })
    }

    #[test]
    fn test_hour_series_always_has_24_slots() {
        let series = hour_series(&[], reference(), logged_split);
        assert_eq!(series.len(), 24);
        assert!(series.iter().all(|b| b.primary == 0 && b.secondary == 0));
    }

    #[test]
    fn test_hour_series_rotation_order() {
        let series = hour_series(&[], reference(), logged_split);
        // Reference hour is 12: rotation starts there and ends at 11
        assert_eq!(series[0].hour, 12);
        assert_eq!(series[1].hour, 13);
        assert_eq!(series[23].hour, 11);

        let keys: Vec<u32> = series
            .iter()
            .map(|b| (b.hour + 24 - 12) % 24)
            .collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_hour_series_counts_in_reference_offset() {
        let now = reference();
        // 14:00Z is 11:00 in the reference offset (-03:00)
        let utc_event = event("1.1.1.1", "2024-06-01T14:00:00+00:00".parse().unwrap(), true);
        let events = [&utc_event];

        let series = hour_series(&events, now, logged_split);
        let eleven = series.iter().find(|b| b.hour == 11).unwrap();
        assert_eq!(eleven.primary, 1);
        assert_eq!(eleven.secondary, 0);
    }

    #[test]
    fn test_hour_series_splits_lanes() {
        let now = reference();
        let logged = event("1.1.1.1", now - Duration::hours(1), true);
        let anonymous = event("2.2.2.2", now - Duration::hours(1), false);
        let events = [&logged, &anonymous];

        let series = hour_series(&events, now, logged_split);
        let eleven = series.iter().find(|b| b.hour == 11).unwrap();
        assert_eq!(eleven.primary, 1);
        assert_eq!(eleven.secondary, 1);

        let total: u64 = series.iter().map(|b| b.primary + b.secondary).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_hour_series_is_idempotent() {
        let now = reference();
        let a = event("1.1.1.1", now - Duration::hours(3), true);
        let b = event("2.2.2.2", now - Duration::hours(7), false);
        let events = [&a, &b];

        let first = hour_series(&events, now, logged_split);
        let second = hour_series(&events, now, logged_split);
        assert_eq!(first, second);
    }

    #[test]
    fn test_calendar_order() {
        let series = hour_series_calendar(&[], reference(), logged_split);
        let hours: Vec<u32> = series.iter().map(|b| b.hour).collect();
        assert_eq!(hours, (0..24).collect::<Vec<u32>>());
    }

    #[test]
    fn test_canonical_label() {
        assert_eq!(canonical_label("  Buenos   Aires "), "buenos aires");
        assert_eq!(canonical_label("CABA"), "caba");
        // Diacritics survive: accented variants stay distinct
        assert_ne!(canonical_label("Córdoba"), canonical_label("Cordoba"));
    }

    #[test]
    fn test_count_by_category_merges_near_duplicates() {
        let labels = ["Buenos Aires", "buenos aires ", "CABA"];
        let counts = count_by_category(&labels, |label| Some(*label));

        assert_eq!(counts.len(), 2);
        assert_eq!(counts["buenos aires"], 2);
        assert_eq!(counts["caba"], 1);
    }

    #[test]
    fn test_count_by_category_skips_blank_labels() {
        let labels = ["   ", "salta"];
        let counts = count_by_category(&labels, |label| Some(*label));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["salta"], 1);
    }

    #[test]
    fn test_classify_by_platform() {
        let mut e = event("1.1.1.1", reference(), false);

        e.platform = "Win32".to_string();
        assert_eq!(classify_by_platform(&e), Some(DeviceClass::Desktop));

        e.platform = "Linux armv81".to_string();
        assert_eq!(classify_by_platform(&e), Some(DeviceClass::Mobile));

        e.platform = "iPhone".to_string();
        assert_eq!(classify_by_platform(&e), Some(DeviceClass::Mobile));

        e.platform = "PlayStation".to_string();
        assert_eq!(classify_by_platform(&e), None);
    }

    #[test]
    fn test_classify_by_flag_is_conclusive() {
        let mut e = event("1.1.1.1", reference(), false);
        assert_eq!(classify_by_flag(&e), Some(DeviceClass::Desktop));
        e.is_mobile = true;
        assert_eq!(classify_by_flag(&e), Some(DeviceClass::Mobile));
    }

    #[test]
    fn test_count_devices_leaves_unmatched_uncounted() {
        let now = reference();
        let mut win = event("1.1.1.1", now, false);
        win.platform = "Win32".to_string();
        let mut console = event("2.2.2.2", now, false);
        console.platform = "PlayStation".to_string();
        let events = [&win, &console];

        let counts = count_devices(&events, classify_by_platform);
        assert_eq!(counts.desktop, 1);
        assert_eq!(counts.mobile, 0);
    }

    #[test]
    fn test_count_sessions() {
        let now = reference();
        let logged = event("1.1.1.1", now, true);
        let anonymous = event("2.2.2.2", now, false);
        let events = [&logged, &anonymous];

        let counts = count_sessions(&events);
        assert_eq!(counts.logged_in, 1);
        assert_eq!(counts.anonymous, 1);
    }
}
