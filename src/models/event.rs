//! Tracking-event models and normalization
//!
//! The activity collector writes loosely-typed documents; this module
//! shapes them into canonical events the aggregation core can trust.
//! A record is dropped only when its timestamp cannot be parsed.

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record is not a tracking document: {0}")]
    NotARecord(#[from] serde_json::Error),
    #[error("unparseable timestamp: {0:?}")]
    BadTimestamp(String),
}

/// Raw tracking document as stored by the activity collector.
///
/// Every field is optional in the store; missing values take the same
/// fallbacks the collector itself writes (`"N/A"`, `0`, `false`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTrackingRecord {
    pub date_time: String,
    pub ip: String,
    pub is_logged: bool,
    pub is_mobile: bool,
    pub location: String,
    pub orientation: String,
    pub platform: String,
    pub screen_width: u32,
    pub user_agent: String,
}

impl Default for RawTrackingRecord {
    fn default() -> Self {
        Self {
            date_time: "N/A".to_string(),
            ip: "N/A".to_string(),
            is_logged: false,
            is_mobile: false,
            location: "N/A".to_string(),
            orientation: "N/A".to_string(),
            platform: "N/A".to_string(),
            screen_width: 0,
            user_agent: "N/A".to_string(),
        }
    }
}

/// Canonical user-activity observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingEvent {
    /// Source-reported instant, offset preserved
    pub recorded_at: DateTime<FixedOffset>,
    /// Dedup/grouping key; not a reliable unique-user identifier
    pub ip: String,
    pub is_logged: bool,
    pub is_mobile: bool,
    pub location: String,
    pub platform: String,
    pub screen_width: u32,
    pub user_agent: String,
}

impl TrackingEvent {
    /// Shape a raw record into a canonical event.
    ///
    /// Optional fields were already defaulted during deserialization, so
    /// the only failure left is a timestamp that does not parse.
    pub fn from_raw(raw: &RawTrackingRecord) -> Result<Self, NormalizeError> {
        let recorded_at = parse_instant(&raw.date_time)
            .ok_or_else(|| NormalizeError::BadTimestamp(raw.date_time.clone()))?;

        Ok(Self {
            recorded_at,
            ip: raw.ip.clone(),
            is_logged: raw.is_logged,
            is_mobile: raw.is_mobile,
            location: raw.location.clone(),
            platform: raw.platform.clone(),
            screen_width: raw.screen_width,
            user_agent: raw.user_agent.clone(),
        })
    }
}

/// Parse a source-reported timestamp.
///
/// Accepts RFC 3339 with any offset plus the offset-less
/// `YYYY-MM-DD HH:MM:SS` form, which is taken as UTC.
fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
        return Some(dt);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Normalize a fetched document collection, dropping malformed records.
pub fn normalize_batch(docs: &[serde_json::Value]) -> Vec<TrackingEvent> {
    docs.iter()
        .filter_map(|doc| {
            let parsed = serde_json::from_value::<RawTrackingRecord>(doc.clone())
                .map_err(NormalizeError::from)
                .and_then(|raw| TrackingEvent::from_raw(&raw));
            match parsed {
                Ok(event) => Some(event),
                Err(err) => {
                    debug!("dropping tracking record: {err}");
                    None
                }
            }
        })
        .collect()
}
