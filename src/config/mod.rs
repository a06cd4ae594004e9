use anyhow::Context;
use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dashboard: DashboardConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// UTC offset in whole hours for calendar-day bucketing (the shop's
    /// local timezone; hour bucketing uses the caller's reference instant)
    pub utc_offset_hours: i32,
    /// Trailing window for visitor dedup, in hours
    pub dedup_window_hours: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub max_entries: u64,
    #[serde(default = "CacheConfig::default_ttl_secs")]
    pub ttl_secs: u64,
}

impl DashboardConfig {
    const fn default_utc_offset_hours() -> i32 {
        -3
    }

    const fn default_dedup_window_hours() -> i64 {
        24
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::hours(self.dedup_window_hours)
    }
}

impl CacheConfig {
    const fn default_max_entries() -> u64 {
        8
    }

    const fn default_ttl_secs() -> u64 {
        300
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dashboard: DashboardConfig {
                utc_offset_hours: DashboardConfig::default_utc_offset_hours(),
                dedup_window_hours: DashboardConfig::default_dedup_window_hours(),
            },
            cache: CacheConfig {
                max_entries: CacheConfig::default_max_entries(),
                ttl_secs: CacheConfig::default_ttl_secs(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut utc_offset_hours = std::env::var("DASHBOARD_UTC_OFFSET_HOURS")
            .ok()
            .map(|v| {
                v.parse::<i32>()
                    .context("DASHBOARD_UTC_OFFSET_HOURS must be an integer")
            })
            .transpose()?
            .unwrap_or_else(DashboardConfig::default_utc_offset_hours);

        if !(-12..=14).contains(&utc_offset_hours) {
            tracing::warn!(
                "DASHBOARD_UTC_OFFSET_HOURS {utc_offset_hours} out of range, falling back to {}",
                DashboardConfig::default_utc_offset_hours()
            );
            utc_offset_hours = DashboardConfig::default_utc_offset_hours();
        }

        let dedup_window_hours = std::env::var("DEDUP_WINDOW_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&hours| hours > 0)
            .unwrap_or_else(DashboardConfig::default_dedup_window_hours);

        let max_entries = std::env::var("SOURCE_CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(CacheConfig::default_max_entries);

        let ttl_secs = std::env::var("SOURCE_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(CacheConfig::default_ttl_secs);

        Ok(Config {
            dashboard: DashboardConfig {
                utc_offset_hours,
                dedup_window_hours,
            },
            cache: CacheConfig {
                max_entries,
                ttl_secs,
            },
        })
    }
}
