//! Dashboard facade: cached sources in, chart-ready rows out
//!
//! One method per chart. Each call fetches through the read-through
//! cache, runs the pure aggregation pipeline, and formats rows; a fetch
//! failure aborts the whole call, never yielding a partial chart.
//!
//! The `reference` argument is the caller's notion of "now" (typically
//! the browser's clock, so hour buckets match the viewer's timezone).
//! Calendar-day sales bucketing instead uses the shop's configured
//! offset, whatever the viewer's timezone.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;

use crate::aggregate::buckets::{
    self, classify_by_flag, classify_by_platform, DeviceClass, Lane,
};
use crate::aggregate::charts::{
    self, DailySalesRow, DeviceHourRow, DeviceUsersRow, HourlyVisitsRow, LocationRow,
    ProvinceRow, SessionStatusRow,
};
use crate::aggregate::{dedup, revenue, SalesWindow};
use crate::config::Config;
use crate::models::{normalize_batch, parse_customers, TrackingEvent};
use crate::source::{CachedSources, CustomerSource, EventSource, OrderSource};

/// Customer totals alongside the per-province breakdown.
#[derive(Debug, Clone)]
pub struct ProvinceBreakdown {
    pub total_customers: u64,
    pub rows: Vec<ProvinceRow>,
}

pub struct Dashboard {
    sources: CachedSources,
    config: Config,
}

impl Dashboard {
    pub fn new(
        config: Config,
        events: Arc<dyn EventSource>,
        orders: Arc<dyn OrderSource>,
        customers: Arc<dyn CustomerSource>,
    ) -> Self {
        let sources = CachedSources::new(events, orders, customers, &config.cache);
        Self { sources, config }
    }

    /// Fetch and normalize the tracking collection, then collapse it to
    /// unique visitors inside the dedup window.
    async fn unique_visitors(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<TrackingEvent>> {
        let docs = self.sources.events().await?;
        let events = normalize_batch(&docs);
        let unique = dedup::latest_per_ip(&events, reference, self.config.dashboard.dedup_window());
        Ok(unique.into_iter().cloned().collect())
    }

    /// 24-hour visit series split by session state, rotated so the oldest
    /// slot comes first relative to the reference.
    pub async fn visits_by_hour(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<HourlyVisitsRow>> {
        let unique = self.unique_visitors(reference).await?;
        let refs: Vec<&TrackingEvent> = unique.iter().collect();
        let series = buckets::hour_series(&refs, reference, |event| {
            Some(if event.is_logged {
                Lane::Primary
            } else {
                Lane::Secondary
            })
        });
        Ok(charts::hourly_visits_rows(&series))
    }

    /// Logged-in vs anonymous unique visitors over the dedup window.
    pub async fn session_status(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<SessionStatusRow>> {
        let unique = self.unique_visitors(reference).await?;
        let refs: Vec<&TrackingEvent> = unique.iter().collect();
        Ok(charts::session_status_rows(buckets::count_sessions(&refs)))
    }

    /// Mobile vs desktop unique visitors, classified by the collector's
    /// `isMobile` flag.
    pub async fn device_share(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<DeviceUsersRow>> {
        let unique = self.unique_visitors(reference).await?;
        let refs: Vec<&TrackingEvent> = unique.iter().collect();
        Ok(charts::device_share_rows(buckets::count_devices(
            &refs,
            classify_by_flag,
        )))
    }

    /// Hourly device split in calendar order, classified by platform
    /// substrings (inconclusive platforms stay uncounted).
    pub async fn devices_by_hour(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<DeviceHourRow>> {
        let unique = self.unique_visitors(reference).await?;
        let refs: Vec<&TrackingEvent> = unique.iter().collect();
        let series = buckets::hour_series_calendar(&refs, reference, |event| {
            classify_by_platform(event).map(|class| match class {
                DeviceClass::Desktop => Lane::Primary,
                DeviceClass::Mobile => Lane::Secondary,
            })
        });
        Ok(charts::device_hour_rows(&series))
    }

    /// Customers grouped by shipping province, ascending label order.
    pub async fn provinces_by_customer(&self) -> Result<ProvinceBreakdown> {
        let docs = self.sources.customers().await?;
        let customers = parse_customers(&docs);
        let counts = buckets::count_by_category(&customers, |customer| customer.province());
        Ok(ProvinceBreakdown {
            total_customers: customers.len() as u64,
            rows: charts::province_rows(&counts),
        })
    }

    /// Unique visitors ranked by reported location, descending count.
    pub async fn top_locations(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<LocationRow>> {
        let unique = self.unique_visitors(reference).await?;
        let counts = buckets::count_by_category(&unique, |event| Some(event.location.as_str()));
        Ok(charts::location_rows(&counts))
    }

    /// Trailing-30-day confirmed-sales series, one row per shop-local day.
    pub async fn daily_sales(
        &self,
        reference: DateTime<FixedOffset>,
    ) -> Result<Vec<DailySalesRow>> {
        let orders = self.sources.orders().await?;
        let local = reference.with_timezone(&self.config.dashboard.offset());
        Ok(charts::daily_sales_rows(&revenue::daily_series(
            &orders, local,
        )))
    }

    /// Confirmed-sales total for the window, in shop-local days.
    pub async fn sales_total(
        &self,
        reference: DateTime<FixedOffset>,
        window: SalesWindow,
    ) -> Result<f64> {
        let orders = self.sources.orders().await?;
        let local = reference.with_timezone(&self.config.dashboard.offset());
        Ok(revenue::confirmed_total(&orders, local, window))
    }

    /// Drop cached collections so the next chart reads refetch.
    pub async fn refresh(&self) {
        self.sources.invalidate_all().await;
    }
}
