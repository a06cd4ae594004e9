//! Chart-ready row shapes and the fixed display palette
//!
//! Field names here are the wire contract with the chart renderers; serde
//! renames keep the Rust side idiomatic.

use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use super::buckets::{canonical_label, DeviceCounts, HourBucket, SessionCounts};
use super::revenue::DailyOrders;

/// Fixed display palette keyed by canonical category label. Accented and
/// plain spellings of the same province share a color on purpose.
const PALETTE: &[(&str, &str)] = &[
    ("buenos aires", "#ff5733"),
    ("caba", "#400ad5"),
    ("cordoba", "#33ff57"),
    ("córdoba", "#33ff57"),
    ("santa fe", "#3357ff"),
    ("corrientes", "#31ab1c"),
    ("mendoza", "#ff33a6"),
    ("tucuman", "#ffc300"),
    ("tucumán", "#ffc300"),
    ("salta", "#ff5733"),
    ("chaco", "#33ffcc"),
    ("entre rios", "#9933ff"),
    ("formosa", "#ff33b5"),
    ("rio negro", "#ff8c00"),
    ("neuquen", "#7fff00"),
    ("neuquén", "#7fff00"),
    ("misiones", "#ffffff"),
    ("san luis", "#ffd700"),
    ("jujuy", "#6a5acd"),
    ("catamarca", "#adff2f"),
    ("la pampa", "#00fa9a"),
    ("santa cruz", "#00ced1"),
    ("tierra del fuego", "#ff69b4"),
    ("mobile", "#2563eb"),
    ("desktop", "#f97316"),
];

/// Display color for a category. Unknown labels get a color derived from
/// the label hash so reruns stay stable.
pub fn fill_for(label: &str) -> String {
    let key = canonical_label(label);
    if let Some((_, color)) = PALETTE.iter().find(|(name, _)| *name == key) {
        return (*color).to_string();
    }

    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    format!("#{:06x}", hasher.finish() & 0x00ff_ffff)
}

/// Hourly visits split by session state. Always 24 rows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyVisitsRow {
    pub hour: String,
    pub logged_in: u64,
    pub not_logged_in: u64,
}

pub fn hourly_visits_rows(series: &[HourBucket]) -> Vec<HourlyVisitsRow> {
    series
        .iter()
        .map(|bucket| HourlyVisitsRow {
            hour: format!("{:02}:00", bucket.hour),
            logged_in: bucket.primary,
            not_logged_in: bucket.secondary,
        })
        .collect()
}

/// Authenticated vs anonymous totals. Exactly two rows.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SessionStatusRow {
    pub status: String,
    pub count: u64,
}

pub fn session_status_rows(counts: SessionCounts) -> Vec<SessionStatusRow> {
    vec![
        SessionStatusRow {
            status: "Usuario".to_string(),
            count: counts.logged_in,
        },
        SessionStatusRow {
            status: "Anonimo".to_string(),
            count: counts.anonymous,
        },
    ]
}

/// Unique visitors per device family.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUsersRow {
    pub device_type: String,
    pub usuarios: u64,
    pub fill: String,
}

pub fn device_share_rows(counts: DeviceCounts) -> Vec<DeviceUsersRow> {
    vec![
        DeviceUsersRow {
            device_type: "Mobile".to_string(),
            usuarios: counts.mobile,
            fill: fill_for("mobile"),
        },
        DeviceUsersRow {
            device_type: "Computadora".to_string(),
            usuarios: counts.desktop,
            fill: fill_for("desktop"),
        },
    ]
}

/// Hourly device split in calendar order. The renderer expects the short
/// `H:00` label here, unlike the zero-padded visits series.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DeviceHourRow {
    pub hour: String,
    pub desktop: u64,
    pub mobile: u64,
}

pub fn device_hour_rows(series: &[HourBucket]) -> Vec<DeviceHourRow> {
    series
        .iter()
        .map(|bucket| DeviceHourRow {
            hour: format!("{}:00", bucket.hour),
            desktop: bucket.primary,
            mobile: bucket.secondary,
        })
        .collect()
}

/// Customers per province, ascending label order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProvinceRow {
    pub province: String,
    pub count: u64,
    pub fill: String,
}

pub fn province_rows(counts: &BTreeMap<String, u64>) -> Vec<ProvinceRow> {
    counts
        .iter()
        .map(|(province, &count)| ProvinceRow {
            province: province.clone(),
            count,
            fill: fill_for(province),
        })
        .collect()
}

/// Visitors per location, descending count. Ties break on the label so
/// the ranking is stable.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocationRow {
    pub location: String,
    pub abbreviation: String,
    pub count: u64,
    pub fill: String,
}

pub fn location_rows(counts: &BTreeMap<String, u64>) -> Vec<LocationRow> {
    let mut rows: Vec<LocationRow> = counts
        .iter()
        .map(|(location, &count)| LocationRow {
            location: location.clone(),
            abbreviation: abbreviate(location),
            count,
            fill: fill_for(location),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.location.cmp(&b.location))
    });
    rows
}

fn abbreviate(label: &str) -> String {
    label.chars().take(3).collect::<String>().to_uppercase()
}

/// One day of the trailing-30-day sales series.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesRow {
    pub date: String,
    pub orders: u64,
    #[serde(rename = "uniqueIPs")]
    pub unique_ips: u64,
    pub total_sales: f64,
    pub label: String,
}

pub fn daily_sales_rows(series: &[DailyOrders]) -> Vec<DailySalesRow> {
    series
        .iter()
        .map(|day| {
            let date = day.day.format("%Y-%m-%d").to_string();
            DailySalesRow {
                label: format!("Órdenes del día {date}"),
                date,
                orders: day.orders,
                unique_ips: day.unique_ips,
                total_sales: day.total_sales,
            }
        })
        .collect()
}
