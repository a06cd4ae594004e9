//! Order-status business rules and sales aggregation

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use std::collections::{BTreeMap, HashSet};

use crate::models::Order;

/// Statuses that keep an order out of the sales totals while current.
const EXCLUDED_STATUSES: [&str; 3] = ["cancelada", "nueva", "archivada"];

/// Last states that show an archived order completed its hand-off.
const HANDED_OFF_STATES: [&str; 3] = ["enviada", "empaquetada", "pagoRecibido"];

/// Whether an order counts toward confirmed sales.
///
/// An order counts while its status is an active one, or once archived
/// when its last state shows a completed hand-off. Archived orders whose
/// last state is still `nueva` (or worse, `cancelada`) never count.
pub fn is_confirmed_sale(order: &Order) -> bool {
    if !EXCLUDED_STATUSES.contains(&order.status.as_str()) {
        return true;
    }
    order.status == "archivada" && HANDED_OFF_STATES.contains(&order.last_state.as_str())
}

/// Date windows for the scalar sales totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesWindow {
    /// Same local calendar day as the reference
    Today,
    /// Trailing 30 days, boundary inclusive
    LastThirtyDays,
    AllTime,
}

fn in_window(order: &Order, reference: DateTime<FixedOffset>, window: SalesWindow) -> bool {
    match window {
        SalesWindow::Today => {
            let offset = *reference.offset();
            order.date.with_timezone(&offset).date_naive() == reference.date_naive()
        }
        SalesWindow::LastThirtyDays => order.date >= reference - Duration::days(30),
        SalesWindow::AllTime => true,
    }
}

/// Sum of confirmed-sale totals inside the window.
///
/// Orders are filtered by the date window first, then by the
/// confirmed-sale predicate; the sum is all-or-nothing per call.
pub fn confirmed_total(
    orders: &[Order],
    reference: DateTime<FixedOffset>,
    window: SalesWindow,
) -> f64 {
    orders
        .iter()
        .filter(|order| in_window(order, reference, window))
        .filter(|order| is_confirmed_sale(order))
        .map(|order| order.total)
        .sum()
}

/// One local calendar day of confirmed order activity.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyOrders {
    pub day: NaiveDate,
    pub orders: u64,
    pub unique_ips: u64,
    pub total_sales: f64,
}

/// Per-day confirmed-order series over the trailing 30 calendar days.
///
/// Days are local to the reference's offset. The series comes back in
/// chronological order; days with no qualifying orders are omitted.
pub fn daily_series(orders: &[Order], reference: DateTime<FixedOffset>) -> Vec<DailyOrders> {
    let offset = *reference.offset();
    let horizon = reference.date_naive() - Duration::days(30);

    #[derive(Default)]
    struct DayAcc {
        orders: u64,
        ips: HashSet<String>,
        total: f64,
    }

    let mut days: BTreeMap<NaiveDate, DayAcc> = BTreeMap::new();
    for order in orders {
        if !is_confirmed_sale(order) {
            continue;
        }
        let day = order.date.with_timezone(&offset).date_naive();
        if day < horizon {
            continue;
        }
        let acc = days.entry(day).or_default();
        acc.orders += 1;
        acc.ips.insert(order.ip_address.clone());
        acc.total += order.total;
    }

    days.into_iter()
        .map(|(day, acc)| DailyOrders {
            day,
            orders: acc.orders,
            unique_ips: acc.ips.len() as u64,
            total_sales: acc.total,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(date: &str, status: &str, last_state: &str, total: f64) -> Order {
        Order {
            id: format!("{status}-{date}"),
            date: date.parse().unwrap(),
            status: status.to_string(),
            last_state: last_state.to_string(),
            total,
            ip_address: "1.1.1.1".to_string(),
        }
    }

    fn reference() -> DateTime<FixedOffset> {
        "2024-06-15T12:00:00-03:00".parse().unwrap()
    }

    #[test]
    fn test_confirmed_sale_predicate() {
        assert!(is_confirmed_sale(&order(
            "2024-06-15T10:00:00-03:00",
            "pagada",
            "",
            100.0
        )));
        assert!(!is_confirmed_sale(&order(
            "2024-06-15T10:00:00-03:00",
            "cancelada",
            "",
            100.0
        )));
        assert!(!is_confirmed_sale(&order(
            "2024-06-15T10:00:00-03:00",
            "nueva",
            "",
            100.0
        )));
        assert!(is_confirmed_sale(&order(
            "2024-06-15T10:00:00-03:00",
            "archivada",
            "enviada",
            100.0
        )));
        assert!(is_confirmed_sale(&order(
            "2024-06-15T10:00:00-03:00",
            "archivada",
            "pagoRecibido",
            100.0
        )));
        assert!(!is_confirmed_sale(&order(
            "2024-06-15T10:00:00-03:00",
            "archivada",
            "nueva",
            100.0
        )));
    }

    #[test]
    fn test_today_window_uses_local_day() {
        let now = reference();
        let orders = vec![
            order("2024-06-15T01:00:00-03:00", "pagada", "", 100.0),
            // 01:00Z on the 15th is still the 14th at -03:00
            order("2024-06-15T01:00:00+00:00", "pagada", "", 40.0),
            order("2024-06-14T23:00:00-03:00", "pagada", "", 7.0),
        ];

        assert_eq!(confirmed_total(&orders, now, SalesWindow::Today), 100.0);
    }

    #[test]
    fn test_thirty_day_window_is_inclusive() {
        let now = reference();
        let orders = vec![
            order("2024-05-16T12:00:00-03:00", "pagada", "", 30.0),
            order("2024-05-16T11:59:59-03:00", "pagada", "", 5.0),
        ];

        assert_eq!(
            confirmed_total(&orders, now, SalesWindow::LastThirtyDays),
            30.0
        );
    }

    #[test]
    fn test_all_time_ignores_dates() {
        let now = reference();
        let orders = vec![
            order("2019-01-01T00:00:00-03:00", "pagada", "", 1.0),
            order("2024-06-15T10:00:00-03:00", "cancelada", "", 100.0),
        ];

        assert_eq!(confirmed_total(&orders, now, SalesWindow::AllTime), 1.0);
    }

    #[test]
    fn test_empty_orders_sum_to_zero() {
        let now = reference();
        for window in [
            SalesWindow::Today,
            SalesWindow::LastThirtyDays,
            SalesWindow::AllTime,
        ] {
            assert_eq!(confirmed_total(&[], now, window), 0.0);
        }
        assert!(daily_series(&[], now).is_empty());
    }

    #[test]
    fn test_daily_series_groups_and_orders_days() {
        let now = reference();
        let orders = vec![
            order("2024-06-14T10:00:00-03:00", "pagada", "", 100.0),
            order("2024-06-14T18:00:00-03:00", "enviada", "", 50.0),
            order("2024-06-10T09:00:00-03:00", "pagada", "", 7.0),
            // outside the trailing 30 days
            order("2024-04-01T09:00:00-03:00", "pagada", "", 999.0),
            // not a confirmed sale
            order("2024-06-14T11:00:00-03:00", "nueva", "", 999.0),
        ];

        let series = daily_series(&orders, now);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].day, "2024-06-10".parse::<NaiveDate>().unwrap());
        assert_eq!(series[1].day, "2024-06-14".parse::<NaiveDate>().unwrap());
        assert_eq!(series[1].orders, 2);
        assert_eq!(series[1].total_sales, 150.0);
    }

    #[test]
    fn test_daily_series_counts_distinct_ips() {
        let now = reference();
        let mut repeat = order("2024-06-14T10:00:00-03:00", "pagada", "", 10.0);
        repeat.ip_address = "9.9.9.9".to_string();
        let orders = vec![
            order("2024-06-14T09:00:00-03:00", "pagada", "", 10.0),
            order("2024-06-14T11:00:00-03:00", "pagada", "", 10.0),
            repeat,
        ];

        let series = daily_series(&orders, now);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].orders, 3);
        assert_eq!(series[0].unique_ips, 2);
    }

    #[test]
    fn test_day_buckets_follow_reference_offset() {
        let now = reference();
        // 02:00Z on June 15 is 23:00 on June 14 at -03:00
        let orders = vec![order("2024-06-15T02:00:00+00:00", "pagada", "", 10.0)];

        let series = daily_series(&orders, now);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].day, "2024-06-14".parse::<NaiveDate>().unwrap());
    }
}
