//! Order models from the sales store

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One confirmed or pending transaction.
///
/// `status` is an open string enum (`nueva`, `cancelada`, `archivada`,
/// `enviada`, `empaquetada`, `pagoRecibido`, ...). `last_state` shares the
/// same value space and is meaningful only while `status` is `archivada`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub date: DateTime<FixedOffset>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_state: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub ip_address: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_deserializes_from_store_document() {
        let order: Order = serde_json::from_str(
            r#"{
                "id": "ord-1",
                "date": "2024-06-01T10:30:00-03:00",
                "status": "archivada",
                "lastState": "enviada",
                "total": 1500.5,
                "ipAddress": "1.1.1.1"
            }"#,
        )
        .unwrap();

        assert_eq!(order.status, "archivada");
        assert_eq!(order.last_state, "enviada");
        assert_eq!(order.total, 1500.5);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let order: Order =
            serde_json::from_str(r#"{ "id": "ord-2", "date": "2024-06-01T10:30:00Z" }"#).unwrap();

        assert_eq!(order.status, "");
        assert_eq!(order.last_state, "");
        assert_eq!(order.total, 0.0);
        assert_eq!(order.ip_address, "");
    }
}
