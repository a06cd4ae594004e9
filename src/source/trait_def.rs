use anyhow::Result;
use async_trait::async_trait;

use crate::models::Order;

/// Fetches the raw tracking-event collection from the activity store.
///
/// Documents come back loosely typed; normalization happens downstream.
/// Implementations materialize the whole collection per call and surface
/// fetch failures as errors, never as partial collections.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_events(&self) -> Result<Vec<serde_json::Value>>;
}

/// Fetches the order collection from the sales store.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch_orders(&self) -> Result<Vec<Order>>;
}

/// Fetches customer profile documents from the main store.
#[async_trait]
pub trait CustomerSource: Send + Sync {
    async fn fetch_customers(&self) -> Result<Vec<serde_json::Value>>;
}
