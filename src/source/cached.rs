use anyhow::Result;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::CacheConfig;
use crate::models::Order;
use crate::source::{CustomerSource, EventSource, OrderSource};

/// Read-through cache over the three dashboard sources.
///
/// Every chart on a dashboard page wants the same collections, so a
/// fetched collection is shared for the configured freshness window
/// instead of hitting the stores once per chart. Fetch failures are never
/// cached; the next call retries the store.
pub struct CachedSources {
    event_source: Arc<dyn EventSource>,
    order_source: Arc<dyn OrderSource>,
    customer_source: Arc<dyn CustomerSource>,
    event_cache: Cache<(), Arc<Vec<serde_json::Value>>>,
    order_cache: Cache<(), Arc<Vec<Order>>>,
    customer_cache: Cache<(), Arc<Vec<serde_json::Value>>>,
}

fn collection_cache<T: Send + Sync + 'static>(config: &CacheConfig) -> Cache<(), Arc<Vec<T>>> {
    Cache::builder()
        .max_capacity(config.max_entries)
        .time_to_live(Duration::from_secs(config.ttl_secs))
        .build()
}

impl CachedSources {
    pub fn new(
        event_source: Arc<dyn EventSource>,
        order_source: Arc<dyn OrderSource>,
        customer_source: Arc<dyn CustomerSource>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            event_source,
            order_source,
            customer_source,
            event_cache: collection_cache(config),
            order_cache: collection_cache(config),
            customer_cache: collection_cache(config),
        }
    }

    pub async fn events(&self) -> Result<Arc<Vec<serde_json::Value>>> {
        if let Some(cached) = self.event_cache.get(&()).await {
            return Ok(cached);
        }

        debug!("event cache miss, fetching from activity store");
        let fresh = Arc::new(self.event_source.fetch_events().await?);
        self.event_cache.insert((), Arc::clone(&fresh)).await;
        Ok(fresh)
    }

    pub async fn orders(&self) -> Result<Arc<Vec<Order>>> {
        if let Some(cached) = self.order_cache.get(&()).await {
            return Ok(cached);
        }

        debug!("order cache miss, fetching from sales store");
        let fresh = Arc::new(self.order_source.fetch_orders().await?);
        self.order_cache.insert((), Arc::clone(&fresh)).await;
        Ok(fresh)
    }

    pub async fn customers(&self) -> Result<Arc<Vec<serde_json::Value>>> {
        if let Some(cached) = self.customer_cache.get(&()).await {
            return Ok(cached);
        }

        debug!("customer cache miss, fetching from main store");
        let fresh = Arc::new(self.customer_source.fetch_customers().await?);
        self.customer_cache.insert((), Arc::clone(&fresh)).await;
        Ok(fresh)
    }

    /// Drop all cached collections so the next reads hit the stores.
    pub async fn invalidate_all(&self) {
        self.event_cache.invalidate(&()).await;
        self.order_cache.invalidate(&()).await;
        self.customer_cache.invalidate(&()).await;
    }
}
