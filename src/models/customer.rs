//! Customer profiles from the main store
//!
//! Only the shipping data feeds the dashboard; everything else in the
//! profile document is ignored.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub datos_envio: Option<ShippingInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingInfo {
    /// Free-text province label, possibly empty or misspelled
    #[serde(default)]
    pub provincia: Option<String>,
}

impl Customer {
    /// Province label, if the profile carries one.
    pub fn province(&self) -> Option<&str> {
        self.datos_envio
            .as_ref()
            .and_then(|envio| envio.provincia.as_deref())
    }
}

/// Shape a fetched profile collection, dropping non-document entries.
pub fn parse_customers(docs: &[serde_json::Value]) -> Vec<Customer> {
    docs.iter()
        .filter_map(|doc| match serde_json::from_value(doc.clone()) {
            Ok(customer) => Some(customer),
            Err(err) => {
                debug!("dropping customer document: {err}");
                None
            }
        })
        .collect()
}
