use crate::error::{SyncError, SyncResult};
use mirrorkit_storage::StorageConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`MirrorHub`](crate::MirrorHub).
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    pub storage: StorageConfig,
    /// Page size for product listings when a request names none.
    pub product_page_size: u32,
    pub review_page_size: u32,
    pub category_page_size: u32,
    pub plugin_page_size: u32,
    pub variation_page_size: u32,
    pub shipping_class_page_size: u32,
    /// How long shutdown waits for in-flight requests.
    pub shutdown_timeout_ms: u64,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            product_page_size: 25,
            review_page_size: 25,
            category_page_size: 10,
            plugin_page_size: 100,
            variation_page_size: 25,
            shipping_class_page_size: 25,
            shutdown_timeout_ms: 5_000,
        }
    }
}

impl MirrorConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(json: &str) -> SyncResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SyncResult<()> {
        let sizes = [
            ("product_page_size", self.product_page_size),
            ("review_page_size", self.review_page_size),
            ("category_page_size", self.category_page_size),
            ("plugin_page_size", self.plugin_page_size),
            ("variation_page_size", self.variation_page_size),
            ("shipping_class_page_size", self.shipping_class_page_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, size)| *size == 0) {
            return Err(SyncError::Config(format!("{name} must be greater than zero")));
        }
        Ok(())
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
