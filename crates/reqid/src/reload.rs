//! Runtime-replaceable configuration.
//!
//! Requests take an `Arc` snapshot when they start; a reload swaps the
//! pointer for requests dispatched afterwards and never mutates a snapshot
//! in place. Cheap to clone (Arc).

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::{materialize, IdConfig, RawIdConfig};
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<Arc<IdConfig>>>,
}

impl ConfigHandle {
    pub fn new(config: IdConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(config))),
        }
    }

    /// The configuration to use for a request starting now.
    pub fn snapshot(&self) -> Arc<IdConfig> {
        self.inner.read().clone()
    }

    /// Materialize `raw` and install it. On error the active configuration
    /// is left untouched.
    pub fn reload(&self, raw: &RawIdConfig) -> Result<Arc<IdConfig>, ConfigError> {
        let config = Arc::new(materialize(raw)?);
        *self.inner.write() = Arc::clone(&config);
        tracing::info!(
            length = config.length().get(),
            additional = config.namespace_count() - 1,
            "request_id configuration reloaded"
        );
        Ok(config)
    }
}

impl Default for ConfigHandle {
    fn default() -> Self {
        Self::new(IdConfig::default())
    }
}
