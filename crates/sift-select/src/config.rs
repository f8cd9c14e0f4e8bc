//! Engine configuration.

use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_CAPACITY, SelectorCache};
use crate::capability::CapabilityProfile;
use crate::error::ConfigError;
use crate::parser::SelectorParser;
use crate::pseudo::PseudoRegistry;

/// Everything needed to build a [`SelectorParser`].
///
/// ```json
/// { "cache_capacity": 64, "capabilities": { "native_evaluator": false } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of cached selector strings; `null` means unbounded.
    pub cache_capacity: Option<usize>,
    /// Native capabilities of the host.
    pub capabilities: CapabilityProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: Some(DEFAULT_CAPACITY.get()),
            capabilities: CapabilityProfile::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] for malformed documents and
    /// [`ConfigError::ZeroCapacity`] for `"cache_capacity": 0`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.cache_capacity == Some(0) {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(config)
    }

    /// Build the cache this configuration describes.
    #[must_use]
    pub fn build_cache(&self) -> SelectorCache {
        match self.cache_capacity {
            None => SelectorCache::unbounded(),
            Some(capacity) => {
                SelectorCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN))
            }
        }
    }

    /// Build a parser with the standard pseudo registry.
    #[must_use]
    pub fn build_parser(&self) -> SelectorParser {
        SelectorParser::new(
            Arc::new(PseudoRegistry::standard()),
            Arc::new(self.capabilities.clone()),
            self.build_cache(),
        )
    }
}
