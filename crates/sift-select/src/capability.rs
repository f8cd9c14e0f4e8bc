//! What a host's native evaluator can do.
//!
//! Profiles are produced outside the engine (by probing a host once, or from a
//! configuration file) and are read-only afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pseudo::PseudoKind;

/// Native support achieved for one pseudo-class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudoSupport {
    /// Highest argument tier the host evaluates correctly; 0 means unsupported.
    pub tier: u8,
    /// Name the host understands, when it differs from the standard one
    /// (for example a vendor-prefixed spelling).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Capability profile consumed by the parser and the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityProfile {
    /// Achieved support per pseudo-class. Missing entries are unsupported.
    pub pseudo_support: HashMap<PseudoKind, PseudoSupport>,
    /// Whether `[attr=value i]` is evaluated natively.
    pub attribute_case_insensitive: bool,
    /// Whether a native single-call evaluator exists at all.
    pub native_evaluator: bool,
    /// Whether the tree can enumerate elements by class name directly.
    pub class_lookup: bool,
    /// Whether enumerating every element by tag also yields non-element nodes.
    pub wildcard_includes_non_elements: bool,
    /// Whether the native evaluator understands the `$` subject prefix.
    pub containment_target: bool,
}

impl CapabilityProfile {
    /// Profile for a host with no native evaluator. Everything is matched manually.
    #[must_use]
    pub fn manual() -> Self {
        Self {
            pseudo_support: HashMap::new(),
            attribute_case_insensitive: false,
            native_evaluator: false,
            class_lookup: true,
            wildcard_includes_non_elements: false,
            containment_target: false,
        }
    }

    /// Builder-style registration of native support for one pseudo.
    #[must_use]
    pub fn with_pseudo(mut self, kind: PseudoKind, tier: u8, name: Option<&str>) -> Self {
        let support = PseudoSupport {
            tier,
            name: name.map(str::to_owned),
        };
        let _ = self.pseudo_support.insert(kind, support);
        self
    }

    /// Achieved tier for `kind`; 0 when unsupported.
    #[must_use]
    pub fn support_tier(&self, kind: PseudoKind) -> u8 {
        self.pseudo_support.get(&kind).map_or(0, |support| support.tier)
    }

    /// Name to emit into native strings for `kind`.
    #[must_use]
    pub fn supported_name(&self, kind: PseudoKind) -> &str {
        self.pseudo_support
            .get(&kind)
            .and_then(|support| support.name.as_deref())
            .unwrap_or_else(|| kind.name())
    }

    /// Load a profile from JSON. Absent fields take their [`Default`] value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the document does not describe a profile.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for CapabilityProfile {
    fn default() -> Self {
        Self::manual()
    }
}
