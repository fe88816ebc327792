//! External configuration providers
//!
//! A provider supplies per-document build settings (include paths, defines,
//! language standard) that the backend cannot infer on its own. Providers are
//! registered in order and the first one that claims a document wins.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use lsp_types::Uri;
use serde::{Deserialize, Serialize};

use crate::filter::error::ProviderError;

// ============================================================================
// Configuration Payload
// ============================================================================

/// Build settings for a single source file
///
/// The filter never inspects these values; it hands them to the backend as
/// received. Fields it does not know about are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFileConfiguration {
    #[serde(default)]
    pub include_path: Vec<String>,

    #[serde(default)]
    pub defines: Vec<String>,

    #[serde(
        rename = "intelliSenseMode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub intellisense_mode: Option<String>,

    /// Language standard, e.g. "c++17"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forced_include: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub windows_sdk_version: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Source of per-document configuration
///
/// `provide_configuration` may be slow, fail, or never finish; callers bound
/// it with a deadline.
#[async_trait]
pub trait ConfigurationProvider: Send + Sync {
    /// Human-readable provider name for logs
    fn name(&self) -> &str;

    /// Whether this provider can configure the document at `uri`
    fn can_provide_configuration(&self, uri: &Uri) -> bool;

    /// Produce the configuration for the document at `uri`
    async fn provide_configuration(
        &self,
        uri: &Uri,
    ) -> Result<SourceFileConfiguration, ProviderError>;
}

// ============================================================================
// Provider Registry
// ============================================================================

/// Ordered set of configuration providers
///
/// Shared between all filters; providers may be registered at any time.
#[derive(Default)]
pub struct ConfigurationProviderRegistry {
    providers: RwLock<Vec<Arc<dyn ConfigurationProvider>>>,
}

impl ConfigurationProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the registry
    pub fn with_provider(self, provider: Arc<dyn ConfigurationProvider>) -> Self {
        self.register(provider);
        self
    }

    /// Append a provider after all previously registered ones
    pub fn register(&self, provider: Arc<dyn ConfigurationProvider>) {
        self.providers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(provider);
    }

    pub fn len(&self) -> usize {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First provider, in registration order, that claims `uri`
    ///
    /// Providers after the match are not asked.
    pub fn select(&self, uri: &Uri) -> Option<Arc<dyn ConfigurationProvider>> {
        self.providers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|provider| provider.can_provide_configuration(uri))
            .cloned()
    }
}

impl std::fmt::Debug for ConfigurationProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let providers = self.providers.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ConfigurationProviderRegistry")
            .field(
                "providers",
                &providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
