//! Configuration for protocol filters
//!
//! Provides FilterConfig with builder pattern, validation and environment
//! overrides.

use std::env;
use std::time::Duration;

use crate::filter::error::FilterConfigError;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Default deadline for configuration providers on document open (1 second)
///
/// Caps the latency a slow or hung provider can add to `textDocument/didOpen`.
pub const DEFAULT_NEGOTIATION_TIMEOUT_MS: u64 = 1000;

/// Maximum allowed negotiation timeout (1 minute)
pub const MAX_NEGOTIATION_TIMEOUT_SECS: u64 = 60;

/// Environment variable overriding the negotiation timeout, in milliseconds
pub const NEGOTIATION_TIMEOUT_ENV: &str = "PROTOCOL_FILTER_NEGOTIATION_TIMEOUT_MS";

// ============================================================================
// Core Configuration Types
// ============================================================================

/// Protocol filter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    negotiation_timeout: Duration,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            negotiation_timeout: Duration::from_millis(DEFAULT_NEGOTIATION_TIMEOUT_MS),
        }
    }
}

impl FilterConfig {
    /// Create a builder starting from defaults
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::new()
    }

    /// Deadline for a configuration provider to answer on document open.
    /// Zero means providers always time out.
    pub fn negotiation_timeout(&self) -> Duration {
        self.negotiation_timeout
    }

    /// Create FilterConfig from environment variables
    pub fn from_env() -> Result<Self, FilterConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create FilterConfig from an arbitrary variable lookup
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, FilterConfigError> {
        let mut builder = FilterConfigBuilder::new();

        if let Some(raw) = lookup(NEGOTIATION_TIMEOUT_ENV) {
            builder = builder.negotiation_timeout(parse_timeout_millis(&raw)?);
        }

        builder.build()
    }
}

/// Parse a signed millisecond count; values at or below zero clamp to zero
fn parse_timeout_millis(raw: &str) -> Result<Duration, FilterConfigError> {
    let millis: i64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
        FilterConfigError::invalid_env_value(NEGOTIATION_TIMEOUT_ENV, raw, e.to_string())
    })?;

    Ok(Duration::from_millis(millis.max(0).unsigned_abs()))
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Builder for FilterConfig with validation and defaults
#[derive(Debug, Default)]
pub struct FilterConfigBuilder {
    negotiation_timeout: Option<Duration>,
}

impl FilterConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration provider deadline
    pub fn negotiation_timeout(mut self, timeout: Duration) -> Self {
        self.negotiation_timeout = Some(timeout);
        self
    }

    /// Validate and build the configuration
    pub fn build(self) -> Result<FilterConfig, FilterConfigError> {
        let defaults = FilterConfig::default();
        let negotiation_timeout = self
            .negotiation_timeout
            .unwrap_or(defaults.negotiation_timeout);

        if negotiation_timeout > Duration::from_secs(MAX_NEGOTIATION_TIMEOUT_SECS) {
            return Err(FilterConfigError::invalid_timeout(
                negotiation_timeout,
                format!("must not exceed {MAX_NEGOTIATION_TIMEOUT_SECS} seconds"),
            ));
        }

        Ok(FilterConfig {
            negotiation_timeout,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
