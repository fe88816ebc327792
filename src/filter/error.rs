//! Error types for the protocol filter
//!
//! None of these reach the editor. Negotiation errors degrade to forwarding
//! the open without configuration; tracking errors are logged and counted.

use std::error::Error;
use std::time::Duration;

use crate::filter::timeout::TimeoutError;

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failure reported by a configuration provider
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ProviderError {
    /// Builds an error without an underlying source
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Failure reported by a backend while delivering configuration
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl BackendError {
    /// Builds an error without an underlying source
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

// ============================================================================
// Negotiation Errors
// ============================================================================

/// Reasons a configuration negotiation ended without delivering configuration
#[derive(Debug, thiserror::Error)]
pub enum NegotiationError {
    /// Provider did not answer before the deadline
    #[error("Configuration provider '{provider}' timed out")]
    TimedOut {
        provider: String,
        #[source]
        source: TimeoutError,
    },

    /// Provider answered with an error
    #[error("Configuration provider '{provider}' failed")]
    ProviderFailed {
        provider: String,
        #[source]
        source: ProviderError,
    },

    /// Provider task panicked or was aborted
    #[error("Configuration provider '{provider}' aborted: {reason}")]
    ProviderAborted { provider: String, reason: String },

    /// Backend rejected the configuration
    #[error("Failed to deliver configuration to backend")]
    DeliveryFailed {
        #[source]
        source: BackendError,
    },
}

impl NegotiationError {
    /// Whether the negotiation was cut short by the deadline
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

// ============================================================================
// Document Tracking Errors
// ============================================================================

/// Open/close pairing violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentTrackingError {
    /// A close arrived for a document this backend never opened
    #[error("Close received for untracked document: {uri}")]
    UntrackedClose { uri: String },
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Filter configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterConfigError {
    /// Invalid timeout value
    #[error("Invalid timeout: {timeout:?} - {reason}")]
    InvalidTimeout { timeout: Duration, reason: String },

    /// Environment variable could not be parsed
    #[error("Invalid value for {var}: '{value}' - {reason}")]
    InvalidEnvValue {
        var: String,
        value: String,
        reason: String,
    },
}

impl FilterConfigError {
    /// Create an invalid timeout error
    pub fn invalid_timeout(timeout: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            timeout,
            reason: reason.into(),
        }
    }

    /// Create an invalid environment value error
    pub fn invalid_env_value(
        var: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidEnvValue {
            var: var.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
