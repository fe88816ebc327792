//! Bounded-time configuration lookup on document open
//!
//! Before `textDocument/didOpen` is forwarded, the first provider that claims
//! the document is asked for its configuration. The answer is pushed to the
//! backend if it arrives before the deadline; otherwise the open goes out
//! without it.

use std::sync::Arc;
use std::time::Duration;

use lsp_types::{TextDocumentItem, Uri};
use tokio::time::Instant;
use tracing::{Level, debug};

use crate::filter::backend::Backend;
use crate::filter::error::NegotiationError;
use crate::filter::provider::{ConfigurationProvider, ConfigurationProviderRegistry};
use crate::filter::timeout::run_with_timeout;
use crate::log_timing;

/// Selects a provider for a document and delivers its answer to the backend
#[derive(Debug, Clone)]
pub struct ConfigurationNegotiator {
    providers: Arc<ConfigurationProviderRegistry>,
    timeout: Duration,
}

impl ConfigurationNegotiator {
    pub fn new(providers: Arc<ConfigurationProviderRegistry>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// Deadline applied to each provider lookup
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// First registered provider claiming `uri`
    pub fn select(&self, uri: &Uri) -> Option<Arc<dyn ConfigurationProvider>> {
        let provider = self.providers.select(uri);
        match &provider {
            Some(provider) => debug!("Provider '{}' claims {}", provider.name(), uri.as_str()),
            None => debug!("No configuration provider for {}", uri.as_str()),
        }
        provider
    }

    /// Ask `provider` for the configuration of `document` and hand it to `backend`
    ///
    /// The lookup runs on its own task. When the deadline passes first, that
    /// task is detached rather than aborted: it may still finish, and its
    /// answer is dropped.
    pub async fn negotiate(
        &self,
        provider: Arc<dyn ConfigurationProvider>,
        document: &TextDocumentItem,
        backend: &dyn Backend,
    ) -> Result<(), NegotiationError> {
        let started = Instant::now();
        let provider_name = provider.name().to_string();

        let uri = document.uri.clone();
        let lookup = tokio::spawn(async move { provider.provide_configuration(&uri).await });

        let outcome = run_with_timeout(lookup, self.timeout).await;
        log_timing!(Level::DEBUG, "configuration_lookup", started.elapsed());

        let configuration = match outcome {
            Ok(Ok(Ok(configuration))) => configuration,
            Ok(Ok(Err(source))) => {
                return Err(NegotiationError::ProviderFailed {
                    provider: provider_name,
                    source,
                });
            }
            Ok(Err(join_error)) => {
                return Err(NegotiationError::ProviderAborted {
                    provider: provider_name,
                    reason: join_error.to_string(),
                });
            }
            Err(source) => {
                return Err(NegotiationError::TimedOut {
                    provider: provider_name,
                    source,
                });
            }
        };

        backend
            .send_custom_configuration(document, configuration)
            .await
            .map_err(|source| NegotiationError::DeliveryFailed { source })?;

        debug!(
            "Delivered configuration from '{}' for {}",
            provider_name,
            document.uri.as_str()
        );
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
