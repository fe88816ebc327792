//! Mock collaborators for filter tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use lsp_types::{TextDocumentItem, Uri};

use crate::filter::backend::Backend;
use crate::filter::error::{BackendError, ProviderError};
use crate::filter::gate::BackendId;
use crate::filter::provider::{ConfigurationProvider, SourceFileConfiguration};

/// Ordered record of collaborator calls, shared between mocks
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

// ============================================================================
// Mock Backend
// ============================================================================

/// Backend that records delivered configurations
#[derive(Debug)]
pub struct MockBackend {
    id: BackendId,
    delivered: Mutex<Vec<(Uri, SourceFileConfiguration)>>,
    reject_delivery: bool,
    events: EventLog,
}

impl MockBackend {
    pub fn new(events: EventLog) -> Self {
        Self {
            id: BackendId::new(),
            delivered: Mutex::new(Vec::new()),
            reject_delivery: false,
            events,
        }
    }

    /// Backend whose configuration channel always fails
    pub fn rejecting(events: EventLog) -> Self {
        Self {
            reject_delivery: true,
            ..Self::new(events)
        }
    }

    pub fn delivered(&self) -> Vec<(Uri, SourceFileConfiguration)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn id(&self) -> BackendId {
        self.id
    }

    async fn send_custom_configuration(
        &self,
        document: &TextDocumentItem,
        configuration: SourceFileConfiguration,
    ) -> Result<(), BackendError> {
        self.events
            .record(format!("configure {}", document.uri.as_str()));
        if self.reject_delivery {
            return Err(BackendError::new("configuration channel closed"));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((document.uri.clone(), configuration));
        Ok(())
    }
}

// ============================================================================
// Mock Provider
// ============================================================================

type ClaimFn = Box<dyn Fn(&Uri) -> bool + Send + Sync>;

/// Provider with scripted capability, latency and answer
pub struct MockProvider {
    name: String,
    claims: ClaimFn,
    delay: Option<Duration>,
    response: Result<SourceFileConfiguration, String>,
    capability_checks: AtomicUsize,
    calls: AtomicUsize,
    events: EventLog,
}

impl MockProvider {
    fn with_claim(name: &str, claims: ClaimFn) -> Self {
        Self {
            name: name.to_string(),
            claims,
            delay: None,
            response: Ok(SourceFileConfiguration {
                defines: vec![format!("PROVIDER={name}")],
                ..Default::default()
            }),
            capability_checks: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            events: EventLog::new(),
        }
    }

    /// Provider that claims every document
    pub fn claiming(name: &str) -> Self {
        Self::with_claim(name, Box::new(|_| true))
    }

    /// Provider that claims no document
    pub fn declining(name: &str) -> Self {
        Self::with_claim(name, Box::new(|_| false))
    }

    /// Provider that claims documents whose URI ends with `suffix`
    pub fn claiming_suffix(name: &str, suffix: &'static str) -> Self {
        Self::with_claim(name, Box::new(move |uri| uri.as_str().ends_with(suffix)))
    }

    /// Answer only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer with an error
    pub fn failing(mut self, message: &str) -> Self {
        self.response = Err(message.to_string());
        self
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = events;
        self
    }

    /// The configuration this provider answers with, if it succeeds
    pub fn configuration(&self) -> Option<SourceFileConfiguration> {
        self.response.as_ref().ok().cloned()
    }

    pub fn capability_checks(&self) -> usize {
        self.capability_checks.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigurationProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_provide_configuration(&self, uri: &Uri) -> bool {
        self.capability_checks.fetch_add(1, Ordering::SeqCst);
        (self.claims)(uri)
    }

    async fn provide_configuration(
        &self,
        uri: &Uri,
    ) -> Result<SourceFileConfiguration, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.events
            .record(format!("provide {} {}", self.name, uri.as_str()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.response.clone().map_err(ProviderError::new)
    }
}

/// Provider whose lookup panics
pub struct PanickingProvider;

#[async_trait]
impl ConfigurationProvider for PanickingProvider {
    fn name(&self) -> &str {
        "panicking"
    }

    fn can_provide_configuration(&self, _uri: &Uri) -> bool {
        true
    }

    async fn provide_configuration(
        &self,
        _uri: &Uri,
    ) -> Result<SourceFileConfiguration, ProviderError> {
        panic!("provider crashed");
    }
}

/// A C++ source document at `uri`
pub fn cpp_document(uri: &str) -> TextDocumentItem {
    TextDocumentItem {
        uri: uri.parse().unwrap(),
        language_id: "cpp".to_string(),
        version: 1,
        text: "int main() { return 0; }".to_string(),
    }
}
