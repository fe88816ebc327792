//! Protocol filter module
//!
//! One [`ProtocolFilter`] is bound to each backend language server. It sits
//! between the editor-side transport and that backend and decides, message
//! by message, whether the backend participates.
//!
//! # Architecture
//!
//! - **Timeout**: deadline race used to bound configuration lookups
//! - **Gate**: compares the bound backend against the shared active backend
//! - **Documents**: per-backend set of open documents
//! - **Provider**: external configuration providers and their registry
//! - **Negotiation**: bounded-time configuration lookup on document open
//! - **Protocol**: the composition root exposing every intercepted operation
//!
//! # Usage
//!
//! ```rust,ignore
//! let active = Arc::new(ActiveBackend::new());
//! let providers = Arc::new(ConfigurationProviderRegistry::new());
//! let filter = ProtocolFilter::new(backend, active.clone(), providers, FilterConfig::default());
//!
//! active.set(filter.backend_id());
//! let hover = filter.provide_hover(document, position, token, |d, p, t| client.hover(d, p, t));
//! ```

pub mod backend;
pub mod config;
pub mod documents;
pub mod error;
pub mod gate;
pub mod negotiation;
pub mod protocol;
pub mod provider;
pub mod timeout;

#[cfg(test)]
pub mod testing;

pub use backend::Backend;
pub use config::{FilterConfig, FilterConfigBuilder};
pub use documents::TrackedDocuments;
pub use error::{
    BackendError, DocumentTrackingError, FilterConfigError, NegotiationError, ProviderError,
};
pub use gate::{ActiveBackend, BackendId, OwnershipGate};
pub use negotiation::ConfigurationNegotiator;
pub use protocol::{FORWARDED_OPERATIONS, ForwardedOperation, ProtocolFilter};
pub use provider::{ConfigurationProvider, ConfigurationProviderRegistry, SourceFileConfiguration};
pub use timeout::{TimeoutError, run_with_timeout};
