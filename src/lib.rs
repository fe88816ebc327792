//! Ownership-gated LSP middleware for multi-root workspaces.
//!
//! Several language server backends may run side by side, one per workspace
//! folder, while a single editor front-end talks to all of them. Each backend
//! gets its own [`ProtocolFilter`]; the filter forwards protocol traffic only
//! while its backend is the active one, keeps track of the documents the
//! backend has opened, and asks external configuration providers for
//! per-document build settings before forwarding `textDocument/didOpen`.

pub mod filter;
pub mod logging;

#[cfg(test)]
mod test_utils;

pub use filter::{
    ActiveBackend, Backend, BackendId, ConfigurationProvider, ConfigurationProviderRegistry,
    FilterConfig, ProtocolFilter, SourceFileConfiguration,
};
