//! Backend side of the filter
//!
//! The filter forwards protocol messages through transport continuations, but
//! configuration goes to the backend through its own channel.

use async_trait::async_trait;
use lsp_types::TextDocumentItem;
use std::fmt;

use crate::filter::error::BackendError;
use crate::filter::gate::BackendId;
use crate::filter::provider::SourceFileConfiguration;

/// One running language server bound to a workspace folder
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// Identity compared against the active backend
    fn id(&self) -> BackendId;

    /// Push configuration for `document` ahead of its open notification
    async fn send_custom_configuration(
        &self,
        document: &TextDocumentItem,
        configuration: SourceFileConfiguration,
    ) -> Result<(), BackendError>;
}
