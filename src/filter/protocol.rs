//! Protocol filter bound to one backend
//!
//! Every intercepted operation takes the original arguments plus a `forward`
//! continuation supplied by the transport. While the bound backend is active
//! the continuation is called with the arguments unchanged and its result is
//! returned as `Some`; otherwise nothing is forwarded and the neutral value
//! (`None`, or no edits for `willSaveWaitUntil`) is returned instead.

use std::future::Future;
use std::sync::Arc;

use lsp_types::notification::{self, Notification};
use lsp_types::request::{self, Request};
use lsp_types::{
    CodeActionContext, CodeLens, CompletionItem, DidChangeTextDocumentParams,
    DidSaveTextDocumentParams, DocumentLink, FormattingOptions, Position, Range, ReferenceContext,
    TextDocumentIdentifier, TextDocumentItem, TextEdit, WillSaveTextDocumentParams,
};
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, error, warn};

use crate::filter::backend::Backend;
use crate::filter::config::FilterConfig;
use crate::filter::documents::TrackedDocuments;
use crate::filter::gate::{ActiveBackend, BackendId, OwnershipGate};
use crate::filter::negotiation::ConfigurationNegotiator;
use crate::filter::provider::ConfigurationProviderRegistry;
use crate::log_lsp_message;

/// An operation that is forwarded through the ownership gate alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardedOperation {
    /// Filter method name
    pub name: &'static str,
    /// LSP method the operation corresponds to
    pub method: &'static str,
    /// Number of arguments passed to `forward`
    pub arity: usize,
}

// ============================================================================
// Protocol Filter
// ============================================================================

/// Per-backend filter over editor protocol traffic
#[derive(Debug)]
pub struct ProtocolFilter {
    gate: OwnershipGate,
    backend: Arc<dyn Backend>,
    documents: TrackedDocuments,
    negotiator: ConfigurationNegotiator,
    config: FilterConfig,
}

impl ProtocolFilter {
    /// Create the filter for `backend`
    ///
    /// `active` and `providers` are shared with the filters of every other
    /// backend.
    pub fn new(
        backend: Arc<dyn Backend>,
        active: Arc<ActiveBackend>,
        providers: Arc<ConfigurationProviderRegistry>,
        config: FilterConfig,
    ) -> Self {
        Self {
            gate: OwnershipGate::new(backend.id(), active),
            negotiator: ConfigurationNegotiator::new(providers, config.negotiation_timeout()),
            documents: TrackedDocuments::new(),
            backend,
            config,
        }
    }

    pub fn backend_id(&self) -> BackendId {
        self.gate.backend_id()
    }

    /// Whether traffic is currently forwarded to this filter's backend
    pub fn is_active(&self) -> bool {
        self.gate.is_open()
    }

    /// Documents opened under this backend
    pub fn tracked_documents(&self) -> &TrackedDocuments {
        &self.documents
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Call `forward` only if the backend is active
    fn invoke<R>(&self, method: &'static str, forward: impl FnOnce() -> R) -> Option<R> {
        if self.gate.is_open() {
            log_lsp_message!(Level::TRACE, "forward", method, self.gate.backend_id());
            Some(forward())
        } else {
            log_lsp_message!(Level::TRACE, "suppress", method, self.gate.backend_id());
            None
        }
    }

    /// `textDocument/didOpen`
    ///
    /// Tracking and provider selection happen when this is called; the
    /// returned future runs the configuration lookup and then forwards. The
    /// open is forwarded whatever the lookup's outcome, at most one
    /// negotiation timeout later. The future must be driven to completion:
    /// dropping it leaves the document tracked and the open unforwarded.
    #[must_use = "the open is only forwarded once the returned future completes"]
    pub fn did_open<F, R>(
        &self,
        document: TextDocumentItem,
        forward: F,
    ) -> impl Future<Output = Option<R>> + use<F, R>
    where
        F: FnOnce(TextDocumentItem) -> R,
    {
        let method = notification::DidOpenTextDocument::METHOD;
        let admitted = self.gate.is_open();

        let provider = if admitted {
            if !self.documents.insert(document.uri.clone()) {
                debug!("Document already tracked: {}", document.uri.as_str());
            }
            self.negotiator.select(&document.uri)
        } else {
            log_lsp_message!(Level::TRACE, "suppress", method, self.gate.backend_id());
            None
        };

        let negotiator = self.negotiator.clone();
        let backend = Arc::clone(&self.backend);

        async move {
            if !admitted {
                return None;
            }

            if let Some(provider) = provider
                && let Err(e) = negotiator
                    .negotiate(provider, &document, backend.as_ref())
                    .await
            {
                warn!(
                    "Opening {} without custom configuration: {}",
                    document.uri.as_str(),
                    e
                );
            }

            log_lsp_message!(Level::TRACE, "forward", method, backend.id());
            Some(forward(document))
        }
    }

    /// `textDocument/didClose`
    ///
    /// A close for a document this backend never opened is logged and
    /// counted, and still forwarded.
    pub fn did_close<F, R>(&self, document: TextDocumentIdentifier, forward: F) -> Option<R>
    where
        F: FnOnce(TextDocumentIdentifier) -> R,
    {
        self.invoke(notification::DidCloseTextDocument::METHOD, move || {
            if let Err(e) = self.documents.remove(&document.uri) {
                error!(backend = %self.gate.backend_id(), "{}", e);
            }
            forward(document)
        })
    }

    /// `textDocument/willSaveWaitUntil`
    ///
    /// Resolves to no edits when the backend is not active.
    #[must_use = "the forwarded edits are only produced once the returned future completes"]
    pub fn will_save_wait_until<F, Fut>(
        &self,
        params: WillSaveTextDocumentParams,
        forward: F,
    ) -> impl Future<Output = Vec<TextEdit>> + use<F, Fut>
    where
        F: FnOnce(WillSaveTextDocumentParams) -> Fut,
        Fut: Future<Output = Vec<TextEdit>>,
    {
        let pending = self.invoke(request::WillSaveWaitUntil::METHOD, move || forward(params));

        async move {
            match pending {
                Some(edits) => edits.await,
                None => Vec::new(),
            }
        }
    }
}

// ============================================================================
// Gate-only Operations
// ============================================================================

macro_rules! forwarding_operations {
    ($(
        $(#[$meta:meta])*
        $name:ident ( $($arg:ident : $ty:ty),+ $(,)? ) => $method:expr;
    )+) => {
        /// Operations forwarded through the ownership gate alone
        pub const FORWARDED_OPERATIONS: &[ForwardedOperation] = &[
            $(ForwardedOperation {
                name: stringify!($name),
                method: $method,
                arity: [$(stringify!($arg)),+].len(),
            },)+
        ];

        impl ProtocolFilter {
            $(
                $(#[$meta])*
                pub fn $name<F, R>(&self, $($arg: $ty,)+ forward: F) -> Option<R>
                where
                    F: FnOnce($($ty),+) -> R,
                {
                    self.invoke($method, move || forward($($arg),+))
                }
            )+
        }
    };
}

forwarding_operations! {
    /// `textDocument/completion`
    provide_completion_item(
        document: TextDocumentIdentifier,
        position: Position,
        token: CancellationToken,
    ) => request::Completion::METHOD;

    /// `completionItem/resolve`
    resolve_completion_item(item: CompletionItem, token: CancellationToken)
        => request::ResolveCompletionItem::METHOD;

    /// `textDocument/hover`
    provide_hover(document: TextDocumentIdentifier, position: Position, token: CancellationToken)
        => request::HoverRequest::METHOD;

    /// `textDocument/signatureHelp`
    provide_signature_help(
        document: TextDocumentIdentifier,
        position: Position,
        token: CancellationToken,
    ) => request::SignatureHelpRequest::METHOD;

    /// `textDocument/definition`
    provide_definition(
        document: TextDocumentIdentifier,
        position: Position,
        token: CancellationToken,
    ) => request::GotoDefinition::METHOD;

    /// `textDocument/references`
    provide_references(
        document: TextDocumentIdentifier,
        position: Position,
        context: ReferenceContext,
        token: CancellationToken,
    ) => request::References::METHOD;

    /// `textDocument/documentHighlight`
    provide_document_highlights(
        document: TextDocumentIdentifier,
        position: Position,
        token: CancellationToken,
    ) => request::DocumentHighlightRequest::METHOD;

    /// `textDocument/documentSymbol`
    provide_document_symbols(document: TextDocumentIdentifier, token: CancellationToken)
        => request::DocumentSymbolRequest::METHOD;

    /// `workspace/symbol`, routed like document requests so only the active
    /// backend answers
    provide_workspace_symbols(query: String, token: CancellationToken)
        => request::WorkspaceSymbolRequest::METHOD;

    /// `textDocument/codeAction`
    provide_code_actions(
        document: TextDocumentIdentifier,
        range: Range,
        context: CodeActionContext,
        token: CancellationToken,
    ) => request::CodeActionRequest::METHOD;

    /// `textDocument/codeLens`
    provide_code_lenses(document: TextDocumentIdentifier, token: CancellationToken)
        => request::CodeLensRequest::METHOD;

    /// `codeLens/resolve`
    resolve_code_lens(code_lens: CodeLens, token: CancellationToken)
        => request::CodeLensResolve::METHOD;

    /// `textDocument/formatting`
    provide_document_formatting_edits(
        document: TextDocumentIdentifier,
        options: FormattingOptions,
        token: CancellationToken,
    ) => request::Formatting::METHOD;

    /// `textDocument/rangeFormatting`
    provide_document_range_formatting_edits(
        document: TextDocumentIdentifier,
        range: Range,
        options: FormattingOptions,
        token: CancellationToken,
    ) => request::RangeFormatting::METHOD;

    /// `textDocument/onTypeFormatting`; `ch` is the character just typed
    provide_on_type_formatting_edits(
        document: TextDocumentIdentifier,
        position: Position,
        ch: String,
        options: FormattingOptions,
        token: CancellationToken,
    ) => request::OnTypeFormatting::METHOD;

    /// `textDocument/rename`
    provide_rename_edits(
        document: TextDocumentIdentifier,
        position: Position,
        new_name: String,
        token: CancellationToken,
    ) => request::Rename::METHOD;

    /// `textDocument/documentLink`
    provide_document_links(document: TextDocumentIdentifier, token: CancellationToken)
        => request::DocumentLinkRequest::METHOD;

    /// `documentLink/resolve`
    resolve_document_link(link: DocumentLink, token: CancellationToken)
        => request::DocumentLinkResolve::METHOD;

    /// `textDocument/didChange`
    did_change(params: DidChangeTextDocumentParams)
        => notification::DidChangeTextDocument::METHOD;

    /// `textDocument/willSave`
    will_save(params: WillSaveTextDocumentParams)
        => notification::WillSaveTextDocument::METHOD;

    /// `textDocument/didSave`
    did_save(params: DidSaveTextDocumentParams)
        => notification::DidSaveTextDocument::METHOD;
}

// ============================================================================
// Tests
// ============================================================================
