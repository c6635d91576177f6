use ropey::Rope;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::LanguageServer;
use tracing::{debug, info};

use super::{
    convert,
    state::{Document, KrlLanguageServer},
    text::{apply_change, line_prefix},
    utils::compute_content_hash,
};
use crate::analyzer::{is_operator_context, operator_completions};

#[tower_lsp::async_trait]
impl LanguageServer for KrlLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        info!("KRL Language Server initializing with params: {:?}", params.root_uri);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::INCREMENTAL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![".".to_string()]),
                    work_done_progress_options: Default::default(),
                    all_commit_characters: None,
                    completion_item: None,
                }),
                document_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "KRL Language Server".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        info!("KRL Language Server initialized");
        let _ = self
            .client
            .log_message(MessageType::INFO, "KRL Language Server started")
            .await;
        self.load_config().await;
    }

    async fn shutdown(&self) -> Result<()> {
        info!("KRL Language Server shutting down");
        Ok(())
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        self.load_config().await;
        self.reanalyze_all();
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = Rope::from_str(&params.text_document.text);
        let seq = self.next_seq();
        let document = Document {
            content_hash: compute_content_hash(&content),
            content,
            version: params.text_document.version,
            debounce_seq: seq,
        };
        self.documents.insert(uri.clone(), document);
        self.cache.delete(&uri);
        self.schedule_analysis(uri, seq);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        let scheduled_seq = {
            let mut doc = self.documents.entry(uri.clone()).or_default();
            doc.version = params.text_document.version;
            for change in &params.content_changes {
                apply_change(&mut doc.content, change);
            }
            let hash = compute_content_hash(&doc.content);
            if hash == doc.content_hash && self.cache.get(&uri).is_some() {
                debug!(%uri, "content unchanged, keeping analysis");
                None
            } else {
                doc.content_hash = hash;
                doc.debounce_seq = self.next_seq();
                Some(doc.debounce_seq)
            }
        };

        if let Some(seq) = scheduled_seq {
            self.schedule_analysis(uri, seq);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.remove(&uri);
        self.cache.delete(&uri);
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let dot_trigger = params
            .context
            .as_ref()
            .and_then(|ctx| ctx.trigger_character.as_deref())
            == Some(".");
        let prefix = self
            .documents
            .get(uri)
            .map(|doc| line_prefix(&doc.content, position))
            .unwrap_or_default();

        if dot_trigger || is_operator_context(&prefix) {
            let items = operator_completions().iter().map(convert::completion_item).collect();
            return Ok(Some(CompletionResponse::Array(items)));
        }

        let mut items = convert::structural_completions();
        if let Some(analysis) = self.current_analysis(uri).await {
            items.extend(analysis.completion_items.iter().map(convert::completion_item));
        }
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn document_symbol(&self, params: DocumentSymbolParams) -> Result<Option<DocumentSymbolResponse>> {
        let uri = &params.text_document.uri;
        let Some(analysis) = self.current_analysis(uri).await else {
            return Ok(None);
        };
        let symbols = analysis
            .document_symbols
            .iter()
            .map(|s| convert::symbol_information(s, uri))
            .collect();
        Ok(Some(DocumentSymbolResponse::Flat(symbols)))
    }
}
