use std::sync::Arc;

use dashmap::DashMap;
use tokio::task;
use tokio::time::{sleep, Duration};
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

use super::cache::AnalysisCache;
use super::convert;
use super::state::{Document, KrlLanguageServer};
use crate::analyzer::AnalysisResult;

/// Cache `result` if the document still has the snapshot's sequence and version.
///
/// The document entry stays locked while the cache is written, so a concurrent
/// close either wins (nothing is stored) or runs after the store and evicts it.
pub(crate) fn store_if_current(
    documents: &DashMap<Url, Document>,
    cache: &AnalysisCache,
    uri: &Url,
    seq: u64,
    version: i32,
    result: Arc<AnalysisResult>,
) -> bool {
    let Some(doc) = documents.get_mut(uri) else {
        return false;
    };
    if doc.debounce_seq != seq || doc.version != version {
        return false;
    }
    cache.put(uri.clone(), result);
    true
}

impl KrlLanguageServer {
    /// Analyze `uri` after the debounce delay, unless it was edited again
    /// meanwhile, then cache the result and publish its diagnostics.
    pub(crate) fn schedule_analysis(&self, uri: Url, scheduled_seq: u64) {
        let documents = self.documents.clone();
        let cache = self.cache.clone();
        let client = self.client.clone();
        let analyzer = self.current_analyzer();
        let config = self.current_config();

        tokio::spawn(async move {
            sleep(Duration::from_millis(config.debounce_ms)).await;

            let (text, version) = match documents.get(&uri) {
                Some(doc) if doc.debounce_seq == scheduled_seq => (doc.content.to_string(), doc.version),
                _ => return,
            };

            let uri_label = uri.to_string();
            let computed = task::spawn_blocking(move || analyzer.analyze(&text, &uri_label)).await;
            let result = match computed {
                Ok(result) => Arc::new(result),
                Err(err) => {
                    warn!(%uri, "analysis task failed: {err}");
                    return;
                }
            };

            if !store_if_current(&documents, &cache, &uri, scheduled_seq, version, result.clone()) {
                debug!(%uri, "dropping stale analysis");
                return;
            }

            let diagnostics = convert::diagnostics(&result.diagnostics, config.max_number_of_problems);
            client.publish_diagnostics(uri.clone(), diagnostics, Some(version)).await;

            // Closed while publishing: make sure the editor ends up with no diagnostics.
            if !documents.contains_key(&uri) {
                client.publish_diagnostics(uri, Vec::new(), None).await;
            }
        });
    }

    /// Cached analysis for `uri`, computing one on demand when none is stored yet.
    pub(crate) async fn current_analysis(&self, uri: &Url) -> Option<Arc<AnalysisResult>> {
        if let Some(cached) = self.cache.get(uri) {
            return Some(cached);
        }

        let (text, version, seq) = {
            let doc = self.documents.get(uri)?;
            (doc.content.to_string(), doc.version, doc.debounce_seq)
        };
        let analyzer = self.current_analyzer();
        let uri_label = uri.to_string();
        let result = task::spawn_blocking(move || analyzer.analyze(&text, &uri_label))
            .await
            .ok()
            .map(Arc::new)?;

        store_if_current(&self.documents, &self.cache, uri, seq, version, result.clone());
        Some(result)
    }

    /// Re-run analysis for every open document, e.g. after settings change.
    pub(crate) fn reanalyze_all(&self) {
        let open: Vec<(Url, u64)> = self
            .documents
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().debounce_seq))
            .collect();
        for (uri, seq) in open {
            self.cache.delete(&uri);
            self.schedule_analysis(uri, seq);
        }
    }
}
