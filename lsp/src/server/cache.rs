use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::Url;

use crate::analyzer::AnalysisResult;

/// Latest analysis per open document. Entries live until the document closes.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: DashMap<Url, Arc<AnalysisResult>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `result`, replacing any previous entry for `uri`.
    pub fn put(&self, uri: Url, result: Arc<AnalysisResult>) {
        self.entries.insert(uri, result);
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<AnalysisResult>> {
        self.entries.get(uri).map(|entry| entry.value().clone())
    }

    /// Drop the entry for `uri`; false when there was none.
    pub fn delete(&self, uri: &Url) -> bool {
        self.entries.remove(uri).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
