use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use ropey::Rope;
use tower_lsp::lsp_types::Url;
use tower_lsp::Client;

use super::cache::AnalysisCache;
use super::config::ServerConfig;
use crate::analyzer::KrlAnalyzer;

/// An open KRL document.
#[derive(Debug, Default)]
pub(crate) struct Document {
    pub(crate) content: Rope,
    pub(crate) version: i32,
    /// Fresh value from [`KrlLanguageServer::next_seq`] on every open and edit;
    /// an analysis is kept only if this still matches.
    pub(crate) debounce_seq: u64,
    pub(crate) content_hash: u64,
}

pub(crate) struct KrlLanguageServer {
    pub(crate) client: Client,
    pub(crate) documents: Arc<DashMap<Url, Document>>,
    pub(crate) cache: Arc<AnalysisCache>,
    pub(crate) analyzer: Mutex<KrlAnalyzer>,
    pub(crate) config: Mutex<ServerConfig>,
    seq: AtomicU64,
}

impl KrlLanguageServer {
    pub(crate) fn new(client: Client) -> Self {
        let config = ServerConfig::from_env();
        Self {
            client,
            documents: Arc::new(DashMap::new()),
            cache: Arc::new(AnalysisCache::new()),
            analyzer: Mutex::new(config.build_analyzer()),
            config: Mutex::new(config),
            seq: AtomicU64::new(0),
        }
    }

    /// Server-wide, so sequences never repeat across reopens of one document.
    pub(crate) fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn current_analyzer(&self) -> KrlAnalyzer {
        self.analyzer.lock().map(|a| a.clone()).unwrap_or_default()
    }

    pub(crate) fn current_config(&self) -> ServerConfig {
        self.config.lock().map(|c| c.clone()).unwrap_or_default()
    }
}
