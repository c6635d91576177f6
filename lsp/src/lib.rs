//! KRL language server: parse-or-fallback document analysis and its LSP front end.

pub mod analyzer;
pub mod server;
