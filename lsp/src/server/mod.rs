mod analysis;
mod cache;
mod cli;
mod config;
pub mod convert;
mod entry;
mod handlers;
mod state;
mod text;
mod utils;

pub use cache::AnalysisCache;
pub use cli::{analysis_report, errors_report};
pub use config::{ServerConfig, COMPILER_COMMAND_ENV, PARSER_COMMAND_ENV};
pub use entry::run;
