use std::sync::Arc;

use krl_core::toolchain::{CommandCompiler, CommandParser, RulesetCompiler, RulesetParser, ToolCommand, Unconfigured};
use serde::Deserialize;
use tower_lsp::lsp_types::ConfigurationItem;
use tracing::{info, warn};

use super::state::KrlLanguageServer;
use crate::analyzer::KrlAnalyzer;

pub const PARSER_COMMAND_ENV: &str = "KRL_PARSER_COMMAND";
pub const COMPILER_COMMAND_ENV: &str = "KRL_COMPILER_COMMAND";

const CONFIG_SECTION: &str = "krl";

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub max_number_of_problems: usize,
    pub debounce_ms: u64,
    pub parser_command: Option<ToolCommand>,
    pub compiler_command: Option<ToolCommand>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_number_of_problems: 1000,
            debounce_ms: 250,
            parser_command: None,
            compiler_command: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct KrlConfigSection {
    #[serde(default)]
    max_number_of_problems: Option<usize>,
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    parser: ToolSection,
    #[serde(default)]
    compiler: ToolSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ToolSection {
    #[serde(default)]
    command: Option<Vec<String>>,
}

impl ServerConfig {
    /// Defaults, with collaborator commands taken from the environment.
    pub fn from_env() -> Self {
        Self {
            parser_command: ToolCommand::from_env(PARSER_COMMAND_ENV),
            compiler_command: ToolCommand::from_env(COMPILER_COMMAND_ENV),
            ..Self::default()
        }
    }

    /// Overlay the client's `krl` settings. Absent keys keep their current value.
    pub fn apply_section(&mut self, value: serde_json::Value) -> Result<(), serde_json::Error> {
        if value.is_null() {
            return Ok(());
        }
        let section: KrlConfigSection = serde_json::from_value(value)?;
        if let Some(max) = section.max_number_of_problems {
            self.max_number_of_problems = max;
        }
        if let Some(ms) = section.debounce_ms {
            self.debounce_ms = ms;
        }
        if let Some(cmd) = section.parser.command.as_deref().and_then(ToolCommand::from_argv) {
            self.parser_command = Some(cmd);
        }
        if let Some(cmd) = section.compiler.command.as_deref().and_then(ToolCommand::from_argv) {
            self.compiler_command = Some(cmd);
        }
        Ok(())
    }

    pub fn build_analyzer(&self) -> KrlAnalyzer {
        let parser: Arc<dyn RulesetParser> = match &self.parser_command {
            Some(cmd) => Arc::new(CommandParser::new(cmd.clone())),
            None => Arc::new(Unconfigured),
        };
        let compiler: Arc<dyn RulesetCompiler> = match &self.compiler_command {
            Some(cmd) => Arc::new(CommandCompiler::new(cmd.clone())),
            None => Arc::new(Unconfigured),
        };
        KrlAnalyzer::new(parser, compiler)
    }
}

impl KrlLanguageServer {
    pub(crate) async fn load_config(&self) {
        let items = vec![ConfigurationItem {
            scope_uri: None,
            section: Some(CONFIG_SECTION.to_string()),
        }];

        let Ok(values) = self.client.configuration(items).await else {
            return;
        };
        let Some(value) = values.into_iter().next() else {
            return;
        };

        let mut config = ServerConfig::from_env();
        if let Err(err) = config.apply_section(value) {
            warn!("ignoring malformed `krl` settings: {err}");
            return;
        }
        info!(
            parser = config.parser_command.is_some(),
            compiler = config.compiler_command.is_some(),
            "loaded KRL settings"
        );

        let analyzer = config.build_analyzer();
        if let Ok(mut guard) = self.analyzer.lock() {
            *guard = analyzer;
        }
        if let Ok(mut guard) = self.config.lock() {
            *guard = config;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_section_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_section(json!({
                "maxNumberOfProblems": 10,
                "debounceMs": 50,
                "parser": { "command": ["node", "parse.js"] },
                "compiler": { "command": [] }
            }))
            .unwrap();
        assert_eq!(config.max_number_of_problems, 10);
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(
            config.parser_command,
            Some(ToolCommand::new("node", vec!["parse.js".to_string()]))
        );
        assert_eq!(config.compiler_command, None);
    }

    #[test]
    fn test_apply_section_keeps_existing_commands() {
        let mut config = ServerConfig {
            compiler_command: Some(ToolCommand::new("krl-compiler", vec![])),
            ..ServerConfig::default()
        };
        config.apply_section(json!({})).unwrap();
        config.apply_section(serde_json::Value::Null).unwrap();
        assert_eq!(config, ServerConfig {
            compiler_command: Some(ToolCommand::new("krl-compiler", vec![])),
            ..ServerConfig::default()
        });
    }

    #[test]
    fn test_apply_section_rejects_bad_types() {
        let mut config = ServerConfig::default();
        assert!(config.apply_section(json!({ "debounceMs": "soon" })).is_err());
        assert_eq!(config.debounce_ms, 250);
    }
}
