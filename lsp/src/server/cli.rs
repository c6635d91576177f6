use std::path::{Component, Path};

use anyhow::{anyhow, Context};
use serde_json::json;

use super::config::ServerConfig;
use crate::analyzer::{AnalysisResult, Severity};

const USAGE: &str = "Usage: krl-lsp --analyze [--errors-only] <relative-file-path>
  --analyze <file>     : Full analysis with JSON output
  --errors-only        : Show only errors in simple format";

pub(crate) fn try_cli_analyze() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(i) = args.iter().position(|a| a == "--analyze") else {
        return Ok(None);
    };

    let path = args[i + 1..]
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| anyhow!(USAGE))?;
    let errors_only = args.iter().any(|a| a == "--errors-only");

    let content = read_file_content(path)?;
    let analyzer = ServerConfig::from_env().build_analyzer();
    let analysis = analyzer.analyze(&content, path);

    if errors_only {
        Ok(Some(errors_report(&analysis)))
    } else {
        analysis_report(&analysis).map(Some)
    }
}

/// Pretty JSON of the whole result bundle.
pub fn analysis_report(analysis: &AnalysisResult) -> anyhow::Result<String> {
    let output = json!({
        "syntaxIsValid": analysis.syntax_is_valid(),
        "documentSymbols": analysis.document_symbols,
        "completionItems": analysis.completion_items,
        "diagnostics": analysis.diagnostics,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// One `Line L:C: message` row per error, 1-based.
pub fn errors_report(analysis: &AnalysisResult) -> String {
    let errors: Vec<String> = analysis
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| {
            format!(
                "Line {}:{}: {}",
                d.range.start.line + 1,
                d.range.start.character + 1,
                d.message
            )
        })
        .collect();

    if errors.is_empty() {
        "No errors found".to_string()
    } else {
        errors.join("\n")
    }
}

/// Relative paths only, with no parent components or control characters.
pub(crate) fn is_safe_path(path: &str) -> bool {
    let p = Path::new(path);
    !path.is_empty()
        && !p.is_absolute()
        && !p.has_root()
        && !p
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        && !path.chars().any(|c| matches!(c, '\0' | '\n' | '\r' | '\t'))
        && path.as_bytes().get(1) != Some(&b':')
}

pub(crate) fn read_file_content(path: &str) -> anyhow::Result<String> {
    if !is_safe_path(path) {
        return Err(anyhow!("Unsafe file path: {}", path));
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path))
}
