//! Mapping from analysis results to `lsp_types` wire shapes.

use tower_lsp::lsp_types as lsp;

use crate::analyzer::{CompletionItem, CompletionKind, Diagnostic, Position, Severity, Symbol, SymbolKind};

pub const DIAGNOSTIC_SOURCE: &str = "krl";

fn position(p: Position) -> lsp::Position {
    lsp::Position::new(p.line, p.character)
}

pub fn diagnostic(d: &Diagnostic) -> lsp::Diagnostic {
    let severity = match d.severity {
        Severity::Error => lsp::DiagnosticSeverity::ERROR,
        Severity::Warning => lsp::DiagnosticSeverity::WARNING,
    };
    lsp::Diagnostic::new(
        lsp::Range::new(position(d.range.start), position(d.range.end)),
        Some(severity),
        None,
        Some(DIAGNOSTIC_SOURCE.to_string()),
        d.message.clone(),
        None,
        None,
    )
}

/// At most `limit` diagnostics, in order.
pub fn diagnostics(items: &[Diagnostic], limit: usize) -> Vec<lsp::Diagnostic> {
    items.iter().take(limit).map(diagnostic).collect()
}

pub fn completion_item(item: &CompletionItem) -> lsp::CompletionItem {
    let (kind, detail) = match item.kind {
        CompletionKind::Function => (lsp::CompletionItemKind::FUNCTION, Some("function")),
        CompletionKind::Reference => (lsp::CompletionItemKind::REFERENCE, Some("Identifier")),
        CompletionKind::Text => (lsp::CompletionItemKind::TEXT, None),
    };
    lsp::CompletionItem {
        label: item.label.clone(),
        kind: Some(kind),
        detail: detail.map(str::to_string),
        insert_text: item.insert_text.clone(),
        insert_text_format: item.insert_text.as_ref().map(|_| lsp::InsertTextFormat::PLAIN_TEXT),
        ..Default::default()
    }
}

/// Suggestions offered regardless of document content.
pub fn structural_completions() -> Vec<lsp::CompletionItem> {
    vec![lsp::CompletionItem {
        label: "function(".to_string(),
        kind: Some(lsp::CompletionItemKind::METHOD),
        detail: Some("Anonymous Function".to_string()),
        preselect: Some(true),
        insert_text: Some("function(".to_string()),
        insert_text_format: Some(lsp::InsertTextFormat::PLAIN_TEXT),
        ..Default::default()
    }]
}

pub fn symbol_kind(kind: SymbolKind) -> lsp::SymbolKind {
    match kind {
        SymbolKind::Namespace => lsp::SymbolKind::NAMESPACE,
        SymbolKind::Field => lsp::SymbolKind::FIELD,
        SymbolKind::Event => lsp::SymbolKind::EVENT,
        SymbolKind::Method => lsp::SymbolKind::METHOD,
        SymbolKind::Function => lsp::SymbolKind::FUNCTION,
        SymbolKind::Object => lsp::SymbolKind::OBJECT,
        SymbolKind::String => lsp::SymbolKind::STRING,
        SymbolKind::Number => lsp::SymbolKind::NUMBER,
        SymbolKind::Array => lsp::SymbolKind::ARRAY,
        SymbolKind::Variable => lsp::SymbolKind::VARIABLE,
        SymbolKind::Null => lsp::SymbolKind::NULL,
    }
}

#[allow(deprecated)]
pub fn symbol_information(symbol: &Symbol, uri: &lsp::Url) -> lsp::SymbolInformation {
    let range = lsp::Range::new(
        lsp::Position::new(symbol.range.start_line, 0),
        lsp::Position::new(symbol.range.end_line, 0),
    );
    lsp::SymbolInformation {
        name: symbol.name.clone(),
        kind: symbol_kind(symbol.kind),
        tags: None,
        deprecated: None,
        location: lsp::Location::new(uri.clone(), range),
        container_name: symbol.parent_name.clone(),
    }
}
