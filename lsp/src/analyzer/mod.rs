use std::sync::Arc;

use krl_core::ast::Node;
use krl_core::token::{tokenize, LineIndex};
use krl_core::toolchain::{ParseError, RulesetCompiler, RulesetParser, Unconfigured};
use serde::Serialize;
use tracing::{debug, info};

mod completions;
mod diagnostics;
mod symbols;

pub use completions::{completions_from_ast, completions_from_tokens, is_operator_context, operator_completions};
pub use diagnostics::diagnostics_from_compiler;
pub use symbols::{symbols_from_ast, NO_RID_LABEL};

/// Outline entry kinds, following how editors group KRL constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
    Namespace,
    Field,
    Event,
    Method,
    Function,
    Object,
    String,
    Number,
    Array,
    Variable,
    Null,
}

/// Zero-based, line-granular range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRange {
    pub start_line: u32,
    pub end_line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: LineRange,
    /// Informational only; symbols form a flat list.
    pub parent_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompletionKind {
    Function,
    Reference,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: String,
    pub kind: CompletionKind,
    pub insert_text: Option<String>,
}

impl CompletionItem {
    pub fn new(label: impl Into<String>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            insert_text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Zero-based line and character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub range: Range,
    pub message: String,
    pub severity: Severity,
}

/// Everything the editor-facing layer needs about one version of a document.
///
/// A fresh value is produced for every analysis run; consumers share it
/// behind an `Arc` and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    pub ast: Option<Arc<Node>>,
    pub document_symbols: Vec<Symbol>,
    pub completion_items: Vec<CompletionItem>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisResult {
    /// True exactly when the document parsed and `ast` is present.
    pub fn syntax_is_valid(&self) -> bool {
        self.ast.is_some()
    }
}

/// Outcome of the structured parse step.
#[derive(Debug)]
pub enum ParseOutcome {
    Parsed(Node),
    Failed(ParseError),
}

impl From<Result<Node, ParseError>> for ParseOutcome {
    fn from(result: Result<Node, ParseError>) -> Self {
        match result {
            Ok(ast) => ParseOutcome::Parsed(ast),
            Err(err) => ParseOutcome::Failed(err),
        }
    }
}

/// Parse-or-fallback analysis of KRL documents.
///
/// Holds only the two collaborators; every call to [`KrlAnalyzer::analyze`]
/// builds its own working state, so one analyzer can serve many documents.
#[derive(Clone)]
pub struct KrlAnalyzer {
    parser: Arc<dyn RulesetParser>,
    compiler: Arc<dyn RulesetCompiler>,
}

impl Default for KrlAnalyzer {
    fn default() -> Self {
        Self::unconfigured()
    }
}

impl KrlAnalyzer {
    pub fn new(parser: Arc<dyn RulesetParser>, compiler: Arc<dyn RulesetCompiler>) -> Self {
        Self { parser, compiler }
    }

    /// Analyzer with no external tools: always in fallback mode, no diagnostics.
    pub fn unconfigured() -> Self {
        Self::new(Arc::new(Unconfigured), Arc::new(Unconfigured))
    }

    pub fn parse(&self, text: &str) -> ParseOutcome {
        self.parser.parse(text).into()
    }

    pub fn analyze(&self, text: &str, uri: &str) -> AnalysisResult {
        let diagnostics = diagnostics_from_compiler(self.compiler.compile(text));

        match self.parse(text) {
            ParseOutcome::Parsed(ast) => {
                let lines = LineIndex::new(text);
                let document_symbols = symbols_from_ast(&ast, &lines);
                let completion_items = completions_from_ast(&ast);
                debug!(
                    uri,
                    symbols = document_symbols.len(),
                    completions = completion_items.len(),
                    "analyzed parsed document"
                );
                AnalysisResult {
                    ast: Some(Arc::new(ast)),
                    document_symbols,
                    completion_items,
                    diagnostics,
                }
            }
            ParseOutcome::Failed(reason) => {
                info!(uri, %reason, "parse failed, falling back to tokens");
                let tokens = tokenize(text, false, false);
                AnalysisResult {
                    ast: None,
                    document_symbols: Vec::new(),
                    completion_items: completions_from_tokens(&tokens),
                    diagnostics,
                }
            }
        }
    }
}
