//! Seams to the external KRL parser and compiler.
//!
//! Grammar and semantic checking live outside this crate. The analysis
//! pipeline only sees these traits; [`command`] provides implementations
//! that run the real tools as child processes.

use std::fmt;

use serde::Deserialize;

use crate::ast::Node;

pub mod command;

pub use command::{CommandCompiler, CommandParser, ToolCommand};

/// A location as the KRL tools report it: 1-based line, tool-defined column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SourcePoint {
    pub line: u32,
    pub column: u32,
}

impl SourcePoint {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourcePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Structured failure from the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: Option<SourcePoint>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn with_position(message: impl Into<String>, position: SourcePoint) -> Self {
        Self {
            message: message.into(),
            position: Some(position),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(position) = &self.position {
            write!(f, "{} at {}", self.message, position)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileWarning {
    pub message: String,
    pub start: SourcePoint,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompileOutput {
    pub warnings: Vec<CompileWarning>,
}

/// Where a compiler failure points, in the shapes the compiler produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAnchor {
    /// Top-level `where: { line, col }` (1-based column).
    Where(SourcePoint),
    /// `krl_compiler.loc.start: { line, column }`.
    Nested(SourcePoint),
    Unanchored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub anchor: ErrorAnchor,
}

impl CompileError {
    pub fn unanchored(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            anchor: ErrorAnchor::Unanchored,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            ErrorAnchor::Where(p) | ErrorAnchor::Nested(p) => write!(f, "{} at {}", self.message, p),
            ErrorAnchor::Unanchored => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for CompileError {}

/// Produces a syntax tree from ruleset source.
pub trait RulesetParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<Node, ParseError>;
}

/// Compiles ruleset source, reporting warnings or a failure.
pub trait RulesetCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<CompileOutput, CompileError>;
}

/// Stand-in used when no external tool is configured: parsing always fails
/// and compiling reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl RulesetParser for Unconfigured {
    fn parse(&self, _source: &str) -> Result<Node, ParseError> {
        Err(ParseError::new("no KRL parser configured"))
    }
}

impl RulesetCompiler for Unconfigured {
    fn compile(&self, _source: &str) -> Result<CompileOutput, CompileError> {
        Ok(CompileOutput::default())
    }
}
