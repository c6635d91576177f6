use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    CompileError, CompileOutput, CompileWarning, ErrorAnchor, ParseError, RulesetCompiler, RulesetParser, SourcePoint,
};
use crate::ast::Node;

/// An external program invocation. The document is written to its stdin and
/// a JSON reply is read from its stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from an argv list; `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Read a whitespace-separated command line from an environment variable.
    pub fn from_env(var: &str) -> Option<Self> {
        let raw = std::env::var(var).ok()?;
        let argv: Vec<String> = raw.split_whitespace().map(str::to_string).collect();
        Self::from_argv(&argv)
    }

    pub fn run(&self, input: &str) -> Result<ToolOutput> {
        debug!(program = %self.program, "running KRL tool");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start '{}'", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin of '{}' was not captured", self.program))?;
        let input = input.as_bytes().to_vec();
        // Feed stdin from another thread so a chatty child cannot deadlock us.
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for '{}'", self.program))?;
        match writer.join() {
            Ok(Ok(())) => {}
            // The tool may legitimately exit before reading everything.
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => return Err(err).with_context(|| format!("failed to write to '{}'", self.program)),
            Err(_) => return Err(anyhow!("stdin writer for '{}' panicked", self.program)),
        }

        Ok(ToolOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// First of stdout/stderr that decodes as `T`.
fn decode_reply<T: for<'de> Deserialize<'de>>(out: &ToolOutput) -> Option<T> {
    [&out.stdout, &out.stderr]
        .into_iter()
        .find_map(|text| serde_json::from_str::<T>(text.trim()).ok())
}

fn raw_message(out: &ToolOutput) -> String {
    let text = if out.stderr.trim().is_empty() {
        out.stdout.trim()
    } else {
        out.stderr.trim()
    };
    if text.is_empty() {
        "KRL tool exited with an error".to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ParseFailureReply {
    message: String,
    line: Option<u32>,
    column: Option<u32>,
}

/// Parser collaborator backed by an external command that prints the JSON AST.
#[derive(Debug, Clone)]
pub struct CommandParser {
    command: ToolCommand,
}

impl CommandParser {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

impl RulesetParser for CommandParser {
    fn parse(&self, source: &str) -> Result<Node, ParseError> {
        let out = self
            .command
            .run(source)
            .map_err(|e| ParseError::new(format!("failed to run KRL parser: {e:#}")))?;

        if !out.success {
            return Err(match decode_reply::<ParseFailureReply>(&out) {
                Some(ParseFailureReply {
                    message,
                    line: Some(line),
                    column,
                }) => ParseError::with_position(message, SourcePoint::new(line, column.unwrap_or(0))),
                Some(reply) => ParseError::new(reply.message),
                None => ParseError::new(raw_message(&out)),
            });
        }

        let tree: Value = serde_json::from_str(out.stdout.trim())
            .map_err(|e| ParseError::new(format!("KRL parser produced invalid JSON: {e}")))?;
        Node::from_json(&tree).map_err(|e| ParseError::new(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct Loc {
    start: SourcePoint,
}

#[derive(Debug, Deserialize)]
struct WarningReply {
    message: String,
    loc: Loc,
}

#[derive(Debug, Deserialize)]
struct CompileReply {
    #[serde(default)]
    warnings: Vec<WarningReply>,
}

#[derive(Debug, Deserialize)]
struct WhereReply {
    line: u32,
    #[serde(default)]
    col: u32,
}

#[derive(Debug, Deserialize)]
struct NestedReply {
    loc: Option<Loc>,
}

#[derive(Debug, Deserialize)]
struct CompileFailureReply {
    message: String,
    #[serde(rename = "where")]
    at: Option<WhereReply>,
    krl_compiler: Option<NestedReply>,
}

impl From<CompileFailureReply> for CompileError {
    fn from(reply: CompileFailureReply) -> Self {
        let anchor = match (reply.at, reply.krl_compiler.and_then(|n| n.loc)) {
            // a zero line means "no position"
            (Some(at), _) if at.line > 0 => ErrorAnchor::Where(SourcePoint::new(at.line, at.col)),
            (_, Some(loc)) => ErrorAnchor::Nested(loc.start),
            _ => ErrorAnchor::Unanchored,
        };
        CompileError {
            message: reply.message,
            anchor,
        }
    }
}

/// Compiler collaborator backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    command: ToolCommand,
}

impl CommandCompiler {
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }
}

impl RulesetCompiler for CommandCompiler {
    fn compile(&self, source: &str) -> Result<CompileOutput, CompileError> {
        let out = self
            .command
            .run(source)
            .map_err(|e| CompileError::unanchored(format!("failed to run KRL compiler: {e:#}")))?;

        if !out.success {
            return Err(match decode_reply::<CompileFailureReply>(&out) {
                Some(reply) => reply.into(),
                None => CompileError::unanchored(raw_message(&out)),
            });
        }

        let reply: CompileReply = serde_json::from_str(out.stdout.trim())
            .map_err(|e| CompileError::unanchored(format!("KRL compiler produced invalid JSON: {e}")))?;
        Ok(CompileOutput {
            warnings: reply
                .warnings
                .into_iter()
                .map(|w| CompileWarning {
                    message: w.message,
                    start: w.loc.start,
                })
                .collect(),
        })
    }
}
