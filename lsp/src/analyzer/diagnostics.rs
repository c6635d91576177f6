use krl_core::toolchain::{CompileError, CompileOutput, ErrorAnchor, SourcePoint};
use tracing::debug;

use super::{Diagnostic, Position, Range, Severity};

/// Normalize the compiler's answer into diagnostics.
///
/// Anchored entries span from the reported point to the start of the next
/// line. Lines arrive 1-based and leave 0-based.
pub fn diagnostics_from_compiler(result: Result<CompileOutput, CompileError>) -> Vec<Diagnostic> {
    match result {
        Ok(output) => output
            .warnings
            .into_iter()
            .map(|w| anchored(w.start, w.start.column, w.message, Severity::Warning))
            .collect(),
        Err(err) => {
            debug!(%err, "compiler reported a failure");
            let diagnostic = match err.anchor {
                ErrorAnchor::Where(at) => anchored(at, at.column.saturating_sub(1), err.message, Severity::Error),
                ErrorAnchor::Nested(at) => anchored(at, at.column, err.message, Severity::Error),
                ErrorAnchor::Unanchored => Diagnostic {
                    range: Range::default(),
                    message: err.message,
                    severity: Severity::Error,
                },
            };
            vec![diagnostic]
        }
    }
}

fn anchored(at: SourcePoint, character: u32, message: String, severity: Severity) -> Diagnostic {
    Diagnostic {
        range: Range {
            start: Position::new(at.line.saturating_sub(1), character),
            end: Position::new(at.line, 0),
        },
        message,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use krl_core::toolchain::CompileWarning;

    #[test]
    fn test_warnings_keep_column() {
        let out = CompileOutput {
            warnings: vec![CompileWarning {
                message: "Duplicate declaration: a".to_string(),
                start: SourcePoint::new(16, 4),
            }],
        };
        let diags = diagnostics_from_compiler(Ok(out));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].severity, Severity::Warning);
        assert_eq!(diags[0].range.start, Position::new(15, 4));
        assert_eq!(diags[0].range.end, Position::new(16, 0));
    }

    #[test]
    fn test_where_anchor_column_is_one_based() {
        let err = CompileError {
            message: "bad".to_string(),
            anchor: ErrorAnchor::Where(SourcePoint::new(19, 5)),
        };
        let diags = diagnostics_from_compiler(Err(err));
        assert_eq!(diags[0].range.start, Position::new(18, 4));
        assert_eq!(diags[0].range.end, Position::new(19, 0));
        assert_eq!(diags[0].severity, Severity::Error);
    }

    #[test]
    fn test_nested_anchor() {
        let err = CompileError {
            message: "not an expression".to_string(),
            anchor: ErrorAnchor::Nested(SourcePoint::new(7, 10)),
        };
        let diags = diagnostics_from_compiler(Err(err));
        assert_eq!(diags[0].range.start, Position::new(6, 10));
    }

    #[test]
    fn test_unanchored_failure_sits_at_origin() {
        let diags = diagnostics_from_compiler(Err(CompileError::unanchored("spawn failed")));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].range, Range::default());
        assert_eq!(diags[0].message, "spawn failed");
    }

    #[test]
    fn test_clean_compile_has_no_diagnostics() {
        assert!(diagnostics_from_compiler(Ok(CompileOutput::default())).is_empty());
    }
}
