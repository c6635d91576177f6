use krl_core::ast::{Node, Span};
use krl_core::token::LineIndex;

use super::{LineRange, Symbol, SymbolKind};

/// Parent label used when the ruleset has no id.
pub const NO_RID_LABEL: &str = "No RID Found";

/// Flat outline of a parsed ruleset: id, meta block and its properties,
/// global block and its declarations/actions, then each rule.
pub fn symbols_from_ast(ast: &Node, lines: &LineIndex) -> Vec<Symbol> {
    let Node::Ruleset {
        rid,
        meta,
        global,
        rules,
        ..
    } = ast
    else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut rid_name = NO_RID_LABEL.to_string();

    if let Some(Node::RulesetId { value, span }) = rid.as_deref() {
        rid_name = value.clone();
        let last = lines.len_chars().saturating_sub(1);
        out.push(symbol(
            value,
            SymbolKind::Namespace,
            None,
            LineRange {
                start_line: lines.line_of(span.start),
                end_line: lines.line_of(last),
            },
        ));
    }

    if let Some(Node::RulesetMeta { properties, span }) = meta.as_deref() {
        out.push(symbol("meta", SymbolKind::Namespace, Some(&rid_name), lines_of(lines, *span)));
        for prop in properties {
            if let Node::RulesetMetaProperty { key, key_span, .. } = prop {
                out.push(symbol(key, SymbolKind::Field, Some("meta"), lines_of(lines, *key_span)));
            }
        }
    }

    if let (Some(first), Some(last)) = (global.first(), global.last()) {
        if let (Some(a), Some(b)) = (first.span(), last.span()) {
            let range = LineRange {
                start_line: lines.line_of(a.start),
                end_line: lines.line_of(b.end),
            };
            out.push(symbol("global", SymbolKind::Namespace, Some(&rid_name), range));
        }
    }
    for entry in global {
        match entry {
            Node::Declaration { left, right, span } => {
                if let Some(name) = left.name() {
                    out.push(symbol(name, declaration_kind(right), Some("global"), lines_of(lines, *span)));
                }
            }
            Node::DefAction { id, span, .. } => {
                if let Some(name) = id.name() {
                    out.push(symbol(name, SymbolKind::Method, Some("global"), lines_of(lines, *span)));
                }
            }
            _ => {}
        }
    }

    for rule in rules {
        if let Node::Rule { name, span, .. } = rule {
            if let Some(name) = name.name() {
                out.push(symbol(name, SymbolKind::Event, Some(&rid_name), lines_of(lines, *span)));
            }
        }
    }

    out
}

/// Kind implied by a declaration's right-hand side.
fn declaration_kind(right: &Node) -> SymbolKind {
    match right.type_name() {
        "Function" => SymbolKind::Function,
        "Map" => SymbolKind::Object,
        "String" => SymbolKind::String,
        "Number" => SymbolKind::Number,
        "Array" => SymbolKind::Array,
        "Identifier" => SymbolKind::Variable,
        _ => SymbolKind::Null,
    }
}

fn lines_of(lines: &LineIndex, span: Span) -> LineRange {
    LineRange {
        start_line: lines.line_of(span.start),
        end_line: lines.line_of(span.end),
    }
}

fn symbol(name: &str, kind: SymbolKind, parent: Option<&str>, range: LineRange) -> Symbol {
    Symbol {
        name: name.to_string(),
        kind,
        range,
        parent_name: parent.map(str::to_string),
    }
}
