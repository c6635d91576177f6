use krl_core::ast::Node;
use krl_core::builtins::{is_builtin_operator, BUILTIN_OPERATORS};
use krl_core::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;

use super::{CompletionItem, CompletionKind};

const FUNCTION_KEYWORD: &str = "function";

// `<expr>.` optionally followed by a partially typed operator name.
static OPERATOR_CONTEXT: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"[A-Za-z0-9_$)\]}">]\s*\.\s*[A-Za-z_$]*$"#).ok());

/// Completions from a parsed tree.
///
/// Function-valued declarations directly in the `global` block yield a
/// `Function` item for their name; every identifier yields a `Reference`
/// item unless it names a built-in operator. Each label appears at most once.
pub fn completions_from_ast(ast: &Node) -> Vec<CompletionItem> {
    let top_level: &[Node] = match ast {
        Node::Ruleset { global, .. } => global,
        _ => &[],
    };
    let is_top_level = |node: &Node| top_level.iter().any(|entry| std::ptr::eq(entry, node));

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut items = Vec::new();

    ast.walk(&mut |node| match node {
        Node::Declaration { left, right, .. } if matches!(**right, Node::Function { .. }) && is_top_level(node) => {
            if let Some(name) = left.name() {
                if seen.insert(name) {
                    items.push(CompletionItem::new(name, CompletionKind::Function));
                }
            }
        }
        Node::Identifier { value, .. } => {
            if !is_builtin_operator(value) && seen.insert(value.as_str()) {
                items.push(CompletionItem::new(value.as_str(), CompletionKind::Reference));
            }
        }
        _ => {}
    });

    items
}

/// Completions from a token stream, for documents that do not parse.
///
/// A symbol directly followed by the `function` keyword is taken as a function
/// name. Remaining symbols become `Text` items in first-seen order.
pub fn completions_from_tokens(tokens: &[Token]) -> Vec<CompletionItem> {
    let mut functions: Vec<CompletionItem> = Vec::new();
    let mut function_names: FxHashSet<&str> = FxHashSet::default();
    let mut plain: Vec<&str> = Vec::new();
    let mut plain_names: FxHashSet<&str> = FxHashSet::default();

    let mut i = 0;
    while let Some(token) = tokens.get(i) {
        i += 1;
        if !token.is(TokenKind::Symbol) {
            continue;
        }
        let name = token.text.as_str();
        let defines_function = tokens
            .get(i)
            .is_some_and(|next| next.is(TokenKind::Symbol) && next.text == FUNCTION_KEYWORD);
        if defines_function {
            i += 1;
            if function_names.insert(name) {
                functions.push(CompletionItem::new(name, CompletionKind::Function));
            }
        } else if plain_names.insert(name) {
            plain.push(name);
        }
    }

    functions.extend(
        plain
            .into_iter()
            .filter(|name| !function_names.contains(name))
            .map(|name| CompletionItem::new(name, CompletionKind::Text)),
    );
    functions
}

/// Built-in operators as call completions, e.g. `map(`.
pub fn operator_completions() -> Vec<CompletionItem> {
    BUILTIN_OPERATORS
        .iter()
        .map(|name| CompletionItem {
            label: (*name).to_string(),
            kind: CompletionKind::Function,
            insert_text: Some(format!("{name}(")),
        })
        .collect()
}

/// True when the text before the cursor is an operator application in progress.
pub fn is_operator_context(line_prefix: &str) -> bool {
    OPERATOR_CONTEXT
        .as_ref()
        .is_some_and(|re| re.is_match(line_prefix))
}
