use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

/// Char index for an LSP position (UTF-16 columns), clamped to the line's end.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line_idx);
    let mut units = 0usize;
    let mut chars = 0usize;
    for ch in text.line(line_idx).chars() {
        if ch == '\n' || ch == '\r' {
            break;
        }
        let next = units + ch.len_utf16();
        if next > pos.character as usize {
            break;
        }
        units = next;
        chars += 1;
    }
    line_start + chars
}

/// Apply one `didChange` entry; a change without a range replaces everything.
pub(crate) fn apply_change(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    let Some(range) = change.range else {
        *text = Rope::from_str(&change.text);
        return;
    };
    let a = position_to_char_idx(text, range.start);
    let b = position_to_char_idx(text, range.end);
    let (start, end) = (a.min(b), a.max(b));
    if start < end {
        text.remove(start..end);
    }
    if !change.text.is_empty() {
        text.insert(start, &change.text);
    }
}

/// Text of the cursor's line up to the cursor.
pub(crate) fn line_prefix(text: &Rope, pos: Position) -> String {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return String::new();
    }
    let start = text.line_to_char(line_idx);
    let cursor = position_to_char_idx(text, pos);
    text.slice(start..cursor).to_string()
}
