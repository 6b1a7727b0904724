//! `var()` substitution for value previews.
//! Spec: <https://www.w3.org/TR/css-variables-1/#substitute-a-var>

use crate::CustomProperties;

/// Resolve `var()` functions within a value against the provided custom properties.
///
/// - Supports `var(--name)` and `var(--name, fallback)`; the fallback may itself contain
///   commas and parentheses.
/// - Performs recursive expansion to resolve nested `var()` inside referenced values or
///   fallbacks.
/// - Cycle detection: a variable referencing itself directly or indirectly is treated as
///   invalid; the fallback is used if provided, otherwise the reference becomes the empty
///   string.
/// - An unterminated `var(` is preserved as-is.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#using-variables>
#[inline]
pub fn resolve_vars_in_value(value_text: &str, properties: &CustomProperties) -> String {
    resolve_vars_internal(value_text, properties, &mut Vec::new())
}

/// Internal recursive resolver that carries the resolution stack for cycle detection.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#cycles>
fn resolve_vars_internal(
    value_text: &str,
    properties: &CustomProperties,
    stack: &mut Vec<String>,
) -> String {
    let Some(start) = find_var_function(value_text) else {
        return value_text.to_owned();
    };
    let (head, after_head) = value_text.split_at(start);
    let after_open = &after_head["var(".len()..];
    let Some(close) = matching_close_paren(after_open) else {
        return value_text.to_owned();
    };
    let (args_text, tail_with_paren) = after_open.split_at(close);
    let tail = &tail_with_paren[1..];
    let replacement = resolve_single_var(args_text, properties, stack);
    let resolved_tail = resolve_vars_internal(tail, properties, stack);
    [head, &replacement, &resolved_tail].concat()
}

/// Byte offset of the first `var(` (ASCII case-insensitive) not preceded by an identifier
/// character, so `somevar(` is left alone.
fn find_var_function(text: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let mut search_from = 0;
    while let Some(found) = lower[search_from..].find("var(") {
        let offset = search_from + found;
        let preceded_by_ident = lower[..offset]
            .chars()
            .next_back()
            .is_some_and(|character| character.is_ascii_alphanumeric() || character == '-' || character == '_');
        if !preceded_by_ident {
            return Some(offset);
        }
        search_from = offset + "var(".len();
    }
    None
}

/// Offset of the `)` closing a function whose arguments start at `text[0]`.
fn matching_close_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, character) in text.char_indices() {
        match character {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(offset),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}

/// Resolve a single `var()` argument string like `--name` or `--name, fallback`.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#using-variables>
fn resolve_single_var(
    args_text: &str,
    properties: &CustomProperties,
    stack: &mut Vec<String>,
) -> String {
    let (name_text, fallback_text) = match args_text.split_once(',') {
        Some((first, second)) => (first.trim(), Some(second.trim())),
        None => (args_text.trim(), None),
    };
    let fallback = |stack: &mut Vec<String>| {
        fallback_text.map_or_else(String::new, |fallback_src| {
            resolve_vars_internal(fallback_src, properties, stack)
        })
    };
    if !name_text.starts_with("--") {
        return fallback(stack);
    }
    let Some(resolved_value) = properties.get(name_text) else {
        return fallback(stack);
    };
    if stack.iter().any(|seen| seen == name_text) {
        return fallback(stack);
    }
    stack.push(name_text.to_owned());
    let expanded = resolve_vars_internal(resolved_value, properties, stack);
    stack.pop();
    expanded
}
