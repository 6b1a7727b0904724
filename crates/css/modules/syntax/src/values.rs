//! Token-level inspection of declaration values.

use std::collections::BTreeSet;

use cssparser::{ParseError, Parser, ParserInput, Token};

/// Collect every custom property name referenced through `var()` in `value`,
/// including references nested in fallbacks and other functions.
///
/// Spec: <https://www.w3.org/TR/css-variables-1/#using-variables>
pub fn referenced_variables(value: &str) -> BTreeSet<String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut out = BTreeSet::new();
    collect_variables(&mut parser, &mut out);
    out
}

fn collect_variables(input: &mut Parser<'_, '_>, out: &mut BTreeSet<String>) {
    loop {
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return,
        };
        let is_var = match &token {
            Token::Function(name) => name.eq_ignore_ascii_case("var"),
            Token::ParenthesisBlock | Token::SquareBracketBlock | Token::CurlyBracketBlock => {
                false
            }
            _ => continue,
        };
        let nested = input.parse_nested_block(|block| {
            if is_var
                && let Ok(Token::Ident(name)) = block.next()
                && name.starts_with("--")
            {
                out.insert(String::from(&**name));
            }
            collect_variables(block, out);
            Ok::<(), ParseError<'_, ()>>(())
        });
        if nested.is_err() {
            return;
        }
    }
}

/// Whether `value` is a non-empty, well-formed component value list: no bad strings or
/// urls and no stray closing brackets at any nesting level.
///
/// Spec: <https://www.w3.org/TR/css-syntax-3/#parse-list-of-component-values>
pub fn is_well_formed_value(value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    well_formed(&mut parser)
}

fn well_formed(input: &mut Parser<'_, '_>) -> bool {
    loop {
        let token = match input.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => return true,
        };
        match token {
            Token::BadString(_)
            | Token::BadUrl(_)
            | Token::CloseParenthesis
            | Token::CloseSquareBracket
            | Token::CloseCurlyBracket => return false,
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                let nested = input.parse_nested_block(|block| {
                    if well_formed(block) {
                        Ok(())
                    } else {
                        Err(block.new_custom_error::<(), ()>(()))
                    }
                });
                if nested.is_err() {
                    return false;
                }
            }
            _ => {}
        }
    }
}

/// Split `text` at its first top-level `delimiter` (`;` or `:`). Delimiters inside strings,
/// urls, functions and blocks do not count. The delimiter itself is dropped.
pub fn split_at_top_level(text: &str, delimiter: char) -> Option<(&str, &str)> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    loop {
        let before = parser.position();
        let found = match parser.next_including_whitespace_and_comments().ok()? {
            Token::Semicolon => delimiter == ';',
            Token::Colon => delimiter == ':',
            Token::Delim(character) => *character == delimiter,
            _ => false,
        };
        if found {
            let offset = before.byte_index();
            return Some((text.get(..offset)?, text.get(offset + delimiter.len_utf8()..)?));
        }
    }
}

/// Split a value into its top-level whitespace-separated components, keeping functions
/// and blocks intact: `"calc(1px + 2px) auto"` yields `["calc(1px + 2px)", "auto"]`.
/// Comments separate components and are dropped.
pub fn split_components(value: &str) -> Vec<String> {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();
    let mut component_start = None;
    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::WhiteSpace(_) | Token::Comment(_) => {
                if let Some(start) = component_start.take() {
                    out.push(parser.slice(start..before).to_owned());
                }
                continue;
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                let consumed = parser.parse_nested_block(|block| {
                    while block.next_including_whitespace_and_comments().is_ok() {}
                    Ok::<(), ParseError<'_, ()>>(())
                });
                if consumed.is_err() {
                    break;
                }
            }
            _ => {}
        }
        component_start.get_or_insert(before);
    }
    if let Some(start) = component_start {
        let tail = parser.slice_from(start).trim();
        if !tail.is_empty() {
            out.push(tail.to_owned());
        }
    }
    out
}
