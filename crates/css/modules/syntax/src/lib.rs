//! CSS Syntax Module Level 3: Parsing and tokenization.
//! Spec: <https://www.w3.org/TR/css-syntax-3/>
//!
//! Declaration-level helpers used by the rule view: parsing the text a user types into a
//! declaration list, splitting `!important` off a value, and token-level inspection of
//! values (see [`values`]).

#![forbid(unsafe_code)]

mod values;

use cssparser::AtRuleParser as CssAtRuleParser;
use cssparser::BasicParseErrorKind;
use cssparser::CowRcStr;
use cssparser::DeclarationParser as CssDeclarationParser;
use cssparser::ParseError;
use cssparser::Parser;
use cssparser::ParserInput;
use cssparser::ParserState;
use cssparser::QualifiedRuleParser as CssQualifiedRuleParser;
use cssparser::RuleBodyItemParser as CssRuleBodyItemParser;
use cssparser::RuleBodyParser as CssRuleBodyParser;

pub use values::{
    is_well_formed_value, referenced_variables, split_at_top_level, split_components,
};

/// A single CSS declaration (property: value [!important]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name. Lowercased unless it is a custom property, whose names are case-sensitive.
    pub name: String,
    /// Raw value text (without trailing !important).
    pub value: String,
    /// Whether the declaration was marked as `!important`.
    pub important: bool,
}

/// A value typed on its own, possibly followed by more declarations.
///
/// `"red; width: 100px"` parses to a first value of `red` and one extra declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueAndExtras {
    /// The value (without `!important`).
    pub value: String,
    /// Whether the value carried `!important`.
    pub important: bool,
    /// Declarations that followed the first value.
    pub extras: Vec<Declaration>,
}

/// Whether `name` is a custom property (`--*`).
/// Spec: <https://www.w3.org/TR/css-variables-1/#custom-property>
#[inline]
pub fn is_custom_property(name: &str) -> bool {
    name.starts_with("--")
}

/// Normalize a property name: ASCII-lowercase, except custom properties.
pub fn normalize_property_name(name: &str) -> String {
    let trimmed = name.trim();
    if is_custom_property(trimmed) {
        trimmed.to_owned()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Parse `!important` at the end of a value, returning (`value_without_important`, `important_flag`).
pub fn split_important_tail(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(bang) = trimmed.rfind('!')
        && let (Some(prefix), Some(suffix)) = (trimmed.get(..bang), trimmed.get(bang + 1..))
        && suffix.trim().eq_ignore_ascii_case("important")
    {
        return (prefix.trim_end().to_owned(), true);
    }
    (trimmed.to_owned(), false)
}

/// A declaration parser that records property name and its raw value.
struct BodyDeclParser;

impl CssDeclarationParser<'_> for BodyDeclParser {
    type Declaration = Declaration;
    type Error = ();

    fn parse_value<'input>(
        &mut self,
        name: CowRcStr<'input>,
        input: &mut Parser<'input, '_>,
        _decl_start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'input, Self::Error>> {
        let start = input.position();
        // Consume until end of the declaration item.
        while input.next_including_whitespace_and_comments().is_ok() {}
        let raw = input.slice_from(start);
        let (value, important) = split_important_tail(raw);
        Ok(Declaration {
            name: normalize_property_name(&name),
            value,
            important,
        })
    }
}

impl CssAtRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type AtRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        _name: CowRcStr<'input>,
        _input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Ok(())
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::AtRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::AtRuleBodyInvalid))
    }

    #[inline]
    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
    ) -> Result<Self::AtRule, Self::Error> {
        Err(())
    }
}

impl CssQualifiedRuleParser<'_> for BodyDeclParser {
    type Prelude = ();
    type QualifiedRule = Declaration; // Not produced
    type Error = ();

    #[inline]
    fn parse_prelude<'input>(
        &mut self,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::Prelude, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }

    #[inline]
    fn parse_block<'input>(
        &mut self,
        _prelude: Self::Prelude,
        _state: &ParserState,
        input: &mut Parser<'input, '_>,
    ) -> Result<Self::QualifiedRule, ParseError<'input, Self::Error>> {
        Err(input.new_error(BasicParseErrorKind::QualifiedRuleInvalid))
    }
}

impl CssRuleBodyItemParser<'_, Declaration, ()> for BodyDeclParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Parse a declaration list such as `color: red; margin: 0 !important`.
///
/// Items that do not parse as declarations are dropped, following CSS error recovery.
/// Declarations with an empty value are dropped as well.
pub fn parse_declaration_list(text: &str) -> Vec<Declaration> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut body = BodyDeclParser;
    CssRuleBodyParser::new(&mut parser, &mut body)
        .flatten()
        .filter(|decl| !decl.value.is_empty())
        .collect()
}

/// Parse text typed into a value field.
///
/// The text may itself contain further declarations, for example when pasting
/// `red; width: 100px`. Only a top-level `;` ends the value, so `url("a;b.png")` stays whole.
pub fn parse_value_and_extras(text: &str) -> ValueAndExtras {
    let Some((first_item, rest)) = split_at_top_level(text, ';') else {
        let (value, important) = split_important_tail(text);
        return ValueAndExtras {
            value,
            important,
            extras: Vec::new(),
        };
    };
    let (value, important) = split_important_tail(first_item);
    ValueAndExtras {
        value,
        important,
        extras: parse_declaration_list(rest),
    }
}

/// The property name typed into a name field: everything before the first top-level `:`
/// or `;`, normalized.
pub fn parse_property_name(text: &str) -> String {
    let item = split_at_top_level(text, ';').map_or(text, |(first, _)| first);
    let name = split_at_top_level(item, ':').map_or(item, |(first, _)| first);
    normalize_property_name(name)
}
