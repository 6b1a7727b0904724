//! Shorthand to longhand expansion.
//! Spec: <https://www.w3.org/TR/css-cascade-5/#shorthand>

use css_syntax::{is_custom_property, split_components};

/// Expands a declaration into the longhand `(name, value)` pairs it sets.
///
/// Overrides are computed per longhand, so `margin-top` can override part of an earlier
/// `margin`. Properties that are not shorthands expand to themselves.
pub trait LonghandExpander {
    fn expand(&self, name: &str, value: &str) -> Vec<(String, String)>;
}

/// Built-in expander for the common multi-value shorthands.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShorthandExpander;

/// Longhand suffixes in top, right, bottom, left order.
const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Longhands of `border-radius` in the same 1-to-4 order as `SIDES`.
const CORNERS: [&str; 4] = [
    "border-top-left-radius",
    "border-top-right-radius",
    "border-bottom-right-radius",
    "border-bottom-left-radius",
];

/// Spec: <https://www.w3.org/TR/css-cascade-5/#defaulting-keywords>
const CSS_WIDE_KEYWORDS: [&str; 5] = ["inherit", "initial", "unset", "revert", "revert-layer"];

const BORDER_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

impl LonghandExpander for ShorthandExpander {
    fn expand(&self, name: &str, value: &str) -> Vec<(String, String)> {
        if is_custom_property(name) {
            return vec![(name.to_owned(), value.to_owned())];
        }
        let Some(longhands) = longhands_of(name) else {
            return vec![(name.to_owned(), value.to_owned())];
        };
        // Values the shorthand cannot be split on apply to every longhand as-is.
        let trimmed = value.trim();
        if is_css_wide_keyword(trimmed) || trimmed.to_ascii_lowercase().contains("var(") {
            return longhands
                .into_iter()
                .map(|longhand| (longhand, trimmed.to_owned()))
                .collect();
        }
        let components = split_components(trimmed);
        let values = match name {
            "gap" | "overflow" | "place-items" | "place-content" | "place-self" => {
                pair_values(&components)
            }
            "border" | "border-top" | "border-right" | "border-bottom" | "border-left" => {
                border_values(&components, longhands.len())
            }
            "border-radius" if trimmed.contains('/') => None,
            _ => box_values(&components),
        };
        match values {
            Some(values) => longhands.into_iter().zip(values).collect(),
            None => longhands
                .into_iter()
                .map(|longhand| (longhand, trimmed.to_owned()))
                .collect(),
        }
    }
}

/// Longhand names of a supported shorthand.
fn longhands_of(name: &str) -> Option<Vec<String>> {
    let sides = |prefix: &str, suffix: &str| -> Vec<String> {
        SIDES
            .iter()
            .map(|side| format!("{prefix}{side}{suffix}"))
            .collect()
    };
    let longhands = match name {
        "margin" => sides("margin-", ""),
        "padding" => sides("padding-", ""),
        "inset" => sides("", ""),
        "scroll-margin" => sides("scroll-margin-", ""),
        "scroll-padding" => sides("scroll-padding-", ""),
        "border-width" => sides("border-", "-width"),
        "border-style" => sides("border-", "-style"),
        "border-color" => sides("border-", "-color"),
        "border-radius" => CORNERS.iter().map(|&corner| corner.to_owned()).collect(),
        "gap" => vec!["row-gap".to_owned(), "column-gap".to_owned()],
        "overflow" => vec!["overflow-x".to_owned(), "overflow-y".to_owned()],
        "place-items" => vec!["align-items".to_owned(), "justify-items".to_owned()],
        "place-content" => vec!["align-content".to_owned(), "justify-content".to_owned()],
        "place-self" => vec!["align-self".to_owned(), "justify-self".to_owned()],
        "border" => {
            let mut all = sides("border-", "-width");
            all.extend(sides("border-", "-style"));
            all.extend(sides("border-", "-color"));
            all
        }
        "border-top" | "border-right" | "border-bottom" | "border-left" => ["width", "style", "color"]
            .iter()
            .map(|part| format!("{name}-{part}"))
            .collect(),
        _ => return None,
    };
    Some(longhands)
}

fn is_css_wide_keyword(value: &str) -> bool {
    CSS_WIDE_KEYWORDS
        .iter()
        .any(|keyword| value.eq_ignore_ascii_case(keyword))
}

/// The 1-to-4 value box mapping: top, right, bottom, left.
/// Spec: <https://www.w3.org/TR/css-box-4/#margin-shorthand>
fn box_values(components: &[String]) -> Option<Vec<String>> {
    let [top, right, bottom, left] = match components {
        [one] => [one, one, one, one],
        [top, right] => [top, right, top, right],
        [top, right, bottom] => [top, right, bottom, right],
        [top, right, bottom, left] => [top, right, bottom, left],
        _ => return None,
    };
    Some(vec![top.clone(), right.clone(), bottom.clone(), left.clone()])
}

/// One or two values; a single value applies to both longhands.
fn pair_values(components: &[String]) -> Option<Vec<String>> {
    match components {
        [one] => Some(vec![one.clone(), one.clone()]),
        [first, second] => Some(vec![first.clone(), second.clone()]),
        _ => None,
    }
}

/// Classify `border` components into width, style and color, defaulting the missing ones.
///
/// `longhand_count` is 3 for a single side and 12 for all four sides; the result is laid
/// out in the same order as `longhands_of` (all widths, all styles, all colors).
/// Spec: <https://www.w3.org/TR/css-backgrounds-3/#border-shorthands>
fn border_values(components: &[String], longhand_count: usize) -> Option<Vec<String>> {
    let mut width: Option<&String> = None;
    let mut style: Option<&String> = None;
    let mut color: Option<&String> = None;
    for component in components {
        let slot = if is_border_style(component) {
            &mut style
        } else if is_line_width(component) {
            &mut width
        } else {
            &mut color
        };
        if slot.is_some() {
            return None;
        }
        *slot = Some(component);
    }
    if components.is_empty() {
        return None;
    }
    let width = width.map_or_else(|| "medium".to_owned(), Clone::clone);
    let style = style.map_or_else(|| "none".to_owned(), Clone::clone);
    let color = color.map_or_else(|| "currentcolor".to_owned(), Clone::clone);
    let per_part = longhand_count / 3;
    let mut out = Vec::with_capacity(longhand_count);
    for part in [width, style, color] {
        out.extend(core::iter::repeat_n(part, per_part));
    }
    Some(out)
}

fn is_border_style(component: &str) -> bool {
    BORDER_STYLES
        .iter()
        .any(|style| component.eq_ignore_ascii_case(style))
}

/// `thin | medium | thick | <length>`.
fn is_line_width(component: &str) -> bool {
    if ["thin", "medium", "thick"]
        .iter()
        .any(|keyword| component.eq_ignore_ascii_case(keyword))
    {
        return true;
    }
    let lower = component.to_ascii_lowercase();
    if lower.starts_with("calc(") || lower.starts_with("max(") || lower.starts_with("min(") {
        return true;
    }
    let digits_end = lower
        .find(|character: char| !(character.is_ascii_digit() || character == '.'))
        .unwrap_or(lower.len());
    let (number, unit) = lower.split_at(digits_end);
    !number.is_empty() && (unit.is_empty() || unit.chars().all(|character| character.is_ascii_alphabetic()))
}
