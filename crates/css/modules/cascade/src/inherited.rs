//! Which properties inherit by default.
//! Spec: <https://www.w3.org/TR/css-cascade-5/#inheriting>

/// Inherited longhands, sorted for binary search.
const INHERITED_PROPERTIES: &[&str] = &[
    "border-collapse",
    "border-spacing",
    "caption-side",
    "caret-color",
    "color",
    "color-scheme",
    "cursor",
    "direction",
    "empty-cells",
    "font",
    "font-family",
    "font-feature-settings",
    "font-kerning",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-variant-caps",
    "font-variant-numeric",
    "font-weight",
    "hyphens",
    "letter-spacing",
    "line-height",
    "list-style",
    "list-style-image",
    "list-style-position",
    "list-style-type",
    "orphans",
    "overflow-wrap",
    "paint-order",
    "quotes",
    "tab-size",
    "text-align",
    "text-align-last",
    "text-indent",
    "text-justify",
    "text-rendering",
    "text-shadow",
    "text-transform",
    "text-underline-position",
    "visibility",
    "white-space",
    "widows",
    "word-break",
    "word-spacing",
    "writing-mode",
];

/// Whether a property is inherited by default. Unregistered custom properties inherit.
///
/// Only inherited properties of an inherited rule have any effect on the element, so the
/// rule view hides the others.
pub fn is_inherited_property(property_name: &str) -> bool {
    if css_syntax::is_custom_property(property_name) {
        return true;
    }
    let lower = property_name.to_ascii_lowercase();
    INHERITED_PROPERTIES.binary_search(&lower.as_str()).is_ok()
}
