//! Which declarations take part in an override pass, and which are visible.

use css_cascade::{Declaration, Rule, is_inherited_property};
use css_variables::{RegisteredProperties, is_non_inheriting};

/// Whether `rule` takes part in the pass for `pseudo` (`""` for the element itself).
///
/// Keyframes never do: whether they apply depends on animation timing. Plain rules must
/// have a matching selector, so a rule whose selector was edited into a non-matching one
/// cannot override anything. Rules for the pass's pseudo-element are always considered;
/// inherited pseudo-element rules belong to the element's pass.
pub fn participates(rule: &Rule, pseudo: &str) -> bool {
    if rule.keyframes {
        return false;
    }
    if rule.nested_declarations {
        return true;
    }
    let has_pseudo = !rule.pseudo_element.is_empty();
    if pseudo.is_empty() {
        let is_style_rule = !has_pseudo && !rule.matched_selector_indexes.is_empty();
        let is_inherited_pseudo_rule = has_pseudo && rule.inherited;
        is_style_rule || rule.is_element_style() || is_inherited_pseudo_rule
    } else {
        has_pseudo && rule.pseudo_element == pseudo && !rule.inherited
    }
}

/// The enabled declarations of the participating rules, in cascade order: rules in the
/// given order, and within a rule, later declarations first.
pub fn declarations_for<'a>(rules: &'a [Rule], pseudo: &str) -> Vec<(&'a Rule, &'a Declaration)> {
    rules
        .iter()
        .filter(|rule| participates(rule, pseudo))
        .flat_map(|rule| {
            rule.declarations
                .iter()
                .rev()
                .filter(|declaration| declaration.enabled)
                .map(move |declaration| (rule, declaration))
        })
        .collect()
}

/// Recompute the `invisible` flag of every declaration of `rule`.
pub fn apply_visibility(rule: &mut Rule, registered: &RegisteredProperties) {
    let inherited = rule.inherited;
    for declaration in &mut rule.declarations {
        declaration.invisible = inherited && is_non_inheriting(registered, &declaration.name);
    }
}

/// Whether a declaration would be shown: inherited rules only show what inherits.
pub fn is_visible(rule: &Rule, declaration: &Declaration) -> bool {
    if declaration.invisible {
        return false;
    }
    !rule.inherited || is_inherited_property(&declaration.name)
}

pub fn has_any_visible_declarations(rule: &Rule) -> bool {
    rule.declarations
        .iter()
        .any(|declaration| is_visible(rule, declaration))
}
