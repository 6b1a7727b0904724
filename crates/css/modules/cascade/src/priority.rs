//! Precedence between two declarations of the same longhand.
//! Spec: <https://www.w3.org/TR/css-cascade-5/#cascade-sort>

use crate::model::{ComputedProperty, Declaration, Rule};

/// One longhand in the declaration stream, together with where it came from.
#[derive(Clone, Copy, Debug)]
pub struct CascadeItem<'a> {
    pub rule: &'a Rule,
    pub declaration: &'a Declaration,
    pub property: &'a ComputedProperty,
    /// Index of `property` in `declaration.computed`.
    pub index: usize,
}

impl CascadeItem<'_> {
    #[inline]
    pub fn key(&self) -> crate::model::ComputedKey {
        crate::model::ComputedKey {
            declaration: self.declaration.id,
            index: self.index,
        }
    }
}

/// Whether `candidate` wins over `earlier`, a declaration of the same longhand that came
/// before it in the stream (so from a more specific rule, or earlier in the same rule).
///
/// Only an `!important` candidate can win, and only against a declaration applying to the
/// same element (both inherited or both not) and the same pseudo-element. It then wins
/// over a normal declaration, and over an important one when the candidate is layered, in a
/// different layer, and the earlier declaration is not in the style attribute: important
/// layered declarations reverse layer order, but never beat an important style attribute.
pub fn has_higher_priority(candidate: &CascadeItem<'_>, earlier: Option<&CascadeItem<'_>>) -> bool {
    let Some(earlier) = earlier else {
        return false;
    };
    if !candidate.property.priority.is_important() {
        return false;
    }
    let rule = candidate.rule;
    let earlier_rule = earlier.rule;
    if rule.inherited != earlier_rule.inherited {
        return false;
    }
    if rule.pseudo_element != earlier_rule.pseudo_element {
        return false;
    }
    !earlier.property.priority.is_important()
        || (rule.is_in_layer()
            && rule.is_in_different_layer(earlier_rule)
            && !earlier_rule.is_element_style())
}
