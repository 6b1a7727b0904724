//! Rules and declarations as seen by override resolution.

use core::fmt;
use std::collections::BTreeSet;

use css_syntax::{is_well_formed_value, referenced_variables};
use serde::{Deserialize, Serialize};

use crate::expand::LonghandExpander;

/// Stable, caller-assigned identifier of a matched rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

/// Stable, caller-assigned identifier of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclarationId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "rule#{}", self.0)
    }
}

impl fmt::Display for DeclarationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "declaration#{}", self.0)
    }
}

/// Identifies one longhand of a declaration: its position in `Declaration::computed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComputedKey {
    /// Owning declaration.
    pub declaration: DeclarationId,
    /// Index into the declaration's longhand expansion.
    pub index: usize,
}

/// Full dotted path of a cascade layer, e.g. `base.reset`.
/// Spec: <https://www.w3.org/TR/css-cascade-5/#layer-names>
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerName(pub String);

/// Where a rule sits with respect to the style attribute and cascade layers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "layer")]
pub enum RuleOrigin {
    /// The element's `style` attribute.
    /// Spec: <https://www.w3.org/TR/css-cascade-5/#style-attr>
    InlineStyle,
    /// A rule outside of any cascade layer.
    #[default]
    Unlayered,
    /// A rule inside the named cascade layer.
    Layered(LayerName),
}

/// Declaration importance.
/// Spec: <https://www.w3.org/TR/css-cascade-5/#importance>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// No `!important` annotation.
    #[default]
    Normal,
    /// Declared with `!important`.
    Important,
}

impl Priority {
    /// Map the parser's `important` flag to a priority.
    #[inline]
    pub const fn from_important(important: bool) -> Self {
        if important {
            Self::Important
        } else {
            Self::Normal
        }
    }

    #[inline]
    pub const fn is_important(self) -> bool {
        matches!(self, Self::Important)
    }
}

/// One longhand produced by expanding a declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputedProperty {
    /// Longhand property name.
    pub name: String,
    /// Longhand value.
    pub value: String,
    /// Copied from the owning declaration.
    pub priority: Priority,
}

/// One authored `name: value` pair inside a rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclarationId,
    pub name: String,
    pub value: String,
    pub priority: Priority,
    /// Disabled declarations take no part in override resolution.
    pub enabled: bool,
    /// Whether the value parses. Invalid declarations are always overridden.
    pub valid: bool,
    /// Inherited value of a registered custom property that does not inherit.
    pub invisible: bool,
    /// Longhand expansion.
    pub computed: Vec<ComputedProperty>,
    /// Custom properties referenced through `var()`.
    pub used_variables: BTreeSet<String>,
    /// Computed value of a custom property, when the engine reported one.
    pub variable_computed_value: Option<String>,
}

impl Declaration {
    /// Build an enabled declaration, deriving its longhands, referenced variables and
    /// validity from `value`.
    pub fn new(
        id: DeclarationId,
        name: &str,
        value: &str,
        priority: Priority,
        expander: &dyn LonghandExpander,
    ) -> Self {
        let mut declaration = Self {
            id,
            name: name.to_owned(),
            value: value.to_owned(),
            priority,
            enabled: true,
            valid: true,
            invisible: false,
            computed: Vec::new(),
            used_variables: BTreeSet::new(),
            variable_computed_value: None,
        };
        declaration.reparse(expander);
        declaration
    }

    /// Recompute everything derived from `name`, `value` and `priority`.
    pub fn reparse(&mut self, expander: &dyn LonghandExpander) {
        self.valid = is_well_formed_value(&self.value);
        self.used_variables = referenced_variables(&self.value);
        self.computed = expander
            .expand(&self.name, &self.value)
            .into_iter()
            .map(|(name, value)| ComputedProperty {
                name,
                value,
                priority: self.priority,
            })
            .collect();
    }

    /// Replace name, value and priority, then recompute derived state.
    pub fn set(
        &mut self,
        name: &str,
        value: &str,
        priority: Priority,
        expander: &dyn LonghandExpander,
    ) {
        name.clone_into(&mut self.name);
        value.clone_into(&mut self.value);
        self.priority = priority;
        self.variable_computed_value = None;
        self.reparse(expander);
    }

    /// Keys of this declaration's longhands.
    pub fn computed_keys(&self) -> impl Iterator<Item = ComputedKey> + '_ {
        (0..self.computed.len()).map(|index| ComputedKey {
            declaration: self.id,
            index,
        })
    }

    #[inline]
    pub fn is_custom_property(&self) -> bool {
        css_syntax::is_custom_property(&self.name)
    }
}

/// A matched style rule (or the element's style attribute, or a nested declarations block).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub id: RuleId,
    pub origin: RuleOrigin,
    /// Pseudo-element this rule targets, empty for the element itself.
    pub pseudo_element: String,
    /// The rule matched an ancestor rather than the element.
    pub inherited: bool,
    /// The rule is inside `@starting-style`.
    pub starting_style: bool,
    /// CSS nesting's bare declarations block.
    pub nested_declarations: bool,
    /// The rule is a keyframe of an `@keyframes` rule.
    pub keyframes: bool,
    /// The rule comes from the user-agent stylesheet.
    pub user_agent: bool,
    /// Indexes of the selectors in this rule's selector list that match the element.
    pub matched_selector_indexes: Vec<usize>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

impl Rule {
    /// An empty, unlayered rule matching the element through its first selector.
    pub fn new(id: RuleId) -> Self {
        Self {
            id,
            origin: RuleOrigin::Unlayered,
            pseudo_element: String::new(),
            inherited: false,
            starting_style: false,
            nested_declarations: false,
            keyframes: false,
            user_agent: false,
            matched_selector_indexes: vec![0],
            declarations: Vec::new(),
        }
    }

    #[inline]
    pub const fn is_element_style(&self) -> bool {
        matches!(self.origin, RuleOrigin::InlineStyle)
    }

    #[inline]
    pub const fn layer(&self) -> Option<&LayerName> {
        match &self.origin {
            RuleOrigin::Layered(layer) => Some(layer),
            RuleOrigin::InlineStyle | RuleOrigin::Unlayered => None,
        }
    }

    #[inline]
    pub const fn is_in_layer(&self) -> bool {
        self.layer().is_some()
    }

    /// Whether the two rules sit in different layers. Unlayered counts as its own layer.
    #[inline]
    pub fn is_in_different_layer(&self, other: &Self) -> bool {
        self.layer() != other.layer()
    }

    pub fn declaration(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declarations.iter().find(|decl| decl.id == id)
    }

    pub fn declaration_mut(&mut self, id: DeclarationId) -> Option<&mut Declaration> {
        self.declarations.iter_mut().find(|decl| decl.id == id)
    }
}
