//! Matched-rule entries as reported by the style engine.

use css_cascade::{
    Declaration, DeclarationId, LayerName, LonghandExpander, Priority, Rule, RuleId, RuleOrigin,
};
use css_syntax::normalize_property_name;
use css_variables::RegisteredProperty;
use serde::Deserialize;

/// One matched rule, before the rule view builds its model from it.
#[derive(Clone, Debug, Deserialize)]
pub struct RuleEntry {
    pub id: RuleId,
    #[serde(default)]
    pub origin: RuleOrigin,
    #[serde(default)]
    pub pseudo_element: String,
    #[serde(default)]
    pub inherited: bool,
    #[serde(default)]
    pub starting_style: bool,
    #[serde(default)]
    pub nested_declarations: bool,
    #[serde(default)]
    pub keyframes: bool,
    #[serde(default)]
    pub user_agent: bool,
    /// Internal rules the engine reports but that are never shown.
    #[serde(default)]
    pub system: bool,
    #[serde(default = "first_selector")]
    pub matched_selector_indexes: Vec<usize>,
    #[serde(default)]
    pub declarations: Vec<DeclarationEntry>,
}

fn first_selector() -> Vec<usize> {
    vec![0]
}

const fn enabled_by_default() -> bool {
    true
}

/// One declaration of a [`RuleEntry`].
#[derive(Clone, Debug, Deserialize)]
pub struct DeclarationEntry {
    pub id: DeclarationId,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub important: bool,
    /// `false` for commented-out declarations.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// The engine's parse verdict. When absent the value is checked for well-formedness.
    #[serde(default)]
    pub valid: Option<bool>,
    /// Computed value of a custom property.
    #[serde(default)]
    pub computed_value: Option<String>,
}

/// Input of the `ruleview` tool: registered properties and matched rules for one element.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub registered_properties: Vec<RegisteredProperty>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

impl RuleEntry {
    /// An unlayered rule matching the element.
    pub fn new(id: u64) -> Self {
        Self {
            id: RuleId(id),
            origin: RuleOrigin::Unlayered,
            pseudo_element: String::new(),
            inherited: false,
            starting_style: false,
            nested_declarations: false,
            keyframes: false,
            user_agent: false,
            system: false,
            matched_selector_indexes: first_selector(),
            declarations: Vec::new(),
        }
    }

    /// Append a declaration.
    #[must_use]
    pub fn declare(mut self, id: u64, name: &str, value: &str, important: bool) -> Self {
        self.declarations.push(DeclarationEntry {
            id: DeclarationId(id),
            name: name.to_owned(),
            value: value.to_owned(),
            important,
            enabled: true,
            valid: None,
            computed_value: None,
        });
        self
    }

    /// Mark the most recently declared declaration as rejected by the engine's parser.
    #[must_use]
    pub fn invalid(mut self) -> Self {
        if let Some(last) = self.declarations.last_mut() {
            last.valid = Some(false);
        }
        self
    }

    #[must_use]
    pub fn inline_style(mut self) -> Self {
        self.origin = RuleOrigin::InlineStyle;
        self
    }

    #[must_use]
    pub fn layered(mut self, layer: &str) -> Self {
        self.origin = RuleOrigin::Layered(LayerName(layer.to_owned()));
        self
    }

    #[must_use]
    pub fn pseudo(mut self, pseudo_element: &str) -> Self {
        pseudo_element.clone_into(&mut self.pseudo_element);
        self
    }

    #[must_use]
    pub const fn inherited(mut self) -> Self {
        self.inherited = true;
        self
    }

    #[must_use]
    pub const fn starting_style(mut self) -> Self {
        self.starting_style = true;
        self
    }

    #[must_use]
    pub const fn nested_declarations(mut self) -> Self {
        self.nested_declarations = true;
        self
    }

    #[must_use]
    pub const fn keyframes(mut self) -> Self {
        self.keyframes = true;
        self
    }

    #[must_use]
    pub fn unmatched(mut self) -> Self {
        self.matched_selector_indexes.clear();
        self
    }

    /// Build the rule model, expanding every declaration into its longhands.
    pub fn into_rule(self, expander: &dyn LonghandExpander) -> Rule {
        let declarations = self
            .declarations
            .into_iter()
            .map(|entry| entry.into_declaration(expander))
            .collect();
        Rule {
            id: self.id,
            origin: self.origin,
            pseudo_element: self.pseudo_element,
            inherited: self.inherited,
            starting_style: self.starting_style,
            nested_declarations: self.nested_declarations,
            keyframes: self.keyframes,
            user_agent: self.user_agent,
            matched_selector_indexes: self.matched_selector_indexes,
            declarations,
        }
    }
}

impl DeclarationEntry {
    pub fn into_declaration(self, expander: &dyn LonghandExpander) -> Declaration {
        let name = normalize_property_name(&self.name);
        let mut declaration = Declaration::new(
            self.id,
            &name,
            self.value.trim(),
            Priority::from_important(self.important),
            expander,
        );
        declaration.enabled = self.enabled;
        if let Some(valid) = self.valid {
            declaration.valid = valid;
        }
        declaration.variable_computed_value = self.computed_value;
        declaration
    }
}
