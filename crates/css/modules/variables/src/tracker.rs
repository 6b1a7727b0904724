//! Effective custom-property values per pseudo-element, collected during override passes.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use css_cascade::{CascadeItem, CascadeObserver};
use log::debug;
use serde::Serialize;

use crate::CustomProperties;
use crate::registered::{RegisteredProperties, RegisteredProperty};

/// Value of a custom property as declared, and as computed when the engine reported one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableValue {
    pub declaration_value: String,
    pub computed_value: Option<String>,
}

impl VariableValue {
    /// The value substituted for `var()`: the computed value when known.
    #[inline]
    pub fn effective(&self) -> &str {
        self.computed_value
            .as_deref()
            .unwrap_or(&self.declaration_value)
    }
}

/// Custom properties of one target: the live cascade and the `@starting-style` cascade.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableMaps {
    pub live: BTreeMap<String, VariableValue>,
    pub starting_style: BTreeMap<String, String>,
}

/// What a pass changed, by custom property name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangedVariables {
    pub live: BTreeSet<String>,
    pub starting_style: BTreeSet<String>,
}

impl ChangedVariables {
    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.starting_style.is_empty()
    }

    /// Whether any of `names` changed in either cascade.
    pub fn touches(&self, names: &BTreeSet<String>) -> bool {
        !(self.live.is_disjoint(names) && self.starting_style.is_disjoint(names))
    }
}

/// What a caller can learn about one custom property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct VariableData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_property: Option<RegisteredProperty>,
}

/// Builds the variable maps of one pass. Plugged into the resolver as its observer.
#[derive(Debug, Default)]
pub struct VariableCollector {
    maps: VariableMaps,
}

impl VariableCollector {
    /// A collector starting from `base`, the maps a pseudo-element inherits.
    pub fn seeded(base: VariableMaps) -> Self {
        Self { maps: base }
    }

    pub fn maps(&self) -> &VariableMaps {
        &self.maps
    }

    pub fn into_maps(self) -> VariableMaps {
        self.maps
    }
}

impl CascadeObserver for VariableCollector {
    fn property_taken(&mut self, item: &CascadeItem<'_>) {
        let declaration = item.declaration;
        if !css_syntax::is_custom_property(&item.property.name) || declaration.invisible {
            return;
        }
        if item.rule.starting_style {
            self.maps
                .starting_style
                .insert(item.property.name.clone(), item.property.value.clone());
        } else {
            self.maps.live.insert(
                item.property.name.clone(),
                VariableValue {
                    declaration_value: item.property.value.clone(),
                    computed_value: declaration.variable_computed_value.clone(),
                },
            );
        }
    }

    fn starting_style_overridden(&mut self, name: &str) {
        self.maps.starting_style.remove(name);
    }
}

/// Names whose value differs between two maps, including names present in only one.
pub fn diff_names<V: PartialEq>(
    old: &BTreeMap<String, V>,
    new: &BTreeMap<String, V>,
) -> BTreeSet<String> {
    old.keys()
        .chain(new.keys())
        .filter(|name| old.get(*name) != new.get(*name))
        .cloned()
        .collect()
}

/// Holds the variable maps of the element (`""`) and of each of its pseudo-elements.
#[derive(Debug, Default)]
pub struct CustomPropertyTracker {
    by_pseudo: HashMap<String, VariableMaps>,
}

impl CustomPropertyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A collector for a pass over `pseudo`. Pseudo-elements start from the element's maps.
    pub fn collector(&self, pseudo: &str) -> VariableCollector {
        if pseudo.is_empty() {
            return VariableCollector::default();
        }
        VariableCollector::seeded(self.by_pseudo.get("").cloned().unwrap_or_default())
    }

    /// Store the maps built by `collector` for `pseudo` and report what changed.
    pub fn commit(&mut self, pseudo: &str, collector: VariableCollector) -> ChangedVariables {
        let new_maps = collector.into_maps();
        let old_maps = self.by_pseudo.remove(pseudo).unwrap_or_default();
        let changed = ChangedVariables {
            live: diff_names(&old_maps.live, &new_maps.live),
            starting_style: diff_names(&old_maps.starting_style, &new_maps.starting_style),
        };
        if !changed.is_empty() {
            debug!(
                target: "css_variables",
                "pseudo {pseudo:?}: {} live and {} starting-style variables changed",
                changed.live.len(),
                changed.starting_style.len()
            );
        }
        self.by_pseudo.insert(pseudo.to_owned(), new_maps);
        changed
    }

    pub fn maps(&self, pseudo: &str) -> Option<&VariableMaps> {
        self.by_pseudo.get(pseudo)
    }

    /// Forget the maps of pseudo-elements that no longer have rules.
    pub fn retain_pseudos(&mut self, keep: &BTreeSet<String>) {
        self.by_pseudo
            .retain(|pseudo, _| pseudo.is_empty() || keep.contains(pseudo));
    }

    /// Everything known about `name` on `pseudo`.
    pub fn variable_data(
        &self,
        name: &str,
        pseudo: &str,
        registered: &RegisteredProperties,
    ) -> VariableData {
        let maps = self.by_pseudo.get(pseudo);
        let live = maps.and_then(|found| found.live.get(name));
        VariableData {
            value: live.map(|value| value.declaration_value.clone()),
            computed_value: live.and_then(|value| value.computed_value.clone()),
            starting_style: maps.and_then(|found| found.starting_style.get(name).cloned()),
            registered_property: registered.get(name).cloned(),
        }
    }

    /// The effective value of every custom property on `pseudo`: live values first, then
    /// starting-style values, then registered initial values, each only filling gaps.
    pub fn all_custom_properties(
        &self,
        pseudo: &str,
        registered: &RegisteredProperties,
    ) -> CustomProperties {
        let mut out = CustomProperties::new();
        let Some(maps) = self.by_pseudo.get(pseudo) else {
            fill_registered(&mut out, registered);
            return out;
        };
        for (name, value) in &maps.live {
            out.insert(name.clone(), value.effective().to_owned());
        }
        for (name, value) in &maps.starting_style {
            out.entry(name.clone()).or_insert_with(|| value.clone());
        }
        fill_registered(&mut out, registered);
        out
    }
}

fn fill_registered(out: &mut CustomProperties, registered: &RegisteredProperties) {
    for (name, definition) in registered {
        if let Some(initial) = &definition.initial_value {
            out.entry(name.clone()).or_insert_with(|| initial.clone());
        }
    }
}
