//! Registered custom properties (`@property`).
//! Spec: <https://www.w3.org/TR/css-properties-values-api-1/#at-property-rule>

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::tracker::diff_names;

/// Definition of a registered custom property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredProperty {
    /// Property name, including the leading `--`.
    pub name: String,
    /// The `syntax` descriptor, e.g. `<color>`.
    #[serde(default = "universal_syntax")]
    pub syntax: String,
    /// The `initial-value` descriptor. Optional only for the universal syntax.
    #[serde(default)]
    pub initial_value: Option<String>,
    /// The `inherits` descriptor.
    #[serde(default)]
    pub inherits: bool,
}

fn universal_syntax() -> String {
    "*".to_owned()
}

/// Registered properties of the current target, keyed by name.
pub type RegisteredProperties = BTreeMap<String, RegisteredProperty>;

/// Build a registry from a list of definitions. Later definitions of a name win.
pub fn registry_from<I: IntoIterator<Item = RegisteredProperty>>(
    definitions: I,
) -> RegisteredProperties {
    definitions
        .into_iter()
        .map(|definition| (definition.name.clone(), definition))
        .collect()
}

/// Names that were added, removed or redefined between two registries.
pub fn changed_registrations(
    old: &RegisteredProperties,
    new: &RegisteredProperties,
) -> BTreeSet<String> {
    diff_names(old, new)
}

/// Whether `name` is registered with `inherits: false`. Values such a property picks up from
/// an ancestor's rules do not apply to the element.
pub fn is_non_inheriting(registered: &RegisteredProperties, name: &str) -> bool {
    registered
        .get(name)
        .is_some_and(|definition| !definition.inherits)
}
