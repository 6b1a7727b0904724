//! CSS Custom Properties for Cascading Variables Module Level 1: CSS variables.
//! Spec: <https://www.w3.org/TR/css-variables-1/>
//!
//! Tracks the effective value of every custom property for an element and its
//! pseudo-elements as a side effect of override resolution, diffs it against the previous
//! pass, and answers value queries (falling back to `@property` initial values).

#![forbid(unsafe_code)]

use std::collections::BTreeMap;

mod registered;
mod substitute;
mod tracker;

pub use registered::{
    RegisteredProperties, RegisteredProperty, changed_registrations, is_non_inheriting,
    registry_from,
};
pub use substitute::resolve_vars_in_value;
pub use tracker::{
    ChangedVariables, CustomPropertyTracker, VariableCollector, VariableData, VariableMaps,
    VariableValue, diff_names,
};

/// Alias used by helpers that operate on a set of custom properties.
/// Keys are property names (including the leading `--`); values are raw token strings.
pub type CustomProperties = BTreeMap<String, String>;
