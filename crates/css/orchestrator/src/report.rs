//! Serializable snapshot of an element's rule view.

use std::collections::{BTreeMap, BTreeSet};

use css_cascade::{DeclarationId, RuleId, RuleOrigin};
use css_variables::CustomProperties;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ElementStyleReport {
    /// Rules in display order.
    pub rules: Vec<RuleReport>,
    /// Effective custom properties, keyed by pseudo-element (`""` for the element).
    pub variables: BTreeMap<String, CustomProperties>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub id: RuleId,
    pub origin: RuleOrigin,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pseudo_element: String,
    pub inherited: bool,
    pub starting_style: bool,
    pub declarations: Vec<DeclarationReport>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeclarationReport {
    pub id: DeclarationId,
    pub name: String,
    pub value: String,
    pub important: bool,
    pub enabled: bool,
    pub valid: bool,
    pub overridden: bool,
    pub computed: Vec<ComputedReport>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub used_variables: BTreeSet<String>,
}

/// One longhand of a declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComputedReport {
    pub name: String,
    pub value: String,
    pub overridden: bool,
}
