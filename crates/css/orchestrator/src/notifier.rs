//! Deciding which declarations need their presentation refreshed.

use std::collections::BTreeSet;
use std::collections::btree_set;

use css_cascade::{Declaration, DeclarationId, OverridePass, Rule};
use css_variables::ChangedVariables;
use serde::Serialize;

/// Declarations to refresh, in id order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RefreshList(BTreeSet<DeclarationId>);

impl RefreshList {
    #[inline]
    pub fn insert(&mut self, id: DeclarationId) {
        self.0.insert(id);
    }

    #[inline]
    pub fn contains(&self, id: DeclarationId) -> bool {
        self.0.contains(&id)
    }

    #[inline]
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn iter(&self) -> btree_set::Iter<'_, DeclarationId> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RefreshList {
    type Item = &'a DeclarationId;
    type IntoIter = btree_set::Iter<'a, DeclarationId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<DeclarationId> for RefreshList {
    fn from_iter<I: IntoIterator<Item = DeclarationId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A declaration needs refreshing when its overridden state changed, or when it uses a
/// custom property whose value changed.
pub fn needs_refresh(
    declaration: &Declaration,
    overridden_changed: bool,
    changes: &ChangedVariables,
) -> bool {
    overridden_changed || changes.touches(&declaration.used_variables)
}

/// Refresh list for one pass over `stream`.
pub fn refresh_after_pass(
    stream: &[(&Rule, &Declaration)],
    pass: &OverridePass,
    changes: &ChangedVariables,
) -> RefreshList {
    stream
        .iter()
        .filter(|(_, declaration)| {
            needs_refresh(declaration, pass.changed.contains(&declaration.id), changes)
        })
        .map(|(_, declaration)| declaration.id)
        .collect()
}

/// Every declaration, in any rule, that references one of `names`.
pub fn refresh_for_variables(rules: &[Rule], names: &BTreeSet<String>) -> RefreshList {
    if names.is_empty() {
        return RefreshList::default();
    }
    rules
        .iter()
        .flat_map(|rule| &rule.declarations)
        .filter(|declaration| !declaration.used_variables.is_disjoint(names))
        .map(|declaration| declaration.id)
        .collect()
}
