//! Override resolution: one forward pass over a cascade-ordered declaration stream.

use std::collections::{BTreeSet, HashMap};

use log::{debug, trace};

use crate::model::{ComputedKey, Declaration, DeclarationId, Rule};
use crate::priority::{CascadeItem, has_higher_priority};

/// Receives the side effects of a pass as they happen.
///
/// The custom-property tracker rides along the resolver through this seam; the default
/// methods do nothing, so `()` can be used when nobody is listening.
pub trait CascadeObserver {
    /// `item` took the slot for its longhand: it is not overridden (yet) and is enabled.
    fn property_taken(&mut self, _item: &CascadeItem<'_>) {}

    /// The starting-style declaration holding custom property `name` lost to a
    /// higher-priority declaration.
    fn starting_style_overridden(&mut self, _name: &str) {}
}

impl CascadeObserver for () {}

/// Overridden flags keyed by stable ids. Keys that were never recorded read as `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OverrideSnapshot {
    computed: HashMap<ComputedKey, bool>,
    declarations: HashMap<DeclarationId, bool>,
}

impl OverrideSnapshot {
    #[inline]
    pub fn is_overridden(&self, id: DeclarationId) -> bool {
        self.declarations.get(&id).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_computed_overridden(&self, key: ComputedKey) -> bool {
        self.computed.get(&key).copied().unwrap_or(false)
    }
}

/// Result of one resolution pass.
#[derive(Clone, Debug, Default)]
pub struct OverridePass {
    /// Flags for every declaration and longhand of the stream.
    pub snapshot: OverrideSnapshot,
    /// Declarations whose own flag, or the flag of any of their longhands, differs from
    /// the prior snapshot.
    pub changed: BTreeSet<DeclarationId>,
}

/// Resolve overrides for `stream`, ordered from highest to lowest cascade precedence.
///
/// `prior` is only read to decide what changed; the returned snapshot holds the complete
/// new state for every declaration of the stream.
pub fn resolve_overrides<O: CascadeObserver + ?Sized>(
    stream: &[(&Rule, &Declaration)],
    prior: &OverrideSnapshot,
    observer: &mut O,
) -> OverridePass {
    let mut computed: HashMap<ComputedKey, bool> = HashMap::new();
    let mut taken: HashMap<&str, CascadeItem<'_>> = HashMap::new();
    let mut taken_in_starting_style: HashMap<&str, CascadeItem<'_>> = HashMap::new();

    for &(rule, declaration) in stream {
        for (index, property) in declaration.computed.iter().enumerate() {
            let item = CascadeItem {
                rule,
                declaration,
                property,
                index,
            };
            // An unparseable value never takes a slot, so a vendor-prefixed fallback chain
            // resolves to the first value the engine understands.
            if !declaration.valid {
                computed.insert(item.key(), true);
                continue;
            }

            let name = property.name.as_str();
            let in_starting_style = rule.starting_style;
            let earlier = taken.get(name).copied();
            let earlier_in_starting_style = taken_in_starting_style.get(name).copied();

            let higher = has_higher_priority(&item, earlier.as_ref());
            let starting_style_higher =
                has_higher_priority(&item, earlier_in_starting_style.as_ref());

            if higher
                && !in_starting_style
                && let Some(demoted) = earlier
            {
                trace!(target: "css_cascade", "{name}: {} overrides {}", declaration.id, demoted.declaration.id);
                computed.insert(demoted.key(), true);
            }

            if starting_style_higher && let Some(demoted) = earlier_in_starting_style {
                trace!(target: "css_cascade", "{name}: {} overrides starting-style {}", declaration.id, demoted.declaration.id);
                computed.insert(demoted.key(), true);
                if css_syntax::is_custom_property(name) {
                    observer.starting_style_overridden(name);
                }
            }

            let overridden = (earlier.is_some() && !higher)
                || (in_starting_style && earlier_in_starting_style.is_some() && !starting_style_higher);
            computed.insert(item.key(), overridden);

            if !overridden && declaration.enabled {
                if in_starting_style {
                    taken_in_starting_style.insert(name, item);
                } else {
                    taken.insert(name, item);
                }
                observer.property_taken(&item);
            }
        }
    }

    let mut pass = OverridePass::default();
    for &(_, declaration) in stream {
        let mut overridden = true;
        let mut dirty = false;
        for key in declaration.computed_keys() {
            let now = computed.get(&key).copied().unwrap_or(false);
            overridden &= now;
            dirty |= now != prior.is_computed_overridden(key);
        }
        dirty |= overridden != prior.is_overridden(declaration.id);
        if dirty {
            pass.changed.insert(declaration.id);
        }
        pass.snapshot.declarations.insert(declaration.id, overridden);
    }
    pass.snapshot.computed = computed;
    debug!(
        target: "css_cascade",
        "resolved {} declarations, {} changed",
        stream.len(),
        pass.changed.len()
    );
    pass
}
