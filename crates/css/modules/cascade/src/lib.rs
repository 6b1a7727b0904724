//! CSS Cascading and Inheritance Level 5: which declarations are overridden.
//! Spec: <https://www.w3.org/TR/css-cascade-5/>
//!
//! Selector matching and cascade sorting happen elsewhere: this crate receives the
//! declarations of the rules matched for one element, ordered from highest to lowest
//! precedence, and marks every longhand that is superseded by another declaration.
//! `!important` inversion, cascade layers, the style attribute and `@starting-style` are
//! taken into account; see [`has_higher_priority`] and [`resolve_overrides`].

#![forbid(unsafe_code)]

mod expand;
mod inherited;
mod model;
mod priority;
mod resolver;

pub use expand::{LonghandExpander, ShorthandExpander};
pub use inherited::is_inherited_property;
pub use model::{
    ComputedKey, ComputedProperty, Declaration, DeclarationId, LayerName, Priority, Rule,
    RuleId, RuleOrigin,
};
pub use priority::{CascadeItem, has_higher_priority};
pub use resolver::{CascadeObserver, OverridePass, OverrideSnapshot, resolve_overrides};
