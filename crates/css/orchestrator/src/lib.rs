//! Rule view model of the CSS engine.
//!
//! Builds the rule model of one element from the rules the engine matched for it, runs
//! override resolution for the element and each of its pseudo-elements, keeps the
//! custom-property tracker up to date and reports which declarations must be redrawn.

mod config;
mod element_style;
mod filter;
mod notifier;
mod report;
pub mod types;

pub use config::RuleViewConfig;
pub use element_style::{ElementStyle, PopulateToken};
pub use filter::{declarations_for, has_any_visible_declarations, is_visible, participates};
pub use notifier::{RefreshList, needs_refresh, refresh_after_pass, refresh_for_variables};
pub use report::{ComputedReport, DeclarationReport, ElementStyleReport, RuleReport};
pub use types::{DeclarationEntry, Fixture, RuleEntry};
