//! Configuration settings for the rule view.
//!
//! Decides which of the matched rules reported by the engine are shown and take part in
//! override resolution. Configuration can be loaded from environment variables or
//! constructed programmatically.

use std::env;

/// Runtime configuration for an [`ElementStyle`](crate::ElementStyle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuleViewConfig {
    /// Whether rules from the user-agent stylesheet are kept.
    pub show_user_agent_styles: bool,
    /// Whether rules inherited from ancestors are kept.
    pub include_inherited: bool,
}

impl Default for RuleViewConfig {
    #[inline]
    fn default() -> Self {
        Self::new(false, true)
    }
}

impl RuleViewConfig {
    /// Construct a new `RuleViewConfig` with explicit values.
    #[inline]
    #[must_use]
    pub const fn new(show_user_agent_styles: bool, include_inherited: bool) -> Self {
        Self {
            show_user_agent_styles,
            include_inherited,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `RULEVIEW_SHOW_UA_STYLES`: Set to "1" to keep user-agent rules (default: disabled)
    /// - `RULEVIEW_INCLUDE_INHERITED`: Set to "0" to drop inherited rules (default: enabled)
    #[inline]
    #[must_use]
    pub fn from_env() -> Self {
        let show_user_agent_styles =
            env::var("RULEVIEW_SHOW_UA_STYLES").ok().as_deref() == Some("1");
        let include_inherited = env::var("RULEVIEW_INCLUDE_INHERITED").ok().as_deref() != Some("0");
        Self {
            show_user_agent_styles,
            include_inherited,
        }
    }
}
