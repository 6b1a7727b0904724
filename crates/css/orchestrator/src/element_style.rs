//! The rule view model of one element.
//!
//! `ElementStyle` keeps the rules matched for the selected element, marks overridden
//! declarations for the element and each of its pseudo-elements, tracks custom-property
//! values, and reports which declarations need to be redrawn after every change.

use core::iter;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::{Result, anyhow, bail};
use css_cascade::{
    ComputedKey, Declaration, DeclarationId, LonghandExpander, OverrideSnapshot, Priority, Rule,
    RuleId, ShorthandExpander, resolve_overrides,
};
use css_syntax::{parse_declaration_list, parse_property_name, parse_value_and_extras};
use css_variables::{
    CustomProperties, CustomPropertyTracker, RegisteredProperties, VariableData,
    changed_registrations, is_non_inheriting, resolve_vars_in_value,
};
use log::{debug, warn};

use crate::config::RuleViewConfig;
use crate::filter::{apply_visibility, declarations_for, has_any_visible_declarations};
use crate::notifier::{RefreshList, refresh_after_pass, refresh_for_variables};
use crate::report::{ComputedReport, DeclarationReport, ElementStyleReport, RuleReport};
use crate::types::RuleEntry;

/// Handed out by [`ElementStyle::begin_populate`]. Only the most recent token may populate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PopulateToken(u64);

pub struct ElementStyle {
    config: RuleViewConfig,
    expander: Box<dyn LonghandExpander>,
    /// Rules in cascade order, highest precedence first. See [`Self::display_rules`].
    rules: Vec<Rule>,
    /// Pseudo-elements with non-inherited rules, each getting its own pass.
    pseudo_element_types: BTreeSet<String>,
    /// Flags of the latest pass, per pseudo-element (`""` for the element).
    overrides: HashMap<String, OverrideSnapshot>,
    variables: CustomPropertyTracker,
    registered: RegisteredProperties,
    /// Declarations the user disabled; re-applied when the rules are repopulated.
    disabled: HashSet<DeclarationId>,
    generation: u64,
    /// Id for the next declaration the user adds. `None` once every id is taken.
    next_declaration_id: Option<u64>,
}

impl Default for ElementStyle {
    #[inline]
    fn default() -> Self {
        Self::new(RuleViewConfig::default())
    }
}

impl ElementStyle {
    #[inline]
    pub fn new(config: RuleViewConfig) -> Self {
        Self::with_expander(config, Box::new(ShorthandExpander))
    }

    pub fn with_expander(config: RuleViewConfig, expander: Box<dyn LonghandExpander>) -> Self {
        Self {
            config,
            expander,
            rules: Vec::new(),
            pseudo_element_types: BTreeSet::new(),
            overrides: HashMap::new(),
            variables: CustomPropertyTracker::new(),
            registered: RegisteredProperties::new(),
            disabled: HashSet::new(),
            generation: 0,
            next_declaration_id: Some(0),
        }
    }

    /// Start a populate request. Any request started earlier becomes stale.
    pub fn begin_populate(&mut self) -> PopulateToken {
        self.generation += 1;
        PopulateToken(self.generation)
    }

    /// Replace the rule list with freshly matched `entries` and recompute everything.
    ///
    /// Returns `Ok(None)` without touching any state when `token` is stale.
    ///
    /// # Errors
    /// Returns an error if a declaration id appears more than once in `entries`.
    pub fn populate(
        &mut self,
        token: PopulateToken,
        entries: Vec<RuleEntry>,
    ) -> Result<Option<RefreshList>> {
        if token.0 != self.generation {
            warn!(
                target: "rule_view",
                "discarding stale populate (generation {} < {})",
                token.0,
                self.generation
            );
            return Ok(None);
        }

        let mut seen_rules = HashSet::new();
        let mut seen_declarations = HashSet::new();
        let mut rules = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.system
                || (entry.user_agent && !self.config.show_user_agent_styles)
                || (entry.inherited && !self.config.include_inherited)
            {
                continue;
            }
            if !seen_rules.insert(entry.id) {
                continue;
            }
            for declaration in &entry.declarations {
                if !seen_declarations.insert(declaration.id) {
                    bail!("{} appears more than once in the matched rules", declaration.id);
                }
            }
            let mut rule = entry.into_rule(self.expander.as_ref());
            for declaration in &mut rule.declarations {
                if self.disabled.contains(&declaration.id) {
                    declaration.enabled = false;
                }
            }
            apply_visibility(&mut rule, &self.registered);
            if rule.inherited && !has_any_visible_declarations(&rule) {
                continue;
            }
            rules.push(rule);
        }

        if let Some(max_id) = seen_declarations.iter().max() {
            let above = max_id.0.checked_add(1);
            self.next_declaration_id = self
                .next_declaration_id
                .zip(above)
                .map(|(next, above_max)| next.max(above_max));
        }
        self.pseudo_element_types = rules
            .iter()
            .filter(|rule| !rule.pseudo_element.is_empty() && !rule.inherited)
            .map(|rule| rule.pseudo_element.clone())
            .collect();
        self.rules = rules;
        self.overrides
            .retain(|pseudo, _| pseudo.is_empty() || self.pseudo_element_types.contains(pseudo));
        self.variables.retain_pseudos(&self.pseudo_element_types);
        debug!(
            target: "rule_view",
            "populated {} rules, pseudo-elements {:?}",
            self.rules.len(),
            self.pseudo_element_types
        );

        Ok(Some(self.on_rule_updated()))
    }

    /// Recompute overrides for the element and then for each of its pseudo-elements.
    pub fn on_rule_updated(&mut self) -> RefreshList {
        let mut refresh = self.update_declarations("");
        let pseudos: Vec<String> = self.pseudo_element_types.iter().cloned().collect();
        for pseudo in &pseudos {
            refresh.extend(self.update_declarations(pseudo));
        }
        refresh
    }

    /// Run one override pass for `pseudo` (`""` for the element itself).
    pub fn update_declarations(&mut self, pseudo: &str) -> RefreshList {
        let stream = declarations_for(&self.rules, pseudo);
        let mut collector = self.variables.collector(pseudo);
        let prior = self.overrides.remove(pseudo).unwrap_or_default();
        let pass = resolve_overrides(&stream, &prior, &mut collector);
        let changes = self.variables.commit(pseudo, collector);
        let refresh = refresh_after_pass(&stream, &pass, &changes);
        debug!(
            target: "rule_view",
            "pass {pseudo:?}: {} declarations, {} to refresh",
            stream.len(),
            refresh.len()
        );
        self.overrides.insert(pseudo.to_owned(), pass.snapshot);
        refresh
    }

    /// Replace the registered custom properties of the target.
    pub fn set_registered_properties(&mut self, registered: RegisteredProperties) -> RefreshList {
        let changed = changed_registrations(&self.registered, &registered);
        self.registered = registered;
        for rule in &mut self.rules {
            apply_visibility(rule, &self.registered);
        }
        let mut refresh = self.on_rule_updated();
        refresh.extend(self.on_registered_properties_change(&changed));
        refresh
    }

    /// Declarations whose value uses one of the registered properties in `names`.
    pub fn on_registered_properties_change(&self, names: &BTreeSet<String>) -> RefreshList {
        refresh_for_variables(&self.rules, names)
    }

    pub fn config(&self) -> RuleViewConfig {
        self.config
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules as presented: pseudo-element rules, grouped by pseudo-element, in front of the
    /// element's own rules, and likewise within the inherited rules. Overrides are always
    /// resolved in cascade order; this order is only for display.
    pub fn display_rules(&self) -> Vec<&Rule> {
        let mut sorted: Vec<&Rule> = self.rules.iter().collect();
        sorted.sort_by(|left, right| {
            (left.inherited, left.pseudo_element.is_empty(), &left.pseudo_element).cmp(&(
                right.inherited,
                right.pseudo_element.is_empty(),
                &right.pseudo_element,
            ))
        });
        sorted
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn pseudo_element_types(&self) -> &BTreeSet<String> {
        &self.pseudo_element_types
    }

    pub fn registered_properties(&self) -> &RegisteredProperties {
        &self.registered
    }

    /// The pass a declaration is shown with: its rule's pseudo-element, or the element's
    /// own pass for element rules, nested declarations and inherited pseudo-element rules.
    fn home_pass(&self, id: DeclarationId) -> &str {
        self.rules
            .iter()
            .find(|rule| rule.declaration(id).is_some())
            .filter(|rule| !rule.inherited && !rule.nested_declarations)
            .map_or("", |rule| rule.pseudo_element.as_str())
    }

    /// Whether the declaration is overridden in the pass it is shown with.
    pub fn is_overridden(&self, id: DeclarationId) -> bool {
        self.is_overridden_in(id, self.home_pass(id))
    }

    /// Whether the declaration is overridden in the pass for `pseudo`.
    pub fn is_overridden_in(&self, id: DeclarationId, pseudo: &str) -> bool {
        self.overrides
            .get(pseudo)
            .is_some_and(|snapshot| snapshot.is_overridden(id))
    }

    pub fn is_computed_overridden(&self, key: ComputedKey) -> bool {
        self.overrides
            .get(self.home_pass(key.declaration))
            .is_some_and(|snapshot| snapshot.is_computed_overridden(key))
    }

    pub fn variable_data(&self, name: &str, pseudo: &str) -> VariableData {
        self.variables.variable_data(name, pseudo, &self.registered)
    }

    pub fn all_custom_properties(&self, pseudo: &str) -> CustomProperties {
        self.variables
            .all_custom_properties(pseudo, &self.registered)
    }

    /// `value` with every `var()` substituted by the effective values on `pseudo`.
    pub fn preview_value(&self, value: &str, pseudo: &str) -> String {
        resolve_vars_in_value(value, &self.all_custom_properties(pseudo))
    }

    /// Enable or disable a declaration. The choice survives repopulating.
    ///
    /// # Errors
    /// Returns an error if the rule or declaration does not exist.
    pub fn toggle_declaration(
        &mut self,
        rule_id: RuleId,
        declaration_id: DeclarationId,
    ) -> Result<RefreshList> {
        let declaration = find_declaration_mut(&mut self.rules, rule_id, declaration_id)?;
        declaration.enabled = !declaration.enabled;
        if declaration.enabled {
            self.disabled.remove(&declaration_id);
        } else {
            self.disabled.insert(declaration_id);
        }
        Ok(self.refresh_with(&[declaration_id]))
    }

    /// Set a declaration's value from user input. The input may carry `!important` and
    /// further declarations, which are inserted right after the edited one.
    ///
    /// # Errors
    /// Returns an error if the rule or declaration does not exist, or if the text adds
    /// declarations and no declaration ids are left.
    pub fn modify_declaration_value(
        &mut self,
        rule_id: RuleId,
        declaration_id: DeclarationId,
        text: &str,
    ) -> Result<RefreshList> {
        let parsed = parse_value_and_extras(text);
        let priority = Priority::from_important(parsed.important);
        let current = find_declaration(&self.rules, rule_id, declaration_id)?;
        if parsed.extras.is_empty()
            && current.value == parsed.value
            && current.priority == priority
        {
            return Ok(RefreshList::default());
        }
        let extras = self.build_declarations(rule_id, parsed.extras)?;
        let mut touched: Vec<DeclarationId> = extras.iter().map(|extra| extra.id).collect();
        touched.push(declaration_id);

        let rule = find_rule_mut(&mut self.rules, rule_id)?;
        let position = rule
            .declarations
            .iter()
            .position(|declaration| declaration.id == declaration_id)
            .ok_or_else(|| anyhow!("{declaration_id} is not in {rule_id}"))?;
        if let Some(declaration) = rule.declarations.get_mut(position) {
            let name = declaration.name.clone();
            declaration.set(&name, &parsed.value, priority, self.expander.as_ref());
            declaration.enabled = true;
        }
        let after = rule.declarations.split_off(position + 1);
        rule.declarations.extend(extras);
        rule.declarations.extend(after);
        apply_visibility(rule, &self.registered);
        self.disabled.remove(&declaration_id);
        Ok(self.refresh_with(&touched))
    }

    /// Rename a declaration from user input; only the first name typed is used.
    ///
    /// # Errors
    /// Returns an error if the rule or declaration does not exist.
    pub fn modify_declaration_name(
        &mut self,
        rule_id: RuleId,
        declaration_id: DeclarationId,
        text: &str,
    ) -> Result<RefreshList> {
        let name = parse_property_name(text);
        let current = find_declaration(&self.rules, rule_id, declaration_id)?;
        if name.is_empty() || current.name == name {
            return Ok(RefreshList::default());
        }
        let rule = find_rule_mut(&mut self.rules, rule_id)?;
        if let Some(declaration) = rule.declaration_mut(declaration_id) {
            let value = declaration.value.clone();
            let priority = declaration.priority;
            declaration.set(&name, &value, priority, self.expander.as_ref());
            declaration.enabled = true;
        }
        apply_visibility(rule, &self.registered);
        self.disabled.remove(&declaration_id);
        Ok(self.refresh_with(&[declaration_id]))
    }

    /// Append the declarations typed into a rule's new-declaration field.
    ///
    /// # Errors
    /// Returns an error if the rule does not exist or no declaration ids are left.
    pub fn add_new_declaration(&mut self, rule_id: RuleId, text: &str) -> Result<RefreshList> {
        let parsed = parse_declaration_list(text);
        if parsed.is_empty() {
            return Ok(RefreshList::default());
        }
        let added = self.build_declarations(rule_id, parsed)?;
        let touched: Vec<DeclarationId> = added.iter().map(|declaration| declaration.id).collect();
        let rule = find_rule_mut(&mut self.rules, rule_id)?;
        rule.declarations.extend(added);
        apply_visibility(rule, &self.registered);
        Ok(self.refresh_with(&touched))
    }

    /// Serializable view of the current state. With `pseudo`, only that target's custom
    /// properties are reported.
    pub fn report(&self, pseudo: Option<&str>) -> ElementStyleReport {
        let rules = self
            .display_rules()
            .into_iter()
            .map(|rule| RuleReport {
                id: rule.id,
                origin: rule.origin.clone(),
                pseudo_element: rule.pseudo_element.clone(),
                inherited: rule.inherited,
                starting_style: rule.starting_style,
                declarations: rule
                    .declarations
                    .iter()
                    .map(|declaration| self.declaration_report(declaration))
                    .collect(),
            })
            .collect();
        let targets: Vec<&str> = match pseudo {
            Some(only) => vec![only],
            None => iter::once("")
                .chain(self.pseudo_element_types.iter().map(String::as_str))
                .collect(),
        };
        let variables: BTreeMap<String, CustomProperties> = targets
            .into_iter()
            .map(|target| (target.to_owned(), self.all_custom_properties(target)))
            .collect();
        ElementStyleReport { rules, variables }
    }

    fn declaration_report(&self, declaration: &Declaration) -> DeclarationReport {
        DeclarationReport {
            id: declaration.id,
            name: declaration.name.clone(),
            value: declaration.value.clone(),
            important: declaration.priority.is_important(),
            enabled: declaration.enabled,
            valid: declaration.valid,
            overridden: self.is_overridden(declaration.id),
            computed: declaration
                .computed
                .iter()
                .zip(declaration.computed_keys())
                .map(|(property, key)| ComputedReport {
                    name: property.name.clone(),
                    value: property.value.clone(),
                    overridden: self.is_computed_overridden(key),
                })
                .collect(),
            used_variables: declaration.used_variables.clone(),
        }
    }

    /// Build declarations for user input added to `rule_id`, with fresh ids.
    fn build_declarations(
        &mut self,
        rule_id: RuleId,
        parsed: Vec<css_syntax::Declaration>,
    ) -> Result<Vec<Declaration>> {
        let inherited = self
            .rule(rule_id)
            .ok_or_else(|| anyhow!("unknown {rule_id}"))?
            .inherited;
        if parsed.is_empty() {
            return Ok(Vec::new());
        }
        let count = parsed.len() as u64;
        let first = self
            .next_declaration_id
            .filter(|first| first.checked_add(count - 1).is_some())
            .ok_or_else(|| anyhow!("no declaration ids left for {count} new declarations"))?;
        let built = parsed
            .into_iter()
            .enumerate()
            .map(|(offset, item)| {
                let mut declaration = Declaration::new(
                    DeclarationId(first + offset as u64),
                    &item.name,
                    &item.value,
                    Priority::from_important(item.important),
                    self.expander.as_ref(),
                );
                declaration.invisible =
                    inherited && is_non_inheriting(&self.registered, &item.name);
                declaration
            })
            .collect();
        self.next_declaration_id = first.checked_add(count);
        Ok(built)
    }

    /// Rerun every pass after an edit; the edited declarations always need a redraw.
    fn refresh_with(&mut self, touched: &[DeclarationId]) -> RefreshList {
        let mut refresh = self.on_rule_updated();
        for &id in touched {
            refresh.insert(id);
        }
        refresh
    }
}

fn find_rule_mut(rules: &mut [Rule], rule_id: RuleId) -> Result<&mut Rule> {
    rules
        .iter_mut()
        .find(|rule| rule.id == rule_id)
        .ok_or_else(|| anyhow!("unknown {rule_id}"))
}

fn find_declaration(
    rules: &[Rule],
    rule_id: RuleId,
    declaration_id: DeclarationId,
) -> Result<&Declaration> {
    rules
        .iter()
        .find(|rule| rule.id == rule_id)
        .ok_or_else(|| anyhow!("unknown {rule_id}"))?
        .declaration(declaration_id)
        .ok_or_else(|| anyhow!("{declaration_id} is not in {rule_id}"))
}

fn find_declaration_mut(
    rules: &mut [Rule],
    rule_id: RuleId,
    declaration_id: DeclarationId,
) -> Result<&mut Declaration> {
    find_rule_mut(rules, rule_id)?
        .declaration_mut(declaration_id)
        .ok_or_else(|| anyhow!("{declaration_id} is not in {rule_id}"))
}
