#![cfg(test)]
#![allow(
    clippy::missing_panics_doc,
    reason = "Assertions in tests are expected"
)]
#![allow(
    clippy::unwrap_used,
    reason = "Test code may use unwrap for simplicity"
)]
#![allow(
    clippy::assertions_on_result_states,
    reason = "Tests only care that bad ids are rejected"
)]

use css_cascade::{DeclarationId, RuleId, ShorthandExpander};
use css_orchestrator::{
    ElementStyle, Fixture, RefreshList, RuleEntry, RuleViewConfig, participates,
};
use css_variables::{RegisteredProperty, registry_from};
use serde_json::{from_str, json, to_value};

#[allow(
    clippy::let_underscore_must_use,
    reason = "A logger may already be installed by another test"
)]
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn populated(entries: Vec<RuleEntry>) -> (ElementStyle, RefreshList) {
    init_logging();
    let mut style = ElementStyle::default();
    let token = style.begin_populate();
    let refresh = style.populate(token, entries).unwrap().unwrap();
    (style, refresh)
}

fn repopulate(style: &mut ElementStyle, entries: Vec<RuleEntry>) -> RefreshList {
    let token = style.begin_populate();
    style.populate(token, entries).unwrap().unwrap()
}

const fn decl(id: u64) -> DeclarationId {
    DeclarationId(id)
}

#[test]
fn element_and_pseudo_elements_are_resolved_separately() {
    let (style, refresh) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "red", false),
        RuleEntry::new(2).declare(2, "color", "blue", false),
        RuleEntry::new(3).pseudo("::before").declare(3, "color", "green", false),
    ]);
    assert_eq!(
        style.pseudo_element_types().iter().collect::<Vec<_>>(),
        vec!["::before"]
    );
    assert!(!style.is_overridden(decl(1)));
    assert!(style.is_overridden(decl(2)));
    assert!(!style.is_overridden(decl(3)));
    assert!(refresh.contains(decl(2)));
    assert!(!refresh.contains(decl(1)));
}

#[test]
fn pseudo_elements_see_variables_defined_on_the_element() {
    let (style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "--accent", "blue", false),
        RuleEntry::new(2)
            .pseudo("::before")
            .declare(2, "border-color", "var(--accent)", false),
    ]);
    let before = style.all_custom_properties("::before");
    assert_eq!(before.get("--accent").map(String::as_str), Some("blue"));
    assert_eq!(
        style.preview_value("1px solid var(--accent)", "::before"),
        "1px solid blue"
    );
    assert_eq!(
        style.variable_data("--accent", "").value.as_deref(),
        Some("blue")
    );
}

#[test]
fn stale_populate_is_discarded() {
    init_logging();
    let mut style = ElementStyle::default();
    let stale = style.begin_populate();
    let current = style.begin_populate();

    let result = style
        .populate(stale, vec![RuleEntry::new(1).declare(1, "color", "red", false)])
        .unwrap();
    assert!(result.is_none());
    assert!(style.rules().is_empty());

    let result = style
        .populate(current, vec![RuleEntry::new(2).declare(2, "color", "blue", false)])
        .unwrap();
    assert!(result.is_some());
    assert!(style.rule(RuleId(2)).is_some());
}

#[test]
fn toggling_a_declaration_refreshes_the_one_it_shadowed() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "red", false),
        RuleEntry::new(2).declare(2, "color", "blue", false),
    ]);
    let refresh = style.toggle_declaration(RuleId(1), decl(1)).unwrap();
    assert!(refresh.contains(decl(1)));
    assert!(refresh.contains(decl(2)));
    assert!(!style.is_overridden(decl(2)));

    let refresh = style.toggle_declaration(RuleId(1), decl(1)).unwrap();
    assert!(refresh.contains(decl(2)));
    assert!(style.is_overridden(decl(2)));
}

#[test]
fn disabled_declarations_stay_disabled_after_repopulating() {
    let entries = || {
        vec![
            RuleEntry::new(1).declare(1, "color", "red", false),
            RuleEntry::new(2).declare(2, "color", "blue", false),
        ]
    };
    let (mut style, _) = populated(entries());
    style.toggle_declaration(RuleId(1), decl(1)).unwrap();

    repopulate(&mut style, entries());
    let declaration = style.rule(RuleId(1)).unwrap().declaration(decl(1)).unwrap();
    assert!(!declaration.enabled);
    assert!(!style.is_overridden(decl(2)));
}

#[test]
fn changing_a_variable_refreshes_its_users() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1)
            .declare(1, "--size", "1px", false)
            .declare(2, "width", "var(--size)", false),
        RuleEntry::new(2).declare(3, "height", "5px", false),
    ]);
    let refresh = style
        .modify_declaration_value(RuleId(1), decl(1), "2px")
        .unwrap();
    assert!(refresh.contains(decl(1)));
    assert!(refresh.contains(decl(2)));
    assert!(!refresh.contains(decl(3)));
    assert_eq!(style.preview_value("var(--size)", ""), "2px");
}

#[test]
fn unchanged_value_is_a_no_op() {
    let (mut style, _) = populated(vec![RuleEntry::new(1).declare(1, "color", "red", false)]);
    let refresh = style
        .modify_declaration_value(RuleId(1), decl(1), " red ")
        .unwrap();
    assert!(refresh.is_empty());
}

#[test]
fn modified_value_may_carry_priority_and_more_declarations() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "blue", false),
        RuleEntry::new(2).declare(2, "color", "green", true),
    ]);
    assert!(style.is_overridden(decl(1)));

    let refresh = style
        .modify_declaration_value(RuleId(1), decl(1), "red !important; width: 2px")
        .unwrap();
    let rule = style.rule(RuleId(1)).unwrap();
    let names: Vec<&str> = rule
        .declarations
        .iter()
        .map(|declaration| declaration.name.as_str())
        .collect();
    assert_eq!(names, vec!["color", "width"]);
    assert!(rule.declarations[0].priority.is_important());
    assert_eq!(rule.declarations[0].value, "red");
    assert!(refresh.contains(rule.declarations[1].id));
    assert!(!style.is_overridden(decl(1)));
    assert!(style.is_overridden(decl(2)));
}

#[test]
fn renaming_a_declaration_releases_the_old_property() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "red", false),
        RuleEntry::new(2).declare(2, "color", "blue", false),
    ]);
    let refresh = style
        .modify_declaration_name(RuleId(1), decl(1), "Background-Color: ")
        .unwrap();
    assert_eq!(
        style.rule(RuleId(1)).unwrap().declarations[0].name,
        "background-color"
    );
    assert!(refresh.contains(decl(1)));
    assert!(refresh.contains(decl(2)));
    assert!(!style.is_overridden(decl(2)));
}

#[test]
fn new_declarations_get_fresh_ids_and_take_effect() {
    let (mut style, _) = populated(vec![RuleEntry::new(1).declare(7, "color", "red", false)]);
    let refresh = style
        .add_new_declaration(RuleId(1), "color: blue !important; width: 1px")
        .unwrap();
    let ids: Vec<DeclarationId> = style
        .rule(RuleId(1))
        .unwrap()
        .declarations
        .iter()
        .map(|declaration| declaration.id)
        .collect();
    assert_eq!(ids, vec![decl(7), decl(8), decl(9)]);
    assert!(style.is_overridden(decl(7)));
    assert!(!style.is_overridden(decl(8)));
    for id in [7, 8, 9] {
        assert!(refresh.contains(decl(id)));
    }

    assert!(style.add_new_declaration(RuleId(1), "   ").unwrap().is_empty());
}

#[test]
fn unknown_ids_are_errors() {
    let (mut style, _) = populated(vec![RuleEntry::new(1).declare(1, "color", "red", false)]);
    assert!(style.toggle_declaration(RuleId(9), decl(1)).is_err());
    assert!(style.toggle_declaration(RuleId(1), decl(9)).is_err());
    assert!(
        style
            .modify_declaration_value(RuleId(1), decl(9), "blue")
            .is_err()
    );
    assert!(
        style
            .modify_declaration_name(RuleId(9), decl(1), "width")
            .is_err()
    );
    assert!(style.add_new_declaration(RuleId(9), "width: 1px").is_err());
}

#[test]
fn duplicate_declaration_ids_are_rejected_without_side_effects() {
    init_logging();
    let mut style = ElementStyle::default();
    let token = style.begin_populate();
    let result = style.populate(
        token,
        vec![
            RuleEntry::new(1).declare(1, "color", "red", false),
            RuleEntry::new(2).declare(1, "width", "1px", false),
        ],
    );
    assert!(result.is_err());
    assert!(style.rules().is_empty());
}

#[test]
fn non_inheriting_registered_properties_hide_inherited_values() {
    let entries = || {
        vec![
            RuleEntry::new(1).declare(1, "color", "red", false),
            RuleEntry::new(2).inherited().declare(2, "--theme", "dark", false),
        ]
    };
    let (mut style, _) = populated(entries());
    assert_eq!(
        style.all_custom_properties("").get("--theme").map(String::as_str),
        Some("dark")
    );

    style.set_registered_properties(registry_from([RegisteredProperty {
        name: "--theme".to_owned(),
        syntax: "*".to_owned(),
        initial_value: Some("light".to_owned()),
        inherits: false,
    }]));
    assert_eq!(
        style.all_custom_properties("").get("--theme").map(String::as_str),
        Some("light")
    );
    let data = style.variable_data("--theme", "");
    assert_eq!(data.value, None);
    assert!(data.registered_property.is_some());

    repopulate(&mut style, entries());
    assert!(style.rule(RuleId(2)).is_none());
}

#[test]
fn registration_changes_refresh_declarations_using_them() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1)
            .declare(1, "color", "var(--brand)", false)
            .declare(2, "width", "1px", false),
    ]);
    let refresh = style.set_registered_properties(registry_from([RegisteredProperty {
        name: "--brand".to_owned(),
        syntax: "<color>".to_owned(),
        initial_value: Some("teal".to_owned()),
        inherits: true,
    }]));
    assert!(refresh.contains(decl(1)));
    assert!(!refresh.contains(decl(2)));
    assert_eq!(style.preview_value("var(--brand)", ""), "teal");
}

#[test]
fn inherited_rules_without_inherited_properties_are_dropped() {
    let (style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "red", false),
        RuleEntry::new(2).inherited().declare(2, "width", "1px", false),
        RuleEntry::new(3).inherited().declare(3, "color", "blue", false),
    ]);
    assert!(style.rule(RuleId(2)).is_none());
    assert!(style.rule(RuleId(3)).is_some());
    assert!(style.is_overridden(decl(3)));
}

#[test]
fn configuration_decides_which_rules_are_kept() {
    init_logging();
    let entries = || {
        let mut user_agent = RuleEntry::new(1).declare(1, "display", "block", false);
        user_agent.user_agent = true;
        let mut system = RuleEntry::new(2).declare(2, "color", "black", false);
        system.system = true;
        vec![
            user_agent,
            system,
            RuleEntry::new(3).inherited().declare(3, "color", "blue", false),
        ]
    };

    let mut style = ElementStyle::new(RuleViewConfig::default());
    repopulate(&mut style, entries());
    let ids: Vec<RuleId> = style.rules().iter().map(|rule| rule.id).collect();
    assert_eq!(ids, vec![RuleId(3)]);

    let mut style = ElementStyle::new(RuleViewConfig::new(true, false));
    repopulate(&mut style, entries());
    let ids: Vec<RuleId> = style.rules().iter().map(|rule| rule.id).collect();
    assert_eq!(ids, vec![RuleId(1)]);
}

#[test]
fn display_order_puts_pseudo_element_rules_first() {
    let (style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "red", false),
        RuleEntry::new(2).pseudo("::marker").declare(2, "color", "blue", false),
        RuleEntry::new(3).inherited().declare(3, "color", "green", false),
        RuleEntry::new(4).pseudo("::before").declare(4, "color", "black", false),
    ]);
    let ids: Vec<RuleId> = style.display_rules().iter().map(|rule| rule.id).collect();
    assert_eq!(ids, vec![RuleId(4), RuleId(2), RuleId(1), RuleId(3)]);
    let cascade: Vec<RuleId> = style.rules().iter().map(|rule| rule.id).collect();
    assert_eq!(cascade, vec![RuleId(1), RuleId(2), RuleId(3), RuleId(4)]);
}

#[test]
fn fixtures_deserialize_with_defaults_and_report_as_json() {
    init_logging();
    let fixture: Fixture = from_str(
        r#"{
            "registered_properties": [{ "name": "--gap", "initial_value": "4px" }],
            "rules": [
                {
                    "id": 1,
                    "origin": { "kind": "inline_style" },
                    "declarations": [{ "id": 1, "name": "COLOR", "value": " blue ", "important": true }]
                },
                {
                    "id": 2,
                    "origin": { "kind": "layered", "layer": "base" },
                    "declarations": [
                        { "id": 2, "name": "color", "value": "red", "important": true },
                        { "id": 3, "name": "gap", "value": "var(--gap)" }
                    ]
                }
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(fixture.rules[0].matched_selector_indexes, vec![0]);
    assert!(fixture.rules[0].declarations[0].enabled);

    let mut style = ElementStyle::default();
    style.set_registered_properties(registry_from(fixture.registered_properties));
    repopulate(&mut style, fixture.rules);

    let report = to_value(style.report(None)).unwrap();
    assert_eq!(report["rules"][0]["origin"], json!({ "kind": "inline_style" }));
    assert_eq!(report["rules"][0]["declarations"][0]["name"], json!("color"));
    assert_eq!(report["rules"][0]["declarations"][0]["value"], json!("blue"));
    assert_eq!(report["rules"][0]["declarations"][0]["overridden"], json!(false));
    assert_eq!(report["rules"][1]["declarations"][0]["overridden"], json!(true));
    assert_eq!(
        report["rules"][1]["declarations"][1]["computed"],
        json!([
            { "name": "row-gap", "value": "var(--gap)", "overridden": false },
            { "name": "column-gap", "value": "var(--gap)", "overridden": false }
        ])
    );
    assert_eq!(
        report["rules"][1]["declarations"][1]["used_variables"],
        json!(["--gap"])
    );
    assert_eq!(report["variables"][""]["--gap"], json!("4px"));
}

#[test]
fn semicolons_inside_strings_stay_in_the_edited_value() {
    let (mut style, _) = populated(vec![RuleEntry::new(1).declare(1, "content", "\"x\"", false)]);
    style
        .modify_declaration_value(RuleId(1), decl(1), "\"a;b\"")
        .unwrap();
    let rule = style.rule(RuleId(1)).unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].value, "\"a;b\"");
    assert!(rule.declarations[0].valid);

    style
        .modify_declaration_name(RuleId(1), decl(1), "background-image")
        .unwrap();
    style
        .modify_declaration_value(RuleId(1), decl(1), "url(\"a;b.png\"); width: 1px")
        .unwrap();
    let rule = style.rule(RuleId(1)).unwrap();
    assert_eq!(rule.declarations[0].value, "url(\"a;b.png\")");
    assert_eq!(rule.declarations[1].name, "width");
}

#[test]
fn declaration_ids_at_the_top_of_the_range() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1).declare(u64::MAX - 1, "color", "red", false),
    ]);
    style.add_new_declaration(RuleId(1), "width: 1px").unwrap();
    assert!(style.rule(RuleId(1)).unwrap().declaration(decl(u64::MAX)).is_some());

    let error = style
        .add_new_declaration(RuleId(1), "height: 1px")
        .unwrap_err();
    assert!(error.to_string().contains("no declaration ids left"));
    assert_eq!(style.rule(RuleId(1)).unwrap().declarations.len(), 2);
}

#[test]
fn populating_with_the_largest_id_keeps_edits_safe() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1).declare(u64::MAX, "color", "red", false),
    ]);
    assert!(!style.is_overridden(decl(u64::MAX)));

    let error = style
        .modify_declaration_value(RuleId(1), decl(u64::MAX), "blue; width: 1px")
        .unwrap_err();
    assert!(error.to_string().contains("no declaration ids left"));
    let rule = style.rule(RuleId(1)).unwrap();
    assert_eq!(rule.declarations.len(), 1);
    assert_eq!(rule.declarations[0].value, "red");
}

#[test]
fn nested_declarations_are_resolved_once_per_pass() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "blue", false),
        RuleEntry::new(2)
            .nested_declarations()
            .declare(2, "color", "red", false),
        RuleEntry::new(3).pseudo("::before").declare(3, "color", "green", false),
    ]);
    assert!(style.is_overridden(decl(2)));
    assert!(style.is_overridden_in(decl(2), ""));
    assert!(!style.is_overridden_in(decl(2), "::before"));

    assert!(style.on_rule_updated().is_empty());
    assert!(style.is_overridden(decl(2)));
}

#[test]
fn unmatched_rules_do_not_override() {
    let (style, _) = populated(vec![
        RuleEntry::new(1).unmatched().declare(1, "color", "red", false),
        RuleEntry::new(2).declare(2, "color", "blue", false),
    ]);
    assert!(!style.is_overridden(decl(2)));
    assert!(style.rule(RuleId(1)).is_some());
}

#[test]
fn keyframes_do_not_override() {
    let (style, _) = populated(vec![
        RuleEntry::new(1).keyframes().declare(1, "opacity", "0", false),
        RuleEntry::new(2).declare(2, "opacity", "1", false),
    ]);
    assert!(!style.is_overridden(decl(1)));
    assert!(!style.is_overridden(decl(2)));
}

#[test]
fn inherited_pseudo_element_rules_join_the_element_pass() {
    let (style, _) = populated(vec![
        RuleEntry::new(1).declare(1, "color", "red", false),
        RuleEntry::new(2)
            .pseudo("::before")
            .inherited()
            .declare(2, "color", "blue", false),
    ]);
    assert!(style.pseudo_element_types().is_empty());
    assert!(style.is_overridden(decl(2)));
    assert!(!style.is_overridden(decl(1)));
}

#[test]
fn starting_style_rules_feed_the_starting_style_variables() {
    let (mut style, _) = populated(vec![
        RuleEntry::new(1)
            .declare(1, "opacity", "1", false)
            .declare(4, "transition-duration", "var(--fade)", false),
        RuleEntry::new(2)
            .starting_style()
            .declare(2, "opacity", "0", false)
            .declare(3, "--fade", "0s", false),
    ]);
    assert!(style.is_overridden(decl(2)));
    assert!(!style.is_overridden(decl(3)));
    let data = style.variable_data("--fade", "");
    assert_eq!(data.value, None);
    assert_eq!(data.starting_style.as_deref(), Some("0s"));

    let refresh = style
        .modify_declaration_value(RuleId(2), decl(3), "1s")
        .unwrap();
    assert!(refresh.contains(decl(4)));
    assert!(!refresh.contains(decl(1)));
    assert_eq!(
        style.variable_data("--fade", "").starting_style.as_deref(),
        Some("1s")
    );
}

#[test]
fn which_rules_take_part_in_a_pass() {
    let rule = |entry: RuleEntry| entry.into_rule(&ShorthandExpander);

    let plain = rule(RuleEntry::new(1));
    assert!(participates(&plain, ""));
    assert!(!participates(&plain, "::before"));

    assert!(!participates(&rule(RuleEntry::new(2).unmatched()), ""));
    assert!(participates(&rule(RuleEntry::new(3).unmatched().inline_style()), ""));
    assert!(!participates(&rule(RuleEntry::new(4).keyframes()), ""));

    let nested = rule(RuleEntry::new(5).unmatched().nested_declarations());
    assert!(participates(&nested, ""));
    assert!(participates(&nested, "::marker"));

    let before = rule(RuleEntry::new(6).pseudo("::before"));
    assert!(!participates(&before, ""));
    assert!(participates(&before, "::before"));
    assert!(!participates(&before, "::after"));

    let inherited_before = rule(RuleEntry::new(7).pseudo("::before").inherited());
    assert!(participates(&inherited_before, ""));
    assert!(!participates(&inherited_before, "::before"));
}
