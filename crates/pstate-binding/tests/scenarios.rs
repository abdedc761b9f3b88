//! End-to-end binding scenarios: markup, user input, reload, restore.

use pstate_binding::{is_bound, CapabilityConfig, Config, Page, CONTROL_BOUND_EVENT};
use pstate_dom::interact::{choose_option, pick_radio, set_hidden_value, toggle_checkbox, type_text};
use pstate_dom::{DomEvent, DomEventType, DomTree, NodeId};
use pstate_storage::{KeyValueStore, StorageScope};
use serde_json::{json, Value};

type Markup<'a> = &'a [(&'a str, &'a [(&'a str, &'a str)])];

/// Build `<persistent-state attrs>controls</persistent-state>` and connect it
fn mount(page: &mut Page, attrs: &[(&str, &str)], controls: Markup<'_>) -> (NodeId, Vec<NodeId>) {
    let container = page.create_element_with("persistent-state", attrs);
    let mut nodes = Vec::new();
    for (tag, control_attrs) in controls {
        let node = page.create_element_with(tag, control_attrs);
        page.tree_mut().append_child(container, node);
        nodes.push(node);
    }
    let body = page.body();
    page.append_child(body, container).unwrap();
    (container, nodes)
}

fn select_with(page: &mut Page, id: &str, options: &[&str]) -> NodeId {
    let select = page.create_element_with("select", &[("id", id)]);
    for &value in options {
        let option = page.create_element_with("option", &[("value", value)]);
        let text = page.document_mut().create_text(value);
        page.tree_mut().append_child(option, text);
        page.tree_mut().append_child(select, option);
    }
    select
}

fn entries(page: &Page, scope: StorageScope) -> Vec<(String, String)> {
    page.store().borrow().entries(scope)
}

fn entry(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

fn json_counter(page: &Page) {
    page.register_custom_capability(
        CapabilityConfig::new("json-wc", "json-wc::click", "state", |e| {
            e.detail_field("state").cloned().unwrap_or(Value::Null)
        })
        .json(true),
    );
}

#[test]
fn test_text_input_in_global_namespace() {
    let mut page = Page::open(Config::default()).unwrap();
    let (_, nodes) = mount(&mut page, &[("type", "")], &[("input", &[("id", "x")])]);
    page.document_ready().unwrap();

    type_text(page.tree_mut(), nodes[0], "hello");

    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![entry("PersistentStateRegistry::[GLOBAL]::INPUT#x", "hello")]
    );
    assert!(entries(&page, StorageScope::Session).is_empty());
}

#[test]
fn test_session_checkbox_uses_ordinal() {
    let mut page = Page::open(Config::default()).unwrap();
    let (_, nodes) = mount(
        &mut page,
        &[("id", "c"), ("type", "session")],
        &[("input", &[("type", "text")]), ("input", &[("type", "checkbox")])],
    );
    page.document_ready().unwrap();

    toggle_checkbox(page.tree_mut(), nodes[1]);
    assert_eq!(
        entries(&page, StorageScope::Session),
        vec![entry("PersistentStateRegistry::[c]::INPUT#1", "true")]
    );

    toggle_checkbox(page.tree_mut(), nodes[1]);
    assert_eq!(
        entries(&page, StorageScope::Session),
        vec![entry("PersistentStateRegistry::[c]::INPUT#1", "false")]
    );
    assert!(entries(&page, StorageScope::Durable).is_empty());
}

#[test]
fn test_radio_group_round_trip() {
    let radios: Markup<'_> = &[
        ("input", &[("type", "radio"), ("name", "g"), ("value", "a"), ("checked", "")]),
        ("input", &[("type", "radio"), ("name", "g"), ("value", "b")]),
    ];

    let mut page = Page::open(Config::default()).unwrap();
    let (_, nodes) = mount(&mut page, &[("key", "k")], radios);
    page.document_ready().unwrap();
    pick_radio(page.tree_mut(), nodes[1]);
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![entry("PersistentStateRegistry::[k]::INPUT[name=g]", "b")]
    );

    let mut page = page.reload().unwrap();
    let (_, nodes) = mount(&mut page, &[("key", "k")], radios);
    page.document_ready().unwrap();
    assert!(!page.tree().checked(nodes[0]));
    assert!(page.tree().checked(nodes[1]));
}

#[test]
fn test_json_custom_control_round_trip() {
    let mut page = Page::open(Config::default()).unwrap();
    json_counter(&page);
    let (_, nodes) = mount(&mut page, &[], &[("json-wc", &[])]);
    page.document_ready().unwrap();

    let event = DomEvent::custom("json-wc::click", nodes[0], Some(json!({ "state": { "count": 1 } })));
    page.tree().dispatch_event(event);
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![entry("PersistentStateRegistry::[GLOBAL]::JSON-WC#0", r#"{"count":1}"#)]
    );

    let mut page = page.reload().unwrap();
    json_counter(&page);
    let (_, nodes) = mount(&mut page, &[], &[("json-wc", &[])]);
    assert_eq!(page.tree().property(nodes[0], "state"), Some(&json!({ "count": 1 })));
}

#[test]
fn test_duplicate_discovery_binds_once() {
    let mut page = Page::open(Config::default()).unwrap();
    let (container, nodes) = mount(&mut page, &[], &[("input", &[("id", "x")])]);

    let binds = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = binds.clone();
    page.tree_mut().add_event_listener(
        container,
        DomEventType::parse(CONTROL_BOUND_EVENT),
        std::rc::Rc::new(move |_: &mut DomEvent, _: &DomTree| counter.set(counter.get() + 1)),
    );

    page.document_ready().unwrap();
    assert_eq!(page.tree().listener_count(nodes[0], &DomEventType::Input), 1);
    assert_eq!(binds.get(), 0, "second pass found nothing new");
    assert_eq!(page.container(container).unwrap().bound().len(), 1);
}

#[test]
fn test_removed_controls_release_their_watches() {
    let mut page = Page::open(Config::default()).unwrap();
    let (container, nodes) = mount(
        &mut page,
        &[],
        &[("input", &[("id", "x")]), ("input", &[("type", "hidden"), ("id", "h")])],
    );
    page.document_ready().unwrap();
    assert_eq!(page.tree().observer_count(nodes[1]), 1);

    let body = page.body();
    assert!(page.remove_child(body, container).unwrap());
    assert_eq!(page.tree().listener_count(nodes[0], &DomEventType::Input), 0);
    assert_eq!(page.tree().observer_count(nodes[1]), 0);

    type_text(page.tree_mut(), nodes[0], "lost");
    set_hidden_value(page.tree_mut(), nodes[1], "lost");
    assert!(entries(&page, StorageScope::Durable).is_empty());
}

#[test]
fn test_nested_containers_bind_control_once() {
    let mut page = Page::open(Config::default()).unwrap();
    let outer = page.create_element_with("persistent-state", &[("key", "outer")]);
    let inner = page.create_element_with("persistent-state", &[("key", "inner")]);
    let input = page.create_element_with("input", &[("id", "x")]);
    page.tree_mut().append_child(inner, input);
    page.tree_mut().append_child(outer, inner);
    let body = page.body();
    page.append_child(body, outer).unwrap();
    page.document_ready().unwrap();

    assert_eq!(page.container(outer).unwrap().bound().len(), 1);
    assert_eq!(page.container(inner).unwrap().bound().len(), 0);

    type_text(page.tree_mut(), input, "v");
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![entry("PersistentStateRegistry::[outer]::INPUT#x", "v")]
    );
}

#[test]
fn test_checkbox_restores_only_from_true() {
    let mut page = Page::open(Config::default()).unwrap();
    page.store().borrow_mut().area_mut().scope_mut(StorageScope::Durable)
        .set_item("PersistentStateRegistry::[GLOBAL]::INPUT#a", "1");
    page.store().borrow_mut().area_mut().scope_mut(StorageScope::Durable)
        .set_item("PersistentStateRegistry::[GLOBAL]::INPUT#b", "true");

    let (_, nodes) = mount(
        &mut page,
        &[],
        &[
            ("input", &[("type", "checkbox"), ("id", "a"), ("checked", "")]),
            ("input", &[("type", "checkbox"), ("id", "b")]),
            ("input", &[("type", "checkbox"), ("id", "c"), ("checked", "")]),
        ],
    );
    assert!(!page.tree().checked(nodes[0]));
    assert!(page.tree().checked(nodes[1]));
    assert!(!page.tree().checked(nodes[2]), "absent entry unchecks");
}

#[test]
fn test_key_change_restores_from_new_namespace() {
    let mut page = Page::open(Config::default()).unwrap();
    page.store().borrow_mut().area_mut().scope_mut(StorageScope::Durable)
        .set_item("PersistentStateRegistry::[second]::INPUT#x", "from second");

    let (container, nodes) = mount(&mut page, &[("key", "first")], &[("input", &[("id", "x")])]);
    page.document_ready().unwrap();
    type_text(page.tree_mut(), nodes[0], "a");

    page.set_attribute(container, "key", "second").unwrap();
    assert_eq!(page.tree().value(nodes[0]), "from second");

    type_text(page.tree_mut(), nodes[0], "!");
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![
            entry("PersistentStateRegistry::[first]::INPUT#x", "a"),
            entry("PersistentStateRegistry::[second]::INPUT#x", "from second!"),
        ]
    );
}

#[test]
fn test_removing_key_falls_back_to_id_namespace() {
    let mut page = Page::open(Config::default()).unwrap();
    page.store().borrow_mut().area_mut().scope_mut(StorageScope::Durable)
        .set_item("PersistentStateRegistry::[form]::INPUT#x", "from id");

    let (container, nodes) = mount(
        &mut page,
        &[("id", "form"), ("key", "k")],
        &[("input", &[("id", "x")])],
    );
    page.document_ready().unwrap();
    assert_eq!(page.tree().value(nodes[0]), "");

    page.remove_attribute(container, "key").unwrap();
    assert_eq!(page.tree().value(nodes[0]), "from id");

    type_text(page.tree_mut(), nodes[0], "?");
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![entry("PersistentStateRegistry::[form]::INPUT#x", "from id?")]
    );
}

#[test]
fn test_custom_control_hears_events_from_its_children() {
    let mut page = Page::open(Config::default()).unwrap();
    page.register_custom_capability(CapabilityConfig::new("x-wrap", "x-wrap::change", "value", |e| {
        e.detail_field("v").cloned().unwrap_or(Value::Null)
    }));
    let (_, nodes) = mount(&mut page, &[], &[("x-wrap", &[("id", "w")])]);
    let button = page.create_element_with("button", &[]);
    page.append_child(nodes[0], button).unwrap();
    page.document_ready().unwrap();

    let event = DomEvent::custom("x-wrap::change", button, Some(json!({ "v": "hi" })));
    page.tree().dispatch_event(event);
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![entry("PersistentStateRegistry::[GLOBAL]::X-WRAP#w", "hi")]
    );
}

#[test]
fn test_late_controls_bound_on_document_ready() {
    let mut page = Page::open(Config::default()).unwrap();
    let (container, _) = mount(&mut page, &[], &[]);
    json_counter(&page);

    let late = page.create_element_with("textarea", &[]);
    page.tree_mut().append_child(container, late);
    let widget = page.create_element_with("json-wc", &[]);
    page.tree_mut().append_child(container, widget);
    assert!(!is_bound(page.tree(), late));

    assert_eq!(page.document_ready().unwrap(), 2);
    assert!(is_bound(page.tree(), late));
    assert!(is_bound(page.tree(), widget));
    assert_eq!(page.document_ready().unwrap(), 0);
}

#[test]
fn test_container_after_ready_gets_single_pass() {
    let mut page = Page::open(Config::default()).unwrap();
    page.document_ready().unwrap();
    let (container, _) = mount(&mut page, &[], &[("input", &[])]);

    let container = page.container(container).unwrap();
    assert_eq!(container.bound().len(), 1);
    assert_eq!(container.phase(), pstate_binding::DiscoveryPhase::Settled);
}

#[test]
fn test_select_textarea_hidden_round_trip() {
    let mut page = Page::open(Config::default()).unwrap();
    let select = select_with(&mut page, "s", &["Banana", "Taco"]);
    let area = page.create_element_with("textarea", &[("id", "notes")]);
    let hidden = page.create_element_with("input", &[("type", "hidden"), ("id", "h")]);
    let container = page.create_element_with("persistent-state", &[("key", "forms")]);
    for node in [select, area, hidden] {
        page.tree_mut().append_child(container, node);
    }
    let body = page.body();
    page.append_child(body, container).unwrap();
    page.document_ready().unwrap();

    choose_option(page.tree_mut(), select, "Taco");
    type_text(page.tree_mut(), area, "ok");
    set_hidden_value(page.tree_mut(), hidden, "secret");
    assert_eq!(
        entries(&page, StorageScope::Durable),
        vec![
            entry("PersistentStateRegistry::[forms]::INPUT#h", "secret"),
            entry("PersistentStateRegistry::[forms]::SELECT#s", "Taco"),
            entry("PersistentStateRegistry::[forms]::TEXTAREA#notes", "ok"),
        ]
    );

    let mut page = page.reload().unwrap();
    let select = select_with(&mut page, "s", &["Banana", "Taco"]);
    let area = page.create_element_with("textarea", &[("id", "notes")]);
    let hidden = page.create_element_with("input", &[("type", "hidden"), ("id", "h")]);
    let container = page.create_element_with("persistent-state", &[("key", "forms")]);
    for node in [select, area, hidden] {
        page.tree_mut().append_child(container, node);
    }
    let body = page.body();
    page.append_child(body, container).unwrap();

    assert_eq!(page.tree().value(select), "Taco");
    assert_eq!(page.tree().value(area), "ok");
    assert_eq!(page.tree().value(hidden), "secret");
    assert_eq!(entries(&page, StorageScope::Durable).len(), 3);
}

#[test]
fn test_durable_file_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().with_durable_path(dir.path().join("state.json"));

    {
        let mut page = Page::open(config.clone()).unwrap();
        let (_, nodes) = mount(&mut page, &[("id", "profile")], &[("input", &[("id", "name")])]);
        type_text(page.tree_mut(), nodes[0], "Ada\nLovelace");
    }

    let mut page = Page::open(config).unwrap();
    let (_, nodes) = mount(&mut page, &[("id", "profile")], &[("input", &[("id", "name")])]);
    assert_eq!(page.tree().value(nodes[0]), "Ada\nLovelace");
}

#[test]
fn test_session_scope_lost_on_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default().with_durable_path(dir.path().join("state.json"));

    {
        let mut page = Page::open(config.clone()).unwrap();
        let (_, nodes) = mount(&mut page, &[("type", "session")], &[("input", &[("id", "x")])]);
        type_text(page.tree_mut(), nodes[0], "gone");
    }

    let mut page = Page::open(config).unwrap();
    let (_, nodes) = mount(&mut page, &[("type", "session")], &[("input", &[("id", "x")])]);
    assert_eq!(page.tree().value(nodes[0]), "");
}

#[test]
fn test_reset_and_reset_all() {
    let mut page = Page::open(Config::default()).unwrap();
    let (first, a) = mount(&mut page, &[("id", "one")], &[("input", &[("id", "x")])]);
    let (_, b) = mount(&mut page, &[("id", "two"), ("type", "session")], &[("input", &[("id", "x")])]);
    page.store().borrow_mut().area_mut().scope_mut(StorageScope::Durable).set_item("foreign", "kept");

    type_text(page.tree_mut(), a[0], "1");
    type_text(page.tree_mut(), b[0], "2");

    assert_eq!(page.reset(first), 1);
    assert_eq!(entries(&page, StorageScope::Durable), vec![entry("foreign", "kept")]);
    assert_eq!(entries(&page, StorageScope::Session).len(), 1);

    type_text(page.tree_mut(), a[0], "3");
    assert_eq!(page.reset_all(), 2);
    assert_eq!(entries(&page, StorageScope::Durable), vec![entry("foreign", "kept")]);
    assert!(entries(&page, StorageScope::Session).is_empty());
}

#[test]
fn test_custom_config_prefix_and_global_id() {
    let config = Config::from_json(r#"{ "prefix": "app", "global_instance_id": "*" }"#).unwrap();
    let mut page = Page::open(config).unwrap();
    let (_, nodes) = mount(&mut page, &[], &[("input", &[])]);
    type_text(page.tree_mut(), nodes[0], "z");
    assert_eq!(entries(&page, StorageScope::Durable), vec![entry("app::[*]::INPUT#0", "z")]);
}
