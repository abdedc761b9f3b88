//! Demo components
//!
//! Two custom elements that keep their value out of reach of plain
//! discovery and opt in through the capability registry instead:
//!
//! - `this-is-a-custom-wc`, a text field that reports typing through a
//!   custom event and receives restored text through `customValue`;
//! - `json-wc`, a click counter whose whole state is stored as JSON.
//!
//! The components have no internals of their own here. The helpers below
//! play the part of the user and of the component script.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use pstate_binding::{BindingError, CapabilityConfig, CapabilityRegistry, Page};
use pstate_dom::{DomEvent, DomTree, NodeId};

pub const CUSTOM_INPUT_TAG: &str = "this-is-a-custom-wc";
pub const CUSTOM_INPUT_EVENT: &str = "this-is-a-custom-wc::input";
pub const CUSTOM_INPUT_PROPERTY: &str = "customValue";

pub const JSON_COUNTER_TAG: &str = "json-wc";
pub const JSON_COUNTER_EVENT: &str = "json-wc::click";
pub const JSON_COUNTER_PROPERTY: &str = "state";

/// Capability of the custom text field
pub fn custom_input_capability() -> CapabilityConfig {
    CapabilityConfig::new(CUSTOM_INPUT_TAG, CUSTOM_INPUT_EVENT, CUSTOM_INPUT_PROPERTY, |event| {
        event.detail_field("internalInputValue").cloned().unwrap_or(Value::Null)
    })
}

/// Capability of the JSON counter
pub fn json_counter_capability() -> CapabilityConfig {
    CapabilityConfig::new(JSON_COUNTER_TAG, JSON_COUNTER_EVENT, JSON_COUNTER_PROPERTY, |event| {
        event.detail_field("state").cloned().unwrap_or(Value::Null)
    })
    .json(true)
}

/// Register both demo components
pub fn register_demo_capabilities(registry: &CapabilityRegistry) {
    registry.register_custom_capability(custom_input_capability());
    registry.register_custom_capability(json_counter_capability());
}

/// Text shown by a custom text field
pub fn custom_input_text(tree: &DomTree, field: NodeId) -> String {
    match tree.property(field, CUSTOM_INPUT_PROPERTY) {
        Some(Value::String(text)) => text.clone(),
        _ => String::new(),
    }
}

/// Type into a custom text field: one custom event per character
pub fn type_into_custom_input(tree: &mut DomTree, field: NodeId, text: &str) {
    for ch in text.chars() {
        let mut value = custom_input_text(tree, field);
        value.push(ch);
        tree.set_property(field, CUSTOM_INPUT_PROPERTY, Value::String(value.clone()));
        tree.dispatch_event(DomEvent::custom(
            CUSTOM_INPUT_EVENT,
            field,
            Some(json!({ "internalInputValue": value })),
        ));
    }
}

/// Internal state of a JSON counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterState {
    pub click_count: u64,
    pub loaded_from_memory: bool,
}

/// Current state of a counter. A missing or foreign-shaped `state` property
/// reads as the initial state.
pub fn counter_state(tree: &DomTree, counter: NodeId) -> CounterState {
    tree.property(counter, JSON_COUNTER_PROPERTY)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

/// Click a counter's button: bumps the count and announces the new state
pub fn click_counter(tree: &mut DomTree, counter: NodeId) -> CounterState {
    let mut state = counter_state(tree, counter);
    state.click_count += 1;

    let value = match serde_json::to_value(&state) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("Could not encode counter state: {}", err);
            return state;
        }
    };
    tree.set_property(counter, JSON_COUNTER_PROPERTY, value.clone());
    tree.dispatch_event(DomEvent::custom(JSON_COUNTER_EVENT, counter, Some(json!({ "state": value }))));
    state
}

/// Nodes of the demo form
#[derive(Debug, Clone, Copy)]
pub struct DemoForm {
    pub container: NodeId,
    pub name: NodeId,
    pub newsletter: NodeId,
    pub plans: [NodeId; 2],
    pub food: NodeId,
    pub notes: NodeId,
    pub token: NodeId,
    pub custom_input: NodeId,
    pub counter: NodeId,
}

/// Register the demo components with the page and mount the demo form
/// under `<body>`, inside a container keyed `key`
pub fn mount_demo_form(page: &mut Page, key: &str) -> Result<DemoForm, BindingError> {
    register_demo_capabilities(&page.registry());

    let container_tag = page.config().container_tag.clone();
    let container = page.create_element_with(&container_tag, &[("key", key)]);
    let name = page.create_element_with("input", &[("id", "name"), ("placeholder", "Name")]);
    let newsletter = page.create_element_with("input", &[("type", "checkbox")]);
    let basic = page.create_element_with("input", &[("type", "radio"), ("name", "plan"), ("value", "basic")]);
    let pro = page.create_element_with("input", &[("type", "radio"), ("name", "plan"), ("value", "pro")]);
    let food = page.create_element_with("select", &[("id", "food")]);
    for choice in ["Banana", "Taco", "Soup"] {
        let option = page.create_element_with("option", &[]);
        let label = page.document_mut().create_text(choice);
        page.tree_mut().append_child(option, label);
        page.tree_mut().append_child(food, option);
    }
    let notes = page.create_element_with("textarea", &[("id", "notes")]);
    let token = page.create_element_with("input", &[("type", "hidden"), ("id", "token")]);
    let submit = page.create_element_with("input", &[("type", "submit")]);
    let custom_input = page.create_element_with(CUSTOM_INPUT_TAG, &[("id", "custom")]);
    let counter = page.create_element_with(JSON_COUNTER_TAG, &[("id", "counter")]);

    for node in [name, newsletter, basic, pro, food, notes, token, submit, custom_input, counter] {
        page.tree_mut().append_child(container, node);
    }
    let body = page.body();
    page.append_child(body, container)?;

    Ok(DemoForm {
        container,
        name,
        newsletter,
        plans: [basic, pro],
        food,
        notes,
        token,
        custom_input,
        counter,
    })
}
