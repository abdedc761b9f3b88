//! Element Capability Registry
//!
//! Single source of truth for which elements are persistable and how a
//! custom element exposes its value. One registry serves every container of
//! a page: the page owns a `RegistrySlot` and hands out the same `Rc`.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use pstate_dom::{DomEvent, DomEventType, DomTree, InputType, NodeId};

/// Built-in persistable tags, in discovery order
pub const SUPPORTED_TAGS: [&str; 3] = ["input", "select", "textarea"];

/// Input types that carry user state
pub const SUPPORTED_INPUT_TYPES: [InputType; 17] = [
    InputType::Checkbox,
    InputType::Color,
    InputType::Date,
    InputType::DatetimeLocal,
    InputType::Email,
    InputType::Hidden,
    InputType::Month,
    InputType::Number,
    InputType::Password,
    InputType::Radio,
    InputType::Range,
    InputType::Search,
    InputType::Tel,
    InputType::Text,
    InputType::Time,
    InputType::Url,
    InputType::Week,
];

/// Extracts the value to persist from a custom element's change event
pub type ChangeExtractor = Rc<dyn Fn(&DomEvent) -> Value>;

/// Registration request for a custom element
pub struct CapabilityConfig {
    pub name: String,
    pub change_event: String,
    pub update_property: String,
    pub on_change: ChangeExtractor,
    pub is_json: bool,
}

impl CapabilityConfig {
    pub fn new(
        name: &str,
        change_event: &str,
        update_property: &str,
        on_change: impl Fn(&DomEvent) -> Value + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            change_event: change_event.to_string(),
            update_property: update_property.to_string(),
            on_change: Rc::new(on_change),
            is_json: false,
        }
    }

    /// Store values JSON-encoded
    pub fn json(mut self, is_json: bool) -> Self {
        self.is_json = is_json;
        self
    }
}

/// Registered, immutable adapter for one custom tag
pub struct CapabilityAdapter {
    tag: String,
    change_event: DomEventType,
    update_property: String,
    on_change: ChangeExtractor,
    is_json: bool,
}

impl CapabilityAdapter {
    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Event that signals a value change
    pub fn change_event(&self) -> &DomEventType {
        &self.change_event
    }

    /// Property that receives restored values
    pub fn update_property(&self) -> &str {
        &self.update_property
    }

    /// Whether values are JSON-encoded in storage
    pub fn is_json(&self) -> bool {
        self.is_json
    }

    /// Value carried by a change event
    pub fn extract(&self, event: &DomEvent) -> Value {
        (self.on_change)(event)
    }
}

impl fmt::Debug for CapabilityAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityAdapter")
            .field("tag", &self.tag)
            .field("change_event", &self.change_event)
            .field("update_property", &self.update_property)
            .field("is_json", &self.is_json)
            .finish_non_exhaustive()
    }
}

/// Catalog of persistable element kinds
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    /// Custom adapters in first-registration order
    custom: RefCell<Vec<Rc<CapabilityAdapter>>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the adapter of a custom tag.
    ///
    /// The name is lowercased. Registering a tag again replaces its adapter
    /// but keeps its place in the discovery order.
    pub fn register_custom_capability(&self, config: CapabilityConfig) {
        let tag = config.name.to_ascii_lowercase();
        let adapter = Rc::new(CapabilityAdapter {
            tag: tag.clone(),
            change_event: DomEventType::parse(&config.change_event),
            update_property: config.update_property,
            on_change: config.on_change,
            is_json: config.is_json,
        });

        let mut custom = self.custom.borrow_mut();
        match custom.iter_mut().find(|a| a.tag == tag) {
            Some(slot) => {
                tracing::debug!("Replacing capability adapter for <{}>", tag);
                *slot = adapter;
            }
            None => {
                tracing::debug!("Registered capability adapter for <{}>", tag);
                custom.push(adapter);
            }
        }
    }

    /// Adapter of a custom tag
    pub fn adapter(&self, tag: &str) -> Option<Rc<CapabilityAdapter>> {
        self.custom
            .borrow()
            .iter()
            .find(|a| a.tag.eq_ignore_ascii_case(tag))
            .cloned()
    }

    /// Whether `tag` is a registered custom tag
    pub fn is_custom(&self, tag: &str) -> bool {
        self.adapter(tag).is_some()
    }

    /// Registered custom tags, in registration order
    pub fn custom_tags(&self) -> Vec<String> {
        self.custom.borrow().iter().map(|a| a.tag.clone()).collect()
    }

    /// Every tag a container scans for: built-ins first, then custom tags
    pub fn discovery_tags(&self) -> Vec<String> {
        SUPPORTED_TAGS
            .iter()
            .map(|t| t.to_string())
            .chain(self.custom_tags())
            .collect()
    }

    /// Whether an element can be persisted
    pub fn is_supported(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(tag) = tree.tag(node) else {
            return false;
        };
        if tag == "input" {
            return tree
                .input_type(node)
                .is_some_and(|t| SUPPORTED_INPUT_TYPES.contains(&t));
        }
        SUPPORTED_TAGS.contains(&tag) || self.is_custom(tag)
    }
}

/// Page-wide registry slot: the first registry placed in it wins
#[derive(Debug, Default)]
pub struct RegistrySlot(OnceCell<Rc<CapabilityRegistry>>);

impl RegistrySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry, constructing it on first use
    pub fn get_or_create(&self) -> Rc<CapabilityRegistry> {
        self.0.get_or_init(|| Rc::new(CapabilityRegistry::new())).clone()
    }

    /// Offer a registry. Returns the one actually in the slot, which is
    /// `registry` only if the slot was empty.
    pub fn install(&self, registry: Rc<CapabilityRegistry>) -> Rc<CapabilityRegistry> {
        self.0.get_or_init(|| registry).clone()
    }

    /// The registry if one exists
    pub fn get(&self) -> Option<Rc<CapabilityRegistry>> {
        self.0.get().cloned()
    }
}
