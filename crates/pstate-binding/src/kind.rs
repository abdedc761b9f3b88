//! Control kinds
//!
//! Every persistable control falls into one closed set of kinds. A kind
//! decides three things: the storage key, how a stored value is written
//! back into the control, and how value changes are captured.

use std::rc::Rc;

use serde_json::Value;

use pstate_dom::{DomEventType, DomTree, InputType, NodeId};

use crate::keys::{Namespace, StorageKey};
use crate::registry::{CapabilityAdapter, CapabilityRegistry};
use crate::store::{coerce_to_string, is_truthy, SharedStore, StateStore};
use crate::watch::{ChangeSignal, ChangeWatch};

/// Kind of a persistable control
#[derive(Debug, Clone)]
pub enum ControlKind {
    Radio,
    Checkbox,
    Select,
    Hidden,
    Custom(Rc<CapabilityAdapter>),
    /// Text-like inputs and textareas
    Text,
}

/// Value captured from a change
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Raw(String),
    Json(Value),
}

impl Captured {
    /// Persist into `ns`
    pub fn write(&self, store: &mut StateStore, ns: &Namespace, key: &StorageKey) {
        match self {
            Self::Raw(value) => store.set(ns, key, value),
            Self::Json(value) => store.set_json(ns, key, value),
        }
    }
}

impl ControlKind {
    /// Kind of `node`, or None if the registry does not support it
    pub fn classify(registry: &CapabilityRegistry, tree: &DomTree, node: NodeId) -> Option<Self> {
        if !registry.is_supported(tree, node) {
            return None;
        }
        let tag = tree.tag(node)?;
        let kind = match tree.input_type(node) {
            Some(InputType::Radio) => Self::Radio,
            Some(InputType::Checkbox) => Self::Checkbox,
            Some(InputType::Hidden) => Self::Hidden,
            Some(_) => Self::Text,
            None if tag == "select" => Self::Select,
            None if tag == "textarea" => Self::Text,
            None => Self::Custom(registry.adapter(tag)?),
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::Hidden => "hidden",
            Self::Custom(_) => "custom",
            Self::Text => "text",
        }
    }

    /// Storage key of a control of this kind
    pub fn storage_key(&self, tree: &DomTree, node: NodeId, ordinal: usize) -> StorageKey {
        match self {
            Self::Radio => StorageKey::radio_group(tree, node),
            _ => StorageKey::for_control(tree, node, ordinal),
        }
    }

    /// How changes of this kind are detected
    pub fn watch(&self) -> ChangeWatch {
        match self {
            Self::Radio | Self::Select | Self::Checkbox => ChangeWatch::Event(DomEventType::Change),
            Self::Hidden => ChangeWatch::structural("value"),
            Self::Custom(adapter) => ChangeWatch::Event(adapter.change_event().clone()),
            Self::Text => ChangeWatch::Event(DomEventType::Input),
        }
    }

    /// Write the stored value back into the control. Returns whether the
    /// control was assigned.
    ///
    /// The store is only borrowed while reading: assigning a hidden value
    /// notifies observers that write to the same store.
    pub fn restore(
        &self,
        tree: &mut DomTree,
        node: NodeId,
        store: &SharedStore,
        ns: &Namespace,
        key: &StorageKey,
    ) -> bool {
        match self {
            Self::Custom(adapter) => {
                let stored = if adapter.is_json() {
                    store.borrow().get_json(ns, key)
                } else {
                    store.borrow().get(ns, key).map(Value::String)
                };
                match stored {
                    Some(value) if is_truthy(&value) => {
                        tree.set_property(node, adapter.update_property(), value);
                        true
                    }
                    _ => false,
                }
            }
            Self::Radio => {
                let stored = store.borrow().get(ns, key);
                match stored {
                    Some(value) if !value.is_empty() && value == tree.value(node) => {
                        tree.check_radio(node);
                        true
                    }
                    _ => false,
                }
            }
            Self::Checkbox => {
                let stored = store.borrow().get(ns, key);
                tree.set_checked(node, stored.as_deref() == Some("true"));
                true
            }
            Self::Select | Self::Hidden | Self::Text => {
                let stored = store.borrow().get(ns, key);
                match stored {
                    Some(value) if !value.is_empty() => {
                        tree.set_value(node, &value);
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    /// Value to persist for a change signal
    pub fn capture(&self, tree: &DomTree, signal: ChangeSignal<'_>) -> Option<Captured> {
        let target = signal.target();
        let captured = match self {
            Self::Custom(adapter) => {
                let value = adapter.extract(signal.event()?);
                if adapter.is_json() {
                    Captured::Json(value)
                } else {
                    Captured::Raw(coerce_to_string(&value))
                }
            }
            Self::Checkbox => Captured::Raw(tree.checked(target).to_string()),
            Self::Radio | Self::Select | Self::Hidden | Self::Text => Captured::Raw(tree.value(target)),
        };
        Some(captured)
    }
}
