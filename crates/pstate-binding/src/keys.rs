//! Storage keys
//!
//! Entry keys are `"<prefix>::[<instance id>]::<storage key>"`. The storage
//! key is a pure function of the control's tag and its id, group name or
//! discovery ordinal, so it can be rebuilt identically on every load.
//! Ordinal keys shift if markup order changes between loads.

use std::fmt;

use pstate_dom::{DomTree, InputType, NodeId};
use pstate_storage::StorageScope;

/// Per-control key within a namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key shared by every radio of a group: `INPUT[name=<name>]`
    pub fn radio_group(tree: &DomTree, radio: NodeId) -> Self {
        let tag = tree.element(radio).map(|e| e.tag_name()).unwrap_or_default();
        Self(format!("{}[name={}]", tag, tree.control_name(radio)))
    }

    /// `<TAG>#<id>`, or `<TAG>#<ordinal>` for controls without an id
    pub fn for_control(tree: &DomTree, control: NodeId, ordinal: usize) -> Self {
        let Some(elem) = tree.element(control) else {
            return Self(format!("#{}", ordinal));
        };
        match elem.id() {
            Some(id) => Self(format!("{}#{}", elem.tag_name(), id)),
            None => Self(format!("{}#{}", elem.tag_name(), ordinal)),
        }
    }

    /// Key for any control, grouping radios by name
    pub fn derive(tree: &DomTree, control: NodeId, ordinal: usize) -> Self {
        if tree.input_type(control) == Some(InputType::Radio) {
            Self::radio_group(tree, control)
        } else {
            Self::for_control(tree, control, ordinal)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical partition owned by one container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub scope: StorageScope,
    pub instance_id: String,
}

impl Namespace {
    pub fn new(scope: StorageScope, instance_id: impl Into<String>) -> Self {
        Self {
            scope,
            instance_id: instance_id.into(),
        }
    }

    /// Namespace of a container as its attributes stand right now
    pub fn resolve(tree: &DomTree, container: NodeId, scope: StorageScope, global_id: &str) -> Self {
        Self::new(scope, instance_id(tree, container, global_id))
    }

    /// Fully-qualified entry key
    pub fn entry_key(&self, prefix: &str, key: &StorageKey) -> String {
        format!("{}::[{}]::{}", prefix, self.instance_id, key)
    }
}

/// Container instance id: non-empty `key` attribute, else non-empty `id`,
/// else the global sentinel
pub fn instance_id(tree: &DomTree, container: NodeId, global_id: &str) -> String {
    tree.get_attribute(container, "key")
        .filter(|k| !k.is_empty())
        .or_else(|| tree.get_attribute(container, "id").filter(|id| !id.is_empty()))
        .unwrap_or(global_id)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tree: &mut DomTree, attrs: &[(&str, &str)]) -> NodeId {
        let id = tree.create_element("input");
        for (name, value) in attrs {
            tree.set_attribute(id, name, value);
        }
        id
    }

    #[test]
    fn test_key_prefers_id_over_ordinal() {
        let mut tree = DomTree::new();
        let with_id = input(&mut tree, &[("id", "x")]);
        let without = input(&mut tree, &[]);
        let empty_id = input(&mut tree, &[("id", "")]);

        assert_eq!(StorageKey::derive(&tree, with_id, 4).as_str(), "INPUT#x");
        assert_eq!(StorageKey::derive(&tree, without, 4).as_str(), "INPUT#4");
        assert_eq!(StorageKey::derive(&tree, empty_id, 0).as_str(), "INPUT#0");
    }

    #[test]
    fn test_radio_key_ignores_id_and_ordinal() {
        let mut tree = DomTree::new();
        let a = input(&mut tree, &[("type", "radio"), ("name", "g"), ("id", "a")]);
        let b = input(&mut tree, &[("type", "radio"), ("name", "g")]);

        assert_eq!(StorageKey::derive(&tree, a, 0).as_str(), "INPUT[name=g]");
        assert_eq!(StorageKey::derive(&tree, a, 0), StorageKey::derive(&tree, b, 1));
    }

    #[test]
    fn test_key_is_deterministic() {
        let mut tree = DomTree::new();
        let area = tree.create_element("textarea");
        assert_eq!(StorageKey::derive(&tree, area, 2), StorageKey::derive(&tree, area, 2));
        assert_eq!(StorageKey::derive(&tree, area, 2).as_str(), "TEXTAREA#2");
    }

    #[test]
    fn test_instance_id_fallbacks() {
        let mut tree = DomTree::new();
        let container = tree.create_element("persistent-state");
        assert_eq!(instance_id(&tree, container, "GLOBAL"), "GLOBAL");

        tree.set_attribute(container, "id", "c");
        assert_eq!(instance_id(&tree, container, "GLOBAL"), "c");

        tree.set_attribute(container, "key", "");
        assert_eq!(instance_id(&tree, container, "GLOBAL"), "c");

        tree.set_attribute(container, "key", "k");
        assert_eq!(instance_id(&tree, container, "GLOBAL"), "k");
    }

    #[test]
    fn test_entry_key_format() {
        let ns = Namespace::new(StorageScope::Durable, "GLOBAL");
        let key = StorageKey("INPUT#x".to_string());
        assert_eq!(
            ns.entry_key("PersistentStateRegistry", &key),
            "PersistentStateRegistry::[GLOBAL]::INPUT#x"
        );
    }
}
