//! State store
//!
//! Namespaced access to the storage area. JSON-mode reads and writes never
//! fail: a value that cannot be decoded or encoded is logged and passed
//! through raw.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use pstate_storage::{StorageArea, StorageScope};

use crate::keys::{Namespace, StorageKey};

/// Store shared by the page and every container listener
pub type SharedStore = Rc<RefCell<StateStore>>;

/// Prefixed, namespaced view over a storage area
#[derive(Debug)]
pub struct StateStore {
    area: StorageArea,
    prefix: String,
}

impl StateStore {
    pub fn new(area: StorageArea, prefix: impl Into<String>) -> Self {
        Self {
            area,
            prefix: prefix.into(),
        }
    }

    /// Wrap for sharing
    pub fn shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    /// Entry key prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fully-qualified entry key
    pub fn entry_key(&self, ns: &Namespace, key: &StorageKey) -> String {
        ns.entry_key(&self.prefix, key)
    }

    /// Raw stored string
    pub fn get(&self, ns: &Namespace, key: &StorageKey) -> Option<String> {
        self.area.scope(ns.scope).get_item(&self.entry_key(ns, key))
    }

    /// Stored value decoded as JSON. Undecodable values come back as a
    /// JSON string holding the raw text.
    pub fn get_json(&self, ns: &Namespace, key: &StorageKey) -> Option<Value> {
        let raw = self.get(ns, key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Could not parse {} as JSON ({}): {:?}", key, err, raw);
                Some(Value::String(raw))
            }
        }
    }

    /// Store a raw string
    pub fn set(&mut self, ns: &Namespace, key: &StorageKey, value: &str) {
        let entry = self.entry_key(ns, key);
        tracing::debug!("{} [{}] = {:?}", entry, ns.scope, value);
        self.area.scope_mut(ns.scope).set_item(&entry, value);
    }

    /// Store a value JSON-encoded. Unencodable values are stored as their
    /// plain string form.
    pub fn set_json(&mut self, ns: &Namespace, key: &StorageKey, value: &Value) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!("Could not encode value for {} as JSON: {}", key, err);
                coerce_to_string(value)
            }
        };
        self.set(ns, key, &encoded);
    }

    /// Remove one entry
    pub fn remove(&mut self, ns: &Namespace, key: &StorageKey) {
        let entry = self.entry_key(ns, key);
        self.area.scope_mut(ns.scope).remove_item(&entry);
    }

    /// Remove every prefixed entry from both scopes
    pub fn reset_all(&mut self) -> usize {
        let prefix = format!("{}::", self.prefix);
        let removed = self.area.clear_prefix(&prefix);
        tracing::info!("Reset {} persisted entries", removed);
        removed
    }

    /// Entries of one scope, ordered by key
    pub fn entries(&self, scope: StorageScope) -> Vec<(String, String)> {
        self.area.scope(scope).entries()
    }

    /// Underlying storage area
    pub fn area(&self) -> &StorageArea {
        &self.area
    }

    /// Underlying storage area, mutably
    pub fn area_mut(&mut self) -> &mut StorageArea {
        &mut self.area
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(StorageArea::in_memory(), crate::config::DEFAULT_PREFIX)
    }
}

/// String form used when a non-JSON adapter hands back a non-string value
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness of a restored value: null, false, 0, NaN and "" are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> StorageKey {
        let mut tree = pstate_dom::DomTree::new();
        let el = tree.create_element(s);
        StorageKey::derive(&tree, el, 0)
    }

    #[test]
    fn test_set_get_remove() {
        let mut store = StateStore::default();
        let ns = Namespace::new(StorageScope::Session, "c");
        let k = key("input");

        store.set(&ns, &k, "hello");
        assert_eq!(store.get(&ns, &k).as_deref(), Some("hello"));
        assert_eq!(
            store.entries(StorageScope::Session),
            vec![("PersistentStateRegistry::[c]::INPUT#0".to_string(), "hello".to_string())]
        );
        assert!(store.entries(StorageScope::Durable).is_empty());

        store.remove(&ns, &k);
        assert_eq!(store.get(&ns, &k), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = StateStore::default();
        let ns = Namespace::new(StorageScope::Durable, "GLOBAL");
        let k = key("json-wc");

        store.set_json(&ns, &k, &json!({ "count": 1 }));
        assert_eq!(store.get(&ns, &k).as_deref(), Some(r#"{"count":1}"#));
        assert_eq!(store.get_json(&ns, &k), Some(json!({ "count": 1 })));
    }

    #[test]
    fn test_undecodable_json_passes_through() {
        let mut store = StateStore::default();
        let ns = Namespace::new(StorageScope::Durable, "GLOBAL");
        let k = key("json-wc");

        store.set(&ns, &k, "{not json");
        assert_eq!(store.get_json(&ns, &k), Some(Value::String("{not json".to_string())));
        assert_eq!(store.get_json(&ns, &key("other-wc")), None);
    }

    #[test]
    fn test_reset_all_keeps_foreign_entries() {
        let mut store = StateStore::default();
        let k = key("input");
        store.set(&Namespace::new(StorageScope::Durable, "a"), &k, "1");
        store.set(&Namespace::new(StorageScope::Session, "b"), &k, "2");
        store.area_mut().scope_mut(StorageScope::Durable).set_item("unrelated", "x");

        assert_eq!(store.reset_all(), 2);
        assert_eq!(
            store.entries(StorageScope::Durable),
            vec![("unrelated".to_string(), "x".to_string())]
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce_to_string(&json!("plain")), "plain");
        assert_eq!(coerce_to_string(&json!(true)), "true");
        assert_eq!(coerce_to_string(&json!(3)), "3");
    }
}
