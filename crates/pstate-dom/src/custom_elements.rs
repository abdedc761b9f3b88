//! Custom Elements
//!
//! Custom element registry and lifecycle reactions. Reactions are queued by
//! the `Document` and drained by the host, which runs the element's
//! behaviour outside of any tree borrow.

use std::collections::HashMap;

use crate::{DomError, NodeId};

/// Custom elements registry
#[derive(Debug, Default)]
pub struct CustomElementRegistry {
    definitions: HashMap<String, CustomElementDefinition>,
}

/// Custom element definition
#[derive(Debug, Clone)]
pub struct CustomElementDefinition {
    pub name: String,
    pub observed_attributes: Vec<String>,
}

impl CustomElementDefinition {
    /// Whether changes to `attr` produce an AttributeChanged reaction
    pub fn observes(&self, attr: &str) -> bool {
        self.observed_attributes.iter().any(|a| a.eq_ignore_ascii_case(attr))
    }
}

/// Custom element lifecycle callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleCallback {
    Connected,
    Disconnected,
    AttributeChanged,
}

/// Lifecycle callback info
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleCallbackInfo {
    pub callback: LifecycleCallback,
    pub element: NodeId,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl LifecycleCallbackInfo {
    pub fn connected(element: NodeId) -> Self {
        Self {
            callback: LifecycleCallback::Connected,
            element,
            attribute_name: None,
            old_value: None,
            new_value: None,
        }
    }

    pub fn disconnected(element: NodeId) -> Self {
        Self {
            callback: LifecycleCallback::Disconnected,
            ..Self::connected(element)
        }
    }

    pub fn attribute_changed(
        element: NodeId,
        name: &str,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            callback: LifecycleCallback::AttributeChanged,
            element,
            attribute_name: Some(name.to_ascii_lowercase()),
            old_value,
            new_value,
        }
    }
}

/// Custom element options
#[derive(Debug, Clone, Default)]
pub struct CustomElementOptions {
    pub observed_attributes: Vec<String>,
}

impl CustomElementOptions {
    pub fn observing(attrs: &[&str]) -> Self {
        Self {
            observed_attributes: attrs.iter().map(|a| a.to_ascii_lowercase()).collect(),
        }
    }
}

impl CustomElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a custom element
    pub fn define(&mut self, name: &str, options: CustomElementOptions) -> Result<(), DomError> {
        if !Self::is_valid_name(name) {
            return Err(DomError::InvalidCustomElementName(name.to_string()));
        }
        if self.definitions.contains_key(name) {
            return Err(DomError::AlreadyDefined(name.to_string()));
        }

        tracing::debug!("Defined custom element <{}>", name);
        self.definitions.insert(name.to_string(), CustomElementDefinition {
            name: name.to_string(),
            observed_attributes: options.observed_attributes,
        });
        Ok(())
    }

    /// Get element definition
    pub fn get(&self, name: &str) -> Option<&CustomElementDefinition> {
        self.definitions.get(name)
    }

    /// Check if element is defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Validate custom element name
    fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter and contain no uppercase
        if !name.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return false;
        }
        if name.chars().any(|c| c.is_ascii_uppercase()) {
            return false;
        }

        // Reserved names
        let reserved = ["annotation-xml", "color-profile", "font-face",
                       "font-face-src", "font-face-uri", "font-face-format",
                       "font-face-name", "missing-glyph"];
        !reserved.contains(&name)
    }
}
