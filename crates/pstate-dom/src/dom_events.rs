//! DOM Events
//!
//! Event objects, listener handles and the event type catalog.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::{DomTree, NodeId};

/// DOM event types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomEventType {
    /// Value edited by the user (fires per keystroke)
    Input,
    /// Value committed (checkbox toggle, radio pick, option choice)
    Change,
    /// Element activated
    Click,
    /// Initial document parse finished
    DOMContentLoaded,
    /// Any other event name, such as custom element events
    Custom(Box<str>),
}

impl DomEventType {
    /// Parse from an event name
    pub fn parse(s: &str) -> Self {
        match s {
            "input" => Self::Input,
            "change" => Self::Change,
            "click" => Self::Click,
            "DOMContentLoaded" => Self::DOMContentLoaded,
            other => Self::Custom(other.into()),
        }
    }

    /// Event name
    pub fn as_str(&self) -> &str {
        match self {
            Self::Input => "input",
            Self::Change => "change",
            Self::Click => "click",
            Self::DOMContentLoaded => "DOMContentLoaded",
            Self::Custom(name) => &**name,
        }
    }
}

impl fmt::Display for DomEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DomEventType {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// DOM event
#[derive(Debug, Clone)]
pub struct DomEvent {
    pub event_type: DomEventType,
    pub target: NodeId,
    /// Node whose listeners are currently running
    pub current_target: NodeId,
    pub related_node: Option<NodeId>,
    /// Payload of a custom event
    pub detail: Option<Value>,
    pub bubbles: bool,
    /// Crosses shadow boundaries
    pub composed: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    /// Create an event with explicit flags
    pub fn new(event_type: DomEventType, target: NodeId, bubbles: bool) -> Self {
        Self {
            event_type,
            target,
            current_target: target,
            related_node: None,
            detail: None,
            bubbles,
            composed: false,
            cancelable: false,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create input event
    pub fn input(target: NodeId) -> Self {
        let mut event = Self::new(DomEventType::Input, target, true);
        event.composed = true;
        event
    }

    /// Create change event
    pub fn change(target: NodeId) -> Self {
        Self::new(DomEventType::Change, target, true)
    }

    /// Create click event
    pub fn click(target: NodeId) -> Self {
        let mut event = Self::new(DomEventType::Click, target, true);
        event.composed = true;
        event.cancelable = true;
        event
    }

    /// Create DOMContentLoaded event
    pub fn content_loaded(target: NodeId) -> Self {
        Self::new(DomEventType::DOMContentLoaded, target, true)
    }

    /// Create a custom event carrying `detail`
    pub fn custom(name: &str, target: NodeId, detail: Option<Value>) -> Self {
        let mut event = Self::new(DomEventType::parse(name), target, true);
        event.detail = detail;
        event.composed = true;
        event.cancelable = true;
        event
    }

    /// Look up a top-level field of the detail payload
    pub fn detail_field(&self, name: &str) -> Option<&Value> {
        self.detail.as_ref()?.get(name)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Event listener callback.
///
/// Listeners get read access to the tree; mutation happens outside dispatch.
pub type EventListener = Rc<dyn Fn(&mut DomEvent, &DomTree)>;

/// Handle returned by `DomTree::add_event_listener`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Registered listener
#[derive(Clone)]
pub(crate) struct RegisteredListener {
    pub id: ListenerId,
    pub node: NodeId,
    pub event_type: DomEventType,
    pub callback: EventListener,
}

impl fmt::Debug for RegisteredListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredListener")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!(DomEventType::parse("input"), DomEventType::Input);
        assert_eq!(DomEventType::parse("change"), DomEventType::Change);
        assert_eq!(
            DomEventType::parse("json-wc::click"),
            DomEventType::Custom("json-wc::click".into())
        );
        assert_eq!(DomEventType::parse("json-wc::click").as_str(), "json-wc::click");
    }

    #[test]
    fn test_custom_event_detail() {
        let event = DomEvent::custom(
            "my-el::input",
            NodeId(3),
            Some(serde_json::json!({ "internalInputValue": "abc" })),
        );

        assert!(event.bubbles);
        assert!(event.composed);
        assert_eq!(event.detail_field("internalInputValue"), Some(&serde_json::json!("abc")));
        assert_eq!(event.detail_field("missing"), None);
    }

    #[test]
    fn test_prevent_default_requires_cancelable() {
        let mut change = DomEvent::change(NodeId(1));
        change.prevent_default();
        assert!(!change.is_default_prevented());

        let mut click = DomEvent::click(NodeId(1));
        click.prevent_default();
        assert!(click.is_default_prevented());
    }
}
