//! pstate DOM - Document Object Model host
//!
//! Arena-based DOM tree with just enough behaviour for form persistence:
//! attributes, element properties, bubbling events, attribute mutation
//! observers, custom-element lifecycle reactions and form-control values.

mod node;
mod tree;
mod document;
mod error;
pub mod dom_events;
pub mod observer;
pub mod custom_elements;
pub mod forms;
pub mod interact;

pub use node::{Attribute, ElementData, ElementProps, Node, NodeData, Selection};
pub use tree::{DomTree, Children};
pub use document::{Document, ReadyState};
pub use error::DomError;
pub use dom_events::{DomEvent, DomEventType, EventListener, ListenerId};
pub use observer::{MutationCallback, MutationObserverInit, MutationRecord, MutationType, ObserverId};
pub use custom_elements::{
    CustomElementDefinition, CustomElementOptions, CustomElementRegistry, LifecycleCallback,
    LifecycleCallbackInfo,
};
pub use forms::InputType;

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Check if this points at a node
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Arena index
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.0)
        } else {
            f.write_str("#none")
        }
    }
}
