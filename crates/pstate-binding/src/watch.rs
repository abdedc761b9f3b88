//! Change watches
//!
//! A bound control reports value changes either through a DOM event or
//! through an attribute mutation. Both go through the same attach/detach
//! contract so the container does not care which one a control uses.

use std::rc::Rc;

use pstate_dom::{
    DomEvent, DomEventType, DomTree, ListenerId, MutationObserverInit, MutationRecord, NodeId,
    ObserverId,
};

/// How a control signals that its value changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeWatch {
    /// Listen for an event on the control
    Event(DomEventType),
    /// Observe an attribute of the control
    Structural { attribute: String },
}

/// What triggered a change
#[derive(Debug, Clone, Copy)]
pub enum ChangeSignal<'a> {
    Event(&'a DomEvent),
    Mutation(&'a MutationRecord),
}

impl ChangeSignal<'_> {
    /// Control the change happened on
    pub fn target(&self) -> NodeId {
        match self {
            Self::Event(event) => event.current_target,
            Self::Mutation(record) => record.target,
        }
    }

    /// The triggering event, if any
    pub fn event(&self) -> Option<&DomEvent> {
        match self {
            Self::Event(event) => Some(*event),
            Self::Mutation(_) => None,
        }
    }
}

/// Receives change signals
pub type ChangeSink = Rc<dyn Fn(ChangeSignal<'_>, &DomTree)>;

/// Registration returned by `ChangeWatch::attach`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchHandle {
    Listener(ListenerId),
    Observer(ObserverId),
}

impl WatchHandle {
    /// Stop watching. Returns false if the registration was already gone,
    /// e.g. because the control left the tree.
    pub fn detach(self, tree: &mut DomTree) -> bool {
        match self {
            Self::Listener(id) => tree.remove_event_listener(id),
            Self::Observer(id) => tree.disconnect(id),
        }
    }
}

impl ChangeWatch {
    /// Watch an attribute
    pub fn structural(attribute: &str) -> Self {
        Self::Structural { attribute: attribute.to_ascii_lowercase() }
    }

    /// Start delivering changes of `node` to `sink`
    pub fn attach(&self, tree: &mut DomTree, node: NodeId, sink: ChangeSink) -> WatchHandle {
        match self {
            Self::Event(event_type) => {
                let id = tree.add_event_listener(
                    node,
                    event_type.clone(),
                    Rc::new(move |event: &mut DomEvent, tree: &DomTree| {
                        sink(ChangeSignal::Event(&*event), tree);
                    }),
                );
                WatchHandle::Listener(id)
            }
            Self::Structural { attribute } => {
                let attribute = attribute.clone();
                let id = tree.observe(
                    node,
                    MutationObserverInit::attribute_filter(&[attribute.as_str()]),
                    Rc::new(move |records: &[MutationRecord], tree: &DomTree| {
                        for record in records {
                            if record.attribute_name.as_deref() == Some(attribute.as_str()) {
                                sink(ChangeSignal::Mutation(record), tree);
                            }
                        }
                    }),
                );
                WatchHandle::Observer(id)
            }
        }
    }
}
