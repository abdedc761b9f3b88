//! DOM Tree (arena-based allocation)
//!
//! Owns every node plus the event listeners and mutation observers attached
//! to them. Listeners and observers of a removed subtree are released with it.

use serde_json::Value;

use crate::dom_events::RegisteredListener;
use crate::observer::Observation;
use crate::{
    DomEvent, DomEventType, ElementData, EventListener, ListenerId, MutationCallback,
    MutationObserverInit, MutationRecord, MutationType, Node, NodeId, ObserverId,
};

/// Arena-based DOM tree
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    listeners: Vec<RegisteredListener>,
    observations: Vec<Observation>,
    next_handle: u64,
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
            listeners: Vec::new(),
            observations: Vec::new(),
            next_handle: 1,
        }
    }

    /// Document node
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content.to_string()))
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn next_handle(&mut self) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() || parent == child {
            tracing::warn!("append_child: invalid nodes {} <- {}", parent, child);
            return;
        }
        if self.ancestors(parent).any(|a| a == child) {
            tracing::warn!("append_child: {} is an ancestor of {}", child, parent);
            return;
        }

        self.unlink(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;
    }

    /// Remove `child` from the tree, releasing listeners and observers of
    /// its whole subtree. Returns false if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.get(child).map(|n| n.parent) != Some(parent) {
            return false;
        }
        self.unlink(child);

        let mut released = self.descendants(child);
        released.push(child);
        self.listeners.retain(|l| !released.contains(&l.node));
        self.observations.retain(|o| !released.contains(&o.target));
        tracing::debug!("Removed {} ({} nodes released)", child, released.len());
        true
    }

    fn unlink(&mut self, child: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[child.index()];
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return;
        }
        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }
        let node = &mut self.nodes[child.index()];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let first = self.get(id).map_or(NodeId::NONE, |n| n.first_child);
        Children { tree: self, next: first }
    }

    /// Iterate ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.get(id).map_or(NodeId::NONE, |n| n.parent);
        std::iter::successors(Some(start).filter(|p| p.is_valid()), move |&p| {
            self.get(p).map(|n| n.parent).filter(|p| p.is_valid())
        })
    }

    /// All descendants of `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).map(|(c, _)| c).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut kids: Vec<NodeId> = self.children(current).map(|(c, _)| c).collect();
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Descendant elements with the given tag, in document order
    pub fn elements_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.tag(id).is_some_and(|t| t.eq_ignore_ascii_case(tag)))
            .collect()
    }

    /// Whether the node is attached under the document node
    pub fn is_connected(&self, id: NodeId) -> bool {
        id == NodeId::ROOT || self.ancestors(id).any(|a| a == NodeId::ROOT)
    }

    /// Element data of `id`
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Mutable element data of `id`
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id)?.as_element_mut()
    }

    /// Lowercase tag name
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Get an attribute
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    /// Check for an attribute
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    /// Set an attribute and notify observers synchronously
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(elem) = self.element_mut(id) else {
            tracing::warn!("set_attribute on non-element {}", id);
            return;
        };
        let old_value = elem.set_attr(name, value);
        self.notify_attribute(id, name, old_value);
    }

    /// Remove an attribute and notify observers if it existed
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let Some(elem) = self.element_mut(id) else {
            return;
        };
        if let Some(old_value) = elem.remove_attr(name) {
            self.notify_attribute(id, name, Some(old_value));
        }
    }

    fn notify_attribute(&self, target: NodeId, name: &str, old_value: Option<String>) {
        let record = MutationRecord {
            mutation_type: MutationType::Attributes,
            target,
            attribute_name: Some(name.to_ascii_lowercase()),
            old_value,
        };
        let deliveries: Vec<(MutationCallback, MutationRecord)> = self.observations
            .iter()
            .filter_map(|o| o.filter(&record).map(|r| (o.callback.clone(), r)))
            .collect();
        for (callback, delivered) in deliveries {
            callback(std::slice::from_ref(&delivered), self);
        }
    }

    /// Named element property
    pub fn property(&self, id: NodeId, name: &str) -> Option<&Value> {
        self.element(id)?.props.custom.get(name)
    }

    /// Set a named element property
    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) {
        if let Some(elem) = self.element_mut(id) {
            elem.props.custom.insert(name.to_string(), value);
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(Node::as_text))
            .collect()
    }

    /// Register an event listener on `node`
    pub fn add_event_listener(
        &mut self,
        node: NodeId,
        event_type: DomEventType,
        callback: EventListener,
    ) -> ListenerId {
        let id = ListenerId(self.next_handle());
        self.listeners.push(RegisteredListener { id, node, event_type, callback });
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Number of listeners on `node` for `event_type`
    pub fn listener_count(&self, node: NodeId, event_type: &DomEventType) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.node == node && &l.event_type == event_type)
            .count()
    }

    /// Dispatch an event at its target, then bubble through ancestors.
    ///
    /// Returns false if a listener prevented the default action.
    pub fn dispatch_event(&self, mut event: DomEvent) -> bool {
        let mut path = vec![event.target];
        if event.bubbles {
            path.extend(self.ancestors(event.target));
        }

        for node in path {
            let callbacks: Vec<EventListener> = self.listeners
                .iter()
                .filter(|l| l.node == node && l.event_type == event.event_type)
                .map(|l| l.callback.clone())
                .collect();
            if callbacks.is_empty() {
                continue;
            }
            event.current_target = node;
            for callback in callbacks {
                callback(&mut event, self);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }

        !event.is_default_prevented()
    }

    /// Start observing `target`
    pub fn observe(
        &mut self,
        target: NodeId,
        options: MutationObserverInit,
        callback: MutationCallback,
    ) -> ObserverId {
        let id = ObserverId(self.next_handle());
        self.observations.push(Observation { id, target, options, callback });
        id
    }

    /// Stop an observer. Returns false if it was already gone.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observations.len();
        self.observations.retain(|o| o.id != id);
        self.observations.len() != before
    }

    /// Number of observers watching `target`
    pub fn observer_count(&self, target: NodeId) -> usize {
        self.observations.iter().filter(|o| o.target == target).count()
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}
