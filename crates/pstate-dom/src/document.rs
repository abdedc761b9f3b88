//! Document - High-level document API
//!
//! Wraps the tree with custom element bookkeeping: structural and attribute
//! changes made through the document queue lifecycle reactions for defined
//! custom elements.

use std::collections::VecDeque;

use crate::{
    CustomElementOptions, CustomElementRegistry, DomError, DomEvent, DomTree,
    LifecycleCallbackInfo, NodeId,
};

/// Document readiness milestones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    /// Still parsing
    #[default]
    Loading,
    /// DOMContentLoaded has fired
    Interactive,
}

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    custom_elements: CustomElementRegistry,
    reactions: VecDeque<LifecycleCallbackInfo>,
    ready_state: ReadyState,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
}

impl Document {
    /// Create a new document with `<html>`, `<head>` and `<body>`
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            custom_elements: CustomElementRegistry::new(),
            reactions: VecDeque::new(),
            ready_state: ReadyState::Loading,
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Get `<html>` element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get `<head>` element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get `<body>` element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably. Changes made here bypass lifecycle
    /// reactions.
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// Custom element registry
    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }

    /// Define a custom element. Already-connected elements with that tag
    /// are upgraded, which queues a Connected reaction for each.
    pub fn define(&mut self, name: &str, options: CustomElementOptions) -> Result<(), DomError> {
        self.custom_elements.define(name, options)?;
        for id in self.tree.elements_by_tag(self.tree.root(), name) {
            self.reactions.push_back(LifecycleCallbackInfo::connected(id));
        }
        Ok(())
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.tree.create_element(tag)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.tree.create_text(content)
    }

    /// Append a child, queueing Connected reactions for defined elements
    /// that became connected
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.tree.append_child(parent, child);
        if self.tree.is_connected(child) {
            for id in self.defined_in_subtree(child) {
                self.reactions.push_back(LifecycleCallbackInfo::connected(id));
            }
        }
    }

    /// Remove a child, queueing Disconnected reactions
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let was_connected = self.tree.is_connected(child);
        let defined = self.defined_in_subtree(child);
        if !self.tree.remove_child(parent, child) {
            return false;
        }
        if was_connected {
            for id in defined {
                self.reactions.push_back(LifecycleCallbackInfo::disconnected(id));
            }
        }
        true
    }

    fn defined_in_subtree(&self, root: NodeId) -> Vec<NodeId> {
        std::iter::once(root)
            .chain(self.tree.descendants(root))
            .filter(|&id| self.tree.tag(id).is_some_and(|t| self.custom_elements.is_defined(t)))
            .collect()
    }

    /// Set an attribute, queueing an AttributeChanged reaction if the
    /// element's definition observes it
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let elem = self.tree.element(node).ok_or(DomError::NotAnElement(node))?;
        let old_value = elem.get_attr(name).map(str::to_string);
        let observed = self.custom_elements.get(&elem.tag).is_some_and(|d| d.observes(name));

        self.tree.set_attribute(node, name, value);
        if observed {
            self.reactions.push_back(LifecycleCallbackInfo::attribute_changed(
                node, name, old_value, Some(value.to_string()),
            ));
        }
        Ok(())
    }

    /// Remove an attribute, queueing an AttributeChanged reaction if observed
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), DomError> {
        let elem = self.tree.element(node).ok_or(DomError::NotAnElement(node))?;
        let Some(old_value) = elem.get_attr(name).map(str::to_string) else {
            return Ok(());
        };
        let observed = self.custom_elements.get(&elem.tag).is_some_and(|d| d.observes(name));

        self.tree.remove_attribute(node, name);
        if observed {
            self.reactions.push_back(LifecycleCallbackInfo::attribute_changed(
                node, name, Some(old_value), None,
            ));
        }
        Ok(())
    }

    /// Drain queued lifecycle reactions in order
    pub fn take_reactions(&mut self) -> Vec<LifecycleCallbackInfo> {
        self.reactions.drain(..).collect()
    }

    /// Whether lifecycle reactions are waiting
    pub fn has_pending_reactions(&self) -> bool {
        !self.reactions.is_empty()
    }

    /// Current readiness
    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Fire DOMContentLoaded. Returns false if it already fired.
    pub fn mark_content_loaded(&mut self) -> bool {
        if self.ready_state == ReadyState::Interactive {
            return false;
        }
        self.ready_state = ReadyState::Interactive;
        tracing::info!("DOMContentLoaded: {}", self.url);
        self.tree.dispatch_event(DomEvent::content_loaded(self.tree.root()));
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LifecycleCallback;

    fn with_container() -> (Document, NodeId) {
        let mut doc = Document::default();
        doc.define("persistent-state", CustomElementOptions::observing(&["key"])).unwrap();
        let container = doc.create_element("persistent-state");
        (doc, container)
    }

    #[test]
    fn test_structure() {
        let doc = Document::new("https://example.com");
        assert_eq!(doc.tree().get(doc.head()).unwrap().parent, doc.document_element());
        assert_eq!(doc.tree().get(doc.body()).unwrap().parent, doc.document_element());
    }

    #[test]
    fn test_connected_reaction_only_when_connected() {
        let (mut doc, container) = with_container();
        let wrapper = doc.create_element("div");

        doc.append_child(wrapper, container);
        assert!(!doc.has_pending_reactions());

        let body = doc.body();
        doc.append_child(body, wrapper);
        let reactions = doc.take_reactions();
        assert_eq!(reactions, vec![LifecycleCallbackInfo::connected(container)]);
    }

    #[test]
    fn test_attribute_changed_only_for_observed() {
        let (mut doc, container) = with_container();
        let body = doc.body();
        doc.append_child(body, container);
        doc.take_reactions();

        doc.set_attribute(container, "class", "x").unwrap();
        assert!(!doc.has_pending_reactions());

        doc.set_attribute(container, "key", "k1").unwrap();
        doc.set_attribute(container, "key", "k2").unwrap();
        let reactions = doc.take_reactions();
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[1].callback, LifecycleCallback::AttributeChanged);
        assert_eq!(reactions[1].old_value.as_deref(), Some("k1"));
        assert_eq!(reactions[1].new_value.as_deref(), Some("k2"));
    }

    #[test]
    fn test_define_upgrades_existing() {
        let mut doc = Document::default();
        let body = doc.body();
        let el = doc.create_element("persistent-state");
        doc.append_child(body, el);
        assert!(!doc.has_pending_reactions());

        doc.define("persistent-state", CustomElementOptions::default()).unwrap();
        assert_eq!(doc.take_reactions(), vec![LifecycleCallbackInfo::connected(el)]);
    }

    #[test]
    fn test_set_attribute_on_text_fails() {
        let mut doc = Document::default();
        let text = doc.create_text("hi");
        assert_eq!(doc.set_attribute(text, "a", "b"), Err(DomError::NotAnElement(text)));
    }

    #[test]
    fn test_content_loaded_once() {
        let mut doc = Document::default();
        assert_eq!(doc.ready_state(), ReadyState::Loading);
        assert!(doc.mark_content_loaded());
        assert!(!doc.mark_content_loaded());
        assert_eq!(doc.ready_state(), ReadyState::Interactive);
    }
}
