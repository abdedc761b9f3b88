//! Page host
//!
//! Owns one document, the page-wide capability registry, the state store
//! and every connected container. Tree edits that go through the page
//! have their custom-element reactions processed right away.

use std::rc::Rc;

use pstate_dom::{
    CustomElementOptions, Document, DomTree, LifecycleCallback, LifecycleCallbackInfo, NodeId,
    ReadyState,
};
use pstate_storage::{KeyValueStore, Storage, StorageArea};

use crate::config::Config;
use crate::container::BindingContainer;
use crate::registry::{CapabilityConfig, CapabilityRegistry, RegistrySlot};
use crate::store::{SharedStore, StateStore};
use crate::BindingError;

/// A loaded page with persistent-state containers
#[derive(Debug)]
pub struct Page {
    config: Rc<Config>,
    document: Document,
    store: SharedStore,
    registry: RegistrySlot,
    containers: Vec<BindingContainer>,
}

impl Page {
    /// Open a page. The durable scope is backed by `config.durable_path`
    /// when set, the session scope always lives in memory.
    pub fn open(config: Config) -> Result<Self, BindingError> {
        let durable: Box<dyn KeyValueStore> = match &config.durable_path {
            Some(path) => Box::new(Storage::local(path)?),
            None => Box::new(Storage::session()),
        };
        let area = StorageArea::new(durable, Box::new(Storage::session()));
        let store = StateStore::new(area, config.prefix.clone()).shared();
        Self::with_store(config, store)
    }

    /// Open a page over an existing store
    pub fn with_store(config: Config, store: SharedStore) -> Result<Self, BindingError> {
        let mut document = Document::default();
        document.define(&config.container_tag, CustomElementOptions::observing(&["key"]))?;
        tracing::info!("Page opened, <{}> defined", config.container_tag);

        Ok(Self {
            config: Rc::new(config),
            document,
            store,
            registry: RegistrySlot::new(),
            containers: Vec::new(),
        })
    }

    /// Navigate again: a fresh document and registry over the same store,
    /// session scope included
    pub fn reload(self) -> Result<Self, BindingError> {
        tracing::info!("Reloading page");
        let config = Rc::unwrap_or_clone(self.config);
        Self::with_store(config, self.store)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The page-wide registry, created on first use
    pub fn registry(&self) -> Rc<CapabilityRegistry> {
        self.registry.get_or_create()
    }

    /// Offer a registry; the first one in place stays
    pub fn install_registry(&self, registry: Rc<CapabilityRegistry>) -> Rc<CapabilityRegistry> {
        self.registry.install(registry)
    }

    /// Register a custom element capability with the page registry
    pub fn register_custom_capability(&self, config: CapabilityConfig) {
        self.registry().register_custom_capability(config);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn tree(&self) -> &DomTree {
        &self.document.tree
    }

    /// Mutable tree. Edits made here bypass custom-element reactions.
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.document.tree
    }

    /// `<body>` of the document
    pub fn body(&self) -> NodeId {
        self.document.body()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.document.create_element(tag)
    }

    /// Create a detached element with attributes
    pub fn create_element_with(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let node = self.document.create_element(tag);
        for (name, value) in attrs {
            self.document.tree.set_attribute(node, name, value);
        }
        node
    }

    /// Append a child and process the resulting reactions
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), BindingError> {
        self.document.append_child(parent, child);
        self.process_reactions()
    }

    /// Remove a child and process the resulting reactions
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, BindingError> {
        let removed = self.document.remove_child(parent, child);
        self.process_reactions()?;
        Ok(removed)
    }

    /// Set an attribute and process the resulting reactions
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), BindingError> {
        self.document.set_attribute(node, name, value)?;
        self.process_reactions()
    }

    /// Remove an attribute and run the reactions it queued
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), BindingError> {
        self.document.remove_attribute(node, name)?;
        self.process_reactions()
    }

    /// Run queued custom-element reactions in order
    pub fn process_reactions(&mut self) -> Result<(), BindingError> {
        for reaction in self.document.take_reactions() {
            self.react(reaction)?;
        }
        Ok(())
    }

    fn react(&mut self, reaction: LifecycleCallbackInfo) -> Result<(), BindingError> {
        let element = reaction.element;
        let is_container = self
            .document
            .tree
            .tag(element)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(&self.config.container_tag));
        if !is_container {
            return Ok(());
        }

        match reaction.callback {
            LifecycleCallback::Connected => self.connect_container(element)?,
            LifecycleCallback::AttributeChanged => {
                let name = reaction.attribute_name.as_deref().unwrap_or_default();
                let tree = &mut self.document.tree;
                if let Some(container) = self.containers.iter_mut().find(|c| c.element() == element) {
                    container.attribute_changed(tree, name);
                }
            }
            LifecycleCallback::Disconnected => {
                tracing::debug!("Container {} disconnected", element);
            }
        }
        Ok(())
    }

    fn connect_container(&mut self, element: NodeId) -> Result<(), BindingError> {
        let ready = self.document.ready_state() == ReadyState::Interactive;
        let registry = self.registry();
        let store = self.store.clone();
        let config = self.config.clone();
        let tree = &mut self.document.tree;

        if let Some(existing) = self.containers.iter_mut().find(|c| c.element() == element) {
            existing.connect(tree, ready);
            return Ok(());
        }
        let mut container = BindingContainer::new(element, tree, registry, store, config)?;
        container.connect(tree, ready);
        self.containers.push(container);
        Ok(())
    }

    /// Document-ready milestone: fires DOMContentLoaded once and runs the
    /// deferred discovery pass of every container. Returns the number of
    /// controls bound by that pass.
    pub fn document_ready(&mut self) -> Result<usize, BindingError> {
        self.process_reactions()?;
        if !self.document.mark_content_loaded() {
            return Ok(0);
        }
        let tree = &mut self.document.tree;
        let bound = self
            .containers
            .iter_mut()
            .map(|container| container.document_ready(tree))
            .sum();
        tracing::info!("Document ready, {} controls bound late", bound);
        Ok(bound)
    }

    /// Container created for `element`
    pub fn container(&self, element: NodeId) -> Option<&BindingContainer> {
        self.containers.iter().find(|c| c.element() == element)
    }

    /// Every container, in connection order
    pub fn containers(&self) -> &[BindingContainer] {
        &self.containers
    }

    /// Clear the stored entries of one container's bound controls
    pub fn reset(&self, element: NodeId) -> usize {
        self.container(element)
            .map_or(0, |container| container.reset(&self.document.tree))
    }

    /// Clear every prefixed entry from both scopes
    pub fn reset_all(&self) -> usize {
        self.store.borrow_mut().reset_all()
    }

    /// Shared state store
    pub fn store(&self) -> &SharedStore {
        &self.store
    }
}
