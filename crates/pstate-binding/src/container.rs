//! Binding Container
//!
//! A `<persistent-state>` element owns one storage namespace. When it is
//! connected it discovers its persistable descendants and binds each one:
//! the stored value is restored into the control, then a change watch is
//! attached that writes every later change back to the store.
//!
//! Discovery runs on connect and once more when the document becomes
//! ready, so controls parsed after the container are still picked up. A
//! per-element marker keeps any control from being bound twice, even by
//! two nested containers.

use std::rc::Rc;

use serde_json::Value;

use pstate_dom::{DomEvent, DomEventType, DomTree, NodeId};
use pstate_storage::StorageScope;

use crate::config::Config;
use crate::keys::{Namespace, StorageKey};
use crate::kind::ControlKind;
use crate::registry::CapabilityRegistry;
use crate::store::SharedStore;
use crate::watch::{ChangeSignal, ChangeSink, WatchHandle};
use crate::BindingError;

/// Element property set on every bound control
pub const BOUND_MARKER: &str = "persistentStateBound";

/// Event dispatched on a control once it is bound. It bubbles through the
/// control's ancestors and carries the control as `related_node`.
pub const CONTROL_BOUND_EVENT: &str = "persistent-state::bound";

/// Where a container is in its discovery protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPhase {
    /// Connected, the document-ready pass is still due
    AwaitingReady,
    /// Every discovery pass has run
    Settled,
}

/// A control bound by a container
#[derive(Debug)]
pub struct BoundControl {
    pub node: NodeId,
    pub kind: ControlKind,
    /// Key the change watch writes to
    pub key: StorageKey,
    pub watch: WatchHandle,
}

/// Whether `node` has been bound by any container
pub fn is_bound(tree: &DomTree, node: NodeId) -> bool {
    matches!(tree.property(node, BOUND_MARKER), Some(Value::Bool(true)))
}

/// Scoping element that persists its descendants' values
#[derive(Debug)]
pub struct BindingContainer {
    element: NodeId,
    scope: StorageScope,
    config: Rc<Config>,
    registry: Rc<CapabilityRegistry>,
    store: SharedStore,
    /// Discovery list of the latest pass; indices are ordinals
    discovered: Vec<NodeId>,
    bound: Vec<BoundControl>,
    phase: DiscoveryPhase,
}

impl BindingContainer {
    /// Create a container for `element`, which must carry the configured
    /// container tag
    pub fn new(
        element: NodeId,
        tree: &DomTree,
        registry: Rc<CapabilityRegistry>,
        store: SharedStore,
        config: Rc<Config>,
    ) -> Result<Self, BindingError> {
        let is_container = tree
            .tag(element)
            .is_some_and(|tag| tag.eq_ignore_ascii_case(&config.container_tag));
        if !is_container {
            return Err(BindingError::NotAContainer {
                node: element,
                expected: config.container_tag.clone(),
            });
        }

        Ok(Self {
            element,
            scope: scope_of(tree, element),
            config,
            registry,
            store,
            discovered: Vec::new(),
            bound: Vec::new(),
            phase: DiscoveryPhase::AwaitingReady,
        })
    }

    /// Container was connected. Captures the scope and runs the first
    /// discovery pass. If the document is already ready no second pass
    /// follows.
    pub fn connect(&mut self, tree: &mut DomTree, document_ready: bool) -> usize {
        self.scope = scope_of(tree, self.element);
        let bound = self.discover(tree);
        if document_ready {
            self.phase = DiscoveryPhase::Settled;
        }
        tracing::debug!(
            "Container {} connected ({} scope, {} controls bound)",
            self.element, self.scope, bound
        );
        bound
    }

    /// Document-ready milestone: the deferred discovery pass
    pub fn document_ready(&mut self, tree: &mut DomTree) -> usize {
        if self.phase == DiscoveryPhase::Settled {
            return 0;
        }
        self.phase = DiscoveryPhase::Settled;
        self.discover(tree)
    }

    /// Scan descendants and bind every supported, unbound control.
    /// Returns the number of newly bound controls.
    pub fn discover(&mut self, tree: &mut DomTree) -> usize {
        let mut discovered = Vec::new();
        for tag in self.registry.discovery_tags() {
            discovered.extend(tree.elements_by_tag(self.element, &tag));
        }

        let mut count = 0;
        for (ordinal, &node) in discovered.iter().enumerate() {
            if self.bind(tree, node, ordinal) {
                count += 1;
            }
        }
        self.discovered = discovered;
        count
    }

    /// Bind one control. Returns false if it was already bound or is not
    /// persistable.
    pub fn bind(&mut self, tree: &mut DomTree, node: NodeId, ordinal: usize) -> bool {
        if is_bound(tree, node) {
            return false;
        }
        let Some(kind) = ControlKind::classify(&self.registry, tree, node) else {
            tracing::trace!("Skipping unsupported element {}", node);
            return false;
        };

        let key = kind.storage_key(tree, node, ordinal);
        let ns = self.namespace(tree);
        kind.restore(tree, node, &self.store, &ns, &key);

        let sink = self.sink(kind.clone(), key.clone());
        let watch = kind.watch().attach(tree, node, sink);
        tree.set_property(node, BOUND_MARKER, Value::Bool(true));
        tracing::debug!("Bound {} control {} as {}", kind.name(), node, key);

        let mut event = DomEvent::new(DomEventType::parse(CONTROL_BOUND_EVENT), node, true);
        event.composed = true;
        event.related_node = Some(node);
        tree.dispatch_event(event);

        self.bound.push(BoundControl { node, kind, key, watch });
        true
    }

    /// Change sink for one control. The namespace is resolved when the
    /// change happens, so it follows later `key` changes.
    fn sink(&self, kind: ControlKind, key: StorageKey) -> ChangeSink {
        let store = self.store.clone();
        let config = self.config.clone();
        let element = self.element;
        let scope = self.scope;

        Rc::new(move |signal: ChangeSignal<'_>, tree: &DomTree| {
            let Some(captured) = kind.capture(tree, signal) else {
                return;
            };
            let ns = Namespace::resolve(tree, element, scope, &config.global_instance_id);
            match store.try_borrow_mut() {
                Ok(mut store) => captured.write(&mut store, &ns, &key),
                Err(_) => tracing::warn!("Store busy, dropped change of {}", key),
            }
        })
    }

    /// Namespace as the container's attributes stand right now
    pub fn namespace(&self, tree: &DomTree) -> Namespace {
        Namespace::resolve(tree, self.element, self.scope, &self.config.global_instance_id)
    }

    /// Observed attribute changed. A new `key` moves the container to
    /// another namespace and re-initializes its bound controls from it.
    pub fn attribute_changed(&mut self, tree: &mut DomTree, name: &str) -> usize {
        if !name.eq_ignore_ascii_case("key") {
            return 0;
        }
        self.restore_all(tree)
    }

    /// Re-initialize every bound control from the current namespace.
    /// Returns how many controls were assigned a value.
    pub fn restore_all(&mut self, tree: &mut DomTree) -> usize {
        let ns = self.namespace(tree);
        tracing::debug!("Restoring container {} from [{}]", self.element, ns.instance_id);

        let mut restored = 0;
        for control in &self.bound {
            let ordinal = self
                .discovered
                .iter()
                .position(|&n| n == control.node)
                .unwrap_or_default();
            let key = control.kind.storage_key(tree, control.node, ordinal);
            if control.kind.restore(tree, control.node, &self.store, &ns, &key) {
                restored += 1;
            }
        }
        restored
    }

    /// Remove the stored entry of every bound control from the current
    /// namespace. Displayed values are left as they are.
    pub fn reset(&self, tree: &DomTree) -> usize {
        let ns = self.namespace(tree);
        let mut store = self.store.borrow_mut();
        for control in &self.bound {
            store.remove(&ns, &control.key);
        }
        tracing::info!("Reset {} controls of [{}]", self.bound.len(), ns.instance_id);
        self.bound.len()
    }

    /// Container element
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Scope captured at connect time
    pub fn scope(&self) -> StorageScope {
        self.scope
    }

    pub fn phase(&self) -> DiscoveryPhase {
        self.phase
    }

    /// Controls bound by this container, in binding order
    pub fn bound(&self) -> &[BoundControl] {
        &self.bound
    }

    /// Discovery list of the latest pass
    pub fn discovered(&self) -> &[NodeId] {
        &self.discovered
    }
}

fn scope_of(tree: &DomTree, element: NodeId) -> StorageScope {
    StorageScope::from_type_attr(tree.get_attribute(element, "type"))
}
