//! pstate Binding Engine
//!
//! Keeps form controls inside `<persistent-state>` containers in sync with
//! a key/value store, so values survive reloads.
//!
//! # Example
//! ```rust,ignore
//! use pstate_binding::{Config, Page};
//!
//! let mut page = Page::open(Config::default().with_durable_path("state.json"))?;
//! let container = page.create_element_with("persistent-state", &[("key", "profile")]);
//! let input = page.create_element_with("input", &[("id", "name")]);
//! page.tree_mut().append_child(container, input);
//! page.append_child(page.body(), container)?;
//! page.document_ready()?;
//! ```

mod config;
mod container;
mod error;
mod keys;
mod kind;
mod page;
mod registry;
mod store;
mod watch;

pub use config::{Config, CONTAINER_TAG, DEFAULT_PREFIX, GLOBAL_INSTANCE_ID};
pub use container::{
    is_bound, BindingContainer, BoundControl, DiscoveryPhase, BOUND_MARKER, CONTROL_BOUND_EVENT,
};
pub use error::BindingError;
pub use keys::{instance_id, Namespace, StorageKey};
pub use kind::{Captured, ControlKind};
pub use page::Page;
pub use registry::{
    CapabilityAdapter, CapabilityConfig, CapabilityRegistry, ChangeExtractor, RegistrySlot,
    SUPPORTED_INPUT_TYPES, SUPPORTED_TAGS,
};
pub use store::{coerce_to_string, is_truthy, SharedStore, StateStore};
pub use watch::{ChangeSignal, ChangeSink, ChangeWatch, WatchHandle};
