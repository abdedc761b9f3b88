//! Persistent State
//!
//! Form controls inside a `<persistent-state>` element keep their values
//! across page reloads. Values live in a durable or a session scope and are
//! namespaced per container.
//!
//! # Example
//! ```rust,ignore
//! use persistent_state::{Config, Page};
//! use persistent_state::dom::interact::type_text;
//!
//! let mut page = Page::open(Config::default().with_durable_path("state.json"))?;
//! let container = page.create_element_with("persistent-state", &[("key", "signup")]);
//! let email = page.create_element_with("input", &[("type", "email"), ("id", "email")]);
//! page.tree_mut().append_child(container, email);
//! let body = page.body();
//! page.append_child(body, container)?;
//!
//! type_text(page.tree_mut(), email, "ada@example.com");
//! ```

pub mod demo;

pub use pstate_binding::{
    BindingContainer, BindingError, CapabilityConfig, CapabilityRegistry, Config, ControlKind,
    Namespace, Page, StateStore, StorageKey,
};
pub use pstate_storage::{StorageError, StorageScope};

// Re-export sub-crates for advanced usage
pub use pstate_binding as binding;
pub use pstate_dom as dom;
pub use pstate_storage as storage;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
