//! pstate Storage
//!
//! Key/value backends for persisted control state: a durable scope that
//! survives restarts and a session scope that lives as long as the process.

mod area;
mod error;
mod storage;

pub use area::{StorageArea, StorageScope};
pub use error::StorageError;
pub use storage::{KeyValueStore, Storage};
