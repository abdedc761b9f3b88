//! DOM Observers
//!
//! MutationObserver restricted to attribute mutations. Delivery is
//! synchronous: callbacks run as soon as the attribute changes.

use std::fmt;
use std::rc::Rc;

use crate::{DomTree, NodeId};

/// Mutation observer options
#[derive(Debug, Clone, Default)]
pub struct MutationObserverInit {
    pub attributes: bool,
    pub attribute_old_value: bool,
    pub attribute_filter: Option<Vec<String>>,
}

impl MutationObserverInit {
    /// Watch every attribute
    pub fn attributes() -> Self {
        Self {
            attributes: true,
            ..Default::default()
        }
    }

    /// Watch only the named attributes
    pub fn attribute_filter(names: &[&str]) -> Self {
        Self {
            attributes: true,
            attribute_filter: Some(names.iter().map(|n| n.to_ascii_lowercase()).collect()),
            ..Default::default()
        }
    }

    fn matches(&self, record: &MutationRecord) -> bool {
        match record.mutation_type {
            MutationType::Attributes => {
                if !self.attributes {
                    return false;
                }
                match (&self.attribute_filter, &record.attribute_name) {
                    (Some(filter), Some(attr)) => filter.iter().any(|f| f.eq_ignore_ascii_case(attr)),
                    _ => true,
                }
            }
        }
    }
}

/// Mutation record
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub mutation_type: MutationType,
    pub target: NodeId,
    pub attribute_name: Option<String>,
    pub old_value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationType {
    Attributes,
}

/// Observer callback, invoked with the records and read access to the tree
pub type MutationCallback = Rc<dyn Fn(&[MutationRecord], &DomTree)>;

/// Handle returned by `DomTree::observe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

/// Registered observation
#[derive(Clone)]
pub(crate) struct Observation {
    pub id: ObserverId,
    pub target: NodeId,
    pub options: MutationObserverInit,
    pub callback: MutationCallback,
}

impl Observation {
    /// Record as seen by this observer, or None if filtered out
    pub fn filter(&self, record: &MutationRecord) -> Option<MutationRecord> {
        if record.target != self.target || !self.options.matches(record) {
            return None;
        }
        let mut delivered = record.clone();
        if !self.options.attribute_old_value {
            delivered.old_value = None;
        }
        Some(delivered)
    }
}

impl fmt::Debug for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observation")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
