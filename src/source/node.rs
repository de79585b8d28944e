//! Configuration tree nodes.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::error::ConfigError;

/// Shared handle to a node. Identity is the `Arc` pointer.
pub type NodeRef = Arc<ConfigurationNode>;

#[derive(Default)]
struct NodeData {
    name: Option<String>,
    value: Option<String>,
    reference: Option<String>,
    attribute: bool,
    parent: Weak<ConfigurationNode>,
    children: Vec<NodeRef>,
    attributes: Vec<NodeRef>,
}

/// A node of a hierarchical configuration: optional name, value and
/// reference, plus ordered children and attributes.
///
/// Attributes are nodes themselves; they carry a name and a value and are
/// flagged with [`is_attribute`](Self::is_attribute).
#[derive(Default)]
pub struct ConfigurationNode {
    data: RwLock<NodeData>,
}

impl ConfigurationNode {
    /// An empty node: no name, value, reference, children or attributes.
    pub fn new() -> NodeRef {
        Arc::new(Self::default())
    }

    pub fn named(name: impl Into<String>) -> NodeRef {
        let node = Self::new();
        node.set_name(Some(name.into()));
        node
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> NodeRef {
        let node = Self::named(name);
        node.set_value(Some(value.into()));
        node
    }

    fn read(&self) -> RwLockReadGuard<'_, NodeData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name(&self) -> Option<String> {
        self.read().name.clone()
    }

    pub fn set_name(&self, name: Option<String>) {
        self.write().name = name;
    }

    pub fn value(&self) -> Option<String> {
        self.read().value.clone()
    }

    pub fn set_value(&self, value: Option<String>) {
        self.write().value = value;
    }

    /// Opaque reference to where the node came from (e.g. a source element).
    pub fn reference(&self) -> Option<String> {
        self.read().reference.clone()
    }

    pub fn set_reference(&self, reference: Option<String>) {
        self.write().reference = reference;
    }

    pub fn is_attribute(&self) -> bool {
        self.read().attribute
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.read().parent.upgrade()
    }

    /// Append `child`. The child must have a name.
    pub fn add_child(self: &Arc<Self>, child: NodeRef) -> Result<(), ConfigError> {
        self.attach(child, false)
    }

    /// Append `attribute`. The attribute node must have a name.
    pub fn add_attribute(self: &Arc<Self>, attribute: NodeRef) -> Result<(), ConfigError> {
        self.attach(attribute, true)
    }

    fn attach(self: &Arc<Self>, node: NodeRef, attribute: bool) -> Result<(), ConfigError> {
        if Arc::ptr_eq(self, &node) {
            return Err(ConfigError::invalid_argument("a node cannot contain itself"));
        }
        {
            let mut data = node.write();
            if data.name.is_none() {
                return Err(ConfigError::invalid_argument(if attribute {
                    "attribute node must have a name"
                } else {
                    "child node must have a name"
                }));
            }
            data.attribute = attribute;
            data.parent = Arc::downgrade(self);
        }
        let mut data = self.write();
        if attribute {
            data.attributes.push(node);
        } else {
            data.children.push(node);
        }
        Ok(())
    }

    pub fn children(&self) -> Vec<NodeRef> {
        self.read().children.clone()
    }

    pub fn children_named(&self, name: &str) -> Vec<NodeRef> {
        filter_named(&self.read().children, name)
    }

    pub fn child(&self, index: usize) -> Option<NodeRef> {
        self.read().children.get(index).cloned()
    }

    pub fn children_count(&self) -> usize {
        self.read().children.len()
    }

    pub fn children_count_named(&self, name: &str) -> usize {
        self.children_named(name).len()
    }

    pub fn attributes(&self) -> Vec<NodeRef> {
        self.read().attributes.clone()
    }

    pub fn attributes_named(&self, name: &str) -> Vec<NodeRef> {
        filter_named(&self.read().attributes, name)
    }

    pub fn attribute(&self, index: usize) -> Option<NodeRef> {
        self.read().attributes.get(index).cloned()
    }

    pub fn attribute_count(&self) -> usize {
        self.read().attributes.len()
    }

    /// Remove `child` (by identity). Returns false if it is not a child.
    pub fn remove_child(&self, child: &NodeRef) -> bool {
        detach(&mut self.write().children, child)
    }

    /// Remove all children named `name`. Returns false if there were none.
    pub fn remove_children_named(&self, name: &str) -> bool {
        detach_named(&mut self.write().children, name)
    }

    pub fn remove_children(&self) {
        for child in std::mem::take(&mut self.write().children) {
            child.write().parent = Weak::new();
        }
    }

    /// Remove `attribute` (by identity). Returns false if it is not an attribute.
    pub fn remove_attribute(&self, attribute: &NodeRef) -> bool {
        detach(&mut self.write().attributes, attribute)
    }

    pub fn remove_attributes_named(&self, name: &str) -> bool {
        detach_named(&mut self.write().attributes, name)
    }

    pub fn remove_attributes(&self) {
        for attribute in std::mem::take(&mut self.write().attributes) {
            attribute.write().parent = Weak::new();
        }
    }
}

fn filter_named(nodes: &[NodeRef], name: &str) -> Vec<NodeRef> {
    nodes
        .iter()
        .filter(|n| n.read().name.as_deref() == Some(name))
        .cloned()
        .collect()
}

fn detach(nodes: &mut Vec<NodeRef>, target: &NodeRef) -> bool {
    match nodes.iter().position(|n| Arc::ptr_eq(n, target)) {
        Some(index) => {
            let removed = nodes.remove(index);
            removed.write().parent = Weak::new();
            true
        }
        None => false,
    }
}

fn detach_named(nodes: &mut Vec<NodeRef>, name: &str) -> bool {
    let before = nodes.len();
    nodes.retain(|n| {
        let mut data = n.write();
        if data.name.as_deref() == Some(name) {
            data.parent = Weak::new();
            false
        } else {
            true
        }
    });
    nodes.len() != before
}

impl fmt::Debug for ConfigurationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.read();
        f.debug_struct("ConfigurationNode")
            .field("name", &data.name)
            .field("value", &data.value)
            .field("reference", &data.reference)
            .field("attributes", &data.attributes)
            .field("children", &data.children)
            .finish()
    }
}
