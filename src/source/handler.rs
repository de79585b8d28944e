//! Pluggable node access.
//!
//! Code that walks a configuration tree goes through a [`NodeHandler`] so it
//! does not depend on the concrete node type a source uses.

use crate::error::ConfigError;
use crate::source::node::{ConfigurationNode, NodeRef};

/// Access to the structure of nodes of type `N`.
pub trait NodeHandler<N>: Send + Sync {
    fn node_name(&self, node: &N) -> Option<String>;

    fn value(&self, node: &N) -> Option<String>;

    fn set_value(&self, node: &N, value: Option<String>);

    fn parent(&self, node: &N) -> Option<N>;

    fn children(&self, node: &N) -> Vec<N>;

    fn children_named(&self, node: &N, name: &str) -> Vec<N>;

    fn child(&self, node: &N, index: usize) -> Option<N>;

    /// Number of children, or of children named `name` if given.
    fn children_count(&self, node: &N, name: Option<&str>) -> usize;

    /// Create a child named `name` below `node` and return it.
    fn add_child(&self, node: &N, name: &str) -> Result<N, ConfigError>;

    fn remove_child(&self, node: &N, child: &N) -> bool;

    /// Distinct attribute names of `node`, in first-seen order.
    fn attributes(&self, node: &N) -> Vec<String>;

    /// Value of the first attribute named `name`.
    fn attribute_value(&self, node: &N, name: &str) -> Option<String>;

    /// Replace all attributes named `name` with a single one holding `value`.
    fn set_attribute_value(&self, node: &N, name: &str, value: &str) -> Result<(), ConfigError>;

    fn remove_attribute(&self, node: &N, name: &str) -> bool;
}

/// [`NodeHandler`] for [`ConfigurationNode`] trees.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigurationNodeHandler;

impl NodeHandler<NodeRef> for ConfigurationNodeHandler {
    fn node_name(&self, node: &NodeRef) -> Option<String> {
        node.name()
    }

    fn value(&self, node: &NodeRef) -> Option<String> {
        node.value()
    }

    fn set_value(&self, node: &NodeRef, value: Option<String>) {
        node.set_value(value);
    }

    fn parent(&self, node: &NodeRef) -> Option<NodeRef> {
        node.parent()
    }

    fn children(&self, node: &NodeRef) -> Vec<NodeRef> {
        node.children()
    }

    fn children_named(&self, node: &NodeRef, name: &str) -> Vec<NodeRef> {
        node.children_named(name)
    }

    fn child(&self, node: &NodeRef, index: usize) -> Option<NodeRef> {
        node.child(index)
    }

    fn children_count(&self, node: &NodeRef, name: Option<&str>) -> usize {
        match name {
            Some(name) => node.children_count_named(name),
            None => node.children_count(),
        }
    }

    fn add_child(&self, node: &NodeRef, name: &str) -> Result<NodeRef, ConfigError> {
        let child = ConfigurationNode::named(name);
        node.add_child(child.clone())?;
        Ok(child)
    }

    fn remove_child(&self, node: &NodeRef, child: &NodeRef) -> bool {
        node.remove_child(child)
    }

    fn attributes(&self, node: &NodeRef) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in node.attributes().iter().filter_map(|a| a.name()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    fn attribute_value(&self, node: &NodeRef, name: &str) -> Option<String> {
        node.attributes_named(name).first().and_then(|a| a.value())
    }

    fn set_attribute_value(&self, node: &NodeRef, name: &str, value: &str) -> Result<(), ConfigError> {
        node.remove_attributes_named(name);
        node.add_attribute(ConfigurationNode::with_value(name, value))
    }

    fn remove_attribute(&self, node: &NodeRef, name: &str) -> bool {
        node.remove_attributes_named(name)
    }
}
