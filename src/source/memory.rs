//! In-memory tree-structured configuration source.

use std::sync::{PoisonError, RwLock};

use crate::error::ConfigError;
use crate::source::handler::ConfigurationNodeHandler;
use crate::source::node::{ConfigurationNode, NodeRef};
use crate::source::{ConfigurationSource, HierarchicalConfigurationSource};

/// Configuration source that keeps its whole tree in memory.
///
/// A new source, and a cleared one, has an empty root node.
#[derive(Debug)]
pub struct InMemoryConfigurationSource {
    root: RwLock<NodeRef>,
    handler: ConfigurationNodeHandler,
}

impl InMemoryConfigurationSource {
    pub fn new() -> Self {
        Self::with_root(ConfigurationNode::new())
    }

    pub fn with_root(root: NodeRef) -> Self {
        Self {
            root: RwLock::new(root),
            handler: ConfigurationNodeHandler,
        }
    }
}

impl Default for InMemoryConfigurationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationSource for InMemoryConfigurationSource {
    fn clear(&self) {
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = ConfigurationNode::new();
    }
}

impl HierarchicalConfigurationSource for InMemoryConfigurationSource {
    type Node = NodeRef;
    type Handler = ConfigurationNodeHandler;

    fn root_node(&self) -> NodeRef {
        self.root
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_root_node(&self, root: Option<NodeRef>) -> Result<(), ConfigError> {
        let root = root.ok_or_else(|| ConfigError::invalid_argument("root node must not be empty"))?;
        *self.root.write().unwrap_or_else(PoisonError::into_inner) = root;
        Ok(())
    }

    fn node_handler(&self) -> &ConfigurationNodeHandler {
        &self.handler
    }
}
