//! Configuration sources.
//!
//! A source stores configuration data; builders and reloading detectors
//! treat it as an external collaborator.
//!
//! # Design Decisions
//! - Tree-structured sources expose their root node plus a [`NodeHandler`]
//!   so traversal code is independent of the node type
//! - Sources are shared across threads; mutation goes through `&self`

pub mod handler;
pub mod memory;
pub mod node;

pub use handler::{ConfigurationNodeHandler, NodeHandler};
pub use memory::InMemoryConfigurationSource;
pub use node::{ConfigurationNode, NodeRef};

use crate::error::ConfigError;

/// Base capability of every configuration source.
pub trait ConfigurationSource: Send + Sync {
    /// Remove all data, leaving the source as if freshly constructed.
    fn clear(&self);
}

/// A source whose data is a tree of nodes.
pub trait HierarchicalConfigurationSource: ConfigurationSource {
    type Node;
    type Handler: NodeHandler<Self::Node>;

    fn root_node(&self) -> Self::Node;

    /// Replace the root node. `None` is rejected and the current root kept.
    fn set_root_node(&self, root: Option<Self::Node>) -> Result<(), ConfigError>;

    fn node_handler(&self) -> &Self::Handler;
}
