//! Host - the retained element tree and its lifecycle contract.
//!
//! The reconciler never touches nodes directly. It drives the tree through
//! [`HostConfig`], the same fixed set of callbacks a declarative renderer
//! expects from its host: create, append, insert, remove, update and the
//! two commit hooks. [`InstanceHost`] is the only implementation.
//!
//! # Modules
//!
//! - [`node`] - `NodeId`, `ElementKind`, `Node`, `Identity`
//! - [`registry`] - index arena with free-index reuse
//! - [`identity`] - per-kind identity allocator
//! - [`instance`] - `InstanceHost`

pub mod identity;
pub mod instance;
pub mod node;
pub mod registry;

pub use identity::IdentityAllocator;
pub use instance::InstanceHost;
pub use node::{ElementKind, ElementNode, Identity, Kind, Node, NodeId};
pub use registry::NodeArena;

use crate::error::Result;
use crate::primitives::Props;

/// Update descriptor produced by [`HostConfig::prepare_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePayload {
    /// The complete new property set, minus `children`.
    pub props: Props,
    /// New primitive text for a text-bearing node, when it changed.
    pub text: Option<String>,
}

/// Lifecycle callbacks invoked by the reconciler.
///
/// Calls between [`prepare_for_commit`](HostConfig::prepare_for_commit) and
/// [`reset_after_commit`](HostConfig::reset_after_commit) form one commit.
/// No implementation may draw or talk to the engine.
pub trait HostConfig {
    /// Create an element. A primitive `children` value becomes a synthetic
    /// text leaf; unknown kinds are stored as-is.
    fn create_instance(&mut self, kind: &str, props: &Props) -> NodeId;

    fn create_text_instance(&mut self, text: &str) -> NodeId;

    /// Append while building a fresh subtree.
    fn append_initial_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    /// Append to the end. A child already under `parent` is moved.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    fn append_child_to_container(&mut self, child: NodeId) -> Result<()>;

    /// Insert `child` immediately before `before`, which must be a child of `parent`.
    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<()>;

    fn insert_in_container_before(&mut self, child: NodeId, before: NodeId) -> Result<()>;

    /// Detach `child` and release its whole subtree.
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()>;

    fn remove_child_from_container(&mut self, child: NodeId) -> Result<()>;

    /// Diff two property sets. `None` means nothing but `children` changed.
    fn prepare_update(&self, node: NodeId, old: &Props, new: &Props) -> Option<UpdatePayload>;

    /// Apply a payload from `prepare_update`. Structural children are untouched.
    fn commit_update(&mut self, node: NodeId, payload: UpdatePayload) -> Result<()>;

    fn commit_text_update(&mut self, node: NodeId, text: &str) -> Result<()>;

    /// Drop the synthetic text of a node that is becoming structural.
    fn reset_text_content(&mut self, node: NodeId) -> Result<()>;

    /// Remove every child of the root container.
    fn clear_container(&mut self);

    /// Whether this element's content is a single primitive value.
    fn should_set_text_content(&self, kind: &str, props: &Props) -> bool;

    fn prepare_for_commit(&mut self);

    /// Commit finished: starts a new identity allocation cycle.
    fn reset_after_commit(&mut self);
}
