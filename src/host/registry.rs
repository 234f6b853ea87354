//! Node Registry - Index allocation for the retained tree.
//!
//! Manages the lifecycle of node indices:
//! - Free index pool for O(1) reuse
//! - Recursive release (a released node takes its subtree with it)
//! - Parent links kept beside the slots, so nodes hold no back-references
//!
//! A [`NodeId`] is only meaningful while its index is allocated. Once released
//! the index may be handed to a new node, so the host never keeps ids of
//! removed nodes around.

use super::node::{Node, NodeId};

/// Arena of retained nodes.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    parents: Vec<Option<NodeId>>,
    free: Vec<usize>,
    allocated: usize,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an index for a new node, reusing a freed index when possible.
    pub fn allocate(&mut self, node: Node) -> NodeId {
        self.allocated += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(node);
            self.parents[index] = None;
            return NodeId(index);
        }
        self.slots.push(Some(node));
        self.parents.push(None);
        NodeId(self.slots.len() - 1)
    }

    /// Release a node and, recursively, all of its children.
    ///
    /// Returns the number of nodes released (0 if `id` was not allocated).
    pub fn release(&mut self, id: NodeId) -> usize {
        let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) else {
            return 0;
        };
        self.allocated -= 1;
        self.parents[id.0] = None;
        self.free.push(id.0);

        let mut released = 1;
        for child in node.children() {
            released += self.release(*child);
        }
        released
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// The node currently holding `id` in its child list, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Record (or clear) the parent link. Ignored for unallocated ids.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if self.is_allocated(id) {
            self.parents[id.0] = parent;
        }
    }

    /// True if `ancestor` is `id` itself or sits above it.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == ancestor {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    pub fn is_allocated(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Count of currently allocated nodes.
    pub fn len(&self) -> usize {
        self.allocated
    }

    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Highest index that has ever been handed out, plus one.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::node::{ElementKind, ElementNode, Kind};
    use crate::primitives::Props;

    fn element() -> Node {
        Node::Element(ElementNode::new(Kind::Known(ElementKind::Row), Props::new()))
    }

    #[test]
    fn test_allocate_index() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(element());
        let b = arena.allocate(Node::Text("x".into()));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert!(arena.is_allocated(a));
        assert!(arena.is_allocated(b));
        assert!(!arena.is_allocated(NodeId(2)));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_release_and_reuse() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(element());
        let b = arena.allocate(element());

        assert_eq!(arena.release(a), 1);
        assert!(!arena.is_allocated(a));
        assert!(arena.is_allocated(b));

        // Should reuse the freed index
        let c = arena.allocate(element());
        assert_eq!(c, a);
        assert_eq!(arena.capacity(), 2);
    }

    #[test]
    fn test_release_is_recursive() {
        let mut arena = NodeArena::new();
        let leaf = arena.allocate(Node::Text("leaf".into()));
        let inner = arena.allocate(element());
        arena
            .get_mut(inner)
            .and_then(Node::as_element_mut)
            .unwrap()
            .children
            .push(leaf);
        let outer = arena.allocate(element());
        arena
            .get_mut(outer)
            .and_then(Node::as_element_mut)
            .unwrap()
            .children
            .push(inner);

        assert_eq!(arena.release(outer), 3);
        assert!(arena.is_empty());
        assert!(!arena.is_allocated(leaf));
    }

    #[test]
    fn test_parent_links() {
        let mut arena = NodeArena::new();
        let outer = arena.allocate(element());
        let inner = arena.allocate(element());
        let leaf = arena.allocate(Node::Text("leaf".into()));
        arena.set_parent(inner, Some(outer));
        arena.set_parent(leaf, Some(inner));

        assert_eq!(arena.parent(leaf), Some(inner));
        assert_eq!(arena.parent(outer), None);
        assert!(arena.is_ancestor_or_self(outer, leaf));
        assert!(arena.is_ancestor_or_self(leaf, leaf));
        assert!(!arena.is_ancestor_or_self(leaf, outer));

        // Released slots forget their parent, and reuse starts detached
        arena.release(leaf);
        assert_eq!(arena.parent(leaf), None);
        let reused = arena.allocate(element());
        assert_eq!(reused, leaf);
        assert_eq!(arena.parent(reused), None);
    }

    #[test]
    fn test_double_release_is_noop() {
        let mut arena = NodeArena::new();
        let a = arena.allocate(element());
        assert_eq!(arena.release(a), 1);
        assert_eq!(arena.release(a), 0);
        assert_eq!(arena.len(), 0);
    }
}
