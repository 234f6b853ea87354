//! Instance Host - the retained tree behind the lifecycle contract.
//!
//! The host owns the node arena and the single root container. Everything
//! here mutates the tree and nothing else: no engine calls, no drawing.

use tracing::{debug, trace};

use super::identity::IdentityAllocator;
use super::node::{explicit_identity, ElementKind, ElementNode, Identity, Kind, Node, NodeId};
use super::registry::NodeArena;
use super::{HostConfig, UpdatePayload};
use crate::error::{Error, Result};
use crate::primitives::{prop, Props, Value};

/// Retained element tree plus identity allocator.
#[derive(Debug)]
pub struct InstanceHost {
    arena: NodeArena,
    root: NodeId,
    identities: IdentityAllocator,
    commits: u64,
    in_commit: bool,
}

impl Default for InstanceHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceHost {
    /// Create a host with an empty root container.
    pub fn new() -> Self {
        let mut arena = NodeArena::new();
        let root = arena.allocate(Node::Element(ElementNode::new(
            Kind::Known(ElementKind::Window),
            Props::new(),
        )));
        Self {
            arena,
            root,
            identities: IdentityAllocator::new(),
            commits: 0,
            in_commit: false,
        }
    }

    /// The root container. Never released.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.arena.get(id).ok_or(Error::StaleNode(id))
    }

    pub fn element(&self, id: NodeId) -> Result<&ElementNode> {
        self.node(id)?.as_element().ok_or(Error::NodeType {
            node: id,
            expected: "an element",
        })
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Concatenated text-leaf payloads under `id`, depth-first, left to right.
    pub fn text_content(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        self.collect_text(id, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) -> Result<()> {
        match self.node(id)? {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                for child in &el.children {
                    self.collect_text(*child, out)?;
                }
            }
        }
        Ok(())
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Completed commits (`reset_after_commit` calls).
    pub fn commit_count(&self) -> u64 {
        self.commits
    }

    pub fn in_commit(&self) -> bool {
        self.in_commit
    }

    pub fn identities(&self) -> &IdentityAllocator {
        &self.identities
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementNode> {
        self.arena
            .get_mut(id)
            .ok_or(Error::StaleNode(id))?
            .as_element_mut()
            .ok_or(Error::NodeType {
                node: id,
                expected: "an element",
            })
    }

    fn ensure_allocated(&self, id: NodeId) -> Result<()> {
        if self.arena.is_allocated(id) {
            Ok(())
        } else {
            Err(Error::StaleNode(id))
        }
    }

    /// Drop `child` from `parent`'s list if it is there, without releasing it.
    fn detach(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let children = &mut self.element_mut(parent)?.children;
        match children.iter().position(|c| *c == child) {
            Some(pos) => {
                children.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Prepare `child` to be placed under `parent`: reject cycles and take it
    /// out of whichever list currently holds it.
    fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.ensure_allocated(child)?;
        self.element(parent)?;
        if self.arena.is_ancestor_or_self(child, parent) {
            return Err(Error::Cycle { parent, child });
        }
        if let Some(old) = self.arena.parent(child) {
            self.detach(old, child)?;
        }
        self.arena.set_parent(child, Some(parent));
        Ok(())
    }

    /// Replace (or create) the synthetic text leaf of a text-bearing node.
    fn set_text_leaf(&mut self, node: NodeId, text: String) -> Result<()> {
        let first = self.element(node)?.children.first().copied();
        if let Some(leaf) = first {
            if let Some(Node::Text(payload)) = self.arena.get_mut(leaf) {
                *payload = text;
                return Ok(());
            }
        }
        let leaf = self.arena.allocate(Node::Text(text));
        self.arena.set_parent(leaf, Some(node));
        self.element_mut(node)?.children.insert(0, leaf);
        Ok(())
    }

    /// Walk the tree in projection order and hand out fresh identities to
    /// every identity-requiring node without an explicit key.
    fn assign_identities(&mut self) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(Node::Element(el)) = self.arena.get_mut(id) else {
                continue;
            };
            if let Some(kind) = el.kind.known().filter(|k| k.requires_identity()) {
                el.identity = Some(
                    explicit_identity(&el.props).unwrap_or_else(|| self.identities.next(kind)),
                );
            }
            stack.extend(el.children.iter().rev());
        }
    }
}

/// Split `children` off a property set, returning its primitive text if any.
fn split_children(props: &Props) -> (Props, Option<String>) {
    let mut rest = props.clone();
    let text = rest.remove(prop::CHILDREN).and_then(|v| v.to_text());
    (rest, text)
}

impl HostConfig for InstanceHost {
    fn create_instance(&mut self, kind: &str, props: &Props) -> NodeId {
        let (stored, text) = split_children(props);
        let kind = Kind::parse(kind);
        let mut el = ElementNode::new(kind, stored);

        if el.identity.is_none() {
            if let Some(k) = el.kind.known().filter(|k| k.requires_identity()) {
                el.identity = Some(self.identities.next(k));
            }
        }
        let leaf = text.map(|text| self.arena.allocate(Node::Text(text)));
        el.children.extend(leaf);

        let kind_name = el.kind.to_string();
        let id = self.arena.allocate(Node::Element(el));
        if let Some(leaf) = leaf {
            self.arena.set_parent(leaf, Some(id));
        }
        trace!(node = %id, kind = %kind_name, "create_instance");
        id
    }

    fn create_text_instance(&mut self, text: &str) -> NodeId {
        let id = self.arena.allocate(Node::Text(text.to_string()));
        trace!(node = %id, "create_text_instance");
        id
    }

    fn append_initial_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.append_child(parent, child)
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.attach(parent, child)?;
        self.element_mut(parent)?.children.push(child);
        trace!(%parent, %child, "append_child");
        Ok(())
    }

    fn append_child_to_container(&mut self, child: NodeId) -> Result<()> {
        self.append_child(self.root, child)
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<()> {
        self.ensure_allocated(child)?;
        if child == before {
            return Ok(());
        }
        if !self.element(parent)?.children.contains(&before) {
            return Err(Error::StaleNode(before));
        }
        self.attach(parent, child)?;
        let children = &mut self.element_mut(parent)?.children;
        let pos = children
            .iter()
            .position(|c| *c == before)
            .ok_or(Error::StaleNode(before))?;
        children.insert(pos, child);
        trace!(%parent, %child, %before, "insert_before");
        Ok(())
    }

    fn insert_in_container_before(&mut self, child: NodeId, before: NodeId) -> Result<()> {
        self.insert_before(self.root, child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.detach(parent, child)? {
            return Err(Error::StaleNode(child));
        }
        let released = self.arena.release(child);
        trace!(%parent, %child, released, "remove_child");
        Ok(())
    }

    fn remove_child_from_container(&mut self, child: NodeId) -> Result<()> {
        self.remove_child(self.root, child)
    }

    fn prepare_update(&self, node: NodeId, old: &Props, new: &Props) -> Option<UpdatePayload> {
        let (old_rest, old_text) = split_children(old);
        let (new_rest, new_text) = split_children(new);
        let text = if new_text != old_text { new_text } else { None };
        if old_rest == new_rest && text.is_none() {
            return None;
        }
        trace!(%node, "prepare_update");
        Some(UpdatePayload {
            props: new_rest,
            text,
        })
    }

    fn commit_update(&mut self, node: NodeId, payload: UpdatePayload) -> Result<()> {
        let UpdatePayload { props, text } = payload;
        let el = self.element_mut(node)?;
        el.props = props;

        // Explicit keys win; a dropped key falls back to an allocated identity.
        let fresh = match (explicit_identity(&el.props), el.kind.known()) {
            (Some(key), _) => {
                el.identity = Some(key);
                None
            }
            (None, Some(kind)) if kind.requires_identity() => {
                (!matches!(el.identity, Some(Identity::Allocated { .. }))).then_some(kind)
            }
            (None, _) => {
                el.identity = None;
                None
            }
        };
        if let Some(kind) = fresh {
            let identity = self.identities.next(kind);
            self.element_mut(node)?.identity = Some(identity);
        }

        if let Some(text) = text {
            self.set_text_leaf(node, text)?;
        }
        trace!(%node, "commit_update");
        Ok(())
    }

    fn commit_text_update(&mut self, node: NodeId, text: &str) -> Result<()> {
        match self.arena.get_mut(node) {
            Some(Node::Text(payload)) => {
                *payload = text.to_string();
                trace!(%node, "commit_text_update");
                Ok(())
            }
            Some(Node::Element(_)) => Err(Error::NodeType {
                node,
                expected: "a text leaf",
            }),
            None => Err(Error::StaleNode(node)),
        }
    }

    fn reset_text_content(&mut self, node: NodeId) -> Result<()> {
        let el = self.element_mut(node)?;
        let children = std::mem::take(&mut el.children);
        let mut kept = Vec::with_capacity(children.len());
        for child in children {
            if matches!(self.arena.get(child), Some(Node::Text(_))) {
                self.arena.release(child);
            } else {
                kept.push(child);
            }
        }
        self.element_mut(node)?.children = kept;
        Ok(())
    }

    fn clear_container(&mut self) {
        let children = match self.element_mut(self.root) {
            Ok(el) => std::mem::take(&mut el.children),
            Err(_) => Vec::new(),
        };
        let released: usize = children.into_iter().map(|c| self.arena.release(c)).sum();
        debug!(released, "clear_container");
    }

    fn should_set_text_content(&self, _kind: &str, props: &Props) -> bool {
        matches!(
            props.get(prop::CHILDREN),
            Some(Value::Str(_) | Value::Number(_))
        )
    }

    fn prepare_for_commit(&mut self) {
        self.in_commit = true;
        trace!(commit = self.commits + 1, "prepare_for_commit");
    }

    fn reset_after_commit(&mut self) {
        self.identities.reset();
        self.assign_identities();
        self.in_commit = false;
        self.commits += 1;
        debug!(
            commit = self.commits,
            nodes = self.arena.len(),
            "commit finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, Value)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn kinds(host: &InstanceHost, parent: NodeId) -> Vec<String> {
        host.children(parent)
            .unwrap()
            .iter()
            .map(|c| match host.node(*c).unwrap() {
                Node::Text(t) => format!("'{t}'"),
                Node::Element(el) => el.kind.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_root_is_window_container() {
        let host = InstanceHost::new();
        let root = host.element(host.root()).unwrap();
        assert_eq!(root.kind, Kind::Known(ElementKind::Window));
        assert_eq!(host.node_count(), 1);
    }

    #[test]
    fn test_primitive_child_becomes_text_leaf() {
        let mut host = InstanceHost::new();
        let button = host.create_instance("button", &props(&[(prop::CHILDREN, "Click".into())]));
        let el = host.element(button).unwrap();
        assert!(!el.props.contains_key(prop::CHILDREN));
        assert_eq!(el.children.len(), 1);
        assert_eq!(host.text_content(button).unwrap(), "Click");
    }

    #[test]
    fn test_unknown_kind_accepted_at_creation() {
        let mut host = InstanceHost::new();
        let node = host.create_instance("marquee", &Props::new());
        assert_eq!(
            host.element(node).unwrap().kind,
            Kind::Unknown("marquee".into())
        );
    }

    #[test]
    fn test_append_preserves_order_and_dedupes() {
        let mut host = InstanceHost::new();
        let row = host.create_instance("layout", &Props::new());
        let a = host.create_instance("label", &Props::new());
        let b = host.create_instance("button", &Props::new());
        host.append_initial_child(row, a).unwrap();
        host.append_initial_child(row, b).unwrap();
        assert_eq!(kinds(&host, row), vec!["label", "button"]);

        // Re-appending moves to the end
        host.append_child(row, a).unwrap();
        assert_eq!(kinds(&host, row), vec!["button", "label"]);
    }

    #[test]
    fn test_insert_before() {
        let mut host = InstanceHost::new();
        let a = host.create_instance("label", &Props::new());
        let b = host.create_instance("button", &Props::new());
        let c = host.create_instance("slider", &Props::new());
        host.append_child_to_container(a).unwrap();
        host.append_child_to_container(b).unwrap();
        host.insert_in_container_before(c, b).unwrap();
        assert_eq!(kinds(&host, host.root()), vec!["label", "slider", "button"]);

        // Moving an existing child
        host.insert_in_container_before(b, a).unwrap();
        assert_eq!(kinds(&host, host.root()), vec!["button", "label", "slider"]);
    }

    #[test]
    fn test_move_between_parents() {
        let mut host = InstanceHost::new();
        let first = host.create_instance("column", &Props::new());
        let second = host.create_instance("column", &Props::new());
        host.append_child_to_container(first).unwrap();
        host.append_child_to_container(second).unwrap();
        let label = host.create_instance("label", &props(&[(prop::CHILDREN, "x".into())]));

        host.append_child(first, label).unwrap();
        host.append_child(second, label).unwrap();
        assert!(host.children(first).unwrap().is_empty());
        assert_eq!(host.children(second).unwrap(), &[label]);

        // The old parent no longer owns it
        let err = host.remove_child(first, label).unwrap_err();
        assert!(matches!(err, Error::StaleNode(id) if id == label));
        assert!(host.node(label).is_ok());

        host.remove_child(second, label).unwrap();
        assert!(matches!(host.node(label), Err(Error::StaleNode(_))));
        assert_eq!(host.node_count(), 3);

        let mut engine = crate::backend::RecordingEngine::new();
        crate::pipeline::project(&host, &mut engine, "root").unwrap();
        assert_eq!(engine.count("label"), 0);
    }

    #[test]
    fn test_insert_before_moves_from_other_parent() {
        let mut host = InstanceHost::new();
        let row = host.create_instance("row", &Props::new());
        let a = host.create_instance("label", &Props::new());
        let b = host.create_instance("button", &Props::new());
        host.append_child(row, a).unwrap();
        host.append_child_to_container(row).unwrap();
        host.append_child_to_container(b).unwrap();

        host.insert_before(row, b, a).unwrap();
        assert_eq!(kinds(&host, row), vec!["button", "label"]);
        assert_eq!(kinds(&host, host.root()), vec!["layout"]);
    }

    #[test]
    fn test_cycles_rejected() {
        let mut host = InstanceHost::new();
        let outer = host.create_instance("column", &Props::new());
        let inner = host.create_instance("row", &Props::new());
        host.append_child(outer, inner).unwrap();

        let err = host.append_child(outer, outer).unwrap_err();
        assert!(matches!(err, Error::Cycle { parent, child } if parent == outer && child == outer));

        let err = host.append_child(inner, outer).unwrap_err();
        assert!(matches!(err, Error::Cycle { parent, child } if parent == inner && child == outer));

        // The rejected moves left the tree untouched
        assert_eq!(host.children(outer).unwrap(), &[inner]);
        assert!(host.children(inner).unwrap().is_empty());
        assert_eq!(host.text_content(outer).unwrap(), "");
    }

    #[test]
    fn test_insert_before_missing_anchor() {
        let mut host = InstanceHost::new();
        let a = host.create_instance("label", &Props::new());
        let b = host.create_instance("label", &Props::new());
        let err = host.insert_in_container_before(a, b).unwrap_err();
        assert!(matches!(err, Error::StaleNode(id) if id == b));
    }

    #[test]
    fn test_remove_releases_subtree() {
        let mut host = InstanceHost::new();
        let row = host.create_instance("layout", &Props::new());
        let label = host.create_instance("label", &props(&[(prop::CHILDREN, "hi".into())]));
        host.append_initial_child(row, label).unwrap();
        host.append_child_to_container(row).unwrap();
        assert_eq!(host.node_count(), 4);

        host.remove_child_from_container(row).unwrap();
        assert_eq!(host.node_count(), 1);
        assert!(matches!(host.node(label), Err(Error::StaleNode(_))));
        assert!(host.children(host.root()).unwrap().is_empty());
    }

    #[test]
    fn test_remove_unknown_child_fails() {
        let mut host = InstanceHost::new();
        let stray = host.create_instance("label", &Props::new());
        assert!(host.remove_child_from_container(stray).is_err());
    }

    #[test]
    fn test_children_on_text_leaf_rejected() {
        let mut host = InstanceHost::new();
        let leaf = host.create_text_instance("x");
        let label = host.create_instance("label", &Props::new());
        let err = host.append_child(leaf, label).unwrap_err();
        assert!(matches!(err, Error::NodeType { .. }));
    }

    #[test]
    fn test_prepare_update_ignores_children_only() {
        let host = InstanceHost::new();
        let old = props(&[("title", "a".into()), (prop::CHILDREN, Value::Null)]);
        let new = props(&[("title", "a".into())]);
        assert_eq!(host.prepare_update(host.root(), &old, &new), None);
    }

    #[test]
    fn test_commit_update_replaces_props_and_text() {
        let mut host = InstanceHost::new();
        let old = props(&[(prop::CHILDREN, "Clicked (0)".into()), ("stale", true.into())]);
        let label = host.create_instance("label", &old);
        let leaf = host.children(label).unwrap()[0];

        let new = props(&[(prop::CHILDREN, "Clicked (1)".into())]);
        let payload = host.prepare_update(label, &old, &new).unwrap();
        assert_eq!(payload.text.as_deref(), Some("Clicked (1)"));
        host.commit_update(label, payload).unwrap();

        assert!(host.element(label).unwrap().props.is_empty());
        // Leaf is rewritten in place
        assert_eq!(host.children(label).unwrap(), &[leaf]);
        assert_eq!(host.text_content(label).unwrap(), "Clicked (1)");
    }

    #[test]
    fn test_commit_update_leaves_structural_children() {
        let mut host = InstanceHost::new();
        let row = host.create_instance("layout", &Props::new());
        let child = host.create_instance("button", &Props::new());
        host.append_initial_child(row, child).unwrap();

        let new = props(&[(prop::WIDTHS, vec![10, -1].into())]);
        let payload = host.prepare_update(row, &Props::new(), &new).unwrap();
        host.commit_update(row, payload).unwrap();
        assert_eq!(host.children(row).unwrap(), &[child]);
    }

    #[test]
    fn test_commit_text_update() {
        let mut host = InstanceHost::new();
        let leaf = host.create_text_instance("old");
        host.commit_text_update(leaf, "new").unwrap();
        assert_eq!(host.node(leaf).unwrap(), &Node::Text("new".into()));

        let label = host.create_instance("label", &Props::new());
        assert!(host.commit_text_update(label, "x").is_err());
    }

    #[test]
    fn test_reset_text_content() {
        let mut host = InstanceHost::new();
        let label = host.create_instance("label", &props(&[(prop::CHILDREN, 3.into())]));
        assert_eq!(host.text_content(label).unwrap(), "3");
        host.reset_text_content(label).unwrap();
        assert!(host.children(label).unwrap().is_empty());
        assert_eq!(host.node_count(), 2);
    }

    #[test]
    fn test_clear_container() {
        let mut host = InstanceHost::new();
        for _ in 0..3 {
            let n = host.create_instance("label", &props(&[(prop::CHILDREN, "x".into())]));
            host.append_child_to_container(n).unwrap();
        }
        host.clear_container();
        assert!(host.children(host.root()).unwrap().is_empty());
        assert_eq!(host.node_count(), 1);
    }

    #[test]
    fn test_should_set_text_content() {
        let host = InstanceHost::new();
        assert!(host.should_set_text_content("button", &props(&[(prop::CHILDREN, "a".into())])));
        assert!(host.should_set_text_content("label", &props(&[(prop::CHILDREN, 1.into())])));
        assert!(!host.should_set_text_content("row", &Props::new()));
        assert!(!host.should_set_text_content("row", &props(&[(prop::CHILDREN, true.into())])));
    }

    #[test]
    fn test_identities_reassigned_after_commit() {
        let mut host = InstanceHost::new();
        host.prepare_for_commit();
        let first = host.create_instance("input", &Props::new());
        let keyed = host.create_instance("input", &props(&[(prop::ID, "name".into())]));
        let second = host.create_instance("input", &Props::new());
        for n in [first, keyed, second] {
            host.append_child_to_container(n).unwrap();
        }
        host.reset_after_commit();

        let identity = |host: &InstanceHost, n| host.element(n).unwrap().identity.clone();
        assert_eq!(
            identity(&host, first),
            Some(Identity::Allocated {
                kind: ElementKind::Input,
                index: 0
            })
        );
        assert_eq!(identity(&host, keyed), Some(Identity::Key("name".into())));
        assert_eq!(
            identity(&host, second),
            Some(Identity::Allocated {
                kind: ElementKind::Input,
                index: 1
            })
        );

        // Removing the first shifts the second into index 0 on the next commit
        host.prepare_for_commit();
        host.remove_child_from_container(first).unwrap();
        host.reset_after_commit();
        assert_eq!(
            identity(&host, second),
            Some(Identity::Allocated {
                kind: ElementKind::Input,
                index: 0
            })
        );
        assert_eq!(host.commit_count(), 2);
        assert!(!host.in_commit());
    }
}
