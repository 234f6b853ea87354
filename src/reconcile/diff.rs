//! Positional reconciler.
//!
//! Keeps a mirror of the last committed description, with the node handle
//! each element was mounted as, and walks old and new children side by
//! side:
//!
//! - same kind at the same position: update in place
//! - different kind: mount the new subtree, insert it before the old one,
//!   remove the old one
//! - extra new children: append
//! - extra old children: remove
//!
//! There is no keyed matching; `id` only feeds widget identity.

use tracing::debug;

use crate::error::Result;
use crate::host::{HostConfig, NodeId};
use crate::primitives::{prop, Element, ElementDesc, Props, Value};

/// Where a list of children lives.
#[derive(Debug, Clone, Copy)]
enum Parent {
    Container,
    Node(NodeId),
}

impl Parent {
    fn append<H: HostConfig + ?Sized>(self, host: &mut H, child: NodeId) -> Result<()> {
        match self {
            Parent::Container => host.append_child_to_container(child),
            Parent::Node(parent) => host.append_child(parent, child),
        }
    }

    fn insert_before<H: HostConfig + ?Sized>(
        self,
        host: &mut H,
        child: NodeId,
        before: NodeId,
    ) -> Result<()> {
        match self {
            Parent::Container => host.insert_in_container_before(child, before),
            Parent::Node(parent) => host.insert_before(parent, child, before),
        }
    }

    fn remove<H: HostConfig + ?Sized>(self, host: &mut H, child: NodeId) -> Result<()> {
        match self {
            Parent::Container => host.remove_child_from_container(child),
            Parent::Node(parent) => host.remove_child(parent, child),
        }
    }
}

/// A description with fragments flattened away.
#[derive(Debug)]
enum Child {
    Text(String),
    Node(ElementDesc),
}

/// A committed description together with the node it was mounted as.
#[derive(Debug, Clone)]
enum Mounted {
    Text { id: NodeId, text: String },
    Node(MountedNode),
}

#[derive(Debug, Clone)]
struct MountedNode {
    id: NodeId,
    kind: String,
    /// Props as handed to the host, `children` included.
    props: Props,
    /// Empty while the node is text-bearing.
    children: Vec<Mounted>,
    text_only: bool,
}

impl Mounted {
    fn id(&self) -> NodeId {
        match self {
            Mounted::Text { id, .. } => *id,
            Mounted::Node(node) => node.id,
        }
    }
}

/// Diffs successive descriptions into [`HostConfig`] calls.
#[derive(Debug, Default)]
pub struct Reconciler {
    roots: Vec<Mounted>,
    commits: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile `element` against the last committed description, as one commit.
    ///
    /// A fragment puts each of its children directly under the root container.
    pub fn commit<H: HostConfig + ?Sized>(&mut self, host: &mut H, element: Element) -> Result<()> {
        host.prepare_for_commit();
        let mut roots = std::mem::take(&mut self.roots);
        let result = reconcile_children(host, Parent::Container, &mut roots, flatten(vec![element]));
        self.roots = roots;
        host.reset_after_commit();
        self.commits += 1;
        debug!(commit = self.commits, roots = self.roots.len(), "reconciled");
        result
    }

    /// Remove everything this reconciler mounted.
    pub fn unmount<H: HostConfig + ?Sized>(&mut self, host: &mut H) {
        host.prepare_for_commit();
        host.clear_container();
        self.roots.clear();
        host.reset_after_commit();
    }

    /// Number of committed passes.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// Top-level nodes currently mounted under the root container.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.roots.iter().map(Mounted::id).collect()
    }
}

fn flatten(elements: Vec<Element>) -> Vec<Child> {
    let mut out = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Element::Text(text) => out.push(Child::Text(text)),
            Element::Node(desc) => out.push(Child::Node(desc)),
            Element::Fragment(items) => out.extend(flatten(items)),
        }
    }
    out
}

/// Props handed to the host: a lone text child travels as `children`.
///
/// Without child elements, a primitive `children` prop set directly is kept.
fn host_props(desc: &ElementDesc) -> Props {
    let mut props = desc.props.clone();
    match desc.children.as_slice() {
        [] => {
            let primitive = matches!(
                props.get(prop::CHILDREN),
                Some(Value::Str(_) | Value::Number(_))
            );
            if !primitive {
                props.remove(prop::CHILDREN);
            }
        }
        [Element::Text(text)] => {
            props.insert(prop::CHILDREN.to_string(), Value::Str(text.clone()));
        }
        _ => {
            props.remove(prop::CHILDREN);
        }
    }
    props
}

fn reconcile_children<H: HostConfig + ?Sized>(
    host: &mut H,
    parent: Parent,
    old: &mut Vec<Mounted>,
    new: Vec<Child>,
) -> Result<()> {
    let new_len = new.len();
    for (index, child) in new.into_iter().enumerate() {
        match (old.get_mut(index), child) {
            (Some(Mounted::Text { id, text }), Child::Text(next)) => {
                if *text != next {
                    host.commit_text_update(*id, &next)?;
                    *text = next;
                }
            }
            (Some(Mounted::Node(node)), Child::Node(desc)) if node.kind == desc.kind => {
                node.update(host, desc)?;
            }
            (Some(current), child) => {
                let replacement = mount(host, child)?;
                let stale = current.id();
                parent.insert_before(host, replacement.id(), stale)?;
                parent.remove(host, stale)?;
                *current = replacement;
            }
            (None, child) => {
                let mounted = mount(host, child)?;
                parent.append(host, mounted.id())?;
                old.push(mounted);
            }
        }
    }
    if old.len() > new_len {
        for stale in old.drain(new_len..) {
            parent.remove(host, stale.id())?;
        }
    }
    Ok(())
}

/// Create a detached subtree.
fn mount<H: HostConfig + ?Sized>(host: &mut H, child: Child) -> Result<Mounted> {
    let desc = match child {
        Child::Text(text) => {
            return Ok(Mounted::Text {
                id: host.create_text_instance(&text),
                text,
            });
        }
        Child::Node(desc) => desc,
    };

    let props = host_props(&desc);
    let text_only = host.should_set_text_content(&desc.kind, &props);
    let id = host.create_instance(&desc.kind, &props);
    let mut children = Vec::new();
    if !text_only {
        for child in flatten(desc.children) {
            let mounted = mount(host, child)?;
            host.append_initial_child(id, mounted.id())?;
            children.push(mounted);
        }
    }
    Ok(Mounted::Node(MountedNode {
        id,
        kind: desc.kind,
        props,
        children,
        text_only,
    }))
}

impl MountedNode {
    /// Update in place from a description of the same kind.
    fn update<H: HostConfig + ?Sized>(&mut self, host: &mut H, desc: ElementDesc) -> Result<()> {
        let next_props = host_props(&desc);
        let next_text_only = host.should_set_text_content(&desc.kind, &next_props);

        match (self.text_only, next_text_only) {
            (true, false) => host.reset_text_content(self.id)?,
            (false, true) => {
                for stale in self.children.drain(..) {
                    host.remove_child(self.id, stale.id())?;
                }
            }
            _ => {}
        }

        if let Some(payload) = host.prepare_update(self.id, &self.props, &next_props) {
            host.commit_update(self.id, payload)?;
        }
        self.props = next_props;
        self.text_only = next_text_only;

        if !next_text_only {
            reconcile_children(host, Parent::Node(self.id), &mut self.children, flatten(desc.children))?;
        }
        Ok(())
    }
}
