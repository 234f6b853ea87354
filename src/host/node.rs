//! Element Node - the retained-tree unit.
//!
//! Nodes are addressed by [`NodeId`] handles into the host arena. A parent
//! owns its children through the ordered `children` list; children never
//! point back at their parent, so the tree is only ever walked top-down.

use std::fmt;

use crate::primitives::{prop, Props, PropsExt};

/// Handle to a node in the host arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Element Kinds
// =============================================================================

/// Every element kind the projector knows how to draw.
///
/// Closed on purpose: adding a kind means adding a projector arm, and the
/// compiler points at the `match` that is missing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Container window (`window`). The root container is one of these.
    Window,
    /// Modal window with explicit position and size (`modal`).
    Modal,
    /// Row layout (`layout`).
    Row,
    /// Column layout (`column`).
    Column,
    Button,
    Label,
    /// Static text block (`text`).
    Text,
    Slider,
    Checkbox,
    /// Single-line text field (`input`).
    Input,
    /// Colored rectangle (`rect`).
    Rect,
    /// Tree node (`treenode`).
    TreeNode,
    /// Collapsible header (`header`).
    Header,
    Panel,
    Image,
}

impl ElementKind {
    pub const ALL: [ElementKind; 15] = [
        ElementKind::Window,
        ElementKind::Modal,
        ElementKind::Row,
        ElementKind::Column,
        ElementKind::Button,
        ElementKind::Label,
        ElementKind::Text,
        ElementKind::Slider,
        ElementKind::Checkbox,
        ElementKind::Input,
        ElementKind::Rect,
        ElementKind::TreeNode,
        ElementKind::Header,
        ElementKind::Panel,
        ElementKind::Image,
    ];

    /// Resolve a tag string. `row` is accepted as an alias of `layout`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "window" => ElementKind::Window,
            "modal" => ElementKind::Modal,
            "layout" | "row" => ElementKind::Row,
            "column" => ElementKind::Column,
            "button" => ElementKind::Button,
            "label" => ElementKind::Label,
            "text" => ElementKind::Text,
            "slider" => ElementKind::Slider,
            "checkbox" => ElementKind::Checkbox,
            "input" => ElementKind::Input,
            "rect" => ElementKind::Rect,
            "treenode" => ElementKind::TreeNode,
            "header" => ElementKind::Header,
            "panel" => ElementKind::Panel,
            "image" => ElementKind::Image,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical tag string.
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Window => "window",
            ElementKind::Modal => "modal",
            ElementKind::Row => "layout",
            ElementKind::Column => "column",
            ElementKind::Button => "button",
            ElementKind::Label => "label",
            ElementKind::Text => "text",
            ElementKind::Slider => "slider",
            ElementKind::Checkbox => "checkbox",
            ElementKind::Input => "input",
            ElementKind::Rect => "rect",
            ElementKind::TreeNode => "treenode",
            ElementKind::Header => "header",
            ElementKind::Panel => "panel",
            ElementKind::Image => "image",
        }
    }

    /// Kinds whose engine state (cursor, edit buffer) must survive across frames.
    pub fn requires_identity(self) -> bool {
        matches!(self, ElementKind::Input)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Kind as stored on a node. Unknown tags are kept verbatim until projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Known(ElementKind),
    Unknown(String),
}

impl Kind {
    pub fn parse(tag: &str) -> Self {
        ElementKind::from_tag(tag)
            .map(Kind::Known)
            .unwrap_or_else(|| Kind::Unknown(tag.to_string()))
    }

    pub fn known(&self) -> Option<ElementKind> {
        match self {
            Kind::Known(kind) => Some(*kind),
            Kind::Unknown(_) => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Known(kind) => kind.fmt(f),
            Kind::Unknown(tag) => f.write_str(tag),
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// Stable identity handed to the engine for stateful widgets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Supplied by the application through the `id` property.
    Key(String),
    /// Sequential per-kind index from the identity allocator.
    Allocated { kind: ElementKind, index: u32 },
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Key(key) => f.write_str(key),
            Identity::Allocated { kind, index } => write!(f, "{kind}#{index}"),
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// One node of the retained tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Text leaf: only a string payload.
    Text(String),
    Element(ElementNode),
}

/// A structural node.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub kind: Kind,
    /// Properties without `children`.
    pub props: Props,
    /// Render order.
    pub children: Vec<NodeId>,
    pub identity: Option<Identity>,
}

impl ElementNode {
    pub fn new(kind: Kind, props: Props) -> Self {
        let identity = explicit_identity(&props);
        Self {
            kind,
            props,
            children: Vec::new(),
            identity,
        }
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Children in render order (empty for text leaves).
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Element(el) => &el.children,
            Node::Text(_) => &[],
        }
    }
}

/// Identity from the `id` property, if the application set one.
pub(crate) fn explicit_identity(props: &Props) -> Option<Identity> {
    props.str_prop(prop::ID).map(|id| Identity::Key(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in ElementKind::ALL {
            assert_eq!(ElementKind::from_tag(kind.tag()), Some(kind));
        }
    }

    #[test]
    fn test_row_alias() {
        assert_eq!(ElementKind::from_tag("row"), Some(ElementKind::Row));
    }

    #[test]
    fn test_unknown_kind_is_kept() {
        let kind = Kind::parse("marquee");
        assert_eq!(kind, Kind::Unknown("marquee".into()));
        assert_eq!(kind.known(), None);
        assert_eq!(kind.to_string(), "marquee");
    }

    #[test]
    fn test_only_inputs_require_identity() {
        let needing: Vec<_> = ElementKind::ALL
            .into_iter()
            .filter(|k| k.requires_identity())
            .collect();
        assert_eq!(needing, vec![ElementKind::Input]);
    }

    #[test]
    fn test_explicit_identity_from_props() {
        let mut props = Props::new();
        props.insert(prop::ID.into(), "name-field".into());
        let node = ElementNode::new(Kind::Known(ElementKind::Input), props);
        assert_eq!(node.identity, Some(Identity::Key("name-field".into())));
    }

    #[test]
    fn test_identity_display() {
        let id = Identity::Allocated {
            kind: ElementKind::Input,
            index: 2,
        };
        assert_eq!(id.to_string(), "input#2");
    }
}
