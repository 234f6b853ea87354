//! Element descriptions.
//!
//! An [`Element`] is what a component function returns: a cheap, cloneable
//! description of the UI. The reconciler diffs successive descriptions and
//! turns them into host lifecycle calls; descriptions never touch the
//! retained tree directly.
//!
//! # Example
//!
//! ```ignore
//! use spark_mu::primitives::*;
//!
//! let view = row()
//!     .prop("widths", vec![20, -1])
//!     .child(label(format!("Clicked ({count})")))
//!     .child(button("Click").on_click(move || count_signal.set(count + 1)));
//! ```

use super::types::{prop, Callback, Props, Value};
use crate::types::{Rect, Rgba};

/// A description of one element or text run.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Raw text content.
    Text(String),
    /// A tagged element with properties and children.
    Node(ElementDesc),
    /// Several siblings without a wrapper (only meaningful at the root or as a child).
    Fragment(Vec<Element>),
}

/// A tagged element description.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDesc {
    pub kind: String,
    pub props: Props,
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element of the given kind with no props or children.
    pub fn new(kind: impl Into<String>) -> Self {
        Element::Node(ElementDesc {
            kind: kind.into(),
            props: Props::new(),
            children: Vec::new(),
        })
    }

    /// Set a property. No-op on text and fragments.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Element::Node(desc) = &mut self {
            desc.props.insert(name.into(), value.into());
        }
        self
    }

    /// Set the explicit identity used by stateful widgets.
    pub fn id(self, id: impl Into<String>) -> Self {
        let id: String = id.into();
        self.prop(prop::ID, id)
    }

    /// Append a child. Fragments are flattened into the child list.
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        let child = child.into();
        match &mut self {
            Element::Node(desc) => push_flat(&mut desc.children, child),
            Element::Fragment(children) => push_flat(children, child),
            Element::Text(_) => {}
        }
        self
    }

    /// Append several children.
    pub fn children<I, C>(self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Element>,
    {
        children.into_iter().fold(self, |el, c| el.child(c))
    }

    pub fn on_click(self, f: impl Fn() + 'static) -> Self {
        self.prop(prop::ON_CLICK, Callback::unit(f))
    }

    pub fn on_close(self, f: impl Fn() + 'static) -> Self {
        self.prop(prop::ON_CLOSE, Callback::unit(f))
    }

    /// Change handler receiving the widget's new value.
    pub fn on_change(self, f: impl Fn(&Value) + 'static) -> Self {
        self.prop(
            prop::ON_CHANGE,
            Callback::new(move |v| {
                f(v);
                Ok(())
            }),
        )
    }

    /// Submit handler receiving the submitted text.
    pub fn on_submit(self, f: impl Fn(&str) + 'static) -> Self {
        self.prop(
            prop::ON_SUBMIT,
            Callback::new(move |v| {
                f(v.as_str().unwrap_or_default());
                Ok(())
            }),
        )
    }

    /// Attach a fallible callback to any `on*` property.
    pub fn on_try(
        self,
        name: &'static str,
        f: impl Fn(&Value) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.prop(name, Callback::new(f))
    }

    pub fn kind(&self) -> Option<&str> {
        match self {
            Element::Node(desc) => Some(&desc.kind),
            _ => None,
        }
    }
}

fn push_flat(children: &mut Vec<Element>, child: Element) {
    match child {
        Element::Fragment(items) => items.into_iter().for_each(|c| push_flat(children, c)),
        other => children.push(other),
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::Text(value.to_string())
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::Text(value)
    }
}

impl From<ElementDesc> for Element {
    fn from(value: ElementDesc) -> Self {
        Element::Node(value)
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Several top-level siblings.
pub fn fragment<I, C>(children: I) -> Element
where
    I: IntoIterator<Item = C>,
    C: Into<Element>,
{
    Element::Fragment(Vec::new()).children(children)
}

/// Container window.
pub fn window(title: impl Into<String>) -> Element {
    let title: String = title.into();
    Element::new("window").prop(prop::TITLE, title)
}

/// Modal window at a fixed position and size.
pub fn modal(title: impl Into<String>, rect: Rect) -> Element {
    let title: String = title.into();
    Element::new("modal")
        .prop(prop::TITLE, title)
        .prop(prop::X, rect.x as i32)
        .prop(prop::Y, rect.y as i32)
        .prop(prop::WIDTH, rect.width as i32)
        .prop(prop::HEIGHT, rect.height as i32)
}

/// Row layout. Set `widths` for column sizing and `height` for row height.
pub fn row() -> Element {
    Element::new("layout")
}

/// Column layout.
pub fn column() -> Element {
    Element::new("column")
}

pub fn button(label: impl Into<String>) -> Element {
    let label: String = label.into();
    Element::new("button").child(label)
}

pub fn label(text: impl Into<String>) -> Element {
    let text: String = text.into();
    Element::new("label").child(text)
}

/// Static (non-interactive) text block.
pub fn text(text: impl Into<String>) -> Element {
    let text: String = text.into();
    Element::new("text").child(text)
}

pub fn slider(min: f64, max: f64, value: f64) -> Element {
    Element::new("slider")
        .prop(prop::MIN, min)
        .prop(prop::MAX, max)
        .prop(prop::VALUE, value)
}

pub fn checkbox(label: impl Into<String>, checked: bool) -> Element {
    let label: String = label.into();
    Element::new("checkbox")
        .prop(prop::LABEL, label)
        .prop(prop::CHECKED, checked)
}

/// Single-line text field.
pub fn input(value: impl Into<String>) -> Element {
    let value: String = value.into();
    Element::new("input").prop(prop::VALUE, value)
}

/// Colored rectangle filling the next layout cell.
pub fn rect(color: Rgba) -> Element {
    Element::new("rect").prop(prop::COLOR, color)
}

pub fn tree_node(title: impl Into<String>, expanded: bool) -> Element {
    let title: String = title.into();
    Element::new("treenode")
        .prop(prop::TITLE, title)
        .prop(prop::EXPANDED, expanded)
}

pub fn header(title: impl Into<String>, expanded: bool) -> Element {
    let title: String = title.into();
    Element::new("header")
        .prop(prop::TITLE, title)
        .prop(prop::EXPANDED, expanded)
}

pub fn panel(title: impl Into<String>) -> Element {
    let title: String = title.into();
    Element::new("panel").prop(prop::TITLE, title)
}

pub fn image(src: impl Into<String>, width: u16, height: u16) -> Element {
    let src: String = src.into();
    Element::new("image")
        .prop(prop::SRC, src)
        .prop(prop::WIDTH, width as i32)
        .prop(prop::HEIGHT, height as i32)
}
