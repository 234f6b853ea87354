//! Frame projection - retained tree to immediate-mode calls.
//!
//! One depth-first pass over the tree per frame, children in committed
//! order. Each element maps to a fixed engine call sequence; interactive
//! calls answer synchronously and the answer is fed straight into the
//! element's `on*` callback. The tree itself is only read here: callbacks
//! change application state, and the reconciler applies that at the next
//! yield point.

use tracing::trace;

use crate::backend::{Engine, Expandable, LayoutKind, WindowOptions};
use crate::error::{Error, Result};
use crate::host::{ElementKind, ElementNode, Identity, InstanceHost, Kind, Node, NodeId};
use crate::primitives::{prop, PropsExt, Value};
use crate::types::{Rect, Rgba};

/// Modal size used when the element carries no geometry.
const DEFAULT_MODAL_SIZE: (u16, u16) = (40, 10);

/// Project the whole tree under the root container into `engine`.
///
/// `default_title` names windows that carry neither a `title` nor an `id`.
pub fn project<E: Engine + ?Sized>(
    host: &InstanceHost,
    engine: &mut E,
    default_title: &str,
) -> Result<()> {
    Projector {
        host,
        engine,
        default_title,
    }
    .node(host.root())
}

struct Projector<'a, E: ?Sized> {
    host: &'a InstanceHost,
    engine: &'a mut E,
    default_title: &'a str,
}

impl<E: Engine + ?Sized> Projector<'_, E> {
    fn node(&mut self, id: NodeId) -> Result<()> {
        match self.host.node(id)? {
            // Stray text between structural siblings still shows up.
            Node::Text(text) => Ok(self.engine.text(text)?),
            Node::Element(el) => match &el.kind {
                Kind::Known(kind) => self.element(id, *kind, el),
                Kind::Unknown(tag) => Err(Error::UnknownElement { kind: tag.clone() }),
            },
        }
    }

    fn children(&mut self, el: &ElementNode) -> Result<()> {
        for child in &el.children {
            self.node(*child)?;
        }
        Ok(())
    }

    fn element(&mut self, id: NodeId, kind: ElementKind, el: &ElementNode) -> Result<()> {
        let props = &el.props;
        trace!(node = %id, kind = kind.tag(), "project");

        match kind {
            ElementKind::Window => {
                let options = WindowOptions::container(self.title(el));
                if self.engine.begin_window(&options)? {
                    self.children(el)?;
                    self.engine.end_window()?;
                }
            }

            ElementKind::Modal => {
                let (w, h) = DEFAULT_MODAL_SIZE;
                let rect = Rect::new(
                    dimension(props.num_prop(prop::X), 0),
                    dimension(props.num_prop(prop::Y), 0),
                    dimension(props.num_prop(prop::WIDTH), w),
                    dimension(props.num_prop(prop::HEIGHT), h),
                );
                let options = WindowOptions::modal(self.title(el), rect);
                if self.engine.begin_window(&options)? {
                    self.children(el)?;
                    self.engine.end_window()?;
                } else {
                    fire(el, prop::ON_CLOSE, Value::Null)?;
                }
            }

            ElementKind::Row | ElementKind::Column => {
                let layout = if kind == ElementKind::Row {
                    LayoutKind::Row
                } else {
                    LayoutKind::Column
                };
                let height = dimension(props.num_prop(prop::HEIGHT), 0);
                self.engine.begin_layout(layout, height)?;
                let widths = props.get(prop::WIDTHS).map(Value::to_widths).unwrap_or_default();
                if !widths.is_empty() {
                    self.engine.set_widths(&widths)?;
                }
                self.children(el)?;
                self.engine.end_layout(layout)?;
            }

            ElementKind::Button => {
                let text = self.host.text_content(id)?;
                if self.engine.button(&text)? {
                    fire(el, prop::ON_CLICK, Value::Null)?;
                }
            }

            ElementKind::Label => {
                let text = self.host.text_content(id)?;
                self.engine.label(&text)?;
            }

            ElementKind::Text => {
                let text = self.host.text_content(id)?;
                self.engine.text(&text)?;
            }

            ElementKind::Slider => {
                let min = props.num_prop(prop::MIN).unwrap_or(0.0);
                let max = props.num_prop(prop::MAX).unwrap_or(1.0);
                let value = props.num_prop(prop::VALUE).unwrap_or(min);
                let updated = self.engine.slider(min, max, value)?;
                fire(el, prop::ON_CHANGE, Value::Number(updated))?;
            }

            ElementKind::Checkbox => {
                let label = match props.str_prop(prop::LABEL) {
                    Some(label) => label.to_string(),
                    None => self.host.text_content(id)?,
                };
                let checked = props.bool_prop(prop::CHECKED).unwrap_or(false);
                let updated = self.engine.checkbox(&label, checked)?;
                fire(el, prop::ON_CHANGE, Value::Bool(updated))?;
            }

            ElementKind::Input => {
                // The host allocates one for every input at creation.
                let identity = el
                    .identity
                    .clone()
                    .unwrap_or_else(|| Identity::Key(id.to_string()));
                let value = props
                    .get(prop::VALUE)
                    .and_then(Value::to_text)
                    .unwrap_or_default();
                let response = self.engine.textbox(&identity, &value)?;
                let submitted = response.submitted();
                let text = response.text;
                fire(el, prop::ON_CHANGE, Value::Str(text.clone()))?;
                if submitted {
                    fire(el, prop::ON_SUBMIT, Value::Str(text))?;
                }
            }

            ElementKind::Rect => {
                let color = props
                    .get(prop::COLOR)
                    .and_then(Value::to_color)
                    .unwrap_or(Rgba::WHITE);
                self.engine.rect(color)?;
            }

            ElementKind::TreeNode | ElementKind::Header => {
                let expandable = if kind == ElementKind::TreeNode {
                    Expandable::TreeNode
                } else {
                    Expandable::Header
                };
                let title = match props.str_prop(prop::TITLE) {
                    Some(title) => title.to_string(),
                    None => self.host.text_content(id)?,
                };
                let expanded = props.bool_prop(prop::EXPANDED).unwrap_or(false);
                if self.engine.begin_expandable(expandable, &title, expanded)? {
                    self.children(el)?;
                    self.engine.end_expandable(expandable)?;
                } else {
                    fire(el, prop::ON_CLOSE, Value::Null)?;
                }
            }

            ElementKind::Panel => {
                self.engine.begin_panel(props.str_prop(prop::TITLE).unwrap_or_default())?;
                self.children(el)?;
                self.engine.end_panel()?;
            }

            ElementKind::Image => {
                let width = dimension(props.num_prop(prop::WIDTH), 0);
                let height = dimension(props.num_prop(prop::HEIGHT), 0);
                self.engine.begin_region(width, height)?;
                self.engine.image(props.str_prop(prop::SRC).unwrap_or_default())?;
                self.engine.end_region()?;
            }
        }
        Ok(())
    }

    /// `title`, then the explicit key, then the configured default.
    fn title(&self, el: &ElementNode) -> String {
        if let Some(title) = el.props.str_prop(prop::TITLE) {
            return title.to_string();
        }
        match &el.identity {
            Some(Identity::Key(key)) => key.clone(),
            _ => self.default_title.to_string(),
        }
    }
}

/// Run the element's `name` callback, if any.
///
/// The callback is cloned out of the property set first; it never runs
/// while holding a reference into it.
fn fire(el: &ElementNode, name: &'static str, value: Value) -> Result<()> {
    let Some(callback) = el.props.callback(name) else {
        return Ok(());
    };
    trace!(prop = name, ?value, "callback");
    callback
        .call(&value)
        .map_err(|source| Error::Callback { prop: name, source })
}

fn dimension(value: Option<f64>, default: u16) -> u16 {
    match value {
        Some(n) if n.is_finite() => n.clamp(0.0, u16::MAX as f64) as u16,
        _ => default,
    }
}
