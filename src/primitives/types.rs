//! Primitive types - Property values and callbacks.
//!
//! Element properties are a flat name → [`Value`] map. Callbacks are values
//! too, so a property set can be diffed and merged as a whole.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::types::{Rgba, Width};

// =============================================================================
// Callback Types
// =============================================================================

/// Application callback stored in an `on*` property.
///
/// Using Rc<dyn Fn> instead of Box<dyn Fn> allows cloning callbacks out of the
/// retained tree before they run, so a callback never executes while the tree
/// is borrowed. Equality is pointer identity.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Value) -> anyhow::Result<()>>);

impl Callback {
    /// Callback receiving the widget's new value.
    pub fn new(f: impl Fn(&Value) -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Callback that ignores its argument (clicks, close requests).
    pub fn unit(f: impl Fn() + 'static) -> Self {
        Self::new(move |_| {
            f();
            Ok(())
        })
    }

    /// Invoke the callback.
    pub fn call(&self, value: &Value) -> anyhow::Result<()> {
        (self.0)(value)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0))
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A single property value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Color(Rgba),
    Callback(Callback),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            Value::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    /// Primitive content as text (strings and numbers only).
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            Value::Number(n) => Some(format_number(*n)),
            _ => None,
        }
    }

    /// Interpret as a color: `Color`, `0xRRGGBB` number or hex string.
    pub fn to_color(&self) -> Option<Rgba> {
        match self {
            Value::Color(c) => Some(*c),
            Value::Number(n) if *n >= 0.0 => Some(Rgba::from_rgb_int(*n as u32)),
            Value::Str(s) => Rgba::from_hex(s),
            _ => None,
        }
    }

    /// Interpret as a list of column widths; non-numbers are skipped.
    pub fn to_widths(&self) -> Vec<Width> {
        match self {
            Value::List(items) => items
                .iter()
                .filter_map(Value::as_f64)
                .map(|n| Width::from(n as i64))
                .collect(),
            Value::Number(n) => vec![Width::from(*n as i64)],
            _ => Vec::new(),
        }
    }
}

/// Render a number the way it reads in a label (`3`, not `3.0`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value as f64)
    }
}

impl From<Rgba> for Value {
    fn from(value: Rgba) -> Self {
        Value::Color(value)
    }
}

impl From<Callback> for Value {
    fn from(value: Callback) -> Self {
        Value::Callback(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Props
// =============================================================================

/// Property names with special meaning to the host and projector.
pub mod prop {
    pub const CHILDREN: &str = "children";
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const LABEL: &str = "label";
    pub const VALUE: &str = "value";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const CHECKED: &str = "checked";
    pub const EXPANDED: &str = "expanded";
    pub const WIDTHS: &str = "widths";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const COLOR: &str = "color";
    pub const SRC: &str = "src";
    pub const ON_CLICK: &str = "onClick";
    pub const ON_CHANGE: &str = "onChange";
    pub const ON_SUBMIT: &str = "onSubmit";
    pub const ON_CLOSE: &str = "onClose";
}

/// Property set of one element. Ordered so diffs are deterministic.
pub type Props = BTreeMap<String, Value>;

/// Typed reads over a property set.
pub trait PropsExt {
    fn str_prop(&self, name: &str) -> Option<&str>;
    fn num_prop(&self, name: &str) -> Option<f64>;
    fn bool_prop(&self, name: &str) -> Option<bool>;
    fn callback(&self, name: &str) -> Option<Callback>;
}

impl PropsExt for Props {
    fn str_prop(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    fn num_prop(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    fn bool_prop(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    fn callback(&self, name: &str) -> Option<Callback> {
        self.get(name).and_then(Value::as_callback).cloned()
    }
}
