//! UI Primitives - Element descriptions and property values.
//!
//! This module provides what component code builds:
//! - [`Element`] - description of one element, text run or fragment
//! - [`Value`] / [`Props`] - property values, including [`Callback`]s
//! - builder functions, one per element kind (`button`, `slider`, `row`, ...)
//!
//! # Callbacks
//!
//! Interaction results flow back through `onClick`, `onChange`, `onSubmit`
//! and `onClose`. They run synchronously while a frame is projected; state
//! they change is only reconciled into the tree at the next yield point.
//!
//! ```ignore
//! let count = signal(0);
//! let c = count.clone();
//! button("Click").on_click(move || c.set(c.get() + 1));
//! ```

mod element;
mod types;

pub use element::*;
pub use types::*;
