//! # spark-mu
//!
//! Declarative components on an immediate-mode terminal UI.
//!
//! Components describe the UI as [`Element`] trees. A reconciler diffs
//! successive descriptions into a retained tree owned by the
//! [`InstanceHost`], and once per frame the projector walks that tree and
//! re-issues it as calls on an immediate-mode [`Engine`]. Widget answers
//! (clicks, slider values, typed text) come back through `on*` callbacks.
//!
//! Reactivity comes from [spark-signals](https://github.com/RLabs-Inc/spark-signals):
//! a component re-renders when a signal it reads changes, and the new
//! description is committed at the end of the frame that changed it.
//!
//! ```text
//! component → Reconciler → InstanceHost → project → Engine → callbacks → signals
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core value types (Rgba, Rect, Width, Cell)
//! - [`primitives`] - Element descriptions, property values and builders
//! - [`host`] - Retained node tree and its lifecycle contract
//! - [`backend`] - Engine trait, recording engine, crossterm engine
//! - [`pipeline`] - Frame projector and render loop
//! - [`reconcile`] - Schedulers and the positional reconciler
//!
//! ## Example
//!
//! ```ignore
//! use spark_mu::*;
//! use spark_signals::signal;
//!
//! let count = signal(0);
//! let view = {
//!     let count = count.clone();
//!     move || {
//!         let c = count.clone();
//!         row()
//!             .prop("widths", vec![20, -1])
//!             .child(label(format!("Clicked ({})", count.get())))
//!             .child(button("Click").on_click(move || c.set(c.get() + 1)))
//!     }
//! };
//! render(TerminalEngine::new(&RenderConfig::from_env()), view)?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod primitives;
pub mod reconcile;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::RenderConfig;
pub use error::{Error, Result};

pub use primitives::{
    button, checkbox, column, fragment, header, image, input, label, modal, panel, prop, rect,
    row, slider, text, tree_node, window, Callback, Element, ElementDesc, Props, PropsExt, Value,
};

pub use host::{ElementKind, HostConfig, Identity, InstanceHost, NodeId, UpdatePayload};

pub use backend::{
    Call, Engine, Expandable, LayoutKind, RecordingEngine, Response, TerminalEngine,
    TextboxResponse, WindowOptions,
};

pub use pipeline::{project, render, render_with_config, LoopState, Runtime};

pub use reconcile::{ComponentScheduler, QueueHandle, QueueScheduler, Reconciler, Scheduler};
