//! Backend - the immediate-mode engine call surface.
//!
//! An [`Engine`] has no memory of previous frames beyond what it keeps for
//! itself (focus, edit buffers keyed by [`Identity`]). Every frame the
//! projector re-issues the whole UI as calls on this trait, and each
//! interactive call answers synchronously with the widget's new value.
//!
//! Two implementations ship with the crate:
//! - [`RecordingEngine`] - headless, records calls and plays back scripted answers
//! - [`TerminalEngine`] - crossterm terminal with mouse and keyboard input

pub mod recorder;
pub mod terminal;

pub use recorder::{Call, RecordingEngine};
pub use terminal::TerminalEngine;

use std::io;

use bitflags::bitflags;

use crate::host::Identity;
use crate::types::{Rect, Rgba, Width};

/// Arguments for [`Engine::begin_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowOptions {
    pub title: String,
    /// Explicit geometry. `None` fills the screen.
    pub rect: Option<Rect>,
    /// Modal windows can be closed by the user.
    pub modal: bool,
}

impl WindowOptions {
    pub fn container(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rect: None,
            modal: false,
        }
    }

    pub fn modal(title: impl Into<String>, rect: Rect) -> Self {
        Self {
            title: title.into(),
            rect: Some(rect),
            modal: true,
        }
    }
}

/// Direction of a layout region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    Row,
    Column,
}

/// Which collapsible widget a region belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Expandable {
    TreeNode,
    Header,
}

bitflags! {
    /// Interaction result bits of a text field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Response: u8 {
        const CHANGE = 1 << 0;
        const SUBMIT = 1 << 1;
        /// The field holds keyboard focus.
        const ACTIVE = 1 << 2;
    }
}

/// What [`Engine::textbox`] hands back.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextboxResponse {
    pub text: String,
    pub flags: Response,
}

impl TextboxResponse {
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flags: Response::empty(),
        }
    }

    pub fn submitted(&self) -> bool {
        self.flags.contains(Response::SUBMIT)
    }
}

/// Per-frame immediate-mode call surface.
///
/// Calls between `begin_frame` and `end_frame` are positional: the engine
/// lays widgets out in the order they arrive.
pub trait Engine {
    // Lifecycle

    /// Acquire the drawing context. Called once before the first frame.
    fn init(&mut self) -> io::Result<()>;

    /// Process pending input. Returns `true` when a stop was requested.
    fn poll_input(&mut self) -> io::Result<bool>;

    fn begin_frame(&mut self) -> io::Result<()>;

    /// Present the frame.
    fn end_frame(&mut self) -> io::Result<()>;

    /// Release the drawing context. Called at most once.
    fn shutdown(&mut self) -> io::Result<()>;

    // Windows and layout

    /// Returns `false` when the window is closed (modal) or not drawable.
    /// `end_window` must only follow a `true` answer.
    fn begin_window(&mut self, options: &WindowOptions) -> io::Result<bool>;

    fn end_window(&mut self) -> io::Result<()>;

    /// `height` of 0 lets the engine pick.
    fn begin_layout(&mut self, kind: LayoutKind, height: u16) -> io::Result<()>;

    fn set_widths(&mut self, widths: &[Width]) -> io::Result<()>;

    fn end_layout(&mut self, kind: LayoutKind) -> io::Result<()>;

    // Widgets

    /// Returns `true` when the button was activated this frame.
    fn button(&mut self, label: &str) -> io::Result<bool>;

    fn label(&mut self, text: &str) -> io::Result<()>;

    fn text(&mut self, text: &str) -> io::Result<()>;

    /// Returns the (possibly dragged) value, clamped to `min..=max`.
    fn slider(&mut self, min: f64, max: f64, value: f64) -> io::Result<f64>;

    fn checkbox(&mut self, label: &str, checked: bool) -> io::Result<bool>;

    fn textbox(&mut self, identity: &Identity, value: &str) -> io::Result<TextboxResponse>;

    fn rect(&mut self, color: Rgba) -> io::Result<()>;

    // Regions

    /// Returns whether the region is open. `end_expandable` only follows `true`.
    fn begin_expandable(&mut self, kind: Expandable, title: &str, expanded: bool)
        -> io::Result<bool>;

    fn end_expandable(&mut self, kind: Expandable) -> io::Result<()>;

    fn begin_panel(&mut self, title: &str) -> io::Result<()>;

    fn end_panel(&mut self) -> io::Result<()>;

    /// Fixed-size region, used for images.
    fn begin_region(&mut self, width: u16, height: u16) -> io::Result<()>;

    fn image(&mut self, src: &str) -> io::Result<()>;

    fn end_region(&mut self) -> io::Result<()>;
}
