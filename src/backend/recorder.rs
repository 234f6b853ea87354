//! Recording engine - headless [`Engine`] for tests and offscreen driving.
//!
//! Every engine call is appended to a call log. Interactive calls answer
//! from scripted responses and otherwise echo their input, so an unscripted
//! frame is a frame in which the user did nothing.
//!
//! ```ignore
//! let mut engine = RecordingEngine::new();
//! engine.press("Click");          // next `button("Click")` returns true
//! engine.script_slider(200.0);    // next `slider(..)` returns 200
//! engine.stop_after(3);           // third `poll_input` requests stop
//! ```

use std::collections::{HashSet, VecDeque};
use std::io;

use super::{Engine, Expandable, LayoutKind, TextboxResponse, WindowOptions};
use crate::host::Identity;
use crate::types::{Rgba, Width};

/// One recorded engine call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Init,
    PollInput,
    BeginFrame,
    EndFrame,
    Shutdown,
    BeginWindow(WindowOptions),
    EndWindow,
    BeginLayout(LayoutKind, u16),
    SetWidths(Vec<Width>),
    EndLayout(LayoutKind),
    Button(String),
    Label(String),
    Text(String),
    Slider { min: f64, max: f64, value: f64 },
    Checkbox { label: String, checked: bool },
    Textbox { identity: Identity, value: String },
    Rect(Rgba),
    BeginExpandable {
        kind: Expandable,
        title: String,
        expanded: bool,
    },
    EndExpandable(Expandable),
    BeginPanel(String),
    EndPanel,
    BeginRegion { width: u16, height: u16 },
    Image(String),
    EndRegion,
}

impl Call {
    /// Short name, stable across argument values.
    pub fn name(&self) -> &'static str {
        match self {
            Call::Init => "init",
            Call::PollInput => "poll_input",
            Call::BeginFrame => "begin_frame",
            Call::EndFrame => "end_frame",
            Call::Shutdown => "shutdown",
            Call::BeginWindow(_) => "begin_window",
            Call::EndWindow => "end_window",
            Call::BeginLayout(..) => "begin_layout",
            Call::SetWidths(_) => "set_widths",
            Call::EndLayout(_) => "end_layout",
            Call::Button(_) => "button",
            Call::Label(_) => "label",
            Call::Text(_) => "text",
            Call::Slider { .. } => "slider",
            Call::Checkbox { .. } => "checkbox",
            Call::Textbox { .. } => "textbox",
            Call::Rect(_) => "rect",
            Call::BeginExpandable { .. } => "begin_expandable",
            Call::EndExpandable(_) => "end_expandable",
            Call::BeginPanel(_) => "begin_panel",
            Call::EndPanel => "end_panel",
            Call::BeginRegion { .. } => "begin_region",
            Call::Image(_) => "image",
            Call::EndRegion => "end_region",
        }
    }

    /// Calls that belong to the frame body (everything but lifecycle).
    pub fn is_draw(&self) -> bool {
        !matches!(
            self,
            Call::Init | Call::PollInput | Call::BeginFrame | Call::EndFrame | Call::Shutdown
        )
    }
}

/// Headless engine with a call log and scripted answers.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Vec<Call>,
    polls: u64,
    frames: u64,
    stop_after: Option<u64>,
    stop_requested: bool,
    pressed: HashSet<String>,
    toggled: HashSet<String>,
    sliders: VecDeque<f64>,
    textboxes: VecDeque<TextboxResponse>,
    closed_windows: HashSet<String>,
    collapsed: HashSet<String>,
    fail_on: Option<&'static str>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Scripting
    // =========================================================================

    /// The next `button(label)` call reports activation.
    pub fn press(&mut self, label: impl Into<String>) -> &mut Self {
        self.pressed.insert(label.into());
        self
    }

    /// The next `checkbox(label, ..)` call flips its state.
    pub fn toggle(&mut self, label: impl Into<String>) -> &mut Self {
        self.toggled.insert(label.into());
        self
    }

    /// Queue a value for the next `slider` call.
    pub fn script_slider(&mut self, value: f64) -> &mut Self {
        self.sliders.push_back(value);
        self
    }

    /// Queue a response for the next `textbox` call.
    pub fn script_textbox(&mut self, response: TextboxResponse) -> &mut Self {
        self.textboxes.push_back(response);
        self
    }

    /// Every modal titled `title` reports closed until reopened.
    pub fn close_window(&mut self, title: impl Into<String>) -> &mut Self {
        self.closed_windows.insert(title.into());
        self
    }

    pub fn reopen_window(&mut self, title: &str) -> &mut Self {
        self.closed_windows.remove(title);
        self
    }

    /// Every expandable titled `title` reports closed.
    pub fn collapse(&mut self, title: impl Into<String>) -> &mut Self {
        self.collapsed.insert(title.into());
        self
    }

    /// The `n`th `poll_input` (1-based) and every later one request stop.
    pub fn stop_after(&mut self, n: u64) -> &mut Self {
        self.stop_after = Some(n);
        self
    }

    /// The next `poll_input` requests stop.
    pub fn request_stop(&mut self) -> &mut Self {
        self.stop_requested = true;
        self
    }

    /// Calls named `name` fail with an I/O error.
    pub fn fail_on(&mut self, name: &'static str) -> &mut Self {
        self.fail_on = Some(name);
        self
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Draw calls only, lifecycle calls filtered out.
    pub fn draw_calls(&self) -> Vec<Call> {
        self.calls.iter().filter(|c| c.is_draw()).cloned().collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.iter().filter(|c| c.name() == name).count()
    }

    /// Completed frames (`end_frame` calls).
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    fn record(&mut self, call: Call) -> io::Result<()> {
        let name = call.name();
        self.calls.push(call);
        if self.fail_on == Some(name) {
            return Err(io::Error::other(format!("scripted failure in {name}")));
        }
        Ok(())
    }
}

impl Engine for RecordingEngine {
    fn init(&mut self) -> io::Result<()> {
        self.record(Call::Init)
    }

    fn poll_input(&mut self) -> io::Result<bool> {
        self.record(Call::PollInput)?;
        self.polls += 1;
        let scheduled = self.stop_after.is_some_and(|n| self.polls >= n);
        Ok(std::mem::take(&mut self.stop_requested) || scheduled)
    }

    fn begin_frame(&mut self) -> io::Result<()> {
        self.record(Call::BeginFrame)
    }

    fn end_frame(&mut self) -> io::Result<()> {
        self.record(Call::EndFrame)?;
        self.frames += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.record(Call::Shutdown)
    }

    fn begin_window(&mut self, options: &WindowOptions) -> io::Result<bool> {
        self.record(Call::BeginWindow(options.clone()))?;
        Ok(!(options.modal && self.closed_windows.contains(&options.title)))
    }

    fn end_window(&mut self) -> io::Result<()> {
        self.record(Call::EndWindow)
    }

    fn begin_layout(&mut self, kind: LayoutKind, height: u16) -> io::Result<()> {
        self.record(Call::BeginLayout(kind, height))
    }

    fn set_widths(&mut self, widths: &[Width]) -> io::Result<()> {
        self.record(Call::SetWidths(widths.to_vec()))
    }

    fn end_layout(&mut self, kind: LayoutKind) -> io::Result<()> {
        self.record(Call::EndLayout(kind))
    }

    fn button(&mut self, label: &str) -> io::Result<bool> {
        self.record(Call::Button(label.to_string()))?;
        Ok(self.pressed.remove(label))
    }

    fn label(&mut self, text: &str) -> io::Result<()> {
        self.record(Call::Label(text.to_string()))
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        self.record(Call::Text(text.to_string()))
    }

    fn slider(&mut self, min: f64, max: f64, value: f64) -> io::Result<f64> {
        self.record(Call::Slider { min, max, value })?;
        Ok(self.sliders.pop_front().unwrap_or(value))
    }

    fn checkbox(&mut self, label: &str, checked: bool) -> io::Result<bool> {
        self.record(Call::Checkbox {
            label: label.to_string(),
            checked,
        })?;
        Ok(checked ^ self.toggled.remove(label))
    }

    fn textbox(&mut self, identity: &Identity, value: &str) -> io::Result<TextboxResponse> {
        self.record(Call::Textbox {
            identity: identity.clone(),
            value: value.to_string(),
        })?;
        Ok(self
            .textboxes
            .pop_front()
            .unwrap_or_else(|| TextboxResponse::unchanged(value)))
    }

    fn rect(&mut self, color: Rgba) -> io::Result<()> {
        self.record(Call::Rect(color))
    }

    fn begin_expandable(
        &mut self,
        kind: Expandable,
        title: &str,
        expanded: bool,
    ) -> io::Result<bool> {
        self.record(Call::BeginExpandable {
            kind,
            title: title.to_string(),
            expanded,
        })?;
        Ok(expanded && !self.collapsed.contains(title))
    }

    fn end_expandable(&mut self, kind: Expandable) -> io::Result<()> {
        self.record(Call::EndExpandable(kind))
    }

    fn begin_panel(&mut self, title: &str) -> io::Result<()> {
        self.record(Call::BeginPanel(title.to_string()))
    }

    fn end_panel(&mut self) -> io::Result<()> {
        self.record(Call::EndPanel)
    }

    fn begin_region(&mut self, width: u16, height: u16) -> io::Result<()> {
        self.record(Call::BeginRegion { width, height })
    }

    fn image(&mut self, src: &str) -> io::Result<()> {
        self.record(Call::Image(src.to_string()))
    }

    fn end_region(&mut self) -> io::Result<()> {
        self.record(Call::EndRegion)
    }
}
