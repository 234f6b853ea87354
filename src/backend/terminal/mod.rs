//! Terminal engine - an immediate-mode [`Engine`] on crossterm.
//!
//! Each frame is drawn into a [`FrameBuffer`] and presented through the
//! [`DiffRenderer`], so only changed cells reach the terminal. Input is read
//! once per frame in `poll_input`; widgets hit-test the mouse against the
//! rectangle they were just given.
//!
//! # Modules
//!
//! - [`buffer`] - cell grid and drawing primitives
//! - [`diff`] - differential presentation
//! - [`input`] - crossterm event conversion, per-frame input state
//! - [`layout`] - row/column cell layout

pub mod buffer;
pub mod diff;
pub mod input;
pub mod layout;

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::execute;
use tracing::{debug, trace, warn};

use self::buffer::{string_width, truncate, wrap, FrameBuffer, ROUNDED, SINGLE};
use self::diff::DiffRenderer;
use self::input::{poll_event, InputEvent, InputState, Key};
use self::layout::{inset, intersect, Scope, ScopeKind};
use super::{Engine, Expandable, LayoutKind, Response, TextboxResponse, WindowOptions};
use crate::config::RenderConfig;
use crate::host::Identity;
use crate::primitives::format_number;
use crate::types::{Attr, Rect, Rgba, Width};

/// Colors used by the built-in widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Rgba,
    pub muted: Rgba,
    pub border: Rgba,
    pub accent: Rgba,
    pub surface: Rgba,
    pub control: Rgba,
    pub control_hover: Rgba,
}

impl Palette {
    /// Neutral dark palette.
    pub fn terminal() -> Self {
        Self {
            text: Rgba::TERMINAL_DEFAULT,
            muted: Rgba::GRAY,
            border: Rgba::GRAY,
            accent: Rgba::BLUE,
            surface: Rgba::rgb(24, 24, 28),
            control: Rgba::DARK_GRAY,
            control_hover: Rgba::rgb(80, 80, 90),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::terminal()
    }
}

/// Crossterm-backed engine.
///
/// `TerminalEngine::new` drives the real terminal on stdout.
/// [`TerminalEngine::offscreen`] renders into any writer and takes input only
/// from [`inject`](TerminalEngine::inject), which is how it is tested.
pub struct TerminalEngine<W: Write = Stdout> {
    out: W,
    live: bool,
    active: bool,
    buffer: FrameBuffer,
    renderer: DiffRenderer,
    input: InputState,
    injected: VecDeque<InputEvent>,
    scopes: Vec<Scope>,
    panels: Vec<(Rect, String)>,
    palette: Palette,
    frame_budget: Duration,
    max_input_len: usize,
    last_frame: Option<Instant>,
    widget_seq: u32,
    drag: Option<u32>,
    focus: Option<Identity>,
    focus_claimed: bool,
    closed: HashSet<String>,
    seen_modals: HashSet<String>,
    expanded: HashMap<(Expandable, String), bool>,
    seen_expandables: HashSet<(Expandable, String)>,
}

impl TerminalEngine<Stdout> {
    /// Engine on the process terminal. Nothing is touched until `init`.
    pub fn new(config: &RenderConfig) -> Self {
        let mut engine = Self::offscreen(io::stdout(), 0, 0, config);
        engine.live = true;
        engine
    }
}

impl<W: Write> TerminalEngine<W> {
    /// Engine rendering into `out` with a fixed size and no terminal input.
    pub fn offscreen(out: W, width: u16, height: u16, config: &RenderConfig) -> Self {
        Self {
            out,
            live: false,
            active: false,
            buffer: FrameBuffer::new(width, height),
            renderer: DiffRenderer::new(),
            input: InputState::default(),
            injected: VecDeque::new(),
            scopes: Vec::new(),
            panels: Vec::new(),
            palette: Palette::default(),
            frame_budget: config.frame_budget(),
            max_input_len: config.max_input_len,
            last_frame: None,
            widget_seq: 0,
            drag: None,
            focus: None,
            focus_claimed: false,
            closed: HashSet::new(),
            seen_modals: HashSet::new(),
            expanded: HashMap::new(),
            seen_expandables: HashSet::new(),
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    /// Queue an input event for the next `poll_input`.
    pub fn inject(&mut self, event: InputEvent) {
        self.injected.push_back(event);
    }

    /// The last drawn frame.
    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Identity of the text field holding keyboard focus.
    pub fn focused(&self) -> Option<&Identity> {
        self.focus.as_ref()
    }

    fn top(&mut self) -> &mut Scope {
        if self.scopes.is_empty() {
            let bounds = self.buffer.bounds();
            self.scopes
                .push(Scope::new(ScopeKind::Column, bounds, bounds));
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    fn clip(&mut self) -> Rect {
        self.top().clip
    }

    fn push_scope(&mut self, kind: ScopeKind, area: Rect, row_height: u16) {
        let clip = self.clip();
        self.scopes
            .push(Scope::new(kind, area, clip).with_row_height(row_height));
    }

    /// Close the innermost scope and report its extent to the parent.
    /// The base scope is never popped.
    fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() <= 1 {
            return None;
        }
        let child = self.scopes.pop()?;
        self.top().absorb(child.cursor_y);
        Some(child)
    }

    fn next_seq(&mut self) -> u32 {
        self.widget_seq += 1;
        self.widget_seq
    }

    fn resize(&mut self, width: u16, height: u16) {
        trace!(width, height, "terminal resized");
        self.buffer.resize(width, height);
        self.renderer.invalidate();
    }

    fn drain_input(&mut self) -> io::Result<()> {
        if self.live {
            let elapsed = self.last_frame.map(|t| t.elapsed()).unwrap_or_default();
            let mut timeout = self.frame_budget.saturating_sub(elapsed);
            while let Some(event) = poll_event(timeout)? {
                self.input.apply(event);
                timeout = Duration::ZERO;
            }
        }
        while let Some(event) = self.injected.pop_front() {
            self.input.apply(event);
        }
        if let Some((width, height)) = self.input.resized {
            self.resize(width, height);
        }
        Ok(())
    }

    fn restore_terminal(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            SetAttribute(Attribute::Reset),
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    fn slider_value(&self, rect: Rect, min: f64, max: f64) -> Option<f64> {
        let (mx, _) = self.input.mouse?;
        if rect.width <= 1 {
            return Some(min);
        }
        let pos = mx.clamp(rect.x, rect.right() - 1) - rect.x;
        let t = pos as f64 / (rect.width - 1) as f64;
        Some(min + t * (max - min))
    }
}

impl<W: Write> Engine for TerminalEngine<W> {
    fn init(&mut self) -> io::Result<()> {
        if self.live {
            terminal::enable_raw_mode()?;
            execute!(
                self.out,
                EnterAlternateScreen,
                EnableMouseCapture,
                Hide,
                Clear(ClearType::All)
            )?;
            let (width, height) = terminal::size()?;
            self.resize(width, height);
        }
        self.active = true;
        self.renderer.invalidate();
        debug!(
            width = self.buffer.width(),
            height = self.buffer.height(),
            live = self.live,
            "terminal engine initialized"
        );
        Ok(())
    }

    fn poll_input(&mut self) -> io::Result<bool> {
        self.drain_input()?;
        Ok(self.input.quit)
    }

    fn begin_frame(&mut self) -> io::Result<()> {
        self.buffer.clear();
        self.scopes.clear();
        self.panels.clear();
        let bounds = self.buffer.bounds();
        self.scopes
            .push(Scope::new(ScopeKind::Column, bounds, bounds));
        self.widget_seq = 0;
        self.focus_claimed = false;
        self.seen_modals.clear();
        self.seen_expandables.clear();
        Ok(())
    }

    fn end_frame(&mut self) -> io::Result<()> {
        if self.input.pressed.is_some() && !self.focus_claimed {
            self.focus = None;
        }
        if !self.input.held {
            self.drag = None;
        }
        // A modal or expandable that stopped being drawn starts over later
        let seen = &self.seen_modals;
        self.closed.retain(|title| seen.contains(title));
        let seen = &self.seen_expandables;
        self.expanded.retain(|key, _| seen.contains(key));

        self.renderer.render(&mut self.out, &self.buffer)?;
        self.input.end_frame();
        self.last_frame = Some(Instant::now());
        Ok(())
    }

    fn shutdown(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        if self.live {
            self.restore_terminal()?;
        }
        debug!("terminal engine shut down");
        Ok(())
    }

    fn begin_window(&mut self, options: &WindowOptions) -> io::Result<bool> {
        let bounds = self.buffer.bounds();
        let rect = options.rect.map_or(bounds, |r| intersect(r, bounds));

        if options.modal {
            self.seen_modals.insert(options.title.clone());
            if self.closed.contains(&options.title) {
                return Ok(false);
            }
            let close_box = Rect::new(rect.right().saturating_sub(4), rect.y, 3, 1);
            if self.input.pressed_in(close_box) {
                self.closed.insert(options.title.clone());
                return Ok(false);
            }
            self.buffer.fill_rect(rect, self.palette.surface, None);
            self.buffer
                .draw_border(rect, &ROUNDED, self.palette.border, Some(options.title.as_str()), None);
            self.buffer.draw_text(
                close_box.x,
                close_box.y,
                "[x]",
                self.palette.muted,
                None,
                Attr::NONE,
                None,
            );
        } else {
            self.buffer
                .draw_border(rect, &SINGLE, self.palette.border, Some(options.title.as_str()), None);
        }

        let inner = inset(rect, 1);
        self.scopes.push(Scope::new(ScopeKind::Window, inner, inner));
        Ok(true)
    }

    fn end_window(&mut self) -> io::Result<()> {
        // Windows float: their extent does not push the parent cursor
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        Ok(())
    }

    fn begin_layout(&mut self, kind: LayoutKind, height: u16) -> io::Result<()> {
        let area = self.top().child_area();
        let kind = match kind {
            LayoutKind::Row => ScopeKind::Row,
            LayoutKind::Column => ScopeKind::Column,
        };
        self.push_scope(kind, area, height);
        Ok(())
    }

    fn set_widths(&mut self, widths: &[Width]) -> io::Result<()> {
        self.top().set_widths(widths);
        Ok(())
    }

    fn end_layout(&mut self, _kind: LayoutKind) -> io::Result<()> {
        self.pop_scope();
        Ok(())
    }

    fn button(&mut self, label: &str) -> io::Result<bool> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        let clicked = self.input.pressed_in(rect);
        let bg = if self.input.hovering(rect) {
            self.palette.control_hover
        } else {
            self.palette.control
        };
        self.buffer.fill_rect(rect, bg, Some(&clip));
        self.buffer.draw_text_centered(
            rect.x,
            rect.y,
            rect.width,
            label,
            self.palette.text,
            Some(bg),
            Attr::BOLD,
            Some(&clip),
        );
        Ok(clicked)
    }

    fn label(&mut self, text: &str) -> io::Result<()> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        let text = truncate(text, rect.width as usize);
        self.buffer
            .draw_text(rect.x, rect.y, text, self.palette.text, None, Attr::NONE, Some(&clip));
        Ok(())
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        let width = self.top().peek_width();
        let lines = wrap(text, width as usize);
        let rect = self.top().next_rect(lines.len() as u16);
        let clip = self.clip();
        for (i, line) in lines.iter().enumerate() {
            self.buffer.draw_text(
                rect.x,
                rect.y.saturating_add(i as u16),
                line,
                self.palette.text,
                None,
                Attr::NONE,
                Some(&clip),
            );
        }
        Ok(())
    }

    fn slider(&mut self, min: f64, max: f64, value: f64) -> io::Result<f64> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        let seq = self.next_seq();
        if max <= min {
            return Ok(min);
        }

        if self.input.pressed_in(rect) {
            self.drag = Some(seq);
        }
        let mut value = value.clamp(min, max);
        if self.drag == Some(seq) && (self.input.held || self.input.pressed.is_some()) {
            if let Some(dragged) = self.slider_value(rect, min, max) {
                value = dragged;
            }
        }

        self.buffer.fill_rect(rect, self.palette.control, Some(&clip));
        let span = rect.width.saturating_sub(1) as f64;
        let thumb = rect.x + (((value - min) / (max - min)) * span).round() as u16;
        for x in rect.x..rect.right() {
            let ch = if x == thumb { '█' } else { '─' };
            let fg = if x <= thumb { self.palette.accent } else { self.palette.muted };
            self.buffer
                .set_cell(x, rect.y, ch as u32, fg, None, Attr::NONE, Some(&clip));
        }
        let caption = format_number((value * 100.0).round() / 100.0);
        if string_width(&caption) + 2 < rect.width as usize {
            self.buffer.draw_text_centered(
                rect.x,
                rect.y,
                rect.width,
                &caption,
                self.palette.text,
                None,
                Attr::BOLD,
                Some(&clip),
            );
        }
        Ok(value)
    }

    fn checkbox(&mut self, label: &str, checked: bool) -> io::Result<bool> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        let checked = checked ^ self.input.pressed_in(rect);
        let mark = if checked { "[x] " } else { "[ ] " };
        let used = self
            .buffer
            .draw_text(rect.x, rect.y, mark, self.palette.accent, None, Attr::NONE, Some(&clip));
        let room = rect.width.saturating_sub(used) as usize;
        self.buffer.draw_text(
            rect.x + used,
            rect.y,
            truncate(label, room),
            self.palette.text,
            None,
            Attr::NONE,
            Some(&clip),
        );
        Ok(checked)
    }

    fn textbox(&mut self, identity: &Identity, value: &str) -> io::Result<TextboxResponse> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        if self.input.pressed_in(rect) {
            self.focus = Some(identity.clone());
            self.focus_claimed = true;
        } else if self.input.pressed.is_some() && self.focus.as_ref() == Some(identity) {
            self.focus = None;
        }

        let mut text = value.to_string();
        let mut flags = Response::empty();
        if self.focus.as_ref() == Some(identity) {
            flags |= Response::ACTIVE;
            for key in std::mem::take(&mut self.input.keys) {
                match key {
                    Key::Char(c) if text.chars().count() < self.max_input_len => {
                        text.push(c);
                        flags |= Response::CHANGE;
                    }
                    Key::Backspace => {
                        if text.pop().is_some() {
                            flags |= Response::CHANGE;
                        }
                    }
                    Key::Enter => flags |= Response::SUBMIT,
                    _ => {}
                }
            }
        }

        self.buffer.fill_rect(rect, self.palette.control, Some(&clip));
        let room = rect.width.saturating_sub(1) as usize;
        // Keep the end of the text (and the cursor) in view
        let mut shown = text.as_str();
        while string_width(shown) > room {
            let mut chars = shown.chars();
            chars.next();
            shown = chars.as_str();
        }
        let used = self.buffer.draw_text(
            rect.x,
            rect.y,
            shown,
            self.palette.text,
            None,
            Attr::NONE,
            Some(&clip),
        );
        if flags.contains(Response::ACTIVE) {
            self.buffer.set_cell(
                rect.x + used,
                rect.y,
                ' ' as u32,
                self.palette.text,
                None,
                Attr::INVERSE,
                Some(&clip),
            );
        }

        Ok(TextboxResponse { text, flags })
    }

    fn rect(&mut self, color: Rgba) -> io::Result<()> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        self.buffer.fill_rect(rect, color, Some(&clip));
        Ok(())
    }

    fn begin_expandable(
        &mut self,
        kind: Expandable,
        title: &str,
        expanded: bool,
    ) -> io::Result<bool> {
        let rect = self.top().next_rect(1);
        let clip = self.clip();
        let toggled = self.input.pressed_in(rect);
        let key = (kind, title.to_string());
        self.seen_expandables.insert(key.clone());
        let open = self.expanded.entry(key).or_insert(expanded);
        if toggled {
            *open = !*open;
        }
        let open = *open;

        let marker = if open { "▾ " } else { "▸ " };
        let (attrs, bg) = match kind {
            Expandable::Header => (Attr::BOLD, Some(self.palette.control)),
            Expandable::TreeNode => (Attr::NONE, None),
        };
        if let Some(bg) = bg {
            self.buffer.fill_rect(rect, bg, Some(&clip));
        }
        let used = self
            .buffer
            .draw_text(rect.x, rect.y, marker, self.palette.accent, bg, attrs, Some(&clip));
        let room = rect.width.saturating_sub(used) as usize;
        self.buffer.draw_text(
            rect.x + used,
            rect.y,
            truncate(title, room),
            self.palette.text,
            bg,
            attrs,
            Some(&clip),
        );

        if open {
            let mut area = self.top().child_area();
            if kind == Expandable::TreeNode {
                area.x = area.x.saturating_add(2);
                area.width = area.width.saturating_sub(2);
            }
            self.push_scope(ScopeKind::Column, area, 0);
        }
        Ok(open)
    }

    fn end_expandable(&mut self, _kind: Expandable) -> io::Result<()> {
        self.pop_scope();
        Ok(())
    }

    fn begin_panel(&mut self, title: &str) -> io::Result<()> {
        let outer = self.top().child_area();
        self.panels.push((outer, title.to_string()));
        self.push_scope(ScopeKind::Panel, inset(outer, 1), 0);
        Ok(())
    }

    fn end_panel(&mut self) -> io::Result<()> {
        let Some(child) = self.pop_scope() else {
            return Ok(());
        };
        let Some((outer, title)) = self.panels.pop() else {
            return Ok(());
        };
        // Bottom edge on the first free line below the content
        let bottom = child.cursor_y.saturating_add(1).min(outer.bottom());
        let frame = Rect::new(outer.x, outer.y, outer.width, bottom.saturating_sub(outer.y));
        let clip = self.clip();
        self.buffer
            .draw_border(frame, &SINGLE, self.palette.border, Some(title.as_str()), Some(&clip));
        self.top().absorb(frame.bottom());
        Ok(())
    }

    fn begin_region(&mut self, width: u16, height: u16) -> io::Result<()> {
        let cell = self.top().next_rect(height);
        let region = Rect::new(cell.x, cell.y, width.min(cell.width), height);
        self.push_scope(ScopeKind::Region, region, 0);
        Ok(())
    }

    fn image(&mut self, src: &str) -> io::Result<()> {
        let area = self.top().area;
        let clip = self.clip();
        self.buffer.fill_rect(area, self.palette.surface, Some(&clip));
        let caption = format!("▣ {src}");
        let y = area.y + area.height / 2;
        self.buffer.draw_text_centered(
            area.x,
            y,
            area.width,
            &caption,
            self.palette.muted,
            None,
            Attr::DIM,
            Some(&clip),
        );
        Ok(())
    }

    fn end_region(&mut self) -> io::Result<()> {
        self.pop_scope();
        Ok(())
    }
}

impl<W: Write> Drop for TerminalEngine<W> {
    fn drop(&mut self) {
        if self.active && self.live {
            if let Err(err) = self.restore_terminal() {
                warn!(%err, "failed to restore terminal on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::input::{MouseAction, MouseInput};
    use super::*;
    use crate::host::ElementKind;

    fn engine(width: u16, height: u16) -> TerminalEngine<Vec<u8>> {
        let mut engine = TerminalEngine::offscreen(Vec::new(), width, height, &RenderConfig::new());
        engine.init().unwrap();
        engine
    }

    fn click(engine: &mut TerminalEngine<Vec<u8>>, x: u16, y: u16) {
        engine.inject(InputEvent::Mouse(MouseInput {
            action: MouseAction::Down,
            x,
            y,
        }));
        engine.inject(InputEvent::Mouse(MouseInput {
            action: MouseAction::Up,
            x,
            y,
        }));
    }

    fn root(engine: &mut TerminalEngine<Vec<u8>>) {
        engine.begin_frame().unwrap();
        assert!(engine.begin_window(&WindowOptions::container("root")).unwrap());
    }

    fn finish(engine: &mut TerminalEngine<Vec<u8>>) {
        engine.end_window().unwrap();
        engine.end_frame().unwrap();
    }

    #[test]
    fn test_row_layout_draws_label_and_button() {
        let mut engine = engine(40, 5);
        root(&mut engine);
        engine.begin_layout(LayoutKind::Row, 0).unwrap();
        engine.set_widths(&[Width::Fixed(14), Width::Fill]).unwrap();
        engine.label("Clicked (0)").unwrap();
        assert!(!engine.button("Click").unwrap());
        engine.end_layout(LayoutKind::Row).unwrap();
        finish(&mut engine);

        let row = engine.buffer().row_text(1);
        assert!(row.starts_with("│Clicked (0)"));
        assert!(row.contains("Click"));
        assert!(!engine.writer().is_empty());
    }

    #[test]
    fn test_button_click_hit_test() {
        let mut engine = engine(20, 5);
        // Button occupies row 1 inside the window border
        click(&mut engine, 5, 1);
        assert!(!engine.poll_input().unwrap());
        root(&mut engine);
        assert!(engine.button("Go").unwrap());
        finish(&mut engine);

        // Clicks are consumed by the frame they arrived in
        engine.poll_input().unwrap();
        root(&mut engine);
        assert!(!engine.button("Go").unwrap());
        finish(&mut engine);
    }

    #[test]
    fn test_checkbox_toggles_on_click() {
        let mut engine = engine(20, 5);
        click(&mut engine, 2, 1);
        engine.poll_input().unwrap();
        root(&mut engine);
        assert!(!engine.checkbox("Check me!", true).unwrap());
        finish(&mut engine);
        assert!(engine.buffer().row_text(1).contains("[ ] Check me!"));
    }

    #[test]
    fn test_slider_click_sets_value() {
        let mut engine = engine(13, 3);
        // Inner width 11: x = 1..=11, far right maps to max
        click(&mut engine, 11, 1);
        engine.poll_input().unwrap();
        root(&mut engine);
        let value = engine.slider(0.0, 10.0, 2.0).unwrap();
        finish(&mut engine);
        assert_eq!(value, 10.0);
    }

    #[test]
    fn test_textbox_focus_and_typing() {
        let mut engine = engine(20, 3);
        let id = Identity::Allocated {
            kind: ElementKind::Input,
            index: 0,
        };
        click(&mut engine, 3, 1);
        for key in [Key::Char('y'), Key::Char('z'), Key::Backspace, Key::Enter] {
            engine.inject(InputEvent::Key(key));
        }
        engine.poll_input().unwrap();
        root(&mut engine);
        let response = engine.textbox(&id, "x").unwrap();
        finish(&mut engine);

        assert_eq!(response.text, "xy");
        assert!(response.flags.contains(Response::CHANGE | Response::SUBMIT | Response::ACTIVE));
        assert_eq!(engine.focused(), Some(&id));

        // Clicking elsewhere drops focus
        click(&mut engine, 3, 2);
        engine.poll_input().unwrap();
        root(&mut engine);
        let response = engine.textbox(&id, "xy").unwrap();
        finish(&mut engine);
        assert!(response.flags.is_empty());
        assert_eq!(engine.focused(), None);
    }

    #[test]
    fn test_textbox_respects_max_len() {
        let config = RenderConfig::new().with_max_input_len(2);
        let mut engine = TerminalEngine::offscreen(Vec::new(), 20, 3, &config);
        engine.init().unwrap();
        let id = Identity::Key("name".into());
        click(&mut engine, 3, 1);
        engine.inject(InputEvent::Key(Key::Char('b')));
        engine.inject(InputEvent::Key(Key::Char('c')));
        engine.poll_input().unwrap();
        root(&mut engine);
        let response = engine.textbox(&id, "a").unwrap();
        finish(&mut engine);
        assert_eq!(response.text, "ab");
    }

    #[test]
    fn test_modal_close_box() {
        let mut engine = engine(30, 10);
        let modal = WindowOptions::modal("Dialog", Rect::new(0, 0, 20, 5));
        // "[x]" sits at right - 4
        click(&mut engine, 17, 0);
        engine.poll_input().unwrap();
        engine.begin_frame().unwrap();
        assert!(!engine.begin_window(&modal).unwrap());
        engine.end_frame().unwrap();

        // Stays closed while the app keeps drawing it
        engine.poll_input().unwrap();
        engine.begin_frame().unwrap();
        assert!(!engine.begin_window(&modal).unwrap());
        engine.end_frame().unwrap();

        // Reopens once it has been gone for a frame
        engine.begin_frame().unwrap();
        engine.end_frame().unwrap();
        engine.begin_frame().unwrap();
        assert!(engine.begin_window(&modal).unwrap());
    }

    #[test]
    fn test_expandable_remembers_state() {
        let mut engine = engine(20, 6);
        root(&mut engine);
        assert!(!engine.begin_expandable(Expandable::TreeNode, "Node", false).unwrap());
        finish(&mut engine);

        click(&mut engine, 3, 1);
        engine.poll_input().unwrap();
        root(&mut engine);
        assert!(engine.begin_expandable(Expandable::TreeNode, "Node", false).unwrap());
        engine.label("child").unwrap();
        engine.end_expandable(Expandable::TreeNode).unwrap();
        finish(&mut engine);
        assert!(engine.buffer().row_text(2).starts_with("│  child"));
    }

    #[test]
    fn test_expandable_forgotten_when_not_drawn() {
        let mut engine = engine(20, 6);
        root(&mut engine);
        assert!(engine.begin_expandable(Expandable::Header, "More", true).unwrap());
        engine.end_expandable(Expandable::Header).unwrap();
        finish(&mut engine);

        // Collapse it by clicking the header row
        click(&mut engine, 3, 1);
        engine.poll_input().unwrap();
        root(&mut engine);
        assert!(!engine.begin_expandable(Expandable::Header, "More", true).unwrap());
        finish(&mut engine);

        // Still collapsed while it keeps being drawn
        engine.poll_input().unwrap();
        root(&mut engine);
        assert!(!engine.begin_expandable(Expandable::Header, "More", true).unwrap());
        finish(&mut engine);

        // One frame without it drops the remembered state
        engine.poll_input().unwrap();
        root(&mut engine);
        finish(&mut engine);
        assert!(engine.expanded.is_empty());

        engine.poll_input().unwrap();
        root(&mut engine);
        assert!(engine.begin_expandable(Expandable::Header, "More", true).unwrap());
        engine.end_expandable(Expandable::Header).unwrap();
        finish(&mut engine);
    }

    #[test]
    fn test_escape_requests_stop() {
        let mut engine = engine(10, 3);
        engine.inject(InputEvent::Key(Key::Quit));
        assert!(engine.poll_input().unwrap());
    }

    #[test]
    fn test_resize_rebuilds_buffer() {
        let mut engine = engine(10, 3);
        engine.inject(InputEvent::Resize(30, 8));
        engine.poll_input().unwrap();
        assert_eq!(engine.buffer().width(), 30);
        assert_eq!(engine.buffer().height(), 8);
    }

    #[test]
    fn test_panel_frames_its_content() {
        let mut engine = engine(20, 8);
        root(&mut engine);
        engine.begin_panel("Box").unwrap();
        engine.label("inside").unwrap();
        engine.end_panel().unwrap();
        engine.label("after").unwrap();
        finish(&mut engine);
        assert!(engine.buffer().row_text(1).contains("Box"));
        assert!(engine.buffer().row_text(2).contains("inside"));
        assert!(engine.buffer().row_text(4).contains("after"));
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut engine = engine(10, 3);
        engine.shutdown().unwrap();
        engine.shutdown().unwrap();
    }
}
