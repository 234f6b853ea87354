//! Input - crossterm event conversion and per-frame input state.
//!
//! Events are drained once per frame in `poll_input` and folded into an
//! [`InputState`]. Widgets read that state while they draw, the way an
//! immediate-mode UI does: a button is "clicked" if the mouse went down
//! inside it since the previous frame.

use std::io;
use std::time::Duration;

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent as CrosstermMouseEvent, MouseEventKind,
};

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Events the terminal engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(Key),
    Mouse(MouseInput),
    Resize(u16, u16),
    None,
}

/// Keys used by widgets plus the stop keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Enter,
    Tab,
    /// Escape or Ctrl+C.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Drag,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseInput {
    pub action: MouseAction,
    pub x: u16,
    pub y: u16,
}

// =============================================================================
// EVENT CONVERSION
// =============================================================================

/// Convert a crossterm mouse event. Only the left button and motion matter.
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> InputEvent {
    let action = match event.kind {
        MouseEventKind::Down(MouseButton::Left) => MouseAction::Down,
        MouseEventKind::Up(MouseButton::Left) => MouseAction::Up,
        MouseEventKind::Drag(MouseButton::Left) => MouseAction::Drag,
        MouseEventKind::Moved => MouseAction::Move,
        _ => return InputEvent::None,
    };
    InputEvent::Mouse(MouseInput {
        action,
        x: event.column,
        y: event.row,
    })
}

/// Convert a crossterm key event. Releases are ignored.
pub fn convert_key_event(event: CrosstermKeyEvent) -> InputEvent {
    if event.kind == KeyEventKind::Release {
        return InputEvent::None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let key = match event.code {
        KeyCode::Char('c') if ctrl => Key::Quit,
        KeyCode::Char(_) if ctrl => return InputEvent::None,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Esc => Key::Quit,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        _ => return InputEvent::None,
    };
    InputEvent::Key(key)
}

pub fn convert_event(event: CrosstermEvent) -> InputEvent {
    match event {
        CrosstermEvent::Mouse(mouse) => convert_mouse_event(mouse),
        CrosstermEvent::Key(key) => convert_key_event(key),
        CrosstermEvent::Resize(w, h) => InputEvent::Resize(w, h),
        _ => InputEvent::None,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout. `None` if nothing arrived in time.
pub fn poll_event(timeout: Duration) -> io::Result<Option<InputEvent>> {
    if event::poll(timeout)? {
        Ok(Some(convert_event(event::read()?)))
    } else {
        Ok(None)
    }
}

// =============================================================================
// FRAME INPUT STATE
// =============================================================================

/// Input accumulated since the previous frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Last known pointer position.
    pub mouse: Option<(u16, u16)>,
    /// Where the left button went down this frame.
    pub pressed: Option<(u16, u16)>,
    /// Left button currently held.
    pub held: bool,
    /// Typed keys, in order, for the focused text field.
    pub keys: Vec<Key>,
    pub resized: Option<(u16, u16)>,
    pub quit: bool,
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key(Key::Quit) => self.quit = true,
            InputEvent::Key(key) => self.keys.push(key),
            InputEvent::Mouse(MouseInput { action, x, y }) => {
                self.mouse = Some((x, y));
                match action {
                    MouseAction::Down => {
                        self.pressed = Some((x, y));
                        self.held = true;
                    }
                    MouseAction::Up => self.held = false,
                    MouseAction::Drag => self.held = true,
                    MouseAction::Move => {}
                }
            }
            InputEvent::Resize(w, h) => self.resized = Some((w, h)),
            InputEvent::None => {}
        }
    }

    /// Forget one-frame input. Pointer position and button state persist.
    pub fn end_frame(&mut self) {
        self.pressed = None;
        self.keys.clear();
        self.resized = None;
    }

    pub fn pressed_in(&self, rect: crate::types::Rect) -> bool {
        self.pressed.is_some_and(|(x, y)| rect.contains(x, y))
    }

    pub fn hovering(&self, rect: crate::types::Rect) -> bool {
        self.mouse.is_some_and(|(x, y)| rect.contains(x, y))
    }
}

// =============================================================================
// TESTS
// =============================================================================
