//! Differential renderer.
//!
//! Compares the new frame to the previous one and only writes cells that
//! changed, inside a synchronized-update block so the terminal never shows a
//! half-drawn frame.
//!
//! 1. Begin synchronized update
//! 2. For each changed cell: move the cursor only when not sequential, emit
//!    attributes and colors only when they differ from the last cell written
//! 3. End synchronized update and flush once
//! 4. Keep the frame for the next comparison

use std::io::{self, Write};

use crossterm::queue;
use crossterm::style::{
    Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate};
use crossterm::cursor::MoveTo;

use super::buffer::FrameBuffer;
use crate::types::{Attr, Cell, Rgba};

/// Map a cell color to a crossterm color.
pub fn to_color(color: Rgba) -> Color {
    if color.is_terminal_default() {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r.clamp(0, 255) as u8,
            g: color.g.clamp(0, 255) as u8,
            b: color.b.clamp(0, 255) as u8,
        }
    }
}

/// Tracks what the terminal already has so redundant escapes are skipped.
#[derive(Debug, Default)]
struct CellState {
    last: Option<(u16, u16)>,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
    attrs: Attr,
}

impl CellState {
    fn render<W: Write>(&mut self, out: &mut W, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        // Wide-char continuation: the glyph to the left already covers it
        if cell.char == 0 {
            self.last = Some((x, y));
            return Ok(());
        }

        let sequential = matches!(self.last, Some((lx, ly)) if ly == y && lx + 1 == x);
        if !sequential {
            queue!(out, MoveTo(x, y))?;
        }

        if cell.attrs != self.attrs {
            queue!(out, SetAttribute(Attribute::Reset))?;
            for (flag, attribute) in [
                (Attr::BOLD, Attribute::Bold),
                (Attr::DIM, Attribute::Dim),
                (Attr::ITALIC, Attribute::Italic),
                (Attr::UNDERLINE, Attribute::Underlined),
                (Attr::INVERSE, Attribute::Reverse),
            ] {
                if cell.attrs.contains(flag) {
                    queue!(out, SetAttribute(attribute))?;
                }
            }
            // Reset dropped the colors too
            self.fg = None;
            self.bg = None;
            self.attrs = cell.attrs;
        }

        if self.fg != Some(cell.fg) {
            queue!(out, SetForegroundColor(to_color(cell.fg)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            queue!(out, SetBackgroundColor(to_color(cell.bg)))?;
            self.bg = Some(cell.bg);
        }

        let ch = char::from_u32(cell.char).unwrap_or(' ');
        queue!(out, Print(ch))?;
        self.last = Some((x, y));
        Ok(())
    }
}

/// Differential renderer for the alternate screen.
#[derive(Debug, Default)]
pub struct DiffRenderer {
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the cells that changed since the last frame.
    ///
    /// Returns the number of cells written.
    pub fn render<W: Write>(&mut self, out: &mut W, buffer: &FrameBuffer) -> io::Result<usize> {
        let (width, height) = (buffer.width(), buffer.height());
        let previous = self
            .previous
            .as_ref()
            .filter(|p| p.width() == width && p.height() == height);

        let mut state = CellState::default();
        let mut written = 0;
        queue!(out, BeginSynchronizedUpdate)?;
        for y in 0..height {
            for x in 0..width {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                let changed = previous
                    .and_then(|p| p.get(x, y))
                    .is_none_or(|prev| prev != cell);
                if changed {
                    state.render(out, x, y, cell)?;
                    written += 1;
                }
            }
        }
        queue!(out, SetAttribute(Attribute::Reset), EndSynchronizedUpdate)?;
        out.flush()?;

        self.previous = Some(buffer.clone());
        Ok(written)
    }

    /// Next render repaints every cell.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}
