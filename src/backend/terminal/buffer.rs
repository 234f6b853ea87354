//! FrameBuffer and drawing primitives.
//!
//! A 2D grid of [`Cell`]s holding what the terminal should show after the
//! current frame. Widgets draw here; the diff renderer presents it.
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing.
//! - **Clipping**: every drawing call takes an optional clip `Rect`.
//! - **Wide characters**: the cell after a double-width glyph holds `char = 0`.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::types::{Attr, Cell, Rect, Rgba};

/// Display width of a string in terminal cells.
pub fn string_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Cells a single character occupies (0 for control and combining chars).
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Cut `text` to at most `width` cells.
pub fn truncate(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (i, ch) in text.char_indices() {
        let w = char_width(ch);
        if used + w > width {
            return &text[..i];
        }
        used += w;
    }
    text
}

/// Greedy word wrap into lines of at most `width` cells.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split(' ') {
            let word_width = string_width(word);
            let sep = usize::from(!line.is_empty());
            if line_width + sep + word_width > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if !line.is_empty() {
                line.push(' ');
                line_width += 1;
            }
            // Words longer than a line are hard-split
            let mut rest = word;
            while string_width(rest) > width - line_width {
                let head = truncate(rest, width - line_width);
                if head.is_empty() {
                    break;
                }
                line.push_str(head);
                lines.push(std::mem::take(&mut line));
                line_width = 0;
                rest = &rest[head.len()..];
            }
            line.push_str(rest);
            line_width += string_width(rest);
        }
        lines.push(line);
    }
    lines
}

/// Box-drawing characters used for window and panel frames.
pub struct BorderChars {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_right: char,
    pub bottom_left: char,
}

pub const SINGLE: BorderChars = BorderChars {
    horizontal: '─',
    vertical: '│',
    top_left: '┌',
    top_right: '┐',
    bottom_right: '┘',
    bottom_left: '└',
};

pub const ROUNDED: BorderChars = BorderChars {
    horizontal: '─',
    vertical: '│',
    top_left: '╭',
    top_right: '╮',
    bottom_right: '╯',
    bottom_left: '╰',
};

// =============================================================================
// FrameBuffer
// =============================================================================

/// A 2D buffer of terminal cells. `index = y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::default(); size],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    /// One row as text, continuation cells skipped. Handy for assertions.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .filter(|c| c.char != 0)
            .filter_map(|c| char::from_u32(c.char))
            .collect()
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize the buffer (clears content).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::default(); width as usize * height as usize];
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell. Returns true if the cell was inside bounds and clip.
    pub fn set_cell(
        &mut self,
        x: u16,
        y: u16,
        char: u32,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&Rect>,
    ) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        if clip.is_some_and(|c| !c.contains(x, y)) {
            return false;
        }

        let idx = self.index(x, y);
        let cell = &mut self.cells[idx];
        cell.char = char;
        cell.fg = fg;
        if let Some(bg) = bg {
            cell.bg = bg;
        }
        cell.attrs = attrs;
        true
    }

    /// Fill a rectangle with a background color.
    pub fn fill_rect(&mut self, rect: Rect, bg: Rgba, clip: Option<&Rect>) {
        let x2 = rect.right().min(self.width);
        let y2 = rect.bottom().min(self.height);
        let (x1, y1, x2, y2) = match clip {
            Some(c) => (
                rect.x.max(c.x),
                rect.y.max(c.y),
                x2.min(c.right()),
                y2.min(c.bottom()),
            ),
            None => (rect.x, rect.y, x2, y2),
        };
        if x2 <= x1 || y2 <= y1 {
            return;
        }

        for row in y1..y2 {
            let start = self.index(x1, row);
            let end = self.index(x2, row);
            for cell in &mut self.cells[start..end] {
                cell.char = b' ' as u32;
                cell.bg = bg;
                cell.attrs = Attr::NONE;
            }
        }
    }

    /// Draw text at a position. Returns the number of cells used.
    pub fn draw_text(
        &mut self,
        x: u16,
        y: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&Rect>,
    ) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            if self.set_cell(col, y, ch as u32, fg, bg, attrs, clip) && w == 2 {
                // Continuation marker for the right half
                self.set_cell(col + 1, y, 0, fg, bg, attrs, clip);
            }
            col = col.saturating_add(w as u16);
        }
        col.saturating_sub(x)
    }

    /// Draw text centered within `width` cells.
    pub fn draw_text_centered(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        text: &str,
        fg: Rgba,
        bg: Option<Rgba>,
        attrs: Attr,
        clip: Option<&Rect>,
    ) -> u16 {
        let text = truncate(text, width as usize);
        let offset = (width as usize).saturating_sub(string_width(text)) / 2;
        self.draw_text(x + offset as u16, y, text, fg, bg, attrs, clip)
    }

    /// Draw a frame around `rect`, with an optional title in the top edge.
    pub fn draw_border(
        &mut self,
        rect: Rect,
        chars: &BorderChars,
        color: Rgba,
        title: Option<&str>,
        clip: Option<&Rect>,
    ) {
        if rect.width < 2 || rect.height < 2 {
            return;
        }
        let (x, y) = (rect.x, rect.y);
        let x2 = rect.right() - 1;
        let y2 = rect.bottom() - 1;
        let put = |buf: &mut Self, cx: u16, cy: u16, ch: char| {
            buf.set_cell(cx, cy, ch as u32, color, None, Attr::NONE, clip);
        };

        put(self, x, y, chars.top_left);
        put(self, x2, y, chars.top_right);
        put(self, x2, y2, chars.bottom_right);
        put(self, x, y2, chars.bottom_left);
        for col in (x + 1)..x2 {
            put(self, col, y, chars.horizontal);
            put(self, col, y2, chars.horizontal);
        }
        for row in (y + 1)..y2 {
            put(self, x, row, chars.vertical);
            put(self, x2, row, chars.vertical);
        }

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            let room = rect.width.saturating_sub(4) as usize;
            let title = truncate(title, room);
            self.draw_text(x + 2, y, title, color, None, Attr::BOLD, clip);
        }
    }
}
