//! Cell layout for the terminal engine.
//!
//! Layout is positional, like the rest of an immediate-mode UI: each widget
//! asks the innermost [`Scope`] for the next rectangle. Rows hand out one
//! column per widget and wrap to a new row after the last width; every
//! other scope stacks widgets vertically.

use crate::types::{Rect, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Window,
    Row,
    Column,
    Panel,
    Region,
}

/// One open layout region.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub area: Rect,
    pub clip: Rect,
    widths: Vec<Width>,
    row_height: u16,
    col: usize,
    row_y: u16,
    /// First line below everything placed so far.
    pub cursor_y: u16,
}

impl Scope {
    pub fn new(kind: ScopeKind, area: Rect, clip: Rect) -> Self {
        Self {
            kind,
            area,
            clip: intersect(area, clip),
            widths: Vec::new(),
            row_height: 0,
            col: 0,
            row_y: area.y,
            cursor_y: area.y,
        }
    }

    /// Fixed height for every row of a row scope (0 = natural height).
    pub fn with_row_height(mut self, height: u16) -> Self {
        self.row_height = height;
        self
    }

    pub fn set_widths(&mut self, widths: &[Width]) {
        self.widths = widths.to_vec();
        self.col = 0;
    }

    /// Width the next widget will get, without allocating it.
    pub fn peek_width(&self) -> u16 {
        match self.kind {
            ScopeKind::Row => {
                let col = if self.col >= self.column_count() { 0 } else { self.col };
                self.column(col).1
            }
            _ => self.area.width,
        }
    }

    /// Allocate the next widget rectangle.
    pub fn next_rect(&mut self, natural_height: u16) -> Rect {
        let height = if self.row_height > 0 {
            self.row_height
        } else {
            natural_height
        };
        match self.kind {
            ScopeKind::Row => {
                let (x, width) = self.next_column();
                self.cursor_y = self.cursor_y.max(self.row_y.saturating_add(height));
                Rect::new(x, self.row_y, width, height)
            }
            _ => {
                let rect = Rect::new(self.area.x, self.cursor_y, self.area.width, height);
                self.cursor_y = self.cursor_y.saturating_add(height);
                rect
            }
        }
    }

    /// Area for a nested scope: the next cell of a row, or the rest of the
    /// scope below the cursor. The nested scope reports its extent back
    /// through [`absorb`](Scope::absorb).
    pub fn child_area(&mut self) -> Rect {
        match self.kind {
            ScopeKind::Row => {
                let (x, width) = self.next_column();
                let height = self.area.bottom().saturating_sub(self.row_y);
                Rect::new(x, self.row_y, width, height)
            }
            _ => Rect::new(
                self.area.x,
                self.cursor_y,
                self.area.width,
                self.area.bottom().saturating_sub(self.cursor_y),
            ),
        }
    }

    pub fn absorb(&mut self, bottom: u16) {
        self.cursor_y = self.cursor_y.max(bottom);
    }

    fn column_count(&self) -> usize {
        self.widths.len().max(1)
    }

    fn column(&self, col: usize) -> (u16, u16) {
        let columns = if self.widths.is_empty() {
            resolve_columns(&[Width::Fill], self.area.width)
        } else {
            resolve_columns(&self.widths, self.area.width)
        };
        let (offset, width) = columns.get(col).copied().unwrap_or((0, 0));
        (self.area.x.saturating_add(offset), width)
    }

    fn next_column(&mut self) -> (u16, u16) {
        if self.col >= self.column_count() {
            self.col = 0;
        }
        if self.col == 0 {
            self.row_y = self.cursor_y;
        }
        let column = self.column(self.col);
        self.col += 1;
        column
    }
}

/// Resolve column widths to `(offset, width)` pairs within `total` cells.
///
/// Fixed widths are honored left to right until space runs out; fill
/// columns share what is left, the last fill taking the remainder.
pub fn resolve_columns(widths: &[Width], total: u16) -> Vec<(u16, u16)> {
    let fixed: u32 = widths
        .iter()
        .map(|w| match w {
            Width::Fixed(n) => *n as u32,
            Width::Fill => 0,
        })
        .sum();
    let fills = widths.iter().filter(|w| **w == Width::Fill).count() as u32;
    let remaining = (total as u32).saturating_sub(fixed);
    let share = if fills > 0 { remaining / fills } else { 0 };

    let mut offset: u32 = 0;
    let mut fills_seen = 0;
    widths
        .iter()
        .map(|w| {
            let want = match w {
                Width::Fixed(n) => *n as u32,
                Width::Fill => {
                    fills_seen += 1;
                    if fills_seen == fills {
                        remaining - share * (fills - 1)
                    } else {
                        share
                    }
                }
            };
            let start = offset.min(total as u32);
            let width = want.min(total as u32 - start);
            offset += want;
            (start as u16, width as u16)
        })
        .collect()
}

/// Overlap of two rectangles (zero-sized if they do not meet).
pub fn intersect(a: Rect, b: Rect) -> Rect {
    let x = a.x.max(b.x);
    let y = a.y.max(b.y);
    let right = a.right().min(b.right());
    let bottom = a.bottom().min(b.bottom());
    Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
}

/// Shrink a rectangle by `n` cells on every side.
pub fn inset(rect: Rect, n: u16) -> Rect {
    Rect::new(
        rect.x.saturating_add(n),
        rect.y.saturating_add(n),
        rect.width.saturating_sub(n * 2),
        rect.height.saturating_sub(n * 2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fixed_and_fill() {
        let cols = resolve_columns(&[Width::Fixed(20), Width::Fill], 50);
        assert_eq!(cols, vec![(0, 20), (20, 30)]);
    }

    #[test]
    fn test_resolve_fills_share_remainder() {
        let cols = resolve_columns(&[Width::Fill, Width::Fixed(2), Width::Fill], 9);
        assert_eq!(cols, vec![(0, 3), (3, 2), (5, 4)]);
    }

    #[test]
    fn test_resolve_overflow_clamps() {
        let cols = resolve_columns(&[Width::Fixed(8), Width::Fixed(8), Width::Fill], 10);
        assert_eq!(cols, vec![(0, 8), (8, 2), (10, 0)]);
    }

    #[test]
    fn test_row_wraps_after_last_width() {
        let area = Rect::new(0, 0, 30, 10);
        let mut row = Scope::new(ScopeKind::Row, area, area);
        row.set_widths(&[Width::Fixed(10), Width::Fill]);
        assert_eq!(row.next_rect(1), Rect::new(0, 0, 10, 1));
        assert_eq!(row.next_rect(1), Rect::new(10, 0, 20, 1));
        assert_eq!(row.next_rect(1), Rect::new(0, 1, 10, 1));
        assert_eq!(row.cursor_y, 2);
    }

    #[test]
    fn test_row_height_overrides_natural() {
        let area = Rect::new(0, 0, 10, 10);
        let mut row = Scope::new(ScopeKind::Row, area, area).with_row_height(3);
        assert_eq!(row.next_rect(1), Rect::new(0, 0, 10, 3));
        assert_eq!(row.next_rect(1), Rect::new(0, 3, 10, 3));
    }

    #[test]
    fn test_column_stacks() {
        let area = Rect::new(2, 1, 8, 10);
        let mut column = Scope::new(ScopeKind::Column, area, area);
        assert_eq!(column.next_rect(1), Rect::new(2, 1, 8, 1));
        assert_eq!(column.next_rect(2), Rect::new(2, 2, 8, 2));
        assert_eq!(column.child_area(), Rect::new(2, 4, 8, 7));
    }

    #[test]
    fn test_peek_width_matches_allocation() {
        let area = Rect::new(0, 0, 30, 5);
        let mut row = Scope::new(ScopeKind::Row, area, area);
        row.set_widths(&[Width::Fixed(7), Width::Fill]);
        assert_eq!(row.peek_width(), 7);
        row.next_rect(1);
        assert_eq!(row.peek_width(), 23);
    }

    #[test]
    fn test_intersect_and_inset() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(intersect(a, b), Rect::new(5, 5, 5, 5));
        assert_eq!(intersect(a, Rect::new(20, 20, 1, 1)).width, 0);
        assert_eq!(inset(a, 1), Rect::new(1, 1, 8, 8));
    }
}
