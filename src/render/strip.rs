//! Paint primitives: [`CellStyle`], [`StyledCell`], [`Strip`].
//!
//! Widgets paint in strips: one row of styled cells at a position. The
//! compositor crops strips against clip regions and writes them into the
//! frame's cell buffer.

use crate::css::styles::ResolvedStyle;

// ---------------------------------------------------------------------------
// CellStyle
// ---------------------------------------------------------------------------

/// Visual attributes of a single cell.
///
/// Colors are kept as strings (names or `#hex`); the driver parses them when
/// emitting terminal commands, so headless tests never touch color codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellStyle {
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub reverse: bool,
}

impl CellStyle {
    /// Derive a cell style from a node's resolved style.
    pub fn from_resolved(style: &ResolvedStyle) -> Self {
        Self {
            fg: style.color.clone(),
            bg: style.background.clone(),
            bold: style.text_style.bold,
            dim: style.text_style.dim,
            italic: style.text_style.italic,
            underline: style.text_style.underline,
            strikethrough: style.text_style.strikethrough,
            reverse: style.text_style.reverse,
        }
    }
}

// ---------------------------------------------------------------------------
// StyledCell
// ---------------------------------------------------------------------------

/// One character plus its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledCell {
    pub ch: char,
    pub style: CellStyle,
}

impl StyledCell {
    /// An unstyled space.
    pub fn blank() -> Self {
        Self {
            ch: ' ',
            style: CellStyle::default(),
        }
    }

    /// A space carrying a style (background fills).
    pub fn blank_styled(style: CellStyle) -> Self {
        Self { ch: ' ', style }
    }

    pub fn new(ch: char, style: CellStyle) -> Self {
        Self { ch, style }
    }
}

impl Default for StyledCell {
    fn default() -> Self {
        Self::blank()
    }
}

// ---------------------------------------------------------------------------
// Strip
// ---------------------------------------------------------------------------

/// A horizontal run of styled cells at row `y`, starting at column
/// `x_offset`. Screen coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Strip {
    pub y: i32,
    pub x_offset: i32,
    pub cells: Vec<StyledCell>,
}

impl Strip {
    pub fn new(y: i32, x_offset: i32) -> Self {
        Self {
            y,
            x_offset,
            cells: Vec::new(),
        }
    }

    /// Append one cell.
    pub fn push(&mut self, ch: char, style: CellStyle) {
        self.cells.push(StyledCell::new(ch, style));
    }

    /// Append every char of `text` with the same style.
    pub fn push_str(&mut self, text: &str, style: CellStyle) {
        for ch in text.chars() {
            self.cells.push(StyledCell::new(ch, style.clone()));
        }
    }

    /// Extend with styled blanks up to `width` cells total.
    pub fn fill(&mut self, width: i32, style: CellStyle) {
        while (self.cells.len() as i32) < width {
            self.cells.push(StyledCell::blank_styled(style.clone()));
        }
    }

    /// Number of cells.
    pub fn width(&self) -> i32 {
        self.cells.len() as i32
    }

    /// One past the last column.
    pub fn right(&self) -> i32 {
        self.x_offset + self.width()
    }

    /// Crop to the screen column range `[x_start, x_end)`. Returns a strip
    /// covering the overlap, which may be empty.
    pub fn crop(&self, x_start: i32, x_end: i32) -> Strip {
        let start = x_start.max(self.x_offset);
        let end = x_end.min(self.right());
        if end <= start {
            return Strip::new(self.y, x_start);
        }
        let from = (start - self.x_offset) as usize;
        let to = (end - self.x_offset) as usize;
        Strip {
            y: self.y,
            x_offset: start,
            cells: self.cells[from..to].to_vec(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::styles::{Styles, TextStyleFlags};

    fn red() -> CellStyle {
        CellStyle {
            fg: Some("red".into()),
            ..Default::default()
        }
    }

    // ── CellStyle ────────────────────────────────────────────────────

    #[test]
    fn from_resolved_copies_colors_and_flags() {
        let declared = Styles {
            color: Some("red".into()),
            background: Some("#000".into()),
            text_style: Some(TextStyleFlags {
                bold: Some(true),
                underline: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };
        let resolved = ResolvedStyle::resolve(&declared, None);
        let cell = CellStyle::from_resolved(&resolved);
        assert_eq!(cell.fg.as_deref(), Some("red"));
        assert_eq!(cell.bg.as_deref(), Some("#000"));
        assert!(cell.bold);
        assert!(cell.underline);
        assert!(!cell.italic);
    }

    // ── Strip ────────────────────────────────────────────────────────

    #[test]
    fn push_and_width() {
        let mut strip = Strip::new(0, 2);
        strip.push_str("abc", red());
        assert_eq!(strip.width(), 3);
        assert_eq!(strip.right(), 5);
        assert_eq!(strip.cells[0].ch, 'a');
    }

    #[test]
    fn fill_pads_with_styled_blanks() {
        let mut strip = Strip::new(0, 0);
        strip.push('x', CellStyle::default());
        strip.fill(4, red());
        assert_eq!(strip.width(), 4);
        assert_eq!(strip.cells[3].ch, ' ');
        assert_eq!(strip.cells[3].style, red());
    }

    #[test]
    fn fill_never_truncates() {
        let mut strip = Strip::new(0, 0);
        strip.push_str("hello", CellStyle::default());
        strip.fill(3, CellStyle::default());
        assert_eq!(strip.width(), 5);
    }

    #[test]
    fn crop_inside() {
        let mut strip = Strip::new(1, 10);
        strip.push_str("abcdef", CellStyle::default());
        let cropped = strip.crop(12, 15);
        assert_eq!(cropped.x_offset, 12);
        assert_eq!(cropped.width(), 3);
        assert_eq!(cropped.cells[0].ch, 'c');
        assert_eq!(cropped.y, 1);
    }

    #[test]
    fn crop_overhang_left_and_right() {
        let mut strip = Strip::new(0, 5);
        strip.push_str("abc", CellStyle::default());
        let cropped = strip.crop(0, 100);
        assert_eq!(cropped.x_offset, 5);
        assert_eq!(cropped.width(), 3);
    }

    #[test]
    fn crop_disjoint_is_empty() {
        let mut strip = Strip::new(0, 5);
        strip.push_str("abc", CellStyle::default());
        assert_eq!(strip.crop(20, 30).width(), 0);
        assert_eq!(strip.crop(0, 5).width(), 0);
    }
}
