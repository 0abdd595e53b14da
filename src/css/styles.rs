//! Style values: the declared [`Styles`] bag (everything optional, merged
//! during the cascade) and the [`ResolvedStyle`] snapshot (every property
//! concrete, produced once per node per resolution pass).

use crate::css::scalar::{Scalar, ScalarBox};

// ---------------------------------------------------------------------------
// Property enums
// ---------------------------------------------------------------------------

/// Horizontal text alignment. Inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Whether the node participates in layout at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Block,
    /// Removed from layout and paint entirely.
    None,
}

/// Whether the node paints. Hidden nodes still occupy layout space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// Overflow handling per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Children paint into the parent's clip as-is.
    #[default]
    Visible,
    /// Clip, no scrolling.
    Hidden,
    /// Clip and scroll.
    Scroll,
    /// Clip; scroll only when content exceeds the viewport.
    Auto,
}

impl Overflow {
    /// Whether this axis is a scroll axis.
    pub const fn scrolls(&self) -> bool {
        matches!(self, Self::Scroll | Self::Auto)
    }
}

/// Child arrangement strategy for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    Vertical,
    Horizontal,
    Grid,
}

/// Edge a docked child claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dock {
    Top,
    Right,
    Bottom,
    Left,
}

/// Positioning scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// In flow.
    #[default]
    Static,
    /// In flow, and an anchor for absolute descendants.
    Relative,
    /// Out of flow; placed by `offset-x`/`offset-y` against the nearest
    /// relative ancestor.
    Absolute,
}

/// Border character set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderKind {
    #[default]
    None,
    Thin,
    Heavy,
    Double,
    Round,
    Ascii,
}

/// A border: kind plus optional color (defaults to the foreground).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Border {
    pub kind: BorderKind,
    pub color: Option<String>,
}

impl Border {
    /// Cells the border consumes on each side.
    pub const fn thickness(&self) -> i32 {
        match self.kind {
            BorderKind::None => 0,
            _ => 1,
        }
    }
}

/// Declared text attribute flags. `None` means "not declared here" so the
/// cascade can merge partial declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyleFlags {
    pub bold: Option<bool>,
    pub dim: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strikethrough: Option<bool>,
    pub reverse: Option<bool>,
}

/// Concrete text attributes after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub reverse: bool,
}

impl TextStyle {
    /// Overlay declared flags on top of this style.
    fn overlay(mut self, flags: &TextStyleFlags) -> Self {
        if let Some(v) = flags.bold {
            self.bold = v;
        }
        if let Some(v) = flags.dim {
            self.dim = v;
        }
        if let Some(v) = flags.italic {
            self.italic = v;
        }
        if let Some(v) = flags.underline {
            self.underline = v;
        }
        if let Some(v) = flags.strikethrough {
            self.strikethrough = v;
        }
        if let Some(v) = flags.reverse {
            self.reverse = v;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Styles (declared)
// ---------------------------------------------------------------------------

/// The declared style bag for one rule (or one node after cascading).
///
/// Every field is optional: `None` means "not declared", letting
/// [`Styles::merge`] layer rule upon rule in priority order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Styles {
    pub display: Option<Display>,
    pub visibility: Option<Visibility>,
    pub layout: Option<LayoutDirection>,
    pub dock: Option<Dock>,
    pub position: Option<Position>,
    pub overflow_x: Option<Overflow>,
    pub overflow_y: Option<Overflow>,

    pub width: Option<Scalar>,
    pub height: Option<Scalar>,
    pub min_width: Option<Scalar>,
    pub min_height: Option<Scalar>,
    pub max_width: Option<Scalar>,
    pub max_height: Option<Scalar>,

    pub margin: Option<ScalarBox>,
    pub padding: Option<ScalarBox>,

    pub offset_x: Option<Scalar>,
    pub offset_y: Option<Scalar>,

    pub grid_rows: Option<Vec<Scalar>>,
    pub grid_columns: Option<Vec<Scalar>>,
    pub row_span: Option<u32>,
    pub column_span: Option<u32>,

    pub color: Option<String>,
    pub background: Option<String>,

    pub text_align: Option<TextAlign>,
    pub text_style: Option<TextStyleFlags>,

    pub border: Option<Border>,
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `other` on top of `self`: any property `other` declares wins.
    pub fn merge(&mut self, other: &Styles) {
        fn merge_opt<T: Clone>(dst: &mut Option<T>, src: &Option<T>) {
            if src.is_some() {
                *dst = src.clone();
            }
        }

        merge_opt(&mut self.display, &other.display);
        merge_opt(&mut self.visibility, &other.visibility);
        merge_opt(&mut self.layout, &other.layout);
        merge_opt(&mut self.dock, &other.dock);
        merge_opt(&mut self.position, &other.position);
        merge_opt(&mut self.overflow_x, &other.overflow_x);
        merge_opt(&mut self.overflow_y, &other.overflow_y);
        merge_opt(&mut self.width, &other.width);
        merge_opt(&mut self.height, &other.height);
        merge_opt(&mut self.min_width, &other.min_width);
        merge_opt(&mut self.min_height, &other.min_height);
        merge_opt(&mut self.max_width, &other.max_width);
        merge_opt(&mut self.max_height, &other.max_height);
        merge_opt(&mut self.margin, &other.margin);
        merge_opt(&mut self.padding, &other.padding);
        merge_opt(&mut self.offset_x, &other.offset_x);
        merge_opt(&mut self.offset_y, &other.offset_y);
        merge_opt(&mut self.grid_rows, &other.grid_rows);
        merge_opt(&mut self.grid_columns, &other.grid_columns);
        merge_opt(&mut self.row_span, &other.row_span);
        merge_opt(&mut self.column_span, &other.column_span);
        merge_opt(&mut self.color, &other.color);
        merge_opt(&mut self.background, &other.background);
        merge_opt(&mut self.text_align, &other.text_align);
        merge_opt(&mut self.text_style, &other.text_style);
        merge_opt(&mut self.border, &other.border);
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self == &Styles::default()
    }
}

// ---------------------------------------------------------------------------
// ResolvedStyle
// ---------------------------------------------------------------------------

/// A node's fully-resolved style: cascade output plus inheritance plus
/// defaults. Immutable once produced; re-resolution replaces the whole
/// snapshot rather than mutating it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub display: Display,
    pub visibility: Visibility,
    pub layout: LayoutDirection,
    pub dock: Option<Dock>,
    pub position: Position,
    pub overflow_x: Overflow,
    pub overflow_y: Overflow,

    pub width: Scalar,
    pub height: Scalar,
    pub min_width: Option<Scalar>,
    pub min_height: Option<Scalar>,
    pub max_width: Option<Scalar>,
    pub max_height: Option<Scalar>,

    pub margin: ScalarBox,
    pub padding: ScalarBox,

    pub offset_x: Scalar,
    pub offset_y: Scalar,

    pub grid_rows: Vec<Scalar>,
    pub grid_columns: Vec<Scalar>,
    pub row_span: u32,
    pub column_span: u32,

    /// Foreground color. Inherited.
    pub color: Option<String>,
    pub background: Option<String>,

    /// Inherited.
    pub text_align: TextAlign,
    /// Inherited.
    pub text_style: TextStyle,

    pub border: Border,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            visibility: Visibility::Visible,
            layout: LayoutDirection::Vertical,
            dock: None,
            position: Position::Static,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            width: Scalar::auto(),
            height: Scalar::auto(),
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
            margin: ScalarBox::ZERO,
            padding: ScalarBox::ZERO,
            offset_x: Scalar::ZERO,
            offset_y: Scalar::ZERO,
            grid_rows: Vec::new(),
            grid_columns: Vec::new(),
            row_span: 1,
            column_span: 1,
            color: None,
            background: None,
            text_align: TextAlign::Left,
            text_style: TextStyle::default(),
            border: Border::default(),
        }
    }
}

impl ResolvedStyle {
    /// Resolve cascaded declarations against the parent's resolved style.
    ///
    /// `color`, `text-align`, and `text-style` inherit when not declared;
    /// every other property falls back to its fixed default. Given the same
    /// inputs this is a pure function, which is what lets the screen memoize
    /// per-node snapshots and only re-resolve style-dirty nodes.
    pub fn resolve(declared: &Styles, parent: Option<&ResolvedStyle>) -> ResolvedStyle {
        let mut out = ResolvedStyle::default();

        if let Some(parent) = parent {
            out.color = parent.color.clone();
            out.text_align = parent.text_align;
            out.text_style = parent.text_style;
        }

        if let Some(v) = declared.display {
            out.display = v;
        }
        if let Some(v) = declared.visibility {
            out.visibility = v;
        }
        if let Some(v) = declared.layout {
            out.layout = v;
        }
        out.dock = declared.dock;
        if let Some(v) = declared.position {
            out.position = v;
        }
        if let Some(v) = declared.overflow_x {
            out.overflow_x = v;
        }
        if let Some(v) = declared.overflow_y {
            out.overflow_y = v;
        }
        if let Some(v) = declared.width {
            out.width = v;
        }
        if let Some(v) = declared.height {
            out.height = v;
        }
        out.min_width = declared.min_width;
        out.min_height = declared.min_height;
        out.max_width = declared.max_width;
        out.max_height = declared.max_height;
        if let Some(v) = declared.margin {
            out.margin = v;
        }
        if let Some(v) = declared.padding {
            out.padding = v;
        }
        if let Some(v) = declared.offset_x {
            out.offset_x = v;
        }
        if let Some(v) = declared.offset_y {
            out.offset_y = v;
        }
        if let Some(v) = &declared.grid_rows {
            out.grid_rows = v.clone();
        }
        if let Some(v) = &declared.grid_columns {
            out.grid_columns = v.clone();
        }
        if let Some(v) = declared.row_span {
            out.row_span = v;
        }
        if let Some(v) = declared.column_span {
            out.column_span = v;
        }
        if let Some(v) = &declared.color {
            out.color = Some(v.clone());
        }
        if let Some(v) = &declared.background {
            out.background = Some(v.clone());
        }
        if let Some(v) = declared.text_align {
            out.text_align = v;
        }
        if let Some(flags) = &declared.text_style {
            out.text_style = out.text_style.overlay(flags);
        }
        if let Some(v) = &declared.border {
            out.border = v.clone();
        }

        out
    }

    /// Whether this node clips and scrolls on some axis.
    pub fn is_scroll_container(&self) -> bool {
        self.overflow_x.scrolls() || self.overflow_y.scrolls()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
