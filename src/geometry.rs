//! Geometry primitives: [`Offset`], [`Size`], [`Region`], [`Spacing`].
//!
//! All coordinates are whole terminal cells. `i32` throughout so that
//! intermediate arithmetic (scroll offsets, negative margins during
//! clamping) cannot underflow; regions clamp to zero extent rather than
//! wrap.

use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D cell offset, possibly negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// The zero offset.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise clamp into `0..=max`.
    #[inline]
    pub fn clamped(self, max: Offset) -> Self {
        Self {
            x: self.x.clamp(0, max.x.max(0)),
            y: self.y.clamp(0, max.y.max(0)),
        }
    }
}

impl Add for Offset {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Offset {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Offset {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A width/height pair in cells. Negative values are not meaningful and are
/// clamped at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// The empty size.
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width > 0 { width } else { 0 },
            height: if height > 0 { height } else { 0 },
        }
    }

    /// Total number of cells.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Whether either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// The region of this size anchored at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle of cells.
///
/// `width`/`height` are always non-negative once constructed through `new`;
/// shrinking operations clamp rather than produce negative extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// The empty region at the origin.
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width: if width > 0 { width } else { 0 },
            height: if height > 0 { height } else { 0 },
        }
    }

    /// One past the right-most column.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom-most row.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// The top-left corner.
    #[inline]
    pub const fn offset(&self) -> Offset {
        Offset {
            x: self.x,
            y: self.y,
        }
    }

    /// The extent, ignoring position.
    #[inline]
    pub const fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Whether the region covers no cells.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether the cell at `(x, y)` lies inside.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` lies entirely inside this region.
    #[inline]
    pub const fn contains_region(&self, other: &Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the two regions share at least one cell.
    #[inline]
    pub const fn overlaps(&self, other: &Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// The overlapping region, or [`Region::EMPTY`] when disjoint.
    pub fn intersection(&self, other: &Region) -> Region {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return Region::EMPTY;
        }
        Region::new(x, y, right - x, bottom - y)
    }

    /// The smallest region covering both.
    pub fn union(&self, other: &Region) -> Region {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Region::new(x, y, right - x, bottom - y)
    }

    /// Move the region by an offset, keeping its size.
    #[inline]
    pub const fn translate(&self, offset: Offset) -> Region {
        Region {
            x: self.x + offset.x,
            y: self.y + offset.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Shrink the region inward by a spacing, clamping each extent at zero.
    pub fn shrink(&self, spacing: Spacing) -> Region {
        let width = self.width - spacing.width();
        let height = self.height - spacing.height();
        Region::new(self.x + spacing.left, self.y + spacing.top, width, height)
    }

    /// Shrink inward by `n` cells on every side. Used for border boxes.
    #[inline]
    pub fn inset(&self, n: i32) -> Region {
        self.shrink(Spacing::all(n))
    }
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Per-side cell counts: margin, border, padding all resolve to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    /// No spacing on any side.
    pub const ZERO: Self = Self {
        top: 0,
        right: 0,
        bottom: 0,
        left: 0,
    };

    #[inline]
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same value on all sides.
    #[inline]
    pub const fn all(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// `vertical` on top/bottom, `horizontal` on left/right.
    #[inline]
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    /// Total horizontal spacing (left + right).
    #[inline]
    pub const fn width(&self) -> i32 {
        self.left + self.right
    }

    /// Total vertical spacing (top + bottom).
    #[inline]
    pub const fn height(&self) -> i32 {
        self.top + self.bottom
    }
}

impl Add for Spacing {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.top + rhs.top,
            self.right + rhs.right,
            self.bottom + rhs.bottom,
            self.left + rhs.left,
        )
    }
}

// ===========================================================================
// Tests
// ===========================================================================
