//! Dimension values: [`Scalar`] (a number plus a unit) and [`ScalarBox`]
//! (one scalar per side, for margin/padding shorthands).

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// Units a dimension may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Absolute terminal cells.
    Cells,
    /// Fraction of the remaining space in the container's main axis.
    Fr,
    /// Percentage of the container's content extent.
    Percent,
    /// Percentage of the viewport width.
    Vw,
    /// Percentage of the viewport height.
    Vh,
    /// Size to content.
    Auto,
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// A dimension value: `12`, `1fr`, `50%`, `100vw`, `auto`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar {
    pub value: f32,
    pub unit: Unit,
}

impl Scalar {
    /// Zero cells.
    pub const ZERO: Self = Self {
        value: 0.0,
        unit: Unit::Cells,
    };

    #[inline]
    pub const fn cells(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Cells,
        }
    }

    #[inline]
    pub const fn fr(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Fr,
        }
    }

    #[inline]
    pub const fn percent(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    #[inline]
    pub const fn vw(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Vw,
        }
    }

    #[inline]
    pub const fn vh(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Vh,
        }
    }

    #[inline]
    pub const fn auto() -> Self {
        Self {
            value: 0.0,
            unit: Unit::Auto,
        }
    }

    #[inline]
    pub const fn is_auto(&self) -> bool {
        matches!(self.unit, Unit::Auto)
    }

    #[inline]
    pub const fn is_fraction(&self) -> bool {
        matches!(self.unit, Unit::Fr)
    }
}

impl std::fmt::Display for Scalar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.unit {
            Unit::Cells => write!(f, "{}", self.value),
            Unit::Fr => write!(f, "{}fr", self.value),
            Unit::Percent => write!(f, "{}%", self.value),
            Unit::Vw => write!(f, "{}vw", self.value),
            Unit::Vh => write!(f, "{}vh", self.value),
            Unit::Auto => write!(f, "auto"),
        }
    }
}

// ---------------------------------------------------------------------------
// ScalarBox
// ---------------------------------------------------------------------------

/// A scalar per side. Produced by the 1/2/3/4-value shorthand parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarBox {
    pub top: Scalar,
    pub right: Scalar,
    pub bottom: Scalar,
    pub left: Scalar,
}

impl ScalarBox {
    /// Zero on all sides.
    pub const ZERO: Self = Self {
        top: Scalar::ZERO,
        right: Scalar::ZERO,
        bottom: Scalar::ZERO,
        left: Scalar::ZERO,
    };

    #[inline]
    pub const fn new(top: Scalar, right: Scalar, bottom: Scalar, left: Scalar) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// The same scalar on all sides.
    #[inline]
    pub const fn all(value: Scalar) -> Self {
        Self::new(value, value, value, value)
    }

    /// `vertical` on top/bottom, `horizontal` on left/right.
    #[inline]
    pub const fn symmetric(vertical: Scalar, horizontal: Scalar) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
