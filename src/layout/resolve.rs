//! Scalar-to-cell resolution and fractional distribution.

use crate::css::scalar::{Scalar, ScalarBox, Unit};
use crate::geometry::{Size, Spacing};

/// Resolve a scalar to whole cells.
///
/// `basis` is the container extent percentages resolve against; `auto` is
/// the fallback for `auto` (and for `fr`, which only the main-axis
/// distributor handles directly).
pub fn resolve_scalar(scalar: Scalar, basis: i32, viewport: Size, auto: i32) -> i32 {
    match scalar.unit {
        Unit::Cells => scalar.value.round() as i32,
        Unit::Percent => (basis as f32 * scalar.value / 100.0).floor() as i32,
        Unit::Vw => (viewport.width as f32 * scalar.value / 100.0).floor() as i32,
        Unit::Vh => (viewport.height as f32 * scalar.value / 100.0).floor() as i32,
        Unit::Fr | Unit::Auto => auto,
    }
}

/// Resolve a per-side scalar box to cell spacing. Percentages resolve
/// against the container width on every side (the CSS convention);
/// `auto`/`fr` sides collapse to zero.
pub fn resolve_spacing(scalar_box: &ScalarBox, basis: i32, viewport: Size) -> Spacing {
    let side = |s: Scalar| resolve_scalar(s, basis, viewport, 0).max(0);
    Spacing::new(
        side(scalar_box.top),
        side(scalar_box.right),
        side(scalar_box.bottom),
        side(scalar_box.left),
    )
}

/// Clamp `value` into declared min/max bounds, each resolved when present.
pub fn clamp_scalar(
    value: i32,
    min: Option<Scalar>,
    max: Option<Scalar>,
    basis: i32,
    viewport: Size,
) -> i32 {
    let mut out = value;
    if let Some(max) = max {
        if !max.is_auto() {
            out = out.min(resolve_scalar(max, basis, viewport, out));
        }
    }
    if let Some(min) = min {
        if !min.is_auto() {
            out = out.max(resolve_scalar(min, basis, viewport, out));
        }
    }
    out
}

/// Split `remaining` cells over fractional weights.
///
/// Each weight gets the floor of its exact share; the cells the floors left
/// over are handed out one each to the first entries in order. The split is
/// fully determined by the inputs, so equal frames produce equal layouts.
pub fn distribute_fractions(remaining: i32, weights: &[f32]) -> Vec<i32> {
    let remaining = remaining.max(0);
    let total: f32 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 {
        return vec![0; weights.len()];
    }

    let mut shares: Vec<i32> = weights
        .iter()
        .map(|w| ((remaining as f32) * w.max(0.0) / total).floor() as i32)
        .collect();
    let mut leftover = remaining - shares.iter().sum::<i32>();
    for (i, share) in shares.iter_mut().enumerate() {
        if leftover == 0 {
            break;
        }
        if weights[i] > 0.0 {
            *share += 1;
            leftover -= 1;
        }
        let _ = i;
    }
    shares
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 80,
        height: 24,
    };

    // ── resolve_scalar ───────────────────────────────────────────────

    #[test]
    fn cells_pass_through() {
        assert_eq!(resolve_scalar(Scalar::cells(12.0), 100, VIEWPORT, 0), 12);
    }

    #[test]
    fn percent_of_basis() {
        assert_eq!(resolve_scalar(Scalar::percent(50.0), 30, VIEWPORT, 0), 15);
        assert_eq!(resolve_scalar(Scalar::percent(33.0), 10, VIEWPORT, 0), 3);
    }

    #[test]
    fn viewport_units() {
        assert_eq!(resolve_scalar(Scalar::vw(50.0), 0, VIEWPORT, 0), 40);
        assert_eq!(resolve_scalar(Scalar::vh(50.0), 0, VIEWPORT, 0), 12);
    }

    #[test]
    fn auto_and_fr_use_fallback() {
        assert_eq!(resolve_scalar(Scalar::auto(), 100, VIEWPORT, 7), 7);
        assert_eq!(resolve_scalar(Scalar::fr(2.0), 100, VIEWPORT, 7), 7);
    }

    // ── resolve_spacing ──────────────────────────────────────────────

    #[test]
    fn spacing_resolves_per_side() {
        let b = ScalarBox::new(
            Scalar::cells(1.0),
            Scalar::percent(10.0),
            Scalar::cells(2.0),
            Scalar::cells(3.0),
        );
        let s = resolve_spacing(&b, 50, VIEWPORT);
        assert_eq!(s, Spacing::new(1, 5, 2, 3));
    }

    #[test]
    fn spacing_auto_side_is_zero() {
        let b = ScalarBox::all(Scalar::auto());
        assert_eq!(resolve_spacing(&b, 50, VIEWPORT), Spacing::ZERO);
    }

    #[test]
    fn spacing_negative_clamped() {
        let b = ScalarBox::all(Scalar::cells(-2.0));
        assert_eq!(resolve_spacing(&b, 50, VIEWPORT), Spacing::ZERO);
    }

    // ── clamp_scalar ─────────────────────────────────────────────────

    #[test]
    fn clamp_applies_min_and_max() {
        assert_eq!(
            clamp_scalar(50, Some(Scalar::cells(10.0)), Some(Scalar::cells(30.0)), 100, VIEWPORT),
            30
        );
        assert_eq!(
            clamp_scalar(5, Some(Scalar::cells(10.0)), None, 100, VIEWPORT),
            10
        );
        assert_eq!(clamp_scalar(5, None, None, 100, VIEWPORT), 5);
    }

    #[test]
    fn clamp_min_wins_over_max() {
        // Contradictory bounds: min applies last.
        assert_eq!(
            clamp_scalar(20, Some(Scalar::cells(15.0)), Some(Scalar::cells(10.0)), 100, VIEWPORT),
            15
        );
    }

    // ── distribute_fractions ─────────────────────────────────────────

    #[test]
    fn even_split() {
        assert_eq!(distribute_fractions(10, &[1.0, 1.0]), vec![5, 5]);
    }

    #[test]
    fn leftover_goes_to_first() {
        assert_eq!(distribute_fractions(7, &[1.0, 1.0]), vec![4, 3]);
        assert_eq!(distribute_fractions(8, &[1.0, 1.0, 1.0]), vec![3, 3, 2]);
    }

    #[test]
    fn weighted_split() {
        assert_eq!(distribute_fractions(9, &[2.0, 1.0]), vec![6, 3]);
        assert_eq!(distribute_fractions(10, &[2.0, 1.0]), vec![7, 3]);
    }

    #[test]
    fn conservation() {
        for total in 0..50 {
            let shares = distribute_fractions(total, &[1.0, 2.0, 3.0]);
            assert_eq!(shares.iter().sum::<i32>(), total);
        }
    }

    #[test]
    fn zero_weights_get_nothing() {
        assert_eq!(distribute_fractions(10, &[0.0, 1.0]), vec![0, 10]);
        assert_eq!(distribute_fractions(10, &[]), Vec::<i32>::new());
        assert_eq!(distribute_fractions(10, &[0.0, 0.0]), vec![0, 0]);
    }

    #[test]
    fn negative_remaining_is_zero() {
        assert_eq!(distribute_fractions(-5, &[1.0, 1.0]), vec![0, 0]);
    }
}
