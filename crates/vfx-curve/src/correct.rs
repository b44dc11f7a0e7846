//! Monotonicity correction for RGB curves.
//!
//! After the first fit, every interior knot is checked for a negative
//! implied slope. Offending segments get both end slopes rescaled by one
//! common factor and the caller refits once. There is no second check: a
//! residual violation after the refit is accepted.

use tracing::trace;

use super::types::ControlPoint;

/// Rescale end slopes of segments whose interior knot dips below zero
/// slope. Returns true if any slope changed.
///
/// `splits[i]` is the interior knot inserted in segment `i`, if any.
/// Segments are visited in order, so a slope shared by two segments sees
/// the rescale of the first before the second is checked.
pub fn adjust_slopes(ctrl_pts: &[ControlPoint], slopes: &mut [f32], splits: &[Option<f32>]) -> bool {
    let mut adjustment_done = false;

    for (i, ksi) in splits.iter().enumerate() {
        let Some(ksi) = *ksi else { continue };

        let (p0, p1) = (ctrl_pts[i], ctrl_pts[i + 1]);
        let s_bar = implied_knot_slope(p0, p1, slopes[i], slopes[i + 1], ksi);
        if s_bar >= 0.0 {
            continue;
        }

        adjustment_done = true;
        let del_x = p1.x - p0.x;
        let secant = (p1.y - p0.y) / del_x;
        let blend_slope = ((ksi - p0.x) * slopes[i] + (p1.x - ksi) * slopes[i + 1]) / del_x;
        let aim_slope = (0.01 * 0.5 * (slopes[i] + slopes[i + 1])).min(secant);
        let adjust = (2.0 * secant - aim_slope) / blend_slope;
        trace!(segment = i, ksi, s_bar, adjust, "adjust_slopes");

        slopes[i] *= adjust;
        slopes[i + 1] *= adjust;
    }

    adjustment_done
}

/// Slope implied at an interior knot by the two-piece fit of a segment.
pub fn implied_knot_slope(p0: ControlPoint, p1: ControlPoint, m0: f32, m1: f32, ksi: f32) -> f32 {
    (2.0 * (p1.y - p0.y) - (ksi - p0.x) * m0 - (p1.x - ksi) * m1) / (p1.x - p0.x)
}
