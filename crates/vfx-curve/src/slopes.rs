//! Slope estimation at control points.
//!
//! Two estimators are used depending on the topology:
//! - harmonic: `2·s₀·s₁ / (s₀ + s₁)`, forced to zero at extrema and flat
//!   areas (horizontal and hue curves)
//! - arc-length weighted average of the adjacent secants, with runs of equal
//!   secants merged into one weighted segment (RGB and diagonal curves)
//!
//! Both are followed by an overshoot limiter applied segment by segment.

use super::types::{ControlPoint, CurveTopology};

/// Lower bound for end slopes of arc-length weighted curves.
const MIN_END_SLOPE: f32 = 0.01;
/// Secant slopes closer than this are merged into one run.
const EQUAL_SECANT_TOL: f32 = 1e-6;
/// Signed floor for the harmonic estimator denominator.
const HARMONIC_DENOM_MIN: f32 = 1e-3;

/// Estimate one slope per prepared point.
pub fn estimate_slopes(ctrl_pts: &[ControlPoint], topology: CurveTopology) -> Vec<f32> {
    let n = ctrl_pts.len();
    if n < 2 {
        return vec![];
    }

    let (secant_slope, secant_len) = secants(ctrl_pts);

    // Only 2 points: the straight line through them.
    if n == 2 {
        return vec![secant_slope[0], secant_slope[0]];
    }

    let mut slopes = if topology.uses_horizontal_slopes() {
        harmonic_slopes(&secant_slope)
    } else {
        arc_length_slopes(&secant_slope, secant_len)
    };

    limit_overshoot(&mut slopes, &secant_slope);

    // Carry the interior slopes across the seam.
    if topology.is_periodic() {
        slopes[0] = slopes[n - 2];
        slopes[n - 1] = slopes[1];
    }

    slopes
}

/// Secant slope and chord length of each segment.
fn secants(ctrl_pts: &[ControlPoint]) -> (Vec<f32>, Vec<f32>) {
    ctrl_pts
        .windows(2)
        .map(|w| {
            let del_x = w[1].x - w[0].x;
            let del_y = w[1].y - w[0].y;
            (del_y / del_x, (del_x * del_x + del_y * del_y).sqrt())
        })
        .unzip()
}

fn harmonic_slopes(secant_slope: &[f32]) -> Vec<f32> {
    let n = secant_slope.len() + 1;
    let mut slopes = Vec::with_capacity(n);
    slopes.push(0.0);

    for i in 1..n - 1 {
        let (s0, s1) = (secant_slope[i - 1], secant_slope[i]);
        let mut denom = s0 + s1;
        if denom.abs() < HARMONIC_DENOM_MIN {
            denom = if denom < 0.0 { -HARMONIC_DENOM_MIN } else { HARMONIC_DENOM_MIN };
        }
        // Flat areas and extrema get a zero slope.
        let s = if s0 * s1 <= 0.0 { 0.0 } else { 2.0 * s1 * s0 / denom };
        slopes.push(s);
    }

    slopes.push(0.5 * (3.0 * secant_slope[n - 2] - slopes[n - 2]));
    slopes[0] = 0.5 * (3.0 * secant_slope[0] - slopes[1]);
    slopes
}

fn arc_length_slopes(secant_slope: &[f32], mut secant_len: Vec<f32>) -> Vec<f32> {
    let n = secant_slope.len() + 1;

    // Merge runs of equal secants so a straight stretch weighs as one.
    let mut i = 0;
    loop {
        let mut j = i;
        let mut dl = secant_len[i];
        while j < n - 2 && (secant_slope[j + 1] - secant_slope[j]).abs() < EQUAL_SECANT_TOL {
            dl += secant_len[j + 1];
            j += 1;
        }
        for len in &mut secant_len[i..=j] {
            *len = dl;
        }
        if j >= n - 3 {
            break;
        }
        i = j + 1;
    }

    let mut slopes = Vec::with_capacity(n);
    slopes.push(0.0);
    for k in 1..n - 1 {
        let s = (secant_len[k] * secant_slope[k] + secant_len[k - 1] * secant_slope[k - 1])
            / (secant_len[k] + secant_len[k - 1]);
        slopes.push(s);
    }

    let last = MIN_END_SLOPE.max(0.5 * (3.0 * secant_slope[n - 2] - slopes[n - 2]));
    slopes.push(last);
    slopes[0] = MIN_END_SLOPE.max(0.5 * (3.0 * secant_slope[0] - slopes[1]));
    slopes
}

/// Scale down segment end slopes that would overshoot the secant.
fn limit_overshoot(slopes: &mut [f32], secant_slope: &[f32]) {
    for (i, &secant) in secant_slope.iter().enumerate() {
        let k = if slopes[i].abs() > slopes[i + 1].abs() { 0.8 } else { 0.2 };
        let m_near = slopes[i] + k * (slopes[i + 1] - slopes[i]);
        if m_near == 0.0 {
            continue;
        }
        let scale = 0.75 * 2.0 * secant / m_near;
        if scale < 1.0 {
            slopes[i] *= scale;
            slopes[i + 1] *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f32, f32)]) -> Vec<ControlPoint> {
        v.iter().map(|&(x, y)| ControlPoint::new(x, y)).collect()
    }

    #[test]
    fn test_two_points() {
        let p = pts(&[(0.0, 0.0), (2.0, 1.0)]);
        for topo in [CurveTopology::Open, CurveTopology::Horizontal, CurveTopology::Diagonal] {
            let slopes = estimate_slopes(&p, topo);
            assert_eq!(slopes, vec![0.5, 0.5]);
        }
    }

    #[test]
    fn test_three_points_linear() {
        let p = pts(&[(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]);
        for topo in [CurveTopology::Open, CurveTopology::Horizontal] {
            let slopes = estimate_slopes(&p, topo);
            assert_eq!(slopes.len(), 3);
            for s in &slopes {
                assert!((*s - 1.0).abs() < 1e-5, "{topo:?}: expected 1.0, got {s}");
            }
        }
    }

    #[test]
    fn test_extremum_slope_is_zero() {
        // Peak in the middle.
        let p = pts(&[(0.0, 0.0), (0.5, 1.0), (1.0, 0.0)]);
        let slopes = estimate_slopes(&p, CurveTopology::Horizontal);
        assert_eq!(slopes[1], 0.0);
    }

    #[test]
    fn test_flat_area_slope_is_zero() {
        let p = pts(&[(0.0, 1.0), (0.3, 1.0), (0.6, 1.5), (1.0, 1.5)]);
        let slopes = estimate_slopes(&p, CurveTopology::Horizontal);
        assert_eq!(slopes[1], 0.0);
        assert_eq!(slopes[2], 0.0);
    }

    #[test]
    fn test_harmonic_interior() {
        // Secants 1 and 3: harmonic mean is 1.5.
        let p = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]);
        let slopes = estimate_slopes(&p, CurveTopology::Horizontal);
        assert!((slopes[1] - 1.5).abs() < 1e-6, "got {}", slopes[1]);
    }

    #[test]
    fn test_arc_length_end_floor() {
        // Steep then flat: extrapolated start slope would go negative.
        let p = pts(&[(0.0, 0.0), (0.1, 0.9), (1.0, 1.0)]);
        let slopes = estimate_slopes(&p, CurveTopology::Diagonal);
        assert!(slopes[0] > 0.0);
        assert!(slopes[2] > 0.0);
    }

    #[test]
    fn test_limiter_caps_slopes() {
        let p = pts(&[(0.0, 0.0), (0.5, 0.05), (1.0, 1.0)]);
        let slopes = estimate_slopes(&p, CurveTopology::Open);
        // Blended near-endpoint slope stays within 1.5x of each secant.
        let secant = [0.1_f32, 1.9];
        for i in 0..2 {
            let k = if slopes[i].abs() > slopes[i + 1].abs() { 0.8 } else { 0.2 };
            let m_near = slopes[i] + k * (slopes[i + 1] - slopes[i]);
            assert!(m_near <= 1.5 * secant[i] + 1e-5, "segment {i}: {m_near}");
        }
    }

    #[test]
    fn test_periodic_copies_end_slopes() {
        let p = pts(&[(-0.25, 0.8), (0.25, 1.2), (0.5, 1.0), (0.75, 0.8), (1.25, 1.2)]);
        let slopes = estimate_slopes(&p, CurveTopology::Periodic);
        assert_eq!(slopes[0], slopes[3]);
        assert_eq!(slopes[4], slopes[1]);
    }
}
