//! Quadratic spline fitting.
//!
//! Each segment between prepared points becomes one quadratic, or two
//! quadratics meeting at an interior knot `ksi` when one piece cannot
//! honour both end slopes. Pieces are stored as
//! `y = A·t² + B·t + C` with `t = x − knot`.

use tracing::{debug, trace};

use super::correct::adjust_slopes;
use super::prepare::{prepare_points, PreparedPoints};
use super::slopes::estimate_slopes;
use super::types::{Curve, CurveTopology};

/// Fitted knots and per-piece polynomial coefficients of one curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FittedCurve {
    /// X-coordinates of piece boundaries.
    pub knots: Vec<f32>,
    /// Quadratic coefficient A for each piece.
    pub coefs_a: Vec<f32>,
    /// Linear coefficient B for each piece.
    pub coefs_b: Vec<f32>,
    /// Constant coefficient C for each piece.
    pub coefs_c: Vec<f32>,
    /// True if the monotonicity corrector rescaled slopes and the
    /// curve was fitted a second time.
    pub corrected: bool,
}

impl FittedCurve {
    /// Number of polynomial pieces.
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.coefs_a.len()
    }

    /// True for an identity curve (nothing fitted).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Number of coefficient slots the curve needs in a table.
    #[inline]
    pub fn num_coefs(&self) -> usize {
        self.coefs_a.len() * 3
    }
}

/// Result of one fitting pass.
#[derive(Debug, Clone)]
pub(crate) struct SplinePass {
    pub fitted: FittedCurve,
    /// Interior knot inserted in each input segment, if any.
    pub splits: Vec<Option<f32>>,
}

/// Fit a curve. Identity curves produce an empty fit.
pub fn fit_curve(curve: &Curve) -> FittedCurve {
    let topology = curve.topology();
    trace!(points = curve.num_control_points(), ?topology, "fit_curve");

    if curve.is_identity() {
        return FittedCurve::default();
    }

    let prepared = prepare_points(curve);
    let slopes = if curve.tangents_are_default() {
        estimate_slopes(&prepared.points, topology)
    } else {
        prepared.tangents.clone()
    };

    fit_prepared(&prepared, slopes, topology)
}

/// Fit prepared points with the given slopes, running the monotonicity
/// corrector where the topology asks for it.
pub fn fit_prepared(
    prepared: &PreparedPoints,
    mut slopes: Vec<f32>,
    topology: CurveTopology,
) -> FittedCurve {
    let pass = fit_spline(prepared, &slopes, topology);
    if !topology.corrects_monotonicity() {
        return pass.fitted;
    }

    if !adjust_slopes(&prepared.points, &mut slopes, &pass.splits) {
        return pass.fitted;
    }

    debug!(segments = pass.splits.len(), "Slopes corrected, refitting");
    let mut fitted = fit_spline(prepared, &slopes, topology).fitted;
    fitted.corrected = true;
    fitted
}

/// Single fitting pass over all segments.
pub(crate) fn fit_spline(
    prepared: &PreparedPoints,
    slopes: &[f32],
    topology: CurveTopology,
) -> SplinePass {
    let pts = &prepared.points;
    let n = pts.len();
    let tol = topology.fit_tolerance();

    let mut fitted = FittedCurve {
        knots: Vec::with_capacity(n * 2),
        coefs_a: Vec::with_capacity(n * 2),
        coefs_b: Vec::with_capacity(n * 2),
        coefs_c: Vec::with_capacity(n * 2),
        corrected: false,
    };
    let mut splits = Vec::with_capacity(n.saturating_sub(1));

    if n < 2 {
        return SplinePass { fitted, splits };
    }

    fitted.knots.push(pts[0].x);

    for i in 0..n - 1 {
        let xi = pts[i].x;
        let xi_pl1 = pts[i + 1].x;
        let yi = pts[i].y;
        let del_x = xi_pl1 - xi;
        let secant_slope = (pts[i + 1].y - yi) / del_x;
        let (m0, m1) = (slopes[i], slopes[i + 1]);

        let mismatch = ((m0 + m1) - 2.0 * secant_slope).abs();
        let single = if topology.uses_hue_split() { mismatch <= tol } else { mismatch < tol };

        if single {
            fitted.coefs_c.push(yi);
            fitted.coefs_b.push(m0);
            fitted.coefs_a.push(0.5 * (m1 - m0) / del_x);
            splits.push(None);
        } else {
            let ksi = if topology.uses_hue_split() {
                hue_ksi(prepared, slopes, i)
            } else {
                standard_ksi(prepared, slopes, i)
            };

            let s_bar = (2.0 * secant_slope - m1) + (m1 - m0) * (ksi - xi) / del_x;
            let eta = (s_bar - m0) / (ksi - xi);

            fitted.coefs_c.push(yi);
            fitted.coefs_b.push(m0);
            fitted.coefs_a.push(0.5 * eta);

            let t = ksi - xi;
            fitted.coefs_c.push(yi + m0 * t + 0.5 * eta * t * t);
            fitted.coefs_b.push(s_bar);
            fitted.coefs_a.push(0.5 * (m1 - s_bar) / (xi_pl1 - ksi));

            fitted.knots.push(ksi);
            splits.push(Some(ksi));
        }

        fitted.knots.push(xi_pl1);
    }

    SplinePass { fitted, splits }
}

/// Split point for RGB curves: midpoint, or biased toward the end whose
/// slope deviates more from the secant.
fn standard_ksi(prepared: &PreparedPoints, slopes: &[f32], i: usize) -> f32 {
    let pts = &prepared.points;
    let xi = pts[i].x;
    let xi_pl1 = pts[i + 1].x;
    let del_x = xi_pl1 - xi;
    let secant = (pts[i + 1].y - pts[i].y) / del_x;

    let aa = slopes[i] - secant;
    let bb = slopes[i + 1] - secant;

    if aa * bb >= 0.0 {
        (xi + xi_pl1) * 0.5
    } else if aa.abs() > bb.abs() {
        xi_pl1 + aa * del_x / (slopes[i + 1] - slopes[i])
    } else {
        xi + bb * del_x / (slopes[i + 1] - slopes[i])
    }
}

/// Split point for hue, horizontal and diagonal curves.
///
/// Kept inside `[x0 + 0.2·dx, x1 − 0.2·dx]`, on the side of the steeper
/// slope, pulled toward the midpoint when the slopes are close and fully
/// at the midpoint once the secant exceeds 4× the larger slope.
fn hue_ksi(prepared: &PreparedPoints, slopes: &[f32], i: usize) -> f32 {
    const K: f32 = 0.2;

    let p0 = prepared.points[i];
    let p1 = prepared.points[i + 1];
    let dx = p1.x - p0.x;

    // Mirror decreasing segments so the secant is non-negative.
    let mut secant = (p1.y - p0.y) / dx;
    let (mut m0, mut m1) = (slopes[i], slopes[i + 1]);
    if secant < 0.0 {
        m0 = -m0;
        m1 = -m1;
        secant = -secant;
    }

    let x_mid = p0.x + 0.5 * dx;
    let left_bnd = p0.x + dx * K;
    let right_bnd = p1.x - dx * K;

    let (m_min, m_max, top_bnd, bottom_bnd) = if m0 > m1 {
        (m1, m0, right_bnd, left_bnd)
    } else {
        (m0, m1, left_bnd, right_bnd)
    };

    let dm = m_max - m_min;
    let b = 1.0 - 0.5 * K;
    let b_high = m_min + b * dm;
    let b_low = m_min + (1.0 - b) * dm;
    let bbb = m_max * 4.0;
    let bb = m_max * 1.1;

    let m_rel_diff = dm / m_max.max(0.01);
    let alpha = ((m_rel_diff - 0.05) / (0.75 - 0.05)).clamp(0.0, 1.0);
    let top_bnd = x_mid + alpha * (top_bnd - x_mid);
    let bottom_bnd = x_mid + alpha * (bottom_bnd - x_mid);

    if secant >= bbb {
        x_mid
    } else if secant > bb {
        let blend = (secant - bb) / (bbb - bb);
        top_bnd + blend * (x_mid - top_bnd)
    } else if secant >= b_high {
        top_bnd
    } else if secant > b_low && b_high != b_low {
        let blend = (secant - b_low) / (b_high - b_low);
        bottom_bnd + blend * (top_bnd - bottom_bnd)
    } else {
        bottom_bnd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prepare::prepare;
    use crate::types::ControlPoint;

    fn pts(v: &[(f32, f32)]) -> Vec<ControlPoint> {
        v.iter().map(|&(x, y)| ControlPoint::new(x, y)).collect()
    }

    /// Evaluate piece `seg` at `x`.
    fn piece(fit: &FittedCurve, seg: usize, x: f32) -> f32 {
        let t = x - fit.knots[seg];
        (fit.coefs_a[seg] * t + fit.coefs_b[seg]) * t + fit.coefs_c[seg]
    }

    #[test]
    fn test_identity_is_empty() {
        let fit = fit_curve(&Curve::identity(CurveTopology::Open));
        assert!(fit.is_empty());
        assert_eq!(fit.num_coefs(), 0);
    }

    #[test]
    fn test_two_point_line_single_piece() {
        let curve = Curve::new(pts(&[(0.0, 0.2), (1.0, 0.8)]), CurveTopology::Open).unwrap();
        let fit = fit_curve(&curve);
        assert_eq!(fit.knots, vec![0.0, 1.0]);
        assert_eq!(fit.num_segments(), 1);
        assert_eq!(fit.coefs_a[0], 0.0);
        assert!((fit.coefs_b[0] - 0.6).abs() < 1e-6);
        assert_eq!(fit.coefs_c[0], 0.2);
    }

    #[test]
    fn test_split_inserts_knot() {
        let curve = Curve::new(pts(&[(0.0, 0.0), (0.5, 0.3), (1.0, 1.0)]), CurveTopology::Open).unwrap();
        let fit = fit_curve(&curve);
        assert!(fit.knots.len() > 3, "expected interior knots: {:?}", fit.knots);
        assert_eq!(fit.knots.len(), fit.num_segments() + 1);
        for w in fit.knots.windows(2) {
            assert!(w[0] < w[1], "knots not increasing: {:?}", fit.knots);
        }
    }

    #[test]
    fn test_pieces_are_continuous() {
        let curve = Curve::new(
            pts(&[(0.0, 0.0), (0.2, 0.35), (0.6, 0.5), (1.0, 1.0)]),
            CurveTopology::Open,
        )
        .unwrap();
        let fit = fit_curve(&curve);
        for seg in 1..fit.num_segments() {
            let kn = fit.knots[seg];
            let left = piece(&fit, seg - 1, kn);
            let right = fit.coefs_c[seg];
            assert!((left - right).abs() < 1e-5, "value jump at {kn}: {left} vs {right}");

            let t = kn - fit.knots[seg - 1];
            let left_slope = 2.0 * fit.coefs_a[seg - 1] * t + fit.coefs_b[seg - 1];
            assert!(
                (left_slope - fit.coefs_b[seg]).abs() < 1e-4,
                "slope jump at {kn}: {left_slope} vs {}",
                fit.coefs_b[seg]
            );
        }
    }

    #[test]
    fn test_passes_through_points() {
        let p = pts(&[(0.0, 0.1), (0.3, 0.2), (0.7, 0.9), (1.0, 1.0)]);
        let curve = Curve::new(p.clone(), CurveTopology::Open).unwrap();
        let fit = fit_curve(&curve);
        for cp in &p[..p.len() - 1] {
            let seg = fit.knots.iter().position(|&k| k == cp.x).unwrap();
            assert!((fit.coefs_c[seg] - cp.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_standard_ksi_midpoint() {
        // Both slopes above the secant: midpoint split.
        let prepared = prepare(&pts(&[(0.0, 0.0), (1.0, 1.0)]), &[2.0, 2.0], CurveTopology::Open);
        assert_eq!(standard_ksi(&prepared, &[2.0, 2.0], 0), 0.5);
    }

    #[test]
    fn test_standard_ksi_biased() {
        let prepared = prepare(&pts(&[(0.0, 0.0), (1.0, 1.0)]), &[0.0; 2], CurveTopology::Open);
        // aa = -0.8, bb = 0.2: bias toward x0.
        let ksi = standard_ksi(&prepared, &[0.2, 1.2], 0);
        assert!((ksi - 0.2).abs() < 1e-6, "got {ksi}");
    }

    #[test]
    fn test_hue_ksi_in_band() {
        let prepared = prepare(&pts(&[(0.0, 0.0), (1.0, 1.0)]), &[0.0; 2], CurveTopology::Diagonal);
        for (m0, m1) in [(0.1, 3.0), (3.0, 0.1), (0.5, 0.6), (0.0, 0.0), (-1.0, 2.0)] {
            let ksi = hue_ksi(&prepared, &[m0, m1], 0);
            assert!((0.2..=0.8).contains(&ksi), "({m0}, {m1}) -> {ksi}");
        }
    }

    #[test]
    fn test_hue_ksi_steep_secant_is_midpoint() {
        let prepared = prepare(&pts(&[(0.0, 0.0), (1.0, 10.0)]), &[0.0; 2], CurveTopology::Diagonal);
        assert_eq!(hue_ksi(&prepared, &[0.5, 1.0], 0), 0.5);
    }

    #[test]
    fn test_user_tangents_used() {
        let curve = Curve::with_tangents(
            pts(&[(0.0, 0.0), (1.0, 1.0)]),
            vec![1.0, 1.0],
            CurveTopology::Open,
        )
        .unwrap();
        let fit = fit_curve(&curve);
        assert_eq!(fit.num_segments(), 1);
        assert_eq!(fit.coefs_b[0], 1.0);
        assert!(!fit.corrected);
    }

    #[test]
    fn test_periodic_knots_cover_unit_interval() {
        let curve = Curve::new(
            pts(&[(0.1, 1.0), (0.4, 1.5), (0.8, 0.7)]),
            CurveTopology::Periodic,
        )
        .unwrap();
        let fit = fit_curve(&curve);
        assert!(fit.knots[0] < 0.0);
        assert!(*fit.knots.last().unwrap() > 1.0);
    }
}
