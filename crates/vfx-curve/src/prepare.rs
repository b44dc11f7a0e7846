//! Control point preparation ahead of slope estimation and fitting.
//!
//! Wraps periodic points into `[0, 1)`, sorts by x, enforces a minimum
//! spacing and adds one synthetic wrap point on each side of a periodic
//! curve so the fit sees a seamless neighbourhood across the seam.

use std::cmp::Ordering;

use super::types::{ControlPoint, Curve, CurveTopology};

/// Minimum spacing between consecutive points, as a fraction of the span.
pub const MIN_SPACING: f32 = 2e-3;

/// Points (and the tangents travelling with them) ready for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPoints {
    /// Sorted, spaced and (for periodic curves) wrapped points.
    pub points: Vec<ControlPoint>,
    /// Tangent for each point; all zero when the curve estimates its own.
    pub tangents: Vec<f32>,
}

impl PreparedPoints {
    /// Number of prepared points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Prepare a curve's control points for fitting.
pub fn prepare_points(curve: &Curve) -> PreparedPoints {
    prepare(curve.control_points(), curve.tangents(), curve.topology())
}

/// Prepare raw points and tangents for the given topology.
pub fn prepare(points: &[ControlPoint], tangents: &[f32], topology: CurveTopology) -> PreparedPoints {
    let periodic = topology.is_periodic();
    let diagonal = topology.is_diagonal();

    let mut pairs: Vec<(ControlPoint, f32)> = points
        .iter()
        .zip(tangents.iter().copied().chain(std::iter::repeat(0.0)))
        .map(|(&p, t)| (wrap_point(p, periodic, diagonal), t))
        .collect();

    // Stable: ties keep their caller order.
    pairs.sort_by(|a, b| a.0.x.partial_cmp(&b.0.x).unwrap_or(Ordering::Equal));

    let (mut points, mut tangents): (Vec<ControlPoint>, Vec<f32>) = pairs.into_iter().unzip();
    let n = points.len();
    if n < 2 {
        return PreparedPoints { points, tangents };
    }

    let x_span = points[n - 1].x - points[0].x;
    let x_gap = if x_span > 0.0 { x_span * MIN_SPACING } else { MIN_SPACING };
    for i in 1..n {
        if points[i].x - points[i - 1].x < x_gap {
            points[i].x = points[i - 1].x + x_gap;
        }
    }

    if diagonal {
        let y_gap = (points[n - 1].y - points[0].y) * MIN_SPACING;
        for i in 1..n {
            if points[i].y - points[i - 1].y < y_gap {
                points[i].y = points[i - 1].y + y_gap;
            }
        }
    }

    if periodic {
        let shift = |p: ControlPoint, d: f32| {
            ControlPoint::new(p.x + d, if diagonal { p.y + d } else { p.y })
        };
        let first = shift(points[n - 1], -1.0);
        let last = shift(points[0], 1.0);
        let first_t = tangents[n - 1];
        let last_t = tangents[0];

        points.insert(0, first);
        tangents.insert(0, first_t);
        points.push(last);
        tangents.push(last_t);
    }

    PreparedPoints { points, tangents }
}

/// Bring a periodic point's x into `[0, 1)`.
#[inline]
fn wrap_point(p: ControlPoint, periodic: bool, diagonal: bool) -> ControlPoint {
    if !periodic {
        return p;
    }
    if p.x < 0.0 {
        ControlPoint::new(p.x + 1.0, if diagonal { p.y + 1.0 } else { p.y })
    } else if p.x >= 1.0 {
        ControlPoint::new(p.x - 1.0, if diagonal { p.y - 1.0 } else { p.y })
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(v: &[(f32, f32)]) -> Vec<ControlPoint> {
        v.iter().map(|&(x, y)| ControlPoint::new(x, y)).collect()
    }

    #[test]
    fn test_open_passthrough() {
        let p = pts(&[(0.0, 0.0), (0.5, 0.3), (1.0, 1.0)]);
        let prep = prepare(&p, &[0.0; 3], CurveTopology::Open);
        assert_eq!(prep.points, p);
        assert_eq!(prep.tangents, vec![0.0; 3]);
    }

    #[test]
    fn test_min_spacing_x() {
        let p = pts(&[(0.0, 0.0), (0.5, 0.2), (0.5, 0.4), (1.0, 1.0)]);
        let prep = prepare(&p, &[0.0; 4], CurveTopology::Open);
        assert_eq!(prep.points[2].x, 0.5 + MIN_SPACING);
        assert_eq!(prep.points[2].y, 0.4);
    }

    #[test]
    fn test_zero_span_gets_absolute_gap() {
        let p = pts(&[(0.3, 0.0), (0.3, 1.0)]);
        let prep = prepare(&p, &[0.0; 2], CurveTopology::Open);
        assert!(prep.points[1].x > prep.points[0].x);
    }

    #[test]
    fn test_diagonal_spaces_y() {
        let p = pts(&[(0.0, 0.0), (0.4, 0.5), (0.6, 0.5), (1.0, 1.0)]);
        let prep = prepare(&p, &[0.0; 4], CurveTopology::Diagonal);
        assert!(prep.points[2].y > prep.points[1].y);

        let prep = prepare(&p, &[0.0; 4], CurveTopology::Horizontal);
        assert_eq!(prep.points[2].y, 0.5);
    }

    #[test]
    fn test_periodic_wrap_and_sort() {
        let p = pts(&[(-0.25, 0.8), (0.25, 1.2), (0.5, 1.0)]);
        let prep = prepare(&p, &[0.0; 3], CurveTopology::Periodic);

        // -0.25 wraps to 0.75 and sorts last; synthetic points on both sides.
        assert_eq!(prep.len(), 5);
        let xs: Vec<f32> = prep.points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![-0.25, 0.25, 0.5, 0.75, 1.25]);
        assert_eq!(prep.points[0].y, 0.8);
        assert_eq!(prep.points[3].y, 0.8);
        assert_eq!(prep.points[4].y, 1.2);
    }

    #[test]
    fn test_periodic_diagonal_shifts_y() {
        let p = pts(&[(0.2, 0.25), (0.6, 0.55), (1.1, 1.05)]);
        let prep = prepare(&p, &[0.0; 3], CurveTopology::PeriodicDiagonal);

        // 1.1 wraps to 0.1 with y 0.05.
        assert!((prep.points[1].x - 0.1).abs() < 1e-6);
        assert!((prep.points[1].y - 0.05).abs() < 1e-6);
        // Synthetic first point is the last point shifted down one period.
        assert!((prep.points[0].x - (0.6 - 1.0)).abs() < 1e-6);
        assert!((prep.points[0].y - (0.55 - 1.0)).abs() < 1e-6);
        // Synthetic last point is the first point shifted up one period.
        assert!((prep.points[4].x - 1.1).abs() < 1e-6);
        assert!((prep.points[4].y - 1.05).abs() < 1e-6);
    }

    #[test]
    fn test_tangents_follow_points() {
        let p = pts(&[(-0.25, 0.8), (0.25, 1.2), (0.5, 1.0)]);
        let prep = prepare(&p, &[3.0, 1.0, 2.0], CurveTopology::Periodic);
        assert_eq!(prep.tangents, vec![3.0, 1.0, 2.0, 3.0, 1.0]);
    }
}
