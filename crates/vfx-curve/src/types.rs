//! Core curve types: control points, topologies and the editable curve.

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, CurveResult};

/// A single control point on a curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct ControlPoint {
    /// X coordinate (input value).
    pub x: f32,
    /// Y coordinate (output value).
    pub y: f32,
}

impl ControlPoint {
    /// Create a new control point.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for ControlPoint {
    fn from(v: [f32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<ControlPoint> for [f32; 2] {
    fn from(p: ControlPoint) -> Self {
        [p.x, p.y]
    }
}

/// Shape of the domain a curve is defined over.
///
/// Horizontal curves have a constant natural output (hue vs sat), diagonal
/// curves lie near the identity line (sat vs sat). Periodic curves wrap
/// their x axis with a period of 1.0 (hue).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveTopology {
    /// Open tone curve over an arbitrary domain (RGB curves).
    #[default]
    Open,
    /// Open curve whose natural output is constant.
    Horizontal,
    /// Hue-axis curve with constant natural output.
    Periodic,
    /// Open curve near the identity line.
    Diagonal,
    /// Hue-axis curve near the identity line (hue vs hue).
    PeriodicDiagonal,
}

impl CurveTopology {
    /// True if x wraps with a period of 1.0.
    #[inline]
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Periodic | Self::PeriodicDiagonal)
    }

    /// True if points are prepared as a diagonal curve (y is wrapped and
    /// spaced along with x).
    #[inline]
    pub fn is_diagonal(self) -> bool {
        matches!(self, Self::Diagonal | Self::PeriodicDiagonal)
    }

    /// True if slopes use the harmonic estimator rather than the
    /// arc-length weighted one. Hue vs hue counts as horizontal here.
    #[inline]
    pub fn uses_horizontal_slopes(self) -> bool {
        matches!(self, Self::Horizontal | Self::Periodic | Self::PeriodicDiagonal)
    }

    /// True if interior knots are placed with the banded hue rule.
    #[inline]
    pub fn uses_hue_split(self) -> bool {
        self != Self::Open
    }

    /// True if the monotonicity corrector runs after the first fit.
    #[inline]
    pub fn corrects_monotonicity(self) -> bool {
        self == Self::Open
    }

    /// Tolerance below which a segment is fitted with a single quadratic.
    #[inline]
    pub fn fit_tolerance(self) -> f32 {
        if self.uses_hue_split() { 1e-5 } else { 1e-6 }
    }
}

/// An editable curve: control points, optional tangents and a topology.
///
/// A tangent of `0.0` everywhere means "estimate from the points". Equality
/// is exact on points, tangents and topology.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<ControlPoint>,
    tangents: Vec<f32>,
    topology: CurveTopology,
}

impl Curve {
    /// Create a curve with default (auto-estimated) tangents.
    pub fn new(points: Vec<ControlPoint>, topology: CurveTopology) -> CurveResult<Self> {
        let n = points.len();
        Self::with_tangents(points, vec![0.0; n], topology)
    }

    /// Create a curve with explicit tangents, one per point.
    pub fn with_tangents(
        points: Vec<ControlPoint>,
        tangents: Vec<f32>,
        topology: CurveTopology,
    ) -> CurveResult<Self> {
        let curve = Self { points, tangents, topology };
        curve.validate()?;
        Ok(curve)
    }

    /// Create an identity curve (y = x) over [0, 1].
    pub fn identity(topology: CurveTopology) -> Self {
        Self {
            points: vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(1.0, 1.0)],
            tangents: vec![0.0; 2],
            topology,
        }
    }

    /// Curve topology.
    #[inline]
    pub fn topology(&self) -> CurveTopology {
        self.topology
    }

    /// Number of control points.
    #[inline]
    pub fn num_control_points(&self) -> usize {
        self.points.len()
    }

    /// All control points.
    #[inline]
    pub fn control_points(&self) -> &[ControlPoint] {
        &self.points
    }

    /// All tangents (zero means auto-estimate).
    #[inline]
    pub fn tangents(&self) -> &[f32] {
        &self.tangents
    }

    fn check_index(&self, index: usize) -> CurveResult<()> {
        if index >= self.points.len() {
            return Err(CurveError::Index { index, count: self.points.len() });
        }
        Ok(())
    }

    /// Get a control point.
    pub fn control_point(&self, index: usize) -> CurveResult<ControlPoint> {
        self.check_index(index)?;
        Ok(self.points[index])
    }

    /// Replace a control point.
    ///
    /// The curve is left untouched if the new point is not finite or would
    /// make x decrease.
    pub fn set_control_point(&mut self, index: usize, point: ControlPoint) -> CurveResult<()> {
        self.check_index(index)?;
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(CurveError::validation(format!(
                "control point {index} is not finite: ({}, {})",
                point.x, point.y
            )));
        }
        if index > 0 && point.x < self.points[index - 1].x {
            return Err(CurveError::validation(format!(
                "control point {index} x '{}' is less than previous x '{}'",
                point.x,
                self.points[index - 1].x
            )));
        }
        if index + 1 < self.points.len() && point.x > self.points[index + 1].x {
            return Err(CurveError::validation(format!(
                "control point {index} x '{}' is greater than next x '{}'",
                point.x,
                self.points[index + 1].x
            )));
        }
        self.points[index] = point;
        Ok(())
    }

    /// Get the tangent at a control point.
    pub fn tangent(&self, index: usize) -> CurveResult<f32> {
        self.check_index(index)?;
        Ok(self.tangents[index])
    }

    /// Set the tangent at a control point.
    pub fn set_tangent(&mut self, index: usize, value: f32) -> CurveResult<()> {
        self.check_index(index)?;
        if !value.is_finite() {
            return Err(CurveError::validation(format!("tangent {index} is not finite: {value}")));
        }
        self.tangents[index] = value;
        Ok(())
    }

    /// Resize the curve. New points repeat the last point.
    pub fn set_num_control_points(&mut self, n: usize) -> CurveResult<()> {
        if n < 2 {
            return Err(CurveError::validation("there must be at least 2 control points"));
        }
        let last = self.points.last().copied().unwrap_or_default();
        self.points.resize(n, last);
        self.tangents.resize(n, 0.0);
        Ok(())
    }

    /// Check if all tangents are default (zero).
    pub fn tangents_are_default(&self) -> bool {
        self.tangents.iter().all(|&s| s == 0.0)
    }

    /// Check if the curve is identity: every point on y = x and no
    /// user tangents.
    pub fn is_identity(&self) -> bool {
        self.points.iter().all(|p| p.x == p.y) && self.tangents_are_default()
    }

    /// Validate the curve constraints.
    pub fn validate(&self) -> CurveResult<()> {
        if self.points.len() < 2 {
            return Err(CurveError::validation("there must be at least 2 control points"));
        }
        if self.points.len() != self.tangents.len() {
            return Err(CurveError::validation(format!(
                "tangents array length {} does not match {} control points",
                self.tangents.len(),
                self.points.len()
            )));
        }

        let mut last_x = f32::MIN;
        for (i, p) in self.points.iter().enumerate() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(CurveError::validation(format!(
                    "control point {i} is not finite: ({}, {})",
                    p.x, p.y
                )));
            }
            if p.x < last_x {
                return Err(CurveError::validation(format!(
                    "control point {i} x '{}' is less than previous x '{last_x}'",
                    p.x
                )));
            }
            last_x = p.x;
        }
        if let Some(i) = self.tangents.iter().position(|t| !t.is_finite()) {
            return Err(CurveError::validation(format!(
                "tangent {i} is not finite: {}",
                self.tangents[i]
            )));
        }
        Ok(())
    }
}
