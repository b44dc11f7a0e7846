//! Packed knot and coefficient storage shared by several curves.
//!
//! Curves are fitted once and appended to two fixed-size arenas. Each curve
//! owns an `(offset, count)` range in the knot arena and in the coefficient
//! arena; its coefficient range holds the A, B and C blocks back to back.
//! A built table is immutable and can be read from any number of threads
//! or uploaded as-is to a device.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CurveError, CurveResult};
use crate::eval::{self, EvalDirection};
use crate::spline::{fit_curve, FittedCurve};
use crate::types::{Curve, CurveTopology};

/// Default knot arena size.
pub const MAX_NUM_KNOTS: usize = 120;
/// Default coefficient arena size.
pub const MAX_NUM_COEFS: usize = 360;

/// Arena sizes of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLimits {
    /// Knot arena size.
    pub max_knots: usize,
    /// Coefficient arena size.
    pub max_coefs: usize,
}

impl Default for TableLimits {
    fn default() -> Self {
        Self { max_knots: MAX_NUM_KNOTS, max_coefs: MAX_NUM_COEFS }
    }
}

/// Location of one curve inside the arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveSlot {
    /// First knot of the curve.
    pub knots_offset: usize,
    /// Number of knots.
    pub knots_count: usize,
    /// First coefficient of the curve.
    pub coefs_offset: usize,
    /// Number of coefficients, always a multiple of 3.
    pub coefs_count: usize,
    /// Topology the curve was fitted with.
    pub topology: CurveTopology,
}

impl CurveSlot {
    /// True if nothing was fitted (identity curve).
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.coefs_count == 0
    }

    /// Number of polynomial pieces.
    #[inline]
    pub fn num_segments(&self) -> usize {
        self.coefs_count / 3
    }
}

/// Fixed-capacity knot/coefficient table for a set of curves.
#[derive(Debug, Clone)]
pub struct CurveTable {
    knots: Vec<f32>,
    coefs: Vec<f32>,
    num_knots: usize,
    num_coefs: usize,
    slots: Vec<CurveSlot>,
    limits: TableLimits,
}

impl CurveTable {
    /// Fit and pack curves with the default limits.
    pub fn build(curves: &[Curve]) -> CurveResult<Self> {
        Self::build_with_limits(curves, TableLimits::default())
    }

    /// Fit and pack curves. Either every curve is registered or the
    /// error is returned and no table exists.
    pub fn build_with_limits(curves: &[Curve], limits: TableLimits) -> CurveResult<Self> {
        let mut builder = CurveTableBuilder::new(limits);
        for curve in curves {
            builder.push(curve)?;
        }
        Ok(builder.build())
    }

    /// Arena sizes.
    #[inline]
    pub fn limits(&self) -> TableLimits {
        self.limits
    }

    /// Number of registered curves.
    #[inline]
    pub fn num_curves(&self) -> usize {
        self.slots.len()
    }

    /// Number of knots in use.
    #[inline]
    pub fn num_knots(&self) -> usize {
        self.num_knots
    }

    /// Number of coefficients in use.
    #[inline]
    pub fn num_coefs(&self) -> usize {
        self.num_coefs
    }

    /// Location of a registered curve.
    #[inline]
    pub fn slot(&self, curve: usize) -> Option<&CurveSlot> {
        self.slots.get(curve)
    }

    /// All slots, in registration order.
    #[inline]
    pub fn slots(&self) -> &[CurveSlot] {
        &self.slots
    }

    /// Knots in use.
    #[inline]
    pub fn knots(&self) -> &[f32] {
        &self.knots[..self.num_knots]
    }

    /// Coefficients in use.
    #[inline]
    pub fn coefs(&self) -> &[f32] {
        &self.coefs[..self.num_coefs]
    }

    /// Whole knot arena, zero padded to `max_knots`.
    #[inline]
    pub fn knots_arena(&self) -> &[f32] {
        &self.knots
    }

    /// Whole coefficient arena, zero padded to `max_coefs`.
    #[inline]
    pub fn coefs_arena(&self) -> &[f32] {
        &self.coefs
    }

    /// Knot `(offset, count)` pairs for device upload. Identity curves
    /// publish `(-1, 0)`.
    pub fn knots_offsets(&self) -> Vec<i32> {
        self.offsets(|s| (s.knots_offset, s.knots_count))
    }

    /// Coefficient `(offset, count)` pairs for device upload. Identity
    /// curves publish `(-1, 0)`.
    pub fn coefs_offsets(&self) -> Vec<i32> {
        self.offsets(|s| (s.coefs_offset, s.coefs_count))
    }

    fn offsets(&self, pick: impl Fn(&CurveSlot) -> (usize, usize)) -> Vec<i32> {
        self.slots
            .iter()
            .flat_map(|s| {
                if s.is_identity() {
                    [-1, 0]
                } else {
                    let (offs, cnt) = pick(s);
                    [offs as i32, cnt as i32]
                }
            })
            .collect()
    }

    /// Forward evaluation. Periodic curves wrap `x` into `[0, 1)`.
    ///
    /// # Panics
    ///
    /// Panics if `curve` is not a registered curve index.
    #[inline]
    pub fn evaluate(&self, curve: usize, x: f32) -> f32 {
        eval::eval_curve(self, curve, x)
    }

    /// Inverse evaluation.
    ///
    /// # Panics
    ///
    /// Panics if `curve` is not a registered curve index.
    #[inline]
    pub fn evaluate_inverse(&self, curve: usize, y: f32) -> f32 {
        eval::eval_curve_rev(self, curve, y)
    }

    /// Wrap-aware forward evaluation; identity curves return `identity_x`.
    ///
    /// # Panics
    ///
    /// Panics if `curve` is not a registered curve index.
    #[inline]
    pub fn evaluate_continuous(&self, curve: usize, x: f32, identity_x: f32) -> f32 {
        eval::eval_curve_continuous(self, curve, x, identity_x)
    }

    /// Evaluate a buffer of values in place.
    ///
    /// # Panics
    ///
    /// Panics if `curve` is not a registered curve index.
    pub fn evaluate_slice(&self, curve: usize, values: &mut [f32], direction: EvalDirection) {
        #[cfg(feature = "parallel")]
        crate::parallel::evaluate_slice(self, curve, values, direction);
        #[cfg(not(feature = "parallel"))]
        eval::evaluate_slice(self, curve, values, direction);
    }
}

/// Single-writer builder for a [`CurveTable`].
#[derive(Debug, Clone)]
pub struct CurveTableBuilder {
    table: CurveTable,
}

impl Default for CurveTableBuilder {
    fn default() -> Self {
        Self::new(TableLimits::default())
    }
}

impl CurveTableBuilder {
    /// Create an empty builder with the given arena sizes.
    pub fn new(limits: TableLimits) -> Self {
        Self {
            table: CurveTable {
                knots: vec![0.0; limits.max_knots],
                coefs: vec![0.0; limits.max_coefs],
                num_knots: 0,
                num_coefs: 0,
                slots: Vec::new(),
                limits,
            },
        }
    }

    /// Number of curves registered so far.
    #[inline]
    pub fn num_curves(&self) -> usize {
        self.table.slots.len()
    }

    /// Validate, fit and register a curve. Returns its index.
    pub fn push(&mut self, curve: &Curve) -> CurveResult<usize> {
        trace!(points = curve.num_control_points(), topology = ?curve.topology(), "CurveTableBuilder::push");
        curve.validate()?;
        let fitted = fit_curve(curve);
        self.push_fitted(&fitted, curve.topology())
    }

    /// Register an already fitted curve. Returns its index.
    ///
    /// Nothing is written if the curve does not fit in the arenas.
    pub fn push_fitted(&mut self, fitted: &FittedCurve, topology: CurveTopology) -> CurveResult<usize> {
        let t = &mut self.table;
        let new_knots = fitted.knots.len();
        let new_coefs = fitted.num_coefs();

        if t.num_knots + new_knots > t.limits.max_knots || t.num_coefs + new_coefs > t.limits.max_coefs {
            return Err(CurveError::Capacity {
                knots: t.num_knots + new_knots,
                max_knots: t.limits.max_knots,
                coefs: t.num_coefs + new_coefs,
                max_coefs: t.limits.max_coefs,
            });
        }

        let slot = CurveSlot {
            knots_offset: t.num_knots,
            knots_count: new_knots,
            coefs_offset: t.num_coefs,
            coefs_count: new_coefs,
            topology,
        };

        let sets = fitted.num_segments();
        let k0 = slot.knots_offset;
        let c0 = slot.coefs_offset;
        t.knots[k0..k0 + new_knots].copy_from_slice(&fitted.knots);
        t.coefs[c0..c0 + sets].copy_from_slice(&fitted.coefs_a);
        t.coefs[c0 + sets..c0 + sets * 2].copy_from_slice(&fitted.coefs_b);
        t.coefs[c0 + sets * 2..c0 + sets * 3].copy_from_slice(&fitted.coefs_c);

        t.num_knots += new_knots;
        t.num_coefs += new_coefs;
        t.slots.push(slot);

        debug!(
            curve = t.slots.len() - 1,
            knots_offset = slot.knots_offset,
            knots = new_knots,
            coefs_offset = slot.coefs_offset,
            coefs = new_coefs,
            "Registered curve"
        );
        Ok(t.slots.len() - 1)
    }

    /// Finish the build phase.
    pub fn build(self) -> CurveTable {
        self.table
    }
}
