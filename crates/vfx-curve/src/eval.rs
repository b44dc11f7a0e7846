//! Curve evaluation over a packed [`CurveTable`].
//!
//! Forward and inverse evaluation follow the same arithmetic as the
//! generated shader code, so CPU and GPU results agree to float rounding.

use crate::table::{CurveSlot, CurveTable};

/// Slopes below this magnitude are treated as flat when inverting.
const FLAT_SLOPE: f32 = 1e-5;

/// Evaluation direction for buffer processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalDirection {
    /// `y = f(x)`.
    #[default]
    Forward,
    /// `x = f⁻¹(y)`.
    Inverse,
}

/// Borrowed knots and A/B/C blocks of one curve.
#[derive(Debug, Clone, Copy)]
struct CurveView<'a> {
    knots: &'a [f32],
    a: &'a [f32],
    b: &'a [f32],
    c: &'a [f32],
}

impl<'a> CurveView<'a> {
    fn new(table: &'a CurveTable, slot: &CurveSlot) -> Self {
        let sets = slot.num_segments();
        let knots = &table.knots()[slot.knots_offset..slot.knots_offset + slot.knots_count];
        let coefs = &table.coefs()[slot.coefs_offset..slot.coefs_offset + slot.coefs_count];
        Self {
            knots,
            a: &coefs[..sets],
            b: &coefs[sets..sets * 2],
            c: &coefs[sets * 2..],
        }
    }

    #[inline]
    fn sets(&self) -> usize {
        self.a.len()
    }

    #[inline]
    fn piece(&self, seg: usize, x: f32) -> f32 {
        let t = x - self.knots[seg];
        (self.a[seg] * t + self.b[seg]) * t + self.c[seg]
    }

    /// Value and slope at the last knot.
    #[inline]
    fn end(&self) -> (f32, f32) {
        let seg = self.sets() - 1;
        let t = self.knots[seg + 1] - self.knots[seg];
        let offs = (self.a[seg] * t + self.b[seg]) * t + self.c[seg];
        let slope = 2.0 * self.a[seg] * t + self.b[seg];
        (offs, slope)
    }

    /// Linear extension outside the knot range, if `x` is outside it.
    #[inline]
    fn extrapolate(&self, x: f32) -> Option<f32> {
        let kn_start = self.knots[0];
        let kn_end = self.knots[self.sets()];
        if x <= kn_start {
            return Some((x - kn_start) * self.b[0] + self.c[0]);
        }
        if x >= kn_end {
            let (offs, slope) = self.end();
            return Some((x - kn_end) * slope + offs);
        }
        None
    }
}

#[inline]
fn view<'a>(table: &'a CurveTable, curve: usize) -> Option<CurveView<'a>> {
    let slot = &table.slots()[curve];
    if slot.is_identity() { None } else { Some(CurveView::new(table, slot)) }
}

/// Forward evaluation. Identity curves return `x`; periodic curves go
/// through [`eval_curve_continuous`].
pub fn eval_curve(table: &CurveTable, curve: usize, x: f32) -> f32 {
    if table.slots()[curve].topology.is_periodic() {
        return eval_curve_continuous(table, curve, x, x);
    }
    let Some(v) = view(table, curve) else { return x };
    if let Some(y) = v.extrapolate(x) {
        return y;
    }

    // Last piece if no knot lies above x.
    let sets = v.sets();
    let seg = v.knots[1..sets].iter().position(|&k| x < k).unwrap_or(sets - 1);
    v.piece(seg, x)
}

/// Inverse evaluation by solving the piece's quadratic analytically.
///
/// Never wraps. Flat ends return the boundary knot.
pub fn eval_curve_rev(table: &CurveTable, curve: usize, y: f32) -> f32 {
    let Some(v) = view(table, curve) else { return y };

    let sets = v.sets();
    let kn_start = v.knots[0];
    let kn_end = v.knots[sets];
    let (kn_end_y, end_slope) = v.end();

    if y <= v.c[0] {
        let b = v.b[0];
        if b.abs() < FLAT_SLOPE {
            return kn_start;
        }
        return (y - v.c[0]) / b + kn_start;
    }
    if y >= kn_end_y {
        if end_slope.abs() < FLAT_SLOPE {
            return kn_end;
        }
        return (y - kn_end_y) / end_slope + kn_end;
    }

    let seg = v.c[1..].iter().position(|&c| y < c).unwrap_or(sets - 1);

    let (a, b) = (v.a[seg], v.b[seg]);
    let c0 = v.c[seg] - y;
    let discrim = (b * b - 4.0 * a * c0).sqrt();
    // Flat piece hit exactly at its level.
    let denom = discrim + b;
    if denom.abs() < FLAT_SLOPE {
        return v.knots[seg];
    }
    v.knots[seg] + (-2.0 * c0) / denom
}

/// Wrap-aware forward evaluation.
///
/// Periodic curves are evaluated at `x − floor(x)`; periodic diagonal
/// curves add `floor(x)` back so the output keeps the input's turn.
/// The piece is found with a bounded scan in both directions from an
/// estimate proportional to the position in the knot range. Identity
/// curves return `identity_x`.
pub fn eval_curve_continuous(table: &CurveTable, curve: usize, x: f32, identity_x: f32) -> f32 {
    let topology = table.slots()[curve].topology;
    let Some(v) = view(table, curve) else { return identity_x };

    let (h, turns) = if topology.is_periodic() {
        let turns = x.floor();
        (x - turns, turns)
    } else {
        (x, 0.0)
    };
    let offset = if topology.is_diagonal() { turns } else { 0.0 };

    if let Some(y) = v.extrapolate(h) {
        return y + offset;
    }

    let sets = v.sets();
    let kn_start = v.knots[0];
    let span = v.knots[sets] - kn_start;
    let guess = ((h - kn_start) / span * sets as f32) as usize;
    let mut seg = guess.min(sets - 1);
    while seg > 0 && h < v.knots[seg] {
        seg -= 1;
    }
    while seg < sets - 1 && h >= v.knots[seg + 1] {
        seg += 1;
    }

    v.piece(seg, h) + offset
}

/// Evaluate a buffer in place on the calling thread.
pub fn evaluate_slice(table: &CurveTable, curve: usize, values: &mut [f32], direction: EvalDirection) {
    match direction {
        EvalDirection::Forward => values.iter_mut().for_each(|v| *v = eval_curve(table, curve, *v)),
        EvalDirection::Inverse => values.iter_mut().for_each(|v| *v = eval_curve_rev(table, curve, *v)),
    }
}
