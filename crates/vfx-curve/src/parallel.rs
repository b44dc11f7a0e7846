//! Parallel buffer evaluation using Rayon.
//!
//! A built [`CurveTable`] is read-only, so chunks of a buffer can be
//! evaluated on any number of threads without synchronization.
//!
//! # Example
//!
//! ```rust
//! use vfx_curve::{ControlPoint, Curve, CurveTable, CurveTopology, EvalDirection};
//!
//! let curve = Curve::new(
//!     vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(0.5, 0.3), ControlPoint::new(1.0, 1.0)],
//!     CurveTopology::Open,
//! ).unwrap();
//! let table = CurveTable::build(&[curve]).unwrap();
//!
//! let mut buf = vec![0.5f32; 1 << 16];
//! vfx_curve::parallel::evaluate_slice(&table, 0, &mut buf, EvalDirection::Forward);
//! ```

use rayon::prelude::*;

use crate::eval::{self, EvalDirection};
use crate::table::CurveTable;

/// Values per work item.
const CHUNK_SIZE: usize = 4096;

/// Evaluate a buffer in place, splitting it across the Rayon pool.
///
/// # Panics
///
/// Panics if `curve` is not a registered curve index.
pub fn evaluate_slice(table: &CurveTable, curve: usize, values: &mut [f32], direction: EvalDirection) {
    if values.len() <= CHUNK_SIZE {
        eval::evaluate_slice(table, curve, values, direction);
        return;
    }
    values
        .par_chunks_mut(CHUNK_SIZE)
        .for_each(|chunk| eval::evaluate_slice(table, curve, chunk, direction));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ControlPoint, Curve, CurveTopology};

    #[test]
    fn test_matches_serial() {
        let curve = Curve::new(
            vec![ControlPoint::new(0.0, 0.1), ControlPoint::new(0.4, 0.3), ControlPoint::new(1.0, 0.9)],
            CurveTopology::Open,
        )
        .unwrap();
        let table = CurveTable::build(&[curve]).unwrap();

        let src: Vec<f32> = (0..20_000).map(|i| i as f32 / 20_000.0).collect();
        let mut par = src.clone();
        let mut ser = src;
        evaluate_slice(&table, 0, &mut par, EvalDirection::Forward);
        eval::evaluate_slice(&table, 0, &mut ser, EvalDirection::Forward);
        assert_eq!(par, ser);
    }
}
