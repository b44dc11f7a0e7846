//! # vfx-curve
//!
//! Shape-preserving quadratic spline curves for parametric color grading.
//!
//! A [`Curve`] is a handful of control points plus a [`CurveTopology`].
//! Fitting turns it into piecewise quadratics that pass through every
//! point without overshooting; a [`CurveTable`] packs several fitted
//! curves into two fixed-size arrays that can be evaluated on the CPU or
//! uploaded as-is and evaluated by code from [`ShaderEmitter`].
//!
//! # Modules
//!
//! - [`types`] - Control points, topologies and editable curves
//! - [`prepare`] - Sorting, spacing and periodic wrapping of points
//! - [`slopes`] - Slope estimation at control points
//! - [`spline`] - Quadratic fitting with interior knot insertion
//! - [`correct`] - Single-pass monotonicity correction
//! - [`table`] - Packed knot/coefficient storage
//! - [`eval`] - Forward, inverse and wrap-aware evaluation
//! - [`shader`] - GLSL/HLSL generation mirroring [`eval`]
//! - [`config`] - YAML curve sets
//!
//! # Example
//!
//! ```rust
//! use vfx_curve::{ControlPoint, Curve, CurveTable, CurveTopology};
//!
//! let curve = Curve::new(
//!     vec![ControlPoint::new(0.0, 0.0), ControlPoint::new(0.5, 0.3), ControlPoint::new(1.0, 1.0)],
//!     CurveTopology::Open,
//! ).unwrap();
//!
//! let table = CurveTable::build(&[curve]).unwrap();
//! let y = table.evaluate(0, 0.25);
//! assert!(y > 0.0 && y < 0.3);
//!
//! let x = table.evaluate_inverse(0, y);
//! assert!((x - 0.25).abs() < 1e-4);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod types;
pub mod prepare;
pub mod slopes;
pub mod spline;
pub mod correct;
pub mod table;
pub mod eval;
pub mod shader;
pub mod config;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use error::{CurveError, CurveResult};
pub use types::{ControlPoint, Curve, CurveTopology};
pub use spline::{fit_curve, FittedCurve};
pub use table::{CurveSlot, CurveTable, CurveTableBuilder, TableLimits, MAX_NUM_COEFS, MAX_NUM_KNOTS};
pub use eval::EvalDirection;
pub use shader::{GpuLanguage, ShaderBuffers, ShaderEmitter, ShaderMode};
pub use config::{CurveDef, CurveSetConfig};
