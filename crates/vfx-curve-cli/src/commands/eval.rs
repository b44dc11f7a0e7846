//! Eval command: evaluate a curve at single values.

use crate::EvalArgs;
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::Result;
use vfx_curve::EvalDirection;

pub fn run(args: EvalArgs, verbose: u8) -> Result<()> {
    trace!(config = %args.config.display(), curve = %args.curve, "eval::run");
    let config = super::load_config(&args.config)?;
    let table = super::build_table(&config, &args.config)?;
    let curve = super::curve_index(&config, &args.curve)?;

    let direction = if args.inverse { EvalDirection::Inverse } else { EvalDirection::Forward };
    if verbose > 0 {
        info!(curve = %args.curve, values = args.values.len(), ?direction, "Evaluating");
    }

    let mut out = args.values.clone();
    table.evaluate_slice(curve, &mut out, direction);
    for (x, y) in args.values.iter().zip(&out) {
        println!("{x} -> {y}");
    }

    Ok(())
}
