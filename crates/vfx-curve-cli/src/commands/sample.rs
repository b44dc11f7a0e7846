//! Sample command: evaluate a curve on an even grid.

use crate::SampleArgs;
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::{bail, Result};

pub fn run(args: SampleArgs, verbose: u8) -> Result<()> {
    trace!(config = %args.config.display(), curve = %args.curve, "sample::run");
    if args.count < 2 {
        bail!("Need at least 2 samples, got {}", args.count);
    }

    let config = super::load_config(&args.config)?;
    let table = super::build_table(&config, &args.config)?;
    let curve = super::curve_index(&config, &args.curve)?;

    if verbose > 0 {
        info!(curve = %args.curve, count = args.count, from = args.from, to = args.to, inverse = args.inverse, "Sampling");
    }

    let step = (args.to - args.from) / (args.count - 1) as f32;
    println!("x,y");
    for i in 0..args.count {
        let x = args.from + step * i as f32;
        let y = if args.inverse {
            table.evaluate_inverse(curve, x)
        } else {
            table.evaluate(curve, x)
        };
        println!("{x},{y}");
    }

    Ok(())
}
