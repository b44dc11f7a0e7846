//! Fit command: report how each curve was packed.

use crate::FitArgs;
#[allow(unused_imports)]
use tracing::{debug, info, trace};
use anyhow::Result;

use super::join;

pub fn run(args: FitArgs, verbose: u8) -> Result<()> {
    trace!(config = %args.config.display(), "fit::run");
    let config = super::load_config(&args.config)?;
    let table = super::build_table(&config, &args.config)?;

    if verbose > 0 {
        info!(curves = table.num_curves(), "Fitted {}", args.config.display());
    }

    for (def, slot) in config.curves.iter().zip(table.slots()) {
        if slot.is_identity() {
            println!("{:<16} {:<18} identity", def.name, format!("{:?}", slot.topology));
        } else {
            println!(
                "{:<16} {:<18} {} points, {} pieces, knots {}+{}, coefs {}+{}",
                def.name,
                format!("{:?}", slot.topology),
                def.points.len(),
                slot.num_segments(),
                slot.knots_offset,
                slot.knots_count,
                slot.coefs_offset,
                slot.coefs_count,
            );
        }
    }

    let limits = table.limits();
    println!(
        "table: {}/{} knots, {}/{} coefs",
        table.num_knots(),
        limits.max_knots,
        table.num_coefs(),
        limits.max_coefs
    );

    if args.arrays {
        let offsets = |v: Vec<i32>| v.iter().map(|o| o.to_string()).collect::<Vec<_>>().join(", ");
        println!("knotsOffsets: [{}]", offsets(table.knots_offsets()));
        println!("coefsOffsets: [{}]", offsets(table.coefs_offsets()));
        println!("knots: [{}]", join(table.knots()));
        println!("coefs: [{}]", join(table.coefs()));
    }

    Ok(())
}
