use std::fs;

use anyhow::{Context, Result};
use districtor::{
    prepare_groups, read_blocks_geojson, split_into_districts, write_districts_geojson,
    Diagnostics, DumpDir, NoDiagnostics, Registry, SplitConfig,
};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SplitArgs) -> Result<()> {
    let out_path = args.output.clone().unwrap_or("./districts.geojson".into());

    let config = SplitConfig {
        population_deviation: args.deviation,
        weighting: args.weighting.parse()?,
        breaking: args.breaking.parse()?,
        merge_into_previous_groups: args.merge,
        refill_each_pass: args.refill,
        fast_calculations: !args.exact,
    };
    config.validate()?;

    let dump_dir;
    let diagnostics: &dyn Diagnostics = match &args.dump_dir {
        Some(dir) => {
            dump_dir = DumpDir::new(dir).with_context(|| format!("creating dump directory {}", dir.display()))?;
            &dump_dir
        }
        None => &NoDiagnostics,
    };

    println!("[split] reading census blocks from {}", args.input.display());
    let bytes = fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let blocks = read_blocks_geojson(&bytes).with_context(|| format!("parsing {}", args.input.display()))?;
    info!("read {} census blocks", blocks.len());

    println!("[split] preparing redistricting groups");
    let mut registry = Registry::new();
    let groups = prepare_groups(&mut registry, blocks, diagnostics).context("preparing redistricting groups")?;

    println!("[split] splitting {} groups into {} districts ({} weighting, {} breaking)",
        groups.len(), args.districts, config.weighting, config.breaking);
    let districts = split_into_districts(&mut registry, groups, args.districts, &config, diagnostics)
        .context("splitting districts")?;

    for (i, district) in districts.iter().enumerate() {
        info!("district {}: population {}, {} groups", i + 1, district.population(), district.groups().len());
    }

    println!("[split] writing {} districts to {}", districts.len(), out_path.display());
    let output = write_districts_geojson(&districts)?;
    fs::write(&out_path, output).with_context(|| format!("writing {}", out_path.display()))?;

    Ok(())
}
