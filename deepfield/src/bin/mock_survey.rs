//! Mock deep-field survey driver
//!
//! Processes one simulation snapshot: builds the snapshot's calibration
//! context, synthesizes mock observations for a slab of spatial
//! sub-regions, runs the detection sweep, and appends the resulting
//! object catalogs under the output directory.
//!
//! Positional parameters follow the batch-submission convention:
//! simulation index, partition start, partition end, and an optional
//! projection axis selector (0 = x, 1 = y, 2 = z).

use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;

use deepfield::detect::{SegmentExtractor, ThresholdDetector};
use deepfield::pipeline::{partition_slice, survey_region, CatalogBlock, PARTITION_STARTS};
use deepfield::{
    CalibrationTables, CatalogWriter, InMemorySnapshot, PipelineError, ProjectionAxis,
    SnapshotContext, SnapshotSource, WFC3_IR,
};

#[derive(Parser, Debug)]
#[command(
    name = "Mock Survey",
    about = "Synthesizes mock space-telescope observations of one simulation snapshot \
             and extracts source catalogs",
    long_about = None
)]
struct Args {
    /// Simulation index, partition start, partition end, optional
    /// projection axis (0 = x, 1 = y, 2 = z)
    #[arg(value_name = "PARAM", num_args = 3..=4)]
    params: Vec<f64>,

    /// Directory holding the calibration tables (drt/, filter and PSF
    /// files, ISM transmission grid)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Snapshot particle table (header: redshift and region size in kpc)
    #[arg(long)]
    snapshot: PathBuf,

    /// Root of the output catalog tree
    #[arg(long, default_value = "processed")]
    out_dir: PathBuf,

    /// Seed for the noise stability search (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let simulation = args.params[0] as usize;
    let n1 = (args.params[1] as usize).min(PARTITION_STARTS.len());
    let n2 = (args.params[2] as usize).min(PARTITION_STARTS.len());
    let axis = match args.params.get(3) {
        Some(&value) => ProjectionAxis::from_index(value as usize)
            .ok_or(PipelineError::InvalidAxis(value as usize))?,
        None => ProjectionAxis::X,
    };

    println!("Loading calibration tables from {}", args.data_dir.display());
    let tables = CalibrationTables::load_dir(&args.data_dir)?;

    println!("Loading snapshot {}", args.snapshot.display());
    let snapshot = InMemorySnapshot::from_path(&args.snapshot)?;

    let detector = ThresholdDetector;
    let extractor = SegmentExtractor;

    let context = SnapshotContext::build(
        WFC3_IR,
        snapshot.redshift(),
        snapshot.region_extent_kpc(),
        &tables,
        &detector,
        args.seed,
    )?;
    println!(
        "z = {:.3e}, theta = {:.3e} arcsec, nbins = {}",
        context.redshift, context.theta_arcsec, context.nbins
    );
    if !context.noise.converged {
        eprintln!(
            "Warning: noise stability search did not converge after {} iterations",
            context.noise.iterations
        );
    }

    let out_dir = args
        .out_dir
        .join(simulation.to_string())
        .join(axis.label());
    let writer = CatalogWriter::create(&out_dir, &simulation.to_string())?;
    writer.write_info(&WFC3_IR, context.redshift, (n1, n2), context.theta_arcsec)?;

    // A slab of region cells: the requested partition slice along x
    // crossed with the full partition along y and z.
    let mut corners = Vec::new();
    for &r_x in partition_slice(n1, n2) {
        for &r_y in &PARTITION_STARTS {
            for &r_z in &PARTITION_STARTS {
                corners.push([r_x, r_y, r_z]);
            }
        }
    }
    println!("Processing {} regions along {}", corners.len(), axis.label());

    // Regions share the context read-only; each worker buffers its
    // blocks and the single writer appends them afterwards so catalog
    // records never interleave.
    let coords = context.pixel_coords();
    let results: Vec<Vec<CatalogBlock>> = corners
        .par_iter()
        .map(|&corner| {
            let region = snapshot.query_region(corner);
            let maps = context.observe(&region, axis);
            survey_region(&maps, &coords, &detector, &extractor)
        })
        .collect();

    for blocks in &results {
        writer.append_blocks(&WFC3_IR, blocks)?;
    }
    println!("Catalogs written to {}", out_dir.display());

    Ok(())
}
