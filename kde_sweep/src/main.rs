use std::fs::File;
use std::io::prelude::*;
use std::time::Instant;

use clap::Parser;
use kdam::tqdm;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use kde::{Dataset, Error, Kde, KdeConfig, Kernel, KernelType, TraversalMode};
use kde::{EpanechnikovKernel, GaussianKernel, LaplacianKernel, SphericalKernel, TriangularKernel};

/// Sweeps the relative error tolerance of a dual-tree estimate and compares every run against
/// the naive all-pairs result.
#[derive(Parser, Debug)] #[command(author, version, about, long_about = None)]
struct Args {

    //YAML estimator config; command line values override it
    #[arg(short, long)]
    config: Option<String>,

    #[arg(long, default_value_t = 10000)]
    reference_size: usize,

    #[arg(long, default_value_t = 1000)]
    query_size: usize,

    #[arg(short, long, default_value_t = 3)]
    dim: usize,

    #[arg(short, long)]
    bandwidth: Option<f64>,

    //gaussian, epanechnikov, triangular, spherical or laplacian
    #[arg(short, long)]
    kernel: Option<String>,

    //depth_first, breadth_first, single_tree or naive
    #[arg(short, long)]
    mode: Option<String>,

    #[arg(short, long)]
    leaf_size: Option<usize>,

    #[arg(short, long)]
    abs_error: Option<f64>,

    //traversal modes to sweep; defaults to the configured one
    #[arg(long, value_delimiter = ',')]
    modes: Vec<String>,

    #[arg(long, value_delimiter = ',', default_values_t = vec![0.0, 0.01, 0.05, 0.1, 0.5])]
    rel_errors: Vec<f64>,

    //JSON report destination
    #[arg(short, long)]
    output: Option<String>,

    #[arg(short, long, default_value_t = 0)]
    seed: u64,
}

#[derive(Serialize, Debug)]
struct SweepRow {
    mode: TraversalMode,
    rel_error: f64,
    abs_error: f64,
    seconds: f64,
    base_cases: usize,
    scores: usize,
    prunes: usize,
    max_abs_error: f64,
    within_bound: bool,
}

#[derive(Serialize, Debug)]
struct Report {
    config: KdeConfig,
    reference_size: usize,
    query_size: usize,
    dimension: usize,
    naive_seconds: f64,
    rows: Vec<SweepRow>,
}

fn main() -> Result<(), Error> {

    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(filename) => KdeConfig::from_file(filename)?,
        None => KdeConfig::default(),
    };

    if let Some(bandwidth) = args.bandwidth {
        config.bandwidth = bandwidth;
    }
    if let Some(kernel) = &args.kernel {
        config.kernel = kernel.parse()?;
    }
    if let Some(mode) = &args.mode {
        config.mode = mode.parse()?;
    }
    if let Some(leaf_size) = args.leaf_size {
        config.leaf_size = leaf_size;
    }
    if let Some(abs_error) = args.abs_error {
        config.abs_error = abs_error;
    }

    let modes = match args.modes.is_empty() {
        true => vec![config.mode],
        false => args.modes.iter().map(|x| x.parse()).collect::<Result<Vec<TraversalMode>, Error>>()?,
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let reference = Dataset::random_with_rng(args.dim, args.reference_size, &mut rng)?;
    let query = Dataset::random_with_rng(args.dim, args.query_size, &mut rng)?;

    info!("{} references, {} queries, dimension {}, {:?}", reference.len(), query.len(), args.dim, config);

    let report = match config.kernel {
        KernelType::Gaussian => sweep::<GaussianKernel>(&config, &reference, &query, &modes, &args.rel_errors)?,
        KernelType::Epanechnikov => sweep::<EpanechnikovKernel>(&config, &reference, &query, &modes, &args.rel_errors)?,
        KernelType::Triangular => sweep::<TriangularKernel>(&config, &reference, &query, &modes, &args.rel_errors)?,
        KernelType::Spherical => sweep::<SphericalKernel>(&config, &reference, &query, &modes, &args.rel_errors)?,
        KernelType::Laplacian => sweep::<LaplacianKernel>(&config, &reference, &query, &modes, &args.rel_errors)?,
    };

    match &args.output {
        Some(filename) => {
            let serialized = serde_json::to_string_pretty(&report)?;
            let mut file = File::create(filename)?;
            file.write_all(serialized.as_bytes())?;
            info!("wrote report to {}", filename);
        },
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn sweep<K: Kernel>(config: &KdeConfig, reference: &Dataset, query: &Dataset, modes: &[TraversalMode], rel_errors: &[f64]) -> Result<Report, Error> {

    let mut naive: Kde<K> = Kde::new(config.bandwidth, 0.0, 0.0, TraversalMode::Naive)?;
    naive.train(reference)?;

    let start = Instant::now();
    let exact = naive.evaluate(query)?;
    let naive_seconds = start.elapsed().as_secs_f64();
    info!("naive: {} base cases in {}", naive.base_cases(), naive_seconds);

    let mut kde: Kde<K> = Kde::from_config(config)?;
    kde.train(reference)?;

    let sweep: Vec<(TraversalMode, f64)> = modes
        .iter()
        .flat_map(|&mode| rel_errors.iter().map(move |&rel_error| (mode, rel_error)))
        .collect();

    let mut rows = Vec::new();
    for &(mode, rel_error) in tqdm!(sweep.iter()) {

        kde.set_mode(mode);
        kde.set_relative_error(rel_error)?;

        let start = Instant::now();
        let densities = kde.evaluate(query)?;
        let seconds = start.elapsed().as_secs_f64();

        let mut max_abs_error: f64 = 0.0;
        let mut within_bound = true;
        for (approx, exact) in densities.iter().zip(exact.iter()) {
            let diff = (approx - exact).abs();
            max_abs_error = max_abs_error.max(diff);
            if diff > config.abs_error + rel_error * exact + 1e-12 {
                within_bound = false;
            }
        }

        let stats = kde.stats();
        info!("{:?} rel {} abs {}: {} base cases, {} prunes, max error {:e}, {}s",
              mode,
              rel_error,
              config.abs_error,
              stats.base_cases,
              stats.prunes,
              max_abs_error,
              seconds);

        rows.push(SweepRow {
            mode,
            rel_error,
            abs_error: config.abs_error,
            seconds,
            base_cases: stats.base_cases,
            scores: stats.scores,
            prunes: stats.prunes,
            max_abs_error,
            within_bound,
        });
    }

    return Ok(Report {
        config: config.clone(),
        reference_size: reference.len(),
        query_size: query.len(),
        dimension: reference.dimension(),
        naive_seconds,
        rows,
    });
}
