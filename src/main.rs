use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::DMatrix;
use pretty_print_nalgebra::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use tracing_subscriber::EnvFilter;

use rerand::{DistanceMetric, Outcome, ProgressEvent, RandomisationBuilder, VariantTable};

/// Rerandomised assignment over simulated standard-normal covariates.
#[derive(Parser, Debug)]
#[command(name = "rerand", version, about)]
struct Args {
    /// Number of experimental units to simulate
    #[arg(long, default_value_t = 100)]
    units: usize,

    /// Number of covariate columns to simulate
    #[arg(long, default_value_t = 1)]
    cols: usize,

    /// Largest acceptable distance between group covariate means
    #[arg(long, default_value_t = 0.1)]
    tolerance: f64,

    /// Repetition budget for the search
    #[arg(long, default_value_t = 100)]
    max_reps: usize,

    /// Distance metric
    #[arg(long, default_value = "Euclidean")]
    metric: String,

    /// Variant table as name=probability pairs, e.g. a=0.5,b=0.3,c=0.2.
    /// Defaults to an even control/treatment split.
    #[arg(long, value_delimiter = ',')]
    variants: Vec<String>,

    /// Seed for both the simulated covariates and the search
    #[arg(long)]
    seed: Option<u64>,
}

fn parse_variants(specs: &[String]) -> Result<VariantTable> {
    let mut entries = Vec::with_capacity(specs.len());
    for spec in specs {
        let (name, probability) = spec
            .split_once('=')
            .with_context(|| format!("expected name=probability, got `{spec}`"))?;
        let probability: f64 = probability
            .parse()
            .with_context(|| format!("invalid probability for `{name}`"))?;
        entries.push((name.to_string(), probability));
    }
    Ok(VariantTable::new(entries)?)
}

fn simulate_covariates(units: usize, cols: usize, seed: Option<u64>) -> DMatrix<f64> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let data: Vec<f64> = (0..units * cols)
        .map(|_| StandardNormal.sample(&mut rng))
        .collect();
    DMatrix::from_vec(units, cols, data)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let metric: DistanceMetric = args.metric.parse()?;
    let variants = if args.variants.is_empty() {
        VariantTable::default()
    } else {
        parse_variants(&args.variants)?
    };
    let covariates = simulate_covariates(args.units, args.cols, args.seed);

    let mut builder = RandomisationBuilder::default();
    builder
        .covariates(covariates.clone())
        .distance_metric(metric)
        .tolerance(args.tolerance)
        .max_reps(args.max_reps)
        .variants(variants.clone());
    if let Some(seed) = args.seed {
        builder.seed(seed);
    }
    let randomisation = builder.build()?;

    let mut last_distance = f64::NAN;
    let outcome = randomisation.randomise_with_progress(|event| {
        if let ProgressEvent::Repetition { distance, .. } = event {
            last_distance = *distance;
        }
    });

    match outcome {
        Outcome::Balanced {
            assignment,
            repetitions,
        } => {
            println!(
                "balance achieved after {repetitions} repetition(s), distance {last_distance:.6}"
            );
            println!("assignment: {}", assignment.join(" "));

            let mut means = DMatrix::zeros(variants.len(), covariates.ncols());
            for (index, name) in variants.names().iter().enumerate() {
                let rows: Vec<usize> = assignment
                    .iter()
                    .enumerate()
                    .filter(|(_, label)| *label == name)
                    .map(|(row, _)| row)
                    .collect();
                println!("{name}: {} unit(s)", rows.len());
                means.set_row(index, &covariates.select_rows(rows.iter()).row_mean());
            }
            println!("per-variant covariate means:\n{}", pretty_print!(&means));
        }
        Outcome::NotBalanced { repetitions } => {
            println!(
                "did not achieve balance after {repetitions} repetition(s), last distance {last_distance:.6}"
            );
        }
    }

    Ok(())
}
