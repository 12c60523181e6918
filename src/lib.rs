//! Covariate-balanced treatment assignment via rerandomisation.
//!
//! Repeatedly draws a random assignment of experimental units to variants
//! and accepts the first draw whose between-group covariate imbalance falls
//! below a tolerance. Imbalance is scored by [`distance()`]: the worst
//! pairwise distance between the groups' covariate-mean vectors. Acceptance
//! within the repetition budget yields [`Outcome::Balanced`]; running out of
//! draws is the expected [`Outcome::NotBalanced`], not an error.

pub mod distance;
pub mod error;
pub mod events;
pub mod outcome;
pub mod randomisation;
pub mod variants;

pub use distance::{distance, DistanceMetric};
pub use error::RerandError;
pub use events::ProgressEvent;
pub use outcome::Outcome;
pub use randomisation::{Randomisation, RandomisationBuilder};
pub use variants::VariantTable;

use nalgebra::DMatrix;

/// Runs a full rerandomisation search with the implicit two-variant
/// control/treatment split.
///
/// # Arguments
///
/// * `covariates` - N x K matrix of covariates, one row per experimental unit
/// * `distance_metric` - Metric used to score imbalance between groups
/// * `tolerance` - Largest acceptable distance between group covariate means
/// * `max_reps` - Repetition budget for the search
/// * `on_progress` - Callback invoked with every [`ProgressEvent`]
///
/// # Errors
///
/// Returns an error if the configuration fails validation; see
/// [`RerandError`]. Budget exhaustion is reported through the returned
/// [`Outcome`], never as an error.
pub fn rerandomise<F>(
    covariates: DMatrix<f64>,
    distance_metric: DistanceMetric,
    tolerance: f64,
    max_reps: usize,
    on_progress: F,
) -> Result<Outcome, RerandError>
where
    F: FnMut(&ProgressEvent),
{
    let randomisation = RandomisationBuilder::default()
        .covariates(covariates)
        .distance_metric(distance_metric)
        .tolerance(tolerance)
        .max_reps(max_reps)
        .build()?;
    Ok(randomisation.randomise_with_progress(on_progress))
}
