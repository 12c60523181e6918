use derive_builder::Builder;
use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::distance::{max_pairwise_distance, DistanceMetric};
use crate::error::RerandError;
use crate::events::ProgressEvent;
use crate::outcome::Outcome;
use crate::variants::VariantTable;

/// A configured rerandomisation search over one covariate matrix.
///
/// Construct through [`RandomisationBuilder`]; all validation happens there,
/// before any random draw. A built value is immutable and every call to
/// [`randomise`](Randomisation::randomise) is a fresh, independently seeded
/// run, so independent searches may run concurrently from separate threads.
///
/// ```
/// use nalgebra::dmatrix;
/// use rerand::RandomisationBuilder;
///
/// let randomisation = RandomisationBuilder::default()
///     .covariates(dmatrix![0.3; -1.2; 0.8; 0.1])
///     .tolerance(1.0)
///     .max_reps(100)
///     .seed(42)
///     .build()
///     .unwrap();
/// let outcome = randomisation.randomise();
/// assert_eq!(outcome, randomisation.randomise());
/// ```
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate", error = "RerandError"))]
pub struct Randomisation {
    /// N x K matrix of covariates, one row per experimental unit.
    covariates: DMatrix<f64>,

    /// Metric used to score imbalance between variant groups.
    #[builder(default)]
    distance_metric: DistanceMetric,

    /// Largest acceptable distance between group covariate means.
    tolerance: f64,

    /// Repetition budget for the search.
    max_reps: usize,

    /// Variant names and assignment probabilities. Defaults to an even
    /// control/treatment split.
    #[builder(default)]
    variants: VariantTable,

    /// Seed for the owned random generator. Runs are reproducible when set;
    /// unseeded searches draw from entropy.
    #[builder(default, setter(strip_option))]
    seed: Option<u64>,
}

impl RandomisationBuilder {
    fn validate(&self) -> Result<(), RerandError> {
        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return Err(RerandError::InvalidTolerance(tolerance));
            }
        }
        if let Some(max_reps) = self.max_reps {
            if max_reps == 0 {
                return Err(RerandError::InvalidBudget(max_reps));
            }
        }
        // The metric and the variant table are checked by their own
        // constructors before either can reach the builder.
        if let Some(covariates) = &self.covariates {
            if covariates.iter().any(|v| v.is_nan()) {
                return Err(RerandError::InvalidData("NaNs present in data".into()));
            }
            if covariates.nrows() < 2 {
                return Err(RerandError::InvalidData(format!(
                    "at least two units are required, got {}",
                    covariates.nrows()
                )));
            }
        }
        Ok(())
    }
}

impl Randomisation {
    /// Runs the full search: draw an assignment, score its imbalance, accept
    /// the first draw below tolerance or give up once the budget is spent.
    pub fn randomise(&self) -> Outcome {
        self.randomise_with_progress(|_| {})
    }

    /// Like [`randomise`](Self::randomise), invoking `on_progress` with a
    /// [`ProgressEvent`] for every repetition and once for the terminal
    /// outcome.
    pub fn randomise_with_progress<F>(&self, mut on_progress: F) -> Outcome
    where
        F: FnMut(&ProgressEvent),
    {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let n = self.covariates.nrows();

        for repetition in 1..=self.max_reps {
            let labels: Vec<usize> = (0..n).map(|_| self.variants.sample(&mut rng)).collect();

            // A draw that leaves some variant empty cannot be assessed for
            // balance; record it as infinitely imbalanced and redraw.
            let distance = match self.partition(&labels) {
                Some(groups) => max_pairwise_distance(&groups, self.distance_metric),
                None => f64::INFINITY,
            };

            debug!(repetition, distance, "randomisation");
            on_progress(&ProgressEvent::Repetition {
                repetition,
                distance,
            });

            if distance < self.tolerance {
                info!(
                    repetitions = repetition,
                    tolerance = self.tolerance,
                    "achieved balance"
                );
                on_progress(&ProgressEvent::Balanced {
                    repetitions: repetition,
                    tolerance: self.tolerance,
                });
                let assignment = labels
                    .iter()
                    .map(|&index| self.variants.name(index).to_string())
                    .collect();
                return Outcome::Balanced {
                    assignment,
                    repetitions: repetition,
                };
            }
        }

        warn!(
            repetitions = self.max_reps,
            tolerance = self.tolerance,
            "did not achieve balance"
        );
        on_progress(&ProgressEvent::Exhausted {
            repetitions: self.max_reps,
            tolerance: self.tolerance,
        });
        Outcome::NotBalanced {
            repetitions: self.max_reps,
        }
    }

    /// Groups covariate rows by drawn variant index, one subset per table
    /// entry. Returns `None` when some variant received no units.
    fn partition(&self, labels: &[usize]) -> Option<Vec<DMatrix<f64>>> {
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); self.variants.len()];
        for (row, &label) in labels.iter().enumerate() {
            members[label].push(row);
        }
        if members.iter().any(|rows| rows.is_empty()) {
            return None;
        }
        Some(
            members
                .iter()
                .map(|rows| self.covariates.select_rows(rows.iter()))
                .collect(),
        )
    }

    /// The covariate matrix this search draws over.
    pub fn covariates(&self) -> &DMatrix<f64> {
        &self.covariates
    }

    /// Number of experimental units.
    pub fn n_units(&self) -> usize {
        self.covariates.nrows()
    }

    /// Metric used to score imbalance.
    pub fn distance_metric(&self) -> DistanceMetric {
        self.distance_metric
    }

    /// Largest acceptable imbalance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Repetition budget.
    pub fn max_reps(&self) -> usize {
        self.max_reps
    }

    /// The variant table assignments are drawn from.
    pub fn variants(&self) -> &VariantTable {
        &self.variants
    }

    /// The configured seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}
