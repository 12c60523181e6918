use derive_builder::UninitializedFieldError;
use thiserror::Error;

/// Errors raised while constructing a [`Randomisation`](crate::Randomisation)
/// or by the standalone distance computation.
///
/// Exhausting the repetition budget is not an error; it is reported as the
/// `NotBalanced` variant of [`Outcome`](crate::outcome::Outcome).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RerandError {
    /// Covariate data failed validation.
    #[error("invalid covariate data: {0}")]
    InvalidData(String),

    /// The requested distance metric is not implemented.
    #[error("unsupported distance metric `{0}`, supported metrics are: Euclidean")]
    UnsupportedMetric(String),

    /// Max repetitions must be a positive integer.
    #[error("max repetitions must be at least 1, got {0}")]
    InvalidBudget(usize),

    /// Tolerance must be strictly positive.
    #[error("tolerance must be greater than 0, got {0}")]
    InvalidTolerance(f64),

    /// The variant table failed validation.
    #[error("invalid variant table: {0}")]
    InvalidVariants(String),

    /// A group with no members was handed to the distance computation; a
    /// covariate mean over zero rows is undefined.
    #[error("degenerate partition: group {0} has no members")]
    DegenerateGroup(usize),

    /// A required builder field was never set.
    #[error("required field `{0}` was not set")]
    MissingField(&'static str),
}

impl From<UninitializedFieldError> for RerandError {
    fn from(err: UninitializedFieldError) -> Self {
        RerandError::MissingField(err.field_name())
    }
}
