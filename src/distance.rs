use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, RowDVector};

use crate::error::RerandError;

/// Distance metric used to summarise imbalance between variant groups.
///
/// Selected by a discrete tag so that adding a metric means adding a variant
/// here and a match arm in the computation, without touching the search loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    /// Euclidean distance between group covariate-mean vectors.
    #[default]
    Euclidean,
}

impl FromStr for DistanceMetric {
    type Err = RerandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("euclidean") {
            Ok(DistanceMetric::Euclidean)
        } else {
            Err(RerandError::UnsupportedMetric(s.to_string()))
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceMetric::Euclidean => write!(f, "Euclidean"),
        }
    }
}

/// Calculates the imbalance between two or more groups of covariates.
///
/// Each group is an `M_i x K` matrix of covariate rows sharing the same `K`.
/// The result is the worst (largest) distance between the column-wise mean
/// vectors of any pair of groups. With exactly two groups there is exactly
/// one pair, so this reduces to the plain distance between the two mean
/// vectors.
///
/// # Errors
///
/// Returns [`RerandError::InvalidVariants`] for fewer than two groups and
/// [`RerandError::DegenerateGroup`] for a group with no rows.
pub fn distance(groups: &[DMatrix<f64>], metric: DistanceMetric) -> Result<f64, RerandError> {
    if groups.len() < 2 {
        return Err(RerandError::InvalidVariants(format!(
            "at least two groups are required, got {}",
            groups.len()
        )));
    }
    for (index, group) in groups.iter().enumerate() {
        if group.nrows() == 0 {
            return Err(RerandError::DegenerateGroup(index));
        }
    }
    Ok(max_pairwise_distance(groups, metric))
}

/// Worst pairwise mean distance over groups already known to be non-empty.
pub(crate) fn max_pairwise_distance(groups: &[DMatrix<f64>], metric: DistanceMetric) -> f64 {
    let means: Vec<RowDVector<f64>> = groups.iter().map(|group| group.row_mean()).collect();

    let mut worst = 0.0_f64;
    for i in 0..means.len() {
        for j in (i + 1)..means.len() {
            let d = match metric {
                DistanceMetric::Euclidean => (&means[i] - &means[j]).norm(),
            };
            worst = worst.max(d);
        }
    }
    worst
}
