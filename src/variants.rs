use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::RerandError;

/// Probabilities must sum to 1 within this tolerance. Exact equality is
/// fragile under floating-point sums.
const PROBABILITY_SUM_TOL: f64 = 1e-9;

/// Mapping from variant name to assignment probability.
///
/// Entries keep their insertion order, which fixes the group order seen by
/// the distance computation and keeps seeded runs reproducible. A table is
/// validated once at construction and immutable afterwards: it always holds
/// at least two uniquely named variants whose probabilities sum to 1.
#[derive(Debug, Clone)]
pub struct VariantTable {
    names: Vec<String>,
    probabilities: Vec<f64>,
    sampler: WeightedIndex<f64>,
}

impl VariantTable {
    /// Builds a table from `(name, probability)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RerandError::InvalidVariants`] if there are fewer than two
    /// entries, a name repeats, a probability is negative or not finite, or
    /// the probabilities do not sum to 1 within a small epsilon.
    pub fn new<I, S>(entries: I) -> Result<Self, RerandError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut names = Vec::new();
        let mut probabilities = Vec::new();
        for (name, probability) in entries {
            names.push(name.into());
            probabilities.push(probability);
        }

        if names.len() < 2 {
            return Err(RerandError::InvalidVariants(format!(
                "at least two variants are required, got {}",
                names.len()
            )));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(RerandError::InvalidVariants(format!(
                    "duplicate variant name `{name}`"
                )));
            }
        }
        for (name, &p) in names.iter().zip(&probabilities) {
            if !p.is_finite() || p < 0.0 {
                return Err(RerandError::InvalidVariants(format!(
                    "probability for `{name}` must be a finite non-negative number, got {p}"
                )));
            }
        }
        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > PROBABILITY_SUM_TOL {
            return Err(RerandError::InvalidVariants(format!(
                "probabilities must sum to 1, got {total}"
            )));
        }

        let sampler = WeightedIndex::new(&probabilities)
            .map_err(|e| RerandError::InvalidVariants(e.to_string()))?;

        Ok(Self {
            names,
            probabilities,
            sampler,
        })
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false: a valid table holds at least two variants.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Variant names in table order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Assignment probabilities in table order.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Name of the variant at `index`.
    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    /// Position of `name` in the table, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Draws one variant index according to the table's probabilities.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.sampler.sample(rng)
    }
}

/// The implicit two-variant 50/50 split used when no table is given. A fair
/// coin flip per unit and a general categorical draw with weights [0.5, 0.5]
/// are the same thing, so the boolean split shares the table code path.
impl Default for VariantTable {
    fn default() -> Self {
        VariantTable::new([("control", 0.5), ("treatment", 0.5)])
            .expect("the default two-variant table is valid")
    }
}

impl PartialEq for VariantTable {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.probabilities == other.probabilities
    }
}
