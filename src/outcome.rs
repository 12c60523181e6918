/// Result of a full rerandomisation search.
///
/// Running out of repetitions is an expected, data-dependent outcome and is
/// reported as a value, not an error: it distinguishes "could not find a
/// balanced draw" from a malformed configuration, which fails at
/// construction instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// An assignment below tolerance was found.
    Balanced {
        /// One variant label per experimental unit.
        assignment: Vec<String>,
        /// 1-based count of repetitions performed, including the accepting one.
        repetitions: usize,
    },
    /// The repetition budget ran out without an acceptable draw.
    NotBalanced {
        /// Repetitions attempted.
        repetitions: usize,
    },
}

impl Outcome {
    /// True if balance was achieved.
    pub fn is_balanced(&self) -> bool {
        matches!(self, Outcome::Balanced { .. })
    }

    /// The accepted assignment, if any.
    pub fn assignment(&self) -> Option<&[String]> {
        match self {
            Outcome::Balanced { assignment, .. } => Some(assignment),
            Outcome::NotBalanced { .. } => None,
        }
    }

    /// The accepted assignment by value, if any.
    pub fn into_assignment(self) -> Option<Vec<String>> {
        match self {
            Outcome::Balanced { assignment, .. } => Some(assignment),
            Outcome::NotBalanced { .. } => None,
        }
    }

    /// Repetitions performed before the search stopped.
    pub fn repetitions(&self) -> usize {
        match self {
            Outcome::Balanced { repetitions, .. } | Outcome::NotBalanced { repetitions } => {
                *repetitions
            }
        }
    }
}
