/// Advisory records emitted by the search loop, one per observable moment.
///
/// Rendering is left to the caller: pass a callback to
/// [`randomise_with_progress`](crate::randomisation::Randomisation::randomise_with_progress).
/// The same moments are mirrored as `tracing` events.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// One assignment was drawn and assessed.
    Repetition {
        /// 1-based repetition index.
        repetition: usize,
        /// Imbalance of this draw. Infinite when some variant drew no units.
        distance: f64,
    },
    /// Balance was achieved.
    Balanced {
        /// Repetitions performed, including the accepting one.
        repetitions: usize,
        /// Tolerance the accepted draw was compared against.
        tolerance: f64,
    },
    /// The repetition budget ran out without an acceptable draw.
    Exhausted {
        /// Repetitions attempted.
        repetitions: usize,
        /// Tolerance no draw managed to beat.
        tolerance: f64,
    },
}
