//! Error types for samplers, engines and snapshots.

use thiserror::Error;

/// Errors surfaced by this crate.
///
/// Configuration errors are raised at construction and are not
/// recoverable; a NaN objective is fatal because it indicates a broken
/// [`Problem`](crate::Problem) implementation. Out-of-range keys and
/// infeasible candidates are never errors; they score as
/// [`WORST_FITNESS`](crate::WORST_FITNESS) instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Dimensionality must be strictly positive.
    #[error("invalid dimensionality: {dimensions} (must be > 0)")]
    InvalidDimensions {
        /// The rejected dimensionality.
        dimensions: usize,
    },

    /// Population is too small for the chosen sampler.
    #[error("population size {population} too small (minimum {minimum})")]
    PopulationTooSmall {
        /// The rejected population size.
        population: usize,
        /// Smallest population the sampler supports.
        minimum: usize,
    },

    /// A fraction parameter is outside its valid range.
    #[error("invalid {name}: {value} (must be in {range})")]
    InvalidFraction {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Human-readable valid range.
        range: &'static str,
    },

    /// Elite and mutant counts leave no room for crossover offspring.
    #[error("elites ({elites}) + mutants ({mutants}) must be below population ({population})")]
    ElitesPlusMutants {
        /// Number of elite slots.
        elites: usize,
        /// Number of mutant slots.
        mutants: usize,
        /// Population size.
        population: usize,
    },

    /// Components composed into one engine disagree on dimensionality.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality of the first component.
        expected: usize,
        /// The conflicting dimensionality.
        got: usize,
    },

    /// A composite engine was given nothing to compose.
    #[error("at least one {what} must be supplied")]
    EmptyComposition {
        /// What was missing (samplers, islands).
        what: &'static str,
    },

    /// A stagnation threshold or migration interval of zero is meaningless.
    #[error("invalid {name}: must be greater than zero")]
    InvalidInterval {
        /// Parameter name.
        name: &'static str,
    },

    /// The objective produced NaN; the problem implementation is broken.
    #[error("objective yields NaN for solution {solution}")]
    NanObjective {
        /// Debug rendering of the offending decoded solution.
        solution: String,
    },

    /// A snapshot was produced by an incompatible version of this crate.
    #[error("unsupported snapshot version {got} (expected {expected})")]
    SnapshotVersion {
        /// Version this build reads and writes.
        expected: u32,
        /// Version found in the stream.
        got: u32,
    },

    /// I/O failure while suspending or resuming an engine.
    #[error("snapshot i/o: {0}")]
    SnapshotIo(#[from] std::io::Error),

    /// Encoding or decoding failure in the snapshot stream.
    #[error("snapshot codec: {0}")]
    SnapshotCodec(#[from] serde_json::Error),
}

/// A specialized `Result` for this crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` for errors raised by invalid construction
    /// parameters.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidDimensions { .. }
                | Error::PopulationTooSmall { .. }
                | Error::InvalidFraction { .. }
                | Error::ElitesPlusMutants { .. }
                | Error::DimensionMismatch { .. }
                | Error::EmptyComposition { .. }
                | Error::InvalidInterval { .. }
        )
    }

    /// Returns `true` for errors raised while suspending or resuming.
    pub fn is_snapshot_error(&self) -> bool {
        matches!(
            self,
            Error::SnapshotVersion { .. } | Error::SnapshotIo(_) | Error::SnapshotCodec(_)
        )
    }
}
