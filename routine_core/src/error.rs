//! Error types for the routine_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for routine_core operations
///
/// All editing failures are recoverable, returned values: when a mutation
/// entry point returns an error, the live routine is unchanged. The variant
/// alone carries enough information for a presentation layer to produce a
/// precise message.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Grouping requested over non-adjacent exercise positions
    #[error("selection {indices:?} is not a contiguous run of exercises")]
    NonContiguousSelection { indices: Vec<usize> },

    /// Standard group requested with fewer than two members
    #[error("a superset needs at least 2 exercises, got {members}")]
    GroupSize { members: usize },

    /// Removal would leave an exercise (or group member) with zero sets
    #[error("exercise at position {exercise_index} would be left with no sets")]
    OrphanSet { exercise_index: usize },

    /// Save attempted on a non-rest-day routine with zero exercises
    #[error("routine has no exercises; mark it as a rest day or add some")]
    EmptyRoutine,

    /// Undo/redo invoked when the matching can_undo/can_redo is false.
    /// Callers are expected to check first; hitting this is caller misuse.
    #[error("history {op} out of bounds")]
    HistoryBounds { op: &'static str },

    /// Exercise or set index outside the current bounds
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    /// No group with this id exists in the routine
    #[error("no group {0} in routine")]
    UnknownGroup(Uuid),

    /// Exercise id not present in the catalog
    #[error("unknown exercise '{0}'")]
    UnknownExercise(String),

    /// Conversion between units of different dimensions
    #[error("cannot convert {from} to {to}")]
    UnitConversion { from: String, to: String },

    /// Malformed command arguments (seed/round mismatches, editing grouped
    /// sets outside the round operations, and similar)
    #[error("{0}")]
    InvalidCommand(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),
}
