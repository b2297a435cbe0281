use thiserror::Error;

/// Errors returned by the diff functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The end instant is before the start instant.
    #[error("end instant precedes start instant by {gap_nanos}ns")]
    InvertedRange {
        /// How far `end` lies before `start`, always positive.
        gap_nanos: i128,
    },
}

pub type Result<T> = std::result::Result<T, DiffError>;
