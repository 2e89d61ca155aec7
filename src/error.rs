//! Error types for district splitting.

use geograph::Alignment;
use thiserror::Error;

use crate::types::GroupId;

/// Primary error type for partitioning operations.
#[derive(Error, Debug)]
pub enum SplitError {
    /// A structural invariant (symmetric neighbors, contiguity, population
    /// conservation, membership) does not hold.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// No seam crosses the group along this axis. Recovered inside the seam
    /// finder and reported to callers as "no split".
    #[error("no {alignment} seam through {group}")]
    SeamNotFound { group: GroupId, alignment: Alignment },

    /// Every group selected for decomposition has a single member.
    #[error("no decomposable group among {groups:?}")]
    NoDecomposableUnit { groups: Vec<GroupId> },

    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// A shape is empty or degenerate where a real area is required.
    #[error("geometry error: {0}")]
    Geometry(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SplitError>;

/// Shorthand for `Err(SplitError::InvariantViolation(..))` with `format!` arguments.
macro_rules! invariant {
    ($($arg:tt)*) => {
        return Err($crate::error::SplitError::InvariantViolation(format!($($arg)*)))
    };
}

pub(crate) use invariant;
