//! The crate's error taxonomy.
//!
//! A plain enum with one `String`-carrying variant per failure kind, no
//! `thiserror`. Library code returns `Result<_, SahapError>` directly; only
//! the binary wraps it in `anyhow` at the CLI boundary.
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SahapError {
    /// Malformed WIF token, out-of-range weight, mismatched ground-truth
    /// row count. Fatal at load.
    InvalidInput(String),
    /// `weight_integer` outside (0, 100].
    InvalidWeight(String),
    /// `add_read` called on a read already assigned to the haplotype.
    DuplicateAssignment(String),
    /// `remove_read` called on a read not assigned to the haplotype.
    NotAssigned(String),
    /// An asserted invariant (non-negative costs, solution consistency,
    /// ring-buffer sum bounds) did not hold.
    InvariantViolation(String),
    /// Per-window wall-clock budget exceeded.
    Timeout(String),
    /// Full-retreat condition met; caller should reset and keep going.
    NoProgress(String),
}

impl fmt::Display for SahapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SahapError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            SahapError::InvalidWeight(msg) => write!(f, "invalid weight: {}", msg),
            SahapError::DuplicateAssignment(msg) => write!(f, "duplicate assignment: {}", msg),
            SahapError::NotAssigned(msg) => write!(f, "not assigned: {}", msg),
            SahapError::InvariantViolation(msg) => write!(f, "invariant violation: {}", msg),
            SahapError::Timeout(msg) => write!(f, "timeout: {}", msg),
            SahapError::NoProgress(msg) => write!(f, "no progress: {}", msg),
        }
    }
}

impl std::error::Error for SahapError {}
