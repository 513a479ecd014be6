//! Alignment errors.

/// Ways an alignment can fail.
///
/// Both kinds are raised before any result is handed back. No partial score or
/// edit script accompanies an error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// Invalid penalty model or aligner configuration. Detected before propagation starts.
    #[error("configuration error: {0}")]
    Config(String),
    /// Score level passed the caller's ceiling without reaching the end of both sequences.
    #[error("score limit of {limit} exceeded before reaching the end of both sequences")]
    ScoreLimitExceeded {
        /// Configured ceiling.
        limit: u32,
    },
}
