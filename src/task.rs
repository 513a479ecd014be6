//! What an alignment computes.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// What should rs_wfa compute?
pub enum AlignTask {
    /// Optimal score only. Keeps just the sliding window of recent levels.
    Score,
    #[default]
    /// Optimal score and the edit script realising it.
    Path,
}

impl AlignTask {
    /// Task matching a "compute CIGAR" flag.
    pub fn from_compute_cigar(compute_cigar: bool) -> Self {
        if compute_cigar {
            AlignTask::Path
        } else {
            AlignTask::Score
        }
    }
}
