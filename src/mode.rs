//! Wavefront retention strategies for the backtrace.

use crate::ceil_div;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// How much wavefront history to keep for the backtrace?
pub enum MemoryMode {
    #[default]
    /// Keep every score level.
    /// * Fastest backtrace. Memory grows with `score * (n + m)`.
    Full,
    /// Keep only recent levels plus periodic checkpoints, and re-derive the
    /// rest while tracing back.
    /// * A checkpoint at score `c` (every multiple of `interval`) holds the
    ///   levels a forward step from `c` needs.
    /// * Each dropped segment is recomputed once, consumed and released.
    ///
    /// ### Example
    /// With penalties `{x: 4, o: 6, e: 2}` and `interval = 100`, a score-1000
    /// alignment holds about 10 checkpoints of 8 levels plus one segment of
    /// 100 levels instead of all 1001 levels.
    Checkpointed {
        /// Score distance between checkpoints. Must be at least 1.
        interval: usize,
    },
}

impl MemoryMode {
    /// Whether level `score` stays in memory once the forward pass no longer needs it.
    /// * `span`: how far back a recurrence reaches.
    pub(crate) fn keeps(&self, score: usize, span: usize) -> bool {
        match *self {
            MemoryMode::Full => true,
            MemoryMode::Checkpointed { interval } => {
                // Nearest checkpoint at or above `score`.
                let checkpoint = ceil_div!(score, interval) * interval;
                checkpoint < score + span
            }
        }
    }

    /// Checkpoint to re-derive a dropped level from, and the last level of its segment.
    pub(crate) fn segment(&self, score: usize) -> Option<(usize, usize)> {
        match *self {
            MemoryMode::Full => None,
            MemoryMode::Checkpointed { interval } => {
                let checkpoint = score.saturating_sub(1) / interval * interval;
                Some((checkpoint, checkpoint + interval))
            }
        }
    }
}
