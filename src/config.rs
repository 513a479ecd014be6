//! Alignment configuration.

use crate::{
    equal::EqualityPair, error::AlignError, heuristic::BandHeuristic, mode::MemoryMode,
    task::AlignTask,
};

#[derive(Debug, Clone, Default)]
/// Alignment configuration.
pub struct AlignConfig {
    /// Alignment task, [`AlignTask`].
    pub task: AlignTask,
    /// Wavefront retention strategy for the backtrace, [`MemoryMode`].
    pub memory: MemoryMode,
    /// Optional band pruning, [`BandHeuristic`].
    /// * `None` (default): exact. The score is the true optimum.
    /// * Some: faster on divergent pairs, but the score may exceed the optimum.
    pub heuristic: Option<BandHeuristic>,
    /// Ceiling on the score level.
    ///
    /// **If**:
    /// * Some:
    ///     * Alignment fails with [`AlignError::ScoreLimitExceeded`] once the score would pass it.
    ///     * Also caps the memory used by wavefront history.
    /// * None:
    ///     * Run until the end of both sequences is reached.
    pub max_score: Option<u32>,
    /// List of pairs of symbols as an [`EqualityPair`], where each pair defines two symbols as equal.
    /// * Allows extension of the lib's definition of equality, e.g. `N` wildcards.
    pub added_equalities: Vec<EqualityPair>,
}

impl AlignConfig {
    /// Default configuration for a task.
    pub fn with_task(task: AlignTask) -> Self {
        AlignConfig {
            task,
            ..Default::default()
        }
    }

    /// Reject settings that cannot run.
    pub fn validate(&self) -> Result<(), AlignError> {
        if let MemoryMode::Checkpointed { interval: 0 } = self.memory {
            return Err(AlignError::Config(
                "checkpoint interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_exact_full_path() {
        let config = AlignConfig::default();
        assert_eq!(config.task, AlignTask::Path);
        assert_eq!(config.memory, MemoryMode::Full);
        assert!(config.heuristic.is_none());
        assert!(config.max_score.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = AlignConfig {
            memory: MemoryMode::Checkpointed { interval: 0 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AlignError::Config(_))));
    }
}
