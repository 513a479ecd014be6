//! Propagation driver and the public `align` entry points.

use crate::{
    backtrace::Backtrace,
    cigar::Cigar,
    config::AlignConfig,
    equal::EqualityDefinition,
    error::AlignError,
    expand::Recurrences,
    extend::reaches_end,
    penalty::Penalties,
    sequence::SequencePair,
    task::AlignTask,
    wavefront::{Component, WavefrontHistory},
};

/// What the propagation did, for tuning memory settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignStats {
    /// Score levels computed in the forward pass, including score 0.
    pub levels: usize,
    /// Most score levels held in memory at once.
    pub peak_retained_levels: usize,
    /// Levels recomputed during backtrace.
    pub rederived_levels: usize,
}

/// Pairwise global alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Minimal gap-affine cost of transforming the first sequence into the second.
    pub score: u32,
    /// Edit script realising `score`. `None` for [`AlignTask::Score`].
    pub cigar: Option<Cigar>,
    /// False when a band heuristic was active; `score` is then an upper bound.
    pub guaranteed_optimal: bool,
    /// Propagation statistics.
    pub stats: AlignStats,
}

impl Alignment {
    /// CIGAR text, empty if no script was computed.
    pub fn cigar_string(&self) -> String {
        self.cigar
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Reusable wavefront aligner.
///
/// Holds only read-only state, so one instance can serve many independent
/// alignments, including from several threads at once.
#[derive(Debug, Clone)]
pub struct Aligner {
    penalties: Penalties,
    config: AlignConfig,
    equality: EqualityDefinition,
}

impl Aligner {
    /// Validate the configuration and prepare an aligner.
    ///
    /// # Errors
    /// [`AlignError::Config`] if the configuration cannot run.
    pub fn new(penalties: Penalties, config: AlignConfig) -> Result<Self, AlignError> {
        config.validate()?;
        if config.heuristic.is_some() {
            log::warn!("band heuristic enabled: alignment scores are not guaranteed optimal");
        }
        let equality = EqualityDefinition::new(&config.added_equalities);
        Ok(Aligner {
            penalties,
            config,
            equality,
        })
    }

    /// Penalty model.
    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    /// Configuration.
    pub fn config(&self) -> &AlignConfig {
        &self.config
    }

    /// Symbol equality in use.
    pub fn equality(&self) -> &EqualityDefinition {
        &self.equality
    }

    /// Aligns two sequences end to end under the gap-affine model, returning an [`Alignment`].
    ///
    /// * @param `seq1`: First sequence (rows). Deletions remove its symbols.
    /// * @param `seq2`: Second sequence (columns). Insertions add its symbols.
    ///
    /// ### Example
    /// ```
    /// use rs_wfa::{align::Aligner, config::AlignConfig, penalty::Penalties};
    ///
    /// let aligner = Aligner::new(Penalties::new(4, 6, 2).unwrap(), AlignConfig::default()).unwrap();
    /// let alignment = aligner.align("ACGTACGT", "ACGTTACGT").unwrap();
    /// assert_eq!(alignment.score, 8);
    /// assert_eq!(alignment.cigar_string(), "4M1I4M");
    /// ```
    ///
    /// # Errors
    /// * [`AlignError::Config`] for sequences too long to index.
    /// * [`AlignError::ScoreLimitExceeded`] if `max_score` is passed.
    pub fn align(
        &self,
        seq1: impl AsRef<[u8]>,
        seq2: impl AsRef<[u8]>,
    ) -> Result<Alignment, AlignError> {
        let (seq1, seq2) = (seq1.as_ref(), seq2.as_ref());
        let pair = SequencePair::new(
            seq1,
            seq2,
            &self.equality,
            self.penalties.mismatch() == 0,
        )?;
        let recurrences = Recurrences::new(pair, self.penalties, self.config.heuristic);
        let span = self.penalties.span();
        let limit = self.config.max_score.unwrap_or(u32::MAX);
        let keep_history = self.config.task == AlignTask::Path;

        let mut history = WavefrontHistory::new();
        history.push(recurrences.first_level());
        let mut score: usize = 0;
        while !self.done(&history, score, &pair) {
            score += 1;
            if score > limit as usize {
                log::debug!(
                    "giving up on {}x{} alignment at score limit {limit}",
                    pair.n(),
                    pair.m()
                );
                return Err(AlignError::ScoreLimitExceeded { limit });
            }
            let set = recurrences.level(score, &history);
            if log::log_enabled!(log::Level::Trace) {
                let band = set.m.as_ref().map(|m| (m.lo(), m.hi()));
                log::trace!("score {score}: M band {band:?}");
            }
            history.push(set);

            // The next level never looks further back than `span`.
            if let Some(stale) = score.checked_sub(span) {
                if !keep_history || !self.config.memory.keeps(stale, span) {
                    history.drop_level(stale);
                }
            }
        }

        let mut stats = AlignStats {
            levels: history.len(),
            ..Default::default()
        };
        let cigar = if keep_history {
            let mut backtrace = Backtrace::new(&recurrences, &mut history, self.config.memory);
            let cigar = backtrace.run(score);
            stats.rederived_levels = backtrace.rederived();
            Some(cigar)
        } else {
            None
        };
        stats.peak_retained_levels = history.peak_retained();

        log::debug!(
            "aligned {}x{} at score {score}: {} levels, peak {} retained, {} re-derived",
            pair.n(),
            pair.m(),
            stats.levels,
            stats.peak_retained_levels,
            stats.rederived_levels
        );

        Ok(Alignment {
            // `score <= limit <= u32::MAX` here.
            score: score as u32,
            cigar,
            guaranteed_optimal: self.config.heuristic.is_none(),
            stats,
        })
    }

    /// Termination check: the M wavefront at `score` touches the bottom-right corner.
    fn done(&self, history: &WavefrontHistory, score: usize, pair: &SequencePair) -> bool {
        history
            .wavefront(score, Component::M)
            .map_or(false, |m| reaches_end(m, pair))
    }
}

/// Align two sequences with default settings.
///
/// `compute_cigar = false` returns the score only, keeping a bounded
/// window of wavefronts instead of the whole history.
///
/// ### Example
/// ```
/// use rs_wfa::{align, penalty::Penalties};
///
/// let penalties = Penalties::new(4, 6, 2).unwrap();
/// let alignment = align(
///     "TCTTTACTCGCGCGTTGGAGAAATACAATAGT",
///     "TCTATACTGCGCGTTTGGAGAAATAAAATAGT",
///     &penalties,
///     true,
/// )
/// .unwrap();
/// assert_eq!(alignment.score, 24);
/// assert_eq!(alignment.cigar_string(), "3M1X4M1D7M1I9M1X6M");
/// ```
pub fn align(
    seq1: impl AsRef<[u8]>,
    seq2: impl AsRef<[u8]>,
    penalties: &Penalties,
    compute_cigar: bool,
) -> Result<Alignment, AlignError> {
    let config = AlignConfig::with_task(AlignTask::from_compute_cigar(compute_cigar));
    Aligner::new(*penalties, config)?.align(seq1, seq2)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mode::MemoryMode;

    const SEQ1: &str = "TCTTTACTCGCGCGTTGGAGAAATACAATAGT";
    const SEQ2: &str = "TCTATACTGCGCGTTTGGAGAAATAAAATAGT";

    #[test]
    fn test_reference_scenario() {
        let penalties = Penalties::new(4, 6, 2).unwrap();
        let alignment = align(SEQ1, SEQ2, &penalties, true).unwrap();
        assert_eq!(alignment.score, 24);
        assert_eq!(alignment.cigar_string(), "3M1X4M1D7M1I9M1X6M");
        assert!(alignment.guaranteed_optimal);
        assert_eq!(alignment.stats.levels, 25);
        assert_eq!(alignment.stats.peak_retained_levels, 25);
        assert_eq!(alignment.stats.rederived_levels, 0);
    }

    #[test]
    fn test_score_only_keeps_window() {
        let penalties = Penalties::new(4, 6, 2).unwrap();
        let alignment = align(SEQ1, SEQ2, &penalties, false).unwrap();
        assert_eq!(alignment.score, 24);
        assert!(alignment.cigar.is_none());
        assert_eq!(alignment.cigar_string(), "");
        assert!(alignment.stats.peak_retained_levels <= penalties.span() + 1);
    }

    #[test]
    fn test_checkpointed_matches_full() {
        let penalties = Penalties::new(4, 6, 2).unwrap();
        let config = AlignConfig {
            memory: MemoryMode::Checkpointed { interval: 10 },
            ..Default::default()
        };
        let alignment = Aligner::new(penalties, config)
            .unwrap()
            .align(SEQ1, SEQ2)
            .unwrap();
        assert_eq!(alignment.score, 24);
        assert_eq!(alignment.cigar_string(), "3M1X4M1D7M1I9M1X6M");
        assert!(alignment.stats.rederived_levels > 0);
    }

    #[test]
    fn test_identical() {
        let penalties = Penalties::default();
        let alignment = align("GATTACA", "GATTACA", &penalties, true).unwrap();
        assert_eq!(alignment.score, 0);
        assert_eq!(alignment.cigar_string(), "7M");
        assert_eq!(alignment.stats.levels, 1);
    }

    #[test]
    fn test_empty_sides() {
        let penalties = Penalties::new(4, 6, 2).unwrap();
        let alignment = align("", "ACGT", &penalties, true).unwrap();
        assert_eq!(alignment.score, 14);
        assert_eq!(alignment.cigar_string(), "4I");

        let alignment = align("ACGT", "", &penalties, true).unwrap();
        assert_eq!(alignment.score, 14);
        assert_eq!(alignment.cigar_string(), "4D");

        let alignment = align("", "", &penalties, true).unwrap();
        assert_eq!(alignment.score, 0);
        assert_eq!(alignment.cigar_string(), "");
    }

    #[test]
    fn test_score_limit() {
        let penalties = Penalties::new(4, 6, 2).unwrap();
        let config = AlignConfig {
            max_score: Some(23),
            ..Default::default()
        };
        let err = Aligner::new(penalties, config)
            .unwrap()
            .align(SEQ1, SEQ2)
            .unwrap_err();
        assert_eq!(err, AlignError::ScoreLimitExceeded { limit: 23 });

        let config = AlignConfig {
            max_score: Some(24),
            ..Default::default()
        };
        let alignment = Aligner::new(penalties, config)
            .unwrap()
            .align(SEQ1, SEQ2)
            .unwrap();
        assert_eq!(alignment.score, 24);
    }

    #[test]
    fn test_invalid_config_rejected_before_alignment() {
        let config = AlignConfig {
            memory: MemoryMode::Checkpointed { interval: 0 },
            ..Default::default()
        };
        assert!(matches!(
            Aligner::new(Penalties::default(), config),
            Err(AlignError::Config(_))
        ));
    }
}
