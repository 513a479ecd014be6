//! Edit script reconstruction from recorded wavefront provenance.

use crate::{
    cigar::{Cigar, EditOp},
    expand::Recurrences,
    mode::MemoryMode,
    wavefront::{Cell, Component, Origin, WavefrontHistory},
};

/// Walks recorded provenance from the end cell back to the origin.
///
/// Levels dropped by [`MemoryMode::Checkpointed`] are recomputed one
/// segment at a time from the checkpoint below them, then released once the
/// walk has moved past.
pub struct Backtrace<'r, 'a> {
    recurrences: &'r Recurrences<'a>,
    history: &'r mut WavefrontHistory,
    memory: MemoryMode,
    segment: Vec<usize>,
    rederived: usize,
}

impl<'r, 'a> Backtrace<'r, 'a> {
    /// Trace through `history`, which was filled under `memory`.
    pub fn new(
        recurrences: &'r Recurrences<'a>,
        history: &'r mut WavefrontHistory,
        memory: MemoryMode,
    ) -> Self {
        Backtrace {
            recurrences,
            history,
            memory,
            segment: Vec::new(),
            rederived: 0,
        }
    }

    /// Number of levels recomputed so far.
    pub fn rederived(&self) -> usize {
        self.rederived
    }

    /// Build the edit script of the alignment ending at `score`.
    pub fn run(&mut self, score: usize) -> Cigar {
        let penalties = *self.recurrences.penalties();
        let pair = *self.recurrences.pair();
        let mut cigar = Cigar::new();

        let mut component = Component::M;
        let mut s = score;
        let mut k = pair.end_diagonal();
        loop {
            let cell = self.cell(s, component, k);
            match cell.origin {
                Origin::Start => {
                    self.matches(&mut cigar, k, 0, cell.offset);
                    break;
                }
                Origin::Mismatch => {
                    s -= penalties.mismatch() as usize;
                    let source = self.cell(s, Component::M, k);
                    self.matches(&mut cigar, k, source.offset + 1, cell.offset);
                    cigar.push(EditOp::Mismatch, 1);
                }
                Origin::CloseInsertion => {
                    let source = self.cell(s, Component::I, k);
                    self.matches(&mut cigar, k, source.offset, cell.offset);
                    component = Component::I;
                }
                Origin::CloseDeletion => {
                    let source = self.cell(s, Component::D, k);
                    self.matches(&mut cigar, k, source.offset, cell.offset);
                    component = Component::D;
                }
                Origin::OpenInsertion | Origin::ExtendInsertion => {
                    cigar.push(EditOp::Insertion, 1);
                    k -= 1;
                    if cell.origin == Origin::OpenInsertion {
                        s -= penalties.gap_first() as usize;
                        component = Component::M;
                    } else {
                        s -= penalties.gap_extend() as usize;
                    }
                }
                Origin::OpenDeletion | Origin::ExtendDeletion => {
                    cigar.push(EditOp::Deletion, 1);
                    k += 1;
                    if cell.origin == Origin::OpenDeletion {
                        s -= penalties.gap_first() as usize;
                        component = Component::M;
                    } else {
                        s -= penalties.gap_extend() as usize;
                    }
                }
            }
        }

        self.release_segment();
        cigar.reverse();
        cigar
    }

    /// Emit, back to front, the free diagonal run `from..to` on diagonal `k`.
    /// Under a zero mismatch penalty the run may hold substitutions.
    fn matches(&self, cigar: &mut Cigar, k: i32, from: i32, to: i32) {
        let pair = self.recurrences.pair();
        for h in (from..to).rev() {
            let op = if pair.symbols_match(h - k, h) {
                EditOp::Match
            } else {
                EditOp::Mismatch
            };
            cigar.push(op, 1);
        }
    }

    fn cell(&mut self, score: usize, component: Component, k: i32) -> Cell {
        self.materialize(score);
        let cell = self
            .history
            .wavefront(score, component)
            .and_then(|wavefront| wavefront.get(k));
        match cell {
            Some(cell) => cell,
            None => unreachable!(
                "backtrace reached an unset {component:?} cell at score {score}, diagonal {k}"
            ),
        }
    }

    /// Make sure level `score` is in memory, recomputing its segment if needed.
    fn materialize(&mut self, score: usize) {
        if self.history.is_retained(score) {
            return;
        }
        let Some((checkpoint, last)) = self.memory.segment(score) else {
            return;
        };
        // The walk only moves down, so the previous segment is done with.
        self.release_segment();

        let last = last.min(self.history.len() - 1);
        for level in checkpoint + 1..=last {
            if self.history.is_retained(level) {
                continue;
            }
            let set = self.recurrences.level(level, self.history);
            self.history.restore(level, set);
            self.segment.push(level);
            self.rederived += 1;
        }
        log::trace!("re-derived levels {}..={last} from checkpoint {checkpoint}", checkpoint + 1);
    }

    fn release_segment(&mut self) {
        for level in self.segment.drain(..) {
            self.history.drop_level(level);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{equal::EqualityDefinition, penalty::Penalties, sequence::SequencePair};

    fn forward(rec: &Recurrences) -> (WavefrontHistory, usize) {
        let mut history = WavefrontHistory::new();
        history.push(rec.first_level());
        let mut score = 0;
        while !history
            .wavefront(score, Component::M)
            .map_or(false, |m| crate::extend::reaches_end(m, rec.pair()))
        {
            score += 1;
            let set = rec.level(score, &history);
            history.push(set);
        }
        (history, score)
    }

    #[test]
    fn test_backtrace_reference() {
        let eq = EqualityDefinition::default();
        let pair = SequencePair::new(
            b"TCTTTACTCGCGCGTTGGAGAAATACAATAGT",
            b"TCTATACTGCGCGTTTGGAGAAATAAAATAGT",
            &eq,
            false,
        )
        .unwrap();
        let rec = Recurrences::new(pair, Penalties::new(4, 6, 2).unwrap(), None);
        let (mut history, score) = forward(&rec);
        assert_eq!(score, 24);

        let cigar = Backtrace::new(&rec, &mut history, MemoryMode::Full).run(score);
        assert_eq!(cigar.to_string(), "3M1X4M1D7M1I9M1X6M");
    }

    #[test]
    fn test_backtrace_rederives_dropped_levels() {
        let eq = EqualityDefinition::default();
        let pair = SequencePair::new(
            b"TCTTTACTCGCGCGTTGGAGAAATACAATAGT",
            b"TCTATACTGCGCGTTTGGAGAAATAAAATAGT",
            &eq,
            false,
        )
        .unwrap();
        let rec = Recurrences::new(pair, Penalties::new(4, 6, 2).unwrap(), None);
        let (mut history, score) = forward(&rec);
        let memory = MemoryMode::Checkpointed { interval: 10 };
        let span = rec.penalties().span();
        for level in 0..=score {
            if !memory.keeps(level, span) && level + span <= score {
                history.drop_level(level);
            }
        }
        assert!(!history.is_retained(1));

        let mut backtrace = Backtrace::new(&rec, &mut history, memory);
        let cigar = backtrace.run(score);
        assert!(backtrace.rederived() > 0);
        assert_eq!(cigar.to_string(), "3M1X4M1D7M1I9M1X6M");
    }

    #[test]
    fn test_backtrace_empty_sequences() {
        let eq = EqualityDefinition::default();
        let pair = SequencePair::new(b"", b"", &eq, false).unwrap();
        let rec = Recurrences::new(pair, Penalties::default(), None);
        let (mut history, score) = forward(&rec);
        assert_eq!(score, 0);
        let cigar = Backtrace::new(&rec, &mut history, MemoryMode::Full).run(score);
        assert!(cigar.is_empty());
    }

    #[test]
    fn test_backtrace_free_mismatches() {
        let eq = EqualityDefinition::default();
        let pair = SequencePair::new(b"ACGT", b"TGCA", &eq, true).unwrap();
        let rec = Recurrences::new(pair, Penalties::new(0, 6, 2).unwrap(), None);
        let (mut history, score) = forward(&rec);
        assert_eq!(score, 0);
        let cigar = Backtrace::new(&rec, &mut history, MemoryMode::Full).run(score);
        assert_eq!(cigar.to_string(), "4X");
    }
}
