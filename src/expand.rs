//! Affine recurrences.
//!
//! With `x`, `o`, `e` the mismatch, gap-open and gap-extend penalties:
//!
//! ```text
//! I[s][k] = max(M[s-o-e][k-1], I[s-e][k-1]) + 1
//! D[s][k] = max(M[s-o-e][k+1], D[s-e][k+1])
//! M[s][k] = max(M[s-x][k] + 1, I[s][k], D[s][k])
//! ```
//!
//! Ties go to gap-extend over gap-open in I and D, and to mismatch over
//! closing an insertion over closing a deletion in M. Candidates that leave
//! the grid are discarded.

use crate::{
    extend::extend,
    heuristic::BandHeuristic,
    penalty::Penalties,
    sequence::SequencePair,
    wavefront::{Cell, Origin, Wavefront, WavefrontHistory, WavefrontSet},
};

/// Everything needed to compute a score level from earlier ones.
///
/// The same instance drives the forward pass and the re-derivation of
/// dropped levels during backtrace, so both produce identical wavefronts.
#[derive(Debug, Clone, Copy)]
pub struct Recurrences<'a> {
    pair: SequencePair<'a>,
    penalties: Penalties,
    heuristic: Option<BandHeuristic>,
}

/// Smallest band covering every present source, each shifted onto its target diagonals.
fn band(sources: &[(Option<&Wavefront>, i32)]) -> Option<(i32, i32)> {
    sources
        .iter()
        .filter_map(|(wavefront, shift)| wavefront.map(|wf| (wf.lo() + shift, wf.hi() + shift)))
        .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
}

impl<'a> Recurrences<'a> {
    /// Bind the recurrences to one sequence pair.
    pub fn new(
        pair: SequencePair<'a>,
        penalties: Penalties,
        heuristic: Option<BandHeuristic>,
    ) -> Self {
        Recurrences {
            pair,
            penalties,
            heuristic,
        }
    }

    /// Sequences being aligned.
    pub fn pair(&self) -> &SequencePair<'a> {
        &self.pair
    }

    /// Penalty model in use.
    pub fn penalties(&self) -> &Penalties {
        &self.penalties
    }

    /// Score 0: a single M cell on diagonal 0, extended.
    pub fn first_level(&self) -> WavefrontSet {
        let mut m = Wavefront::new(0, 0);
        m.offer(0, Cell::new(0, Origin::Start));
        extend(&mut m, &self.pair);
        WavefrontSet {
            m: Some(m),
            i: None,
            d: None,
        }
    }

    /// Compute, extend and (if configured) prune the wavefronts at `score`.
    ///
    /// Every level in `score - span..score` must be retained in `history`.
    pub fn level(&self, score: usize, history: &WavefrontHistory) -> WavefrontSet {
        let i = self.insertions(score, history);
        let d = self.deletions(score, history);
        let mut m = self.matches(score, history, i.as_ref(), d.as_ref());
        if let Some(m) = m.as_mut() {
            extend(m, &self.pair);
        }

        let mut set = WavefrontSet { m, i, d };
        if let Some(heuristic) = &self.heuristic {
            let dropped = heuristic.prune(&mut set);
            if dropped > 0 {
                log::trace!("score {score}: pruned {dropped} lagging diagonals");
            }
        }
        set
    }

    /// Clamp a band to the diagonals of the grid.
    fn clamp(&self, (lo, hi): (i32, i32)) -> (i32, i32) {
        (lo.max(-self.pair.n()), hi.min(self.pair.m()))
    }

    fn insertions(&self, score: usize, history: &WavefrontHistory) -> Option<Wavefront> {
        let open = history
            .behind(score, self.penalties.gap_first())
            .and_then(|set| set.m.as_ref());
        let ext = history
            .behind(score, self.penalties.gap_extend())
            .and_then(|set| set.i.as_ref());
        let (lo, hi) = self.clamp(band(&[(open, 1), (ext, 1)])?);

        let mut wavefront = Wavefront::new(lo, hi);
        for (source, origin) in [
            (ext, Origin::ExtendInsertion),
            (open, Origin::OpenInsertion),
        ] {
            for (k, cell) in source.into_iter().flat_map(|wf| wf.iter()) {
                let h = cell.offset + 1;
                if self.pair.in_bounds(h - (k + 1), h) {
                    wavefront.offer(k + 1, Cell::new(h, origin));
                }
            }
        }
        wavefront.trimmed()
    }

    fn deletions(&self, score: usize, history: &WavefrontHistory) -> Option<Wavefront> {
        let open = history
            .behind(score, self.penalties.gap_first())
            .and_then(|set| set.m.as_ref());
        let ext = history
            .behind(score, self.penalties.gap_extend())
            .and_then(|set| set.d.as_ref());
        let (lo, hi) = self.clamp(band(&[(open, -1), (ext, -1)])?);

        let mut wavefront = Wavefront::new(lo, hi);
        for (source, origin) in [
            (ext, Origin::ExtendDeletion),
            (open, Origin::OpenDeletion),
        ] {
            for (k, cell) in source.into_iter().flat_map(|wf| wf.iter()) {
                let h = cell.offset;
                if self.pair.in_bounds(h - (k - 1), h) {
                    wavefront.offer(k - 1, Cell::new(h, origin));
                }
            }
        }
        wavefront.trimmed()
    }

    fn matches(
        &self,
        score: usize,
        history: &WavefrontHistory,
        insertions: Option<&Wavefront>,
        deletions: Option<&Wavefront>,
    ) -> Option<Wavefront> {
        // A free substitution is already taken by extension.
        let mismatch = self.penalties.mismatch();
        let sub = if mismatch > 0 {
            history
                .behind(score, mismatch)
                .and_then(|set| set.m.as_ref())
        } else {
            None
        };
        let (lo, hi) = self.clamp(band(&[(sub, 0), (insertions, 0), (deletions, 0)])?);

        let mut wavefront = Wavefront::new(lo, hi);
        for (k, cell) in sub.into_iter().flat_map(|wf| wf.iter()) {
            let h = cell.offset + 1;
            if self.pair.in_bounds(h - k, h) {
                wavefront.offer(k, Cell::new(h, Origin::Mismatch));
            }
        }
        for (source, origin) in [
            (insertions, Origin::CloseInsertion),
            (deletions, Origin::CloseDeletion),
        ] {
            for (k, cell) in source.into_iter().flat_map(|wf| wf.iter()) {
                wavefront.offer(k, Cell::new(cell.offset, origin));
            }
        }
        wavefront.trimmed()
    }
}
