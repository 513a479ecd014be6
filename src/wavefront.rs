//! Wavefront storage.
//!
//! A [`Wavefront`] holds the furthest offset reached on each diagonal of a
//! contiguous band `lo..=hi` for one component at one score. Diagonals are
//! signed; cells live in a plain vector indexed by `k - lo`.
//!
//! [`WavefrontHistory`] is the append-only, score-indexed sequence of
//! [`WavefrontSet`]s. Levels can be dropped to bound memory and reinserted
//! when the backtrace re-derives them.

/// Alignment component a wavefront belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    /// Last move was a match or a mismatch.
    M,
    /// Inside a gap in `seq1` (consumes `seq2`).
    I,
    /// Inside a gap in `seq2` (consumes `seq1`).
    D,
}

/// Recurrence that produced a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// `M[0][0]`.
    Start,
    /// `M[s][k]` from `M[s - x][k]` plus one substitution.
    Mismatch,
    /// `M[s][k]` taken from `I[s][k]`.
    CloseInsertion,
    /// `M[s][k]` taken from `D[s][k]`.
    CloseDeletion,
    /// `I[s][k]` from `M[s - o - e][k - 1]`.
    OpenInsertion,
    /// `I[s][k]` from `I[s - e][k - 1]`.
    ExtendInsertion,
    /// `D[s][k]` from `M[s - o - e][k + 1]`.
    OpenDeletion,
    /// `D[s][k]` from `D[s - e][k + 1]`.
    ExtendDeletion,
}

/// Furthest offset on a diagonal and how it was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Column reached. The row is `offset - k`.
    pub offset: i32,
    /// Recurrence that produced it.
    pub origin: Origin,
}

impl Cell {
    /// Cell at `offset` produced by `origin`.
    pub fn new(offset: i32, origin: Origin) -> Self {
        Cell { offset, origin }
    }
}

/// Offsets of one component at one score, over diagonals `lo..=hi`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wavefront {
    lo: i32,
    hi: i32,
    cells: Vec<Option<Cell>>,
}

impl Wavefront {
    /// Allocate an unreached band. `lo > hi` yields an empty wavefront.
    pub fn new(lo: i32, hi: i32) -> Self {
        let len = if hi >= lo { (hi - lo + 1) as usize } else { 0 };
        Wavefront {
            lo,
            hi,
            cells: vec![None; len],
        }
    }

    /// Lowest diagonal of the band.
    pub fn lo(&self) -> i32 {
        self.lo
    }

    /// Highest diagonal of the band.
    pub fn hi(&self) -> i32 {
        self.hi
    }

    /// Number of diagonals in the band.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// No diagonal reached.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    #[inline]
    fn index(&self, k: i32) -> Option<usize> {
        if k < self.lo || k > self.hi {
            None
        } else {
            Some((k - self.lo) as usize)
        }
    }

    /// Cell on diagonal `k`, if reached.
    #[inline]
    pub fn get(&self, k: i32) -> Option<Cell> {
        self.index(k).and_then(|idx| self.cells[idx])
    }

    /// Offset on diagonal `k`, if reached.
    #[inline]
    pub fn offset(&self, k: i32) -> Option<i32> {
        self.get(k).map(|cell| cell.offset)
    }

    /// Keep `cell` on diagonal `k` only if it goes strictly further than what is there.
    /// Earlier offers win ties, so callers offer in priority order.
    ///
    /// Diagonals outside the band are ignored.
    #[inline]
    pub fn offer(&mut self, k: i32, cell: Cell) -> bool {
        let Some(idx) = self.index(k) else {
            return false;
        };
        match self.cells[idx] {
            Some(current) if current.offset >= cell.offset => false,
            _ => {
                self.cells[idx] = Some(cell);
                true
            }
        }
    }

    /// Forget diagonal `k`.
    pub fn clear(&mut self, k: i32) {
        if let Some(idx) = self.index(k) {
            self.cells[idx] = None;
        }
    }

    /// Reached diagonals in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, Cell)> + '_ {
        let lo = self.lo;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, cell)| cell.map(|cell| (lo + idx as i32, cell)))
    }

    /// Reached diagonals in ascending order, mutable.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (i32, &mut Cell)> + '_ {
        let lo = self.lo;
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(move |(idx, cell)| cell.as_mut().map(|cell| (lo + idx as i32, cell)))
    }

    /// Shrink the band to its outermost reached diagonals.
    /// Returns `None` if nothing is left.
    pub fn trimmed(mut self) -> Option<Self> {
        let first = self.cells.iter().position(Option::is_some)?;
        let last = self.cells.iter().rposition(Option::is_some)?;
        self.cells.truncate(last + 1);
        self.cells.drain(..first);
        self.lo += first as i32;
        self.hi = self.lo + self.cells.len() as i32 - 1;
        Some(self)
    }
}

/// The M, I and D wavefronts of one score level. Absent components were never reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WavefrontSet {
    /// Match/mismatch component.
    pub m: Option<Wavefront>,
    /// Insertion component.
    pub i: Option<Wavefront>,
    /// Deletion component.
    pub d: Option<Wavefront>,
}

impl WavefrontSet {
    /// Wavefront of one component.
    pub fn component(&self, component: Component) -> Option<&Wavefront> {
        match component {
            Component::M => self.m.as_ref(),
            Component::I => self.i.as_ref(),
            Component::D => self.d.as_ref(),
        }
    }

    /// Nothing reached at this score.
    pub fn is_empty(&self) -> bool {
        self.m.is_none() && self.i.is_none() && self.d.is_none()
    }
}

/// Score-indexed wavefront sets. `None` slots were dropped (or never stored).
#[derive(Debug, Default)]
pub struct WavefrontHistory {
    levels: Vec<Option<WavefrontSet>>,
    retained: usize,
    peak_retained: usize,
}

impl WavefrontHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of levels computed so far; the next level to push is `len()`.
    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }

    /// Append the set for score `len()`.
    pub fn push(&mut self, set: WavefrontSet) {
        self.levels.push(Some(set));
        self.note_retained();
    }

    /// Put back a previously dropped level.
    pub fn restore(&mut self, score: usize, set: WavefrontSet) {
        if let Some(slot) = self.levels.get_mut(score) {
            if slot.is_none() {
                self.retained += 1;
            }
            *slot = Some(set);
            self.peak_retained = self.peak_retained.max(self.retained);
        }
    }

    /// Release a level.
    pub fn drop_level(&mut self, score: usize) {
        if let Some(slot) = self.levels.get_mut(score) {
            if slot.take().is_some() {
                self.retained -= 1;
            }
        }
    }

    /// Set at `score`, if retained.
    pub fn get(&self, score: usize) -> Option<&WavefrontSet> {
        self.levels.get(score).and_then(Option::as_ref)
    }

    /// Set at `score - back`, if that score exists and is retained.
    pub fn behind(&self, score: usize, back: u32) -> Option<&WavefrontSet> {
        score
            .checked_sub(back as usize)
            .and_then(|score| self.get(score))
    }

    /// Wavefront of `component` at `score`.
    pub fn wavefront(&self, score: usize, component: Component) -> Option<&Wavefront> {
        self.get(score).and_then(|set| set.component(component))
    }

    /// Whether the level at `score` is currently held.
    pub fn is_retained(&self, score: usize) -> bool {
        self.get(score).is_some()
    }

    /// Levels currently held.
    pub fn retained(&self) -> usize {
        self.retained
    }

    /// Most levels held at any one time.
    pub fn peak_retained(&self) -> usize {
        self.peak_retained
    }

    fn note_retained(&mut self) {
        self.retained += 1;
        self.peak_retained = self.peak_retained.max(self.retained);
    }
}
