//! Band pruning heuristic.

use crate::wavefront::{Wavefront, WavefrontSet};

/// Opt-in band pruning.
///
/// **Results are no longer guaranteed optimal.** After extension, once the M
/// wavefront spans at least `min_wavefront_length` diagonals, each diagonal
/// whose anti-diagonal progress `v + h` trails the best by more than
/// `max_distance` is dropped from M, I and D. The leading diagonal always
/// survives, so the alignment still completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandHeuristic {
    /// Do not prune narrower wavefronts.
    pub min_wavefront_length: usize,
    /// Largest lag behind the leading diagonal that is tolerated.
    pub max_distance: usize,
}

impl Default for BandHeuristic {
    fn default() -> Self {
        BandHeuristic {
            min_wavefront_length: 10,
            max_distance: 50,
        }
    }
}

/// Anti-diagonal index of offset `h` on diagonal `k`, i.e. `v + h`.
#[inline]
fn progress(k: i32, h: i32) -> i64 {
    2 * i64::from(h) - i64::from(k)
}

impl BandHeuristic {
    /// Prune one freshly extended level. Returns the number of diagonals dropped.
    ///
    /// I and D cells go with their M cell: M absorbs them at the same level, so
    /// a surviving M cell never points at a dropped one.
    pub fn prune(&self, set: &mut WavefrontSet) -> usize {
        let Some(m) = set.m.as_ref() else {
            return 0;
        };
        if m.len() < self.min_wavefront_length {
            return 0;
        }
        let Some(best) = m.iter().map(|(k, cell)| progress(k, cell.offset)).max() else {
            return 0;
        };
        let cutoff = best - self.max_distance as i64;
        let lagging: Vec<i32> = m
            .iter()
            .filter(|(k, cell)| progress(*k, cell.offset) < cutoff)
            .map(|(k, _)| k)
            .collect();
        if lagging.is_empty() {
            return 0;
        }

        for wavefront in [&mut set.m, &mut set.i, &mut set.d]
            .into_iter()
            .flatten()
        {
            for &k in &lagging {
                wavefront.clear(k);
            }
        }
        set.m = set.m.take().and_then(Wavefront::trimmed);
        set.i = set.i.take().and_then(Wavefront::trimmed);
        set.d = set.d.take().and_then(Wavefront::trimmed);

        lagging.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wavefront::{Cell, Origin};

    fn level(offsets: &[(i32, i32)]) -> WavefrontSet {
        let lo = offsets.iter().map(|(k, _)| *k).min().unwrap();
        let hi = offsets.iter().map(|(k, _)| *k).max().unwrap();
        let mut m = Wavefront::new(lo, hi);
        let mut i = Wavefront::new(lo, hi);
        for &(k, h) in offsets {
            m.offer(k, Cell::new(h, Origin::Mismatch));
            i.offer(k, Cell::new(h, Origin::OpenInsertion));
        }
        WavefrontSet {
            m: Some(m),
            i: Some(i),
            d: None,
        }
    }

    #[test]
    fn test_prune_lagging_diagonals() {
        let heuristic = BandHeuristic {
            min_wavefront_length: 1,
            max_distance: 4,
        };
        // Progress: k=-2 -> 2, k=-1 -> 21, k=0 -> 20, k=1 -> 19, k=2 -> 6.
        let mut set = level(&[(-2, 0), (-1, 10), (0, 10), (1, 10), (2, 4)]);
        assert_eq!(heuristic.prune(&mut set), 2);

        let m = set.m.as_ref().unwrap();
        assert_eq!((m.lo(), m.hi()), (-1, 1));
        let i = set.i.as_ref().unwrap();
        assert_eq!(i.offset(-2), None);
        assert_eq!(i.offset(0), Some(10));
    }

    #[test]
    fn test_narrow_wavefront_untouched() {
        let heuristic = BandHeuristic {
            min_wavefront_length: 10,
            max_distance: 0,
        };
        let mut set = level(&[(-1, 0), (0, 9), (1, 2)]);
        let before = set.clone();
        assert_eq!(heuristic.prune(&mut set), 0);
        assert_eq!(set, before);
    }

    #[test]
    fn test_leader_survives_zero_distance() {
        let heuristic = BandHeuristic {
            min_wavefront_length: 1,
            max_distance: 0,
        };
        let mut set = level(&[(-1, 3), (0, 7), (1, 5)]);
        assert_eq!(heuristic.prune(&mut set), 2);
        let m = set.m.unwrap();
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![(0, Cell::new(7, Origin::Mismatch))]);
    }
}
