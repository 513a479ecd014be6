//! Extension of M wavefronts along matching diagonals.

use crate::{sequence::SequencePair, wavefront::Wavefront};

/// Slide every diagonal of an M wavefront forward over free steps.
///
/// Stops at the first costly step or at the end of either sequence.
/// Only offsets change; provenance is kept.
pub fn extend(wavefront: &mut Wavefront, pair: &SequencePair) {
    let (n, m) = (pair.n(), pair.m());
    for (k, cell) in wavefront.iter_mut() {
        let mut h = cell.offset;
        let mut v = h - k;
        while v < n && h < m && pair.free_step(v, h) {
            v += 1;
            h += 1;
        }
        cell.offset = h;
    }
}

/// Whether the M wavefront reached the bottom-right corner.
pub fn reaches_end(wavefront: &Wavefront, pair: &SequencePair) -> bool {
    let k = pair.end_diagonal();
    wavefront
        .offset(k)
        .map_or(false, |h| pair.is_end(k, h))
}
