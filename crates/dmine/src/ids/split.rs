//! Seeded random partitioning of identifiers into blocks.

use rand::prelude::*;

use crate::{Error, Result};

use super::{ArrayDbIds, DbIds};

/// Randomly splits `ids` into `blocks` disjoint arrays whose sizes differ by at most one.
///
/// The identifiers are shuffled with an RNG seeded by `seed` and then cut into consecutive slices. The first `n mod blocks` slices hold one extra identifier.
/// The result is fully determined by the iteration order of `ids`, `blocks` and `seed`.
///
/// # Errors
///
/// - If `blocks < 2`.
/// - If `blocks` exceeds the number of identifiers, which would force empty blocks.
pub fn random_split<D: DbIds>(ids: &D, blocks: usize, seed: u64) -> Result<Vec<ArrayDbIds>> {
    let n = ids.len();
    if blocks < 2 {
        return Err(Error::InvalidConfiguration(format!("Need at least two blocks, got {blocks}")));
    }
    if blocks > n {
        return Err(Error::InvalidConfiguration(format!("Cannot split {n} identifiers into {blocks} non-empty blocks")));
    }

    let mut shuffled = ArrayDbIds::from_ids(ids);
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.as_mut_slice().shuffle(&mut rng);

    let (min_size, extra) = (n / blocks, n % blocks);
    let mut start = 0;
    let parts = (0..blocks)
        .map(|b| {
            let size = min_size + usize::from(b < extra);
            let part = shuffled.slice(start, start + size);
            start += size;
            part
        })
        .collect::<Vec<_>>();

    ftlog::debug!("Split {n} identifiers into {blocks} blocks of size {min_size} or {}", min_size + 1);
    Ok(parts)
}
