//! # Deterministic parallel map
//!
//! Broadcasts a per-element function over a batch on rayon. Each element `i`
//! receives `fork.child(i)` as its generator, and results are written back in
//! input order, so the output is identical whether the batch runs on one
//! thread, many threads, or sequentially below the parallel threshold.

use rayon::prelude::*;

use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// Batches smaller than this run sequentially.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 32;

/// Maps `f` over `items` with one forked generator per element.
///
/// The phase generator is advanced exactly once, regardless of batch size.
pub fn map_forked<T, U, F>(items: Vec<T>, rng: &mut RandomNumberGenerator, f: F) -> Result<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(usize, T, &mut RandomNumberGenerator) -> Result<U> + Sync + Send,
{
    map_forked_with_threshold(items, rng, DEFAULT_PARALLEL_THRESHOLD, f)
}

/// Same as [`map_forked`] with an explicit sequential/parallel threshold.
pub fn map_forked_with_threshold<T, U, F>(
    items: Vec<T>,
    rng: &mut RandomNumberGenerator,
    parallel_threshold: usize,
    f: F,
) -> Result<Vec<U>>
where
    T: Send,
    U: Send,
    F: Fn(usize, T, &mut RandomNumberGenerator) -> Result<U> + Sync + Send,
{
    let fork = rng.fork();

    if items.len() >= parallel_threshold {
        items
            .into_par_iter()
            .enumerate()
            .map(|(index, item)| {
                let mut child = fork.child(index);
                f(index, item, &mut child)
            })
            .collect()
    } else {
        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                let mut child = fork.child(index);
                f(index, item, &mut child)
            })
            .collect()
    }
}
