//! Injectable randomness for question selection and choice shuffling.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Uniform draws in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Adapts any [`rand::Rng`] into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(R);

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngSource<ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl RngSource<StdRng> {
    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Index in `0..bound` from one draw. Draws outside `[0, 1)` are pinned to
/// the ends of the range.
fn pick_index<R: RandomSource + ?Sized>(rng: &mut R, bound: usize) -> usize {
    let scaled = rng.next_unit() * bound as f64;
    (scaled as usize).min(bound - 1)
}

/// Fisher-Yates, walking from the back. Every permutation is equally likely
/// given uniform draws.
pub fn shuffle_in_place<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = pick_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// `count` distinct entries of `items` in random order. A `count` at or
/// above the length gives a full shuffle.
pub fn sample_without_replacement<T: Clone, R: RandomSource + ?Sized>(
    items: &[T],
    count: usize,
    rng: &mut R,
) -> Vec<T> {
    let mut copy = items.to_vec();
    shuffle_in_place(&mut copy, rng);
    copy.truncate(count);
    copy
}

/// Replays a fixed list of draws, cycling when it runs out.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ScriptedSource {
    draws: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty());
        Self {
            draws: draws.to_vec(),
            next: 0,
        }
    }

    /// Draws that leave every shuffle in its original order.
    pub(crate) fn identity() -> Self {
        Self::new(&[0.999_999])
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}
