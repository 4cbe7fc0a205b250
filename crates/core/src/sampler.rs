use rand::Rng;

/// In-place Fisher–Yates shuffle driven by the caller's random source.
///
/// Walks from the last index down to 1 and swaps each slot with a uniformly
/// chosen slot in `0..=i`. Passing a seeded RNG makes the permutation
/// reproducible.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Draws an exam-sized set from already-filtered candidates.
///
/// Returns `min(count, candidates.len())` items. A short bank yields fewer
/// questions rather than an error.
#[must_use]
pub fn sample<T, R: Rng + ?Sized>(mut candidates: Vec<T>, count: usize, rng: &mut R) -> Vec<T> {
    shuffle(&mut candidates, rng);
    candidates.truncate(count);
    candidates
}
