// ============================================================
// Layer 4 — Sampler and Train/Test Splitter
// ============================================================
// Two steps run on the loaded records, in this order:
//
//   1. sample_without_replacement — draw a fixed-size random
//      subset of the full CSV (default 80 000 rows)
//   2. split_train_test — shuffle and cut into disjoint train
//      and test partitions (default 20% test)
//
// Both take the RNG as an argument. The training use case seeds
// one StdRng per stage, so a given seed always produces the same
// sample and the same split.

use rand::{seq::index, seq::SliceRandom, Rng};

/// Draw `amount` items without replacement, in random order.
///
/// If `amount` exceeds the number of items, every item is returned
/// (shuffled).
pub fn sample_without_replacement<T, R: Rng + ?Sized>(
    items:  Vec<T>,
    amount: usize,
    rng:    &mut R,
) -> Vec<T> {
    let total  = items.len();
    let amount = amount.min(total);

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let picked: Vec<T> = index::sample(rng, total, amount)
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();

    tracing::debug!("Sampled {} of {} records", picked.len(), total);
    picked
}

/// Shuffle `samples` and split into (train, test).
///
/// The test partition gets `ceil(len * test_fraction)` items,
/// the training partition the rest.
pub fn split_train_test<T, R: Rng + ?Sized>(
    mut samples:   Vec<T>,
    test_fraction: f64,
    rng:           &mut R,
) -> (Vec<T>, Vec<T>) {
    samples.shuffle(rng);

    let total    = samples.len();
    let test_len = ((total as f64) * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    let test_len = test_len.min(total);

    // split_off(n) leaves [0..n) in `samples` and returns [n..)
    let train = samples.split_off(test_len);
    let test  = samples;

    tracing::debug!(
        "Dataset split: {} training, {} test",
        train.len(),
        test.len(),
    );

    (train, test)
}
