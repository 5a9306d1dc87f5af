//! Per-tree column (feature) sampling.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Samples the features considered by each tree.
///
/// Each tree keeps `max(1, floor(ratio · n_features))` features chosen
/// uniformly without replacement. The RNG is seeded once, so the sequence
/// of samples is reproducible for a given seed.
#[derive(Debug, Clone)]
pub struct ColSampler {
    n_features: usize,
    colsample_bytree: f64,
    rng: Xoshiro256PlusPlus,
    tree_features: Vec<usize>,
}

impl ColSampler {
    pub fn new(n_features: usize, colsample_bytree: f64, seed: u64) -> Self {
        Self {
            n_features,
            colsample_bytree,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            tree_features: (0..n_features).collect(),
        }
    }

    /// Returns true if column sampling is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.colsample_bytree < 1.0
    }

    /// Number of features each tree keeps.
    pub fn sample_size(&self) -> usize {
        if !self.is_enabled() {
            return self.n_features;
        }
        ((self.n_features as f64 * self.colsample_bytree).floor() as usize)
            .max(1)
            .min(self.n_features)
    }

    /// Sample features for a new tree (sorted ascending).
    pub fn sample_for_tree(&mut self) -> &[usize] {
        let k = self.sample_size();
        if k < self.n_features {
            let mut features = rand::seq::index::sample(&mut self.rng, self.n_features, k).into_vec();
            features.sort_unstable();
            self.tree_features = features;
        }
        &self.tree_features
    }

    /// Features selected for the current tree.
    pub fn tree_features(&self) -> &[usize] {
        &self.tree_features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_ratio_keeps_all_features() {
        let mut sampler = ColSampler::new(5, 1.0, 7);
        assert!(!sampler.is_enabled());
        assert_eq!(sampler.sample_for_tree(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ColSampler::new(20, 0.6, 42);
        let mut b = ColSampler::new(20, 0.6, 42);
        for _ in 0..5 {
            assert_eq!(a.sample_for_tree().to_vec(), b.sample_for_tree().to_vec());
        }
    }

    #[test]
    fn keeps_at_least_one_feature() {
        let mut sampler = ColSampler::new(3, 0.1, 1);
        assert_eq!(sampler.sample_size(), 1);
        assert_eq!(sampler.sample_for_tree().len(), 1);
    }

    proptest! {
        #[test]
        fn samples_are_sorted_unique_and_in_range(
            n in 1usize..50,
            ratio in 0.01f64..1.0,
            seed in any::<u64>(),
        ) {
            let mut sampler = ColSampler::new(n, ratio, seed);
            let expected = sampler.sample_size();
            let features = sampler.sample_for_tree().to_vec();
            prop_assert_eq!(features.len(), expected);
            prop_assert!(features.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(features.iter().all(|&f| f < n));
        }
    }
}
