//! Random-key encoding.
//!
//! A vector of keys in `[0, 1)` that decodes into a permutation (argsort)
//! and discrete choices (bucketing), so continuous optimisers can search
//! over orders and orientations.

use rand::prelude::*;

/// A random-key vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomKeys {
    /// The keys, each in `[0, 1)`.
    pub keys: Vec<f64>,
}

impl RandomKeys {
    /// Creates a vector of uniformly random keys.
    pub fn random<R: Rng>(len: usize, rng: &mut R) -> Self {
        Self {
            keys: (0..len).map(|_| rng.gen::<f64>()).collect(),
        }
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Clamps every key into `[0, 1)`.
    pub fn clamp(&mut self) {
        for key in &mut self.keys {
            *key = key.clamp(0.0, 0.999_999_9);
        }
    }

    /// Decodes `keys[range]` as a permutation of `0..range.len()` by
    /// sorting indices on key value (ties keep index order).
    pub fn decode_as_permutation(&self, range: std::ops::Range<usize>) -> Vec<usize> {
        let slice = &self.keys[range];
        let mut indices: Vec<usize> = (0..slice.len()).collect();
        indices.sort_by(|&a, &b| {
            slice[a]
                .partial_cmp(&slice[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        indices
    }

    /// Decodes one key as a choice among `num_options`.
    pub fn decode_as_discrete(&self, key_idx: usize, num_options: usize) -> usize {
        if key_idx >= self.keys.len() || num_options == 0 {
            return 0;
        }
        let key = self.keys[key_idx].clamp(0.0, 0.999_999_9);
        (key * num_options as f64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_as_permutation() {
        let keys = RandomKeys {
            keys: vec![0.9, 0.1, 0.5, 0.3, 0.7],
        };
        assert_eq!(keys.decode_as_permutation(0..3), vec![1, 2, 0]);
        assert_eq!(keys.decode_as_permutation(2..5), vec![1, 0, 2]);
    }

    #[test]
    fn test_decode_as_discrete() {
        let keys = RandomKeys {
            keys: vec![0.0, 0.5, 0.99, 1.5],
        };
        assert_eq!(keys.decode_as_discrete(0, 6), 0);
        assert_eq!(keys.decode_as_discrete(1, 6), 3);
        assert_eq!(keys.decode_as_discrete(2, 6), 5);
        assert_eq!(keys.decode_as_discrete(3, 6), 5);
        assert_eq!(keys.decode_as_discrete(9, 6), 0);
    }

    #[test]
    fn test_clamp() {
        let mut keys = RandomKeys {
            keys: vec![-0.5, 2.0],
        };
        keys.clamp();
        assert!(keys.keys.iter().all(|k| (0.0..1.0).contains(k)));
    }
}
