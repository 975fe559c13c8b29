//! Order-plus-orientation encoding shared by the search strategies.
//!
//! `order` is a permutation of instance indices. `orientations[i]` is the
//! preferred orientation gene of instance `i`; the decoder maps it onto the
//! instance's resolved orientation list modulo its length, so every gene in
//! `0..ORIENTATION_GENES` is valid for every instance.

use crate::ga::Individual;
use rand::prelude::*;

/// Number of distinct orientation gene values.
pub const ORIENTATION_GENES: usize = 6;

/// A placement order with a preferred orientation per instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingSequence {
    /// Instance indices in placement order.
    pub order: Vec<usize>,
    /// Preferred orientation gene, indexed by instance.
    pub orientations: Vec<usize>,
    fitness: f64,
}

impl PackingSequence {
    /// Creates a sequence from an order, every orientation gene at 0.
    pub fn from_order(order: Vec<usize>) -> Self {
        let n = order.len();
        Self {
            order,
            orientations: vec![0; n],
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Creates a sequence from explicit parts.
    pub fn new(order: Vec<usize>, orientations: Vec<usize>) -> Self {
        Self {
            order,
            orientations,
            fitness: f64::NEG_INFINITY,
        }
    }

    /// Creates a shuffled sequence with random orientation genes.
    pub fn random<R: Rng>(size: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..size).collect();
        order.shuffle(rng);
        let orientations = (0..size)
            .map(|_| rng.gen_range(0..ORIENTATION_GENES))
            .collect();
        Self::new(order, orientations)
    }

    /// Returns the cached fitness (`-inf` until evaluated).
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Caches the fitness.
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Returns the number of instances.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Order crossover (OX1): a slice of `self` is kept in place and the
    /// remaining positions are filled in `other`'s order. Orientation genes
    /// are inherited uniformly.
    pub fn order_crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        let n = self.order.len();
        if n < 2 {
            return self.clone();
        }

        let (mut p1, mut p2) = (rng.gen_range(0..n), rng.gen_range(0..n));
        if p1 > p2 {
            std::mem::swap(&mut p1, &mut p2);
        }

        let mut child = vec![usize::MAX; n];
        let mut used = vec![false; n];
        for i in p1..=p2 {
            child[i] = self.order[i];
            used[self.order[i]] = true;
        }

        let mut donor = other.order.iter().cycle().skip((p2 + 1) % n);
        for offset in 0..n {
            let slot = (p2 + 1 + offset) % n;
            if child[slot] != usize::MAX {
                continue;
            }
            for &gene in donor.by_ref() {
                if !used[gene] {
                    child[slot] = gene;
                    used[gene] = true;
                    break;
                }
            }
        }

        let orientations = self
            .orientations
            .iter()
            .zip(&other.orientations)
            .map(|(a, b)| if rng.gen() { *a } else { *b })
            .collect();

        Self::new(child, orientations)
    }

    /// Swaps two random positions of the order.
    pub fn swap_mutate<R: Rng>(&mut self, rng: &mut R) {
        if self.order.len() < 2 {
            return;
        }
        let i = rng.gen_range(0..self.order.len());
        let j = rng.gen_range(0..self.order.len());
        self.order.swap(i, j);
        self.fitness = f64::NEG_INFINITY;
    }

    /// Re-draws the orientation gene of one random instance.
    pub fn orientation_mutate<R: Rng>(&mut self, rng: &mut R) {
        if self.orientations.is_empty() {
            return;
        }
        let idx = rng.gen_range(0..self.orientations.len());
        self.orientations[idx] = rng.gen_range(0..ORIENTATION_GENES);
        self.fitness = f64::NEG_INFINITY;
    }

    /// Moves one element of the order to a new position.
    pub fn relocate<R: Rng>(&mut self, rng: &mut R) {
        let n = self.order.len();
        if n < 2 {
            return;
        }
        let from = rng.gen_range(0..n);
        let to = rng.gen_range(0..n);
        if from != to {
            let elem = self.order.remove(from);
            self.order.insert(to, elem);
        }
        self.fitness = f64::NEG_INFINITY;
    }

    /// Reverses a random segment of the order.
    pub fn invert<R: Rng>(&mut self, rng: &mut R) {
        let n = self.order.len();
        if n < 2 {
            return;
        }
        let (mut p1, mut p2) = (rng.gen_range(0..n), rng.gen_range(0..n));
        if p1 > p2 {
            std::mem::swap(&mut p1, &mut p2);
        }
        self.order[p1..=p2].reverse();
        self.fitness = f64::NEG_INFINITY;
    }

    /// Returns true if `order` is a permutation of `0..len`.
    pub fn is_valid(&self) -> bool {
        let mut seen = vec![false; self.order.len()];
        self.orientations.len() == self.order.len()
            && self.order.iter().all(|&i| {
                i < seen.len() && !std::mem::replace(&mut seen[i], true)
            })
    }
}

impl Individual for PackingSequence {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn crossover<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        self.order_crossover(other, rng)
    }

    fn mutate<R: Rng>(&mut self, rng: &mut R) {
        if rng.gen::<bool>() {
            self.swap_mutate(rng);
        } else {
            self.orientation_mutate(rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn test_crossover_yields_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let a = PackingSequence::random(12, &mut rng);
            let b = PackingSequence::random(12, &mut rng);
            let child = a.order_crossover(&b, &mut rng);
            assert!(child.is_valid());
        }
    }

    #[test]
    fn test_crossover_keeps_identical_parents() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = PackingSequence::from_order(vec![3, 1, 0, 2]);
        let child = a.order_crossover(&a, &mut rng);
        assert_eq!(child.order, a.order);
    }

    #[test]
    fn test_mutations_preserve_validity() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seq = PackingSequence::random(9, &mut rng);
        for _ in 0..100 {
            seq.swap_mutate(&mut rng);
            seq.relocate(&mut rng);
            seq.invert(&mut rng);
            seq.orientation_mutate(&mut rng);
            assert!(seq.is_valid());
        }
        assert!(seq.orientations.iter().all(|&g| g < ORIENTATION_GENES));
    }

    #[test]
    fn test_is_valid_rejects_duplicates() {
        assert!(!PackingSequence::from_order(vec![0, 0, 1]).is_valid());
        assert!(PackingSequence::from_order(vec![]).is_valid());
    }
}
