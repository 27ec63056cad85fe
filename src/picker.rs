//! Weighted random selection
//!
//! The generators never iterate candidate lists directly; every choice goes
//! through a picker so that the PRNG stream is consumed in a fixed,
//! reproducible order. Same seed, same call sequence, same picks.

use rand::Rng;

/// A weighted bag of candidates.
///
/// Items are drawn with probability proportional to their weight among the
/// items still present. Candidate lists are rebuilt per retry rather than
/// mutated in place, so retry semantics stay well-defined.
#[derive(Clone, Debug)]
pub struct WeightedPicker<T> {
    entries: Vec<(T, i32)>,
    total: i64,
}

impl<T> WeightedPicker<T> {
    pub fn new() -> WeightedPicker<T> {
        WeightedPicker {
            entries: Vec::new(),
            total: 0,
        }
    }

    /// Adds a candidate. Non-positive weights are ignored.
    pub fn add(&mut self, item: T, weight: i32) {
        if weight <= 0 {
            return;
        }
        self.entries.push((item, weight));
        self.total += weight as i64;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Draws one candidate without removing it.
    pub fn pick<R: Rng>(&self, rng: &mut R) -> Option<&T> {
        let index = self.pick_index(rng)?;
        Some(&self.entries[index].0)
    }

    /// Draws one candidate and removes it from the bag.
    pub fn pick_remove<R: Rng>(&mut self, rng: &mut R) -> Option<T> {
        let index = self.pick_index(rng)?;
        let (item, weight) = self.entries.remove(index);
        self.total -= weight as i64;
        Some(item)
    }

    fn pick_index<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let mut roll = rng.gen_range(0..self.total);
        for (index, (_, weight)) in self.entries.iter().enumerate() {
            roll -= *weight as i64;
            if roll < 0 {
                return Some(index);
            }
        }
        // Unreachable as long as total matches the entries.
        Some(self.entries.len() - 1)
    }
}

impl<T> Default for WeightedPicker<T> {
    fn default() -> WeightedPicker<T> {
        WeightedPicker::new()
    }
}
