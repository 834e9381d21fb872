//! Age-weight clause selection
//!
//! The passive queue is drained by the classic age/weight ratio: pick
//! the lightest clause `weight` times, then the oldest once, and repeat.
//! Tie-breaks go to the smallest clause id, so selection is a pure
//! function of the inserted identities and the configured ratio.

use indexmap::IndexMap;

/// Priority queue over passive clauses keyed by age and weight.
#[derive(Debug)]
pub struct AgeWeightQueue {
    /// (age picks, weight picks) per cycle
    ratio: (u32, u32),
    /// Position within the current cycle
    counter: u32,
    /// Passive clauses: id -> (age, weight), insertion-ordered
    entries: IndexMap<usize, (u32, u32)>,
}

impl AgeWeightQueue {
    pub fn new(ratio: (u32, u32)) -> Self {
        let ratio = if ratio.0 == 0 && ratio.1 == 0 {
            (1, 1)
        } else {
            ratio
        };
        AgeWeightQueue {
            ratio,
            counter: 0,
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, clause: usize, age: u32, weight: u32) {
        self.entries.insert(clause, (age, weight));
    }

    pub fn remove(&mut self, clause: usize) {
        self.entries.shift_remove(&clause);
    }

    pub fn contains(&self, clause: usize) -> bool {
        self.entries.contains_key(&clause)
    }

    /// Pop the next given clause according to the ratio schedule.
    pub fn select(&mut self) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let (age_picks, weight_picks) = self.ratio;
        let by_weight = self.counter < weight_picks;
        self.counter += 1;
        if self.counter >= age_picks + weight_picks {
            self.counter = 0;
        }

        let chosen = if by_weight {
            self.entries
                .iter()
                .min_by_key(|(&id, &(_, weight))| (weight, id))
                .map(|(&id, _)| id)
        } else {
            self.entries
                .iter()
                .min_by_key(|(&id, &(age, _))| (age, id))
                .map(|(&id, _)| id)
        };
        let id = chosen?;
        self.entries.shift_remove(&id);
        Some(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_then_age() {
        // ratio 1:1 alternates lightest, oldest
        let mut queue = AgeWeightQueue::new((1, 1));
        queue.insert(0, 0, 10); // old, heavy
        queue.insert(1, 5, 2); // young, light
        queue.insert(2, 1, 7);

        assert_eq!(queue.select(), Some(1)); // lightest
        assert_eq!(queue.select(), Some(0)); // oldest
        assert_eq!(queue.select(), Some(2));
        assert_eq!(queue.select(), None);
    }

    #[test]
    fn test_weight_ratio_dominates() {
        // ratio 1:3 picks by weight three times before one age pick
        let mut queue = AgeWeightQueue::new((1, 3));
        for i in 0..4 {
            queue.insert(i, i as u32, 100 - i as u32);
        }
        // Weight order: 3, 2, 1 then age pick: 0
        assert_eq!(queue.select(), Some(3));
        assert_eq!(queue.select(), Some(2));
        assert_eq!(queue.select(), Some(1));
        assert_eq!(queue.select(), Some(0));
    }

    #[test]
    fn test_tie_break_by_id() {
        let mut queue = AgeWeightQueue::new((0, 1));
        queue.insert(7, 0, 5);
        queue.insert(3, 0, 5);
        assert_eq!(queue.select(), Some(3));
        assert_eq!(queue.select(), Some(7));
    }

    #[test]
    fn test_remove() {
        let mut queue = AgeWeightQueue::new((1, 1));
        queue.insert(0, 0, 1);
        queue.insert(1, 1, 2);
        queue.remove(0);
        assert_eq!(queue.select(), Some(1));
        assert!(queue.is_empty());
    }
}
