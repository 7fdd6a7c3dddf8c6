//! Bounded ranking
//!
//! Insertion sort into a fixed-capacity list, strongest first. An entry only moves
//! ahead of entries it is strictly greater than, so equal values keep the order in
//! which they were offered.

use heapless::Vec;

/// A value together with the sensor index it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "firmware", derive(defmt::Format))]
pub struct Ranked<T> {
    pub value: T,
    pub index: usize,
}

/// Descending list holding at most `N` entries
#[derive(Debug, Clone)]
pub struct Ranking<T, const N: usize> {
    entries: Vec<Ranked<T>, N>,
}

impl<T: Copy + PartialOrd, const N: usize> Default for Ranking<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + PartialOrd, const N: usize> Ranking<T, N> {
    /// Creates an empty ranking
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Ranks every value of a slice, using its position as the index
    pub fn from_values(values: &[T]) -> Self {
        let mut ranking = Self::new();
        for (index, &value) in values.iter().enumerate() {
            ranking.insert(value, index);
        }
        ranking
    }

    /// Offers a value to the ranking
    ///
    /// The value lands in front of the first entry it is strictly greater than.
    /// When the list is full the weakest entry falls off the end; a value that
    /// would land behind every entry of a full list is dropped.
    pub fn insert(&mut self, value: T, index: usize) {
        let position = self
            .entries
            .iter()
            .position(|entry| value > entry.value)
            .unwrap_or(self.entries.len());

        if position >= N {
            return;
        }
        if self.entries.is_full() {
            self.entries.pop();
        }
        // Cannot fail: there is room after the pop above
        let _ = self.entries.insert(position, Ranked { value, index });
    }

    /// Entries, strongest first
    pub fn entries(&self) -> &[Ranked<T>] {
        &self.entries
    }

    /// The strongest entry
    pub fn top(&self) -> Option<Ranked<T>> {
        self.entries.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_descending() {
        let ranking: Ranking<u16, 5> = Ranking::from_values(&[3, 9, 1, 7, 5]);
        let values: std::vec::Vec<u16> = ranking.entries().iter().map(|e| e.value).collect();
        assert_eq!(values, [9, 7, 5, 3, 1]);
        assert_eq!(ranking.top().map(|e| e.index), Some(1));
    }

    #[test]
    fn ties_keep_lower_index_first() {
        let ranking: Ranking<u16, 4> = Ranking::from_values(&[4, 8, 8, 4]);
        let indexes: std::vec::Vec<usize> = ranking.entries().iter().map(|e| e.index).collect();
        assert_eq!(indexes, [1, 2, 0, 3]);
    }

    #[test]
    fn full_list_drops_weakest() {
        let mut ranking: Ranking<u16, 2> = Ranking::new();
        ranking.insert(1, 0);
        ranking.insert(2, 1);
        ranking.insert(3, 2);
        ranking.insert(1, 3);
        let indexes: std::vec::Vec<usize> = ranking.entries().iter().map(|e| e.index).collect();
        assert_eq!(indexes, [2, 1]);
    }
}
