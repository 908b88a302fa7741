//! Array-backed binary min-heap with a pluggable ordering.

use log::trace;
use thiserror::Error;

/// Capacity used by [`MinHeap::new`](MinHeap::new).
pub const DEFAULT_CAPACITY: usize = 100;

/// Error returned when the minimum is requested from an empty container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{container} is empty")]
pub struct EmptyContainerError {
    container: &'static str,
}

impl EmptyContainerError {
    /// Creates error for the container with the given name.
    pub fn new(container: &'static str) -> Self {
        Self { container }
    }

    /// Returns the name of the container which was empty.
    pub fn container(&self) -> &'static str {
        self.container
    }
}

/// Strict "is worse than" ordering used by [`MinHeap`].
///
/// `is_worse(a, b)` must return `true` iff `a` should be placed below `b` in the heap.
pub trait Comparator<T> {
    /// Returns `true` if `a` is strictly worse (i.e. must be extracted later) than `b`.
    fn is_worse(&self, a: &T, b: &T) -> bool;
}

/// Natural ordering: bigger values are worse, so the heap root is the smallest value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<T: PartialOrd> Comparator<T> for NaturalOrder {
    fn is_worse(&self, a: &T, b: &T) -> bool {
        a > b
    }
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn is_worse(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Generic binary min-heap.
///
/// The heap keeps its own logical capacity: it is doubled when an insertion finds the heap
/// full and halved when an extraction leaves it filled to one quarter.
pub struct MinHeap<T, C = NaturalOrder> {
    items: Vec<T>,
    capacity: usize,
    cmp: C,
}

impl<T: PartialOrd> MinHeap<T> {
    /// Creates empty heap with natural ordering and default capacity.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T: PartialOrd> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: PartialOrd> From<Vec<T>> for MinHeap<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items, NaturalOrder)
    }
}

impl<T, C: Comparator<T>> MinHeap<T, C> {
    /// Creates empty heap with the given ordering and default capacity.
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, cmp)
    }

    /// Creates empty heap with the given ordering and initial capacity.
    pub fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            cmp,
        }
    }

    /// Builds heap from an unordered sequence in linear time.
    pub fn from_vec(items: Vec<T>, cmp: C) -> Self {
        let capacity = items.len();
        let mut heap = Self { items, capacity, cmp };
        heap.heapify();
        debug_assert!(heap.is_valid());
        heap
    }

    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the heap has no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the current logical capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts new element.
    pub fn insert(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.resize((self.capacity * 2).max(1));
        }
        self.items.push(item);
        self.sift_up(self.items.len() - 1);
        debug_assert!(self.is_valid());
    }

    /// Returns the root element without removing it.
    pub fn peek_min(&self) -> Result<&T, EmptyContainerError> {
        self.items.first().ok_or(EmptyContainerError::new("heap"))
    }

    /// Removes and returns the root element.
    pub fn extract_min(&mut self) -> Result<T, EmptyContainerError> {
        if self.items.is_empty() {
            return Err(EmptyContainerError::new("heap"));
        }
        let min = self.items.swap_remove(0);
        if self.items.len() > 1 {
            self.sift_down(0);
        }
        debug_assert!(self.is_valid());
        let len = self.items.len();
        if len > 0 && len == self.capacity / 4 {
            self.resize(self.capacity / 2);
        }
        Ok(min)
    }

    /// Consumes the heap and returns its elements sorted from best to worst.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.items.len());
        while let Ok(item) = self.extract_min() {
            sorted.push(item);
        }
        sorted
    }

    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.items.len());
        trace!("heap capacity {} -> {} (len {})", self.capacity, capacity, self.items.len());
        if capacity > self.items.capacity() {
            self.items.reserve_exact(capacity - self.items.len());
        } else {
            self.items.shrink_to(capacity);
        }
        self.capacity = capacity;
    }

    fn heapify(&mut self) {
        for i in (0..self.items.len() / 2).rev() {
            self.sift_down(i);
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.cmp.is_worse(&self.items[parent], &self.items[i]) {
                break;
            }
            self.items.swap(parent, i);
            i = parent;
        }
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.items.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut best = i;
            if left < len && self.cmp.is_worse(&self.items[best], &self.items[left]) {
                best = left;
            }
            if right < len && self.cmp.is_worse(&self.items[best], &self.items[right]) {
                best = right;
            }
            if best == i {
                break;
            }
            self.items.swap(i, best);
            i = best;
        }
    }

    /// Checks that no node is worse than its children.
    pub fn is_valid(&self) -> bool {
        (1..self.items.len()).all(|i| !self.cmp.is_worse(&self.items[(i - 1) / 2], &self.items[i]))
    }
}

#[cfg(test)]
mod tests {
    use rand::prelude::*;
    use rand_pcg::Pcg64;

    use super::*;

    #[test]
    fn heap_sort_of_fixed_sequence() {
        let data = vec![8, 71, 41, 31, 10, 11, 16, 46, 51, 31, 21, 13];
        let mut heap = MinHeap::from(data.clone());
        assert!(heap.is_valid());
        heap.insert(55);

        let mut expected = data;
        expected.push(55);
        expected.sort();
        assert_eq!(heap.into_sorted_vec(), expected);
    }

    #[test]
    fn empty_heap() {
        let mut heap: MinHeap<u32> = MinHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.peek_min(), Err(EmptyContainerError::new("heap")));
        assert_eq!(heap.extract_min().unwrap_err().container(), "heap");

        heap.insert(1);
        assert_eq!(heap.extract_min(), Ok(1));
        assert!(heap.extract_min().is_err());
    }

    #[test]
    fn random_sequences() {
        let mut rand = Pcg64::seed_from_u64(123);
        for _ in 0..50 {
            let n = rand.gen_range(1..300);
            let k = rand.gen_range(0..=n);
            let mut heap = MinHeap::with_capacity(4, NaturalOrder);
            let mut values = Vec::new();
            for _ in 0..n {
                let value: i64 = rand.gen_range(-1000..1000);
                heap.insert(value);
                values.push(value);
            }
            values.sort();
            for value in values.iter().take(k) {
                assert_eq!(heap.extract_min().unwrap(), *value);
            }
            assert_eq!(heap.len(), n - k);
            assert!(heap.is_valid());
        }
    }

    #[test]
    fn custom_comparator() {
        // max-heap over absolute values
        let mut heap = MinHeap::with_comparator(|a: &i32, b: &i32| a.abs() < b.abs());
        for value in [3, -7, 1, 5, -2] {
            heap.insert(value);
        }
        assert_eq!(*heap.peek_min().unwrap(), -7);
        assert_eq!(heap.into_sorted_vec(), vec![-7, 5, 3, -2, 1]);
    }

    #[test]
    fn capacity_grows_and_shrinks() {
        let mut heap = MinHeap::with_capacity(4, NaturalOrder);
        for i in 0..16 {
            heap.insert(i);
        }
        assert_eq!(heap.capacity(), 16);
        heap.insert(16);
        assert_eq!(heap.capacity(), 32);

        // 17 -> 8 elements: shrink happens when len reaches 32 / 4
        for _ in 0..9 {
            heap.extract_min().unwrap();
        }
        assert_eq!(heap.len(), 8);
        assert_eq!(heap.capacity(), 16);
        for _ in 0..4 {
            heap.extract_min().unwrap();
        }
        assert_eq!(heap.capacity(), 8);
        assert_eq!(heap.into_sorted_vec(), vec![13, 14, 15, 16]);
    }

    #[test]
    fn zero_capacity() {
        let mut heap = MinHeap::with_capacity(0, NaturalOrder);
        heap.insert(2.5);
        heap.insert(-1.);
        assert_eq!(heap.capacity(), 2);
        assert_eq!(heap.extract_min(), Ok(-1.));
    }
}
