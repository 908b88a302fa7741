//! Priority queue built on top of [`MinHeap`].

use crate::heap::{Comparator, EmptyContainerError, MinHeap, NaturalOrder};

/// Min-priority queue. Only renames heap operations.
pub struct PriorityQueue<T, C = NaturalOrder> {
    heap: MinHeap<T, C>,
}

impl<T: PartialOrd> PriorityQueue<T> {
    /// Creates empty queue with natural ordering.
    pub fn new() -> Self {
        Self { heap: MinHeap::new() }
    }
}

impl<T: PartialOrd> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C: Comparator<T>> PriorityQueue<T, C> {
    /// Creates empty queue with the given ordering.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            heap: MinHeap::with_comparator(cmp),
        }
    }

    /// Adds element to the queue.
    pub fn enqueue(&mut self, item: T) {
        self.heap.insert(item);
    }

    /// Returns the element with the highest priority.
    pub fn peek_min(&self) -> Result<&T, EmptyContainerError> {
        self.heap.peek_min()
    }

    /// Removes and returns the element with the highest priority.
    pub fn pop_min(&mut self) -> Result<T, EmptyContainerError> {
        self.heap.extract_min()
    }

    /// Returns the number of queued elements.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns `true` if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_and_pop() {
        let mut pq = PriorityQueue::new();
        for value in [8, 71, 41, 31, 10, 11, 16, 46, 51, 31, 21, 13] {
            pq.enqueue(value);
        }
        pq.enqueue(55);
        assert_eq!(pq.len(), 13);

        let mut popped = Vec::new();
        while !pq.is_empty() {
            let min = *pq.peek_min().unwrap();
            assert_eq!(pq.pop_min(), Ok(min));
            popped.push(min);
        }
        assert_eq!(popped, vec![8, 10, 11, 13, 16, 21, 31, 31, 41, 46, 51, 55, 71]);
        assert!(pq.pop_min().is_err());
        assert!(pq.peek_min().is_err());
    }
}
