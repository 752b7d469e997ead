use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A FIFO ledger bounded at a fixed capacity, used for every world-owned
/// forensic/ambient list (`signals`, `tracks`, `rumors`,
/// `spawn_descriptors`, `occlusion_edges`). Pushing past capacity evicts
/// the oldest entry first, so after appending `cap + k` items the ledger
/// holds exactly the last `cap`, in FIFO order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + for<'a> Deserialize<'a>")]
pub struct BoundedLedger<T> {
    items: VecDeque<T>,
    #[serde(skip)]
    cap: usize,
}

impl<T> BoundedLedger<T> {
    pub fn new(cap: usize) -> Self {
        Self { items: VecDeque::new(), cap }
    }

    /// Capacity is fixed per-ledger by the substrate, not persisted; a
    /// ledger deserialized without a cap set must have `with_cap` called
    /// before further pushes to re-establish the bound.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self.truncate_to_cap();
        self
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
        self.truncate_to_cap();
    }

    fn truncate_to_cap(&mut self) {
        while self.cap > 0 && self.items.len() > self.cap {
            self.items.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn as_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_keeps_exactly_the_last_cap_items_in_fifo_order() {
        let mut ledger: BoundedLedger<i32> = BoundedLedger::new(3);
        for i in 0..7 {
            ledger.push(i);
        }
        assert_eq!(ledger.as_vec(), vec![4, 5, 6]);
    }

    #[test]
    fn under_cap_keeps_everything() {
        let mut ledger: BoundedLedger<i32> = BoundedLedger::new(10);
        ledger.push(1);
        ledger.push(2);
        assert_eq!(ledger.as_vec(), vec![1, 2]);
    }
}
