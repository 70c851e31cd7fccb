use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Priority and heap position of a key.
#[derive(Debug, Clone)]
struct Slot<P> {
    priority: P,
    position: usize,
}

/// Indexed min-priority queue.
///
/// A binary heap of keys plus a key → (priority, position) index, so that
/// `get` is O(1) and `change` / `remove` of an arbitrary key are O(log n)
/// instead of the O(n) scan a plain `BinaryHeap` would need.
///
/// Invariants, held after every public call:
/// - every key in `heap` has exactly one entry in `index` and vice versa;
/// - `index[heap[i]].position == i`;
/// - no slot has a smaller priority than its parent.
pub struct IndexMinPQ<K, P> {
    heap: Vec<K>,
    index: HashMap<K, Slot<P>>,
}

impl<K, P> IndexMinPQ<K, P>
where
    K: Eq + Hash + Clone,
    P: PartialOrd,
{
    /// An empty queue. Nothing is allocated until the first `add`; the heap
    /// then grows geometrically.
    pub fn new() -> Self {
        Self {
            heap: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Remove every key. Allocated capacity is kept for the next search.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Insert `key` with `priority`.
    ///
    /// Returns false and leaves the queue untouched if `key` is already present.
    pub fn add(&mut self, key: K, priority: P) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        let position = self.heap.len();
        self.heap.push(key.clone());
        self.index.insert(key, Slot { priority, position });
        self.sift_up(position);
        true
    }

    /// Replace the priority of `key`, returning the previous one.
    ///
    /// Returns None if `key` is absent. The new priority may be lower or
    /// higher than the old one, so both sift directions run; at most one moves.
    pub fn change(&mut self, key: &K, priority: P) -> Option<P> {
        let slot = self.index.get_mut(key)?;
        let old = std::mem::replace(&mut slot.priority, priority);
        let position = slot.position;
        self.restore(position);
        Some(old)
    }

    /// O(1) priority lookup through the index.
    pub fn get(&self, key: &K) -> Option<&P> {
        self.index.get(key).map(|slot| &slot.priority)
    }

    /// Remove an arbitrary key, returning its priority.
    pub fn remove(&mut self, key: &K) -> Option<P> {
        let slot = self.index.remove(key)?;
        let last = self.heap.len() - 1;
        if slot.position == last {
            self.heap.pop();
        } else {
            self.heap.swap_remove(slot.position);
            self.reindex(slot.position);
            self.restore(slot.position);
        }
        Some(slot.priority)
    }

    /// Remove and return the key with the smallest priority.
    pub fn remove_min(&mut self) -> Option<K> {
        self.pop_min().map(|(key, _)| key)
    }

    /// Remove the root, returning it together with its priority.
    pub fn pop_min(&mut self) -> Option<(K, P)> {
        if self.heap.is_empty() {
            return None;
        }
        let key = self.heap.swap_remove(0);
        let slot = self.index.remove(&key)?;
        if !self.heap.is_empty() {
            self.reindex(0);
            self.sift_down(0);
        }
        Some((key, slot.priority))
    }

    pub fn peek_min_key(&self) -> Option<&K> {
        self.heap.first()
    }

    pub fn peek_min_value(&self) -> Option<&P> {
        self.heap.first().and_then(|key| self.get(key))
    }

    /// Iterate `(key, priority)` pairs in heap-array order (not sorted).
    pub fn iter(&self) -> impl Iterator<Item = (&K, &P)> {
        self.heap
            .iter()
            .filter_map(move |key| self.index.get(key).map(|slot| (key, &slot.priority)))
    }

    fn restore(&mut self, position: usize) {
        let position = self.sift_up(position);
        self.sift_down(position);
    }

    /// Move slot `i` towards the root while its parent is strictly greater.
    /// Returns the final position.
    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.priority_at(parent) > self.priority_at(i) {
                self.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
        i
    }

    /// Move slot `i` towards the leaves while its smaller child is strictly smaller.
    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.priority_at(right) < self.priority_at(left) {
                child = right;
            }
            if self.priority_at(child) < self.priority_at(i) {
                self.swap(i, child);
                i = child;
            } else {
                break;
            }
        }
    }

    /// Swap two heap slots and both index positions together.
    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.reindex(a);
        self.reindex(b);
    }

    /// Point the index entry of the key at `position` back at `position`.
    fn reindex(&mut self, position: usize) {
        if let Some(slot) = self.index.get_mut(&self.heap[position]) {
            slot.position = position;
        }
    }

    fn priority_at(&self, position: usize) -> Option<&P> {
        self.index.get(&self.heap[position]).map(|slot| &slot.priority)
    }
}

impl<K, P> Default for IndexMinPQ<K, P>
where
    K: Eq + Hash + Clone,
    P: PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, P> fmt::Debug for IndexMinPQ<K, P>
where
    K: Eq + Hash + Clone + fmt::Debug,
    P: PartialOrd + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
