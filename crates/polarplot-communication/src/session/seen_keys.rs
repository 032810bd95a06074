use std::collections::{HashSet, VecDeque};

/// Bounded set of dedup keys.
///
/// Keeps the most recent `capacity` keys; inserting past capacity evicts
/// the oldest one.
#[derive(Debug, Clone)]
pub struct SeenKeySet {
    capacity: usize,
    order: VecDeque<String>,
    keys: HashSet<String>,
}

impl SeenKeySet {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            keys: HashSet::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Record `key`. Returns `false` if it was already present.
    pub fn insert(&mut self, key: String) -> bool {
        if self.keys.contains(&key) {
            return false;
        }
        self.keys.insert(key.clone());
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.keys.remove(&evicted);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.keys.clear();
    }
}
