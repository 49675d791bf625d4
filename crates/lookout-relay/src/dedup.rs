// SPDX-FileCopyrightText: 2026 Lookout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recency-window set of processed status keys.

use std::collections::{HashSet, VecDeque};

/// Remembers which dedup keys have already been processed.
///
/// The cache holds at most `capacity` keys; once full, the oldest key is
/// forgotten when a new one is marked. A capacity of `0` never evicts.
#[derive(Debug)]
pub struct DedupCache {
    capacity: usize,
    keys: HashSet<String>,
    order: VecDeque<String>,
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            keys: HashSet::new(),
            order: VecDeque::new(),
        }
    }

    /// A cache that never evicts.
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn seen(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Marks `key` as processed. Marking an already-seen key is a no-op and
    /// does not refresh its position in the window.
    pub fn mark_seen(&mut self, key: &str) {
        if self.keys.contains(key) {
            return;
        }
        if self.capacity > 0 && self.order.len() >= self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.keys.remove(&oldest);
        }
        self.keys.insert(key.to_string());
        self.order.push_back(key.to_string());
    }

    /// Returns `true` if `key` was not seen before, marking it in the same step.
    pub fn check_and_mark(&mut self, key: &str) -> bool {
        if self.seen(key) {
            return false;
        }
        self.mark_seen(key);
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
