//! Bounded memo for file scores
//!
//! Maps normalized message text to a previously computed score. Capacity is
//! fixed (256 by default) with least-recently-used eviction; the score
//! function is referentially transparent in the message text, so entries are
//! only ever invalidated by capacity pressure. Purely an optimization: a hit
//! must return exactly what a fresh computation would.

use std::collections::{HashMap, VecDeque};

/// LRU map from message text to score
pub struct ScoreMemo {
    capacity: usize,
    scores: HashMap<String, f64>,
    /// Access order, least recent at the front
    order: VecDeque<String>,
}

impl ScoreMemo {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            scores: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Looks up a score, marking the entry as most recently used.
    pub fn get(&mut self, key: &str) -> Option<f64> {
        let value = *self.scores.get(key)?;
        self.touch(key);
        Some(value)
    }

    /// Stores a score, evicting the least recently used entry at capacity.
    pub fn insert(&mut self, key: String, value: f64) {
        if self.scores.contains_key(&key) {
            self.scores.insert(key.clone(), value);
            self.touch(&key);
            return;
        }
        if self.scores.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.scores.remove(&oldest);
            }
        }
        self.order.push_back(key.clone());
        self.scores.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_returns_stored_value() {
        let mut memo = ScoreMemo::new(4);
        memo.insert("me envia o relatorio.pdf".to_string(), 0.85);
        assert_eq!(memo.get("me envia o relatorio.pdf"), Some(0.85));
        assert_eq!(memo.get("outra mensagem"), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut memo = ScoreMemo::new(2);
        memo.insert("a".to_string(), 0.1);
        memo.insert("b".to_string(), 0.2);
        memo.insert("c".to_string(), 0.3);

        assert_eq!(memo.get("a"), None);
        assert_eq!(memo.get("b"), Some(0.2));
        assert_eq!(memo.get("c"), Some(0.3));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn access_refreshes_entry() {
        let mut memo = ScoreMemo::new(2);
        memo.insert("a".to_string(), 0.1);
        memo.insert("b".to_string(), 0.2);

        // Touch "a" so "b" becomes the eviction candidate
        assert_eq!(memo.get("a"), Some(0.1));
        memo.insert("c".to_string(), 0.3);

        assert_eq!(memo.get("a"), Some(0.1));
        assert_eq!(memo.get("b"), None);
    }

    #[test]
    fn reinsert_updates_in_place() {
        let mut memo = ScoreMemo::new(2);
        memo.insert("a".to_string(), 0.1);
        memo.insert("a".to_string(), 0.4);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.get("a"), Some(0.4));
    }
}
