//! Real-world application cards in the transfer phase

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct TransferTracker {
    visited: Vec<bool>,
    /// Card currently expanded in the UI
    active: usize,
}

impl TransferTracker {
    pub fn new(card_count: usize) -> Self {
        Self {
            visited: vec![false; card_count],
            active: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_visited(&self, index: usize) -> bool {
        self.visited.get(index).copied().unwrap_or(false)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }

    /// Every card has been opened. Vacuously true for an empty set.
    pub fn all_visited(&self) -> bool {
        self.visited.iter().all(|v| *v)
    }

    /// Focus a card without marking it
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.visited.len() {
            return false;
        }
        self.active = index;
        true
    }

    /// Mark a card as visited. Returns `true` only on the first visit.
    ///
    /// When the active card is marked, focus moves to the next unvisited card
    /// (searching forward, then wrapping).
    pub fn mark_visited(&mut self, index: usize) -> bool {
        let Some(slot) = self.visited.get_mut(index) else {
            return false;
        };
        let first = !*slot;
        *slot = true;

        if index == self.active {
            if let Some(next) = self.next_unvisited_after(index) {
                self.active = next;
            }
        }
        first
    }

    fn next_unvisited_after(&self, index: usize) -> Option<usize> {
        let n = self.visited.len();
        (1..n)
            .map(|offset| (index + offset) % n)
            .find(|i| !self.visited[*i])
    }
}
