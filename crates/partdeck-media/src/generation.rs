//! # Load Generations
//!
//! Stale-result suppression for asynchronous loads. Starting a load for a
//! subject bumps its generation; a completion whose ticket is no longer the
//! current generation is discarded by the caller.
//!
//! ```text
//! begin("X1") ─► ticket g1 ────────────── slow ───────────► is_current? no, drop
//! begin("X1") ─► ticket g2 ─── fast ──► is_current? yes, apply
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Proof of which load a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    subject: String,
    generation: u64,
}

impl LoadTicket {
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[derive(Debug, Default)]
struct Generations {
    next: u64,
    current: HashMap<String, u64>,
}

/// Generation counters per subject. Generations are never reused.
#[derive(Debug, Default)]
pub struct LoadTracker {
    generations: Mutex<Generations>,
}

impl LoadTracker {
    pub fn new() -> Self {
        LoadTracker::default()
    }

    /// Starts a new load for `subject`, superseding earlier ones.
    pub fn begin(&self, subject: &str) -> LoadTicket {
        let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        generations.next += 1;
        let generation = generations.next;
        generations.current.insert(subject.to_string(), generation);
        LoadTicket {
            subject: subject.to_string(),
            generation,
        }
    }

    /// True if no newer load for the ticket's subject has started.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        let generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        generations.current.get(&ticket.subject) == Some(&ticket.generation)
    }

    /// Invalidates every outstanding ticket.
    pub fn reset(&self) {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_load_supersedes_older() {
        let tracker = LoadTracker::new();
        let first = tracker.begin("X1");
        let other = tracker.begin("Y1");
        let second = tracker.begin("X1");

        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(tracker.is_current(&other));
    }

    #[test]
    fn test_reset_invalidates_everything() {
        let tracker = LoadTracker::new();
        let ticket = tracker.begin("catalog");
        tracker.reset();
        assert!(!tracker.is_current(&ticket));

        let fresh = tracker.begin("catalog");
        assert!(!tracker.is_current(&ticket));
        assert!(tracker.is_current(&fresh));
    }
}
