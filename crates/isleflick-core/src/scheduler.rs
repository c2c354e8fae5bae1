//! Tick-based delayed continuations.
//!
//! Anything that should happen "after N seconds" is queued here as a
//! `(deadline tick, continuation)` pair and polled once per physics tick.
//! Entries with the same deadline come out in the order they were queued.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::player::PlayerNumber;

/// Continuations the session schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Hand the turn to `to` once a flick has played out
    HandOverTurn {
        /// Next player
        to: PlayerNumber,
    },
}

/// Deadline-ordered queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler<T> {
    queue: BTreeMap<(u64, u64), T>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `item` to fire at tick `deadline`.
    pub fn schedule_at(&mut self, deadline: u64, item: T) {
        self.queue.insert((deadline, self.next_seq), item);
        self.next_seq += 1;
    }

    /// Queues `item` to fire `delay` ticks after `now`.
    pub fn schedule_in(&mut self, now: u64, delay: u64, item: T) {
        self.schedule_at(now.saturating_add(delay), item);
    }

    /// Removes and returns every item due at or before `now`, in order.
    pub fn advance(&mut self, now: u64) -> Vec<T> {
        let due = match now.checked_add(1) {
            Some(next) => {
                let later = self.queue.split_off(&(next, 0));
                std::mem::replace(&mut self.queue, later)
            }
            None => std::mem::take(&mut self.queue),
        };
        due.into_values().collect()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pending item count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drops every pending item.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Pending items in firing order.
    pub fn pending(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.queue.iter().map(|((deadline, _), item)| (*deadline, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut s = Scheduler::new();
        s.schedule_at(5, "late");
        s.schedule_at(2, "early");
        s.schedule_in(1, 2, "middle");

        assert!(s.advance(1).is_empty());
        assert_eq!(s.advance(3), vec!["early", "middle"]);
        assert_eq!(s.next_deadline(), Some(5));
        assert_eq!(s.advance(10), vec!["late"]);
        assert!(s.is_empty());
    }

    #[test]
    fn ties_fire_in_insertion_order() {
        let mut s = Scheduler::new();
        for n in 0..5 {
            s.schedule_at(7, n);
        }
        assert_eq!(s.advance(7), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut s = Scheduler::new();
        s.schedule_at(1, Deferred::HandOverTurn { to: PlayerNumber::Two });
        s.clear();
        assert_eq!(s.len(), 0);
        assert!(s.advance(u64::MAX).is_empty());
    }

    proptest! {
        #[test]
        fn advance_output_is_sorted(deadlines in prop::collection::vec(0u64..50, 0..40), now in 0u64..60) {
            let mut s = Scheduler::new();
            for (i, d) in deadlines.iter().enumerate() {
                s.schedule_at(*d, (*d, i));
            }
            let fired = s.advance(now);
            prop_assert!(fired.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(fired.iter().all(|(d, _)| *d <= now));
            prop_assert!(s.pending().all(|(d, _)| d > now));
            prop_assert_eq!(fired.len() + s.len(), deadlines.len());
        }
    }
}
