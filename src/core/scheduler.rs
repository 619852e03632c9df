// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Deferred reversion queue, drained by the driver at tick boundaries

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tokio::time::Instant;
use tracing::debug;

use crate::fleet::Scope;

/// A pending return to normal mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reversion {
    pub scope: Scope,
    pub token: u64,
}

#[derive(Debug)]
struct Entry {
    due: Instant,
    seq: u64,
    reversion: Reversion,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Instant, scope: Scope, token: u64) {
        self.seq += 1;
        debug!("Reversion of {} (token {}) scheduled", scope, token);
        self.queue.push(Reverse(Entry {
            due,
            seq: self.seq,
            reversion: Reversion { scope, token },
        }));
    }

    /// Remove and return every reversion due at or before `now`, oldest first
    pub fn drain_due(&mut self, now: Instant) -> Vec<Reversion> {
        let mut due = Vec::new();
        while let Some(Reverse(entry)) = self.queue.peek() {
            if entry.due > now {
                break;
            }
            if let Some(Reverse(entry)) = self.queue.pop() {
                due.push(entry.reversion);
            }
        }
        due
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_drain_in_due_order() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule(start + Duration::from_secs(30), Scope::System, 1);
        scheduler.schedule(start + Duration::from_secs(10), Scope::Truck("TRUCK_001".into()), 2);
        scheduler.schedule(start + Duration::from_secs(10), Scope::Truck("TRUCK_002".into()), 3);

        assert!(scheduler.drain_due(start + Duration::from_secs(5)).is_empty());
        assert_eq!(scheduler.next_due(), Some(start + Duration::from_secs(10)));

        let due = scheduler.drain_due(start + Duration::from_secs(10));
        let tokens: Vec<u64> = due.iter().map(|r| r.token).collect();
        assert_eq!(tokens, vec![2, 3]);
        assert_eq!(scheduler.len(), 1);

        let due = scheduler.drain_due(start + Duration::from_secs(60));
        assert_eq!(due, vec![Reversion { scope: Scope::System, token: 1 }]);
        assert!(scheduler.is_empty());
    }
}
