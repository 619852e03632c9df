// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/smartmine

//! Snapshot fan-out to a dynamic set of subscribers

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;
use uuid::Uuid;

/// Receiving end held by one consumer
#[derive(Debug)]
pub struct Subscription {
    pub id: Uuid,
    pub rx: mpsc::Receiver<Arc<str>>,
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Subscribers whose buffer was full; they miss this payload only
    pub lagged: usize,
    /// Subscribers found closed and removed
    pub pruned: usize,
}

#[derive(Clone)]
pub struct Broadcaster {
    subscribers: Arc<RwLock<HashMap<Uuid, mpsc::Sender<Arc<str>>>>>,
    buffer: usize,
}

impl Broadcaster {
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            buffer: buffer.max(1),
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        self.subscribers.write().insert(id, tx);
        debug!("Subscriber {} registered", id);
        Subscription { id, rx }
    }

    /// Removing an unknown id is a no-op
    pub fn unsubscribe(&self, id: &Uuid) {
        if self.subscribers.write().remove(id).is_some() {
            debug!("Subscriber {} removed", id);
        }
    }

    /// Deliver `payload` to every current subscriber without blocking.
    /// Iterates a copy of the handle set, so concurrent joins and leaves are safe.
    pub fn broadcast(&self, payload: Arc<str>) -> BroadcastReport {
        let handles: Vec<(Uuid, mpsc::Sender<Arc<str>>)> = self
            .subscribers
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();

        for (id, tx) in handles {
            match tx.try_send(payload.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => report.lagged += 1,
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write();
            for id in &closed {
                subscribers.remove(id);
            }
            report.pruned = closed.len();
        }

        report
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let broadcaster = Broadcaster::new(4);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();
        let c = broadcaster.subscribe();
        drop(c);

        let report = broadcaster.broadcast(Arc::from("{\"tick\":1}"));
        assert_eq!(report, BroadcastReport { delivered: 2, lagged: 0, pruned: 1 });
        assert_eq!(broadcaster.subscriber_count(), 2);

        assert_eq!(&*a.rx.try_recv().unwrap(), "{\"tick\":1}");
        assert_eq!(&*b.rx.try_recv().unwrap(), "{\"tick\":1}");
    }

    #[test]
    fn test_slow_subscriber_lags_without_blocking_others() {
        let broadcaster = Broadcaster::new(1);
        let mut slow = broadcaster.subscribe();
        let mut fast = broadcaster.subscribe();

        let first = broadcaster.broadcast(Arc::from("1"));
        assert_eq!(first.delivered, 2);
        assert_eq!(&*fast.rx.try_recv().unwrap(), "1");

        let second = broadcaster.broadcast(Arc::from("2"));
        assert_eq!(second, BroadcastReport { delivered: 1, lagged: 1, pruned: 0 });
        assert_eq!(&*fast.rx.try_recv().unwrap(), "2");

        assert_eq!(&*slow.rx.try_recv().unwrap(), "1");
        assert!(slow.rx.try_recv().is_err());
        assert_eq!(broadcaster.subscriber_count(), 2);
    }

    fn drain(sub: &mut Subscription, into: &mut Vec<String>) {
        while let Ok(payload) = sub.rx.try_recv() {
            into.push(payload.to_string());
        }
    }

    #[test]
    fn test_live_subscribers_receive_every_broadcast_after_joining() {
        let broadcaster = Broadcaster::new(2);
        let mut a = broadcaster.subscribe();
        let mut b = broadcaster.subscribe();
        let mut stuck = broadcaster.subscribe();
        drop(broadcaster.subscribe());

        let mut late: Option<Subscription> = None;
        let (mut got_a, mut got_b, mut got_late) = (Vec::new(), Vec::new(), Vec::new());

        for tick in 1..=6 {
            if tick == 4 {
                late = Some(broadcaster.subscribe());
            }
            let report = broadcaster.broadcast(Arc::from(tick.to_string()));
            let expected = match tick {
                1 => BroadcastReport { delivered: 3, lagged: 0, pruned: 1 },
                2 => BroadcastReport { delivered: 3, lagged: 0, pruned: 0 },
                3 => BroadcastReport { delivered: 2, lagged: 1, pruned: 0 },
                _ => BroadcastReport { delivered: 3, lagged: 1, pruned: 0 },
            };
            assert_eq!(report, expected, "tick {}", tick);

            drain(&mut a, &mut got_a);
            drain(&mut b, &mut got_b);
            if let Some(sub) = late.as_mut() {
                drain(sub, &mut got_late);
            }
        }

        let all: Vec<String> = (1..=6).map(|t| t.to_string()).collect();
        assert_eq!(got_a, all);
        assert_eq!(got_b, all);
        assert_eq!(got_late, vec!["4", "5", "6"]);

        let mut got_stuck = Vec::new();
        drain(&mut stuck, &mut got_stuck);
        assert_eq!(got_stuck, vec!["1", "2"]);
        assert_eq!(broadcaster.subscriber_count(), 4);
    }

    #[test]
    fn test_unsubscribe_unknown_is_noop() {
        let broadcaster = Broadcaster::default();
        let sub = broadcaster.subscribe();
        broadcaster.unsubscribe(&Uuid::new_v4());
        assert_eq!(broadcaster.subscriber_count(), 1);
        broadcaster.unsubscribe(&sub.id);
        broadcaster.unsubscribe(&sub.id);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.broadcast(Arc::from("x")), BroadcastReport::default());
    }
}
