use matchbook::orderbook::events::{EventPublisher, OrderEventEnvelope, PublishError};
use matchbook::prelude::*;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Publisher that takes `delay` per envelope, like a slow broker round trip.
#[derive(Debug)]
struct SlowPublisher {
    delay: Duration,
    envelopes: Mutex<Vec<OrderEventEnvelope>>,
}

impl SlowPublisher {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            envelopes: Mutex::new(Vec::new()),
        }
    }

    fn order_ids(&self) -> Vec<OrderId> {
        self.envelopes
            .lock()
            .map(|envelopes| {
                envelopes
                    .iter()
                    .filter_map(|e| e.decode().ok())
                    .map(|event| event.order_id())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl EventPublisher for SlowPublisher {
    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        thread::sleep(self.delay);
        if let Ok(mut envelopes) = self.envelopes.lock() {
            envelopes.push(envelope.clone());
        }
        Ok(())
    }
}

/// Publisher that rejects every `every`-th envelope and stores the rest.
#[derive(Debug)]
struct FlakyPublisher {
    every: u64,
    attempts: AtomicU64,
    failures: AtomicU64,
    store: InMemoryEventStore,
}

impl FlakyPublisher {
    fn new(every: u64) -> Self {
        Self {
            every,
            attempts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            store: InMemoryEventStore::new(),
        }
    }
}

impl EventPublisher for FlakyPublisher {
    fn publish(&self, envelope: &OrderEventEnvelope) -> Result<(), PublishError> {
        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        if attempt % self.every == 0 {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(PublishError::Transport {
                message: "broker timeout".to_string(),
            });
        }
        self.store.publish(envelope)
    }
}

fn order(symbol: &str, side: Side, cents: i64, quantity: u64) -> Order {
    Order::new(Uuid::new_v4(), symbol, Decimal::new(cents, 2), quantity, side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_publication_does_not_hold_the_book_lock() {
        let publisher = Arc::new(SlowPublisher::new(Duration::from_millis(300)));
        let manager = Arc::new(BookManager::new(Arc::clone(&publisher)));

        let first = order("TT", Side::Sell, 10_000, 5);
        let second = order("XX", Side::Buy, 9_000, 5);
        let (first_id, second_id) = (first.id(), second.id());

        let publishing = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.submit(first).is_ok())
        };
        thread::sleep(Duration::from_millis(50));
        let waiting = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || manager.submit(second).is_ok())
        };
        thread::sleep(Duration::from_millis(50));

        let started = Instant::now();
        let count = manager.order_count().expect("lock");
        let depth = manager.depth("XX").expect("lock");
        let elapsed = started.elapsed();

        assert!(
            elapsed < Duration::from_millis(150),
            "reads waited {elapsed:?} on publication"
        );
        assert_eq!(count, 2);
        assert!(depth.is_some());

        assert!(publishing.join().expect("joined"));
        assert!(waiting.join().expect("joined"));
        assert_eq!(publisher.order_ids(), vec![first_id, second_id]);
    }

    #[test]
    fn test_concurrent_publication_follows_mutation_order() {
        const THREADS: usize = 4;
        const ORDERS_PER_THREAD: usize = 25;

        let publisher = Arc::new(SlowPublisher::new(Duration::from_millis(1)));
        let manager = Arc::new(BookManager::new(Arc::clone(&publisher)));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let manager = Arc::clone(&manager);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    (0..ORDERS_PER_THREAD)
                        .map(|i| {
                            let side = if (t + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                            let submitted = order("TT", side, 10_000 + (i % 3) as i64, 3);
                            let id = submitted.id();
                            assert!(manager.submit(submitted).is_ok());
                            id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let ids: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("worker panicked"))
            .collect();

        let envelopes = publisher.envelopes.lock().expect("lock").clone();
        for id in ids {
            let stream: Vec<_> = envelopes
                .iter()
                .filter(|e| e.decode().is_ok_and(|event| event.order_id() == id))
                .cloned()
                .collect();
            // A fill published ahead of its acceptance would fail to replay.
            let aggregate = EventAggregator::aggregate_envelopes(&stream).expect("replays");
            let live = manager.order(&id).expect("lock");
            if let Some(live) = live {
                assert_eq!(aggregate.traded, live.traded());
                assert_eq!(aggregate.status, live.status());
            }
        }
        manager.validate().expect("book invariants hold");
    }

    #[test]
    fn test_failed_publications_leave_the_book_untouched() {
        const THREADS: usize = 4;
        const ORDERS_PER_THREAD: usize = 50;

        let publisher = Arc::new(FlakyPublisher::new(3));
        let manager = Arc::new(BookManager::new(Arc::clone(&publisher)));
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let manager = Arc::clone(&manager);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut resting = Vec::new();
                    let mut executed = 0u64;
                    for i in 0..ORDERS_PER_THREAD {
                        let side = if (t + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                        let submitted = order("TT", side, 10_000 + (i % 4) as i64, 2);
                        let outcome = manager.submit(submitted).expect("submit never fails on publish");
                        executed += outcome.executed;
                        if outcome.is_resting() {
                            resting.push(outcome.order.id());
                        }
                    }
                    (resting, executed)
                })
            })
            .collect();

        let mut resting = Vec::new();
        let mut executed = 0u64;
        for handle in handles {
            let (ids, filled) = handle.join().expect("worker panicked");
            resting.extend(ids);
            executed += filled;
        }

        assert!(publisher.failures.load(Ordering::Relaxed) > 0);
        assert_eq!(
            publisher.attempts.load(Ordering::Relaxed),
            publisher.failures.load(Ordering::Relaxed) + publisher.store.len() as u64
        );
        manager.validate().expect("book invariants hold");
        assert_eq!(manager.order_count().expect("lock"), resting.len());

        // Each unit of fill consumes two units of submitted quantity.
        let open: u64 = manager
            .depth("TT")
            .expect("lock")
            .map(|d| d.prices.iter().map(|l| l.buy_quantity + l.sell_quantity).sum())
            .unwrap_or_default();
        let submitted = (THREADS * ORDERS_PER_THREAD) as u64 * 2;
        assert_eq!(open + executed * 2, submitted);

        for id in &resting {
            let tradeable = manager
                .order(id)
                .expect("lock")
                .is_some_and(|o| o.is_tradeable());
            assert_eq!(manager.cancel(id).expect("lock"), tradeable);
        }
        manager.validate().expect("book invariants hold");
    }
}
