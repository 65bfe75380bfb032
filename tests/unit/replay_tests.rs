use matchbook::orderbook::events::OrderEventEnvelope;
use matchbook::prelude::*;
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_through_event_store() {
        let store = InMemoryEventStore::new();
        let order = Order::new(Uuid::new_v4(), "TT", dec!(199.99), 10, Side::Buy);
        let events = [
            OrderEvent::accepted(&order, 1),
            OrderEvent::traded(order.id(), dec!(199.99), 10, 1),
            OrderEvent::amended(order.id(), 20, 1),
            OrderEvent::cancelled(order.id(), 1),
        ];
        for event in &events {
            let envelope = OrderEventEnvelope::from_event(event).expect("encodes");
            let wire = envelope.to_json().expect("encodes");
            let received = OrderEventEnvelope::from_json(&wire).expect("parses");
            store.publish(&received).expect("stored");
        }

        let aggregate = store.aggregate(&order.id()).expect("aggregates");
        assert_eq!(aggregate.status, OrderStatus::Cancelled);
        assert_eq!(aggregate.quantity, 20);
        assert_eq!(aggregate.traded, 10);
        assert_eq!(aggregate.symbol, "TT");
        assert_eq!(aggregate.direction, Side::Buy);
        assert_eq!(aggregate.logs.len(), 4);
    }

    #[test]
    fn test_replay_matches_live_book_before_cancel() {
        let store = Arc::new(InMemoryEventStore::new());
        let manager = BookManager::new(Arc::clone(&store));

        let resting = Order::new(Uuid::new_v4(), "TT", dec!(199.99), 10, Side::Buy);
        manager.submit(resting.clone()).expect("submitted");
        manager
            .submit(Order::new(Uuid::new_v4(), "TT", dec!(199.98), 4, Side::Sell))
            .expect("submitted");
        assert!(manager
            .amend(&AmendRequest::for_order(&resting, 20))
            .expect("lock"));

        let live = manager.order(&resting.id()).expect("lock").expect("known");
        let before = store.aggregate(&resting.id()).expect("aggregates");
        assert_eq!(before.quantity, live.quantity());
        assert_eq!(before.traded, live.traded());
        assert_eq!(before.status, live.status());
        assert_eq!(before.status, OrderStatus::PartiallyFilled);
        assert_eq!(before.traded_price, dec!(199.99));

        assert!(manager.cancel(&resting.id()).expect("lock"));
        let after = store.aggregate(&resting.id()).expect("aggregates");
        assert_eq!(after.status, OrderStatus::Cancelled);
        assert_eq!(after.quantity, 20);
        assert_eq!(after.traded, 4);
    }

    #[test]
    fn test_envelopes_from_store_replay_identically() {
        let store = Arc::new(InMemoryEventStore::new());
        let manager = BookManager::new(Arc::clone(&store));
        let resting = Order::new(Uuid::new_v4(), "TT", dec!(5), 6, Side::Sell);
        manager.submit(resting.clone()).expect("submitted");
        manager
            .submit(Order::new(Uuid::new_v4(), "TT", dec!(6), 6, Side::Buy))
            .expect("submitted");

        let envelopes = store.envelopes_for(&resting.id()).expect("encodes");
        let from_envelopes = EventAggregator::aggregate_envelopes(&envelopes).expect("aggregates");
        let from_events = store.aggregate(&resting.id()).expect("aggregates");
        assert_eq!(from_envelopes, from_events);
        assert_eq!(from_events.status, OrderStatus::FullyFilled);
    }

    #[test]
    fn test_positions_from_replayed_orders() {
        let store = Arc::new(InMemoryEventStore::new());
        let manager = BookManager::new(Arc::clone(&store));

        let ask = Order::new(Uuid::new_v4(), "TT", dec!(10), 8, Side::Sell);
        let bid = Order::new(Uuid::new_v4(), "TT", dec!(10), 5, Side::Buy);
        manager.submit(ask.clone()).expect("submitted");
        manager.submit(bid.clone()).expect("submitted");

        let aggregates: Vec<_> = store
            .order_ids()
            .iter()
            .map(|id| store.aggregate(id).expect("aggregates"))
            .collect();
        let position = aggregate_position("TT", &aggregates);
        assert_eq!(position.quantity, 0);
        assert!(position.updated.is_some());

        let buyer_only: Vec<_> = aggregates
            .into_iter()
            .filter(|a| a.id == bid.id())
            .collect();
        assert_eq!(aggregate_position("TT", &buyer_only).quantity, 5);
    }
}
