use matchbook::prelude::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Submit { side: Side, tick: i64, quantity: u64 },
    Amend { target: usize, grow: u64 },
    Cancel { target: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (any::<bool>(), 0i64..12, 1u64..20).prop_map(|(buy, tick, quantity)| Op::Submit {
            side: if buy { Side::Buy } else { Side::Sell },
            tick,
            quantity,
        }),
        1 => (0usize..64, 0u64..10).prop_map(|(target, grow)| Op::Amend { target, grow }),
        1 => (0usize..64).prop_map(|target| Op::Cancel { target }),
    ]
}

fn price(tick: i64) -> Price {
    Decimal::new(19_990 + tick, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_book_invariants_hold_after_every_operation(
            ops in prop::collection::vec(op_strategy(), 1..80),
        ) {
            let mut book = OrderBook::new();
            let mut submitted: Vec<Order> = Vec::new();

            for op in ops {
                match op {
                    Op::Submit { side, tick, quantity } => {
                        let mut order = Order::new(Uuid::new_v4(), "TT", price(tick), quantity, side);
                        book.trade(&mut order);
                        if order.is_tradeable() {
                            // A partially filled remainder cannot go through append.
                            if order.status() == OrderStatus::Pending {
                                prop_assert!(book.append(order.clone()).is_ok());
                            } else {
                                prop_assert!(book.append(order.clone()).is_err());
                            }
                        }
                        submitted.push(order);
                    }
                    Op::Amend { target, grow } => {
                        if let Some(known) = submitted.get(target).and_then(|o| book.order(&o.id())) {
                            let before = known.quantity();
                            let was_tradeable = known.is_tradeable();
                            let request = AmendRequest::for_order(known, before + grow);
                            let amended = book.amend(&request);
                            prop_assert_eq!(amended, was_tradeable && grow > 0);
                        }
                    }
                    Op::Cancel { target } => {
                        if let Some(id) = submitted.get(target).map(Order::id) {
                            let was_tradeable = book.order(&id).is_some_and(Order::is_tradeable);
                            prop_assert_eq!(book.cancel(&id), was_tradeable);
                            prop_assert!(!book.cancel(&id));
                        }
                    }
                }
                prop_assert!(book.validate().is_ok(), "{:?}", book.validate());
            }
            book.drain_events();
        }

        #[test]
        fn prop_book_never_rests_crossed(
            ops in prop::collection::vec((any::<bool>(), 0i64..12, 1u64..20), 1..80),
        ) {
            let manager = BookManager::new(NoopPublisher);
            for (buy, tick, quantity) in ops {
                let side = if buy { Side::Buy } else { Side::Sell };
                let order = Order::new(Uuid::new_v4(), "TT", price(tick), quantity, side);
                prop_assert!(manager.submit(order).is_ok());
            }
            let depth = manager.depth("TT").ok().flatten();
            prop_assert!(depth.is_some());
            if let Some(depth) = depth {
                let bid = depth.prices.iter().filter(|l| l.buy_quantity > 0).map(|l| l.price).max();
                let ask = depth.prices.iter().filter(|l| l.sell_quantity > 0).map(|l| l.price).min();
                if let (Some(bid), Some(ask)) = (bid, ask) {
                    prop_assert!(bid < ask);
                }
            }
            prop_assert!(manager.validate().is_ok());
        }

        #[test]
        fn prop_executed_quantity_is_conserved(
            resting in prop::collection::vec((0i64..12, 1u64..20), 1..30),
            tick in 0i64..12,
            quantity in 1u64..200,
        ) {
            let mut book = OrderBook::new();
            for (t, q) in &resting {
                let order = Order::new(Uuid::new_v4(), "TT", price(*t), *q, Side::Sell);
                prop_assert!(book.append(order).is_ok());
            }
            let before: u64 = book
                .depth("TT")
                .map(|d| d.prices.iter().map(|l| l.sell_quantity).sum())
                .unwrap_or_default();

            let mut incoming = Order::new(Uuid::new_v4(), "TT", price(tick), quantity, Side::Buy);
            let executed = book.trade(&mut incoming);

            let after: u64 = book
                .depth("TT")
                .map(|d| d.prices.iter().map(|l| l.sell_quantity).sum())
                .unwrap_or_default();
            prop_assert_eq!(before - after, executed);
            prop_assert_eq!(incoming.traded(), executed);
            prop_assert!(executed <= quantity);

            let events = book.drain_events();
            let traded: u64 = events
                .iter()
                .filter_map(|e| match e {
                    OrderEvent::Traded(t) => Some(t.quantity),
                    _ => None,
                })
                .sum();
            prop_assert_eq!(traded, executed * 2);
        }
    }
}
