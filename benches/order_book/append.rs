use criterion::{BenchmarkId, Criterion};
use matchbook::{Order, OrderBook, Side};
use rust_decimal::Decimal;
use std::hint::black_box;
use uuid::Uuid;

/// Register benchmarks for resting, amending and cancelling orders.
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Append");

    // Resting orders spread over a varying number of price levels
    for &levels in &[1i64, 100, 1_000] {
        group.bench_with_input(
            BenchmarkId::new("append_1000_orders", levels),
            &levels,
            |b, &levels| {
                b.iter_with_setup(
                    || {
                        (0..1_000i64)
                            .map(|i| {
                                let price = Decimal::new(10_000 + (i * 37) % levels, 2);
                                Order::new(Uuid::new_v4(), "BENCH", price, 10, Side::Sell)
                            })
                            .collect::<Vec<_>>()
                    },
                    |orders| {
                        let mut book = OrderBook::new();
                        for order in orders {
                            let _ = black_box(book.append(order));
                        }
                        book
                    },
                );
            },
        );
    }

    group.bench_function("cancel_half_of_1000", |b| {
        b.iter_with_setup(
            || {
                let mut book = OrderBook::new();
                let ids: Vec<_> = (0..1_000i64)
                    .map(|i| {
                        let order = Order::new(
                            Uuid::new_v4(),
                            "BENCH",
                            Decimal::new(10_000 + i % 50, 2),
                            10,
                            Side::Buy,
                        );
                        let id = order.id();
                        let _ = book.append(order);
                        id
                    })
                    .collect();
                (book, ids)
            },
            |(mut book, ids)| {
                for id in ids.iter().step_by(2) {
                    black_box(book.cancel(id));
                }
                book
            },
        );
    });

    group.finish();
}
