use criterion::{BenchmarkId, Criterion};
use matchbook::{Order, OrderBook, Side};
use rust_decimal::Decimal;
use std::hint::black_box;
use uuid::Uuid;

fn populated_book(levels: i64, orders_per_level: usize) -> OrderBook {
    let mut book = OrderBook::new();
    for level in 0..levels {
        for _ in 0..orders_per_level {
            let order = Order::new(
                Uuid::new_v4(),
                "BENCH",
                Decimal::new(10_000 + level, 2),
                10,
                Side::Sell,
            );
            let _ = book.append(order);
        }
    }
    book
}

/// Register benchmarks for crossing incoming orders against the book.
pub fn register_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Matching");

    group.bench_function("single_level_fill", |b| {
        b.iter_with_setup(
            || populated_book(1, 100),
            |mut book| {
                let mut incoming =
                    Order::new(Uuid::new_v4(), "BENCH", Decimal::new(10_000, 2), 10, Side::Buy);
                black_box(book.trade(&mut incoming))
            },
        );
    });

    // Sweeping through a growing number of levels
    for &swept in &[1i64, 10, 50] {
        group.bench_with_input(
            BenchmarkId::new("sweep_levels", swept),
            &swept,
            |b, &swept| {
                b.iter_with_setup(
                    || populated_book(100, 10),
                    |mut book| {
                        let quantity = u64::try_from(swept).unwrap_or(1) * 100;
                        let mut incoming = Order::new(
                            Uuid::new_v4(),
                            "BENCH",
                            Decimal::new(10_000 + swept, 2),
                            quantity,
                            Side::Buy,
                        );
                        black_box(book.trade(&mut incoming))
                    },
                );
            },
        );
    }

    group.bench_function("no_cross", |b| {
        b.iter_with_setup(
            || populated_book(100, 10),
            |mut book| {
                let mut incoming =
                    Order::new(Uuid::new_v4(), "BENCH", Decimal::new(9_000, 2), 10, Side::Buy);
                black_box(book.trade(&mut incoming))
            },
        );
    });

    group.finish();
}
