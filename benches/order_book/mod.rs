use criterion::Criterion;

mod append;
mod matching;

/// Register all single-threaded order book benchmarks.
pub fn register_benchmarks(c: &mut Criterion) {
    append::register_benchmarks(c);
    matching::register_benchmarks(c);
}
