use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rate_graph::graph::arbitrage::find_arbitrage;
use rate_graph::graph::rate_graph::RateGraph;
use rate_graph::simulation::random_market::{generate_random_market, MarketConfig, RandomMarket};

fn build_market(currency_count: usize, quotes_per_currency: usize) -> (RandomMarket, RateGraph) {
    let market = generate_random_market(&MarketConfig {
        currency_count,
        quotes_per_currency,
        seed: Some(1),
        ..Default::default()
    });
    let graph = market.to_graph().expect("generated quotes are positive");
    (market, graph)
}

fn bench_best_rate(c: &mut Criterion, name: &str, currency_count: usize, quotes: usize) {
    let (market, graph) = build_market(currency_count, quotes);
    let currencies = market.currencies();
    let start = &currencies[0];
    let end = &currencies[currencies.len() - 1];

    c.bench_function(name, |b| {
        b.iter(|| graph.find_best_rate(black_box(start), black_box(end)))
    });
}

fn bench_best_rate_10_currencies(c: &mut Criterion) {
    bench_best_rate(c, "best_rate_10_currencies", 10, 5);
}

fn bench_best_rate_100_currencies(c: &mut Criterion) {
    bench_best_rate(c, "best_rate_100_currencies", 100, 10);
}

fn bench_best_rate_500_currencies(c: &mut Criterion) {
    bench_best_rate(c, "best_rate_500_currencies", 500, 10);
}

fn bench_sub_unit_dijkstra(c: &mut Criterion) {
    // Quoting only toward cheaper currencies keeps every rate below 1.0.
    let (market, _) = build_market(200, 10);
    let mut graph = RateGraph::new();
    for quote in market.quotes.iter().filter(|q| q.rate <= 1.0) {
        graph.add_quote(quote.clone()).expect("generated quotes are positive");
    }
    let currencies = market.currencies();
    let start = &currencies[0];
    let end = &currencies[currencies.len() - 1];

    c.bench_function("best_rate_dijkstra_200_currencies", |b| {
        b.iter(|| graph.find_best_rate(black_box(start), black_box(end)))
    });
}

fn bench_arbitrage_scan_50_currencies(c: &mut Criterion) {
    let (_, graph) = build_market(50, 5);

    c.bench_function("arbitrage_scan_50_currencies", |b| {
        b.iter(|| find_arbitrage(black_box(&graph)))
    });
}

criterion_group!(
    benches,
    bench_best_rate_10_currencies,
    bench_best_rate_100_currencies,
    bench_best_rate_500_currencies,
    bench_sub_unit_dijkstra,
    bench_arbitrage_scan_50_currencies
);
criterion_main!(benches);
