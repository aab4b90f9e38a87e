use approx::assert_relative_eq;
use rate_graph::core::currency::{CurrencyCode, RateError, RateQuote};
use rate_graph::graph::arbitrage::{find_arbitrage, find_arbitrage_from};
use rate_graph::graph::rate_graph::RateGraph;
use rate_graph::graph::shortest_path::{SearchConfig, SearchStrategy};
use rate_graph::simulation::random_market::{generate_random_market, MarketConfig};

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::new(s)
}

fn demo_graph() -> RateGraph {
    let mut graph = RateGraph::new();
    graph.add_rate("USD", "EUR", 0.9).unwrap();
    graph.add_rate("EUR", "JPY", 120.0).unwrap();
    graph.add_rate("USD", "JPY", 108.0).unwrap();
    graph.add_rate("JPY", "INR", 0.67).unwrap();
    graph
}

/// The demo scenario: both USD -> INR routes tie at 72.36.
#[test]
fn demo_usd_to_inr() {
    let graph = demo_graph();
    let rate = graph.find_best_rate(&code("USD"), &code("INR")).unwrap();
    assert_relative_eq!(rate, 72.36, max_relative = 1e-9);
    assert_relative_eq!(rate, (0.9f64 * 120.0 * 0.67).max(108.0 * 0.67), max_relative = 1e-9);
}

/// Full pipeline: JSON quotes -> graph -> best path -> arbitrage scan.
#[test]
fn full_pipeline_from_json() {
    let json = r#"{
        "rates": [
            { "from": "USD", "to": "EUR", "rate": 0.92 },
            { "from": "EUR", "to": "GBP", "rate": 0.86 },
            { "from": "USD", "to": "GBP", "rate": 0.78 },
            { "from": "GBP", "to": "BRL", "rate": 6.3 },
            { "from": "USD", "to": "BRL", "rate": 4.9 }
        ]
    }"#;
    let graph = RateGraph::from_json(json).unwrap();
    assert_eq!(graph.currency_count(), 4);
    assert_eq!(graph.edge_count(), 5);

    let best = graph.find_best_path(&code("USD"), &code("BRL")).unwrap();
    // USD -> EUR -> GBP -> BRL = 0.92 * 0.86 * 6.3 = 4.98456
    assert_relative_eq!(best.rate, 0.92 * 0.86 * 6.3, max_relative = 1e-9);
    assert_eq!(best.path, vec![code("USD"), code("EUR"), code("GBP"), code("BRL")]);
    assert_eq!(best.hops(), 3);

    assert!(find_arbitrage(&graph).is_none());
}

#[test]
fn queries_do_not_disturb_later_queries() {
    let mut graph = demo_graph();
    graph.add_rate("INR", "PKR", 3.3).unwrap();
    graph.add_rate("GBP", "CHF", 1.2).unwrap();
    graph.add_rate("CHF", "GBP", 0.9).unwrap();

    assert!(matches!(
        graph.find_best_rate(&code("INR"), &code("USD")),
        Err(RateError::PathNotFound { .. })
    ));
    // GBP -> CHF -> GBP = 1.08, a loop that manufactures value.
    assert!(matches!(
        graph.find_best_rate(&code("GBP"), &code("CHF")),
        Err(RateError::InvalidGraph { .. })
    ));

    let rate = graph.find_best_rate(&code("USD"), &code("PKR")).unwrap();
    assert_relative_eq!(rate, 72.36 * 3.3, max_relative = 1e-9);
}

#[test]
fn self_query_ignores_cycles() {
    let mut graph = RateGraph::new();
    graph.add_rate("GBP", "CHF", 1.2).unwrap();
    graph.add_rate("CHF", "GBP", 0.9).unwrap();

    assert_eq!(graph.find_best_rate(&code("GBP"), &code("GBP")).unwrap(), 1.0);
}

#[test]
fn negative_cycle_reports_loop_and_arbitrage_agrees() {
    let mut graph = demo_graph();
    graph.add_rate("JPY", "USD", 0.0095).unwrap();

    // USD -> JPY -> USD = 108 * 0.0095 = 1.026
    match graph.find_best_rate(&code("USD"), &code("INR")) {
        Err(RateError::InvalidGraph { start, cycle }) => {
            assert_eq!(start, code("USD"));
            let cycle = cycle.expect("loop recovered");
            assert!(cycle.contains(&code("USD")));
            assert!(cycle.contains(&code("JPY")));
        }
        other => panic!("expected InvalidGraph, got {:?}", other),
    }

    let cycle = find_arbitrage_from(&graph, &code("USD")).expect("arbitrage");
    assert!(cycle.gain > 1.0);
    assert!(cycle.currencies.contains(&code("JPY")));
}

#[test]
fn self_loop_above_one_is_a_negative_cycle() {
    let mut graph = RateGraph::new();
    graph.add_rate("USD", "USD", 1.01).unwrap();
    graph.add_rate("USD", "EUR", 0.9).unwrap();

    match graph.find_best_rate(&code("USD"), &code("EUR")) {
        Err(RateError::InvalidGraph { cycle, .. }) => assert_eq!(cycle, Some(vec![code("USD")])),
        other => panic!("expected InvalidGraph, got {:?}", other),
    }
}

#[test]
fn self_loop_below_one_is_harmless() {
    let mut graph = RateGraph::new();
    graph.add_rate("USD", "USD", 0.99).unwrap();
    graph.add_rate("USD", "EUR", 0.9).unwrap();

    let rate = graph.find_best_rate(&code("USD"), &code("EUR")).unwrap();
    assert_relative_eq!(rate, 0.9, max_relative = 1e-12);
}

#[test]
fn random_market_never_beats_fair_rate() {
    let market = generate_random_market(&MarketConfig {
        currency_count: 12,
        quotes_per_currency: 4,
        seed: Some(2024),
        ..Default::default()
    });
    let graph = market.to_graph().unwrap();
    assert!(find_arbitrage(&graph).is_none());

    let currencies = market.currencies();
    for from in &currencies {
        for to in &currencies {
            match graph.find_best_path(from, to) {
                Ok(best) => {
                    let fair = market.fair_rate(from, to).unwrap();
                    assert!(best.rate <= fair * (1.0 + 1e-9), "{} -> {} beats fair rate", from, to);
                    assert_eq!(best.path.first(), Some(from));
                    assert_eq!(best.path.last(), Some(to));
                }
                Err(RateError::PathNotFound { .. }) => {}
                Err(e) => panic!("unexpected error for {} -> {}: {}", from, to, e),
            }
        }
    }
}

#[test]
fn forced_dijkstra_on_sub_unit_rates_matches_auto() {
    let mut auto = RateGraph::new();
    let mut forced = RateGraph::with_config(SearchConfig {
        strategy: SearchStrategy::Dijkstra,
        ..Default::default()
    });
    for graph in [&mut auto, &mut forced] {
        graph.add_rate("A", "B", 0.9).unwrap();
        graph.add_rate("B", "C", 0.9).unwrap();
        graph.add_rate("A", "C", 0.8).unwrap();
    }

    let a = auto.find_best_rate(&code("A"), &code("C")).unwrap();
    let b = forced.find_best_rate(&code("A"), &code("C")).unwrap();
    assert_relative_eq!(a, 0.81, max_relative = 1e-12);
    assert_relative_eq!(a, b, max_relative = 1e-12);
}

#[test]
fn from_quotes_stops_at_first_invalid() {
    let quotes = vec![
        RateQuote::new("USD", "EUR", 0.9),
        RateQuote::new("EUR", "JPY", -120.0),
        RateQuote::new("JPY", "INR", 0.67),
    ];
    match RateGraph::from_quotes(quotes) {
        Err(RateError::InvalidRate { from, to, rate }) => {
            assert_eq!(from, code("EUR"));
            assert_eq!(to, code("JPY"));
            assert_eq!(rate, -120.0);
        }
        other => panic!("expected InvalidRate, got {:?}", other),
    }
}
