//! rate-graph demo
//!
//! Builds a small fixed rate graph and prints the best USD -> INR rate.
//!
//! ```bash
//! cargo run
//! RUST_LOG=debug cargo run   # show which search ran
//! ```

use rate_graph::prelude::*;
use std::process;

const DEMO_RATES: [(&str, &str, f64); 4] = [
    ("USD", "EUR", 0.9),
    ("EUR", "JPY", 120.0),
    ("USD", "JPY", 108.0),
    ("JPY", "INR", 0.67),
];

fn main() {
    env_logger::init();

    let mut graph = RateGraph::new();
    for (from, to, rate) in DEMO_RATES {
        if let Err(e) = graph.add_rate(from, to, rate) {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }

    let usd = CurrencyCode::new("USD");
    let inr = CurrencyCode::new("INR");
    match graph.find_best_path(&usd, &inr) {
        Ok(best) => {
            println!("Best rate from {} to {}: {}", usd, inr, best.rate);
            println!("Path: {}", best);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
