//! Random rate networks for stress testing and benchmarks.
//!
//! Every currency gets a hidden "fair" price in a common numeraire. A quote
//! from `a` to `b` is `price[a] / price[b]` shaved by a spread, so no loop of
//! quotes multiplies above 1.0 and the fair cross rate bounds every path.

use crate::core::currency::{CurrencyCode, RateError, RateQuote};
use crate::graph::rate_graph::RateGraph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Configuration for generating a random rate network.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Number of currencies in the market.
    pub currency_count: usize,
    /// Average number of outgoing quotes per currency.
    pub quotes_per_currency: usize,
    /// Lower bound of the fair price range.
    pub min_price: f64,
    /// Upper bound of the fair price range.
    pub max_price: f64,
    /// Fraction shaved off every quote, in `[0, 1)`.
    pub spread: f64,
    /// Fixed seed for reproducible markets; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            currency_count: 10,
            quotes_per_currency: 3,
            min_price: 0.001,
            max_price: 1_000.0,
            spread: 0.001,
            seed: None,
        }
    }
}

/// A generated market: the hidden prices and the quotes derived from them.
#[derive(Debug, Clone)]
pub struct RandomMarket {
    pub prices: HashMap<CurrencyCode, f64>,
    pub quotes: Vec<RateQuote>,
}

impl RandomMarket {
    /// Currency codes, sorted.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        let mut codes: Vec<CurrencyCode> = self.prices.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Fair cross rate from `from` to `to`, ignoring the spread.
    pub fn fair_rate(&self, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
        Some(self.prices.get(from)? / self.prices.get(to)?)
    }

    pub fn to_graph(&self) -> Result<RateGraph, RateError> {
        RateGraph::from_quotes(self.quotes.iter().cloned())
    }
}

/// Generate a random, arbitrage-free rate network.
pub fn generate_random_market(config: &MarketConfig) -> RandomMarket {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let currencies: Vec<CurrencyCode> = (0..config.currency_count)
        .map(|i| CurrencyCode::new(format!("CUR-{:03}", i)))
        .collect();

    // Draw prices log-uniformly so small and large units are equally likely.
    let (low, high) = (config.min_price.ln(), config.max_price.ln());
    let prices: HashMap<CurrencyCode, f64> = currencies
        .iter()
        .map(|c| (c.clone(), rng.gen_range(low..=high).exp()))
        .collect();

    let mut quotes = Vec::new();
    if currencies.len() < 2 {
        return RandomMarket { prices, quotes };
    }

    let total_quotes = config.currency_count * config.quotes_per_currency;
    let keep = 1.0 - config.spread;
    for _ in 0..total_quotes {
        let from_idx = rng.gen_range(0..currencies.len());
        let mut to_idx = rng.gen_range(0..currencies.len());
        while to_idx == from_idx {
            to_idx = rng.gen_range(0..currencies.len());
        }

        let from = &currencies[from_idx];
        let to = &currencies[to_idx];
        let rate = prices[from] / prices[to] * keep;
        quotes.push(RateQuote::new(from.clone(), to.clone(), rate));
    }

    RandomMarket { prices, quotes }
}
