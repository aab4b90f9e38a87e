use crate::core::currency::{CurrencyCode, RateError, RateQuote};
use crate::graph::shortest_path::{self, BestRate, SearchConfig};
use log::debug;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// A directed conversion edge stored in log space.
#[derive(Debug, Clone, PartialEq)]
pub struct RateEdge {
    pub to: CurrencyCode,
    /// `-ln(rate)`. Negative whenever the quoted rate exceeds 1.0.
    pub weight: f64,
}

impl RateEdge {
    /// The quoted rate this edge was built from.
    pub fn rate(&self) -> f64 {
        (-self.weight).exp()
    }
}

/// A directed, weighted graph of exchange rates keyed by currency.
///
/// Each `add_rate(from, to, r)` call appends one edge; the reverse direction
/// is never implied. Parallel edges between the same pair are all kept and
/// all considered by queries.
///
/// # Examples
///
/// ```
/// use rate_graph::prelude::*;
///
/// let mut graph = RateGraph::new();
/// graph.add_rate("USD", "EUR", 0.9).unwrap();
/// graph.add_rate("EUR", "JPY", 120.0).unwrap();
///
/// let rate = graph
///     .find_best_rate(&CurrencyCode::new("USD"), &CurrencyCode::new("JPY"))
///     .unwrap();
/// assert!((rate - 108.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct RateGraph {
    /// Outgoing edges per currency, in insertion order.
    adjacency: HashMap<CurrencyCode, Vec<RateEdge>>,
    /// Every currency seen as a source or target.
    currencies: HashSet<CurrencyCode>,
    edge_count: usize,
    negative_edges: usize,
    config: SearchConfig,
}

#[derive(Deserialize)]
struct QuotesFile {
    rates: Vec<RateQuote>,
}

impl RateGraph {
    pub fn new() -> Self {
        Self::with_config(SearchConfig::default())
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            adjacency: HashMap::new(),
            currencies: HashSet::new(),
            edge_count: 0,
            negative_edges: 0,
            config,
        }
    }

    /// Insert a directed edge: 1 unit of `from` buys `rate` units of `to`.
    ///
    /// Rejects zero, negative and non-finite rates without touching the graph.
    pub fn add_rate(
        &mut self,
        from: impl Into<CurrencyCode>,
        to: impl Into<CurrencyCode>,
        rate: f64,
    ) -> Result<(), RateError> {
        let from = from.into();
        let to = to.into();
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(RateError::InvalidRate { from, to, rate });
        }

        let weight = -rate.ln();
        debug!("add rate {} -> {} = {} (weight {:.6})", from, to, rate, weight);
        if weight < 0.0 {
            self.negative_edges += 1;
        }
        self.edge_count += 1;
        self.currencies.insert(from.clone());
        self.currencies.insert(to.clone());
        self.adjacency
            .entry(from)
            .or_default()
            .push(RateEdge { to, weight });
        Ok(())
    }

    /// Insert a single quote.
    pub fn add_quote(&mut self, quote: RateQuote) -> Result<(), RateError> {
        self.add_rate(quote.from, quote.to, quote.rate)
    }

    /// Build a graph from a sequence of quotes, stopping at the first invalid one.
    pub fn from_quotes(quotes: impl IntoIterator<Item = RateQuote>) -> Result<Self, RateError> {
        let mut graph = Self::new();
        for quote in quotes {
            graph.add_quote(quote)?;
        }
        Ok(graph)
    }

    /// Build a graph from JSON of the form `{"rates": [{"from", "to", "rate"}]}`.
    pub fn from_json(json: &str) -> Result<Self, RateError> {
        let file: QuotesFile = serde_json::from_str(json)?;
        Self::from_quotes(file.rates)
    }

    /// Best achievable rate from `start` to `end`, in units of `end` per unit of `start`.
    pub fn find_best_rate(
        &self,
        start: &CurrencyCode,
        end: &CurrencyCode,
    ) -> Result<f64, RateError> {
        self.find_best_path(start, end).map(|best| best.rate)
    }

    /// Best achievable rate together with the chain of currencies that yields it.
    pub fn find_best_path(
        &self,
        start: &CurrencyCode,
        end: &CurrencyCode,
    ) -> Result<BestRate, RateError> {
        shortest_path::best_rate(self, start, end, &self.config)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Outgoing edges from a currency, in insertion order.
    pub fn outgoing(&self, currency: &CurrencyCode) -> &[RateEdge] {
        self.adjacency
            .get(currency)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All edges as (from, edge).
    pub fn edges(&self) -> impl Iterator<Item = (&CurrencyCode, &RateEdge)> {
        self.adjacency
            .iter()
            .flat_map(|(from, edges)| edges.iter().map(move |edge| (from, edge)))
    }

    /// All currencies in the graph.
    pub fn currencies(&self) -> &HashSet<CurrencyCode> {
        &self.currencies
    }

    pub fn contains(&self, currency: &CurrencyCode) -> bool {
        self.currencies.contains(currency)
    }

    /// Number of unique currencies.
    pub fn currency_count(&self) -> usize {
        self.currencies.len()
    }

    /// Number of edges, parallel edges counted individually.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of edges whose rate exceeds 1.0.
    pub fn negative_edge_count(&self) -> usize {
        self.negative_edges
    }

    pub fn has_negative_weights(&self) -> bool {
        self.negative_edges > 0
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}

impl Default for RateGraph {
    fn default() -> Self {
        Self::new()
    }
}
