use crate::core::currency::{format_cycle, CurrencyCode};
use crate::graph::rate_graph::RateGraph;
use log::debug;
use petgraph::algo::find_negative_cycle;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A loop of conversions whose rates multiply to more than 1.0.
///
/// Such a loop makes "best rate" unbounded for every currency that can
/// reach it, and usually points at stale or inconsistent quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitrageCycle {
    /// Currencies in conversion order. The last converts back to the first.
    pub currencies: Vec<CurrencyCode>,
    /// Product of the best rates around the loop.
    pub gain: f64,
}

impl ArbitrageCycle {
    /// The number of currencies (and conversions) in this cycle.
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Relative profit of one trip around the loop, e.g. 0.05 for 5%.
    pub fn profit(&self) -> f64 {
        self.gain - 1.0
    }
}

impl fmt::Display for ArbitrageCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (x{:.6})", format_cycle(&self.currencies), self.gain)
    }
}

/// Log-space projection of a [`RateGraph`] for petgraph's algorithms.
struct Projection {
    graph: DiGraph<CurrencyCode, f64>,
    nodes: HashMap<CurrencyCode, NodeIndex>,
}

impl Projection {
    fn build(rates: &RateGraph) -> Self {
        let mut currencies: Vec<&CurrencyCode> = rates.currencies().iter().collect();
        currencies.sort();

        let mut graph = DiGraph::with_capacity(currencies.len(), rates.edge_count());
        let mut nodes = HashMap::new();
        for currency in currencies {
            nodes.insert(currency.clone(), graph.add_node(currency.clone()));
        }
        for (from, edge) in rates.edges() {
            graph.add_edge(nodes[from], nodes[&edge.to], edge.weight);
        }
        Self { graph, nodes }
    }

    /// Turn a node cycle into an [`ArbitrageCycle`], using the best parallel
    /// edge for each hop. `None` if a hop has no edge.
    fn to_cycle(&self, cycle: &[NodeIndex]) -> Option<ArbitrageCycle> {
        let mut total_weight = 0.0;
        for (i, &from) in cycle.iter().enumerate() {
            let to = cycle[(i + 1) % cycle.len()];
            let best = self
                .graph
                .edges_connecting(from, to)
                .map(|edge| *edge.weight())
                .min_by(f64::total_cmp)?;
            total_weight += best;
        }
        Some(ArbitrageCycle {
            currencies: cycle.iter().map(|&n| self.graph[n].clone()).collect(),
            gain: (-total_weight).exp(),
        })
    }
}

/// Find an arbitrage loop reachable from `start`, if any.
pub fn find_arbitrage_from(rates: &RateGraph, start: &CurrencyCode) -> Option<ArbitrageCycle> {
    let projection = Projection::build(rates);
    let &source = projection.nodes.get(start)?;
    scan(&projection, source, rates.config().epsilon)
}

/// Find any arbitrage loop in the graph.
///
/// Sources are tried in currency order, so the result is deterministic for a
/// given set of rates.
pub fn find_arbitrage(rates: &RateGraph) -> Option<ArbitrageCycle> {
    let projection = Projection::build(rates);
    let epsilon = rates.config().epsilon;
    projection
        .graph
        .node_indices()
        .find_map(|source| scan(&projection, source, epsilon))
}

fn scan(projection: &Projection, source: NodeIndex, epsilon: f64) -> Option<ArbitrageCycle> {
    let nodes = find_negative_cycle(&projection.graph, source)?;
    let cycle = projection.to_cycle(&nodes)?;
    // Rounding on consistent round trips can dip just below zero.
    if cycle.gain.ln() <= epsilon {
        debug!(
            "ignoring rounding-level cycle from {}: {}",
            projection.graph[source], cycle
        );
        return None;
    }
    debug!("arbitrage from {}: {}", projection.graph[source], cycle);
    Some(cycle)
}
