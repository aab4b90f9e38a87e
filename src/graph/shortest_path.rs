//! Best-rate search over a [`RateGraph`].
//!
//! Rates are multiplied along a path, so the search works on `-ln(rate)`
//! weights and minimizes their sum. Two strategies are available:
//!
//! - **Dijkstra**: label-setting, priority-queue driven, exits as soon as the
//!   target is settled. Only sound when no weight is negative (no rate > 1.0).
//! - **Bellman-Ford**: repeated relaxation over the currencies reachable from
//!   the start. Tolerates negative weights and detects negative cycles.

use crate::core::currency::{format_cycle, CurrencyCode, RateError};
use crate::graph::rate_graph::RateGraph;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::fmt;

/// Which shortest-path algorithm answers a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Dijkstra when every weight is non-negative, Bellman-Ford otherwise.
    #[default]
    Auto,
    Dijkstra,
    BellmanFord,
}

/// Tuning for best-rate queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum log-space improvement for a relaxation to count.
    ///
    /// Consistent round trips (A -> B at r, B -> A at 1/r) sum to zero only up
    /// to rounding; without this slack they read as negative cycles.
    pub epsilon: f64,
    pub strategy: SearchStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-12,
            strategy: SearchStrategy::Auto,
        }
    }
}

/// Result of a successful best-rate query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRate {
    /// Units of the target currency per unit of the start currency.
    pub rate: f64,
    /// Currencies along the winning path, start and target included.
    pub path: Vec<CurrencyCode>,
}

impl BestRate {
    /// Number of conversions along the path.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

impl fmt::Display for BestRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<&str> = self.path.iter().map(CurrencyCode::as_str).collect();
        write!(f, "{} @ {}", path.join(" → "), self.rate)
    }
}

/// Find the best rate from `start` to `end` using the strategy in `config`.
pub fn best_rate(
    graph: &RateGraph,
    start: &CurrencyCode,
    end: &CurrencyCode,
    config: &SearchConfig,
) -> Result<BestRate, RateError> {
    if start == end {
        return Ok(BestRate {
            rate: 1.0,
            path: vec![start.clone()],
        });
    }

    match config.strategy {
        SearchStrategy::Dijkstra if graph.has_negative_weights() => {
            Err(RateError::NegativeWeight {
                count: graph.negative_edge_count(),
            })
        }
        SearchStrategy::Dijkstra => dijkstra(graph, start, end, config.epsilon),
        SearchStrategy::BellmanFord => bellman_ford(graph, start, end, config.epsilon),
        SearchStrategy::Auto if graph.has_negative_weights() => {
            debug!(
                "{} rates above 1.0, using Bellman-Ford for {} -> {}",
                graph.negative_edge_count(),
                start,
                end
            );
            bellman_ford(graph, start, end, config.epsilon)
        }
        SearchStrategy::Auto => {
            debug!("all weights non-negative, using Dijkstra for {} -> {}", start, end);
            dijkstra(graph, start, end, config.epsilon)
        }
    }
}

/// Priority-queue entry, ordered so the smallest distance pops first.
#[derive(Debug)]
struct QueueEntry<'a> {
    distance: f64,
    currency: &'a CurrencyCode,
}

impl PartialEq for QueueEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry<'_> {}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.currency.cmp(self.currency))
    }
}

fn dijkstra(
    graph: &RateGraph,
    start: &CurrencyCode,
    end: &CurrencyCode,
    epsilon: f64,
) -> Result<BestRate, RateError> {
    let mut distances: HashMap<&CurrencyCode, f64> = HashMap::new();
    let mut predecessors: HashMap<&CurrencyCode, &CurrencyCode> = HashMap::new();
    let mut queue = BinaryHeap::new();

    distances.insert(start, 0.0);
    queue.push(QueueEntry {
        distance: 0.0,
        currency: start,
    });

    while let Some(QueueEntry { distance, currency }) = queue.pop() {
        if currency == end {
            let path = trace_path(&predecessors, start, end, graph.currency_count())?;
            return finish(start, end, distance, path);
        }

        // Stale entry: a shorter route was queued after this one.
        if distances.get(currency).is_some_and(|&best| distance > best) {
            continue;
        }

        for edge in graph.outgoing(currency) {
            let candidate = distance + edge.weight;
            if improves(candidate, distances.get(&edge.to).copied(), epsilon) {
                trace!("relax {} -> {} to {:.9}", currency, edge.to, candidate);
                distances.insert(&edge.to, candidate);
                predecessors.insert(&edge.to, currency);
                queue.push(QueueEntry {
                    distance: candidate,
                    currency: &edge.to,
                });
            }
        }
    }

    Err(RateError::PathNotFound {
        from: start.clone(),
        to: end.clone(),
    })
}

fn bellman_ford(
    graph: &RateGraph,
    start: &CurrencyCode,
    end: &CurrencyCode,
    epsilon: f64,
) -> Result<BestRate, RateError> {
    let reachable = reachable_from(graph, start);
    let mut distances: HashMap<&CurrencyCode, f64> = HashMap::new();
    let mut predecessors: HashMap<&CurrencyCode, &CurrencyCode> = HashMap::new();
    distances.insert(start, 0.0);

    // A shortest path visits each reachable currency at most once, so
    // |reachable| - 1 rounds settle every distance.
    for round in 1..reachable.len() {
        let mut changed = false;
        for &currency in &reachable {
            let Some(&distance) = distances.get(currency) else {
                continue;
            };
            for edge in graph.outgoing(currency) {
                let candidate = distance + edge.weight;
                if improves(candidate, distances.get(&edge.to).copied(), epsilon) {
                    trace!(
                        "round {}: relax {} -> {} to {:.9}",
                        round,
                        currency,
                        edge.to,
                        candidate
                    );
                    distances.insert(&edge.to, candidate);
                    predecessors.insert(&edge.to, currency);
                    changed = true;
                }
            }
        }
        if !changed {
            debug!("Bellman-Ford settled after {} rounds", round);
            break;
        }
    }

    // Relaxation that continues past that point is fed by a negative cycle.
    // Keep relaxing until the predecessor chain of a relaxed currency closes
    // on itself, then report that loop.
    let mut last_relaxed = None;
    for _ in 0..reachable.len().max(1) {
        let mut relaxed = Vec::new();
        for &currency in &reachable {
            let Some(&distance) = distances.get(currency) else {
                continue;
            };
            for edge in graph.outgoing(currency) {
                let candidate = distance + edge.weight;
                if improves(candidate, distances.get(&edge.to).copied(), epsilon) {
                    distances.insert(&edge.to, candidate);
                    predecessors.insert(&edge.to, currency);
                    relaxed.push(&edge.to);
                }
            }
        }
        if relaxed.is_empty() {
            break;
        }
        if let Some(cycle) = relaxed
            .iter()
            .find_map(|&currency| predecessor_cycle(&predecessors, currency))
        {
            return Err(negative_cycle(start, Some(cycle)));
        }
        last_relaxed = relaxed.last().copied();
    }
    if let Some(currency) = last_relaxed {
        let cycle = predecessor_cycle(&predecessors, currency);
        return Err(negative_cycle(start, cycle));
    }

    match distances.get(end) {
        Some(&distance) => {
            let path = trace_path(&predecessors, start, end, reachable.len())?;
            finish(start, end, distance, path)
        }
        None => Err(RateError::PathNotFound {
            from: start.clone(),
            to: end.clone(),
        }),
    }
}

/// Map a path weight back to a rate. Weights past roughly ±745 leave the f64
/// range and would come back as 0 or infinity.
fn finish(
    start: &CurrencyCode,
    end: &CurrencyCode,
    distance: f64,
    path: Vec<CurrencyCode>,
) -> Result<BestRate, RateError> {
    let rate = (-distance).exp();
    if rate > 0.0 && rate.is_finite() {
        Ok(BestRate { rate, path })
    } else {
        Err(RateError::RateOutOfRange {
            from: start.clone(),
            to: end.clone(),
            log_rate: -distance,
        })
    }
}

fn improves(candidate: f64, current: Option<f64>, epsilon: f64) -> bool {
    match current {
        Some(current) => candidate < current - epsilon,
        None => true,
    }
}

/// Currencies reachable from `start` in breadth-first order, `start` first.
fn reachable_from<'a>(graph: &'a RateGraph, start: &'a CurrencyCode) -> Vec<&'a CurrencyCode> {
    let mut seen: HashSet<&CurrencyCode> = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    seen.insert(start);
    queue.push_back(start);
    while let Some(currency) = queue.pop_front() {
        order.push(currency);
        for edge in graph.outgoing(currency) {
            if seen.insert(&edge.to) {
                queue.push_back(&edge.to);
            }
        }
    }
    order
}

fn negative_cycle(start: &CurrencyCode, cycle: Option<Vec<CurrencyCode>>) -> RateError {
    match &cycle {
        Some(cycle) => warn!(
            "negative cycle reachable from {}: {}",
            start,
            format_cycle(cycle)
        ),
        None => warn!("negative cycle reachable from {}, loop not recovered", start),
    }
    RateError::InvalidGraph {
        start: start.clone(),
        cycle,
    }
}

/// Walk predecessors back from `end`. A walk longer than `limit` means the
/// predecessor chain loops, which only a negative cycle can cause.
fn trace_path(
    predecessors: &HashMap<&CurrencyCode, &CurrencyCode>,
    start: &CurrencyCode,
    end: &CurrencyCode,
    limit: usize,
) -> Result<Vec<CurrencyCode>, RateError> {
    let mut path = vec![end.clone()];
    let mut current = end;
    while current != start {
        match predecessors.get(current) {
            Some(&previous) if path.len() <= limit => {
                path.push(previous.clone());
                current = previous;
            }
            _ => {
                let cycle = predecessor_cycle(predecessors, end);
                return Err(negative_cycle(start, cycle));
            }
        }
    }
    path.reverse();
    Ok(path)
}

/// Follow predecessors back from `from` until a currency repeats or the chain
/// ends. Returns the repeating loop in forward order.
fn predecessor_cycle(
    predecessors: &HashMap<&CurrencyCode, &CurrencyCode>,
    from: &CurrencyCode,
) -> Option<Vec<CurrencyCode>> {
    let mut chain: Vec<&CurrencyCode> = vec![from];
    let mut position: HashMap<&CurrencyCode, usize> = HashMap::new();
    position.insert(from, 0);

    let mut current = from;
    while let Some(&previous) = predecessors.get(current) {
        if let Some(&index) = position.get(previous) {
            let mut cycle: Vec<CurrencyCode> =
                chain[index..].iter().map(|&c| c.clone()).collect();
            cycle.reverse();
            return Some(cycle);
        }
        position.insert(previous, chain.len());
        chain.push(previous);
        current = previous;
    }
    None
}
