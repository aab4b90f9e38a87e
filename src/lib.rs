//! # rate-graph
//!
//! Best-rate currency conversion over a directed graph of exchange rates.
//!
//! Quotes are stored as `-ln(rate)` edge weights, turning "maximize the
//! product of rates along a path" into a shortest-path problem.
//!
//! ## Architecture
//!
//! - **core** — Currency codes, rate quotes, errors
//! - **graph** — The rate graph, best-rate search, arbitrage detection
//! - **simulation** — Random arbitrage-free markets for stress testing

pub mod core;
pub mod graph;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::currency::{CurrencyCode, RateError, RateQuote};
    pub use crate::graph::arbitrage::{find_arbitrage, ArbitrageCycle};
    pub use crate::graph::rate_graph::{RateEdge, RateGraph};
    pub use crate::graph::shortest_path::{BestRate, SearchConfig, SearchStrategy};
}
