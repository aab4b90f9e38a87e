pub mod arbitrage;
pub mod rate_graph;
pub mod shortest_path;
