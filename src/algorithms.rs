pub mod dijkstra;
pub mod verification;
