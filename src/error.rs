use crate::RouterId;
use thiserror::Error;

/// Malformed topology or link costs. Raised before any simulation state
/// exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("node {0} is declared more than once")]
    DuplicateNode(RouterId),

    #[error("adjacency references undefined node {0}")]
    UnknownNode(RouterId),

    #[error("node {node} lists undefined neighbor {neighbor}")]
    UnknownNeighbor { node: RouterId, neighbor: RouterId },

    #[error("node {0} is linked to itself")]
    SelfLoop(RouterId),

    #[error("link {a}-{b} is declared more than once")]
    DuplicateLink { a: RouterId, b: RouterId },

    #[error("asymmetric adjacency: {from} lists {to} but {to} does not list {from}")]
    AsymmetricAdjacency { from: RouterId, to: RouterId },

    #[error("link {a}-{b} has non-positive cost {cost}")]
    NonPositiveCost { a: RouterId, b: RouterId, cost: i64 },

    #[error("link {a}-{b} cost {cost} is larger than {max}")]
    CostOutOfRange { a: RouterId, b: RouterId, cost: i64, max: u32 },

    #[error("link {a}-{b} has no cost")]
    MissingCost { a: RouterId, b: RouterId },

    #[error("cost given for {a}-{b} but the nodes are not neighbors")]
    UnexpectedCost { a: RouterId, b: RouterId },

    #[error("round-robin order is not a permutation of the nodes: {0}")]
    InvalidOrder(String),
}

/// Failure while loading simulation settings or topology input.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    #[error(transparent)]
    Topology(#[from] ConfigurationError),
}

/// Why no hop-by-hop route could be read from the converged tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("routing tables are still converging")]
    NotConverged,

    #[error("unknown node {0}")]
    UnknownNode(RouterId),

    #[error("source and destination are both {0}")]
    SameNode(RouterId),

    #[error("no path exists from {from} to {to}")]
    NoPath { from: RouterId, to: RouterId },

    #[error("path from {from} to {to} is incomplete at {at}")]
    Incomplete { from: RouterId, to: RouterId, at: RouterId },

    #[error("loop detected on the path from {from} to {to}")]
    LoopDetected { from: RouterId, to: RouterId },
}
