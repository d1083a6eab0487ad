use std::collections::HashMap;
use crate::RouterId;
use crate::types::Cost;

/// Answers "what does the direct link between `a` and `b` cost".
pub trait LinkCostResolver {
    /// `Cost::Unreachable` when the two nodes are not directly connected.
    fn cost(&self, a: &str, b: &str) -> Cost;
}

/// Undirected link costs. Each pair is stored once, under whichever
/// ordering it was inserted with; lookups check both.
#[derive(Debug, Clone, Default)]
pub struct LinkCosts {
    costs: HashMap<RouterId, HashMap<RouterId, u32>>,
    len: usize,
}

impl LinkCosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and leaves the table untouched if the pair already
    /// has a cost under either ordering.
    pub fn insert(&mut self, a: &str, b: &str, cost: u32) -> bool {
        if self.contains(a, b) {
            return false;
        }

        self.costs
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string(), cost);
        self.len += 1;
        true
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.lookup(a, b).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn lookup(&self, a: &str, b: &str) -> Option<u32> {
        self.costs
            .get(a)
            .and_then(|row| row.get(b))
            .or_else(|| self.costs.get(b).and_then(|row| row.get(a)))
            .copied()
    }
}

impl LinkCostResolver for LinkCosts {
    fn cost(&self, a: &str, b: &str) -> Cost {
        self.lookup(a, b).into()
    }
}
