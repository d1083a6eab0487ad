use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::RouterId;
use crate::types::Cost;

/// A node's best known cost to every node of the network, itself included.
pub type DistanceVector = BTreeMap<RouterId, Cost>;

/// Read-only export of one node's tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    pub owner: RouterId,
    entries: BTreeMap<RouterId, RoutingEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingEntry {
    pub destination: RouterId,
    pub next_hop: Option<RouterId>,
    pub cost: Cost,
}

impl RoutingEntry {
    pub fn is_reachable(&self) -> bool {
        self.cost.is_finite()
    }
}

impl RoutingTable {
    pub fn new(owner: RouterId) -> Self {
        Self {
            owner,
            entries: BTreeMap::new(),
        }
    }

    pub fn add_route(&mut self, entry: RoutingEntry) {
        self.entries.insert(entry.destination.clone(), entry);
    }

    pub fn get_route(&self, destination: &str) -> Option<&RoutingEntry> {
        self.entries.get(destination)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by destination.
    pub fn iter(&self) -> impl Iterator<Item = &RoutingEntry> {
        self.entries.values()
    }

    pub fn reachable_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_reachable()).count()
    }
}
