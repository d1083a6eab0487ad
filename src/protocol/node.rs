use std::collections::{BTreeMap, HashMap};
use log::debug;
use crate::RouterId;
use crate::network::LinkCostResolver;
use crate::protocol::{DistanceVector, RoutingEntry, RoutingTable};
use crate::types::Cost;

/// One router's view of the network.
///
/// A node only knows its neighbors and the cost of the links to them. It
/// learns about everything else from the vectors its neighbors hand it, and
/// it is the only party that ever writes its own tables.
#[derive(Debug, Clone)]
pub struct DistanceVectorNode {
    id: RouterId,
    neighbors: Vec<RouterId>,
    link_costs: HashMap<RouterId, Cost>,
    destinations: Vec<RouterId>,
    distance_vector: DistanceVector,
    next_hop: BTreeMap<RouterId, Option<RouterId>>,
    changed_this_round: bool,
}

impl DistanceVectorNode {
    /// Seeds the vector with one-hop knowledge: 0 to itself, the link cost
    /// to each directly connected neighbor, unreachable for everyone else.
    pub fn new<R>(id: RouterId, neighbors: Vec<RouterId>, all_nodes: &[RouterId], resolver: &R) -> Self
    where
        R: LinkCostResolver + ?Sized,
    {
        let mut distance_vector: DistanceVector = all_nodes
            .iter()
            .map(|node| (node.clone(), Cost::Unreachable))
            .collect();
        distance_vector.insert(id.clone(), Cost::ZERO);

        let mut next_hop: BTreeMap<RouterId, Option<RouterId>> =
            all_nodes.iter().map(|node| (node.clone(), None)).collect();

        let mut link_costs = HashMap::new();
        for neighbor in &neighbors {
            let cost = resolver.cost(&id, neighbor);
            link_costs.insert(neighbor.clone(), cost);

            if cost.is_finite() {
                distance_vector.insert(neighbor.clone(), cost);
                next_hop.insert(neighbor.clone(), Some(neighbor.clone()));
            }
        }

        let destinations = all_nodes
            .iter()
            .filter(|node| **node != id)
            .cloned()
            .collect();

        Self {
            id,
            neighbors,
            link_costs,
            destinations,
            distance_vector,
            next_hop,
            changed_this_round: false,
        }
    }

    /// Bellman-Ford relaxation over the vectors received from direct
    /// neighbors. Vectors from anyone else are ignored, destinations absent
    /// from a vector count as unreachable, and only a strictly cheaper path
    /// replaces the current one.
    ///
    /// Returns whether any destination changed.
    pub fn update_from_neighbors(&mut self, received: &HashMap<RouterId, DistanceVector>) -> bool {
        let mut updated = false;

        for neighbor in &self.neighbors {
            let Some(vector) = received.get(neighbor) else {
                continue;
            };
            let link_cost = self.link_costs.get(neighbor).copied().unwrap_or_default();

            for destination in &self.destinations {
                let advertised = vector.get(destination).copied().unwrap_or_default();
                let candidate = link_cost + advertised;
                let current = self.distance_vector.get(destination).copied().unwrap_or_default();

                if candidate < current {
                    debug!(
                        "{}: route to {} via {} cost {} (was {})",
                        self.id, destination, neighbor, candidate, current
                    );
                    self.distance_vector.insert(destination.clone(), candidate);
                    self.next_hop.insert(destination.clone(), Some(neighbor.clone()));
                    updated = true;
                }
            }
        }

        if updated {
            self.changed_this_round = true;
        }

        updated
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn neighbors(&self) -> &[RouterId] {
        &self.neighbors
    }

    pub fn distance_vector(&self) -> &DistanceVector {
        &self.distance_vector
    }

    /// Copy of the current vector, as handed to neighbors.
    pub fn snapshot(&self) -> DistanceVector {
        self.distance_vector.clone()
    }

    pub fn cost_to(&self, destination: &str) -> Cost {
        self.distance_vector.get(destination).copied().unwrap_or_default()
    }

    pub fn next_hop(&self, destination: &str) -> Option<&str> {
        self.next_hop.get(destination).and_then(|hop| hop.as_deref())
    }

    pub fn routing_table(&self) -> RoutingTable {
        let mut table = RoutingTable::new(self.id.clone());
        for destination in &self.destinations {
            table.add_route(RoutingEntry {
                destination: destination.clone(),
                next_hop: self.next_hop(destination).map(str::to_string),
                cost: self.cost_to(destination),
            });
        }
        table
    }

    pub fn changed_this_round(&self) -> bool {
        self.changed_this_round
    }

    pub fn reset_round_flag(&mut self) {
        self.changed_this_round = false;
    }
}
