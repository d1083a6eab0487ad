use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use crate::RouterId;
use crate::error::ConfigurationError;
use crate::network::{LinkCostResolver, LinkCosts};
use crate::types::Cost;

/// An undirected link as it appears in topology input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: RouterId,
    pub to: RouterId,
    pub cost: i64,
}

impl Link {
    pub fn new(from: &str, to: &str, cost: i64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            cost,
        }
    }
}

/// Validated, immutable network: node set, symmetric adjacency and one
/// positive cost per adjacent pair.
///
/// Node declaration order is kept; it is the default round-robin order of
/// the simulation.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<RouterId>,
    adjacency: HashMap<RouterId, Vec<RouterId>>,
    link_costs: LinkCosts,
}

impl Topology {
    pub fn new(
        nodes: Vec<RouterId>,
        adjacency: HashMap<RouterId, Vec<RouterId>>,
        costs: Vec<Link>,
    ) -> Result<Self, ConfigurationError> {
        let mut known = HashSet::new();
        for node in &nodes {
            if !known.insert(node.as_str()) {
                return Err(ConfigurationError::DuplicateNode(node.clone()));
            }
        }

        let mut undefined: Vec<&RouterId> = adjacency
            .keys()
            .filter(|id| !known.contains(id.as_str()))
            .collect();
        undefined.sort();
        if let Some(id) = undefined.first() {
            return Err(ConfigurationError::UnknownNode((*id).clone()));
        }

        for node in &nodes {
            let neighbors = adjacency.get(node).map(Vec::as_slice).unwrap_or_default();
            let mut seen = HashSet::new();

            for neighbor in neighbors {
                if !known.contains(neighbor.as_str()) {
                    return Err(ConfigurationError::UnknownNeighbor {
                        node: node.clone(),
                        neighbor: neighbor.clone(),
                    });
                }
                if neighbor == node {
                    return Err(ConfigurationError::SelfLoop(node.clone()));
                }
                if !seen.insert(neighbor.as_str()) {
                    return Err(ConfigurationError::DuplicateLink {
                        a: node.clone(),
                        b: neighbor.clone(),
                    });
                }
            }
        }

        for node in &nodes {
            for neighbor in adjacency.get(node).into_iter().flatten() {
                let lists_back = adjacency
                    .get(neighbor)
                    .is_some_and(|back| back.contains(node));
                if !lists_back {
                    return Err(ConfigurationError::AsymmetricAdjacency {
                        from: node.clone(),
                        to: neighbor.clone(),
                    });
                }
            }
        }

        let mut link_costs = LinkCosts::new();
        for link in costs {
            for endpoint in [&link.from, &link.to] {
                if !known.contains(endpoint.as_str()) {
                    return Err(ConfigurationError::UnknownNode(endpoint.clone()));
                }
            }
            if link.from == link.to {
                return Err(ConfigurationError::SelfLoop(link.from));
            }

            let adjacent = adjacency
                .get(&link.from)
                .is_some_and(|neighbors| neighbors.contains(&link.to));
            if !adjacent {
                return Err(ConfigurationError::UnexpectedCost { a: link.from, b: link.to });
            }

            if link.cost <= 0 {
                return Err(ConfigurationError::NonPositiveCost {
                    a: link.from,
                    b: link.to,
                    cost: link.cost,
                });
            }
            let cost = u32::try_from(link.cost).map_err(|_| ConfigurationError::CostOutOfRange {
                a: link.from.clone(),
                b: link.to.clone(),
                cost: link.cost,
                max: u32::MAX,
            })?;

            if !link_costs.insert(&link.from, &link.to, cost) {
                return Err(ConfigurationError::DuplicateLink { a: link.from, b: link.to });
            }
        }

        for node in &nodes {
            for neighbor in adjacency.get(node).into_iter().flatten() {
                if !link_costs.contains(node, neighbor) {
                    return Err(ConfigurationError::MissingCost {
                        a: node.clone(),
                        b: neighbor.clone(),
                    });
                }
            }
        }

        Ok(Self {
            nodes,
            adjacency,
            link_costs,
        })
    }

    /// Builds the symmetric adjacency from an undirected link list, the way
    /// links are entered by hand: each `A B cost` line makes A and B
    /// neighbors of each other.
    pub fn from_links(nodes: Vec<RouterId>, links: Vec<Link>) -> Result<Self, ConfigurationError> {
        let mut adjacency: HashMap<RouterId, Vec<RouterId>> = HashMap::new();

        for link in &links {
            adjacency.entry(link.from.clone()).or_default().push(link.to.clone());
            adjacency.entry(link.to.clone()).or_default().push(link.from.clone());
        }

        Self::new(nodes, adjacency, links)
    }

    pub fn nodes(&self) -> &[RouterId] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, router_id: &str) -> bool {
        self.nodes.iter().any(|id| id == router_id)
    }

    /// Neighbors in declaration order. Empty for isolated or unknown nodes.
    pub fn neighbors(&self, router_id: &str) -> &[RouterId] {
        self.adjacency
            .get(router_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get_neighbors(&self, router_id: &str) -> Vec<(RouterId, u32)> {
        self.neighbors(router_id)
            .iter()
            .filter_map(|neighbor| {
                self.link_costs
                    .cost(router_id, neighbor)
                    .value()
                    .map(|cost| (neighbor.clone(), cost))
            })
            .collect()
    }

    pub fn link_count(&self) -> usize {
        self.link_costs.len()
    }
}

impl LinkCostResolver for Topology {
    fn cost(&self, a: &str, b: &str) -> Cost {
        self.link_costs.cost(a, b)
    }
}
