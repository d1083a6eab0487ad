use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use crate::RouterId;
use crate::network::Topology;
use crate::types::Cost;

/// Centralized shortest path from one source, computed with full knowledge
/// of the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub cost: u32,
    pub next_hop: Option<RouterId>,
    pub path: Vec<RouterId>,
}

#[derive(Debug)]
struct State {
    cost: u32,
    router: RouterId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.router == other.router
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.router.cmp(&self.router))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Paths from `source` to every reachable node other than itself.
pub fn calculate_shortest_paths(topology: &Topology, source: &str) -> HashMap<RouterId, ShortestPath> {
    if !topology.contains(source) {
        return HashMap::new();
    }

    let mut distances: HashMap<RouterId, u32> = HashMap::new();
    let mut previous: HashMap<RouterId, RouterId> = HashMap::new();
    let mut heap = BinaryHeap::new();

    distances.insert(source.to_string(), 0);
    heap.push(State {
        cost: 0,
        router: source.to_string(),
    });

    while let Some(State { cost, router }) = heap.pop() {
        // Skip if we've already found a better path
        if distances.get(&router).is_some_and(|&best| cost > best) {
            continue;
        }

        for (neighbor, link_cost) in topology.get_neighbors(&router) {
            let Some(new_cost) = cost.checked_add(link_cost) else {
                continue;
            };

            if distances.get(&neighbor).is_none_or(|&best| new_cost < best) {
                distances.insert(neighbor.clone(), new_cost);
                previous.insert(neighbor.clone(), router.clone());
                heap.push(State {
                    cost: new_cost,
                    router: neighbor,
                });
            }
        }
    }

    distances
        .into_iter()
        .filter(|(destination, _)| destination != source)
        .map(|(destination, cost)| {
            let path = reconstruct_path(&previous, &destination);
            let next_hop = path.get(1).cloned();
            (destination, ShortestPath { cost, next_hop, path })
        })
        .collect()
}

/// Cost from every node to every other node; unreachable pairs included.
pub fn all_pairs_costs(topology: &Topology) -> BTreeMap<RouterId, BTreeMap<RouterId, Cost>> {
    topology
        .nodes()
        .iter()
        .map(|source| {
            let paths = calculate_shortest_paths(topology, source);
            let costs: BTreeMap<RouterId, Cost> = topology
                .nodes()
                .iter()
                .filter(|destination| *destination != source)
                .map(|destination| {
                    let cost: Cost = paths.get(destination).map(|path| path.cost).into();
                    (destination.clone(), cost)
                })
                .collect();
            (source.clone(), costs)
        })
        .collect()
}

fn reconstruct_path(previous: &HashMap<RouterId, RouterId>, dest: &str) -> Vec<RouterId> {
    let mut path = vec![dest.to_string()];
    let mut current = dest;

    while let Some(prev) = previous.get(current) {
        path.push(prev.clone());
        current = prev.as_str();
    }

    path.reverse();
    path
}
