use log::{info, warn};
use crate::RouterId;
use crate::algorithms::dijkstra::all_pairs_costs;
use crate::network::Topology;
use crate::protocol::RoutingTable;
use crate::types::Cost;

/// A route whose cost differs from the centralized shortest path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMismatch {
    pub source: RouterId,
    pub destination: RouterId,
    pub expected: Cost,
    pub actual: Cost,
}

/// Compares the costs in `tables` with an all-pairs Dijkstra run over the
/// same topology. Next hops are not compared: equal-cost paths may be
/// legitimately chosen differently.
pub fn find_route_mismatches(topology: &Topology, tables: &[RoutingTable]) -> Vec<RouteMismatch> {
    let reference = all_pairs_costs(topology);
    let mut mismatches = Vec::new();

    for table in tables {
        let Some(expected_costs) = reference.get(&table.owner) else {
            continue;
        };

        for (destination, &expected) in expected_costs {
            let actual = table
                .get_route(destination)
                .map_or(Cost::Unreachable, |entry| entry.cost);

            if actual != expected {
                warn!(
                    "{} -> {}: simulated cost {} but shortest path costs {}",
                    table.owner, destination, actual, expected
                );
                mismatches.push(RouteMismatch {
                    source: table.owner.clone(),
                    destination: destination.clone(),
                    expected,
                    actual,
                });
            }
        }
    }

    if mismatches.is_empty() {
        info!("All routes match the centralized shortest paths");
    }

    mismatches
}
