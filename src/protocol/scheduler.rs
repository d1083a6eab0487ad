use std::collections::{HashMap, HashSet};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use crate::RouterId;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, ConfigurationError, PathError};
use crate::network::Topology;
use crate::protocol::{DistanceVector, DistanceVectorNode, RoutingTable};
use crate::types::Cost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationStatus {
    Running,
    Converged,
    MaxIterationsReached,
}

impl SimulationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SimulationStatus::Running)
    }
}

/// Everything a renderer needs about one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    /// 1-based count of executed turns.
    pub turn: usize,
    pub round: usize,
    pub node: RouterId,
    pub distance_vector: DistanceVector,
    pub routing_table: RoutingTable,
    pub changed: bool,
    /// Nodes whose tables changed so far in this round, acting node included.
    pub updated_this_round: Vec<RouterId>,
    pub stable_rounds: usize,
    pub status: SimulationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Turn(TurnReport),
    Finished(SimulationStatus),
}

/// Hop-by-hop route obtained by following next hops from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePath {
    pub hops: Vec<RouterId>,
    pub cost: Cost,
}

#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub status: SimulationStatus,
    pub rounds: usize,
    pub turns: usize,
    pub trace: Vec<TurnReport>,
}

/// Round-robin driver of the distance vector exchange.
///
/// One call to [`step`](Self::step) is one turn: the next node in the fixed
/// order reads copies of its neighbors' current vectors and relaxes its own.
/// N turns make a round. Once `stability_threshold` consecutive rounds pass
/// without any node changing, the simulation is converged; after
/// `max_rounds` rounds it stops regardless.
#[derive(Debug, Clone)]
pub struct ConvergenceScheduler {
    nodes: Vec<DistanceVectorNode>,
    positions: HashMap<RouterId, usize>,
    stability_threshold: usize,
    max_rounds: usize,
    max_turns: usize,
    turn: usize,
    round: usize,
    stable_rounds: usize,
    round_had_update: bool,
    status: SimulationStatus,
}

impl ConvergenceScheduler {
    pub fn new(topology: &Topology, config: &SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let order = match &config.order {
            Some(order) => {
                check_order(topology, order)?;
                order.clone()
            }
            None => topology.nodes().to_vec(),
        };

        Ok(Self::build(
            topology,
            order,
            config.stability_threshold,
            config.max_rounds_for(topology.node_count()),
        ))
    }

    pub fn with_defaults(topology: &Topology) -> Self {
        let config = SimulationConfig::default();
        Self::build(
            topology,
            topology.nodes().to_vec(),
            config.stability_threshold,
            config.max_rounds_for(topology.node_count()),
        )
    }

    fn build(topology: &Topology, order: Vec<RouterId>, stability_threshold: usize, max_rounds: usize) -> Self {
        let order_len = order.len();
        let nodes: Vec<DistanceVectorNode> = order
            .iter()
            .map(|id| {
                DistanceVectorNode::new(
                    id.clone(),
                    topology.neighbors(id).to_vec(),
                    topology.nodes(),
                    topology,
                )
            })
            .collect();

        let positions = order
            .into_iter()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();

        info!(
            "Simulation ready: {} nodes, {} links, stability threshold {}, max {} rounds",
            topology.node_count(),
            topology.link_count(),
            stability_threshold,
            max_rounds
        );

        Self {
            nodes,
            positions,
            stability_threshold,
            max_rounds,
            max_turns: max_rounds.saturating_mul(order_len),
            turn: 0,
            round: 0,
            stable_rounds: 0,
            round_had_update: false,
            status: SimulationStatus::Running,
        }
    }

    /// Runs the next turn. A call at a round boundary that meets the
    /// stability threshold runs no turn and returns `Finished(Converged)`;
    /// once terminal, every call returns `Finished` without touching state.
    pub fn step(&mut self) -> StepOutcome {
        if self.status.is_terminal() {
            return StepOutcome::Finished(self.status);
        }

        if self.nodes.is_empty() {
            self.status = SimulationStatus::Converged;
            return StepOutcome::Finished(self.status);
        }

        let position = self.turn % self.nodes.len();

        if position == 0 {
            for node in &mut self.nodes {
                node.reset_round_flag();
            }

            if self.turn > 0 {
                if self.round_had_update {
                    self.stable_rounds = 0;
                } else {
                    self.stable_rounds += 1;
                    if self.stable_rounds >= self.stability_threshold {
                        self.status = SimulationStatus::Converged;
                        info!(
                            "Converged after {} rounds ({} turns)",
                            self.round, self.turn
                        );
                        return StepOutcome::Finished(self.status);
                    }
                }
            }

            self.round += 1;
            self.round_had_update = false;
            debug!("Round {} (stable for {})", self.round, self.stable_rounds);
        }

        let received: HashMap<RouterId, DistanceVector> = self.nodes[position]
            .neighbors()
            .iter()
            .filter_map(|neighbor| {
                self.positions
                    .get(neighbor)
                    .map(|&index| (neighbor.clone(), self.nodes[index].snapshot()))
            })
            .collect();

        let node = &mut self.nodes[position];
        let changed = node.update_from_neighbors(&received);
        if changed {
            self.round_had_update = true;
        }
        self.turn += 1;

        debug!(
            "Turn {} round {}: node {} {}",
            self.turn,
            self.round,
            node.id(),
            if changed { "updated" } else { "unchanged" }
        );

        if self.turn >= self.max_turns {
            self.status = SimulationStatus::MaxIterationsReached;
            warn!(
                "Stopped after {} rounds without converging",
                self.round
            );
        }

        let node = &self.nodes[position];
        StepOutcome::Turn(TurnReport {
            turn: self.turn,
            round: self.round,
            node: node.id().to_string(),
            distance_vector: node.snapshot(),
            routing_table: node.routing_table(),
            changed,
            updated_this_round: self
                .nodes
                .iter()
                .filter(|node| node.changed_this_round())
                .map(|node| node.id().to_string())
                .collect(),
            stable_rounds: self.stable_rounds,
            status: self.status,
        })
    }

    /// Steps until a terminal state, handing each turn to `on_turn`.
    pub fn run<F>(&mut self, mut on_turn: F) -> SimulationStatus
    where
        F: FnMut(&TurnReport),
    {
        loop {
            match self.step() {
                StepOutcome::Turn(report) => on_turn(&report),
                StepOutcome::Finished(status) => return status,
            }
        }
    }

    pub fn run_to_completion(&mut self) -> SimulationOutcome {
        let mut trace = Vec::new();
        let status = self.run(|report| trace.push(report.clone()));

        SimulationOutcome {
            status,
            rounds: self.round,
            turns: self.turn,
            trace,
        }
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn turns(&self) -> usize {
        self.turn
    }

    pub fn stability_threshold(&self) -> usize {
        self.stability_threshold
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// Round-robin order.
    pub fn order(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.id()).collect()
    }

    pub fn node(&self, router_id: &str) -> Option<&DistanceVectorNode> {
        self.positions.get(router_id).map(|&index| &self.nodes[index])
    }

    pub fn nodes(&self) -> &[DistanceVectorNode] {
        &self.nodes
    }

    /// Follows the next-hop chain from `from` to `to` through each node's own
    /// table. Only available once the run has stopped.
    pub fn find_path(&self, from: &str, to: &str) -> Result<RoutePath, PathError> {
        if !self.status.is_terminal() {
            return Err(PathError::NotConverged);
        }
        if from == to {
            return Err(PathError::SameNode(from.to_string()));
        }

        let source = self
            .node(from)
            .ok_or_else(|| PathError::UnknownNode(from.to_string()))?;
        if self.node(to).is_none() {
            return Err(PathError::UnknownNode(to.to_string()));
        }

        let cost = source.cost_to(to);
        if cost.is_unreachable() || source.next_hop(to).is_none() {
            return Err(PathError::NoPath {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let mut hops = vec![from.to_string()];
        let mut current = source;
        while current.id() != to {
            let next = current
                .next_hop(to)
                .and_then(|hop| self.node(hop))
                .ok_or_else(|| PathError::Incomplete {
                    from: from.to_string(),
                    to: to.to_string(),
                    at: current.id().to_string(),
                })?;

            hops.push(next.id().to_string());
            current = next;

            if hops.len() > self.nodes.len() {
                return Err(PathError::LoopDetected {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        Ok(RoutePath { hops, cost })
    }

    /// Routing tables of every node, in round-robin order.
    pub fn routing_tables(&self) -> Vec<RoutingTable> {
        self.nodes.iter().map(DistanceVectorNode::routing_table).collect()
    }
}

fn check_order(topology: &Topology, order: &[RouterId]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();
    for id in order {
        if !topology.contains(id) {
            return Err(ConfigurationError::InvalidOrder(format!("unknown node {}", id)));
        }
        if !seen.insert(id.as_str()) {
            return Err(ConfigurationError::InvalidOrder(format!("node {} appears twice", id)));
        }
    }

    if let Some(missing) = topology.nodes().iter().find(|id| !seen.contains(id.as_str())) {
        return Err(ConfigurationError::InvalidOrder(format!("node {} is missing", missing)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Link;

    fn topology(nodes: &[&str], links: &[(&str, &str, i64)]) -> Topology {
        Topology::from_links(
            nodes.iter().map(|id| id.to_string()).collect(),
            links.iter().map(|(a, b, cost)| Link::new(a, b, *cost)).collect(),
        )
        .unwrap()
    }

    fn triangle() -> Topology {
        topology(&["A", "B", "C"], &[("A", "B", 1), ("B", "C", 1), ("A", "C", 5)])
    }

    #[test]
    fn triangle_converges_through_cheaper_path() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());
        let outcome = scheduler.run_to_completion();

        assert_eq!(outcome.status, SimulationStatus::Converged);
        assert_eq!(outcome.rounds, 3);
        assert_eq!(outcome.turns, 9);

        let a = scheduler.node("A").unwrap();
        assert_eq!(a.cost_to("C"), Cost::Finite(2));
        assert_eq!(a.next_hop("C"), Some("B"));
        let c = scheduler.node("C").unwrap();
        assert_eq!(c.cost_to("A"), Cost::Finite(2));
        assert_eq!(c.next_hop("A"), Some("B"));
    }

    #[test]
    fn first_turn_opens_round_one() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());

        let StepOutcome::Turn(report) = scheduler.step() else {
            panic!("expected a turn");
        };
        assert_eq!(report.turn, 1);
        assert_eq!(report.round, 1);
        assert_eq!(report.node, "A");
        assert!(report.changed);
        assert_eq!(report.updated_this_round, vec!["A".to_string()]);
        assert_eq!(report.stable_rounds, 0);
        assert_eq!(report.status, SimulationStatus::Running);
        assert_eq!(report.routing_table.get_route("C").unwrap().next_hop.as_deref(), Some("B"));
    }

    #[test]
    fn stability_counter_tracks_quiet_rounds() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());
        let mut seen = Vec::new();
        scheduler.run(|report| seen.push((report.round, report.stable_rounds, report.changed)));

        let round_two: Vec<_> = seen.iter().filter(|(round, _, _)| *round == 2).collect();
        assert!(round_two.iter().all(|(_, stable, changed)| *stable == 0 && !changed));
        let round_three: Vec<_> = seen.iter().filter(|(round, _, _)| *round == 3).collect();
        assert!(round_three.iter().all(|(_, stable, _)| *stable == 1));
    }

    #[test]
    fn terminal_scheduler_does_not_move() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());
        scheduler.run_to_completion();
        let turns = scheduler.turns();

        assert_eq!(scheduler.step(), StepOutcome::Finished(SimulationStatus::Converged));
        assert_eq!(scheduler.turns(), turns);
    }

    #[test]
    fn disconnected_graph_still_converges() {
        let graph = topology(&["A", "B", "C", "D"], &[("A", "B", 1), ("C", "D", 1)]);
        let mut scheduler = ConvergenceScheduler::with_defaults(&graph);
        let outcome = scheduler.run_to_completion();

        assert_eq!(outcome.status, SimulationStatus::Converged);
        assert_eq!(outcome.rounds, 2);

        let a = scheduler.node("A").unwrap();
        for destination in ["C", "D"] {
            assert_eq!(a.cost_to(destination), Cost::Unreachable);
            assert_eq!(a.next_hop(destination), None);
        }
    }

    #[test]
    fn stops_at_round_cap() {
        let line = topology(
            &["A", "B", "C", "D", "E"],
            &[("A", "B", 1), ("B", "C", 1), ("C", "D", 1), ("D", "E", 1)],
        );
        let config = SimulationConfig {
            max_rounds: Some(1),
            ..SimulationConfig::default()
        };
        let mut scheduler = ConvergenceScheduler::new(&line, &config).unwrap();
        let outcome = scheduler.run_to_completion();

        assert_eq!(outcome.status, SimulationStatus::MaxIterationsReached);
        assert_eq!(outcome.turns, 5);
        assert_eq!(
            outcome.trace.last().map(|report| report.status),
            Some(SimulationStatus::MaxIterationsReached)
        );
    }

    #[test]
    fn threshold_is_configurable() {
        let config = SimulationConfig {
            stability_threshold: 4,
            ..SimulationConfig::default()
        };
        let mut scheduler = ConvergenceScheduler::new(&triangle(), &config).unwrap();
        let outcome = scheduler.run_to_completion();

        assert_eq!(outcome.status, SimulationStatus::Converged);
        assert_eq!(outcome.rounds, 5);
    }

    #[test]
    fn custom_order_changes_who_acts_first() {
        let config = SimulationConfig {
            order: Some(vec!["C".to_string(), "A".to_string(), "B".to_string()]),
            ..SimulationConfig::default()
        };
        let mut scheduler = ConvergenceScheduler::new(&triangle(), &config).unwrap();
        assert_eq!(scheduler.order(), vec!["C", "A", "B"]);

        let StepOutcome::Turn(report) = scheduler.step() else {
            panic!("expected a turn");
        };
        assert_eq!(report.node, "C");
    }

    #[test]
    fn rejects_order_that_is_not_a_permutation() {
        for order in [vec!["A", "B"], vec!["A", "B", "B"], vec!["A", "B", "Z"]] {
            let config = SimulationConfig {
                order: Some(order.into_iter().map(str::to_string).collect()),
                ..SimulationConfig::default()
            };
            let err = ConvergenceScheduler::new(&triangle(), &config).unwrap_err();
            assert!(matches!(err, ConfigError::Topology(ConfigurationError::InvalidOrder(_))));
        }
    }

    #[test]
    fn huge_round_cap_does_not_overflow() {
        let pair = topology(&["A", "B"], &[("A", "B", 1)]);
        let config = SimulationConfig {
            max_rounds: Some(usize::MAX),
            ..SimulationConfig::default()
        };
        let mut scheduler = ConvergenceScheduler::new(&pair, &config).unwrap();
        let outcome = scheduler.run_to_completion();

        assert_eq!(outcome.status, SimulationStatus::Converged);
        assert_eq!(scheduler.max_rounds(), usize::MAX);
    }

    #[test]
    fn find_path_follows_next_hops() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());
        scheduler.run_to_completion();

        let path = scheduler.find_path("A", "C").unwrap();
        assert_eq!(path.hops, vec!["A", "B", "C"]);
        assert_eq!(path.cost, Cost::Finite(2));

        let path = scheduler.find_path("C", "B").unwrap();
        assert_eq!(path.hops, vec!["C", "B"]);
        assert_eq!(path.cost, Cost::Finite(1));
    }

    #[test]
    fn find_path_reports_unreachable_destination() {
        let graph = topology(&["A", "B", "C", "D"], &[("A", "B", 1), ("C", "D", 1)]);
        let mut scheduler = ConvergenceScheduler::with_defaults(&graph);
        scheduler.run_to_completion();

        assert_eq!(
            scheduler.find_path("A", "D"),
            Err(PathError::NoPath { from: "A".to_string(), to: "D".to_string() })
        );
    }

    #[test]
    fn find_path_rejects_same_and_unknown_nodes() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());
        scheduler.run_to_completion();

        assert_eq!(scheduler.find_path("B", "B"), Err(PathError::SameNode("B".to_string())));
        assert_eq!(scheduler.find_path("A", "Z"), Err(PathError::UnknownNode("Z".to_string())));
        assert_eq!(scheduler.find_path("Z", "A"), Err(PathError::UnknownNode("Z".to_string())));
    }

    #[test]
    fn find_path_waits_for_the_run_to_stop() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle());
        scheduler.step();

        assert_eq!(scheduler.find_path("A", "C"), Err(PathError::NotConverged));
    }

    #[test]
    fn empty_topology_converges_immediately() {
        let empty = Topology::from_links(vec![], vec![]).unwrap();
        let mut scheduler = ConvergenceScheduler::with_defaults(&empty);

        assert_eq!(scheduler.step(), StepOutcome::Finished(SimulationStatus::Converged));
        assert_eq!(scheduler.turns(), 0);
    }

    #[test]
    fn single_node_converges_after_quiet_rounds() {
        let lone = topology(&["A"], &[]);
        let mut scheduler = ConvergenceScheduler::with_defaults(&lone);
        let outcome = scheduler.run_to_completion();

        assert_eq!(outcome.status, SimulationStatus::Converged);
        assert_eq!(outcome.turns, 2);
        assert!(scheduler.routing_tables()[0].is_empty());
    }
}
