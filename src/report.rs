use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;
use crate::protocol::{ConvergenceScheduler, RoutePath, RoutingTable, SimulationStatus, TurnReport};
use crate::types::Cost;

/// Final routing tables of a finished (or stopped) run.
#[derive(Debug, Clone, Serialize)]
pub struct FinalReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub status: SimulationStatus,
    pub rounds: usize,
    pub turns: usize,
    pub tables: Vec<RoutingTable>,
}

impl FinalReport {
    pub fn from_scheduler(run_id: Uuid, scheduler: &ConvergenceScheduler) -> Self {
        Self {
            run_id,
            generated_at: Utc::now(),
            status: scheduler.status(),
            rounds: scheduler.round(),
            turns: scheduler.turns(),
            tables: scheduler.routing_tables(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One block per node: `To <dest>: Next hop = <hop>, Cost = <cost>`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FinalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final Routing Tables ({}):", describe_status(self.status, self.rounds))?;

        for table in &self.tables {
            writeln!(f, "Node {}:", table.owner)?;
            for entry in table.iter() {
                let cost = match entry.cost {
                    Cost::Finite(value) => value.to_string(),
                    Cost::Unreachable => "unreachable".to_string(),
                };
                writeln!(
                    f,
                    "  To {}: Next hop = {}, Cost = {}",
                    entry.destination,
                    entry.next_hop.as_deref().unwrap_or("-"),
                    cost
                )?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

fn describe_status(status: SimulationStatus, rounds: usize) -> String {
    match status {
        SimulationStatus::Converged => format!("converged after {} iterations", rounds),
        SimulationStatus::MaxIterationsReached => format!("stopped after {} iterations without converging", rounds),
        SimulationStatus::Running => format!("running, iteration {}", rounds),
    }
}

/// Current tables of every node, the active one flagged.
pub fn render_routing_tables(tables: &[RoutingTable], active: Option<&str>) -> String {
    let mut out = String::from("CURRENT ROUTING TABLES:\n\n");

    for table in tables {
        if active == Some(table.owner.as_str()) {
            out.push_str(&format!(">>> Node {} (UPDATING) <<<\n", table.owner));
        } else {
            out.push_str(&format!("Node {}:\n", table.owner));
        }
        out.push_str("Dest | Next | Cost\n");
        out.push_str("-----|------|-----\n");
        for entry in table.iter() {
            out.push_str(&format!(
                " {:<4}|  {:<4}| {}\n",
                entry.destination,
                entry.next_hop.as_deref().unwrap_or("-"),
                entry.cost
            ));
        }
        out.push('\n');
    }

    out
}

/// Header line for a turn, e.g. `Iteration 3, Node B (Stabilizing: 1/2)`.
pub fn render_turn_header(report: &TurnReport, stability_threshold: usize) -> String {
    let mut header = format!("Iteration {}, Node {}", report.round, report.node);
    if report.changed {
        header.push_str(" updated");
    }
    if report.stable_rounds > 0 {
        header.push_str(&format!(" (Stabilizing: {}/{})", report.stable_rounds, stability_threshold));
    }
    header
}

/// `Path from A to C: A → B → C (Cost: 2)`.
pub fn render_path(path: &RoutePath) -> String {
    let from = path.hops.first().map(String::as_str).unwrap_or("-");
    let to = path.hops.last().map(String::as_str).unwrap_or("-");
    format!("Path from {} to {}: {} (Cost: {})", from, to, path.hops.join(" → "), path.cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Link, Topology};
    use crate::protocol::StepOutcome;

    fn disconnected() -> Topology {
        Topology::from_links(
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![Link::new("A", "B", 4)],
        )
        .unwrap()
    }

    #[test]
    fn final_report_marks_unreachable_explicitly() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&disconnected());
        scheduler.run_to_completion();
        let report = FinalReport::from_scheduler(Uuid::new_v4(), &scheduler);
        let text = report.render();

        assert!(text.starts_with("Final Routing Tables (converged after 2 iterations):"));
        assert_eq!(text, report.to_string());
        assert!(text.contains("Node A:\n  To B: Next hop = B, Cost = 4\n  To C: Next hop = -, Cost = unreachable\n"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["status"], "Converged");
        assert_eq!(json["tables"][0]["owner"], "A");
    }

    #[test]
    fn routing_tables_flag_active_node() {
        let scheduler = ConvergenceScheduler::with_defaults(&disconnected());
        let text = render_routing_tables(&scheduler.routing_tables(), Some("B"));

        assert!(text.starts_with("CURRENT ROUTING TABLES:"));
        assert!(text.contains(">>> Node B (UPDATING) <<<"));
        assert!(text.contains("Node A:"));
        assert!(text.contains(" C   |  -   | ∞"));
    }

    #[test]
    fn turn_header_shows_stabilization() {
        let mut scheduler = ConvergenceScheduler::with_defaults(&disconnected());
        let mut last = None;
        while let StepOutcome::Turn(report) = scheduler.step() {
            last = Some(report);
        }
        let last = last.unwrap();

        assert_eq!(render_turn_header(&last, 2), "Iteration 2, Node C (Stabilizing: 1/2)");
    }

    #[test]
    fn path_lists_every_hop_and_total_cost() {
        let triangle = Topology::from_links(
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![Link::new("A", "B", 1), Link::new("B", "C", 1), Link::new("A", "C", 5)],
        )
        .unwrap();
        let mut scheduler = ConvergenceScheduler::with_defaults(&triangle);
        scheduler.run_to_completion();

        let path = scheduler.find_path("A", "C").unwrap();
        assert_eq!(render_path(&path), "Path from A to C: A → B → C (Cost: 2)");
    }
}
