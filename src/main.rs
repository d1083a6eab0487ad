use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{error, info, warn};
use std::io;
use tokio::runtime::Builder;
use tokio::time::{MissedTickBehavior, interval};
use uuid::Uuid;

use dv_routing::algorithms::verification::find_route_mismatches;
use dv_routing::config::{SimulationConfig, TopologyConfig};
use dv_routing::protocol::{ConvergenceScheduler, SimulationStatus, StepOutcome};
use dv_routing::report::{FinalReport, render_path, render_routing_tables, render_turn_header};

#[derive(Parser)]
#[command(name = "dv-routing", about = "Distance Vector Routing simulator")]
struct Cli {
    /// Topology file: JSON, or a text link list. Prompts on stdin when omitted.
    #[arg(long)]
    topology: Option<String>,

    /// Simulation settings (JSON).
    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    stability_threshold: Option<usize>,

    #[arg(long)]
    max_rounds: Option<usize>,

    /// Delay between traced turns in milliseconds; 0 runs all turns back to back.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Print every node's table after each turn.
    #[arg(long)]
    trace: bool,

    /// Print the final tables as JSON.
    #[arg(long)]
    json: bool,

    /// Check final costs against centralized shortest paths.
    #[arg(long)]
    verify: bool,

    /// Print the hop-by-hop route between two nodes, e.g. `--path A:C`. Repeatable.
    #[arg(long, value_name = "FROM:TO")]
    path: Vec<String>,
}

/// Human-readable output. Goes to stderr when stdout carries the JSON report.
fn emit(json: bool, text: &str) {
    if json {
        eprintln!("{}", text);
    } else {
        println!("{}", text);
    }
}

fn parse_path_query(query: &str) -> Result<(String, String)> {
    match query.split_once(':') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => Ok((from.to_string(), to.to_string())),
        _ => bail!("invalid --path {:?}, expected FROM:TO", query),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let path_queries = cli
        .path
        .iter()
        .map(|query| parse_path_query(query))
        .collect::<Result<Vec<_>>>()?;

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load simulation config {}", path))?,
        None => SimulationConfig::default(),
    };
    if let Some(threshold) = cli.stability_threshold {
        config.stability_threshold = threshold;
    }
    if let Some(max_rounds) = cli.max_rounds {
        config.max_rounds = Some(max_rounds);
    }
    if let Some(interval_ms) = cli.interval_ms {
        config.turn_interval_ms = interval_ms;
    }

    let topology_config = match &cli.topology {
        Some(path) => TopologyConfig::load_from_file(path)
            .with_context(|| format!("failed to load topology {}", path))?,
        None => {
            let stdin = io::stdin();
            TopologyConfig::read_interactive(stdin.lock(), io::stdout())
                .context("failed to read topology")?
        }
    };
    let topology = topology_config
        .into_topology()
        .context("invalid topology")?;

    let mut scheduler = ConvergenceScheduler::new(&topology, &config)?;
    let run_id = Uuid::new_v4();
    info!(
        "Starting run {} over {} nodes (order {:?})",
        run_id,
        topology.node_count(),
        scheduler.order()
    );

    let rt = Builder::new_current_thread().enable_all().build()?;
    let status = rt.block_on(async {
        let mut ticker = (cli.trace && config.turn_interval_ms > 0).then(|| {
            let mut ticker = interval(config.turn_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            if let Some(ticker) = ticker.as_mut() {
                ticker.tick().await;
            }

            match scheduler.step() {
                StepOutcome::Turn(report) => {
                    if cli.trace {
                        emit(cli.json, &render_turn_header(&report, scheduler.stability_threshold()));
                        emit(
                            cli.json,
                            &render_routing_tables(&scheduler.routing_tables(), Some(report.node.as_str())),
                        );
                    }
                }
                StepOutcome::Finished(status) => break status,
            }
        }
    });

    let report = FinalReport::from_scheduler(run_id, &scheduler);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render());
    }

    for (from, to) in &path_queries {
        match scheduler.find_path(from, to) {
            Ok(path) => emit(cli.json, &render_path(&path)),
            Err(err) => warn!("No route from {} to {}: {}", from, to, err),
        }
    }

    if status == SimulationStatus::MaxIterationsReached {
        error!("Simulation did not converge within {} rounds", scheduler.max_rounds());
    }

    if cli.verify {
        let mismatches = find_route_mismatches(&topology, &scheduler.routing_tables());
        if !mismatches.is_empty() {
            bail!("{} routes differ from the centralized shortest paths", mismatches.len());
        }
        info!("Verified {} routing tables", topology.node_count());
    }

    Ok(())
}
