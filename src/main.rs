//! Kshetra - headless fleet simulation runner
//!
//! Loads an optional TOML configuration, generates the crop field and runs
//! ticks until the field is processed or the tick limit is reached.

use std::path::PathBuf;

use clap::Parser;
use kshetra::{Result, SimConfig, Simulation};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "kshetra", about = "Simulate a robot fleet working a crop field")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks
    #[arg(short, long, default_value_t = 100_000)]
    ticks: u64,

    /// Override the number of agents
    #[arg(short, long)]
    agents: Option<usize>,

    /// Override the spawn seed
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("kshetra=info".parse().expect("static directive")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            SimConfig::load(path)?
        }
        None => {
            info!("Using default configuration");
            SimConfig::default()
        }
    };
    if let Some(agents) = args.agents {
        config.scenario.agents = agents;
    }
    if let Some(seed) = args.seed {
        config.scenario.seed = seed;
    }

    let mut sim = Simulation::from_config(config)?;
    let summary = sim.run(args.ticks)?;

    info!(
        "Finished after {} ticks ({:.0} s simulated): {}/{} crops processed, {} tasks, {} agents discharged",
        summary.ticks,
        summary.simulated_secs,
        summary.processed_crops,
        summary.total_crops,
        summary.tasks_assigned,
        summary.discharged_agents
    );
    for agent in &sim.world().agents {
        info!(
            "  {} {:<11} soc {:5.1}% at ({:.2}, {:.2})",
            agent.id,
            agent.state().name(),
            agent.soc(),
            agent.pose().x,
            agent.pose().y
        );
    }
    Ok(())
}
