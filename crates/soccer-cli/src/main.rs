//! soccer-ai - robot soccer behavior tree driver.
//!
//! - `soccer-ai run` - play the scripted match in the simulator
//! - `soccer-ai check` - build every robot's tree and report configuration errors

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use soccer_cli::{build_team, CycleSummary, Match, MatchConfig, Simulator};
use soccer_core::{Pathfinder, SituationKey};

#[derive(Parser)]
#[command(name = "soccer-ai")]
#[command(about = "Robot soccer behavior trees", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted match in the simulator
    Run {
        /// Match configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Number of control cycles (defaults to the config)
        #[arg(long)]
        cycles: Option<u64>,

        /// Pace the loop at the configured control rate
        #[arg(long)]
        realtime: bool,

        /// Tick robots concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Validate a configuration and build every tree
    Check {
        /// Match configuration (YAML)
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            config,
            cycles,
            realtime,
            parallel,
        } => run_match(&config, cycles, realtime, parallel).await,
        Commands::Check { config } => check(&config),
    }
}

async fn run_match(
    path: &Path,
    cycles: Option<u64>,
    realtime: bool,
    parallel: bool,
) -> Result<()> {
    let config = MatchConfig::load(path)?;
    let cycles = cycles.unwrap_or(config.cycles);
    let mut game = Match::spawn(&config)?;

    tracing::info!(
        config = %path.display(),
        robots = config.robots.len(),
        cycles,
        rate_hz = config.control_rate_hz,
        parallel,
        "Starting match"
    );

    let mut pacer = realtime.then(|| {
        let mut interval =
            tokio::time::interval(Duration::from_secs_f32(config.dt_seconds()));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        interval
    });

    for _ in 0..cycles {
        if let Some(pacer) = pacer.as_mut() {
            pacer.tick().await;
        }
        let summary = game.step(parallel);
        print_summary(&summary);
    }

    print_final(&game);
    tracing::info!(cycles, "Match finished");
    Ok(())
}

fn print_summary(summary: &CycleSummary) {
    let results = summary
        .results
        .iter()
        .map(|(robot, state)| format!("{}={}", robot.0, state))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "{:>6}  {:<22} commands={:<3} {}",
        summary.cycle,
        summary.situation.to_string(),
        summary.commands,
        results
    );
}

fn print_final<P: Pathfinder>(game: &Match<P>) {
    let sim: &Simulator = game.simulator();
    println!();
    println!("Final state at cycle {} ({:?}):", sim.cycle(), sim.game_state());
    for robot in game.team().robots() {
        let position = sim
            .robot(robot)
            .map(|p| format!("({:.2}, {:.2})", p.x, p.y))
            .unwrap_or_else(|| "-".to_string());
        let (active, switches) = game
            .team()
            .tree(robot)
            .and_then(|tree| tree.supervisor())
            .map(|sup| (sup.active().to_string(), sup.switches()))
            .unwrap_or_else(|| ("-".to_string(), 0));
        println!("  {robot}: at {position}, active {active}, {switches} switches");
    }
}

fn check(path: &Path) -> Result<()> {
    let config = MatchConfig::load(path)?;
    let sim = Simulator::new(&config);
    let team = build_team(&config, &sim.snapshot())?;

    println!(
        "{}: {} robots, {} situations bound per robot",
        path.display(),
        team.len(),
        SituationKey::COUNT
    );
    Ok(())
}
