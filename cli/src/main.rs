//! Routing Simulator CLI
//!
//! Runs the three-node message-routing simulation and prints a report.
//!
//! # Example
//!
//! ```bash
//! # Ten one-hour runs with a fixed seed, event log without pauses
//! routing-sim --max-time 3600 --runs 10 --seed 42 --speed fast
//!
//! # Custom network parameters, JSON report only
//! routing-sim --max-time 600 --config network.json --speed silent --json
//! ```

use clap::{Parser, ValueEnum};
use routing_sim_core::{
    Event, EventKind, MessageCategory, NetworkConfig, NetworkSnapshot, NodeState,
    SimulationConfig, SimulationError, SimulationStatistics, Simulator,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Pace of the per-event console log
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SpeedMode {
    /// Pause after every event, for observation
    Slow,
    /// Log every event without pausing
    Fast,
    /// No per-event log
    Silent,
}

impl SpeedMode {
    fn delay(self) -> Duration {
        match self {
            SpeedMode::Slow => Duration::from_millis(1_500),
            SpeedMode::Fast | SpeedMode::Silent => Duration::ZERO,
        }
    }
}

/// Message-routing network simulator
///
/// Simulates a Master, a Worker and a Lazy computer exchanging messages.
/// Reproducible when the same seed is used.
#[derive(Parser, Debug)]
#[command(name = "routing-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Length of every run in simulated seconds
    #[arg(short = 't', long, default_value = "3600")]
    max_time: f64,

    /// Number of independent runs
    #[arg(short = 'r', long, default_value = "1")]
    runs: usize,

    /// Random seed for reproducible results. When omitted, a random seed is used.
    #[arg(long)]
    seed: Option<u64>,

    /// Pace of the event log
    #[arg(long, value_enum, default_value_t = SpeedMode::Fast)]
    speed: SpeedMode,

    /// JSON file with network parameters (distributions, routing probabilities)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final aggregate as JSON instead of the text report
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("warn,routing_sim_core=info,routing_sim=info")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "simulation failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), SimulationError> {
    let network = match &args.config {
        Some(path) => load_network(path)?,
        None => NetworkConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = SimulationConfig::new(args.max_time, args.runs)
        .with_seed(seed)
        .with_network(network);
    let mut simulator = Simulator::new(config)?;

    info!(
        max_time = args.max_time,
        runs = args.runs,
        seed,
        speed = ?args.speed,
        "Starting simulation"
    );

    let speed = args.speed;
    let aggregate = simulator.run_with_observer(|event, snapshot| {
        if speed == SpeedMode::Silent {
            return;
        }
        log_event(event, snapshot);
        let delay = speed.delay();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    })?;

    if args.json {
        let json = serde_json::to_string_pretty(&aggregate)
            .map_err(|e| SimulationError::Serialization(e.to_string()))?;
        println!("{}", json);
    } else {
        print_report(&aggregate, args.runs, seed, simulator.run_digests());
    }
    Ok(())
}

fn load_network(path: &Path) -> Result<NetworkConfig, SimulationError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        SimulationError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
    })?;
    NetworkConfig::from_json_str(&text)
}

/// One console line per processed event, followed by the node states
fn log_event(event: &Event, snapshot: &NetworkSnapshot) {
    let what = match event.kind() {
        EventKind::SimulationStart => format!("run {} started", snapshot.run_index + 1),
        EventKind::ExternalArrival { target, .. } => {
            format!("external message arrives at {}", target)
        }
        EventKind::InternalArrival { target, message } => {
            format!("message from {} routed to {}", message.source(), target)
        }
        EventKind::ProcessingStart { node } => format!("{} starts processing", node),
        EventKind::ProcessingEnd { node, .. } => format!("{} finishes processing", node),
        EventKind::Reject { .. } => "lazy rejects a message".to_string(),
        EventKind::Send { message } => {
            format!("master sends a message from {} out of the system", message.source())
        }
    };

    let nodes: Vec<String> = snapshot
        .nodes
        .iter()
        .map(|n| {
            let state = match n.state {
                NodeState::Idle => "idle",
                NodeState::Busy => "busy",
            };
            format!("{}[{} q={}]", n.kind, state, n.queue_length)
        })
        .collect();

    println!("t={:>10.3}  {:<50} {}", snapshot.clock, what, nodes.join(" "));
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn print_report(stats: &SimulationStatistics, runs: usize, seed: u64, digests: &[String]) {
    println!();
    println!("{}", "=".repeat(72));
    println!(
        "Final statistics: mean over {} run(s) of {:.1} s (seed {})",
        runs, stats.run_end_time, seed
    );
    println!("{}", "=".repeat(72));

    println!("\n=== Computers ===");
    println!(
        "{:<8} {:>12} {:>10} {:>10} {:>10} {:>10}",
        "node", "busy (s)", "busy", "received", "sent", "rejected"
    );
    for computer in &stats.computers {
        println!(
            "{:<8} {:>12.3} {:>10} {:>10.2} {:>10.2} {:>10.2}",
            computer.kind.to_string(),
            computer.busy_time,
            fmt_pct(computer.busy_fraction),
            computer.received_messages,
            computer.sent_messages,
            computer.rejected_messages,
        );
    }
    println!(
        "All three busy: {:.3} s ({})",
        stats.joint_work_time,
        fmt_pct(stats.joint_work_fraction)
    );

    println!("\n=== Messages ===");
    println!(
        "{:<18} {:>10} {:>12} {:>14} {:>12}",
        "category", "count", "mean wait", "mean in sys", "efficiency"
    );
    let rows = MessageCategory::ALL
        .into_iter()
        .map(|category| {
            let label = match category {
                MessageCategory::Rejected => "rejected",
                MessageCategory::SentFromWorker => "sent from worker",
                MessageCategory::SentFromLazy => "sent from lazy",
            };
            (label, *stats.messages.get(category))
        })
        .chain(std::iter::once(("overall", stats.messages.overall)));
    for (label, row) in rows {
        println!(
            "{:<18} {:>10.2} {:>12} {:>14} {:>12}",
            label,
            row.count,
            fmt_opt(row.mean_wait_time),
            fmt_opt(row.mean_time_in_system),
            fmt_opt(row.efficiency),
        );
    }

    println!("\n=== Run digests ===");
    for (index, digest) in digests.iter().enumerate() {
        println!("run {:>3}: {}", index + 1, digest);
    }
}
