use anyhow::{bail, Result};
use clap::Parser;
use junction_sim::simulation::{
    self, Command, DemandUpdate, Intersection, LaneId, RandomDemand, SignalConfig, SimulationStats, Snapshot,
};
use log::info;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "junction_sim")]
#[command(about = "Adaptive four-lane traffic signal simulation")]
struct Cli {
    /// Number of simulated seconds to run
    #[arg(long, default_value = "120")]
    seconds: u64,

    /// Seed for reproducible random demand
    #[arg(long)]
    seed: Option<u64>,

    /// Initial queue length for a lane, e.g. --demand lane_2=7 (repeatable)
    #[arg(long, value_name = "LANE=COUNT")]
    demand: Vec<DemandUpdate>,

    /// Raise an emergency on this lane at start
    #[arg(long, value_name = "LANE")]
    emergency: Option<LaneId>,

    /// Chance per lane per second that a vehicle arrives
    #[arg(long, default_value = "0.3")]
    arrival_rate: f64,

    /// Chance per second that the green lane lets a vehicle through
    #[arg(long, default_value = "0.8")]
    discharge_rate: f64,

    /// Raise an emergency on a random lane every N seconds (0 disables)
    #[arg(long, default_value = "0")]
    emergency_every: u64,

    /// Print a summary every N simulated seconds
    #[arg(long, default_value = "10")]
    summary_every: u64,

    /// Run on background threads against the wall clock
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn,junction_sim=info")).init();

    let cli = Cli::parse();
    for (name, rate) in [("arrival-rate", cli.arrival_rate), ("discharge-rate", cli.discharge_rate)] {
        if !(0.0..=1.0).contains(&rate) {
            bail!("--{} must be between 0 and 1, got {}", name, rate);
        }
    }

    let mut intersection = Intersection::new(SignalConfig::default());
    for update in &cli.demand {
        intersection.handle(update.into_command());
    }
    if let Some(lane) = cli.emergency {
        intersection.handle(Command::ToggleEmergency(lane));
    }

    let demand = match cli.seed {
        Some(seed) => RandomDemand::new_with_seed(seed, cli.arrival_rate, cli.discharge_rate),
        None => RandomDemand::new(cli.arrival_rate, cli.discharge_rate),
    }
    .with_emergencies_every(cli.emergency_every);

    let final_state = if cli.realtime {
        run_realtime(intersection, demand, &cli)?
    } else {
        run_headless(intersection, demand, &cli)
    };

    println!("=== Final State ===");
    final_state.print_summary();
    final_state.draw_map();
    log_final_stats(&final_state.stats);
    Ok(())
}

/// Run on the logical clock as fast as possible
fn run_headless(mut intersection: Intersection, mut demand: RandomDemand, cli: &Cli) -> Snapshot {
    println!("Running intersection simulation in headless mode...");
    println!("Seconds: {}, Seed: {:?}", cli.seconds, cli.seed);
    println!();

    println!("Initial state:");
    let initial = intersection.snapshot();
    initial.print_summary();
    initial.draw_map();
    println!();

    for second in 1..=cli.seconds {
        for command in demand.generate(&intersection.snapshot()) {
            intersection.handle(command);
        }
        intersection.advance(1000);

        if cli.summary_every > 0 && second % cli.summary_every == 0 {
            println!("--- After {}s simulated time ---", second);
            let snapshot = intersection.snapshot();
            snapshot.print_summary();
            snapshot.draw_map();
            println!();
        }
    }

    intersection.snapshot()
}

/// Run the actor on background threads in wall-clock time
fn run_realtime(intersection: Intersection, mut demand: RandomDemand, cli: &Cli) -> Result<Snapshot> {
    println!("Running intersection simulation in real time for {}s...", cli.seconds);
    let handle = simulation::spawn(intersection)?;

    for second in 1..=cli.seconds {
        let snapshot = handle.snapshot()?;
        for command in demand.generate(&snapshot) {
            handle.send(command)?;
        }
        std::thread::sleep(Duration::from_secs(1));

        if cli.summary_every > 0 && second % cli.summary_every == 0 {
            let snapshot = handle.snapshot()?;
            snapshot.print_summary();
            snapshot.draw_map();
            println!();
        }
    }

    let intersection = handle.shutdown()?;
    Ok(intersection.snapshot())
}

fn log_final_stats(stats: &SimulationStats) {
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.2}s", stats.elapsed_time);
    info!("Scheduler ticks: {}", stats.scheduler_ticks);
    info!("Phase changes: {}", stats.phase_changes);
    info!("Preemptions: {}", stats.preemptions);
    info!("Emergencies cleared: {}", stats.emergencies_cleared);
    info!("Vehicles arrived: {}", stats.vehicles_arrived);
    info!("Vehicles departed: {}", stats.vehicles_departed);
    info!("Throughput rate: {:.1}%", stats.throughput_rate());
}
