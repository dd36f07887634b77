use clap::{Parser, ValueEnum};
use drillbot::config::{self, SimConfig, SteeringMode};
use drillbot::logging;
use drillbot::runner::Runner;
use log::{error, info};
use std::io;
use std::process;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Steering {
    /// Look up the next waypoint from the position before the step
    PreMove,
    /// Look up the next waypoint from the position after the step
    PostMove,
}

impl From<Steering> for SteeringMode {
    fn from(steering: Steering) -> Self {
        match steering {
            Steering::PreMove => SteeringMode::PreMove,
            Steering::PostMove => SteeringMode::PostMove,
        }
    }
}

// --- Command Line Arguments ---
#[derive(Parser, Debug)]
#[command(author, version, about = "Drilling robot course simulation", long_about = None)]
struct Args {
    /// Milliseconds between simulation ticks.
    #[arg(long, default_value_t = config::DEFAULT_TICK_MS)]
    tick_ms: u64,

    /// How the robot picks the waypoint it steers towards.
    #[arg(long, value_enum, default_value = "pre-move")]
    steering: Steering,

    /// Multiplier on real drilling waits (reported times are unaffected).
    #[arg(long, default_value_t = 1.0)]
    delay_scale: f64,

    /// Stop after this many ticks even if the finish line is not reached.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Debug filter to specify log topics (e.g., "engine,timer,collision")
    /// Available topics: engine, timer, collision, metrics, path, registry, sim
    #[arg(long)]
    debug_filter: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init_logger(logging::parse_level(&args.log_level), args.debug_filter) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }

    let config = SimConfig {
        tick_interval: Duration::from_millis(args.tick_ms),
        steering: args.steering.into(),
        delay_scale: args.delay_scale,
        max_ticks: args.max_ticks,
    };
    info!("Initializing drilling run with {:?}", config);

    let mut runner = match Runner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    match runner.run(&mut stdout.lock()) {
        Ok(summary) => {
            println!();
            println!("Report:");
            print!("{}", summary.report);
            if !summary.finished {
                println!("(stopped after {} ticks before the finish line)", summary.ticks);
            }
        }
        Err(e) => {
            error!("Failed to write simulation log: {}", e);
            process::exit(1);
        }
    }
}
