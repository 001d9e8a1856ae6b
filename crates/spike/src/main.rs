use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use rover_sim_core::config::SimConfig;
use rover_sim_core::controller::Controller;
use rover_sim_core::nn::NeuralNet;
use rover_sim_core::rng::{create_rng, derive_rover_rng};
use rover_sim_core::rover::Rover;
use rover_sim_core::snapshot::EpisodeStatus;
use rover_sim_core::world::World;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

// Random-weight nets only need to exercise the engine; a 4-node hidden
// layer keeps them cheap at any ray count.
const HIDDEN_SIZE: usize = 4;
const WARMUP_TICKS: usize = 10;
const BENCHMARK_TICKS: usize = 2_000;
const TARGET_TPS: f64 = 500.0;

#[derive(Parser)]
#[command(name = "rover-sim")]
#[command(about = "Rover Simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single episode with random-weight controllers
    Run {
        /// Path to config file (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of rovers in the population
        #[arg(long, default_value_t = 20)]
        rovers: usize,

        /// Tick budget for the episode
        #[arg(long, default_value_t = 10_000)]
        ticks: usize,

        /// Write the episode summary as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run the stepping-throughput benchmark suite
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<SimConfig> {
    let config: SimConfig = match path {
        Some(p) => {
            let file =
                File::open(p).with_context(|| format!("opening config {}", p.display()))?;
            serde_json::from_reader(BufReader::new(file)).context("parsing config JSON")?
        }
        None => SimConfig::default(),
    };
    config.validate().context("config validation error")?;
    Ok(config)
}

fn create_rovers(config: &SimConfig, count: usize) -> Vec<Rover> {
    let mut rng = create_rng(config.seed);
    (0..count)
        .map(|id| Rover::spawn_random(id, config, &mut rng))
        .collect()
}

fn create_controllers(config: &SimConfig, count: usize) -> Vec<Box<dyn Controller>> {
    let input_size = config.feature_len();
    let weight_count = NeuralNet::weight_count(input_size, HIDDEN_SIZE);
    (0..count)
        .map(|id| {
            let mut rng = derive_rover_rng(config.seed, id);
            let weights = (0..weight_count).map(|_| rng.random_range(-1.0..1.0));
            Box::new(NeuralNet::from_weights(input_size, HIDDEN_SIZE, weights))
                as Box<dyn Controller>
        })
        .collect()
}

fn build_world(config: &SimConfig, rovers: usize) -> Result<World> {
    let population = create_rovers(config, rovers);
    let controllers = create_controllers(config, rovers);
    World::new(population, controllers, config.clone()).context("world setup error")
}

fn run(config: SimConfig, rovers: usize, ticks: usize, out: Option<PathBuf>) -> Result<()> {
    let mut world = build_world(&config, rovers)?;
    let summary = world.run_episode(ticks, || false)?;

    let status = match summary.status {
        EpisodeStatus::Completed => "completed",
        EpisodeStatus::TickBudget => "tick budget exhausted",
        EpisodeStatus::Aborted => "aborted",
    };
    let best = summary
        .scores
        .iter()
        .map(|s| s.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let mean = summary.scores.iter().map(|s| s.score).sum::<f64>() / summary.scores.len() as f64;
    let longest = summary
        .scores
        .iter()
        .map(|s| s.ticks_survived)
        .max()
        .unwrap_or(0);

    println!("Episode over after {} ticks ({status})", summary.ticks);
    println!(
        "  Rovers:        {} ({} still active)",
        rovers,
        world.active_count()
    );
    println!("  Best score:    {best:.2}");
    println!("  Mean score:    {mean:.2}");
    println!("  Longest life:  {longest} ticks");

    if let Some(path) = out {
        let file = File::create(&path)
            .with_context(|| format!("creating summary file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary).context("writing summary JSON")?;
        println!("  Summary JSON:  {}", path.display());
    }
    Ok(())
}

fn benchmark_population(config: &SimConfig, rovers: usize) -> Result<()> {
    let mut world = build_world(config, rovers)?;
    for _ in 0..WARMUP_TICKS {
        world.step();
    }

    let start = Instant::now();
    let mut ticks_done = 0;
    while ticks_done < BENCHMARK_TICKS {
        // Episodes can drain early with random controllers; restart on the
        // same config to keep measuring.
        if world.is_finished() {
            world = build_world(config, rovers)?;
        }
        world.step();
        ticks_done += 1;
    }
    let elapsed = start.elapsed();

    let avg_tick_us = elapsed.as_micros() as f64 / BENCHMARK_TICKS as f64;
    let ticks_per_sec = 1_000_000.0 / avg_tick_us;
    let verdict = if ticks_per_sec >= TARGET_TPS {
        "PASS"
    } else {
        "FAIL"
    };
    println!(
        "  {rovers:>4} rovers: {avg_tick_us:>8.0} us/tick ({ticks_per_sec:>8.1} ticks/sec) {verdict}"
    );
    Ok(())
}

fn benchmark() -> Result<()> {
    let config = SimConfig::default();
    println!(
        "Benchmark: {} rocks, {} rays, target {TARGET_TPS} ticks/sec",
        config.rock_count, config.ray_count
    );
    for rovers in [8, 32, 128] {
        benchmark_population(&config, rovers)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            rovers,
            ticks,
            out,
        } => {
            let config = load_config(config.as_ref())?;
            run(config, rovers, ticks, out)
        }
        Commands::Benchmark => benchmark(),
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("serializing default config")?
            );
            Ok(())
        }
    }
}
