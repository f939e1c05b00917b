//! Engagement Simulation Runner
//!
//! Headless driver: builds a population, publishes ideas from the backlog and
//! writes the event log, session statistics and a final population snapshot.

use clap::{Parser, ValueEnum};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use feed_sim::events::EventLogger;
use feed_sim::stats::{write_stats, STATS_FILE_NAME};
use feed_sim::{ReactionConfig, SimConfig, SimError, Simulation, StatsCollector};

/// Rule set to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Variant {
    /// Politics and fandom, likes enabled
    TwoDimension,
    /// Politics only, no likes, stricter share and follow cut-offs
    PoliticsOnly,
}

/// How the next idea is chosen from the backlog
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Pick {
    First,
    Random,
}

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "feed_sim")]
#[command(about = "A toy simulation of opinion-driven social media engagement")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Tuning file; defaults are used when it cannot be read
    #[arg(long, default_value = feed_sim::DEFAULT_TUNING_PATH)]
    config: PathBuf,

    /// Number of ideas to publish
    #[arg(long, default_value_t = 10)]
    posts: usize,

    /// Override the initial population size
    #[arg(long)]
    population: Option<usize>,

    /// Override the backlog size
    #[arg(long)]
    backlog: Option<usize>,

    /// Override the reaction rule set from the tuning file
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// Backlog selection strategy
    #[arg(long, value_enum, default_value_t = Pick::First)]
    pick: Pick,

    /// Directory for events.jsonl, stats.json and snapshot.json
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn build_config(args: &Args) -> SimConfig {
    let mut config = SimConfig::load_or_default(&args.config);
    if let Some(size) = args.population {
        config = config.with_population_size(size);
    }
    if let Some(size) = args.backlog {
        config = config.with_backlog_size(size);
    }
    match args.variant {
        Some(Variant::TwoDimension) => config.reactions = ReactionConfig::default(),
        Some(Variant::PoliticsOnly) => config.reactions = ReactionConfig::politics_only(),
        None => {}
    }
    config
}

fn run(args: &Args) -> Result<(), RunError> {
    let config = build_config(args);

    println!("Engagement Simulation");
    println!("=====================");
    println!("Seed: {}", args.seed);
    println!("Population: {}", config.population.size);
    println!("Backlog: {}", config.content.backlog_size);
    println!("Dimensions: {:?}", config.reactions.dimensions);
    println!();

    fs::create_dir_all(&args.output_dir)?;
    let mut logger = EventLogger::new(args.output_dir.join("events.jsonl"))?;

    let mut sim = Simulation::new(config, args.seed)?;
    let mut picker = SmallRng::seed_from_u64(args.seed.wrapping_add(1));
    let mut collector = StatsCollector::new(sim.population().len());

    for step in 0..args.posts {
        let index = match args.pick {
            Pick::First => 0,
            Pick::Random => picker.gen_range(0..sim.backlog().len()),
        };
        let idea_id = sim.backlog()[index].id();
        let before = sim.population().len();

        sim.publish_idea(idea_id)?;

        let Some(post) = sim.posts().last() else {
            continue;
        };
        let event = logger.log_post(&sim, post, before)?;
        collector.record_post(post, event.population_after);

        println!(
            "[Post {:>3}] {} | reactions {} | replies +{}/-{} | shares +{}/-{} \
             | follows {} | unfollows {} | population {} -> {}",
            step,
            idea_id,
            event.reactions.total(),
            event.reactions.reply_positive,
            event.reactions.reply_negative,
            event.reactions.share_positive,
            event.reactions.share_negative,
            event.new_followers.len(),
            event.unfollowed.len(),
            event.population_before,
            event.population_after
        );
    }
    logger.flush()?;

    let stats = collector.generate_stats();
    write_stats(&stats, args.output_dir.join(STATS_FILE_NAME))?;
    write_snapshot(&sim, &args.output_dir.join("snapshot.json"))?;

    println!();
    println!(
        "Simulation complete. Published {} posts; population {} -> {} (peak {}).",
        stats.total_posts, stats.initial_population, stats.final_population, stats.peak_population
    );
    println!("Wrote {} events to {}", logger.event_count(), args.output_dir.display());
    Ok(())
}

fn write_snapshot(sim: &Simulation, path: &Path) -> Result<(), RunError> {
    let snapshot = sim.snapshot(1);
    for (dimension, buckets) in &snapshot.distributions {
        if let Some(sector) = snapshot.dominant_sector(dimension) {
            println!("Dominant {} sector: {} ({:?})", dimension, sector, buckets);
        }
    }
    fs::write(path, snapshot.to_json_pretty()?)?;
    Ok(())
}
