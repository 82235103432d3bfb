//! Foraging Simulation
//!
//! Runs episodes of belief-driven agents competing for food in a drifting,
//! eventful world, then prints survival and behaviour summaries.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use forage_core::config::Config;
use forage_core::output::write_report;
use forage_core::Simulation;
use forage_events::{shop_choices_on_event_days, ActionOutcome, RunReport};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "forage_sim")]
#[command(about = "A foraging simulation of agents with noisy beliefs")]
struct Args {
    /// Random seed for reproducibility (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of episodes to simulate
    #[arg(long)]
    episodes: Option<u32>,

    /// Days per episode
    #[arg(long)]
    days: Option<u32>,

    /// Tuning file (defaults to forage.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the run report as JSON
    #[arg(long)]
    output: Option<PathBuf>,

    /// Leave the per-turn belief trace out of the report
    #[arg(long)]
    no_belief_trace: bool,

    /// Print the default configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    if args.print_config {
        print!("{}", Config::default().to_toml()?);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(episodes) = args.episodes {
        config.simulation.episodes = episodes;
    }
    if let Some(days) = args.days {
        config.simulation.days_per_episode = days;
    }

    println!("Foraging Simulation");
    println!("===================");
    println!("Seed: {}", config.simulation.seed);
    println!("Episodes: {}", config.simulation.episodes);
    println!("Days per episode: {}", config.simulation.days_per_episode);
    println!();

    let mut sim = Simulation::new(config)?;
    print!("{}", sim.spawn_summary());
    println!();
    if args.no_belief_trace {
        sim = sim.without_belief_trace();
    }
    let report = sim.run()?;

    print_results(&report);

    if let Some(path) = &args.output {
        match write_report(&report, path) {
            Ok(()) => println!("Wrote report to {}", path.display()),
            Err(e) => tracing::warn!("Could not write report to {}: {}", path.display(), e),
        }
    }

    Ok(())
}

fn print_results(report: &RunReport) {
    for episode in &report.episodes {
        println!(
            "Episode {}: {} day(s), {} survivor(s){}",
            episode.episode + 1,
            episode.days_run,
            episode.surviving_agents,
            if episode.beliefs_reset { ", beliefs reset" } else { "" }
        );
        for agent in &episode.agents {
            println!(
                "  {:<12} {:<10} energy {:>7.1}  money {:>6.1}  score {:>7.1}",
                agent.name,
                agent.policy.to_string(),
                agent.energy,
                agent.money,
                agent.score
            );
        }
        if let Some(best) = episode.best_agent() {
            println!("  Best: {} ({:.1})", best.name, best.score);
        }
        for (policy, mean) in episode.mean_score_by_policy() {
            println!("  Mean score {:<10} {:>7.1}", policy.to_string(), mean);
        }

        let (turns, fed) = report
            .actions_in_episode(episode.episode)
            .fold((0u32, 0u32), |(turns, fed), r| {
                (turns + 1, fed + u32::from(r.outcome == ActionOutcome::Success))
            });
        println!("  Turns: {}, successful purchases: {}", turns, fed);

        for choices in shop_choices_on_event_days(episode.episode, &report.actions, &episode.world_events) {
            println!("  Day {} events: {}", choices.day, choices.events.join(", "));
            for (shop, count) in &choices.shop_counts {
                println!("    {}: {}", shop, count);
            }
        }
    }

    println!();
    println!("Survivors per episode:");
    for (episode, survivors) in report.survival_curve() {
        println!("  {:>3}: {}", episode + 1, survivors);
    }

    println!();
    println!("Days survived:");
    for (name, days) in &report.days_survived {
        println!("  {:<12} {}", name, days);
    }
}
