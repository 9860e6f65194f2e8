//! CLI frontend for Delve, a card-driven dungeon-crawl challenge engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "delve",
    about = "Delve: tarot-driven dungeon challenges",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine internals to stderr and show every event
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Auto-play an encounter and print what happened
    Skirmish {
        /// RNG seed for the deck shuffles
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Number of player characters (1-4)
        #[arg(long, default_value = "2")]
        pcs: usize,

        /// Number of antagonists (1-6)
        #[arg(long, default_value = "2")]
        npcs: usize,

        /// Ruleset: a JSON file, or a preset name (standard, grim)
        #[arg(short, long)]
        rules: Option<String>,

        /// Stop after this many rounds
        #[arg(long, default_value = "20")]
        max_rounds: u32,

        /// Write a markdown journal of the encounter to this file
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },

    /// Play an encounter interactively over stdin
    Play {
        /// RNG seed for the deck shuffles
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Ruleset: a JSON file, or a preset name (standard, grim)
        #[arg(short, long)]
        rules: Option<String>,
    },

    /// Draw cards from a freshly shuffled deck
    Deck {
        /// RNG seed for the shuffle
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// How many cards to draw
        #[arg(short, long, default_value = "5")]
        draws: usize,

        /// Use the full tarot instead of the minor arcana only
        #[arg(long)]
        major: bool,
    },

    /// Show the action table, or a ruleset as JSON
    Rules {
        /// Print the ruleset as JSON
        #[arg(long)]
        json: bool,

        /// Ruleset: a JSON file, or a preset name (standard, grim)
        #[arg(short, long)]
        rules: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Skirmish {
            seed,
            pcs,
            npcs,
            rules,
            max_rounds,
            journal,
        } => commands::skirmish::run(&commands::skirmish::SkirmishOptions {
            seed,
            pcs,
            npcs,
            rules: rules.as_deref(),
            max_rounds,
            journal: journal.as_deref(),
            verbose: cli.verbose,
        }),
        Commands::Play { seed, rules } => commands::play::run(seed, rules.as_deref()),
        Commands::Deck { seed, draws, major } => commands::deck::run(seed, draws, major),
        Commands::Rules { json, rules } => commands::rules::run(rules.as_deref(), json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
