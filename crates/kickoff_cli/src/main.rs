//! Kickoff CLI
//!
//! Catalog CSV → JSON import, match odds, token issuance and bot season runs.

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "kickoff")]
#[command(about = "Catalog import and balance tools for the kickoff engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Build catalog JSON from a CSV file
    Catalog {
        /// Input CSV file path
        #[arg(long)]
        csv: PathBuf,

        /// Output catalog JSON file path
        #[arg(long)]
        out: PathBuf,

        /// Verify catalog after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Estimate win odds between two team powers
    Odds {
        #[arg(long)]
        home: u64,

        #[arg(long)]
        away: u64,

        #[arg(long, default_value_t = 10_000)]
        matches: u32,

        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Issue a signed token for a player id using the configured secret
    Token {
        #[arg(long)]
        player_id: u64,

        /// Config JSON file (falls back to KICKOFF_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run a bot season and print the ranking table
    Season {
        /// Catalog JSON file (built-in starter catalog when omitted)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Config JSON file (falls back to KICKOFF_CONFIG_PATH)
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 8)]
        bots: usize,

        #[arg(long, default_value_t = 10)]
        rounds: usize,

        #[arg(long, default_value_t = 6)]
        draws: usize,

        #[arg(long, default_value_t = 1)]
        threads: usize,

        /// Overrides the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    use kickoff_cli::{season, SeasonOptions};
    use kickoff_core::catalog::Catalog;

    let cli = Cli::parse();

    match cli.command {
        Commands::Catalog { csv, out, verify, metadata } => {
            println!("Building catalog from CSV...");
            println!("   CSV Input: {}", csv.display());
            println!("   Output:    {}", out.display());

            let meta = kickoff_cli::build_catalog(&csv, &out)?;
            print_metadata(&meta);

            if verify {
                println!("\nVerifying catalog...");
                if !kickoff_cli::verify_catalog(&out, &meta.checksum)? {
                    anyhow::bail!("Catalog verification failed - checksum mismatch!");
                }
                println!("Catalog verification passed");
            }

            if let Some(metadata_path) = metadata {
                std::fs::write(&metadata_path, serde_json::to_string_pretty(&meta)?)?;
                println!("\nMetadata saved to: {}", metadata_path.display());
            }
        }

        Commands::Odds { home, away, matches, seed } => {
            let report = season::estimate_odds(seed, home, away, matches);
            println!("{} matches, power {} vs {}", report.matches, home, away);
            println!(
                "   Home wins: {} ({:.1}%)",
                report.home_wins,
                report.home_win_rate * 100.0
            );
            println!("   Away wins: {}", report.away_wins);
            println!(
                "   Avg score: {:.2} - {:.2}",
                report.avg_winner_goals, report.avg_loser_goals
            );
        }

        Commands::Token { player_id, config } => {
            let config = kickoff_cli::resolve_config(config.as_deref())?;
            println!("{}", kickoff_cli::issue_token(&config, player_id)?);
        }

        Commands::Season { catalog, config, bots, rounds, draws, threads, seed, json } => {
            let mut config = kickoff_cli::resolve_config(config.as_deref())?;
            if seed.is_some() {
                config.rng_seed = seed;
            }
            let catalog = match catalog {
                Some(path) => Catalog::from_json_file(&path)?,
                None => Catalog::starter(),
            };

            let options = SeasonOptions { bots, rounds, draws_per_bot: draws, threads };
            let report = kickoff_cli::run_bot_season(config, catalog, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_season(&report);
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &kickoff_cli::CatalogMetadata) {
    println!("\nCatalog built successfully!");
    println!("   Athletes:    {}", meta.athletes);
    println!("   Rows read:   {} ({} skipped)", meta.rows_read, meta.rows_failed);
    println!("   Checksum:    {}", meta.checksum);
    println!("   Created:     {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn print_season(report: &kickoff_cli::SeasonReport) {
    println!(
        "Matches: {}  unmatched: {}  transient: {}  upgrades: {}\n",
        report.matches_played, report.no_opponent, report.transient_failures, report.upgrades
    );
    println!("{:>4}  {:<12} {:>6} {:>4} {:>4} {:>4} {:>7}", "#", "name", "score", "W", "D", "L", "win%");
    for (pos, row) in report.ranking.iter().enumerate() {
        println!(
            "{:>4}  {:<12} {:>6} {:>4} {:>4} {:>4} {:>6.1}%",
            pos + 1,
            row.name,
            row.score,
            row.win,
            row.draw,
            row.loss,
            row.win_rate * 100.0
        );
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("kickoff CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
