use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use ballon_score::config::{self, Config};
use ballon_score::data::{normalize, PositionCategory, RawTable};
use ballon_score::output;
use ballon_score::scoring::{rank_players, validate_scoring, ScoringConfig};
use ballon_score::ScoreError;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_EMPTY_FILTER: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Aligned table for the terminal
    Table,
    /// Tab-separated values with a header row
    Tsv,
    /// Every intermediate column as JSON
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score and rank players from a CSV of player-season statistics
    Rank(RankArgs),
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration and print the effective scoring settings
    Check,
}

#[derive(clap::Args, Debug)]
struct RankArgs {
    /// CSV file with one row per player, team, season and competition
    input: PathBuf,

    /// Keep only these competitions (repeatable; default: all)
    #[arg(short, long = "league")]
    leagues: Vec<String>,

    /// Keep only these position categories: FWD, MID, DEF, GK (repeatable)
    #[arg(short, long = "position", value_parser = parse_position)]
    positions: Vec<PositionCategory>,

    /// Minimum nineties (minutes / 90) to be ranked
    #[arg(long)]
    min_nineties: Option<f64>,

    /// Shrinkage constant K
    #[arg(short = 'k', long)]
    shrinkage_k: Option<f64>,

    /// Nineties at which the playing-time penalty stops
    #[arg(long)]
    minutes_ref: Option<f64>,

    /// Mix between per-90 (1.0) and season totals (0.0)
    #[arg(long)]
    lambda: Option<f64>,

    /// Number of rows to show
    #[arg(short = 'n', long, default_value_t = 10)]
    top: usize,

    /// Show the top N of each competition separately
    #[arg(long)]
    by_league: bool,

    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Parser, Debug)]
#[command(name = "ballon-score")]
#[command(about = "Rank football players by a configurable merit score", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and per-player breakdowns
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/ballon-score/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn parse_position(s: &str) -> Result<PositionCategory, String> {
    PositionCategory::parse(s).ok_or_else(|| format!("unknown position '{}' (expected FWD, MID, DEF or GK)", s))
}

fn main() {
    let cli = Cli::parse();
    ballon_score::logging::init(cli.verbose);

    let code = match cli.command {
        Commands::Init { force } => match config::init::write_default_config(cli.config, force) {
            Ok(path) => {
                println!("Config written to {}", path.display());
                EXIT_SUCCESS
            }
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                EXIT_CONFIG
            }
        },
        Commands::Check => match load(cli.config) {
            Ok(config) => check(&config.scoring()),
            Err(code) => code,
        },
        Commands::Rank(args) => match load(cli.config) {
            Ok(config) => rank(&config, &args, cli.verbose),
            Err(code) => code,
        },
    };

    std::process::exit(code);
}

fn load(path: Option<PathBuf>) -> Result<Config, i32> {
    config::load_config(path).map_err(|e| {
        eprintln!("Config error: {:#}", e);
        EXIT_CONFIG
    })
}

fn check(scoring: &ScoringConfig) -> i32 {
    if let Err(errors) = validate_scoring(scoring) {
        report_config_errors(&errors);
        return EXIT_CONFIG;
    }
    match serde_saphyr::to_string(scoring) {
        Ok(yaml) => {
            println!("{}", yaml);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to render config: {}", e);
            EXIT_FAILURE
        }
    }
}

fn report_config_errors(errors: &[String]) {
    eprintln!("Scoring config errors:");
    for error in errors {
        eprintln!("  - {}", error);
    }
}

/// Apply command-line overrides on top of the file configuration.
fn effective_scoring(config: &Config, args: &RankArgs) -> ScoringConfig {
    let mut scoring = config.scoring();
    if !args.leagues.is_empty() {
        scoring.competitions = Some(args.leagues.iter().cloned().collect::<BTreeSet<_>>());
    }
    if !args.positions.is_empty() {
        scoring.positions = args.positions.iter().copied().collect();
    }
    if let Some(v) = args.min_nineties {
        scoring.min_nineties = v;
    }
    if let Some(v) = args.shrinkage_k {
        scoring.shrinkage_k = v;
    }
    if let Some(v) = args.minutes_ref {
        scoring.minutes_ref = v;
    }
    if let Some(v) = args.lambda {
        scoring.lambda = v;
    }
    scoring
}

fn rank(config: &Config, args: &RankArgs, verbose: bool) -> i32 {
    let start_time = Instant::now();
    let scoring = effective_scoring(config, args);

    let result = RawTable::from_path(&args.input)
        .and_then(|table| normalize(&table, &config.columns()))
        .and_then(|records| rank_players(&records, &scoring));

    let ranking = match result {
        Ok(r) => r,
        Err(ScoreError::Config(errors)) => {
            report_config_errors(&errors);
            return EXIT_CONFIG;
        }
        Err(e @ ScoreError::FilterEmpty { .. }) => {
            eprintln!("{}", e);
            eprintln!("Lower --min-nineties or widen the league/position filters.");
            return EXIT_EMPTY_FILTER;
        }
        Err(e) => {
            eprintln!("Input error ({}): {}", args.input.display(), e);
            return if e.is_input() { EXIT_INPUT } else { EXIT_FAILURE };
        }
    };

    let shown = &ranking.records[..args.top.min(ranking.records.len())];
    let use_colors = output::should_use_colors();

    match args.format {
        Format::Table if args.by_league => {
            for (league, rows) in output::top_by_competition(&ranking.records, args.top) {
                let rows: Vec<_> = rows.into_iter().cloned().collect();
                println!("{}", league);
                println!("{}", output::format_ranking_table(&rows, use_colors));
                println!();
            }
        }
        Format::Table if verbose => {
            for scored in shown {
                println!("{}", output::format_record_detail(scored, use_colors));
                println!();
            }
        }
        Format::Table => println!("{}", output::format_ranking_table(shown, use_colors)),
        Format::Tsv => println!("{}", output::format_tsv(shown)),
        Format::Json => {
            let json = output::format_json(&ranking).context("Failed to serialize ranking");
            match json {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("{:#}", e);
                    return EXIT_FAILURE;
                }
            }
        }
    }

    if verbose {
        eprintln!();
        eprintln!(
            "Ranked {} players ({} degenerate columns) in {:?}",
            ranking.records.len(),
            ranking.warnings.len(),
            start_time.elapsed()
        );
    }
    EXIT_SUCCESS
}
