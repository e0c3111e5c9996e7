//! Headless battle runner.
//!
//! # Usage
//!
//! ```bash
//! # Compare naive and cunning players on the standard scenario
//! cargo run -p gambit_headless -- compare --count 1000
//!
//! # Run a scenario file with a gambit override for team 0
//! cargo run -p gambit_headless -- batch --scenario data/standard_scenario.ron \
//!     --gambit 0=cunning --count 5000 --output results/
//!
//! # Check that a seed replays identically
//! cargo run -p gambit_headless -- verify --seed 42 --runs 5
//! ```
//!
//! Results go to stdout and files; logs go to stderr. `RUST_LOG` directives
//! override the `-v`/`-q` level; `-d` adds module and line to each record.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gambit_core::gambit::GambitKind;
use gambit_core::status::Roster;
use gambit_core::team::TeamId;
use gambit_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    export::{write_logs, LogFormat},
    roster_loader::{load_roster, load_roster_dir},
    scenario::Scenario,
};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "gambit_headless")]
#[command(about = "Headless turn-based battle runner")]
#[command(version)]
struct Cli {
    /// More logging to stderr (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Less logging to stderr (repeatable)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    quiet: u8,

    /// Detailed log lines with module and line number
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of battles and export results and logs
    Batch {
        /// Scenario file (RON); the standard scenario if omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Roster file or directory (RON); the built-in roster if omitted
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Gambit override as TEAM=GAMBIT, e.g. 0=cunning (repeatable)
        #[arg(short, long, value_parser = parse_gambit_override)]
        gambit: Vec<(usize, GambitKind)>,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Worker threads (0 = auto, 1 = sequential)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Turn bound; defaults to the scenario's
        #[arg(long)]
        max_turn: Option<u32>,

        /// Log export format: jsonl or bincode
        #[arg(long, default_value = "jsonl")]
        format: LogFormat,

        /// Skip turn log export
        #[arg(long)]
        no_logs: bool,
    },

    /// Player win rate with naive and with cunning players on the standard scenario
    Compare {
        /// Battles per gambit
        #[arg(short, long, default_value = "1000")]
        count: u32,

        /// Roster file or directory (RON); the built-in roster if omitted
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Worker threads (0 = auto, 1 = sequential)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Replay one seed several times and check the logs match
    Verify {
        /// Scenario file (RON); the standard scenario if omitted
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Roster file or directory (RON); the built-in roster if omitted
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Seed to replay
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Number of replays
        #[arg(long, default_value = "5")]
        runs: u32,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(cli.debug)
                .with_line_number(cli.debug),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level(cli.verbose, cli.quiet).into())
                .from_env_lossy(),
        )
        .init();

    let result = match cli.command {
        Commands::Batch {
            scenario,
            roster,
            gambit,
            count,
            parallel,
            output,
            seed,
            max_turn,
            format,
            no_logs,
        } => cmd_batch(BatchArgs {
            scenario,
            roster,
            overrides: gambit,
            count,
            parallel,
            output,
            seed,
            max_turn,
            format,
            no_logs,
        }),
        Commands::Compare {
            count,
            roster,
            parallel,
            seed,
        } => cmd_compare(count, roster.as_deref(), parallel, seed),
        Commands::Verify {
            scenario,
            roster,
            seed,
            runs,
        } => cmd_verify(scenario.as_deref(), roster.as_deref(), seed, runs),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Warn by default; each `-v` is one level more verbose, each `-q` one less.
fn log_level(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => LevelFilter::OFF,
        -1 => LevelFilter::ERROR,
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn parse_gambit_override(s: &str) -> Result<(usize, GambitKind), String> {
    let (team, gambit) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TEAM=GAMBIT, got '{s}'"))?;
    let team = team
        .trim()
        .parse()
        .map_err(|e| format!("bad team index '{team}': {e}"))?;
    Ok((team, gambit.trim().parse()?))
}

fn load_roster_arg(path: Option<&Path>) -> Result<Roster, Box<dyn Error>> {
    Ok(match path {
        None => Roster::standard(),
        Some(dir) if dir.is_dir() => load_roster_dir(dir)?,
        Some(file) => load_roster(file)?,
    })
}

fn load_scenario_arg(path: Option<&Path>) -> Result<Scenario, Box<dyn Error>> {
    Ok(match path {
        None => Scenario::standard(),
        Some(file) => Scenario::load(file)?,
    })
}

struct BatchArgs {
    scenario: Option<PathBuf>,
    roster: Option<PathBuf>,
    overrides: Vec<(usize, GambitKind)>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_turn: Option<u32>,
    format: LogFormat,
    no_logs: bool,
}

fn cmd_batch(args: BatchArgs) -> CliResult {
    let roster = load_roster_arg(args.roster.as_deref())?;
    let mut scenario = load_scenario_arg(args.scenario.as_deref())?;
    for (team, gambit) in args.overrides {
        scenario = scenario.with_gambit(team, gambit)?;
    }
    let teams = scenario.build_teams(&roster)?;
    let gambits = scenario.gambits();

    let mut config = BatchConfig::new(&scenario.name, args.count)
        .with_output(args.output.clone())
        .with_seed(args.seed)
        .with_parallel(args.parallel)
        .with_max_turn(args.max_turn.unwrap_or(scenario.max_turn));
    if args.no_logs {
        config = config.without_logs();
    }

    tracing::info!(
        scenario = %scenario.name,
        count = args.count,
        parallel = args.parallel,
        seed = args.seed,
        max_turn = config.max_turn,
        gambits = ?scenario.teams.iter().map(|t| t.gambit.name()).collect::<Vec<_>>(),
        output = %args.output.display(),
        "Batch configuration"
    );

    let results = run_batch(&teams, &gambits, &config)?;

    let results_path = args.output.join("batch.json");
    results.save(&results_path)?;
    eprintln!("Results saved to: {}", results_path.display());

    if !args.no_logs {
        let logs_path = args
            .output
            .join(format!("turn_logs.{}", args.format.extension()));
        write_logs(&logs_path, &results.logs, args.format)?;
        eprintln!(
            "{} turn logs saved to: {}",
            results.logs.len(),
            logs_path.display()
        );
    }

    for line in results.summary.to_lines() {
        println!("{line}");
    }
    for (id, _) in scenario.teams.iter().enumerate() {
        let team = TeamId(id as u32);
        println!(
            "{}: {:.1}% win rate",
            scenario.team_name(team).unwrap_or("?"),
            results.tally.win_rate(team) * 100.0
        );
    }
    Ok(())
}

fn cmd_compare(count: u32, roster: Option<&Path>, parallel: u32, seed: u64) -> CliResult {
    let roster = load_roster_arg(roster)?;
    let player = TeamId(0);

    for gambit in [GambitKind::Naive, GambitKind::Cunning] {
        let scenario = Scenario::standard().with_gambit(player.index(), gambit)?;
        let teams = scenario.build_teams(&roster)?;
        let config = BatchConfig::new(&scenario.name, count)
            .with_seed(seed)
            .with_parallel(parallel)
            .with_max_turn(scenario.max_turn)
            .without_logs();

        let results = run_batch(&teams, &scenario.gambits(), &config)?;
        println!(
            "player gambit {gambit}: win rate {:.1}% ({}/{} won, {} timeouts)",
            results.tally.win_rate(player) * 100.0,
            results.tally.wins(player),
            results.tally.total(),
            results.tally.timeouts()
        );
    }
    Ok(())
}

fn cmd_verify(scenario: Option<&Path>, roster: Option<&Path>, seed: u64, runs: u32) -> CliResult {
    let roster = load_roster_arg(roster)?;
    let scenario = load_scenario_arg(scenario)?;
    let teams = scenario.build_teams(&roster)?;

    let deterministic =
        verify_determinism(&teams, &scenario.gambits(), seed, runs, scenario.max_turn)?;
    if deterministic {
        println!("seed {seed}: {runs} runs identical");
        Ok(())
    } else {
        Err(format!("seed {seed}: runs diverged").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_is_global() {
        let cli = Cli::try_parse_from(["gambit_headless", "verify", "--debug"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Verify { .. }));

        let cli = Cli::try_parse_from(["gambit_headless", "-d", "compare"]).unwrap();
        assert!(cli.debug);

        let cli = Cli::try_parse_from(["gambit_headless", "compare"]).unwrap();
        assert!(!cli.debug);
    }

    #[test]
    fn test_log_level_counts() {
        assert_eq!(log_level(0, 0), LevelFilter::WARN);
        assert_eq!(log_level(2, 0), LevelFilter::DEBUG);
        assert_eq!(log_level(0, 1), LevelFilter::ERROR);
        assert_eq!(log_level(0, 3), LevelFilter::OFF);
        assert_eq!(log_level(9, 0), LevelFilter::TRACE);
    }

    #[test]
    fn test_gambit_override_parse() {
        let cli = Cli::try_parse_from([
            "gambit_headless",
            "batch",
            "-g",
            "0=cunning",
            "-g",
            "1=naive",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch { gambit, .. } => {
                assert_eq!(gambit, vec![(0, GambitKind::Cunning), (1, GambitKind::Naive)]);
            }
            _ => panic!("expected batch"),
        }
        assert!(parse_gambit_override("cunning").is_err());
    }
}
