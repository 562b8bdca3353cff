use std::env;

use clap::{crate_version, Arg, ArgAction, Command};
use env_logger::Builder;
use log::LevelFilter;

use crate::genome::ScoringStrategy;

/// Builds the `sahap` command surface: a single positional-args command
/// plus the tuning flags for window sizing, scoring, and the annealing
/// schedule.
pub fn build_cli() -> Command {
    Command::new("sahap")
        .version(crate_version!())
        .about("Windowed simulated-annealing weighted MEC haplotype assembler")
        .arg(
            Arg::new("reads")
                .required(true)
                .help("WIF-format input reads"),
        )
        .arg(
            Arg::new("ground_truth")
                .required(false)
                .help("Optional ground-truth haplotype file"),
        )
        .arg(
            Arg::new("millions_of_iterations")
                .required(false)
                .default_value("10")
                .help("Total iteration budget, in millions"),
        )
        .arg(
            Arg::new("window-width")
                .long("window-width")
                .default_value("1000")
                .help("Site-index window width"),
        )
        .arg(
            Arg::new("window-stride")
                .long("window-stride")
                .default_value("500")
                .help("Site-index window stride"),
        )
        .arg(
            Arg::new("epsilon")
                .long("epsilon")
                .default_value("0.015")
                .help("Expected per-call error rate"),
        )
        .arg(
            Arg::new("scoring")
                .long("scoring")
                .value_parser(["wmec", "poisson"])
                .default_value("wmec")
                .help("Per-site cost model fed to the annealer"),
        )
        .arg(
            Arg::new("window-wall-budget-secs")
                .long("window-wall-budget-secs")
                .default_value("50")
                .help("Wall-clock budget per window, in seconds"),
        )
        .arg(
            Arg::new("progress-every")
                .long("progress-every")
                .default_value("10000")
                .help("Log a progress line every N iterations (0 disables)"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Fixed PRNG seed (overrides entropy gathering)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Log at error level only"),
        )
}

/// Initializes `env_logger` at a level derived from `--verbose`/`--quiet`,
/// honoring `RUST_LOG` if set.
pub fn set_log_level(matches: &clap::ArgMatches) {
    let mut log_level = LevelFilter::Info;
    if matches.get_flag("verbose") {
        log_level = LevelFilter::Debug;
    }
    if matches.get_flag("quiet") {
        log_level = LevelFilter::Error;
    }

    let mut builder = Builder::new();
    builder.filter_level(log_level);
    if let Ok(rust_log) = env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    }
    if builder.try_init().is_err() {
        panic!("failed to initialize logging - was set_log_level called twice?");
    }
}

pub fn parse_scoring_strategy(raw: &str) -> ScoringStrategy {
    match raw {
        "poisson" => ScoringStrategy::Poisson,
        _ => ScoringStrategy::WMec,
    }
}
