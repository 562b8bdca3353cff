use std::path::Path;
use std::process;
use std::str::FromStr;
use std::time::Duration;

use clap::crate_version;
use log::{error, info};

use sahap::annealing::{self, autoschedule};
use sahap::cli::{build_cli, parse_scoring_strategy, set_log_level};
use sahap::errors::SahapError;
use sahap::genome::Genome;
use sahap::io::{ground_truth, wif};
use sahap::output::format_blocks;
use sahap::utils::seed::gather_seed;

/// The CLI's `millions_of_iterations` argument is scaled by this constant
/// before it is treated as the total iteration budget.
const META_ITER: f64 = 1_000_000.0;

fn main() {
    let matches = build_cli().get_matches();
    set_log_level(&matches);
    info!("sahap version {}", crate_version!());

    if let Err(err) = run(&matches) {
        error!("{}", err);
        process::exit(1);
    }
}

fn parse_or<T: FromStr>(matches: &clap::ArgMatches, name: &str, default: T) -> T {
    matches
        .get_one::<String>(name)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or(default)
}

fn run(matches: &clap::ArgMatches) -> Result<(), SahapError> {
    let reads_path = matches.get_one::<String>("reads").expect("required by clap");
    let input = wif::read_file(Path::new(reads_path))?;

    let input = match matches.get_one::<String>("ground_truth") {
        Some(path) => {
            let (rows, zygosity) =
                ground_truth::read_file(Path::new(path), input.ploidy(), input.num_sites())?;
            input.with_ground_truth(rows).with_zygosity(zygosity)
        }
        None => input,
    };

    let millions: f64 = parse_or(matches, "millions_of_iterations", 10.0);
    let total_iterations = millions * META_ITER;

    let window_width: usize = parse_or(matches, "window-width", 1000);
    let window_stride: usize = parse_or(matches, "window-stride", 500);
    let epsilon: f64 = parse_or(matches, "epsilon", 0.015);
    let wall_budget_secs: u64 = parse_or(matches, "window-wall-budget-secs", 50);
    let progress_every: u64 = parse_or(matches, "progress-every", 10_000);
    let scoring = parse_scoring_strategy(
        matches.get_one::<String>("scoring").map(|s| s.as_str()).unwrap_or("wmec"),
    );
    let seed = matches
        .get_one::<String>("seed")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(gather_seed);

    let show_progress = !matches.get_flag("quiet");

    let mut genome = Genome::new(&input, scoring, epsilon, window_width, window_stride, seed);
    autoschedule::calibrate(&mut genome, total_iterations)?;
    annealing::run(&mut genome, Duration::from_secs(wall_budget_secs), progress_every, show_progress)?;

    if let Some(errors) = genome.compare_ground_truth() {
        info!("ground truth comparison: {} disagreeing sites", errors);
    }

    print!("{}", format_blocks(&input, &genome));
    Ok(())
}
