use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::errors::SahapError;
use crate::genome::Genome;

/// Drives one window's annealing sweep: repeatedly computes the current
/// temperature, runs a `Genome::iteration`, evaluates the retreat schedule,
/// and logs progress every `progress_every` iterations, until `wall_budget`
/// elapses.
pub fn run_window(genome: &mut Genome, wall_budget: Duration, progress_every: u64) -> Result<u64, SahapError> {
    let started = Instant::now();
    genome.reset_schedule_progress();
    let mut local_iter: u64 = 0;

    loop {
        if started.elapsed() >= wall_budget {
            debug!(
                "window [{}, {}) timed out after {} iterations",
                genome.window().0,
                genome.window().1,
                local_iter
            );
            break;
        }

        let temperature = genome.temperature();
        genome.iteration(temperature)?;
        genome.maybe_retreat();
        local_iter += 1;

        if progress_every > 0 && local_iter % progress_every == 0 {
            let truth = genome
                .compare_ground_truth()
                .map(|d| format!(" err={}", d))
                .unwrap_or_default();
            debug!(
                "{}k ({:.1}s) T={:.6} pBad={:.4} MEC={:.4}{}",
                local_iter / 1000,
                started.elapsed().as_secs_f64(),
                temperature,
                genome.p_bad().average(),
                genome.normalized_cost(),
                truth,
            );
        }
    }

    Ok(local_iter)
}

/// Builds the site-indexed progress bar shown across the whole windowed
/// sweep.
fn build_progress_bar(num_sites: usize) -> ProgressBar {
    let pb = ProgressBar::new(num_sites as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} site {pos:>7}/{len:7} {msg}")
    {
        pb.set_style(style);
    }
    pb
}

/// Top-level driver: slides the window across every site, running one
/// bounded annealing sweep per window; the outer loop terminates once the
/// window can no longer advance. `show_progress` renders a site-indexed
/// progress bar on stderr for long-running sweeps.
pub fn run(
    genome: &mut Genome,
    window_wall_budget: Duration,
    progress_every: u64,
    show_progress: bool,
) -> Result<(), SahapError> {
    genome.initialize_window();
    let bar = show_progress.then(|| build_progress_bar(genome.num_sites()));

    loop {
        run_window(genome, window_wall_budget, progress_every)?;
        if let Some(pb) = &bar {
            pb.set_position(genome.window().1 as u64);
            pb.set_message(format!("pBad={:.4} MEC={:.4}", genome.p_bad().average(), genome.normalized_cost()));
        }
        if !genome.increment_window() {
            break;
        }
    }

    if let Some(pb) = &bar {
        pb.finish_with_message("done");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::ScoringStrategy;
    use crate::model::{InputFile, Read, Site};
    use std::collections::HashMap;

    fn small_input() -> InputFile {
        let r0 = Read::new(vec![Site::new(0, 0, 1.0), Site::new(1, 0, 1.0)]);
        let r1 = Read::new(vec![Site::new(0, 1, 1.0), Site::new(1, 1, 1.0)]);
        let mut map = HashMap::new();
        map.insert(0u64, 0usize);
        map.insert(1u64, 1usize);
        InputFile::new(2, map, vec![0, 1], vec![r0, r1])
    }

    #[test]
    fn run_window_respects_wall_budget() {
        let input = small_input();
        let mut genome = Genome::new(&input, ScoringStrategy::WMec, 0.015, 2, 2, 99);
        genome.set_schedule(1.0, 0.01, 1_000_000.0);
        let iters = run_window(&mut genome, Duration::from_millis(20), 0).unwrap();
        assert!(iters > 0);
    }

    #[test]
    fn run_terminates_once_window_reaches_the_end() {
        let input = small_input();
        let mut genome = Genome::new(&input, ScoringStrategy::WMec, 0.015, 2, 2, 99);
        genome.set_schedule(1.0, 0.01, 1_000.0);
        run(&mut genome, Duration::from_millis(5), 0, false).unwrap();
        assert!(genome.is_final_window());
    }
}
