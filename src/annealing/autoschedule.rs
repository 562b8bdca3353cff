use log::debug;

use crate::errors::SahapError;
use crate::genome::Genome;
use crate::utils::math_utils::RunningAverage;

const TARGET_PBAD_HIGH: f64 = 0.85;
const TARGET_PBAD_LOW: f64 = 1e-3;
const STABILITY_TOLERANCE: f64 = 1e-3;
const MIN_PROBE_ITERATIONS: u32 = 30;
/// Safety valve against pathological non-convergence of the probe loop; no
/// realistic instance should ever reach this.
const MAX_PROBE_ITERATIONS: u32 = 1_000_000;

/// Measures `Pbad` at a fixed temperature: reshuffles to a fresh random
/// assignment, then anneals at constant `T` until the running average of
/// `pBad.average()` stabilizes to within `STABILITY_TOLERANCE` relative
/// precision, with a floor of `MIN_PROBE_ITERATIONS`.
fn measure_pbad(genome: &mut Genome, temperature: f64) -> Result<f64, SahapError> {
    genome.reshuffle();
    let mut running = RunningAverage::new();
    let mut prev_mean = 0.0;
    let mut i: u32 = 0;
    loop {
        genome.iteration(temperature)?;
        i += 1;
        running.add(genome.p_bad().average());
        let cur_mean = running.mean();
        if i >= MIN_PROBE_ITERATIONS {
            let denom = prev_mean.abs().max(1e-12);
            if ((cur_mean - prev_mean) / denom).abs() < STABILITY_TOLERANCE {
                return Ok(cur_mean);
            }
        }
        if i >= MAX_PROBE_ITERATIONS {
            return Ok(cur_mean);
        }
        prev_mean = cur_mean;
    }
}

/// Phase 1: finds `t_initial` such that `Pbad(t_initial)` sits at the high
/// target (`0.85`), bad moves are nearly always accepted.
pub fn find_t_initial(genome: &mut Genome) -> Result<f64, SahapError> {
    let mut t = 1.0;
    let mut pbad = measure_pbad(genome, t)?;

    while pbad < TARGET_PBAD_HIGH {
        t *= 2.0;
        pbad = measure_pbad(genome, t)?;
    }
    while pbad > TARGET_PBAD_HIGH {
        t /= 2.0;
        pbad = measure_pbad(genome, t)?;
    }
    while pbad < TARGET_PBAD_HIGH {
        t *= 1.2;
        pbad = measure_pbad(genome, t)?;
    }

    debug!("auto-schedule: t_initial = {:.6} (pBad = {:.4})", t, pbad);
    Ok(t)
}

/// Phase 2: finds `t_end` such that `Pbad(t_end)` sits at the low target
/// (`10^-3`), bad moves are almost always rejected.
pub fn find_t_end(genome: &mut Genome, t_initial: f64) -> Result<f64, SahapError> {
    let mut t = t_initial;
    let mut pbad = measure_pbad(genome, t)?;

    while pbad > TARGET_PBAD_LOW {
        t /= 2.0;
        pbad = measure_pbad(genome, t)?;
    }
    while pbad < TARGET_PBAD_LOW {
        t *= 1.2;
        pbad = measure_pbad(genome, t)?;
    }

    debug!("auto-schedule: t_end = {:.6} (pBad = {:.6})", t, pbad);
    Ok(t)
}

/// Runs both probe phases and installs the resulting schedule on `genome`
/// with a budget of `total_iterations`. Returns `(t_initial, t_end)`.
pub fn calibrate(genome: &mut Genome, total_iterations: f64) -> Result<(f64, f64), SahapError> {
    let t_initial = find_t_initial(genome)?;
    let t_end = find_t_end(genome, t_initial)?;
    genome.set_schedule(t_initial, t_end, total_iterations);
    Ok((t_initial, t_end))
}
