use std::collections::HashSet;

use crate::errors::SahapError;
use crate::model::{InputFile, Read, Site};
use crate::poisson;
use crate::utils::math_utils::MathUtils;

/// One of the `K` haplotype sequences a `Genome` is assembling.
///
/// Owns no reads: `reads`/`saved_reads` hold indices into the single backing
/// `Vec<Read>` kept by `InputFile`, never a copy. All cost fields
/// (`total_cost`, `window_cost`, `site_cost`) are maintained incrementally by
/// `add_read`/`remove_read` rather than recomputed from scratch.
pub struct Haplotype {
    num_sites: usize,
    ploidy: usize,
    /// Poisson error-rate parameter; `lambda` at a site is
    /// `epsilon * coverage[site]`.
    epsilon: f64,

    /// `weights[site][allele]`, the summed confidence weight of every
    /// currently-assigned read voting for `allele` at `site`.
    weights: Vec<Vec<f64>>,
    /// Number of assigned reads covering each site.
    coverage: Vec<usize>,
    /// Per-site consensus allele, or `None` when `coverage[site] == 0`.
    solution: Vec<Option<usize>>,

    /// Indices (into `InputFile::reads`) of reads currently assigned to
    /// this haplotype and active under the current window.
    reads: HashSet<usize>,
    /// Indices of assigned reads parked outside the current window.
    saved_reads: HashSet<usize>,

    total_cost: f64,
    window_cost: f64,
    site_cost: f64,

    window_start: usize,
    window_end: usize,
    window_stride: usize,
}

impl Haplotype {
    pub fn new(num_sites: usize, ploidy: usize, epsilon: f64) -> Haplotype {
        Haplotype {
            num_sites,
            ploidy,
            epsilon,
            weights: vec![vec![0.0; ploidy]; num_sites],
            coverage: vec![0; num_sites],
            solution: vec![None; num_sites],
            reads: HashSet::new(),
            saved_reads: HashSet::new(),
            total_cost: 0.0,
            window_cost: 0.0,
            site_cost: 0.0,
            window_start: 0,
            window_end: num_sites,
            window_stride: 0,
        }
    }

    pub fn num_sites(&self) -> usize {
        self.num_sites
    }

    pub fn num_reads(&self) -> usize {
        self.reads.len()
    }

    pub fn reads(&self) -> &HashSet<usize> {
        &self.reads
    }

    pub fn has_read(&self, read_index: usize) -> bool {
        self.reads.contains(&read_index)
    }

    pub fn solution(&self) -> &[Option<usize>] {
        &self.solution
    }

    pub fn coverage_at(&self, site: usize) -> usize {
        self.coverage[site]
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn window_cost(&self) -> f64 {
        self.window_cost
    }

    pub fn site_cost(&self) -> f64 {
        self.site_cost
    }

    /// `total_cost + site_cost`: the quantity `Genome` minimizes via
    /// annealing under the Poisson scoring strategy.
    pub fn combined_cost(&self) -> f64 {
        self.total_cost + self.site_cost
    }

    pub fn window(&self) -> (usize, usize) {
        (self.window_start, self.window_end)
    }

    /// Mean coverage across every site (O(num_sites)).
    pub fn mean_coverage(&self) -> f64 {
        if self.num_sites == 0 {
            return 0.0;
        }
        self.coverage.iter().sum::<usize>() as f64 / self.num_sites as f64
    }

    /// Total coverage summed only across the current window (O(window
    /// width)).
    pub fn window_total_coverage(&self) -> usize {
        self.coverage[self.window_start..self.window_end].iter().sum()
    }

    /// Recomputes, from scratch, the MEC cost restricted to `[start, end)`.
    /// O(window width * ploidy); used both to seed `window_cost` on window
    /// changes and as an independent check against the incrementally
    /// maintained value.
    pub fn window_cost_range(&self, start: usize, end: usize) -> f64 {
        let mut total = 0.0;
        for i in start..end.min(self.num_sites) {
            total += self.site_mec(i);
        }
        total
    }

    fn site_mec(&self, site: usize) -> f64 {
        let sol = self.solution[site];
        let mut total = 0.0;
        for a in 0..self.ploidy {
            if Some(a) != sol {
                total += self.weights[site][a];
            }
        }
        total
    }

    /// Assigns `read_index` (whose data is `read`) to this haplotype,
    /// voting each of its sites in. Errs if already assigned
    /// (`DuplicateAssignment`).
    pub fn add_read(&mut self, read_index: usize, read: &Read) -> Result<(), SahapError> {
        if self.reads.contains(&read_index) {
            return Err(SahapError::DuplicateAssignment(format!(
                "read {} is already assigned to this haplotype",
                read_index
            )));
        }
        for site in &read.sites {
            self.vote(site, false);
        }
        self.reads.insert(read_index);
        Ok(())
    }

    /// Unassigns `read_index` (whose data is `read`) from this haplotype,
    /// voting each of its sites back out. Errs if not currently assigned
    /// (`NotAssigned`).
    pub fn remove_read(&mut self, read_index: usize, read: &Read) -> Result<(), SahapError> {
        if !self.reads.contains(&read_index) {
            return Err(SahapError::NotAssigned(format!(
                "read {} is not assigned to this haplotype",
                read_index
            )));
        }
        for site in &read.sites {
            self.vote(site, true);
        }
        self.reads.remove(&read_index);
        Ok(())
    }

    /// The four-step incremental update for a single site observation:
    /// subtract the site's contribution under the old state, mutate the
    /// tally, recompute the local consensus if needed, then add the
    /// contribution back under the new state.
    fn vote(&mut self, site: &Site, retract: bool) {
        let i = site.dense_index;

        self.apply_site_delta(i, -1.0);

        if !retract {
            self.weights[i][site.allele] += site.weight;
            match self.solution[i] {
                None => self.solution[i] = Some(site.allele),
                Some(cur) if cur != site.allele && self.weights[i][site.allele] > self.weights[i][cur] => {
                    self.solution[i] = Some(site.allele);
                }
                _ => {}
            }
            self.coverage[i] += 1;
        } else {
            self.weights[i][site.allele] -= site.weight;
            self.coverage[i] -= 1;
            if self.solution[i] == Some(site.allele) {
                self.recompute_solution(i);
            }
        }

        self.apply_site_delta(i, 1.0);
    }

    fn recompute_solution(&mut self, i: usize) {
        if self.coverage[i] == 0 {
            self.solution[i] = None;
        } else {
            let best = MathUtils::argmax_tie_low(&self.weights[i]);
            self.solution[i] = Some(best);
        }
    }

    /// Applies `sign * (site contribution)` to `total_cost`, `window_cost`
    /// (if `i` is inside the current window), and `site_cost`, reading the
    /// weights/coverage/solution *as they stand at call time* — callers
    /// must invoke this once before mutating a site (`sign = -1.0`) and
    /// once after (`sign = 1.0`).
    fn apply_site_delta(&mut self, i: usize, sign: f64) {
        let mec_i = self.site_mec(i);
        self.total_cost += sign * mec_i;
        if i >= self.window_start && i < self.window_end {
            self.window_cost += sign * mec_i;
        }
        self.total_cost = MathUtils::clamp_drift(self.total_cost, 1e-10);
        self.window_cost = MathUtils::clamp_drift(self.window_cost, 1e-10);

        if self.coverage[i] > 0 {
            let lambda = self.epsilon * self.coverage[i] as f64;
            self.site_cost += sign * poisson::site_cost_term(lambda, mec_i);
            self.site_cost = MathUtils::clamp_drift(self.site_cost, 1e-10);
        }
    }

    /// Starts windowed optimization: the window becomes `[0, width)`
    /// (clamped to `num_sites`), `stride` is remembered for later
    /// `increment_window` calls, and `reads` is rebuilt to hold only reads
    /// overlapping the initial window (grounded on
    /// `Haplotype::InitializeWindow`).
    pub fn initialize_window(&mut self, width: usize, stride: usize, input: &InputFile) {
        self.window_start = 0;
        self.window_end = width.min(self.num_sites);
        self.window_stride = stride;
        self.saved_reads = self.reads.clone();
        self.pick_reads(0, input);
        self.window_cost = self.window_cost_range(self.window_start, self.window_end);
    }

    /// Advances the window by `window_stride`, parking reads that fall
    /// entirely outside it and pulling back in any previously-parked read
    /// that now overlaps (grounded on `Haplotype::IncrementWindow`). Reads
    /// fully contained in the overlap between the old and new window stay
    /// parked — they can't have moved in or out of a haplotype's consensus
    /// since the window last covered them.
    pub fn increment_window(&mut self, input: &InputFile) {
        let old_end = self.window_end;
        self.window_start += self.window_stride;
        self.window_end = (self.window_end + self.window_stride).min(self.num_sites);

        self.save_reads(input);
        let overlap = old_end.saturating_sub(self.window_start);
        self.pick_reads(overlap, input);

        self.window_cost = self.window_cost_range(self.window_start, self.window_end);
    }

    fn save_reads(&mut self, input: &InputFile) {
        for &idx in &self.reads {
            let r = input.read(idx);
            if r.end() > self.window_start {
                self.saved_reads.insert(idx);
            }
        }
    }

    fn pick_reads(&mut self, overlap: usize, input: &InputFile) {
        self.reads.clear();
        let picked: Vec<usize> = self
            .saved_reads
            .iter()
            .copied()
            .filter(|&idx| {
                let r = input.read(idx);
                r.end() > self.window_start + overlap && r.start() <= self.window_end
            })
            .collect();
        for idx in picked {
            self.reads.insert(idx);
            self.saved_reads.remove(&idx);
        }
    }
}
