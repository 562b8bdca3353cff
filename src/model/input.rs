use crate::model::read::Read;
use std::collections::HashMap;

/// Per-site zygosity annotation, read from the optional ground-truth file's
/// alphabet (`'0'`, `'1'`, `'*'`/`'X'`). Carried on `InputFile` for
/// completeness but not consumed by the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zygosity {
    HomoRef,
    HomoAlt,
    Hetero,
}

/// The immutable, read-only collection of reads and the dense site index
/// they're expressed over.
///
/// Built once by the WIF/ground-truth parsers in `crate::io` and never
/// mutated afterward; every other component borrows from it.
pub struct InputFile {
    ploidy: usize,
    /// `raw_position -> dense_index`.
    position_to_dense: HashMap<u64, usize>,
    /// Dense site positions, in `dense_index` order.
    site_positions: Vec<u64>,
    reads: Vec<Read>,
    /// `K x num_sites` ground truth alleles, `None` for unknown (`'X'`).
    ground_truth: Option<Vec<Vec<Option<usize>>>>,
    zygosity: Option<Vec<Option<Zygosity>>>,
}

impl InputFile {
    pub fn new(
        ploidy: usize,
        position_to_dense: HashMap<u64, usize>,
        site_positions: Vec<u64>,
        reads: Vec<Read>,
    ) -> InputFile {
        InputFile {
            ploidy,
            position_to_dense,
            site_positions,
            reads,
            ground_truth: None,
            zygosity: None,
        }
    }

    pub fn with_ground_truth(mut self, ground_truth: Vec<Vec<Option<usize>>>) -> InputFile {
        self.ground_truth = Some(ground_truth);
        self
    }

    pub fn with_zygosity(mut self, zygosity: Vec<Option<Zygosity>>) -> InputFile {
        self.zygosity = Some(zygosity);
        self
    }

    pub fn ploidy(&self) -> usize {
        self.ploidy
    }

    pub fn num_sites(&self) -> usize {
        self.site_positions.len()
    }

    pub fn num_reads(&self) -> usize {
        self.reads.len()
    }

    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    pub fn read(&self, index: usize) -> &Read {
        &self.reads[index]
    }

    pub fn site_positions(&self) -> &[u64] {
        &self.site_positions
    }

    pub fn dense_index_of(&self, raw_position: u64) -> Option<usize> {
        self.position_to_dense.get(&raw_position).copied()
    }

    pub fn has_ground_truth(&self) -> bool {
        self.ground_truth.is_some()
    }

    pub fn ground_truth(&self) -> Option<&[Vec<Option<usize>>]> {
        self.ground_truth.as_deref()
    }

    pub fn zygosity(&self) -> Option<&[Option<Zygosity>]> {
        self.zygosity.as_deref()
    }
}
