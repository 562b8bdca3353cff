/// A single read-site observation: the dense site index a read touches, the
/// allele it observed there, and the confidence weight of that call.
///
/// Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    /// Dense index into `InputFile::site_positions`, in `0..num_sites`.
    pub dense_index: usize,
    /// Observed allele, a small non-negative integer `< ploidy`.
    pub allele: usize,
    /// Confidence weight in `(0, 1]`.
    pub weight: f64,
}

impl Site {
    pub fn new(dense_index: usize, allele: usize, weight: f64) -> Site {
        Site {
            dense_index,
            allele,
            weight,
        }
    }
}
