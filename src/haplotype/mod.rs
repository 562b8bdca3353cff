pub mod haplotype;

pub use haplotype::Haplotype;
