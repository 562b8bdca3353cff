use crate::genome::Genome;
use crate::model::InputFile;

/// A maximal interval `[start, end]` (inclusive, dense-index space) spanned
/// by a chain of pairwise-overlapping reads — the unit of consensus
/// reporting.
pub fn compute_blocks(input: &InputFile) -> Vec<(usize, usize)> {
    let mut ranges: Vec<(usize, usize)> = input.reads().iter().map(|r| (r.start(), r.end())).collect();
    ranges.sort_unstable();

    let mut blocks = Vec::new();
    let mut iter = ranges.into_iter();
    if let Some(mut current) = iter.next() {
        for (start, end) in iter {
            if start <= current.1 {
                current.1 = current.1.max(end);
            } else {
                blocks.push(current);
                current = (start, end);
            }
        }
        blocks.push(current);
    }
    blocks
}

fn allele_char(allele: usize) -> char {
    char::from_digit(allele as u32, 10).unwrap_or('?')
}

/// Renders the `BLOCK n` consensus report: one block section per
/// connected component, one line per haplotype, `'-'` outside the block's
/// span and `'X'` for sites with no assigned coverage.
pub fn format_blocks(input: &InputFile, genome: &Genome) -> String {
    let m = input.num_sites();
    let blocks = compute_blocks(input);
    let mut out = String::new();

    for (n, (start, end)) in blocks.iter().enumerate() {
        out.push_str(&format!("BLOCK {}\n", n));
        for haplotype in genome.haplotypes() {
            let mut line = String::with_capacity(m);
            for site in 0..m {
                if site < *start || site > *end {
                    line.push('-');
                } else {
                    match haplotype.solution()[site] {
                        Some(allele) => line.push(allele_char(allele)),
                        None => line.push('X'),
                    }
                }
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::ScoringStrategy;
    use crate::model::{Read, Site};
    use std::collections::HashMap;

    fn input_with_gap() -> InputFile {
        // Reads span [0,1] and [1,2]: one block. A third read spans [5,6],
        // disjoint from the first two: a second block.
        let r0 = Read::new(vec![Site::new(0, 0, 1.0), Site::new(1, 0, 1.0)]);
        let r1 = Read::new(vec![Site::new(1, 0, 1.0), Site::new(2, 0, 1.0)]);
        let r2 = Read::new(vec![Site::new(5, 0, 1.0), Site::new(6, 0, 1.0)]);
        let mut map = HashMap::new();
        for (i, p) in (0..7u64).enumerate() {
            map.insert(p, i);
        }
        InputFile::new(2, map, (0..7u64).collect(), vec![r0, r1, r2])
    }

    #[test]
    fn overlapping_reads_merge_into_one_block_disjoint_reads_do_not() {
        let input = input_with_gap();
        let blocks = compute_blocks(&input);
        assert_eq!(blocks, vec![(0, 2), (5, 6)]);
    }

    #[test]
    fn formatted_output_has_one_block_header_per_block_and_dashes_outside() {
        let input = input_with_gap();
        let genome = Genome::new(&input, ScoringStrategy::WMec, 0.015, 7, 7, 1);
        let text = format_blocks(&input, &genome);
        assert_eq!(text.matches("BLOCK").count(), 2);
        // first block's lines must have '-' at sites 3 and 4 (inside the gap).
        let first_block_line: &str = text.lines().nth(1).unwrap();
        assert_eq!(first_block_line.chars().nth(3), Some('-'));
        assert_eq!(first_block_line.chars().nth(4), Some('-'));
    }
}
