use std::path::Path;

use crate::errors::SahapError;
use crate::model::input::Zygosity;

/// Parses an already-loaded ground-truth document: exactly `ploidy` lines,
/// each of length `num_sites`, over the alphabet `'0'`, `'1'`, `'X'`/`'*'`
/// (unknown). Also derives the per-site `Zygosity` annotation by looking
/// across the `ploidy` rows at each site.
pub fn parse(
    contents: &str,
    ploidy: usize,
    num_sites: usize,
) -> Result<(Vec<Vec<Option<usize>>>, Vec<Option<Zygosity>>), SahapError> {
    let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() != ploidy {
        return Err(SahapError::InvalidInput(format!(
            "ground truth has {} rows, expected ploidy {}",
            lines.len(),
            ploidy
        )));
    }

    let mut rows = Vec::with_capacity(ploidy);
    for line in &lines {
        let trimmed = line.trim();
        if trimmed.chars().count() != num_sites {
            return Err(SahapError::InvalidInput(format!(
                "ground truth row has {} sites, expected {}",
                trimmed.chars().count(),
                num_sites
            )));
        }

        let mut row = Vec::with_capacity(num_sites);
        for c in trimmed.chars() {
            let allele = match c {
                '0' => Some(0),
                '1' => Some(1),
                'X' | 'x' | '*' => None,
                other => {
                    return Err(SahapError::InvalidInput(format!(
                        "unexpected ground truth character {:?}",
                        other
                    )))
                }
            };
            row.push(allele);
        }
        rows.push(row);
    }

    let mut zygosity = Vec::with_capacity(num_sites);
    for site in 0..num_sites {
        let column: Vec<Option<usize>> = rows.iter().map(|r| r[site]).collect();
        zygosity.push(zygosity_for_column(&column));
    }

    Ok((rows, zygosity))
}

fn zygosity_for_column(column: &[Option<usize>]) -> Option<Zygosity> {
    let known: Vec<usize> = column.iter().filter_map(|a| *a).collect();
    if known.len() != column.len() {
        return None;
    }
    if known.iter().all(|&a| a == 0) {
        Some(Zygosity::HomoRef)
    } else if known.iter().all(|&a| a == 1) {
        Some(Zygosity::HomoAlt)
    } else {
        Some(Zygosity::Hetero)
    }
}

/// Reads and parses a ground-truth file from disk.
pub fn read_file(
    path: &Path,
    ploidy: usize,
    num_sites: usize,
) -> Result<(Vec<Vec<Option<usize>>>, Vec<Option<Zygosity>>), SahapError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SahapError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
    parse(&contents, ploidy, num_sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_rows_and_derives_zygosity() {
        let gt = "0011\n0101\n";
        let (rows, zygosity) = parse(gt, 2, 4).unwrap();
        assert_eq!(rows[0], vec![Some(0), Some(0), Some(1), Some(1)]);
        assert_eq!(rows[1], vec![Some(0), Some(1), Some(0), Some(1)]);
        assert_eq!(zygosity[0], Some(Zygosity::HomoRef));
        assert_eq!(zygosity[1], Some(Zygosity::Hetero));
        assert_eq!(zygosity[3], Some(Zygosity::HomoAlt));
    }

    #[test]
    fn unknown_character_makes_zygosity_undetermined() {
        let gt = "0X1\n001\n";
        let (_, zygosity) = parse(gt, 2, 3).unwrap();
        assert_eq!(zygosity[1], None);
    }

    #[test]
    fn wrong_row_count_is_rejected() {
        let gt = "01\n";
        assert!(parse(gt, 2, 2).is_err());
    }

    #[test]
    fn wrong_row_length_is_rejected() {
        let gt = "01\n011\n";
        assert!(parse(gt, 2, 2).is_err());
    }
}
