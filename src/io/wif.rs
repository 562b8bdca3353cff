use std::collections::HashMap;
use std::path::Path;

use nom::character::complete::{alpha1, char, digit1, space0, space1};
use nom::combinator::map_res;
use nom::multi::many1;
use nom::IResult;

use crate::errors::SahapError;
use crate::model::{InputFile, Read, Site};

/// A single parsed `<raw_position> <ref_nuc> <alt_nuc> <allele_integer>
/// <weight_integer> :` token, before the weight range check and dense-index
/// assignment.
struct RawSiteToken {
    raw_position: u64,
    allele: usize,
    weight_integer: u32,
}

fn uint(input: &str) -> IResult<&str, u64> {
    map_res(digit1, |s: &str| s.parse::<u64>())(input)
}

fn small_uint(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |s: &str| s.parse::<usize>())(input)
}

fn site_token(input: &str) -> IResult<&str, RawSiteToken> {
    let (input, _) = space0(input)?;
    let (input, raw_position) = uint(input)?;
    let (input, _) = space1(input)?;
    let (input, _ref_nuc) = alpha1(input)?;
    let (input, _) = space1(input)?;
    let (input, _alt_nuc) = alpha1(input)?;
    let (input, _) = space1(input)?;
    let (input, allele) = small_uint(input)?;
    let (input, _) = space1(input)?;
    let (input, weight_integer) = map_res(digit1, |s: &str| s.parse::<u32>())(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = space0(input)?;
    Ok((
        input,
        RawSiteToken {
            raw_position,
            allele,
            weight_integer,
        },
    ))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_line(line: &str) -> Result<Vec<RawSiteToken>, SahapError> {
    let body = strip_comment(line).trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let (remainder, tokens) = many1(site_token)(body)
        .map_err(|e| SahapError::InvalidInput(format!("malformed WIF line {:?}: {}", line, e)))?;
    if !remainder.trim().is_empty() {
        return Err(SahapError::InvalidInput(format!(
            "trailing unparsed content in WIF line {:?}: {:?}",
            line, remainder
        )));
    }
    Ok(tokens)
}

/// Parses an already-loaded WIF document into an `InputFile`. Ploidy is
/// fixed at 2, matching the canonical build.
pub fn parse(contents: &str) -> Result<InputFile, SahapError> {
    let mut position_to_dense: HashMap<u64, usize> = HashMap::new();
    let mut site_positions: Vec<u64> = Vec::new();
    let mut reads: Vec<Read> = Vec::new();

    for raw_line in contents.lines() {
        if raw_line.trim().is_empty() || raw_line.trim_start().starts_with('#') {
            continue;
        }

        let tokens = parse_line(raw_line)?;
        if tokens.is_empty() {
            continue;
        }

        let mut sites = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.weight_integer == 0 || token.weight_integer > 100 {
                return Err(SahapError::InvalidWeight(format!(
                    "weight_integer {} out of range (0, 100] at position {}",
                    token.weight_integer, token.raw_position
                )));
            }

            let next_index = site_positions.len();
            let dense_index = *position_to_dense.entry(token.raw_position).or_insert_with(|| {
                site_positions.push(token.raw_position);
                next_index
            });

            let weight = token.weight_integer as f64 / 100.0;
            sites.push(Site::new(dense_index, token.allele, weight));
        }

        sites.sort_by_key(|s| s.dense_index);
        reads.push(Read::new(sites));
    }

    Ok(InputFile::new(2, position_to_dense, site_positions, reads))
}

/// Reads and parses a WIF file from disk.
pub fn read_file(path: &Path) -> Result<InputFile, SahapError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| SahapError::InvalidInput(format!("cannot read {}: {}", path.display(), e)))?;
    parse(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_reads_and_assigns_dense_indices_by_first_seen_order() {
        let wif = "\
            200 A C 0 80 : 150 A G 1 60 : # read one\n\
            150 A G 0 50 : 300 T G 1 90 : # read two\n";
        let input = parse(wif).unwrap();

        assert_eq!(input.num_sites(), 3);
        assert_eq!(input.dense_index_of(200), Some(0));
        assert_eq!(input.dense_index_of(150), Some(1));
        assert_eq!(input.dense_index_of(300), Some(2));
        assert_eq!(input.num_reads(), 2);

        let r0 = input.read(0);
        assert_eq!(r0.sites.len(), 2);
        assert_eq!(r0.sites[0].dense_index, 0);
        assert_eq!(r0.sites[1].dense_index, 1);
    }

    #[test]
    fn blank_and_comment_only_lines_are_skipped() {
        let wif = "\n# just a comment\n100 A C 0 50 :\n";
        let input = parse(wif).unwrap();
        assert_eq!(input.num_reads(), 1);
    }

    #[test]
    fn zero_weight_is_rejected() {
        let wif = "100 A C 0 0 :\n";
        let err = parse(wif).unwrap_err();
        assert!(matches!(err, SahapError::InvalidWeight(_)));
    }

    #[test]
    fn weight_above_one_hundred_is_rejected() {
        let wif = "100 A C 0 101 :\n";
        let err = parse(wif).unwrap_err();
        assert!(matches!(err, SahapError::InvalidWeight(_)));
    }

    #[test]
    fn malformed_token_is_rejected() {
        let wif = "not a valid line\n";
        assert!(parse(wif).is_err());
    }
}
