use crate::model::site::Site;

/// One sequencing read: an ordered list of site observations, plus the
/// cached `[start, end]` dense-index range it spans.
///
/// `Read`s are immutable after loading and owned exclusively by the
/// `InputFile` backing vector; every other component refers to a read by
/// its index into that vector rather than holding a copy.
#[derive(Debug, Clone)]
pub struct Read {
    /// Site observations, ordered by `dense_index`.
    pub sites: Vec<Site>,
    /// Inclusive `[start, end]` dense-index range this read spans.
    pub range: (usize, usize),
}

impl Read {
    /// Builds a read from its site observations, which must already be
    /// sorted by `dense_index` (the WIF parser guarantees this since sites
    /// are emitted in file order and the dense index is assigned by
    /// first-seen position order within a monotonically increasing file).
    pub fn new(sites: Vec<Site>) -> Read {
        assert!(!sites.is_empty(), "a read must cover at least one site");
        let start = sites.first().unwrap().dense_index;
        let end = sites.last().unwrap().dense_index;
        Read {
            sites,
            range: (start, end),
        }
    }

    pub fn start(&self) -> usize {
        self.range.0
    }

    pub fn end(&self) -> usize {
        self.range.1
    }

    /// Whether this read's range intersects the half-open window
    /// `[window_start, window_end)`.
    pub fn overlaps_window(&self, window_start: usize, window_end: usize) -> bool {
        self.range.0 < window_end && self.range.1 >= window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(i: usize, a: usize, w: f64) -> Site {
        Site::new(i, a, w)
    }

    #[test]
    fn range_spans_first_to_last_site() {
        let r = Read::new(vec![site(2, 0, 1.0), site(5, 1, 0.5), site(9, 0, 1.0)]);
        assert_eq!(r.range, (2, 9));
    }

    #[test]
    fn single_site_read_has_degenerate_range() {
        let r = Read::new(vec![site(4, 0, 1.0)]);
        assert_eq!(r.range, (4, 4));
        assert!(r.overlaps_window(0, 5));
        assert!(!r.overlaps_window(5, 10));
    }
}
