//! Target coverage bitsets and target ranges

use smallvec::SmallVec;

/// Longest target phrase a coverage vector can describe
pub const MAX_PHRASE_LEN: usize = 32;

/// Half-open range `[start, end)` of target positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRange {
    pub start: usize,
    pub end: usize,
}

impl TargetRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end && end <= MAX_PHRASE_LEN);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Set of covered target positions, bit `i` standing for position `i`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coverage(u32);

impl Coverage {
    /// No position covered
    pub const EMPTY: Coverage = Coverage(0);

    /// Every position of a phrase of length `n` covered
    pub fn full(n: usize) -> Self {
        debug_assert!(n <= MAX_PHRASE_LEN);
        if n == MAX_PHRASE_LEN {
            Coverage(u32::MAX)
        } else {
            Coverage((1u32 << n) - 1)
        }
    }

    /// Exactly the positions of `range`
    pub fn of_range(range: TargetRange) -> Self {
        Coverage(Self::full(range.end).0 & !Self::full(range.start).0)
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0 & (1 << position) != 0
    }

    pub fn overlaps(&self, other: Coverage) -> bool {
        self.0 & other.0 != 0
    }

    pub fn union(&self, other: Coverage) -> Coverage {
        Coverage(self.0 | other.0)
    }

    pub fn intersect(&self, other: Coverage) -> Coverage {
        Coverage(self.0 & other.0)
    }

    pub fn count(&self) -> usize {
        self.0.count_ones() as usize
    }
}

/// Candidate target ranges for one source position
pub type Candidates = SmallVec<[TargetRange; 32]>;

/// Every range of `[0, n)` lying entirely in positions `covered` leaves free
pub fn uncovered_ranges(covered: Coverage, n: usize) -> Candidates {
    let mut ranges = Candidates::new();
    let mut start = 0;
    while start < n {
        if covered.contains(start) {
            start += 1;
            continue;
        }
        let mut run_end = start;
        while run_end < n && !covered.contains(run_end) {
            run_end += 1;
        }
        for a in start..run_end {
            for b in a + 1..=run_end {
                ranges.push(TargetRange::new(a, b));
            }
        }
        start = run_end;
    }
    ranges
}

/// Every non-empty range of `[0, n)`
pub fn all_ranges(n: usize) -> Candidates {
    uncovered_ranges(Coverage::EMPTY, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_and_range() {
        assert_eq!(Coverage::full(3).count(), 3);
        assert_eq!(Coverage::full(MAX_PHRASE_LEN).count(), MAX_PHRASE_LEN);
        let mid = Coverage::of_range(TargetRange::new(1, 3));
        assert!(!mid.contains(0));
        assert!(mid.contains(1));
        assert!(mid.contains(2));
        assert!(!mid.contains(3));
    }

    #[test]
    fn test_overlap_and_union() {
        let left = Coverage::of_range(TargetRange::new(0, 2));
        let right = Coverage::of_range(TargetRange::new(2, 4));
        assert!(!left.overlaps(right));
        assert_eq!(left.union(right), Coverage::full(4));
        assert!(left.overlaps(Coverage::of_range(TargetRange::new(1, 3))));
    }

    #[test]
    fn test_uncovered_ranges_respect_gaps() {
        // positions 0 and 3 free, 1..3 covered
        let covered = Coverage::of_range(TargetRange::new(1, 3));
        let ranges = uncovered_ranges(covered, 4);
        assert_eq!(
            ranges.as_slice(),
            &[TargetRange::new(0, 1), TargetRange::new(3, 4)]
        );
    }

    #[test]
    fn test_all_ranges_count() {
        assert_eq!(all_ranges(4).len(), 10);
        assert!(uncovered_ranges(Coverage::full(4), 4).is_empty());
    }
}
