//! Compact half-open offset range used for style runs.
//!
//! Offsets count buffer positions (Unicode scalar values and inline
//! objects), not bytes. `u32` keeps a run at 8 bytes of offsets.

/// Half-open range `[start, end)` of buffer positions.
///
/// # Example
/// ```
/// use imhtml::Range;
///
/// let r = Range::new(2, 5);
/// assert_eq!(r.len(), 3);
/// assert!(r.contains(4));
/// assert!(!r.contains(5));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[repr(C)]
pub struct Range {
    pub start: u32,
    pub end: u32,
}

const _: () = assert!(std::mem::size_of::<Range>() == 8);

impl Range {
    /// Create a new range.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create a range from usize values.
    ///
    /// # Panics
    /// Panics in debug mode if values exceed u32::MAX.
    #[inline]
    pub fn from_usize(start: usize, end: usize) -> Self {
        debug_assert!(start <= u32::MAX as usize);
        debug_assert!(end <= u32::MAX as usize);
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Number of positions covered.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub const fn start_usize(&self) -> usize {
        self.start as usize
    }

    #[inline]
    pub const fn end_usize(&self) -> usize {
        self.end as usize
    }

    /// Check if this range contains a position.
    #[inline]
    pub const fn contains(&self, pos: u32) -> bool {
        pos >= self.start && pos < self.end
    }

    /// True if the two ranges share at least one position.
    #[inline]
    pub const fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if the ranges overlap or are directly adjacent.
    ///
    /// Touching runs of the same style are merged into one.
    #[inline]
    pub const fn touches(&self, other: &Range) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest range covering both.
    #[inline]
    pub fn union(&self, other: &Range) -> Range {
        Range::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<std::ops::Range<u32>> for Range {
    #[inline]
    fn from(r: std::ops::Range<u32>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<std::ops::Range<usize>> for Range {
    #[inline]
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::from_usize(r.start, r.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_size() {
        assert_eq!(std::mem::size_of::<Range>(), 8);
    }

    #[test]
    fn test_range_new() {
        let r = Range::new(10, 20);
        assert_eq!(r.start, 10);
        assert_eq!(r.end, 20);
        assert_eq!(r.len(), 10);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_range_contains() {
        let r = Range::new(10, 20);
        assert!(!r.contains(9));
        assert!(r.contains(10));
        assert!(r.contains(19));
        assert!(!r.contains(20));
    }

    #[test]
    fn test_range_overlap_and_touch() {
        let a = Range::new(0, 5);
        let b = Range::new(5, 8);
        assert!(!a.overlaps(&b));
        assert!(a.touches(&b));
        assert!(a.overlaps(&Range::new(4, 6)));
        assert!(!a.touches(&Range::new(6, 8)));
    }

    #[test]
    fn test_range_union() {
        let a = Range::new(0, 5);
        assert_eq!(a.union(&Range::new(3, 9)), Range::new(0, 9));
        assert_eq!(a.union(&Range::new(5, 5)), a);
        assert!(Range::new(4, 4).is_empty());
    }

    #[test]
    fn test_range_from_std_range() {
        let r: Range = (10u32..20u32).into();
        assert_eq!(r, Range::new(10, 20));

        let r2: Range = (10usize..20usize).into();
        assert_eq!(r2, Range::new(10, 20));
    }
}
