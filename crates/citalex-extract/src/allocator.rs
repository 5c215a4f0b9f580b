//! Bookkeeping for claimed character ranges.

/// Set of accepted half-open `[start, end)` ranges.
///
/// A range is only accepted if it is disjoint from everything accepted
/// before it, so the first claimant of any byte wins.
#[derive(Debug, Default, Clone)]
pub struct SpanAllocator {
    spans: Vec<(usize, usize)>,
}

impl SpanAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `[start, end)`.
    ///
    /// Returns `false`, leaving the allocator unchanged, when the range is
    /// empty or intersects, contains, or is contained in an accepted range.
    pub fn accept(&mut self, start: usize, end: usize) -> bool {
        if start >= end || self.overlaps(start, end) {
            return false;
        }
        self.spans.push((start, end));
        true
    }

    /// Whether `[start, end)` touches any accepted range.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.spans.iter().any(|&(s, e)| start < e && s < end)
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
