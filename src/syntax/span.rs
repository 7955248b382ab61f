use std::ops::Range;

/// A source location: half-open byte offset range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "inverted span {}..{}", start, end);
        Self { start, end }
    }

    /// An empty span at `offset`, used for "expected X here" diagnostics.
    pub fn point(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(self) -> usize {
        (self.end - self.start) as usize
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The text this span covers. Spans produced by the parser always fall
    /// on character boundaries.
    pub fn text(self, source: &str) -> &str {
        &source[self.range()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_covers_both() {
        let a = Span::new(4, 9);
        let b = Span::new(2, 6);
        assert_eq!(a.merge(b), Span::new(2, 9));
        assert_eq!(b.merge(a), Span::new(2, 9));
    }

    #[test]
    fn test_point_is_empty() {
        let p = Span::point(7);
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
        assert_eq!(p.range(), 7..7);
    }

    #[test]
    fn test_text_slices_source() {
        let src = "echo héllo";
        let span = Span::new(5, src.len() as u32);
        assert_eq!(span.text(src), "héllo");
        assert_eq!(span.len(), 6);
    }
}
